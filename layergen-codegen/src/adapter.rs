//! Catalog adapter.
//!
//! Lowers the external catalog and query descriptors into the generation
//! [`Model`]. This is the only place model values are created, and it does
//! no I/O.

use std::collections::BTreeMap;

use layergen_catalog::{self as catalog, Catalog, Column, TableRef};
use layergen_core::to_screaming_snake_case;
use layergen_manifest::{EmitOptions, Settings};
use tracing::debug;

use crate::{
    Error, Result,
    mappers::{ColumnTypeMapper, PostgresTypeMapper, postgres},
    model::{
        CRUD_METHODS, CommandKind, Enum, EnumConstant, Field, FieldType, LayerPaths, Model,
        PrimaryKey, QUERIES_METHODS, Query, Shape, ShapeOrigin, ShapeStruct, Struct, Tag,
    },
    naming::{self, NamingRules},
    pipeline::Diagnostic,
};

const PHASE: &str = "adapt";

/// A model together with the warnings raised while building it.
#[derive(Debug)]
pub struct Adapted {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the generation model from a catalog and its queries.
///
/// # Errors
///
/// [`Error::CatalogMapping`] for unmapped column types and name collisions,
/// [`Error::Config`] for invalid or duplicate query names and unknown
/// command kinds.
pub fn build_model(
    catalog: &Catalog,
    queries: &[catalog::Query],
    settings: &Settings,
) -> Result<Adapted> {
    let mut adapter = Adapter::new(catalog, settings);
    let enums = adapter.enums()?;
    let structs = adapter.structs()?;
    let queries = adapter.queries(queries, &structs)?;

    debug!(
        enums = enums.len(),
        structs = structs.len(),
        queries = queries.len(),
        "built generation model"
    );

    Ok(Adapted {
        model: Model {
            enums,
            structs,
            queries,
            layers: adapter.layers,
            default_schema: catalog.default_schema.clone(),
        },
        diagnostics: adapter.diagnostics,
    })
}

struct Adapter<'a> {
    catalog: &'a Catalog,
    rules: NamingRules,
    mapper: PostgresTypeMapper,
    emit: EmitOptions,
    layers: LayerPaths,
    /// Generated type name -> what it was generated from
    types: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Adapter<'a> {
    fn new(catalog: &'a Catalog, settings: &Settings) -> Self {
        Self {
            catalog,
            rules: NamingRules::from_settings(settings),
            mapper: PostgresTypeMapper::new().with_overrides(&settings.overrides),
            emit: settings.emit,
            layers: LayerPaths::from_model_module(&settings.model_module),
            types: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Claim a generated type name, failing if another input already
    /// resolved to it.
    fn claim_type(&mut self, name: &str, origin: String) -> Result<()> {
        if !naming::is_valid_identifier(name) || naming::is_reserved(name) {
            return Err(Error::catalog(format!(
                "{origin} resolves to '{name}', which is not a usable type name"
            )));
        }
        if let Some(existing) = self.types.get(name) {
            return Err(Error::catalog(format!(
                "{existing} and {origin} both resolve to '{name}'"
            )));
        }
        self.types.insert(name.to_string(), origin);
        Ok(())
    }

    /// Raw name of a schema object, prefixed with its schema outside the
    /// default schema.
    fn qualified_raw(&self, schema: &str, name: &str) -> String {
        if self.catalog.is_default_schema(schema) {
            name.to_string()
        } else {
            format!("{schema}_{name}")
        }
    }

    fn enums(&mut self) -> Result<Vec<Enum>> {
        let catalog = self.catalog;
        let mut enums = Vec::new();

        for (schema, source) in catalog.enums() {
            let raw = self.qualified_raw(&schema.name, &source.name);
            let db_name = if self.catalog.is_default_schema(&schema.name) {
                source.name.clone()
            } else {
                format!("{}.{}", schema.name, source.name)
            };
            let name = self.rules.resolve(&raw);
            self.claim_type(&name, format!("enum '{db_name}'"))?;

            let mut constants: Vec<EnumConstant> = Vec::with_capacity(source.values.len());
            for value in &source.values {
                let constant = naming::enum_variant(value, &self.rules);
                if let Some(other) = constants.iter().find(|c| c.name == constant) {
                    return Err(Error::catalog(format!(
                        "enum '{db_name}': values '{}' and '{value}' both resolve to '{constant}'",
                        other.value
                    )));
                }
                constants.push(EnumConstant {
                    name: constant,
                    value: value.clone(),
                });
            }

            self.mapper.add_enum(&db_name, name.clone());
            debug!(db_name = %db_name, name = %name, "mapped enum");

            enums.push(Enum {
                name,
                db_name,
                constants,
                comment: source.comment.clone(),
                import_path: self.layers.model.clone(),
            });
        }

        Ok(enums)
    }

    fn structs(&mut self) -> Result<Vec<Struct>> {
        let catalog = self.catalog;
        let mut structs = Vec::new();

        for (schema, table) in catalog.tables() {
            let table_ref = TableRef::new(schema.name.clone(), table.name.clone());
            let unit = format!("table {table_ref}");
            let raw = self.qualified_raw(&schema.name, &table.name);
            let name = self
                .rules
                .struct_name(&raw, self.emit.exact_table_names);
            self.claim_type(&name, format!("table '{table_ref}'"))?;

            let mut fields = Vec::with_capacity(table.columns.len());
            for column in &table.columns {
                let field = self.field(column, &column.name, &unit)?;
                check_field_collision(&fields, &field, &unit)?;
                fields.push(field);
            }

            let keys: Vec<usize> = table
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.primary_key)
                .map(|(i, _)| i)
                .collect();
            let id = match keys.as_slice() {
                [field] => Some(PrimaryKey {
                    field: *field,
                    generated: postgres::is_serial(&table.columns[*field].data_type),
                }),
                [] => {
                    self.warn(&unit, "no primary key; by-id operations are not generated");
                    None
                }
                _ => {
                    self.warn(
                        &unit,
                        "composite primary key; by-id operations are not generated",
                    );
                    None
                }
            };

            debug!(table = %table_ref, name = %name, fields = fields.len(), "mapped table");

            structs.push(Struct {
                name,
                table: table_ref,
                fields,
                id,
                comment: table.comment.clone(),
                import_path: self.layers.model.clone(),
            });
        }

        Ok(structs)
    }

    fn field(&self, column: &Column, raw: &str, unit: &str) -> Result<Field> {
        let name = self.rules.resolve(raw);
        if name.is_empty() {
            return Err(Error::catalog(format!(
                "{unit}: column '{raw}' resolves to an empty name"
            )));
        }

        let base = self.mapper.map(&column.data_type).ok_or_else(|| {
            Error::catalog(format!(
                "{unit}: column '{raw}' has type '{}', which has no mapping",
                column.data_type
            ))
        })?;
        let ty = FieldType::new(base)
            .nullable(!column.not_null)
            .array(column.is_array || postgres::is_array_type(&column.data_type));

        // Renamed fields follow their new name; others keep the column's words.
        let ident = match self.rules.rename(raw) {
            Some(_) => naming::field_ident(&name),
            None => naming::field_ident(raw),
        };

        Ok(Field {
            ident,
            name,
            column: raw.to_string(),
            ty,
            tag: Tag {
                json: self.emit.json_tags.then(|| raw.to_string()),
                db: self.emit.db_tags.then(|| raw.to_string()),
                form: self.emit.form_tags.then(|| raw.to_string()),
            },
            comment: column.comment.clone(),
        })
    }

    fn queries(&mut self, queries: &[catalog::Query], structs: &[Struct]) -> Result<Vec<Query>> {
        let mut lowered: Vec<Query> = Vec::with_capacity(queries.len());

        for query in queries {
            if !naming::is_valid_identifier(&query.name) {
                return Err(Error::config(format!(
                    "query '{}' in {}: name is not a valid identifier",
                    query.name, query.source
                )));
            }
            if let Some(other) = lowered.iter().find(|q| q.method_name == query.name) {
                return Err(Error::config(format!(
                    "query '{}' is declared in both {} and {}",
                    query.name, other.source, query.source
                )));
            }
            let fn_name = naming::field_ident(&query.name);
            if let Some(other) = lowered.iter().find(|q| q.fn_name == fn_name) {
                return Err(Error::config(format!(
                    "queries '{}' and '{}' both resolve to the function '{fn_name}'",
                    other.method_name, query.name
                )));
            }
            if QUERIES_METHODS.contains(&fn_name.as_str()) {
                return Err(Error::catalog(format!(
                    "query '{}' in {} resolves to '{fn_name}', which the generated Queries \
                     type already defines",
                    query.name, query.source
                )));
            }
            let command: CommandKind = query
                .cmd
                .parse()
                .map_err(|e| Error::config(format!("query '{}': {e}", query.name)))?;

            let unit = format!("query {}", query.name);

            let params: Vec<(String, &Column)> = query
                .params
                .iter()
                .map(|p| {
                    let raw = if p.column.name.is_empty() {
                        format!("param_{}", p.number)
                    } else {
                        p.column.name.clone()
                    };
                    (raw, &p.column)
                })
                .collect();
            let arg = self.shape(&params, structs, &format!("{}Params", query.name), &unit)?;

            let ret = if command.is_exec() {
                Shape::None
            } else {
                let columns: Vec<(String, &Column)> = query
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let raw = if c.name.is_empty() {
                            format!("column_{}", i + 1)
                        } else {
                            c.name.clone()
                        };
                        (raw, c)
                    })
                    .collect();
                self.shape(&columns, structs, &format!("{}Row", query.name), &unit)?
            };

            if let Some(entity) = ret.as_struct().filter(|s| !s.is_synthesized())
                && CRUD_METHODS.contains(&fn_name.as_str())
            {
                self.warn(
                    &unit,
                    format!(
                        "'{fn_name}' clashes with a generated {} method; the query is only \
                         reachable through the query layer",
                        entity.name
                    ),
                );
            }

            debug!(query = %query.name, command = %command, "lowered query");

            lowered.push(Query {
                method_name: query.name.clone(),
                constant_name: to_screaming_snake_case(&query.name),
                fn_name,
                command,
                sql: query.sql.clone(),
                arg,
                ret,
                source: query.source.clone(),
                comments: query.comments.clone(),
            });
        }

        Ok(lowered)
    }

    /// Shape of a parameter or result column list.
    fn shape(
        &mut self,
        columns: &[(String, &Column)],
        structs: &[Struct],
        synthesized_name: &str,
        unit: &str,
    ) -> Result<Shape> {
        let raws = dedupe_names(columns.iter().map(|(raw, _)| raw.as_str()));

        let mut fields = Vec::with_capacity(columns.len());
        for ((_, column), raw) in columns.iter().zip(&raws) {
            let field = self.field(column, raw, unit)?;
            check_field_collision(&fields, &field, unit)?;
            fields.push(field);
        }

        match fields.len() {
            0 => Ok(Shape::None),
            1 => Ok(Shape::Scalar(fields.remove(0))),
            _ => {
                let matches: Vec<&Struct> = structs
                    .iter()
                    .filter(|s| same_columns(&s.fields, &fields))
                    .collect();
                // Among equal column lists, the table the columns come from wins.
                let existing = source_table(columns)
                    .and_then(|table| matches.iter().find(|s| self.same_table(&s.table, table)))
                    .or(matches.first());
                if let Some(existing) = existing {
                    return Ok(Shape::Struct(ShapeStruct {
                        name: existing.name.clone(),
                        origin: ShapeOrigin::Existing,
                        fields: existing.fields.clone(),
                        import_path: existing.import_path.clone(),
                    }));
                }
                self.claim_type(synthesized_name, unit.to_string())?;
                Ok(Shape::Struct(ShapeStruct {
                    name: synthesized_name.to_string(),
                    origin: ShapeOrigin::Synthesized,
                    fields,
                    import_path: self.layers.queries(),
                }))
            }
        }
    }

    fn same_table(&self, a: &TableRef, b: &TableRef) -> bool {
        a.name == b.name
            && (a.schema == b.schema
                || (self.catalog.is_default_schema(&a.schema)
                    && self.catalog.is_default_schema(&b.schema)))
    }

    fn warn(&mut self, unit: &str, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(PHASE, message).on(unit));
    }
}

/// Exact match: same column names with the same types in the same order.
fn same_columns(existing: &[Field], candidate: &[Field]) -> bool {
    existing.len() == candidate.len()
        && existing
            .iter()
            .zip(candidate)
            .all(|(a, b)| a.column == b.column && a.ty == b.ty)
}

/// The table every column with a known origin comes from.
fn source_table<'c>(columns: &[(String, &'c Column)]) -> Option<&'c TableRef> {
    let mut tables = columns.iter().filter_map(|(_, c)| c.table.as_ref());
    let first = tables.next()?;
    tables.all(|t| t == first).then_some(first)
}

/// Suffix repeated raw names: `id, id` becomes `id, id_2`.
fn dedupe_names<'n>(names: impl Iterator<Item = &'n str>) -> Vec<String> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    names
        .map(|name| {
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{name}_{count}")
            }
        })
        .collect()
}

fn check_field_collision(fields: &[Field], field: &Field, unit: &str) -> Result<()> {
    match fields
        .iter()
        .find(|f| f.name == field.name || f.ident == field.ident)
    {
        Some(other) => Err(Error::catalog(format!(
            "{unit}: columns '{}' and '{}' both resolve to '{}'",
            other.column, field.column, field.name
        ))),
        None => Ok(()),
    }
}

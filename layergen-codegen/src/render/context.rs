//! Immutable render contexts.
//!
//! Every template execution gets a freshly built context. Keys are always
//! present (absent values serialize as `null`) so templates can run in
//! strict mode. Anything that needs quoting for Rust or SQL is computed
//! here rather than in templates.

use layergen_core::to_snake_case;
use layergen_manifest::EmitOptions;
use serde::Serialize;

use crate::{
    model::{CommandKind, Enum, Field, LayerPaths, Model, Query, Shape, ShapeStruct, Struct},
    naming,
};

/// Title line of a generated file.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsView {
    pub model: String,
    pub repository: String,
    pub usecase: String,
    pub delivery: String,
    pub queries: String,
}

impl From<&LayerPaths> for PathsView {
    fn from(layers: &LayerPaths) -> Self {
        Self {
            model: layers.model.clone(),
            repository: layers.repository.clone(),
            usecase: layers.usecase.clone(),
            delivery: layers.delivery.clone(),
            queries: layers.queries(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    pub ident: String,
    pub column: String,
    /// Column name as a Rust string literal
    pub column_literal: String,
    pub rust_type: String,
    pub nullable: bool,
    pub array: bool,
    pub doc: Option<String>,
    /// `serde` rename target as a literal, when json tags are on
    pub serde_rename: Option<String>,
    /// `sqlx` rename target as a literal, when db tags are on
    pub sqlx_rename: Option<String>,
    /// Name the field is read under in a request payload, as a literal
    pub payload_rename: Option<String>,
}

impl FieldView {
    pub fn new(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            ident: field.ident.clone(),
            column: field.column.clone(),
            column_literal: rust_str(&field.column),
            rust_type: field.ty.rust_type(),
            nullable: field.ty.nullable,
            array: field.ty.array,
            doc: field.comment.clone(),
            serde_rename: field.tag.json.as_deref().map(rust_str),
            sqlx_rename: field.tag.db.as_deref().map(rust_str),
            payload_rename: field.tag.payload().map(rust_str),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IdView {
    pub ident: String,
    pub column: String,
    pub rust_type: String,
}

/// A struct as templates see it: a table entity or a synthesized shape.
#[derive(Debug, Clone, Serialize)]
pub struct StructView {
    pub name: String,
    /// Module identifier (`post`, `r#type`)
    pub module: String,
    /// Module name without a raw prefix, for file names
    pub snake: String,
    /// Parameter name for a value of this struct
    pub var: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldView>,
    pub insert_fields: Vec<FieldView>,
    pub update_fields: Vec<FieldView>,
    pub id: Option<IdView>,
    pub id_exists: bool,
    /// The key is filled in by the database
    pub id_generated: bool,
    pub updatable: bool,
    pub derive_from_row: bool,
    pub manual_decode: bool,
    pub has_entity_queries: bool,
    /// Parameter name of `create`, unused when only a generated key exists
    pub create_var: String,
    /// HTTP collection route (`/posts`)
    pub route: String,
    pub sql: SqlView,
}

/// Rust string literals holding the CRUD statements of a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SqlView {
    pub select_all: String,
    pub select_by_id: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

impl StructView {
    pub fn entity(entity: &Struct, model: &Model, emit: EmitOptions) -> Self {
        let module = naming::field_ident(&entity.name);
        let snake = naming::plain_ident(&module).to_string();
        let id = entity.id_field().map(|f| IdView {
            ident: f.ident.clone(),
            column: f.column.clone(),
            rust_type: f.ty.rust_type(),
        });

        let mut route = String::from("/");
        if !model.is_default_schema(&entity.table.schema) {
            route.push_str(&slug(&entity.table.schema));
            route.push('/');
        }
        route.push_str(&slug(&entity.table.name));

        let create_var = if entity.insert_fields().next().is_some() {
            module.clone()
        } else {
            format!("_{snake}")
        };

        Self {
            name: entity.name.clone(),
            var: module.clone(),
            module,
            snake,
            doc: entity.comment.clone(),
            fields: entity.fields.iter().map(FieldView::new).collect(),
            insert_fields: entity.insert_fields().map(FieldView::new).collect(),
            update_fields: entity.update_fields().map(FieldView::new).collect(),
            id_exists: id.is_some(),
            id,
            id_generated: entity.id.as_ref().is_some_and(|pk| pk.generated),
            updatable: entity.updatable(),
            derive_from_row: emit.db_tags,
            manual_decode: !emit.db_tags,
            has_entity_queries: model.entity_queries(entity).next().is_some(),
            create_var,
            route,
            sql: crud_sql(entity),
        }
    }

    pub fn shape(shape: &ShapeStruct, emit: EmitOptions) -> Self {
        let module = naming::field_ident(&shape.name);
        Self {
            name: shape.name.clone(),
            snake: naming::plain_ident(&module).to_string(),
            var: module.clone(),
            create_var: module.clone(),
            module,
            doc: None,
            fields: shape.fields.iter().map(FieldView::new).collect(),
            insert_fields: Vec::new(),
            update_fields: Vec::new(),
            id: None,
            id_exists: false,
            id_generated: false,
            updatable: false,
            derive_from_row: emit.db_tags,
            manual_decode: !emit.db_tags,
            has_entity_queries: false,
            route: String::new(),
            sql: SqlView::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstantView {
    pub name: String,
    pub value: String,
    pub value_literal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumView {
    pub name: String,
    pub db_name: String,
    pub db_name_literal: String,
    pub doc: Option<String>,
    pub serde_rename: bool,
    pub constants: Vec<ConstantView>,
}

impl EnumView {
    pub fn new(e: &Enum, emit: EmitOptions) -> Self {
        Self {
            name: e.name.clone(),
            db_name: e.db_name.clone(),
            db_name_literal: rust_str(&e.db_name),
            doc: e.comment.clone(),
            serde_rename: emit.json_tags,
            constants: e
                .constants
                .iter()
                .map(|c| ConstantView {
                    name: c.name.clone(),
                    value: c.value.clone(),
                    value_literal: rust_str(&c.value),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryView {
    pub method_name: String,
    pub fn_name: String,
    pub constant_name: String,
    pub command: String,
    pub sql_literal: String,
    pub doc: Option<String>,
    /// Parameters after `&self` (`id: i32`, `arg: &CreatePostParams`)
    pub arg_signature: String,
    pub arg_names: Vec<String>,
    /// Expressions passed to `.bind(...)`, in placeholder order
    pub binds: Vec<String>,
    pub return_type: String,
    /// Type a row decodes into
    pub row_type: String,
    pub one: bool,
    pub many: bool,
    pub exec: bool,
    pub exec_rows: bool,
    pub exec_result: bool,
    pub scalar_ret: bool,
    pub struct_ret: bool,
    pub manual_decode: bool,
    /// Statements are not cached server side
    pub unprepared: bool,
}

impl QueryView {
    pub fn new(query: &Query, emit: EmitOptions) -> Self {
        let (arg_signature, arg_names, binds) = match &query.arg {
            Shape::None => (String::new(), Vec::new(), Vec::new()),
            Shape::Scalar(field) => (
                format!("{}: {}", field.ident, field.ty.rust_type()),
                vec![field.ident.clone()],
                vec![field.ident.clone()],
            ),
            Shape::Struct(s) => (
                format!("arg: &{}", s.name),
                vec!["arg".to_string()],
                s.fields.iter().map(|f| format!("&arg.{}", f.ident)).collect(),
            ),
        };

        let row_type = match &query.ret {
            Shape::None => String::new(),
            Shape::Scalar(field) => field.ty.rust_type(),
            Shape::Struct(s) => s.name.clone(),
        };

        let returns_rows = !query.command.is_exec() && !query.ret.is_none();
        let one = returns_rows && query.command == CommandKind::One;
        let many = returns_rows && query.command == CommandKind::Many;
        let exec_rows = query.command == CommandKind::ExecRows;
        let exec_result = query.command == CommandKind::ExecResult;
        let exec = !returns_rows && !exec_rows && !exec_result;

        let return_type = if one {
            row_type.clone()
        } else if many {
            format!("Vec<{row_type}>")
        } else if exec_rows {
            "u64".to_string()
        } else if exec_result {
            "PgQueryResult".to_string()
        } else {
            "()".to_string()
        };

        let struct_ret = returns_rows && query.ret.as_struct().is_some();

        Self {
            method_name: query.method_name.clone(),
            fn_name: query.fn_name.clone(),
            constant_name: query.constant_name.clone(),
            command: query.command.to_string(),
            sql_literal: rust_str(query.sql.trim()),
            doc: (!query.comments.is_empty()).then(|| query.comments.join("\n")),
            arg_signature,
            arg_names,
            binds,
            return_type,
            row_type,
            one,
            many,
            exec,
            exec_rows,
            exec_result,
            scalar_ret: returns_rows && !struct_ret,
            struct_ret,
            manual_decode: struct_ret && !emit.db_tags,
            unprepared: !emit.prepared_queries,
        }
    }
}

/// Context of a per-entity template.
#[derive(Debug, Clone, Serialize)]
pub struct EntityContext {
    pub header: HeaderView,
    pub imports: Vec<String>,
    pub entity: StructView,
    pub entity_queries: Vec<QueryView>,
    pub enums: Vec<EnumView>,
    pub queries: Vec<QueryView>,
    pub emit: EmitOptions,
    pub paths: PathsView,
}

impl EntityContext {
    pub fn new(
        title: String,
        entity: &Struct,
        model: &Model,
        emit: EmitOptions,
        imports: Vec<String>,
    ) -> Self {
        Self {
            header: HeaderView { title },
            imports,
            entity: StructView::entity(entity, model, emit),
            entity_queries: model
                .entity_queries(entity)
                .map(|q| QueryView::new(q, emit))
                .collect(),
            enums: model.enums.iter().map(|e| EnumView::new(e, emit)).collect(),
            queries: model.queries.iter().map(|q| QueryView::new(q, emit)).collect(),
            emit,
            paths: PathsView::from(&model.layers),
        }
    }
}

/// Context of a query file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceContext {
    pub header: HeaderView,
    pub imports: Vec<String>,
    /// Module identifier of the file (`posts`, `r#type`)
    pub module: String,
    /// Source identifier as declared (`posts.sql`)
    pub source: String,
    pub queries: Vec<QueryView>,
    /// Synthesized argument and result structs, in query order
    pub structs: Vec<StructView>,
    pub emit: EmitOptions,
    pub paths: PathsView,
}

impl SourceContext {
    pub fn new(
        title: String,
        source: &str,
        model: &Model,
        emit: EmitOptions,
        imports: Vec<String>,
    ) -> Self {
        let queries = model.queries_in(source);
        Self {
            header: HeaderView { title },
            imports,
            module: source_module(source),
            source: source.to_string(),
            structs: queries
                .iter()
                .flat_map(|q| q.synthesized())
                .map(|s| StructView::shape(s, emit))
                .collect(),
            queries: queries.iter().map(|q| QueryView::new(q, emit)).collect(),
            emit,
            paths: PathsView::from(&model.layers),
        }
    }
}

/// What a query module re-exports.
#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub module: String,
    pub exports: Vec<String>,
}

/// Context of a shared utility file.
#[derive(Debug, Clone, Serialize)]
pub struct SharedContext {
    pub header: HeaderView,
    pub imports: Vec<String>,
    pub entities: Vec<StructView>,
    pub enums: Vec<EnumView>,
    pub enum_names: Vec<String>,
    pub has_enums: bool,
    pub sources: Vec<SourceView>,
    pub queries: Vec<QueryView>,
    pub has_queries: bool,
    pub emit: EmitOptions,
    pub paths: PathsView,
}

impl SharedContext {
    pub fn new(title: String, model: &Model, emit: EmitOptions, imports: Vec<String>) -> Self {
        let sources = model
            .sources()
            .into_iter()
            .map(|source| {
                let queries = model.queries_in(source);
                let mut exports: Vec<String> =
                    queries.iter().map(|q| q.constant_name.clone()).collect();
                exports.extend(
                    queries
                        .iter()
                        .flat_map(|q| q.synthesized())
                        .map(|s| s.name.clone()),
                );
                SourceView {
                    module: source_module(source),
                    exports,
                }
            })
            .collect();

        Self {
            header: HeaderView { title },
            imports,
            entities: model
                .structs
                .iter()
                .map(|s| StructView::entity(s, model, emit))
                .collect(),
            enums: model.enums.iter().map(|e| EnumView::new(e, emit)).collect(),
            enum_names: model.enums.iter().map(|e| e.name.clone()).collect(),
            has_enums: !model.enums.is_empty(),
            sources,
            queries: model.queries.iter().map(|q| QueryView::new(q, emit)).collect(),
            has_queries: !model.queries.is_empty(),
            emit,
            paths: PathsView::from(&model.layers),
        }
    }
}

/// Module identifier for a query source: the file stem in snake case
/// (`queries/Posts.sql` becomes `posts`).
pub fn source_module(source: &str) -> String {
    let file = source.rsplit(['/', '\\']).next().unwrap_or(source);
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    naming::field_ident(stem)
}

/// Rust string literal for `value`.
pub fn rust_str(value: &str) -> String {
    format!("{value:?}")
}

const SQL_RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint", "create",
    "default", "delete", "desc", "distinct", "do", "else", "end", "false", "for", "foreign",
    "from", "group", "having", "in", "index", "insert", "into", "is", "join", "key", "limit",
    "not", "null", "offset", "on", "or", "order", "primary", "references", "select", "set",
    "table", "then", "to", "true", "union", "unique", "update", "user", "using", "values",
    "when", "where", "with",
];

/// Quote a SQL identifier unless it is plain lower-case and not reserved.
pub fn quote_ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain && !SQL_RESERVED.contains(&name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn slug(name: &str) -> String {
    to_snake_case(&naming::sanitize(name)).replace('_', "-")
}

fn column_list<'a>(fields: impl Iterator<Item = &'a Field>) -> Vec<String> {
    fields.map(|f| quote_ident(&f.column)).collect()
}

fn crud_sql(entity: &Struct) -> SqlView {
    let table = if entity.table.schema.is_empty() {
        quote_ident(&entity.table.name)
    } else {
        format!(
            "{}.{}",
            quote_ident(&entity.table.schema),
            quote_ident(&entity.table.name)
        )
    };
    let all = column_list(entity.fields.iter()).join(", ");

    let insert_columns = column_list(entity.insert_fields());
    let insert = if insert_columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES RETURNING {all}")
    } else {
        let placeholders: Vec<String> =
            (1..=insert_columns.len()).map(|n| format!("${n}")).collect();
        format!(
            "INSERT INTO {table} ({}) VALUES ({}) RETURNING {all}",
            insert_columns.join(", "),
            placeholders.join(", ")
        )
    };

    let mut sql = SqlView {
        select_all: rust_str(&format!("SELECT {all} FROM {table}")),
        insert: rust_str(&insert),
        ..SqlView::default()
    };

    if let Some(id) = entity.id_field() {
        let key = quote_ident(&id.column);
        sql.select_all = rust_str(&format!("SELECT {all} FROM {table} ORDER BY {key}"));
        sql.select_by_id = rust_str(&format!("SELECT {all} FROM {table} WHERE {key} = $1"));
        sql.delete = rust_str(&format!("DELETE FROM {table} WHERE {key} = $1"));

        let sets: Vec<String> = entity
            .update_fields()
            .enumerate()
            .map(|(i, f)| format!("{} = ${}", quote_ident(&f.column), i + 1))
            .collect();
        if !sets.is_empty() {
            sql.update = rust_str(&format!(
                "UPDATE {table} SET {} WHERE {key} = ${}",
                sets.join(", "),
                sets.len() + 1
            ));
        }
    }

    sql
}

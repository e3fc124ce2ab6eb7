//! PostgreSQL type mapper.

use std::collections::BTreeMap;

use layergen_manifest::TypeOverride;

use super::ColumnTypeMapper;
use crate::model::SemanticType;

/// PostgreSQL mapper with user overrides and catalog enums.
///
/// Lookup order: overrides, enums, built-in types.
#[derive(Debug, Clone, Default)]
pub struct PostgresTypeMapper {
    overrides: BTreeMap<String, String>,
    enums: BTreeMap<String, String>,
}

impl PostgresTypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = &'a TypeOverride>,
    ) -> Self {
        for entry in overrides {
            self.overrides
                .insert(normalize(&entry.db_type), entry.rust_type.clone());
        }
        self
    }

    /// Register a catalog enum under its database name.
    pub fn with_enum(mut self, db_name: &str, name: impl Into<String>) -> Self {
        self.add_enum(db_name, name);
        self
    }

    pub fn add_enum(&mut self, db_name: &str, name: impl Into<String>) {
        self.enums.insert(normalize(db_name), name.into());
    }
}

impl ColumnTypeMapper for PostgresTypeMapper {
    fn engine(&self) -> &'static str {
        "postgresql"
    }

    fn map(&self, data_type: &str) -> Option<SemanticType> {
        let key = normalize(data_type);

        if let Some(rust_type) = self.overrides.get(&key) {
            return Some(SemanticType::Custom(rust_type.clone()));
        }
        if let Some(name) = self.enums.get(&key) {
            return Some(SemanticType::Enum(name.clone()));
        }

        let ty = match key.as_str() {
            "smallint" | "int2" | "smallserial" | "serial2" => SemanticType::SmallInt,
            "integer" | "int" | "int4" | "serial" | "serial4" => SemanticType::Int,
            "bigint" | "int8" | "bigserial" | "serial8" => SemanticType::BigInt,
            "real" | "float4" => SemanticType::Float,
            "double precision" | "float8" | "float" => SemanticType::Double,
            "numeric" | "decimal" => SemanticType::Decimal,
            "boolean" | "bool" => SemanticType::Bool,
            "text" | "varchar" | "character varying" | "char" | "character" | "bpchar"
            | "citext" | "name" => SemanticType::String,
            "bytea" => SemanticType::Bytes,
            "uuid" => SemanticType::Uuid,
            "timestamp" | "timestamp without time zone" => SemanticType::Timestamp,
            "timestamptz" | "timestamp with time zone" => SemanticType::TimestampTz,
            "date" => SemanticType::Date,
            "time" | "time without time zone" => SemanticType::Time,
            "json" | "jsonb" => SemanticType::Json,
            _ => return None,
        };
        Some(ty)
    }
}

/// Returns true for serial types the database fills in on insert.
pub(crate) fn is_serial(data_type: &str) -> bool {
    matches!(
        normalize(data_type).as_str(),
        "smallserial" | "serial2" | "serial" | "serial4" | "bigserial" | "serial8"
    )
}

/// Lower-case, drop a `pg_catalog.` prefix, an array suffix and a length
/// modifier (`varchar(255)`).
fn normalize(data_type: &str) -> String {
    let mut key = data_type.trim().to_lowercase();
    if let Some(stripped) = key.strip_prefix("pg_catalog.") {
        key = stripped.to_string();
    }
    while let Some(stripped) = key.strip_suffix("[]") {
        key = stripped.to_string();
    }
    if let Some(pos) = key.find('(') {
        key.truncate(pos);
        key = key.trim_end().to_string();
    }
    key
}

/// Returns true if the type name carries an array suffix.
pub(crate) fn is_array_type(data_type: &str) -> bool {
    data_type.trim().ends_with("[]")
}

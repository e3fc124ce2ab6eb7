//! Schema catalog snapshot.
//!
//! A catalog is a read-only view of every schema the SQL parser resolved:
//! tables with their columns, enumerations with their ordered values and
//! built-in or user functions.

use std::fmt;

use serde::{Deserialize, Serialize};

fn default_schema_name() -> String {
    "public".to_string()
}

/// Resolved catalog for one generation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    /// Schema that unqualified names resolve against.
    #[serde(default = "default_schema_name")]
    pub default_schema: String,
    /// Schemas in declaration order.
    #[serde(default)]
    pub schemas: Vec<Schema>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            default_schema: default_schema_name(),
            schemas: Vec::new(),
            comment: None,
        }
    }
}

impl Catalog {
    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Iterate over every table with its owning schema, in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = (&Schema, &Table)> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.tables.iter().map(move |table| (schema, table)))
    }

    /// Iterate over every enum with its owning schema, in declaration order.
    pub fn enums(&self) -> impl Iterator<Item = (&Schema, &Enum)> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.enums.iter().map(move |e| (schema, e)))
    }

    /// Returns true if `schema` is the default schema.
    pub fn is_default_schema(&self, schema: &str) -> bool {
        schema.is_empty() || schema == self.default_schema
    }
}

/// A named schema (namespace) in the catalog.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A table and its ordered columns.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Table {
    /// Columns flagged as part of the primary key.
    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// A column of a table, a query parameter or a query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Column {
    /// Column name; may be empty for unnamed result expressions.
    #[serde(default)]
    pub name: String,
    /// Database type name as written by the parser (e.g. `int4`, `text`).
    pub data_type: String,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// Table the column originates from, when known.
    #[serde(default)]
    pub table: Option<TableRef>,
}

/// Fully-qualified table reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TableRef {
    #[serde(default)]
    pub catalog: String,
    #[serde(default)]
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: String::new(),
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.catalog.is_empty() {
            write!(f, "{}.", self.catalog)?;
        }
        if !self.schema.is_empty() {
            write!(f, "{}.", self.schema)?;
        }
        write!(f, "{}", self.name)
    }
}

/// An enumerated type with its ordered values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Enum {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A function signature known to the catalog.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    pub return_type: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A function argument.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Argument {
    #[serde(default)]
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub has_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog {
            default_schema: "public".into(),
            schemas: vec![
                Schema {
                    name: "public".into(),
                    tables: vec![Table {
                        name: "users".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Schema {
                    name: "audit".into(),
                    tables: vec![Table {
                        name: "events".into(),
                        ..Default::default()
                    }],
                    enums: vec![Enum {
                        name: "level".into(),
                        values: vec!["low".into(), "high".into()],
                        comment: None,
                    }],
                    ..Default::default()
                },
            ],
            comment: None,
        }
    }

    #[test]
    fn test_tables_keep_declaration_order() {
        let catalog = catalog();
        let names: Vec<_> = catalog
            .tables()
            .map(|(s, t)| format!("{}.{}", s.name, t.name))
            .collect();
        assert_eq!(names, vec!["public.users", "audit.events"]);
    }

    #[test]
    fn test_default_schema() {
        let catalog = catalog();
        assert!(catalog.is_default_schema("public"));
        assert!(catalog.is_default_schema(""));
        assert!(!catalog.is_default_schema("audit"));
        assert!(catalog.schema("audit").is_some());
        assert_eq!(catalog.enums().count(), 1);
    }

    #[test]
    fn test_table_ref_display() {
        assert_eq!(TableRef::new("public", "posts").to_string(), "public.posts");
        assert_eq!(TableRef::new("", "posts").to_string(), "posts");
    }
}

//! Semantic column types and their Rust spelling.

use std::fmt;

use serde::Serialize;

/// Database-independent type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SemanticType {
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Bool,
    String,
    Bytes,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Json,
    /// A catalog enumeration, by generated name
    Enum(String),
    /// A user override, by Rust type path
    Custom(String),
}

impl SemanticType {
    /// Short type name used in reports (`int`, `string`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Date => "date",
            Self::Time => "time",
            Self::Json => "json",
            Self::Enum(name) => name,
            Self::Custom(path) => path,
        }
    }

    /// Rust spelling, assuming [`SemanticType::imports`] are in scope.
    pub fn rust_type(&self) -> String {
        match self {
            Self::SmallInt => "i16".into(),
            Self::Int => "i32".into(),
            Self::BigInt => "i64".into(),
            Self::Float => "f32".into(),
            Self::Double => "f64".into(),
            Self::Decimal => "Decimal".into(),
            Self::Bool => "bool".into(),
            Self::String => "String".into(),
            Self::Bytes => "Vec<u8>".into(),
            Self::Uuid => "Uuid".into(),
            Self::Timestamp => "NaiveDateTime".into(),
            Self::TimestampTz => "DateTime<Utc>".into(),
            Self::Date => "NaiveDate".into(),
            Self::Time => "NaiveTime".into(),
            Self::Json => "Value".into(),
            Self::Enum(name) => name.clone(),
            Self::Custom(path) => match split_type_path(path) {
                Some((_, name)) => name.to_string(),
                None => path.clone(),
            },
        }
    }

    /// `(module, symbol)` pairs the Rust spelling needs.
    ///
    /// Enums are excluded: their import path belongs to the model.
    pub fn imports(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Decimal => vec![("rust_decimal", "Decimal")],
            Self::Uuid => vec![("uuid", "Uuid")],
            Self::Timestamp => vec![("chrono", "NaiveDateTime")],
            Self::TimestampTz => vec![("chrono", "DateTime"), ("chrono", "Utc")],
            Self::Date => vec![("chrono", "NaiveDate")],
            Self::Time => vec![("chrono", "NaiveTime")],
            Self::Json => vec![("serde_json", "Value")],
            Self::Custom(path) => split_type_path(path).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split `a::b::C` into `("a::b", "C")`. Generic or bare paths stay inline.
fn split_type_path(path: &str) -> Option<(&str, &str)> {
    if path.contains('<') {
        return None;
    }
    path.rsplit_once("::")
}

/// A semantic type with nullability and array flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldType {
    pub base: SemanticType,
    pub nullable: bool,
    pub array: bool,
}

impl FieldType {
    pub fn new(base: SemanticType) -> Self {
        Self {
            base,
            nullable: false,
            array: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    /// Rust spelling with `Vec` and `Option` wrappers applied.
    pub fn rust_type(&self) -> String {
        let mut ty = self.base.rust_type();
        if self.array {
            ty = format!("Vec<{ty}>");
        }
        if self.nullable {
            ty = format!("Option<{ty}>");
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_type_wrapping() {
        assert_eq!(FieldType::new(SemanticType::Int).rust_type(), "i32");
        assert_eq!(
            FieldType::new(SemanticType::String)
                .nullable(true)
                .rust_type(),
            "Option<String>"
        );
        assert_eq!(
            FieldType::new(SemanticType::Uuid)
                .array(true)
                .nullable(true)
                .rust_type(),
            "Option<Vec<Uuid>>"
        );
    }

    #[test]
    fn test_custom_type_paths() {
        let money = SemanticType::Custom("crate::types::Money".into());
        assert_eq!(money.rust_type(), "Money");
        assert_eq!(money.imports(), vec![("crate::types", "Money")]);

        let generic = SemanticType::Custom("std::collections::HashMap<String, i32>".into());
        assert_eq!(generic.rust_type(), "std::collections::HashMap<String, i32>");
        assert!(generic.imports().is_empty());

        let bare = SemanticType::Custom("String".into());
        assert_eq!(bare.rust_type(), "String");
        assert!(bare.imports().is_empty());
    }

    #[test]
    fn test_as_str() {
        assert_eq!(SemanticType::Int.as_str(), "int");
        assert_eq!(SemanticType::String.to_string(), "string");
        assert_eq!(SemanticType::Enum("Status".into()).as_str(), "Status");
    }

    #[test]
    fn test_imports() {
        assert_eq!(
            SemanticType::TimestampTz.imports(),
            vec![("chrono", "DateTime"), ("chrono", "Utc")]
        );
        assert!(SemanticType::Int.imports().is_empty());
        assert!(SemanticType::Enum("Status".into()).imports().is_empty());
    }
}

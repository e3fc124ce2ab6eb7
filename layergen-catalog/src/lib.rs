//! Input types for the layergen code generator.
//!
//! This crate provides the schema catalog and annotated query descriptors
//! produced by an external SQL parser. They are the only inputs the
//! generation engine reads, and it never mutates them.
//!
//! # Architecture
//!
//! ```text
//! schema.sql + queries.sql → SQL parser (external) → CompilerResult (JSON) → layergen-codegen
//! ```
//!
//! The types are designed to be:
//! - Language-agnostic (database type names are kept verbatim)
//! - Order-preserving (every list keeps declaration order)
//! - Self-contained (serde is the only dependency)

mod catalog;
mod query;

use std::path::{Path, PathBuf};

pub use catalog::{Argument, Catalog, Column, Enum, Function, Schema, Table, TableRef};
pub use query::{Parameter, Query};
use serde::{Deserialize, Serialize};

/// Errors raised while loading a compiler result document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Output of the external SQL parser: a catalog snapshot plus every
/// annotated query it found.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompilerResult {
    pub catalog: Catalog,
    #[serde(default)]
    pub queries: Vec<Query>,
}

impl CompilerResult {
    /// Parse a compiler result from a JSON string.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Read and parse a compiler result JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compiler_result() {
        let result = CompilerResult::from_json_str(
            r#"{
                "catalog": {
                    "default_schema": "public",
                    "schemas": [{
                        "name": "public",
                        "tables": [{
                            "name": "posts",
                            "columns": [
                                {"name": "id", "data_type": "serial", "not_null": true, "primary_key": true},
                                {"name": "title", "data_type": "text", "not_null": true}
                            ]
                        }],
                        "enums": [{"name": "status", "values": ["draft", "published"]}]
                    }]
                },
                "queries": [{
                    "name": "GetPostByID",
                    "cmd": ":one",
                    "sql": "SELECT id, title FROM posts WHERE id = $1",
                    "source": "posts.sql",
                    "params": [{"number": 1, "column": {"name": "id", "data_type": "int4", "not_null": true}}],
                    "columns": [
                        {"name": "id", "data_type": "serial", "not_null": true},
                        {"name": "title", "data_type": "text", "not_null": true}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let schema = &result.catalog.schemas[0];
        assert_eq!(schema.tables[0].columns.len(), 2);
        assert!(schema.tables[0].columns[0].primary_key);
        assert!(!schema.tables[0].columns[1].is_array);
        assert_eq!(schema.enums[0].values, vec!["draft", "published"]);
        assert_eq!(result.queries[0].params[0].column.name, "id");
        assert_eq!(result.queries[0].source, "posts.sql");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CompilerResult::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}

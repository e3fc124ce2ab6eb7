//! Annotated query descriptors.

use serde::{Deserialize, Serialize};

use crate::Column;

/// A query as annotated in a source file, e.g.
/// `-- name: GetPostByID :one`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Query {
    /// Method name from the annotation.
    pub name: String,
    /// Command kind as written (`one`, `:many`, ...). Validated by the generator.
    pub cmd: String,
    pub sql: String,
    /// Source unit (file name) the query was declared in.
    pub source: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    /// Result columns in select-list order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Comment lines preceding the annotation.
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A positional query parameter (`$1`, `$2`, ...).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Parameter {
    pub number: u32,
    pub column: Column,
}

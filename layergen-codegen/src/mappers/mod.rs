//! Column type mappers.

pub(crate) mod postgres;

pub use postgres::PostgresTypeMapper;

use crate::model::SemanticType;

/// Maps database type names onto semantic types.
///
/// Implement this trait to support another database engine.
pub trait ColumnTypeMapper {
    /// The database engine name
    fn engine(&self) -> &'static str;

    /// Map a database type name, or `None` if the type is unknown.
    fn map(&self, data_type: &str) -> Option<SemanticType>;
}

//! The generation model: enums, structs and queries built from the catalog.
//!
//! The model is created once by the catalog adapter and read by everything
//! downstream. Nothing after the adapter mutates it.

mod entity;
mod query;
mod types;

use indexmap::IndexSet;

pub use entity::{Enum, EnumConstant, Field, PrimaryKey, Struct, Tag};
pub use query::{CommandKind, Query, Shape, ShapeOrigin, ShapeStruct};
pub use types::{FieldType, SemanticType};

/// Method names the entity layers generate for every table.
pub const CRUD_METHODS: &[&str] = &["find_all", "find_by_id", "create", "update", "delete"];

/// Inherent methods of the generated `Queries` type, unavailable to queries.
pub const QUERIES_METHODS: &[&str] = &["new", "pool"];

/// Module paths of the generated layers.
///
/// Layers are siblings of the model module: with `crate::model`, the
/// repositories live in `crate::repository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPaths {
    pub model: String,
    pub repository: String,
    pub usecase: String,
    pub delivery: String,
}

impl LayerPaths {
    pub fn from_model_module(model_module: &str) -> Self {
        let parent = match model_module.rsplit_once("::") {
            Some((parent, _)) => parent,
            None => "crate",
        };
        Self {
            model: model_module.to_string(),
            repository: format!("{parent}::repository"),
            usecase: format!("{parent}::usecase"),
            delivery: format!("{parent}::delivery"),
        }
    }

    /// Module the query files re-export their structs through.
    pub fn queries(&self) -> String {
        format!("{}::queries", self.repository)
    }
}

/// Everything one run generates from.
#[derive(Debug, Clone)]
pub struct Model {
    pub enums: Vec<Enum>,
    pub structs: Vec<Struct>,
    pub queries: Vec<Query>,
    pub layers: LayerPaths,
    /// Schema whose tables are addressed without a prefix
    pub default_schema: String,
}

impl Model {
    pub fn is_default_schema(&self, schema: &str) -> bool {
        schema.is_empty() || schema == self.default_schema
    }

    pub fn find_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Distinct query sources in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        let sources: IndexSet<&str> = self.queries.iter().map(|q| q.source.as_str()).collect();
        sources.into_iter().collect()
    }

    /// Queries declared in `source`, in declaration order.
    pub fn queries_in(&self, source: &str) -> Vec<&Query> {
        self.queries.iter().filter(|q| q.source == source).collect()
    }

    /// Queries exposed through an entity's repository and use case: those
    /// returning the entity struct whose name does not clash with a CRUD
    /// method.
    pub fn entity_queries<'a>(&'a self, entity: &'a Struct) -> impl Iterator<Item = &'a Query> {
        self.queries.iter().filter(move |q| {
            q.returns_existing(&entity.name) && !CRUD_METHODS.contains(&q.fn_name.as_str())
        })
    }
}

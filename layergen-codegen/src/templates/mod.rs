//! Data-driven template sets.
//!
//! A variant is a `variant.toml` listing one template per kind plus its own
//! `*.hbs` partials. Shared partials (header, imports, model, repository,
//! use case, queries) are available to every variant.

mod registry;
mod variant;

pub use registry::{TemplateRegistry, VARIANT_FILE};
pub use variant::{
    Condition, ImportSpec, Scope, SignatureImports, TemplateKind, TemplateSpec, Variant,
    all_hold, expand,
};

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations. Errors are boxed because every
/// source-carrying variant holds a copy of the file.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// The text of a `layergen.toml` under validation.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    name: String,
    text: String,
}

impl ManifestSource {
    pub fn new(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn named(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.text.clone())
    }

    pub fn toml(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named(),
            span,
            source,
        })
    }

    /// `found` is `None` when the `version` key is absent or empty.
    pub fn version(&self, found: Option<&str>, span: Option<SourceSpan>) -> Box<Error> {
        Box::new(Error::Version {
            src: self.named(),
            span,
            found: found.map(str::to_string),
        })
    }

    pub fn no_packages(&self) -> Box<Error> {
        Box::new(Error::NoPackages { src: self.named() })
    }

    pub fn duplicate_package(&self, name: &str, span: Option<SourceSpan>) -> Box<Error> {
        Box::new(Error::DuplicatePackage {
            src: self.named(),
            span,
            name: name.to_string(),
        })
    }

    /// A name that would be emitted as a Rust identifier but cannot be one.
    pub fn invalid_name(
        &self,
        name: &str,
        kind: String,
        reason: &str,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidName {
            src: self.named(),
            span,
            name: name.to_string(),
            kind,
            reason: reason.to_string(),
        })
    }

    pub fn invalid_setting(&self, message: String, span: Option<SourceSpan>) -> Box<Error> {
        Box::new(Error::InvalidSetting {
            src: self.named(),
            span,
            message,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{}'", path.display())]
    #[diagnostic(help("create a layergen.toml or pass its location with --config"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layergen.toml")]
    #[diagnostic(code(layergen::manifest::parse))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}", version_message(.found))]
    #[diagnostic(
        code(layergen::manifest::version),
        help("set `version = \"1\"` at the top of layergen.toml")
    )]
    Version {
        #[source_code]
        src: NamedSource<String>,
        #[label("unsupported")]
        span: Option<SourceSpan>,
        found: Option<String>,
    },

    #[error("layergen.toml declares no packages")]
    #[diagnostic(
        code(layergen::manifest::no_packages),
        help("add a [[packages]] table with name, input and out")
    )]
    NoPackages {
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("duplicate package '{name}'")]
    #[diagnostic(
        code(layergen::manifest::duplicate_package),
        help("package names select what `layergen generate --package` runs and must be unique")
    )]
    DuplicatePackage {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared again here")]
        span: Option<SourceSpan>,
        name: String,
    },

    #[error("invalid {kind} '{name}': {reason}")]
    #[diagnostic(
        code(layergen::manifest::invalid_name),
        help("{kind} names end up in generated Rust; use letters, digits and underscores")
    )]
    InvalidName {
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: Option<SourceSpan>,
        name: String,
        kind: String,
        reason: String,
    },

    #[error("{message}")]
    #[diagnostic(code(layergen::manifest::setting))]
    InvalidSetting {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

fn version_message(found: &Option<String>) -> String {
    match found {
        Some(version) => format!("unsupported layergen.toml version '{version}'"),
        None => "layergen.toml has no version".to_string(),
    }
}

use std::{fmt, str::FromStr};

use super::Field;

/// What a query returns, from its `:kind` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    One,
    Many,
    Exec,
    ExecRows,
    ExecResult,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => ":one",
            Self::Many => ":many",
            Self::Exec => ":exec",
            Self::ExecRows => ":execrows",
            Self::ExecResult => ":execresult",
        }
    }

    /// Exec kinds never return rows.
    pub fn is_exec(&self) -> bool {
        matches!(self, Self::Exec | Self::ExecRows | Self::ExecResult)
    }
}

impl FromStr for CommandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(':') {
            "one" => Ok(Self::One),
            "many" => Ok(Self::Many),
            "exec" => Ok(Self::Exec),
            "execrows" => Ok(Self::ExecRows),
            "execresult" => Ok(Self::ExecResult),
            other => Err(format!("unknown command kind ':{other}'")),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a struct-shaped argument or result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOrigin {
    /// Reuses a table struct whose columns match exactly
    Existing,
    /// `<Method>Params` or `<Method>Row`, scoped to one query
    Synthesized,
}

/// A struct used as a query argument or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeStruct {
    pub name: String,
    pub origin: ShapeOrigin,
    pub fields: Vec<Field>,
    /// Module path the struct is reachable through
    pub import_path: String,
}

impl ShapeStruct {
    pub fn is_synthesized(&self) -> bool {
        self.origin == ShapeOrigin::Synthesized
    }
}

/// Argument or result shape of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    None,
    Scalar(Field),
    Struct(ShapeStruct),
}

impl Shape {
    pub fn as_struct(&self) -> Option<&ShapeStruct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Fields carried by the shape, in order.
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::None => &[],
            Self::Scalar(field) => std::slice::from_ref(field),
            Self::Struct(s) => &s.fields,
        }
    }
}

/// A query lowered into the generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Name from the annotation (`GetPostByID`)
    pub method_name: String,
    /// Rust function name (`get_post_by_id`)
    pub fn_name: String,
    /// Name of the SQL text constant (`GET_POST_BY_ID`)
    pub constant_name: String,
    pub command: CommandKind,
    pub sql: String,
    pub arg: Shape,
    pub ret: Shape,
    /// Source unit the query was declared in
    pub source: String,
    pub comments: Vec<String>,
}

impl Query {
    /// Synthesized structs this query owns, argument first.
    pub fn synthesized(&self) -> impl Iterator<Item = &ShapeStruct> {
        [&self.arg, &self.ret]
            .into_iter()
            .filter_map(Shape::as_struct)
            .filter(|s| s.is_synthesized())
    }

    /// Returns true if the query returns the existing struct `name`.
    pub fn returns_existing(&self, name: &str) -> bool {
        self.ret
            .as_struct()
            .is_some_and(|s| !s.is_synthesized() && s.name == name)
    }
}

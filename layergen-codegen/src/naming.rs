//! Identifier resolution.
//!
//! Raw catalog identifiers (`user_id`, `blog_posts`) become generated names
//! (`UserID`, `BlogPost`) through a fixed rule set: split on `_`, title-case
//! each segment, map known acronyms, and let an explicit rename replace the
//! whole result.

use std::collections::BTreeMap;

use layergen_core::to_snake_case;
use layergen_manifest::Settings;

/// Acronyms recognised without any configuration.
const BUILTIN_ACRONYMS: &[(&str, &str)] = &[("id", "ID")];

/// Rust keywords that cannot be used as plain identifiers.
const RUST_RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that are not allowed as raw identifiers.
const NON_RAW: &[&str] = &["crate", "self", "Self", "super"];

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("addresses", "address"),
    ("aliases", "alias"),
    ("analyses", "analysis"),
    ("buses", "bus"),
    ("children", "child"),
    ("courses", "course"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("houses", "house"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("statuses", "status"),
    ("teeth", "tooth"),
    ("vertices", "vertex"),
    ("women", "woman"),
];

/// Resolve a raw identifier with the built-in acronym table.
///
/// An entry in `renames` keyed by `raw` replaces the computed name.
pub fn resolve(raw: &str, renames: &BTreeMap<String, String>) -> String {
    if let Some(name) = renames.get(raw) {
        return name.clone();
    }
    resolve_segments(raw, |segment| {
        BUILTIN_ACRONYMS
            .iter()
            .find(|(word, _)| *word == segment)
            .map(|(_, acronym)| (*acronym).to_string())
    })
}

fn resolve_segments(raw: &str, acronym: impl Fn(&str) -> Option<String>) -> String {
    raw.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if let Some(mapped) = acronym(&segment.to_lowercase()) {
                return mapped;
            }
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Naming rules for one run: the acronym table plus user renames.
#[derive(Debug, Clone)]
pub struct NamingRules {
    acronyms: BTreeMap<String, String>,
    renames: BTreeMap<String, String>,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingRules {
    /// Rules with the built-in acronyms and no renames.
    pub fn new() -> Self {
        Self {
            acronyms: BUILTIN_ACRONYMS
                .iter()
                .map(|(word, acronym)| (word.to_string(), acronym.to_string()))
                .collect(),
            renames: BTreeMap::new(),
        }
    }

    /// Rules extended with the acronyms and renames of `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut rules = Self::new();
        for word in &settings.acronyms {
            rules = rules.with_acronym(word);
        }
        rules.renames = settings.rename.clone();
        rules
    }

    pub fn with_acronym(mut self, word: &str) -> Self {
        self.acronyms
            .insert(word.to_lowercase(), word.to_uppercase());
        self
    }

    pub fn with_rename(mut self, raw: impl Into<String>, name: impl Into<String>) -> Self {
        self.renames.insert(raw.into(), name.into());
        self
    }

    /// Explicit override for `raw`, if any.
    pub fn rename(&self, raw: &str) -> Option<&str> {
        self.renames.get(raw).map(String::as_str)
    }

    /// Resolve `raw` into a generated name.
    pub fn resolve(&self, raw: &str) -> String {
        if let Some(name) = self.rename(raw) {
            return name.to_string();
        }
        resolve_segments(raw, |segment| self.acronyms.get(segment).cloned())
    }

    /// Resolve a table name into a struct name.
    ///
    /// The rename table is consulted for the raw name first, then for the
    /// singular form.
    pub fn struct_name(&self, raw: &str, exact: bool) -> String {
        if let Some(name) = self.rename(raw) {
            return name.to_string();
        }
        if exact {
            self.resolve(raw)
        } else {
            self.resolve(&singularize(raw))
        }
    }
}

/// Singularize the last `_`-separated segment of a table name.
pub fn singularize(raw: &str) -> String {
    let (head, last) = match raw.rfind('_') {
        Some(pos) => raw.split_at(pos + 1),
        None => ("", raw),
    };
    format!("{head}{}", singularize_word(last))
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return match_case(word, singular);
    }

    let stem = |n: usize| &word[..word.len() - n];

    if lower.len() > 3 && lower.ends_with("ies") {
        let y = if word.ends_with("IES") { "Y" } else { "y" };
        return format!("{}{y}", stem(3));
    }
    if ["sses", "xes", "ches", "shes", "zes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return stem(2).to_string();
    }
    if ["ss", "us", "is"].iter().any(|suffix| lower.ends_with(suffix)) {
        return word.to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') {
        return stem(1).to_string();
    }
    word.to_string()
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().all(|c| !c.is_lowercase()) {
        replacement.to_uppercase()
    } else if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

/// Returns true if `name` is a Rust keyword.
pub fn is_reserved(name: &str) -> bool {
    RUST_RESERVED.contains(&name)
}

/// Make `name` usable as a Rust identifier (`type` becomes `r#type`).
pub fn escape_ident(name: &str) -> String {
    if NON_RAW.contains(&name) {
        format!("{name}_")
    } else if is_reserved(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Identifier without a raw prefix, for file and module names.
pub fn plain_ident(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// Snake-case field or function identifier for a raw name.
pub fn field_ident(raw: &str) -> String {
    let snake = to_snake_case(&sanitize(raw));
    let snake = if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{snake}")
    } else {
        snake
    };
    escape_ident(&snake)
}

/// Replace characters that cannot appear in an identifier with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Turn an enum value (`in-progress`, `1st`) into a variant name.
pub fn enum_variant(value: &str, rules: &NamingRules) -> String {
    let name = rules.resolve(&sanitize(value));
    if name.is_empty() {
        "Value".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Value{name}")
    } else {
        name
    }
}

/// Returns true if `name` is a plain identifier: a letter or `_` followed
/// by letters, digits and `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_title_cases_segments() {
        let renames = BTreeMap::new();
        assert_eq!(resolve("posts", &renames), "Posts");
        assert_eq!(resolve("blog_posts", &renames), "BlogPosts");
        assert_eq!(resolve("user_id", &renames), "UserID");
        assert_eq!(resolve("id", &renames), "ID");
        assert_eq!(resolve("__weird__name_", &renames), "WeirdName");
        assert_eq!(resolve("", &renames), "");
    }

    #[test]
    fn test_resolve_rename_replaces_whole_name() {
        let renames = BTreeMap::from([("posts".to_string(), "Article".to_string())]);
        assert_eq!(resolve("posts", &renames), "Article");
        assert_eq!(resolve("post_id", &renames), "PostID");
    }

    #[test]
    fn test_resolve_is_pure() {
        let renames = BTreeMap::new();
        let first = resolve("author_id", &renames);
        let second = resolve("author_id", &renames);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extended_acronyms() {
        let rules = NamingRules::new().with_acronym("url").with_acronym("API");
        assert_eq!(rules.resolve("avatar_url"), "AvatarURL");
        assert_eq!(rules.resolve("api_key"), "APIKey");
        assert_eq!(rules.resolve("user_id"), "UserID");
    }

    #[test]
    fn test_struct_name_singularizes() {
        let rules = NamingRules::new();
        assert_eq!(rules.struct_name("posts", false), "Post");
        assert_eq!(rules.struct_name("categories", false), "Category");
        assert_eq!(rules.struct_name("statuses", false), "Status");
        assert_eq!(rules.struct_name("blog_posts", false), "BlogPost");
        assert_eq!(rules.struct_name("posts", true), "Posts");
    }

    #[test]
    fn test_struct_name_rename_checked_before_and_after_singularizing() {
        let rules = NamingRules::new()
            .with_rename("posts", "Article")
            .with_rename("comment", "Remark");
        assert_eq!(rules.struct_name("posts", false), "Article");
        assert_eq!(rules.struct_name("comments", false), "Remark");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("posts"), "post");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("data"), "data");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("user_roles"), "user_role");
        assert_eq!(singularize("Users"), "User");
        assert_eq!(singularize("s"), "s");
    }

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("type"), "r#type");
        assert_eq!(escape_ident("match"), "r#match");
        assert_eq!(escape_ident("self"), "self_");
        assert_eq!(escape_ident("title"), "title");
        assert_eq!(plain_ident("r#type"), "type");
    }

    #[test]
    fn test_field_ident() {
        assert_eq!(field_ident("AuthorID"), "author_id");
        assert_eq!(field_ident("created_at"), "created_at");
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("first name"), "first_name");
        assert_eq!(field_ident("2fa"), "_2fa");
    }

    #[test]
    fn test_enum_variant() {
        let rules = NamingRules::new();
        assert_eq!(enum_variant("draft", &rules), "Draft");
        assert_eq!(enum_variant("in-progress", &rules), "InProgress");
        assert_eq!(enum_variant("1st", &rules), "Value1st");
        assert_eq!(enum_variant("", &rules), "Value");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("GetPostByID"));
        assert!(is_valid_identifier("_private"));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("get-post"));
        assert!(!is_valid_identifier(""));
    }
}

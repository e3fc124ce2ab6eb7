//! Source validation of rendered text.

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by layergen. DO NOT EDIT.\n\n";

/// Parse `text` as a Rust source file and pretty-print it.
///
/// Returns the parser message on failure.
pub fn format_source(text: &str) -> Result<String, String> {
    let file = syn::parse_file(text).map_err(|e| e.to_string())?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_valid_source() {
        let formatted = format_source("pub struct Post{pub id:i32,}").unwrap();
        assert_eq!(formatted, "pub struct Post {\n    pub id: i32,\n}\n");
    }

    #[test]
    fn test_keeps_doc_comments() {
        let formatted = format_source("//! Post model.\n/// A post.\npub struct Post;").unwrap();
        assert!(formatted.starts_with("//! Post model.\n"));
        assert!(formatted.contains("/// A post.\npub struct Post;"));
    }

    #[test]
    fn test_rejects_invalid_source() {
        assert!(format_source("pub struct Post {").is_err());
        assert!(format_source("fn main() { let = 1; }").is_err());
    }
}

//! Handlebars helpers available to every template.

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};

/// `{{doc text}}` renders `text` as `///` lines; `{{doc text inner=true}}`
/// as `//!` lines. A null or empty text renders nothing.
pub fn doc_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    let inner = h
        .hash_get("inner")
        .and_then(|v| v.value().as_bool())
        .unwrap_or(false);
    let marker = if inner { "//!" } else { "///" };

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.write(marker)?;
        } else {
            out.write(&format!("{marker} {line}"))?;
        }
        out.write("\n")?;
    }
    Ok(())
}

/// `{{join items ", "}}` joins an array of strings.
pub fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");
    if let Some(items) = h.param(0).and_then(|v| v.value().as_array()) {
        let items: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
        out.write(&items.join(separator))?;
    }
    Ok(())
}

/// Register every helper on `handlebars`.
pub fn register(handlebars: &mut Handlebars) {
    handlebars.register_helper("doc", Box::new(doc_helper));
    handlebars.register_helper("join", Box::new(join_helper));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn handlebars() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        register(&mut handlebars);
        handlebars
    }

    #[test]
    fn test_doc() {
        let hb = handlebars();
        let out = hb
            .render_template("{{doc text}}", &json!({"text": "A post.\n\nWith <html>."}))
            .unwrap();
        assert_eq!(out, "/// A post.\n///\n/// With <html>.\n");

        let out = hb
            .render_template("{{doc text inner=true}}", &json!({"text": "Queries."}))
            .unwrap();
        assert_eq!(out, "//! Queries.\n");

        let out = hb
            .render_template("{{doc text}}", &json!({"text": null}))
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_join() {
        let hb = handlebars();
        let out = hb
            .render_template("{{join items \", \"}}", &json!({"items": ["A", "B"]}))
            .unwrap();
        assert_eq!(out, "A, B");
    }
}

//! Markup lookups shared by the provider extractors
//!
//! Player pages hide their payload in inline scripts, iframes or
//! JSON script nodes. These helpers find them and report a miss as a
//! hard error.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{ResolveError, Result};

/// Finds the first capture of `pattern`, scanning the whole body first
/// and then each `<script>` node's text
///
/// # Errors
/// Returns `Parse` naming `what` if neither scan matches
pub fn find_script_literal(html: &str, pattern: &Regex, what: &str) -> Result<String> {
    if let Some(found) = first_capture(pattern, html) {
        return Ok(found);
    }

    let document = Html::parse_document(html);
    let selector = selector("script")?;

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if let Some(found) = first_capture(pattern, &text) {
            return Ok(found);
        }
    }

    Err(ResolveError::Parse(format!("{} not found", what)))
}

/// Returns the `src` of the first `<iframe>` carrying one
///
/// # Errors
/// Returns `Parse` if the page has no iframe with a non-empty `src`
pub fn first_iframe_src(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = selector("iframe[src]")?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ResolveError::Parse("iframe src not found".to_string()))
}

/// Returns the text of the first `<script type="application/json">` node
///
/// # Errors
/// Returns `Parse` if no such node exists or it is empty
pub fn json_script_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = selector(r#"script[type="application/json"]"#)?;

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| !text.is_empty())
        .ok_or_else(|| ResolveError::Parse("application/json script not found".to_string()))
}

fn first_capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ResolveError::Parse(format!("Invalid selector: {:?}", e)))
}

//! Output filename templates

use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `{name}` placeholders in the configured templates
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid"));

/// Convert a configured template into the fetch tool's `%(field)s` syntax.
///
/// Placeholders named in `values` are substituted locally (made filename-safe
/// and `%`-escaped); every other placeholder is left for the tool to fill.
pub fn to_tool_template(template: &str, values: &[(&str, &str)]) -> String {
    // Literal text must not be read as a tool field
    let escaped = template.replace('%', "%%");
    PLACEHOLDER
        .replace_all(&escaped, |caps: &Captures| {
            let name = &caps[1];
            match values.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => to_safe_component(value).replace('%', "%%"),
                None => format!("%({})s", name),
            }
        })
        .into_owned()
}

/// Join the rendered templates below the download directory.
///
/// The directory is literal text, so its `%` signs are escaped.
pub fn output_template(download_dir: &Path, parts: &[String]) -> String {
    let dir = download_dir.to_string_lossy().replace('%', "%%");
    let mut path = PathBuf::from(dir);
    for part in parts.iter().filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path.to_string_lossy().into_owned()
}

/// Replace characters that are invalid in file names
pub fn to_safe_component(value: &str) -> String {
    let safe: String = value
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = safe.trim_matches(|c: char| c == '.' || c == ' ');
    if safe.is_empty() {
        "_".to_string()
    } else {
        safe.to_string()
    }
}

//! Line-level heuristics over document text.
//!
//! Nothing here parses RDF. The buffer being edited is usually incomplete, so the
//! scanner works on characters and regular expressions only:
//!
//! - [`term_at`] finds the identifier (CURIE or bare name) touching a column.
//! - [`declared_prefixes`] collects prefix bindings from the top of a buffer, across
//!   Turtle/SPARQL, RDF/XML, RDFa and JSON-LD declaration forms.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of leading lines searched for namespace declarations.
///
/// Documents are expected to declare their prefixes near the top. Declarations further
/// down are ignored by completion and by definition lookup alike.
pub const MAX_LINE_SCAN: usize = 80;

/// Prefix declarations in any of the supported syntaxes:
///
/// - `@prefix pfx: <ns>` and `PREFIX pfx: <ns>` (keyword case-insensitive)
/// - `xmlns:pfx="ns"` and `xmlns="ns"` (the latter binds the empty prefix)
/// - `"@vocab": "ns"` and `vocab="ns"` (empty prefix), `"pfx": "ns"` in a JSON-LD context
static NS_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:@prefix\s+|xmlns:?|vocab|(?i:prefix)\s+|")(?:@vocab|(?<prefix>\w*))"?\s*[:=]\s*[<"'](?<namespace>.+?)[>"']"#,
    )
    .unwrap()
});

/// ASCII only: `[A-Za-z0-9:_-]`.
fn is_term_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_')
}

/// Returns the run of term characters (ASCII letters, digits, `-`, `_`, `:`) that
/// covers the character at `offset`.
///
/// `offset` counts characters, not bytes. The character at `offset` is part of the scan,
/// so `None` is returned when it is outside the term class or past the end of the line.
pub fn term_at(line: &str, offset: usize) -> Option<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let (_, at) = *chars.get(offset)?;
    if !is_term_char(at) {
        return None;
    }

    let start = chars[..offset]
        .iter()
        .rposition(|(_, c)| !is_term_char(*c))
        .map_or(0, |i| i + 1);
    let end = chars[offset..]
        .iter()
        .position(|(_, c)| !is_term_char(*c))
        .map_or(chars.len(), |i| offset + i);

    let start_byte = chars[start].0;
    let end_byte = chars.get(end).map_or(line.len(), |(byte, _)| *byte);

    Some(&line[start_byte..end_byte])
}

/// All `(prefix, namespace)` declarations found on a single line, in order.
///
/// The empty prefix stands for a default vocabulary (`xmlns="..."`, `@vocab`).
pub fn line_prefixes(line: &str) -> Vec<(String, String)> {
    NS_DECL_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let prefix = caps.name("prefix").map_or("", |m| m.as_str());
            let namespace = caps.name("namespace")?.as_str();
            Some((prefix.to_string(), namespace.to_string()))
        })
        .collect()
}

/// Prefix bindings declared within the first [`MAX_LINE_SCAN`] lines of `buffer`.
///
/// A later declaration of the same prefix replaces the earlier namespace but keeps the
/// position where the prefix was first declared.
pub fn declared_prefixes<S: AsRef<str>>(buffer: &[S]) -> IndexMap<String, String> {
    buffer
        .iter()
        .take(MAX_LINE_SCAN)
        .flat_map(|line| line_prefixes(line.as_ref()))
        .collect()
}

/// Namespace bound to `prefix` in the buffer, if any.
pub fn expand_prefix<S: AsRef<str>>(buffer: &[S], prefix: &str) -> Option<String> {
    declared_prefixes(buffer).swap_remove(prefix)
}

/// First prefix the buffer binds to `namespace`.
pub fn prefix_for<S: AsRef<str>>(buffer: &[S], namespace: &str) -> Option<String> {
    declared_prefixes(buffer)
        .into_iter()
        .find(|(_, ns)| ns == namespace)
        .map(|(pfx, _)| pfx)
}

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};
use tracing::debug;

use crate::config::Settings;
use crate::rdf::syntax::{ParseError, RdfSyntax, SourceFormat};

/// First syntax error of a document, zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub line: usize,
    pub character: usize,
    pub message: String,
}

/// Parses the whole buffer in the grammar of `language`.
///
/// Languages without a grammar (SPARQL, RDFa, anything unknown) are never
/// reported on. An error without a location points past the end of the buffer.
pub fn check<S: AsRef<str>>(
    syntax: &dyn RdfSyntax,
    buffer: &[S],
    language: Option<&str>,
    base_iri: Option<&str>,
) -> Option<SyntaxIssue> {
    let format = language.and_then(SourceFormat::from_language_id)?;
    if !format.is_parseable() {
        return None;
    }

    let data = buffer
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    match syntax.parse(data.as_bytes(), format, base_iri) {
        Ok(_) => None,
        Err(ParseError::Syntax {
            message,
            line,
            column,
        }) => {
            let (line, character) = match (line, column) {
                (Some(line), Some(column)) => (line as usize, column as usize),
                _ => end_of(buffer),
            };
            Some(SyntaxIssue {
                line,
                character,
                message,
            })
        }
        Err(err) => {
            debug!("Skipping {format} check: {err}");
            None
        }
    }
}

fn end_of<S: AsRef<str>>(buffer: &[S]) -> (usize, usize) {
    match buffer.last() {
        Some(last) => (buffer.len() - 1, last.as_ref().chars().count()),
        None => (0, 0),
    }
}

pub fn diagnostics<S: AsRef<str>>(
    syntax: &dyn RdfSyntax,
    settings: &Settings,
    buffer: &[S],
    language: Option<&str>,
    uri: &Url,
) -> Option<Vec<Diagnostic>> {
    if !settings.diagnostics {
        return None;
    }

    let issue = check(syntax, buffer, language, Some(uri.as_str()));
    let diags = issue
        .into_iter()
        .map(|issue| {
            let position = Position {
                line: issue.line as u32,
                character: issue.character as u32,
            };
            Diagnostic {
                range: Range {
                    start: position,
                    end: position,
                },
                severity: Some(DiagnosticSeverity::ERROR),
                source: Some("rdflangserver".to_string()),
                message: issue.message,
                ..Default::default()
            }
        })
        .collect();

    Some(diags)
}

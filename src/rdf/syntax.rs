//! RDF grammars, behind the [`RdfSyntax`] capability.
//!
//! The vocabulary cache and the diagnostics pass only need three things from a
//! grammar implementation: parse bytes into triples, guess a format from a name, and
//! write a graph back out in the cache serialization (Turtle).

use std::fmt;
use std::io;
use std::path::Path;

use oxjsonld::{JsonLdParseError, JsonLdParser};
use oxrdf::{GraphNameRef, Quad, Triple};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser, RdfSerializer};

use super::{Subgraph, VocabGraph};

/// Serialization formats a vocabulary source or an edited document may be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Turtle,
    TriG,
    NTriples,
    NQuads,
    N3,
    RdfXml,
    JsonLd,
    /// Attribute-embedded RDF in (X)HTML.
    Rdfa,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "trig" => Some(Self::TriG),
            "nt" | "ntriples" => Some(Self::NTriples),
            "nq" | "nquads" => Some(Self::NQuads),
            "n3" => Some(Self::N3),
            "rdf" | "owl" | "xml" | "rdfs" => Some(Self::RdfXml),
            "jsonld" | "json" => Some(Self::JsonLd),
            "html" | "xhtml" | "htm" => Some(Self::Rdfa),
            _ => None,
        }
    }

    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/turtle" | "application/x-turtle" => Some(Self::Turtle),
            "application/trig" => Some(Self::TriG),
            "application/n-triples" => Some(Self::NTriples),
            "application/n-quads" => Some(Self::NQuads),
            "text/n3" => Some(Self::N3),
            "application/rdf+xml" => Some(Self::RdfXml),
            "application/ld+json" => Some(Self::JsonLd),
            "text/html" | "application/xhtml+xml" => Some(Self::Rdfa),
            _ => None,
        }
    }

    /// Format for an editor language id.
    pub fn from_language_id(language: &str) -> Option<Self> {
        match language {
            "turtle" | "ttl" => Some(Self::Turtle),
            "trig" => Some(Self::TriG),
            "ntriples" => Some(Self::NTriples),
            "nquads" => Some(Self::NQuads),
            "n3" | "notation3" => Some(Self::N3),
            "xml" | "rdf" | "rdfxml" => Some(Self::RdfXml),
            "json-ld" | "jsonld" => Some(Self::JsonLd),
            "html" | "xhtml" | "rdfa" => Some(Self::Rdfa),
            _ => None,
        }
    }

    /// Whether [`OxSyntax`] has a grammar for this format.
    pub fn is_parseable(self) -> bool {
        self != Self::Rdfa
    }

    /// Grammars handled by `oxrdfio`; JSON-LD goes through `oxjsonld` instead.
    fn rdf_format(self) -> Option<RdfFormat> {
        match self {
            Self::Turtle => Some(RdfFormat::Turtle),
            Self::TriG => Some(RdfFormat::TriG),
            Self::NTriples => Some(RdfFormat::NTriples),
            Self::NQuads => Some(RdfFormat::NQuads),
            Self::N3 => Some(RdfFormat::N3),
            Self::RdfXml => Some(RdfFormat::RdfXml),
            Self::JsonLd | Self::Rdfa => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Turtle => "Turtle",
            Self::TriG => "TriG",
            Self::NTriples => "N-Triples",
            Self::NQuads => "N-Quads",
            Self::N3 => "N3",
            Self::RdfXml => "RDF/XML",
            Self::JsonLd => "JSON-LD",
            Self::Rdfa => "RDFa",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0} documents cannot be parsed")]
    UnsupportedFormat(SourceFormat),
    /// Positions are zero-based.
    #[error("{message}")]
    Syntax {
        message: String,
        line: Option<u64>,
        column: Option<u64>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<RdfParseError> for ParseError {
    fn from(error: RdfParseError) -> Self {
        match error {
            RdfParseError::Syntax(error) => {
                let start = error.location().map(|location| location.start);
                ParseError::Syntax {
                    message: error.to_string(),
                    line: start.map(|position| position.line),
                    column: start.map(|position| position.column),
                }
            }
            RdfParseError::Io(error) => ParseError::Io(error),
        }
    }
}

impl From<JsonLdParseError> for ParseError {
    fn from(error: JsonLdParseError) -> Self {
        match error {
            JsonLdParseError::Syntax(error) => {
                let start = error.location().map(|location| location.start);
                ParseError::Syntax {
                    message: error.to_string(),
                    line: start.map(|position| position.line),
                    column: start.map(|position| position.column),
                }
            }
            JsonLdParseError::Io(error) => ParseError::Io(error),
        }
    }
}

/// Grammar capability consumed by the cache and the diagnostics pass.
pub trait RdfSyntax: Send + Sync {
    /// Parses a whole document; quads are flattened into their triples.
    fn parse(
        &self,
        data: &[u8],
        format: SourceFormat,
        base_iri: Option<&str>,
    ) -> Result<VocabGraph, ParseError>;

    /// Guesses a format from the extension of a path or URL.
    fn detect_format(&self, identifier: &str) -> Option<SourceFormat> {
        let path = identifier.split(['#', '?']).next().unwrap_or(identifier);
        let extension = Path::new(path).extension()?.to_str()?;
        SourceFormat::from_extension(extension)
    }

    /// Writes `graph` in the cache serialization.
    fn serialize(&self, graph: &dyn Subgraph) -> Result<Vec<u8>, ParseError>;
}

/// [`RdfSyntax`] backed by the oxigraph parsers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxSyntax;

impl RdfSyntax for OxSyntax {
    fn parse(
        &self,
        data: &[u8],
        format: SourceFormat,
        base_iri: Option<&str>,
    ) -> Result<VocabGraph, ParseError> {
        if format == SourceFormat::JsonLd {
            return parse_json_ld(data, base_iri);
        }
        let rdf_format = format
            .rdf_format()
            .ok_or(ParseError::UnsupportedFormat(format))?;

        let parser = match base_iri {
            Some(base) => match RdfParser::from_format(rdf_format).with_base_iri(base) {
                Ok(parser) => parser,
                Err(error) => {
                    tracing::debug!("Ignoring base IRI <{base}>: {error}");
                    RdfParser::from_format(rdf_format)
                }
            },
            None => RdfParser::from_format(rdf_format),
        };

        collect_triples(parser.for_reader(data))
    }

    fn serialize(&self, graph: &dyn Subgraph) -> Result<Vec<u8>, ParseError> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle).for_writer(Vec::new());
        for triple in graph.triples() {
            serializer.serialize_quad(triple.as_ref().in_graph(GraphNameRef::DefaultGraph))?;
        }
        Ok(serializer.finish()?)
    }
}

/// Remote `@context` documents are not dereferenced.
fn parse_json_ld(data: &[u8], base_iri: Option<&str>) -> Result<VocabGraph, ParseError> {
    let parser = match base_iri {
        Some(base) => match JsonLdParser::new().with_base_iri(base) {
            Ok(parser) => parser,
            Err(error) => {
                tracing::debug!("Ignoring base IRI <{base}>: {error}");
                JsonLdParser::new()
            }
        },
        None => JsonLdParser::new(),
    };

    collect_triples(parser.for_reader(data))
}

fn collect_triples<E>(quads: impl Iterator<Item = Result<Quad, E>>) -> Result<VocabGraph, ParseError>
where
    ParseError: From<E>,
{
    let mut graph = VocabGraph::new();
    for quad in quads {
        let quad = quad?;
        graph.insert(Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

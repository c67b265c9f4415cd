//! Graph model shared by the vocabulary cache and the term index.
//!
//! Vocabulary graphs are small, so a context is a plain insertion-ordered set of
//! [`Triple`]s. Consumers only ever see them through the [`Subgraph`] capability.

pub mod fetch;
pub mod syntax;

use indexmap::IndexSet;
use oxrdf::{NamedNode, NamedNodeRef, Subject, Term, Triple};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A queryable set of triples: a whole parsed document or one context of the
/// aggregate store, callers cannot tell which.
pub trait Subgraph {
    fn triples(&self) -> Box<dyn Iterator<Item = &Triple> + '_>;

    /// Objects of all `subject predicate ?o` triples, in insertion order.
    fn values<'a>(
        &'a self,
        subject: NamedNodeRef<'a>,
        predicate: NamedNodeRef<'a>,
    ) -> Box<dyn Iterator<Item = &'a Term> + 'a> {
        Box::new(self.triples().filter_map(move |triple| {
            let is_subject = matches!(&triple.subject, Subject::NamedNode(node) if node.as_ref() == subject);
            (is_subject && triple.predicate.as_ref() == predicate).then_some(&triple.object)
        }))
    }

    fn value<'a>(
        &'a self,
        subject: NamedNodeRef<'a>,
        predicate: NamedNodeRef<'a>,
    ) -> Option<&'a Term> {
        self.values(subject, predicate).next()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabGraph {
    triples: IndexSet<Triple>,
}

impl VocabGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn clear(&mut self) {
        self.triples.clear()
    }
}

impl Extend<Triple> for VocabGraph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter)
    }
}

impl IntoIterator for VocabGraph {
    type Item = Triple;
    type IntoIter = indexmap::set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for VocabGraph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Subgraph for VocabGraph {
    fn triples(&self) -> Box<dyn Iterator<Item = &Triple> + '_> {
        Box::new(self.triples.iter())
    }
}

/// Result of cutting an IRI into namespace and local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitIri<'a> {
    Split { namespace: &'a str, local: &'a str },
    /// Relative, malformed, or without a trailing name (e.g. ending in `/` or `#`).
    Unsplit,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}')
}

/// Splits `iri` before the longest trailing XML name.
///
/// `http://xmlns.com/foaf/0.1/name` splits into `http://xmlns.com/foaf/0.1/` and
/// `name`; `http://example.org/2000/v1` splits into `http://example.org/2000/` and
/// `v1` since a name cannot start with a digit.
pub fn split_iri(iri: &str) -> SplitIri<'_> {
    if !iri.contains(':') {
        return SplitIri::Unsplit;
    }

    let tail_start = iri
        .char_indices()
        .rev()
        .find(|(_, c)| !is_name_char(*c))
        .map_or(0, |(i, c)| i + c.len_utf8());

    let Some(local_start) = iri[tail_start..]
        .char_indices()
        .find(|(_, c)| is_name_start(*c))
        .map(|(i, _)| tail_start + i)
    else {
        return SplitIri::Unsplit;
    };

    if local_start == 0 {
        return SplitIri::Unsplit;
    }

    SplitIri::Split {
        namespace: &iri[..local_start],
        local: &iri[local_start..],
    }
}

/// Named subjects of the graph, first occurrence order.
pub fn named_subjects(graph: &(impl Subgraph + ?Sized)) -> IndexSet<&NamedNode> {
    graph
        .triples()
        .filter_map(|triple| match &triple.subject {
            Subject::NamedNode(node) => Some(node),
            _ => None,
        })
        .collect()
}

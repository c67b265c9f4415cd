//! Per-namespace term index.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{NamedNode, Subject, Term};
use tracing::{debug, trace};

use crate::cache::{VocabError, VocabularyCache};
use crate::rdf::{split_iri, SplitIri, Subgraph};

/// A term defined by a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermInfo {
    pub iri: NamedNode,
    /// First `rdf:type` of the term.
    pub kind: Option<NamedNode>,
    /// First `rdfs:comment` of the term.
    pub comment: Option<String>,
}

/// Local name → term, in first-seen order.
pub type VocabTerms = IndexMap<String, TermInfo>;

/// Memoized term maps, one per namespace.
///
/// A namespace is only remembered once its vocabulary loaded; failures are retried
/// on the next request.
#[derive(Debug, Default)]
pub struct VocabularyIndex {
    namespaces: HashMap<String, VocabTerms>,
}

impl VocabularyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    pub fn terms_for(
        &mut self,
        cache: &mut VocabularyCache,
        namespace: &str,
    ) -> Result<&VocabTerms, VocabError> {
        if !self.namespaces.contains_key(namespace) {
            let loaded = cache.load(namespace)?;
            let terms = collect_vocab_terms(loaded.graph, namespace);
            debug!(
                "Indexed {} terms of <{namespace}> ({:?})",
                terms.len(),
                loaded.origin
            );
            self.namespaces.insert(namespace.to_string(), terms);
        }

        Ok(self.namespaces.entry(namespace.to_string()).or_default())
    }
}

/// Terms of `namespace` defined in `graph`.
///
/// A term is any named subject with an `rdf:type` or `rdfs:isDefinedBy` whose IRI
/// splits into exactly `namespace` and a non-empty local name.
pub fn collect_vocab_terms(graph: &(impl Subgraph + ?Sized), namespace: &str) -> VocabTerms {
    let mut subjects: IndexSet<&NamedNode> = IndexSet::new();
    let mut kinds: HashMap<&NamedNode, &NamedNode> = HashMap::new();
    let mut comments: HashMap<&NamedNode, &str> = HashMap::new();

    for triple in graph.triples() {
        let Subject::NamedNode(subject) = &triple.subject else {
            continue;
        };
        let predicate = triple.predicate.as_ref();

        if predicate == rdf::TYPE {
            subjects.insert(subject);
            if let Term::NamedNode(kind) = &triple.object {
                kinds.entry(subject).or_insert(kind);
            }
        } else if predicate == rdfs::IS_DEFINED_BY {
            subjects.insert(subject);
        } else if predicate == rdfs::COMMENT {
            if let Term::Literal(comment) = &triple.object {
                comments.entry(subject).or_insert(comment.value());
            }
        }
    }

    let mut terms = VocabTerms::new();
    for subject in subjects {
        match split_iri(subject.as_str()) {
            SplitIri::Split { namespace: ns, local } if ns == namespace && !local.is_empty() => {
                terms.entry(local.to_string()).or_insert_with(|| TermInfo {
                    iri: subject.clone(),
                    kind: kinds.get(subject).map(|kind| (*kind).clone()),
                    comment: comments.get(subject).map(|comment| comment.to_string()),
                });
            }
            SplitIri::Split { .. } => {}
            SplitIri::Unsplit => trace!("Skipping unsplittable <{}>", subject.as_str()),
        }
    }

    terms
}

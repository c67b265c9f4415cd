//! Shared test utilities for rdflangserver.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::cache::VocabularyCache;
use crate::completion::CompletionEngine;
use crate::prefixes::{PrefixRegistry, PREFIX_URI_TEMPLATE};
use crate::rdf::fetch::{Fetch, FetchError, Fetched};
use crate::rdf::syntax::OxSyntax;

pub const VOCAB_NS: &str = "http://example.org/vocab#";

/// A small vocabulary with a class, two properties, a term only declared through
/// `rdfs:isDefinedBy`, the ontology resource itself, and one foreign term.
pub const VOCAB_TTL: &str = r#"@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/vocab#> .

ex: a owl:Ontology .

ex:Book a rdfs:Class ;
    rdfs:comment "A written work." .

ex:title a rdf:Property ;
    rdfs:comment "The name of a work." ;
    rdfs:domain ex:Book .

ex:author a owl:ObjectProperty .

ex:Draft rdfs:isDefinedBy ex: .

<http://example.org/other#Thing> a rdfs:Class .
"#;

/// In-memory [`Fetch`] implementation. Unknown locations fail like an unreachable
/// host; every request is recorded.
#[derive(Default)]
pub struct StubFetcher {
    documents: HashMap<String, Fetched>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: &str, body: &str, content_type: Option<&str>) -> Self {
        self.documents.insert(
            location.to_string(),
            Fetched {
                body: body.as_bytes().to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    /// Locations requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for StubFetcher {
    fn fetch(&self, location: &str) -> Result<Fetched, FetchError> {
        self.requests.lock().unwrap().push(location.to_string());
        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| FetchError::Http {
                url: location.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

/// Creates a temporary cache directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the cache subdirectory
pub fn create_test_cache_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_dir = temp_dir.path().join("rdf-graph-cache");
    std::fs::create_dir(&cache_dir).expect("Failed to create cache subdirectory");
    (temp_dir, cache_dir)
}

/// A [`VocabularyCache`] over `cache_dir` that fetches through `fetcher`.
pub fn test_cache(cache_dir: PathBuf, fetcher: Arc<StubFetcher>) -> VocabularyCache {
    VocabularyCache::new(cache_dir, Arc::new(OxSyntax), fetcher)
}

/// A [`CompletionEngine`] whose cache and prefix registry both live in `cache_dir`
/// and share `fetcher`.
///
/// # Example
///
/// ```ignore
/// use crate::test_utils::*;
///
/// let (_temp_dir, cache_dir) = create_test_cache_dir();
/// let fetcher = Arc::new(StubFetcher::new().with_document(VOCAB_NS, VOCAB_TTL, None));
/// let mut engine = test_engine(cache_dir, fetcher);
/// ```
pub fn test_engine(cache_dir: PathBuf, fetcher: Arc<StubFetcher>) -> CompletionEngine {
    let prefixes = PrefixRegistry::new(
        Some(cache_dir.join("prefixes.ttl")),
        PREFIX_URI_TEMPLATE,
        fetcher.clone(),
    );
    CompletionEngine::new(test_cache(cache_dir, fetcher), prefixes, true)
}

//! Vocabulary graph cache.
//!
//! Resolves a namespace or source identifier to a parsed graph through three layers:
//!
//! 1. the in-process context store (one context per identifier),
//! 2. a Turtle serialization on disk, named by percent-encoding the identifier,
//! 3. a fetch-and-parse of the source itself, which also fills layer 2.
//!
//! Local vocabulary files bypass layers 2 and 3 and are re-parsed whenever their
//! modification time moves forward.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

use crate::rdf::fetch::{Fetch, FetchError, Fetched};
use crate::rdf::syntax::{ParseError, RdfSyntax, SourceFormat};
use crate::rdf::VocabGraph;

/// Extension of the on-disk serializations.
pub const CACHE_EXTENSION: &str = ".ttl";

/// Well-known namespaces served more efficiently from another document.
pub const VOCAB_SOURCE_MAP: &[(&str, &str)] = &[
    (
        "http://schema.org/",
        "https://schema.org/version/latest/schemaorg-current-http.ttl",
    ),
    (
        "https://schema.org/",
        "https://schema.org/version/latest/schemaorg-current-https.ttl",
    ),
];

/// Where a loaded graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// A local file was (re-)parsed.
    Parsed,
    /// The context was already populated in this session.
    Context,
    /// Read back from the on-disk cache.
    DiskCache,
    /// Fetched from its source and written to the on-disk cache.
    Fetched,
}

#[derive(Debug, Clone, Copy)]
pub struct Loaded<'a> {
    pub origin: LoadOrigin,
    pub graph: &'a VocabGraph,
}

#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not parse <{identifier}>: {source}")]
    Parse {
        identifier: String,
        #[source]
        source: ParseError,
    },
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn default_cache_dir() -> PathBuf {
    let cache_home = env::var("XDG_CACHE_HOME")
        .unwrap_or_else(|_| shellexpand::tilde("~/.cache").into_owned());
    PathBuf::from(cache_home).join("rdf-graph-cache")
}

/// Cache directories in search order.
pub fn cache_dir_candidates() -> Vec<PathBuf> {
    let explicit = env::var("RDF_GRAPH_CACHE")
        .unwrap_or_else(|_| shellexpand::tilde("~/.rdf-graph-cache").into_owned());
    vec![
        PathBuf::from(explicit),
        default_cache_dir(),
        PathBuf::from("/usr/local/share/rdf-graph-cache"),
    ]
}

/// First existing candidate directory, or the per-user default, created on demand.
pub fn find_rdf_graph_cache_dir() -> io::Result<PathBuf> {
    if let Some(dir) = cache_dir_candidates().into_iter().find(|dir| dir.is_dir()) {
        return Ok(dir);
    }
    let dir = default_cache_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `configured` (tilde-expanded, created if missing) or the discovered directory when
/// empty.
pub fn resolve_cache_dir(configured: &str) -> io::Result<PathBuf> {
    if configured.is_empty() {
        return find_rdf_graph_cache_dir();
    }
    let dir = PathBuf::from(shellexpand::tilde(configured).into_owned());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File name of the cached serialization of `identifier`.
pub fn cache_file_name(identifier: &str) -> String {
    format!("{}{CACHE_EXTENSION}", urlencoding::encode(identifier))
}

/// Document to fetch for `identifier`.
pub fn source_for(identifier: &str) -> &str {
    VOCAB_SOURCE_MAP
        .iter()
        .find(|(namespace, _)| *namespace == identifier)
        .map_or(identifier, |(_, source)| *source)
}

fn local_context_id(path: &Path) -> String {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&path)
        .map(String::from)
        .unwrap_or_else(|_| path.display().to_string())
}

pub struct VocabularyCache {
    cache_dir: PathBuf,
    syntax: Arc<dyn RdfSyntax>,
    fetcher: Arc<dyn Fetch>,
    contexts: HashMap<String, VocabGraph>,
    mtimes: HashMap<String, SystemTime>,
}

impl VocabularyCache {
    pub fn new(cache_dir: PathBuf, syntax: Arc<dyn RdfSyntax>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            cache_dir,
            syntax,
            fetcher,
            contexts: HashMap::new(),
            mtimes: HashMap::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn syntax(&self) -> &dyn RdfSyntax {
        self.syntax.as_ref()
    }

    /// Where the serialization of `identifier` is (or would be) stored.
    pub fn cache_path(&self, identifier: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(identifier))
    }

    /// The populated context for `identifier`, without loading anything.
    pub fn context(&self, context_id: &str) -> Option<&VocabGraph> {
        self.contexts.get(context_id)
    }

    /// Loads the graph for a namespace URI, source URL or local file path.
    ///
    /// Errors mean the vocabulary is unavailable; nothing is cached for it.
    pub fn load(&mut self, identifier: &str) -> Result<Loaded<'_>, VocabError> {
        let path = Path::new(identifier);
        if path.is_file() {
            return self.load_local(path);
        }

        if self
            .contexts
            .get(identifier)
            .is_some_and(|graph| !graph.is_empty())
        {
            debug!("Using context <{identifier}>");
            return Ok(self.loaded(identifier, LoadOrigin::Context));
        }

        let cache_path = self.cache_path(identifier);
        if fs::metadata(&cache_path).is_ok_and(|meta| meta.len() > 0) {
            debug!(
                "Load local copy of <{identifier}> from '{}'",
                cache_path.display()
            );
            let data = fs::read(&cache_path).map_err(|source| VocabError::Io {
                path: cache_path.clone(),
                source,
            })?;
            let graph = self.parse(identifier, &data, SourceFormat::Turtle, identifier)?;
            self.replace_context(identifier, graph);
            return Ok(self.loaded(identifier, LoadOrigin::DiskCache));
        }

        let source = source_for(identifier);
        debug!("Fetching <{source}> to '{}'", cache_path.display());
        let fetched = self.fetcher.fetch(source)?;
        let format = self.source_format(source, &fetched);
        let graph = self.parse(identifier, &fetched.body, format, source)?;

        if let Err(err) = self.write_cache(&cache_path, &graph) {
            warn!("Could not cache <{identifier}> in '{}': {err}", cache_path.display());
        }
        self.replace_context(identifier, graph);

        Ok(self.loaded(identifier, LoadOrigin::Fetched))
    }

    fn load_local(&mut self, path: &Path) -> Result<Loaded<'_>, VocabError> {
        let io_error = |source| VocabError::Io {
            path: path.to_path_buf(),
            source,
        };
        let context_id = local_context_id(path);
        let mtime = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(io_error)?;

        let is_stale = self
            .mtimes
            .get(&context_id)
            .map_or(true, |last| *last < mtime);
        if !is_stale {
            debug!("Using context <{context_id}>");
            return Ok(self.loaded(&context_id, LoadOrigin::Context));
        }

        debug!("Parse file: '{}'", path.display());
        let data = fs::read(path).map_err(io_error)?;
        let identifier = path.to_string_lossy();
        let format = self
            .syntax
            .detect_format(&identifier)
            .unwrap_or(SourceFormat::Turtle);
        let graph = self.parse(&identifier, &data, format, &context_id)?;

        self.mtimes.insert(context_id.clone(), mtime);
        self.replace_context(&context_id, graph);

        Ok(self.loaded(&context_id, LoadOrigin::Parsed))
    }

    fn parse(
        &self,
        identifier: &str,
        data: &[u8],
        format: SourceFormat,
        base_iri: &str,
    ) -> Result<VocabGraph, VocabError> {
        self.syntax
            .parse(data, format, Some(base_iri))
            .map_err(|source| VocabError::Parse {
                identifier: identifier.to_string(),
                source,
            })
    }

    /// An HTML-like extension forces RDFa; otherwise the media type wins over the
    /// extension, and Turtle is assumed when neither says anything.
    fn source_format(&self, source: &str, fetched: &Fetched) -> SourceFormat {
        let by_name = self.syntax.detect_format(source);
        if by_name == Some(SourceFormat::Rdfa) {
            return SourceFormat::Rdfa;
        }
        fetched
            .content_type
            .as_deref()
            .and_then(SourceFormat::from_media_type)
            .or(by_name)
            .unwrap_or(SourceFormat::Turtle)
    }

    fn write_cache(&self, cache_path: &Path, graph: &VocabGraph) -> Result<(), ParseError> {
        let data = self.syntax.serialize(graph)?;
        fs::write(cache_path, data)?;
        Ok(())
    }

    /// Drops everything stored under `context_id` before inserting `graph`.
    fn replace_context(&mut self, context_id: &str, graph: VocabGraph) {
        let context = self.contexts.entry(context_id.to_string()).or_default();
        context.clear();
        context.extend(graph);
    }

    fn loaded(&mut self, context_id: &str, origin: LoadOrigin) -> Loaded<'_> {
        let graph = self.contexts.entry(context_id.to_string()).or_default();
        Loaded { origin, graph }
    }
}

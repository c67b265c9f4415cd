//! Persistent prefix → namespace table.
//!
//! The table is seeded with the core RDF bindings, extended from a prefix file on
//! startup, and grows on demand from a per-prefix lookup service (prefix.cc by
//! default). After each successful lookup the whole file is rewritten.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::rdf::fetch::Fetch;
use crate::rdf::{split_iri, SplitIri, OWL_NS, RDFS_NS, RDF_NS, XML_NS, XSD_NS};
use crate::scanner::line_prefixes;

/// Per-prefix lookup document; `{pfx}` is replaced by the prefix.
pub const PREFIX_URI_TEMPLATE: &str = "http://prefix.cc/{pfx}.file.ttl";

const CORE_PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", OWL_NS),
    ("xml", XML_NS),
];

/// Outcome of asking the lookup service about one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixFetch {
    /// Bindings declared by the lookup document (possibly more than the one asked for).
    Resolved(Vec<(String, String)>),
    Unreachable(String),
}

pub struct PrefixRegistry {
    prefix_file: Option<PathBuf>,
    template: String,
    fetcher: Arc<dyn Fetch>,
    table: IndexMap<String, String>,
}

impl PrefixRegistry {
    /// Loads `prefix_file` when it exists. A missing or unreadable file leaves only the
    /// core bindings.
    pub fn new(prefix_file: Option<PathBuf>, template: &str, fetcher: Arc<dyn Fetch>) -> Self {
        let mut table: IndexMap<String, String> = CORE_PREFIXES
            .iter()
            .map(|(pfx, ns)| (pfx.to_string(), ns.to_string()))
            .collect();

        if let Some(path) = prefix_file.as_ref().filter(|path| path.is_file()) {
            match fs::read_to_string(path) {
                Ok(text) => table.extend(text.lines().flat_map(line_prefixes)),
                Err(err) => warn!("Could not read prefixes from '{}': {err}", path.display()),
            }
        }

        Self {
            prefix_file,
            template: template.to_string(),
            fetcher,
            table,
        }
    }

    /// Namespace bound to `prefix`, asking the lookup service on a miss.
    ///
    /// Lookup failures are logged and reported as `None`.
    pub fn lookup(&mut self, prefix: &str) -> Option<String> {
        if let Some(namespace) = self.table.get(prefix) {
            return Some(namespace.clone());
        }
        if prefix.is_empty() {
            return None;
        }

        match self.fetch_namespaces(prefix) {
            PrefixFetch::Resolved(bindings) => {
                self.table.extend(bindings);
                if let Err(err) = self.persist() {
                    warn!("Could not save prefixes: {err}");
                }
            }
            PrefixFetch::Unreachable(reason) => {
                debug!("Could not resolve prefix '{prefix}': {reason}");
            }
        }

        self.table.get(prefix).cloned()
    }

    /// All bindings, in declaration order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table
            .iter()
            .map(|(pfx, ns)| (pfx.as_str(), ns.as_str()))
    }

    /// Bindings whose prefix starts with `start`, in declaration order.
    pub fn namespaces_starting_with<'a>(
        &'a self,
        start: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.namespaces().filter(move |(pfx, _)| pfx.starts_with(start))
    }

    /// First prefix bound to `namespace`.
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.namespaces()
            .find(|(_, ns)| *ns == namespace)
            .map(|(pfx, _)| pfx)
    }

    /// `iri` as `prefix:local` when its namespace has a known prefix, else unchanged.
    pub fn qname(&self, iri: &str) -> String {
        match split_iri(iri) {
            SplitIri::Split { namespace, local } => match self.prefix_for(namespace) {
                Some(pfx) => format!("{pfx}:{local}"),
                None => iri.to_string(),
            },
            SplitIri::Unsplit => iri.to_string(),
        }
    }

    fn fetch_namespaces(&self, prefix: &str) -> PrefixFetch {
        let url = self.template.replace("{pfx}", prefix);
        debug!("Fetching <{url}>");

        let fetched = match self.fetcher.fetch(&url) {
            Ok(fetched) => fetched,
            Err(err) => return PrefixFetch::Unreachable(err.to_string()),
        };
        let text = String::from_utf8_lossy(&fetched.body);
        let bindings: Vec<_> = text.lines().flat_map(line_prefixes).collect();

        if bindings.is_empty() {
            PrefixFetch::Unreachable(format!("<{url}> declares no prefixes"))
        } else {
            PrefixFetch::Resolved(bindings)
        }
    }

    /// Rewrites the prefix file from the table, leaving out the XML namespace.
    fn persist(&self) -> io::Result<()> {
        let Some(path) = &self.prefix_file else {
            return Ok(());
        };
        debug!("Saving prefixes to '{}'", path.display());

        let contents: String = self
            .namespaces()
            .filter(|(_, ns)| *ns != XML_NS)
            .map(|(pfx, ns)| format!("@prefix {pfx}: <{ns}> .\n"))
            .collect();
        fs::write(path, contents)
    }
}

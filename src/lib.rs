//! rdflangserver: vocabulary-aware editing support for RDF documents
//!
//! This crate provides the core of the rdflangserver language server: completion
//! of prefix declarations and vocabulary terms, go-to-definition into cached
//! vocabulary documents, and syntax diagnostics for Turtle, TriG, N3, N-Triples,
//! N-Quads, RDF/XML and JSON-LD.
//!
//! # Overview
//!
//! The edited buffer is never parsed for completion or definition lookups. It is
//! usually incomplete, so all decisions are made from a regex-level scan of its
//! text:
//!
//! - **Prefix registry**: a persistent prefix → namespace table backed by prefix.cc
//! - **Vocabulary cache**: fetched or local vocabularies, parsed once and kept on disk
//! - **Term index**: the names each namespace defines, with type and comment
//! - **Completion**: prefix declarations, `prefix:term` names, bare terms and keywords
//! - **Definition**: the first line of the cached vocabulary that defines a term
//!
//! # Architecture
//!
//! - [`scanner`]: Token and prefix-declaration scanning of raw lines
//! - [`rdf`]: Graph model plus the parsing and fetching capabilities
//! - [`cache`]: The vocabulary cache and its on-disk layout
//! - [`prefixes`]: The prefix registry
//! - [`completion`]: The completion engine and the term index
//! - [`gotodef`]: Definition lookup
//! - [`diagnostics`]: Whole-document syntax checks
//! - [`config`]: Configuration management and settings
//! - [`server`]: The tower-lsp backend and transports
//!
//! # Usage
//!
//! ```ignore
//! use rdflangserver::completion::CompletionEngine;
//! use rdflangserver::config::Settings;
//!
//! let settings = Settings::default();
//! let cache_dir = rdflangserver::cache::resolve_cache_dir(&settings.cache_dir)?;
//! let mut engine = CompletionEngine::from_settings(&settings, cache_dir);
//! let completions = engine.get_completions(&lines, line, character, Some("turtle"));
//! ```

// Text scanning and graph model
pub mod rdf;
pub mod scanner;

// Vocabulary and prefix state
pub mod cache;
pub mod prefixes;

// LSP feature modules
pub mod completion;
pub mod diagnostics;
pub mod gotodef;

// Configuration and transport
pub mod config;
pub mod server;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;

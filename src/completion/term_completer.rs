use indexmap::IndexMap;
use itertools::Itertools;
use tracing::warn;

use crate::scanner::{declared_prefixes, expand_prefix};

use super::index::VocabTerms;
use super::keywords::keywords_for;
use super::{split_token, Completer, Completion, CompletionEngine, Context};

/// Looks up the terms of `namespace`; an unavailable vocabulary has none.
fn terms_or_none<'e>(engine: &'e mut CompletionEngine, namespace: &str) -> Option<&'e VocabTerms> {
    let CompletionEngine { cache, index, .. } = engine;
    index
        .terms_for(cache, namespace)
        .inspect_err(|err| warn!("No completions from <{namespace}>: {err}"))
        .ok()
}

/// `prefix:partial`: terms of the namespace the buffer binds to `prefix`.
pub(super) struct QualifiedTermCompleter<'a> {
    namespace: Option<String>,
    partial: &'a str,
}

impl<'a> Completer<'a> for QualifiedTermCompleter<'a> {
    fn construct(context: Context<'a>) -> Option<Self> {
        if !context.token.contains(':') {
            return None;
        }
        let (prefix, partial) = split_token(context.token);
        let namespace = expand_prefix(context.buffer, prefix);

        Some(Self { namespace, partial })
    }

    fn completions(&self, engine: &mut CompletionEngine) -> Vec<Completion> {
        let Some(namespace) = &self.namespace else {
            return Vec::new();
        };
        let Some(terms) = terms_or_none(engine, namespace) else {
            return Vec::new();
        };
        let matching: Vec<_> = terms
            .iter()
            .filter(|(name, _)| name.starts_with(self.partial))
            .map(|(name, term)| (name.clone(), term.clone()))
            .collect();

        matching
            .into_iter()
            .map(|(name, term)| Completion {
                label: name,
                detail: term
                    .kind
                    .map(|kind| engine.prefixes.qname(kind.as_str())),
                documentation: term.comment,
            })
            .sorted()
            .collect()
    }
}

/// A token without `:`: declared prefixes, terms of the default namespace, keywords.
///
/// A bare token has an empty trailer, so nothing is filtered out; the client narrows
/// the list by what was typed.
pub(super) struct TermCompleter<'a> {
    declared: IndexMap<String, String>,
    language: Option<&'a str>,
}

impl<'a> Completer<'a> for TermCompleter<'a> {
    fn construct(context: Context<'a>) -> Option<Self> {
        if context.token.contains(':') {
            return None;
        }
        Some(Self {
            declared: declared_prefixes(context.buffer),
            language: context.language,
        })
    }

    fn completions(&self, engine: &mut CompletionEngine) -> Vec<Completion> {
        let prefixes = self.declared.keys().sorted().map(|prefix| format!("{prefix}:"));

        let default_terms: Vec<String> = self
            .declared
            .get("")
            .and_then(|namespace| terms_or_none(engine, namespace))
            .map(|terms| terms.keys().cloned().collect())
            .unwrap_or_default();

        let keywords = if engine.keyword_completions {
            keywords_for(self.language)
        } else {
            &[]
        };

        prefixes
            .chain(default_terms)
            .chain(keywords.iter().map(|keyword| keyword.to_string()))
            .map(Completion::new)
            .collect()
    }
}

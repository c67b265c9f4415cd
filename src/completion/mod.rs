use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{VocabError, VocabularyCache};
use crate::config::Settings;
use crate::prefixes::PrefixRegistry;
use crate::rdf::fetch::HttpFetcher;
use crate::rdf::syntax::OxSyntax;
use crate::scanner::term_at;

use self::index::{VocabTerms, VocabularyIndex};
use self::prefix_completer::PrefixDeclarationCompleter;
use self::term_completer::{QualifiedTermCompleter, TermCompleter};

pub mod index;
pub mod keywords;
mod prefix_completer;
mod term_completer;

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Completion {
    /// Text to insert.
    pub label: String,
    pub detail: Option<String>,
    pub documentation: Option<String>,
}

impl Completion {
    pub fn new(label: impl Into<String>) -> Self {
        Completion {
            label: label.into(),
            detail: None,
            documentation: None,
        }
    }
}

/// What a completer gets to look at: the buffer, the cursor line, and the token that
/// ends just before the cursor.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    buffer: &'a [&'a str],
    line: &'a str,
    token: &'a str,
    language: Option<&'a str>,
}

pub trait Completer<'a>: Sized {
    /// `None` when the context is not this completer's mode.
    fn construct(context: Context<'a>) -> Option<Self>;

    fn completions(&self, engine: &mut CompletionEngine) -> Vec<Completion>;
}

/// Splits a token at its first `:`; a token without one has an empty trailer.
fn split_token(token: &str) -> (&str, &str) {
    token.split_once(':').unwrap_or((token, ""))
}

/// Owns the vocabulary cache, the prefix registry and the term index built from them.
pub struct CompletionEngine {
    cache: VocabularyCache,
    prefixes: PrefixRegistry,
    index: VocabularyIndex,
    keyword_completions: bool,
}

impl CompletionEngine {
    pub fn new(cache: VocabularyCache, prefixes: PrefixRegistry, keyword_completions: bool) -> Self {
        CompletionEngine {
            cache,
            prefixes,
            index: VocabularyIndex::new(),
            keyword_completions,
        }
    }

    /// Network-backed engine over `cache_dir`, which also holds the prefix table.
    pub fn from_settings(settings: &Settings, cache_dir: PathBuf) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
            settings.fetch_timeout_secs,
        )));
        let prefixes = PrefixRegistry::new(
            Some(cache_dir.join("prefixes.ttl")),
            &settings.prefix_lookup_template,
            fetcher.clone(),
        );
        let cache = VocabularyCache::new(cache_dir, Arc::new(OxSyntax), fetcher);

        CompletionEngine::new(cache, prefixes, settings.keyword_completions)
    }

    pub fn cache(&self) -> &VocabularyCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut VocabularyCache {
        &mut self.cache
    }

    pub fn prefixes(&self) -> &PrefixRegistry {
        &self.prefixes
    }

    pub fn prefixes_mut(&mut self) -> &mut PrefixRegistry {
        &mut self.prefixes
    }

    /// Terms defined in `namespace`, loading its vocabulary on first use.
    pub fn vocab_terms(&mut self, namespace: &str) -> Result<&VocabTerms, VocabError> {
        self.index.terms_for(&mut self.cache, namespace)
    }

    /// Completions for the cursor at (`line`, `character`), both zero-based.
    ///
    /// The token considered is the one ending at `character - 1`. Unavailable
    /// vocabularies contribute nothing.
    pub fn get_completions<S: AsRef<str>>(
        &mut self,
        buffer: &[S],
        line: usize,
        character: usize,
        language: Option<&str>,
    ) -> Vec<Completion> {
        let lines: Vec<&str> = buffer.iter().map(AsRef::as_ref).collect();
        let Some(line_text) = lines.get(line).copied() else {
            return Vec::new();
        };
        let token = character
            .checked_sub(1)
            .and_then(|offset| term_at(line_text, offset))
            .unwrap_or("");

        let context = Context {
            buffer: &lines,
            line: line_text,
            token,
            language,
        };

        run_completer::<PrefixDeclarationCompleter>(context, self)
            .or_else(|| run_completer::<QualifiedTermCompleter>(context, self))
            .or_else(|| run_completer::<TermCompleter>(context, self))
            .unwrap_or_default()
    }
}

fn run_completer<'a, T: Completer<'a>>(
    context: Context<'a>,
    engine: &mut CompletionEngine,
) -> Option<Vec<Completion>> {
    let completer = T::construct(context)?;
    Some(completer.completions(engine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_cache_dir, test_engine, StubFetcher, VOCAB_NS, VOCAB_TTL};

    fn labels(completions: &[Completion]) -> Vec<&str> {
        completions.iter().map(|c| c.label.as_str()).collect()
    }

    fn vocab_fetcher() -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::new()
                .with_document(VOCAB_NS, VOCAB_TTL, Some("text/turtle"))
                .with_document(
                    "http://prefix.cc/foaf.file.ttl",
                    "@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n",
                    Some("text/turtle"),
                ),
        )
    }

    #[test]
    fn test_split_token() {
        assert_eq!(split_token("ex:Bo"), ("ex", "Bo"));
        assert_eq!(split_token("ex:"), ("ex", ""));
        assert_eq!(split_token("Bo"), ("Bo", ""));
        assert_eq!(split_token("a:b:c"), ("a", "b:c"));
    }

    mod term_mode {
        use super::*;

        #[test]
        fn test_qualified_terms_sorted_with_detail() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());
            let buffer = [format!("@prefix ex: <{VOCAB_NS}> ."), "<> a ex:".to_string()];

            let completions = engine.get_completions(&buffer, 1, 8, Some("turtle"));
            assert_eq!(labels(&completions), vec!["Book", "Draft", "author", "title"]);

            let book = &completions[0];
            assert_eq!(book.detail.as_deref(), Some("rdfs:Class"));
            assert_eq!(book.documentation.as_deref(), Some("A written work."));
            let draft = &completions[1];
            assert_eq!(draft.detail, None, "Draft has no declared type");
        }

        #[test]
        fn test_qualified_terms_filtered_by_trailer() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());
            let buffer = [format!("@prefix ex: <{VOCAB_NS}> ."), "<> ex:ti".to_string()];

            let completions = engine.get_completions(&buffer, 1, 8, Some("turtle"));
            assert_eq!(labels(&completions), vec!["title"]);
            assert_eq!(completions[0].detail.as_deref(), Some("rdf:Property"));
        }

        #[test]
        fn test_unreachable_vocabulary_yields_nothing() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, Arc::new(StubFetcher::new()));
            let buffer = ["@prefix foo: <http://example.org/foo#> .", "foo:Bar a "];

            let completions = engine.get_completions(&buffer, 1, 10, Some("turtle"));
            assert!(
                completions.iter().all(|c| c.detail.is_none()),
                "No vocabulary terms can be offered"
            );

            let qualified = engine.get_completions(&buffer, 1, 7, Some("turtle"));
            assert!(qualified.is_empty(), "foo:Bar cannot be completed");
        }

        #[test]
        fn test_undeclared_prefix_yields_nothing() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let fetcher = vocab_fetcher();
            let mut engine = test_engine(cache_dir, fetcher.clone());

            assert!(engine.get_completions(&["nope:x"], 0, 6, None).is_empty());
            assert!(fetcher.requests().is_empty());
        }

        #[test]
        fn test_bare_token_ordering() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());
            let buffer = [
                "@prefix ex: <http://example.org/ex#> .".to_string(),
                format!("@prefix : <{VOCAB_NS}> ."),
                "@prefix dc: <http://purl.org/dc/terms/> .".to_string(),
                "<> ".to_string(),
            ];

            let completions = engine.get_completions(&buffer, 3, 3, Some("turtle"));
            let labels = labels(&completions);
            assert_eq!(&labels[..3], &[":", "dc:", "ex:"], "Sorted prefixes first");
            let book = labels.iter().position(|l| *l == "Book").unwrap();
            let keyword = labels.iter().position(|l| *l == "@prefix").unwrap();
            assert!(book > 2 && keyword > book, "Terms before keywords");
            assert!(completions.iter().all(|c| c.detail.is_none() && c.documentation.is_none()));
        }

        #[test]
        fn test_bare_token_is_not_a_filter() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());
            let buffer = [
                "@prefix bibo: <http://purl.org/ontology/bibo/> .".to_string(),
                format!("@prefix : <{VOCAB_NS}> ."),
                "<> a B".to_string(),
            ];

            let after_b = engine.get_completions(&buffer, 2, 6, Some("turtle"));
            let after_a = engine.get_completions(&buffer, 2, 4, Some("turtle"));
            let after_space = engine.get_completions(&buffer, 2, 5, Some("turtle"));
            assert_eq!(after_b, after_a);
            assert_eq!(after_b, after_space);

            let labels = labels(&after_b);
            assert_eq!(&labels[..2], &[":", "bibo:"]);
            for expected in ["Book", "author", "title", "BASE", "a", "@prefix"] {
                assert!(labels.contains(&expected), "{expected} should be offered");
            }
        }

        #[test]
        fn test_keywords_can_be_disabled() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let fetcher = vocab_fetcher();
            let prefixes = PrefixRegistry::new(None, crate::prefixes::PREFIX_URI_TEMPLATE, fetcher.clone());
            let cache = crate::test_utils::test_cache(cache_dir, fetcher);
            let mut engine = CompletionEngine::new(cache, prefixes, false);

            assert!(engine.get_completions(&["<> a "], 0, 5, Some("turtle")).is_empty());
        }

        #[test]
        fn test_prefix_line_above_does_not_switch_mode() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let fetcher = vocab_fetcher();
            let mut engine = test_engine(cache_dir, fetcher.clone());
            let buffer = ["PREFIX ex: <http://example.org/>", "ex:"];

            let completions = engine.get_completions(&buffer, 1, 3, Some("sparql"));
            assert!(completions.iter().all(|c| !c.label.starts_with(' ')));
            assert!(
                !fetcher.requests().iter().any(|r| r.contains("prefix.cc")),
                "Term mode never consults the prefix service"
            );
            assert_eq!(fetcher.requests(), vec!["http://example.org/".to_string()]);
        }

        #[test]
        fn test_line_out_of_range() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());
            assert!(engine.get_completions(&["a"], 5, 0, None).is_empty());
        }
    }

    mod prefix_mode {
        use super::*;

        #[test]
        fn test_namespace_for_completed_prefix() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());

            let completions = engine.get_completions(&["@prefix foaf:"], 0, 13, Some("turtle"));
            assert_eq!(labels(&completions), vec![" <http://xmlns.com/foaf/0.1/>"]);
        }

        #[test]
        fn test_unknown_prefix_offers_nothing() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());

            let completions = engine.get_completions(&["PREFIX zzz:"], 0, 11, Some("sparql"));
            assert!(completions.is_empty());
        }

        #[test]
        fn test_partial_prefix_lists_all_declarations() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());

            let sparql = engine.get_completions(&["prefix rd"], 0, 9, Some("sparql"));
            assert_eq!(sparql.len(), 5, "A bare prefix name has an empty trailer");
            assert!(labels(&sparql).contains(&"owl: <http://www.w3.org/2002/07/owl#>"));

            let turtle = engine.get_completions(&["@prefix rd"], 0, 10, Some("turtle"));
            assert_eq!(turtle, sparql);
        }

        #[test]
        fn test_xmlns_attribute_format() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());

            let completions = engine.get_completions(&["  xmlns:ow"], 0, 10, Some("xml"));
            assert_eq!(
                labels(&completions),
                vec![r#"owl="http://www.w3.org/2002/07/owl#""#]
            );
        }

        #[test]
        fn test_empty_token_lists_all() {
            let (_temp_dir, cache_dir) = create_test_cache_dir();
            let mut engine = test_engine(cache_dir, vocab_fetcher());

            let completions = engine.get_completions(&["@prefix "], 0, 8, Some("turtle"));
            assert_eq!(completions.len(), 5, "All core bindings, xml included");
        }
    }
}

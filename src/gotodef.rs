//! Go to the definition of a prefixed term in its cached vocabulary document.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::cache::VocabularyCache;
use crate::scanner::{expand_prefix, line_prefixes, term_at, MAX_LINE_SCAN};

/// Where a term is defined: a line and column (zero-based) in a cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub path: PathBuf,
    pub line: usize,
    pub character: usize,
}

/// Namespace and local name of the `prefix:local` token at the cursor.
///
/// Only prefixes declared in the buffer count. A cursor just past the token still
/// finds it.
pub fn term_under_cursor<S: AsRef<str>>(
    buffer: &[S],
    line: usize,
    character: usize,
) -> Option<(String, String)> {
    let line_text = buffer.get(line)?.as_ref();
    let token = term_at(line_text, character)
        .or_else(|| character.checked_sub(1).and_then(|c| term_at(line_text, c)))?;

    let (prefix, local) = token.split_once(':')?;
    let namespace = expand_prefix(buffer, prefix)?;
    Some((namespace, local.to_string()))
}

pub fn goto_definition<S: AsRef<str>>(
    cache: &mut VocabularyCache,
    buffer: &[S],
    line: usize,
    character: usize,
) -> Option<Definition> {
    let (namespace, local) = term_under_cursor(buffer, line, character)?;
    let path = cache.cache_path(&namespace);

    if !path.is_file() {
        if let Err(err) = cache.load(&namespace) {
            warn!("No definition for {local} in <{namespace}>: {err}");
            return None;
        }
    }

    let text = fs::read_to_string(&path)
        .inspect_err(|err| warn!("Could not read '{}': {err}", path.display()))
        .ok()?;
    let lines: Vec<&str> = text.lines().collect();
    let (line, character) = find_term_definition(&lines, &namespace, &local);
    debug!("{local} of <{namespace}> at {}:{line}", path.display());

    Some(Definition {
        path,
        line,
        character,
    })
}

/// First line starting with the term, as `prefix:local` once a prefix for `namespace`
/// has been declared above, else as `<namespace local>`. `(0, 0)` if none does.
pub fn find_term_definition<S: AsRef<str>>(
    lines: &[S],
    namespace: &str,
    local: &str,
) -> (usize, usize) {
    let expanded = format!("<{namespace}{local}>");
    let mut prefix: Option<String> = None;

    for (at_line, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if at_line < MAX_LINE_SCAN && prefix.is_none() {
            prefix = line_prefixes(line)
                .into_iter()
                .find(|(_, ns)| ns == namespace)
                .map(|(pfx, _)| pfx);
        }

        let found = match &prefix {
            Some(pfx) => line
                .strip_prefix(pfx.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .and_then(|rest| rest.strip_prefix(local))
                .is_some_and(|rest| !rest.starts_with(is_word_char)),
            None => line.starts_with(&expanded),
        };
        if found {
            return (at_line, 0);
        }
    }

    (0, 0)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

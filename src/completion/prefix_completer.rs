use super::{split_token, Completer, Completion, CompletionEngine, Context};

/// How a prefix declaration is spelled on the cursor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationSyntax {
    /// `@prefix p: <ns> .` or `PREFIX p: <ns>`
    Angle,
    /// `xmlns:p="ns"`
    Attribute,
}

impl DeclarationSyntax {
    /// Looks only at the text before the first `:` of the line.
    fn of_line(line: &str) -> Option<Self> {
        let head = line.split(':').next().unwrap_or_default().trim();
        if ["PREFIX", "prefix", "@prefix"]
            .iter()
            .any(|keyword| head.starts_with(keyword))
        {
            Some(DeclarationSyntax::Angle)
        } else if head == "xmlns" {
            Some(DeclarationSyntax::Attribute)
        } else {
            None
        }
    }

    fn namespace(self, namespace: &str) -> String {
        match self {
            DeclarationSyntax::Angle => format!(" <{namespace}>"),
            DeclarationSyntax::Attribute => format!("=\"{namespace}\""),
        }
    }

    fn binding(self, prefix: &str, namespace: &str) -> String {
        match self {
            DeclarationSyntax::Angle => format!("{prefix}: <{namespace}>"),
            DeclarationSyntax::Attribute => format!("{prefix}=\"{namespace}\""),
        }
    }
}

/// Completes the prefix declaration being typed on the cursor line.
pub(super) struct PrefixDeclarationCompleter<'a> {
    syntax: DeclarationSyntax,
    token: &'a str,
}

impl<'a> Completer<'a> for PrefixDeclarationCompleter<'a> {
    fn construct(context: Context<'a>) -> Option<Self> {
        let syntax = DeclarationSyntax::of_line(context.line)?;
        Some(Self {
            syntax,
            token: context.token,
        })
    }

    fn completions(&self, engine: &mut CompletionEngine) -> Vec<Completion> {
        // `p:` typed in full: offer its namespace
        if let Some(prefix) = self.token.strip_suffix(':') {
            return engine
                .prefixes
                .lookup(prefix)
                .map(|namespace| vec![Completion::new(self.syntax.namespace(&namespace))])
                .unwrap_or_default();
        }

        let (_, partial) = split_token(self.token);
        engine
            .prefixes
            .namespaces_starting_with(partial)
            .map(|(prefix, namespace)| Completion::new(self.syntax.binding(prefix, namespace)))
            .collect()
    }
}

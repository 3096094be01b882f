//! Token kinds for rule bodies.
//!
//! Logos derives recognition for every kind except `Garbage`, which the
//! lexer synthesizes from runs of unrecognized characters.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("|")]
    Pipe,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    /// Non-greedy `*?` loop
    #[token("*?")]
    StarQuestion,

    /// Non-greedy `+?` loop
    #[token("+?")]
    PlusQuestion,

    /// Non-greedy `??` optional
    #[token("??")]
    QuestionQuestion,

    #[token("~")]
    Tilde,

    #[token(".")]
    Dot,

    /// Character range operator: `'a'..'z'`
    #[token("..")]
    Range,

    /// Lexer command introducer: `-> skip`
    #[token("->")]
    Arrow,

    /// Alternative label introducer: `# Label`
    #[token("#")]
    Hash,

    #[token("=")]
    Equals,

    #[token("+=")]
    PlusEquals,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    /// Element options: `<assoc=right>`
    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLiteral,

    #[regex(r"\[(?:[^\]\\]|\\.)*\]")]
    CharClass,

    /// Brace-balanced embedded action; a trailing `?` makes it a predicate.
    #[token("{", action_block)]
    Action,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    /// Coalesced unrecognized characters
    Garbage,
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::LineComment | Self::BlockComment)
    }

    #[inline]
    pub fn is_quantifier(self) -> bool {
        self.is_greedy_quantifier() || self.is_lazy_quantifier()
    }

    #[inline]
    pub fn is_greedy_quantifier(self) -> bool {
        matches!(self, Self::Question | Self::Star | Self::Plus)
    }

    #[inline]
    pub fn is_lazy_quantifier(self) -> bool {
        matches!(
            self,
            Self::StarQuestion | Self::PlusQuestion | Self::QuestionQuestion
        )
    }
}

/// Consumes the rest of a `{ ... }` block, honoring nesting and quoted text.
///
/// An unclosed block swallows the remainder of the body.
fn action_block(lex: &mut Lexer<SyntaxKind>) -> bool {
    let rest = lex.remainder();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    lex.bump(idx + 1);
                    return true;
                }
            }
            _ => {}
        }
    }

    lex.bump(rest.len());
    true
}

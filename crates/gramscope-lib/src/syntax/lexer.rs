//! Lexer for rule bodies.
//!
//! Tokens borrow their text from the body, so downstream passes never
//! re-slice the source.
//!
//! ## Error handling
//!
//! Consecutive unrecognized characters are coalesced into a single `Garbage`
//! token instead of one error per character.

use logos::Logos;

use super::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: SyntaxKind,
    pub text: &'s str,
    /// Byte offset of `text` within the lexed body.
    pub offset: usize,
}

impl<'s> Token<'s> {
    #[inline]
    pub fn new(kind: SyntaxKind, text: &'s str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }
}

/// Tokenizes a rule body, trivia included.
pub fn lex(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(SyntaxKind::Garbage, &source[start..end], start));
                }

                let span = lexer.span();
                tokens.push(Token::new(kind, &source[span.clone()], span.start));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(SyntaxKind::Garbage, &source[start..], start));
                }
                break;
            }
        }
    }

    tokens
}

/// Tokenizes a rule body and drops whitespace and comments.
pub fn lex_significant(source: &str) -> Vec<Token<'_>> {
    lex(source)
        .into_iter()
        .filter(|t| !t.kind.is_trivia())
        .collect()
}

//! Rule-body syntax shared by every analysis.
//!
//! Bodies are lexed with [`lex`] so that string literals, character classes
//! and actions are single opaque tokens. Everything built on top (reference
//! extraction, [`RuleStructure`], complexity scans, pattern translation)
//! therefore never mistakes a quoted `|` or `(` for an operator.

mod commands;
mod kind;
mod lexer;
mod references;
mod structure;

#[cfg(test)]
mod structure_tests;

pub use commands::{LexerCommand, lexer_commands};
pub(crate) use commands::parse_commands;
pub use kind::SyntaxKind;
pub use lexer::{Token, lex, lex_significant};
pub use references::{RESERVED_WORDS, Reference, extract_references, references};
pub use structure::{Alternative, Element, ElementContent, Modifier, RuleStructure};

/// Counts of the structural features of a rule body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyShape {
    /// `|` outside any group.
    pub top_level_pipes: usize,
    /// Quantifiers outside any group, including ones applied to a group.
    pub top_level_quantifiers: usize,
    /// Deepest parenthesis nesting.
    pub max_depth: usize,
}

impl BodyShape {
    pub fn alternatives(&self) -> usize {
        self.top_level_pipes + 1
    }
}

/// Single depth-tracking pass over a body.
///
/// A `?` following an action is a predicate marker, not a quantifier.
pub fn body_shape(body: &str) -> BodyShape {
    let mut shape = BodyShape::default();
    let mut depth = 0usize;
    let mut prev: Option<SyntaxKind> = None;

    for token in lex_significant(body) {
        match token.kind {
            SyntaxKind::ParenOpen => {
                depth += 1;
                shape.max_depth = shape.max_depth.max(depth);
            }
            SyntaxKind::ParenClose => depth = depth.saturating_sub(1),
            SyntaxKind::Pipe if depth == 0 => shape.top_level_pipes += 1,
            kind if kind.is_quantifier()
                && depth == 0
                && prev != Some(SyntaxKind::Action) =>
            {
                shape.top_level_quantifiers += 1;
            }
            _ => {}
        }
        prev = Some(token.kind);
    }

    shape
}

//! Identifier references inside rule bodies.

use indexmap::IndexSet;

use super::commands::parse_commands;
use super::{SyntaxKind, lex_significant};

/// Words of the rule language that are never rule references.
pub const RESERVED_WORDS: &[&str] = &[
    "catch", "channels", "finally", "fragment", "grammar", "import", "lexer", "locals", "mode",
    "options", "parser", "returns", "throws", "tokens",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'s> {
    pub name: &'s str,
    /// Byte offset of the reference within the body.
    pub offset: usize,
}

/// Every rule reference in `body`, in source order, duplicates included.
///
/// Literals, character classes and actions are opaque tokens, so identifiers
/// inside them never count. Element labels, alternative labels, element
/// options and lexer commands are skipped too.
pub fn references(body: &str) -> Vec<Reference<'_>> {
    let tokens = lex_significant(body);
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(token) = tokens.get(pos) {
        pos += 1;
        match token.kind {
            SyntaxKind::Arrow => {
                let (_, used) = parse_commands(&tokens[pos..]);
                pos += used;
            }
            SyntaxKind::Hash => {
                if tokens.get(pos).is_some_and(|t| t.is(SyntaxKind::Ident)) {
                    pos += 1;
                }
            }
            SyntaxKind::Lt => {
                while let Some(t) = tokens.get(pos) {
                    pos += 1;
                    if t.is(SyntaxKind::Gt) {
                        break;
                    }
                }
            }
            SyntaxKind::Ident => {
                let is_label = tokens
                    .get(pos)
                    .is_some_and(|t| matches!(t.kind, SyntaxKind::Equals | SyntaxKind::PlusEquals));
                if is_label {
                    pos += 1;
                } else if !RESERVED_WORDS.contains(&token.text) {
                    out.push(Reference {
                        name: token.text,
                        offset: token.offset,
                    });
                }
            }
            _ => {}
        }
    }

    out
}

/// Distinct referenced names in first-occurrence order.
pub fn extract_references(body: &str) -> IndexSet<String> {
    references(body)
        .into_iter()
        .map(|r| r.name.to_string())
        .collect()
}

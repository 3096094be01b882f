use crate::RuleKind;

/// Classify a rule name by the case of its first character.
///
/// Uppercase first letter means lexer rule, anything else means parser rule.
///
/// # Examples
/// ```
/// use gramscope_core::{RuleKind, rule_kind};
/// assert_eq!(rule_kind("ID"), RuleKind::Lexer);
/// assert_eq!(rule_kind("Digit"), RuleKind::Lexer);
/// assert_eq!(rule_kind("expr"), RuleKind::Parser);
/// ```
pub fn rule_kind(name: &str) -> RuleKind {
    if is_lexer_name(name) {
        RuleKind::Lexer
    } else {
        RuleKind::Parser
    }
}

pub fn is_lexer_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Whether `s` is a valid rule identifier: a letter followed by letters, digits or `_`.
///
/// # Examples
/// ```
/// use gramscope_core::is_identifier;
/// assert!(is_identifier("expr_list2"));
/// assert!(!is_identifier("2expr"));
/// assert!(!is_identifier(""));
/// ```
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_alphabetic() && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Decode the escapes a grammar string literal may contain.
///
/// Accepts the literal with or without surrounding single quotes.
/// Unknown escapes keep the escaped character.
///
/// # Examples
/// ```
/// use gramscope_core::utils::unescape_literal;
/// assert_eq!(unescape_literal("'a\\nb'"), "a\nb");
/// assert_eq!(unescape_literal("'\\''"), "'");
/// assert_eq!(unescape_literal("'\\u0041'"), "A");
/// ```
pub fn unescape_literal(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

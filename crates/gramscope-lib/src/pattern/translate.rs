//! Lexer-rule pattern to regex translation.
//!
//! | Grammar                | Regex                    |
//! |------------------------|--------------------------|
//! | `'if'`                 | `(?:if)` (escaped)       |
//! | `[a-z_]`               | `[a-z_]` (re-escaped)    |
//! | `'a'..'z'`             | `[a-z]`                  |
//! | `~[\r\n]`, `~'x'`      | `[^\r\n]`, `[^x]`        |
//! | `~('a' \| [0-9])`      | `[^a0-9]`                |
//! | `.`                    | `(?s:.)`                 |
//! | `( ) \| ? * + *? +? ??`| unchanged                |
//! | `OTHER_RULE`           | `(?:<its pattern>)`      |
//!
//! Actions, predicates, `EOF`, element options and references to parser or
//! undefined rules cannot be simulated and fail the translation.

use gramscope_core::utils::unescape_literal;

use crate::syntax::{SyntaxKind, Token, lex_significant, parse_commands};
use crate::{Error, Result};

/// Regex text for a lexer pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub regex: String,
    /// Uses a non-greedy loop somewhere, including in inlined rules.
    pub lazy: bool,
}

/// Resolves a rule reference to the translation of that rule's pattern.
pub type Resolver<'r> = dyn FnMut(&str) -> Result<Translation> + 'r;

/// Translates without access to other rules: every reference fails.
pub fn translate_standalone(pattern: &str) -> Result<Translation> {
    translate(pattern, &mut |name: &str| {
        Err(Error::UnsupportedPattern(format!(
            "reference to `{name}` outside a grammar"
        )))
    })
}

pub fn translate(pattern: &str, resolve: &mut Resolver<'_>) -> Result<Translation> {
    let tokens = lex_significant(pattern);
    let mut out = Translation {
        regex: String::new(),
        lazy: false,
    };
    let mut pos = 0;

    while let Some(token) = tokens.get(pos) {
        pos += 1;
        match token.kind {
            SyntaxKind::StringLiteral => {
                if let Some((range, used)) = literal_range(token, &tokens[pos..])? {
                    out.regex.push_str(&format!("[{range}]"));
                    pos += used;
                } else {
                    let value = unescape_literal(token.text);
                    out.regex.push_str(&format!("(?:{})", regex_syntax::escape(&value)));
                }
            }
            SyntaxKind::CharClass => {
                let body = class_body(token.text)?;
                if body.is_empty() {
                    out.regex.push_str(EMPTY_CLASS);
                } else {
                    out.regex.push_str(&format!("[{body}]"));
                }
            }
            SyntaxKind::Tilde => {
                let (set, used) = negated_set(&tokens[pos..])?;
                out.regex.push_str(&format!("[^{set}]"));
                pos += used;
            }
            SyntaxKind::Dot => out.regex.push_str("(?s:.)"),
            SyntaxKind::ParenOpen => out.regex.push_str("(?:"),
            SyntaxKind::ParenClose => out.regex.push(')'),
            SyntaxKind::Pipe => out.regex.push('|'),
            SyntaxKind::Question | SyntaxKind::Star | SyntaxKind::Plus => {
                out.regex.push_str(token.text)
            }
            SyntaxKind::StarQuestion | SyntaxKind::PlusQuestion | SyntaxKind::QuestionQuestion => {
                out.lazy = true;
                out.regex.push_str(token.text);
            }
            SyntaxKind::Arrow => {
                let (_, used) = parse_commands(&tokens[pos..]);
                pos += used;
            }
            SyntaxKind::Ident if token.text == gramscope_core::EOF => {
                return Err(Error::UnsupportedPattern("`EOF` in a lexer rule".into()));
            }
            SyntaxKind::Ident => {
                let inner = resolve(token.text)?;
                out.lazy |= inner.lazy;
                out.regex.push_str(&format!("(?:{})", inner.regex));
            }
            SyntaxKind::Action => {
                let what = if tokens.get(pos).is_some_and(|t| t.is(SyntaxKind::Question)) {
                    "semantic predicate"
                } else {
                    "embedded action"
                };
                return Err(Error::UnsupportedPattern(format!("{what} `{}`", token.text)));
            }
            SyntaxKind::Lt => {
                return Err(Error::UnsupportedPattern("element options".into()));
            }
            _ => {
                return Err(Error::InvalidPattern(format!(
                    "unexpected `{}`",
                    token.text
                )));
            }
        }
    }

    Ok(out)
}

/// A class that never matches.
const EMPTY_CLASS: &str = r"[^\x00-\x{10FFFF}]";

/// `'a'..'z'` as a class body, with the number of tokens used after the first.
fn literal_range(first: &Token<'_>, rest: &[Token<'_>]) -> Result<Option<(String, usize)>> {
    let (Some(op), Some(last)) = (rest.first(), rest.get(1)) else {
        return Ok(None);
    };
    if !op.is(SyntaxKind::Range) || !last.is(SyntaxKind::StringLiteral) {
        return Ok(None);
    }
    let lo = single_char(first)?;
    let hi = single_char(last)?;
    Ok(Some((
        format!("{}-{}", escape_class_char(lo), escape_class_char(hi)),
        2,
    )))
}

fn single_char(token: &Token<'_>) -> Result<char> {
    let value = unescape_literal(token.text);
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidPattern(format!(
            "{} is not a single character",
            token.text
        ))),
    }
}

/// Body of a negated set: the tokens after `~`.
fn negated_set(tokens: &[Token<'_>]) -> Result<(String, usize)> {
    let Some(first) = tokens.first() else {
        return Err(Error::InvalidPattern("`~` at end of pattern".into()));
    };

    match first.kind {
        SyntaxKind::CharClass => Ok((class_body(first.text)?, 1)),
        SyntaxKind::StringLiteral => match literal_range(first, &tokens[1..])? {
            Some((range, used)) => Ok((range, used + 1)),
            None => Ok((escape_class_char(single_char(first)?), 1)),
        },
        SyntaxKind::ParenOpen => {
            let mut set = String::new();
            let mut pos = 1;
            loop {
                let Some(token) = tokens.get(pos) else {
                    return Err(Error::InvalidPattern("unclosed `~(`".into()));
                };
                match token.kind {
                    SyntaxKind::ParenClose => return Ok((set, pos + 1)),
                    SyntaxKind::Pipe => pos += 1,
                    SyntaxKind::CharClass => {
                        set.push_str(&class_body(token.text)?);
                        pos += 1;
                    }
                    SyntaxKind::StringLiteral => match literal_range(token, &tokens[pos + 1..])? {
                        Some((range, used)) => {
                            set.push_str(&range);
                            pos += used + 1;
                        }
                        None => {
                            set.push_str(&escape_class_char(single_char(token)?));
                            pos += 1;
                        }
                    },
                    _ => {
                        return Err(Error::UnsupportedPattern(format!(
                            "`{}` inside a negated set",
                            token.text
                        )));
                    }
                }
            }
        }
        _ => Err(Error::UnsupportedPattern(format!(
            "negation of `{}`",
            first.text
        ))),
    }
}

/// Re-escapes the inside of a grammar character class for the regex engine.
///
/// Grammar classes have no negation, intersection or nesting, so `^ [ & ~`
/// are literal there and must be escaped here. `\b` is backspace.
fn class_body(class: &str) -> Result<String> {
    let inner = class
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Error::InvalidPattern(format!("malformed class {class}")))?;

    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(esc) = chars.next() else {
                    return Err(Error::InvalidPattern(format!("dangling `\\` in {class}")));
                };
                match esc {
                    'n' | 'r' | 't' | 'f' | '\\' | ']' | '-' => {
                        out.push('\\');
                        out.push(esc);
                    }
                    'b' => out.push_str(r"\x08"),
                    'u' => {
                        // `\uXXXX` or `\u{X..}`
                        if chars.peek() == Some(&'{') {
                            out.push_str(r"\u");
                            for h in chars.by_ref() {
                                out.push(h);
                                if h == '}' {
                                    break;
                                }
                            }
                        } else {
                            let hex: String = chars.by_ref().take(4).collect();
                            out.push_str(&format!(r"\x{{{hex}}}"));
                        }
                    }
                    'p' | 'P' => {
                        out.push('\\');
                        out.push(esc);
                        for h in chars.by_ref() {
                            out.push(h);
                            if h == '}' {
                                break;
                            }
                        }
                    }
                    other => out.push_str(&escape_class_char(other)),
                }
            }
            '-' => out.push('-'),
            other => out.push_str(&escape_class_char(other)),
        }
    }
    Ok(out)
}

fn escape_class_char(c: char) -> String {
    if regex_syntax::is_meta_character(c) || matches!(c, '&' | '~' | '-') {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

//! Rule-structure matcher: does a token sequence fit one parser rule?
//!
//! Each alternative of the rule is walked against the tokens in lockstep,
//! greedily and without backtracking into earlier elements. Lexer-rule and
//! literal elements must match the current token's type exactly.
//!
//! Other parser rules are not expanded. A parser-rule element is assumed to
//! consume one token, or a run of tokens under `*`/`+`, and any verdict that
//! relies on this is reported with [`Confidence::Medium`].
//!
//! Loops and optional elements leave behind at least as many tokens as the
//! rest of the alternative needs, so `ID* ID` and `ID? ID` match `ID`.


use std::collections::HashMap;

use serde::Serialize;

use gramscope_core::utils::unescape_literal;
use gramscope_core::{EOF, Grammar};

use crate::syntax::{Alternative, Element, ElementContent, Modifier, RuleStructure};
use crate::tokenize::Token;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Decided on token types alone.
    High,
    /// Depends on how many tokens an unexpanded parser rule consumes.
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    pub confidence: Confidence,
    /// Some tokens matched before the rule failed, or tokens were left over.
    pub partial: bool,
    /// What could have continued the match where it stopped.
    pub expected_tokens: Vec<String>,
    /// Index of the matching alternative.
    pub alternative: Option<usize>,
    /// Tokens consumed by the match, or by the attempt that got furthest.
    pub consumed: usize,
}

/// Matches token types against the named parser rule.
pub fn test_rule(grammar: &Grammar, rule_name: &str, token_types: &[&str]) -> Result<MatchResult> {
    let rule = grammar
        .rule(rule_name)
        .ok_or_else(|| Error::RuleNotFound(rule_name.to_string()))?;
    if !rule.is_parser() {
        return Err(Error::NotAParserRule(rule_name.to_string()));
    }

    let structure = RuleStructure::parse(&rule.definition);
    let literals = LiteralTypes::new(grammar);
    Ok(match_alternatives(&structure.alternatives, token_types, &literals))
}

/// Like [`test_rule`], ignoring skipped and off-channel tokens.
pub fn test_rule_tokens(grammar: &Grammar, rule_name: &str, tokens: &[Token]) -> Result<MatchResult> {
    let types: Vec<&str> = tokens
        .iter()
        .filter(|t| t.is_visible())
        .map(|t| t.kind.as_str())
        .collect();
    test_rule(grammar, rule_name, &types)
}

fn match_alternatives(alternatives: &[Alternative], tokens: &[&str], literals: &LiteralTypes) -> MatchResult {
    let mut furthest: Option<Attempt> = None;

    for (index, alt) in alternatives.iter().enumerate() {
        let mut walker = Walker {
            tokens,
            literals,
            assumed: false,
        };
        let attempt = match walker.sequence(&alt.elements, 0) {
            Ok(done) if done.pos == tokens.len() => {
                return MatchResult {
                    matched: true,
                    confidence: confidence(walker.assumed),
                    partial: false,
                    expected_tokens: Vec::new(),
                    alternative: Some(index),
                    consumed: done.pos,
                };
            }
            Ok(done) => Attempt {
                pos: done.pos,
                expected: done.open,
                assumed: walker.assumed,
                partial: true,
            },
            Err(failure) => Attempt {
                partial: failure.pos > 0,
                pos: failure.pos,
                expected: failure.expected,
                assumed: walker.assumed,
            },
        };

        furthest = Some(match furthest {
            None => attempt,
            Some(best) if attempt.pos > best.pos => attempt,
            Some(mut best) if attempt.pos == best.pos => {
                merge_expected(&mut best.expected, attempt.expected);
                best.assumed |= attempt.assumed;
                best
            }
            Some(best) => best,
        });
    }

    let best = furthest.unwrap_or(Attempt {
        pos: 0,
        expected: Vec::new(),
        assumed: false,
        partial: false,
    });
    MatchResult {
        matched: false,
        confidence: confidence(best.assumed),
        partial: best.partial,
        expected_tokens: best.expected,
        alternative: None,
        consumed: best.pos,
    }
}

fn confidence(assumed: bool) -> Confidence {
    if assumed {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

/// Outcome of one top-level alternative that did not match.
struct Attempt {
    pos: usize,
    expected: Vec<String>,
    assumed: bool,
    partial: bool,
}

/// A sequence matched up to `pos`.
struct Done {
    pos: usize,
    /// Skipped or repeated elements that could have consumed more at `pos`.
    open: Vec<String>,
}

/// A required element did not match at `pos`.
struct Failure {
    pos: usize,
    expected: Vec<String>,
}

fn merge_expected(into: &mut Vec<String>, more: Vec<String>) {
    for name in more {
        if !into.contains(&name) {
            into.push(name);
        }
    }
}

/// Token types that match a quoted literal element.
struct LiteralTypes {
    /// Literal value to the lexer rules whose whole body is that literal.
    rules: HashMap<String, Vec<String>>,
}

impl LiteralTypes {
    fn new(grammar: &Grammar) -> Self {
        let mut rules: HashMap<String, Vec<String>> = HashMap::new();
        for rule in grammar.lexer_rules().filter(|r| !r.is_fragment) {
            if let Some(value) = RuleStructure::parse(&rule.definition).sole_literal() {
                rules.entry(value).or_default().push(rule.name.clone());
            }
        }
        Self { rules }
    }

    /// `'+'` matches the implicit type `'+'` or a rule like `PLUS : '+' ;`.
    fn matches(&self, quoted: &str, token_type: &str) -> bool {
        if token_type == quoted {
            return true;
        }
        let value = unescape_literal(quoted);
        if token_type.starts_with('\'') && unescape_literal(token_type) == value {
            return true;
        }
        self.rules
            .get(&value)
            .is_some_and(|names| names.iter().any(|n| n == token_type))
    }
}

struct Walker<'a> {
    tokens: &'a [&'a str],
    literals: &'a LiteralTypes,
    /// A parser-rule element was taken on assumption.
    assumed: bool,
}

impl Walker<'_> {
    fn sequence(&mut self, elements: &[Element], start: usize) -> std::result::Result<Done, Failure> {
        let mut pos = start;
        let mut open: Vec<String> = Vec::new();

        for (i, element) in elements.iter().enumerate() {
            let rest = &elements[i + 1..];
            let next = match self.element(element, pos, min_tokens(rest), next_terminal(rest)) {
                Ok(next) => next,
                Err(mut failure) => {
                    if failure.pos == pos {
                        merge_expected(&mut open, failure.expected);
                        failure.expected = open;
                    }
                    return Err(failure);
                }
            };
            if next > pos {
                open.clear();
            }
            if element.is_repeating() || (element.is_optional() && next == pos) {
                merge_expected(&mut open, expected_names(&element.content));
            }
            pos = next;
        }

        Ok(Done { pos, open })
    }

    /// Applies the element's modifier, keeping `reserve` tokens for the rest.
    fn element(
        &mut self,
        element: &Element,
        pos: usize,
        reserve: usize,
        stop: Option<&ElementContent>,
    ) -> std::result::Result<usize, Failure> {
        let mut pos = match element.modifier {
            Modifier::None => return self.once(&element.content, pos),
            Modifier::OneOrMore => self.once(&element.content, pos)?,
            Modifier::Optional | Modifier::ZeroOrMore => pos,
        };

        loop {
            if self.tokens.len().saturating_sub(pos) <= reserve {
                break;
            }
            // An unexpanded rule in a loop stops where the next terminal fits.
            if matches!(element.content, ElementContent::Rule(_))
                && let (Some(stop), Some(token)) = (stop, self.tokens.get(pos))
                && self.terminal_matches(stop, token)
            {
                break;
            }
            match self.once(&element.content, pos) {
                Ok(next) if next > pos => pos = next,
                _ => break,
            }
            if element.modifier == Modifier::Optional {
                break;
            }
        }
        Ok(pos)
    }

    /// One occurrence of `content` at `pos`.
    fn once(&mut self, content: &ElementContent, pos: usize) -> std::result::Result<usize, Failure> {
        let fail = || Failure {
            pos,
            expected: expected_names(content),
        };

        let Some(&token) = self.tokens.get(pos) else {
            return match content {
                ElementContent::Eof => Ok(pos),
                ElementContent::Group(alts) => self.group(alts, pos),
                _ => Err(fail()),
            };
        };

        match content {
            ElementContent::Rule(_) => {
                self.assumed = true;
                Ok(pos + 1)
            }
            ElementContent::Group(alts) => self.group(alts, pos),
            ElementContent::Wildcard => Ok(pos + 1),
            ElementContent::Eof if token == EOF => Ok(pos + 1),
            ElementContent::Negated(inner) if !self.terminal_matches(inner, token) => Ok(pos + 1),
            other if self.terminal_matches(other, token) => Ok(pos + 1),
            _ => Err(fail()),
        }
    }

    /// First alternative of a group that matches; otherwise the failure that
    /// got furthest.
    fn group(&mut self, alts: &[Alternative], pos: usize) -> std::result::Result<usize, Failure> {
        let mut furthest: Option<Failure> = None;
        for alt in alts {
            match self.sequence(&alt.elements, pos) {
                Ok(done) => return Ok(done.pos),
                Err(failure) => {
                    furthest = Some(match furthest {
                        Some(best) if best.pos > failure.pos => best,
                        Some(mut best) if best.pos == failure.pos => {
                            merge_expected(&mut best.expected, failure.expected);
                            best
                        }
                        _ => failure,
                    });
                }
            }
        }
        Err(furthest.unwrap_or(Failure {
            pos,
            expected: Vec::new(),
        }))
    }

    fn terminal_matches(&self, content: &ElementContent, token: &str) -> bool {
        match content {
            ElementContent::Token(name) => token == name,
            ElementContent::Literal(quoted) => self.literals.matches(quoted, token),
            ElementContent::Eof => token == EOF,
            ElementContent::Group(alts) => alts.iter().any(|alt| match alt.elements.as_slice() {
                [single] => self.terminal_matches(&single.content, token),
                _ => false,
            }),
            _ => false,
        }
    }
}

/// Fewest tokens the elements can match.
fn min_tokens(elements: &[Element]) -> usize {
    elements
        .iter()
        .filter(|e| !e.is_optional())
        .map(|e| match &e.content {
            ElementContent::Eof => 0,
            ElementContent::Group(alts) => alts
                .iter()
                .map(|a| min_tokens(&a.elements))
                .min()
                .unwrap_or(0),
            _ => 1,
        })
        .sum()
}

/// The next required element when it is matched by token type alone.
fn next_terminal(elements: &[Element]) -> Option<&ElementContent> {
    let element = elements.iter().find(|e| !e.is_optional())?;
    match element.content {
        ElementContent::Token(_) | ElementContent::Literal(_) | ElementContent::Eof => {
            Some(&element.content)
        }
        _ => None,
    }
}

fn expected_names(content: &ElementContent) -> Vec<String> {
    match content {
        ElementContent::Group(alts) => {
            let mut names = Vec::new();
            for alt in alts {
                if let Some(first) = alt.elements.first() {
                    merge_expected(&mut names, expected_names(&first.content));
                }
            }
            names
        }
        other => vec![other.to_string()],
    }
}

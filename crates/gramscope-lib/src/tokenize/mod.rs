//! Simulated lexer.
//!
//! At each offset every candidate is tried and the longest match wins. On a
//! tie the earlier candidate wins. Candidates are, in order of precedence:
//!
//! 1. literals used in parser rules that no lexer rule spells out (`'+'`),
//!    typed by their quoted text,
//! 2. non-fragment lexer rules in declaration order.
//!
//! Only default-mode rules take part unless the caller lists rules
//! explicitly; mode switches are not simulated. An offset where nothing
//! matches is recorded as an error and skipped one character at a time.

mod token;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use gramscope_core::utils::unescape_literal;
use gramscope_core::{DEFAULT_MODE, Grammar, Rule};

use crate::config::TokenizeOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::pattern::{Pattern, PatternCompiler};
use crate::syntax::{LexerCommand, RuleStructure, SyntaxKind, lex_significant, lexer_commands};
use crate::Error;

pub use token::{Token, TokenizeError, TokenizeResult};
use token::Position;

/// Tokenizes `input` with default options.
pub fn tokenize(grammar: &Grammar, input: &str) -> TokenizeResult {
    tokenize_with(grammar, input, &TokenizeOptions::default())
}

pub fn tokenize_with(grammar: &Grammar, input: &str, options: &TokenizeOptions) -> TokenizeResult {
    Tokenizer::new(grammar, options).tokenize(input)
}

/// A token-producing rule with its commands resolved.
#[derive(Debug)]
struct Candidate {
    kind: String,
    pattern: Pattern,
    skipped: bool,
    more: bool,
    channel: Option<String>,
}

impl Candidate {
    fn from_rule(rule: &Rule, pattern: Pattern) -> Self {
        let mut candidate = Self::literal(rule.name.clone(), pattern);
        for command in lexer_commands(&rule.definition) {
            match command {
                LexerCommand::Skip => candidate.skipped = true,
                LexerCommand::More => candidate.more = true,
                LexerCommand::Channel(c) if c != "DEFAULT_TOKEN_CHANNEL" => {
                    candidate.channel = Some(c)
                }
                LexerCommand::Type(t) => candidate.kind = t,
                _ => {}
            }
        }
        candidate
    }

    fn literal(kind: String, pattern: Pattern) -> Self {
        Self {
            kind,
            pattern,
            skipped: false,
            more: false,
            channel: None,
        }
    }

    fn token(&self, input: &str, start: usize, end: usize, at: Position) -> Token {
        Token {
            kind: self.kind.clone(),
            value: input[start..end].to_string(),
            start,
            end,
            line: at.line,
            column: at.column,
            skipped: self.skipped,
            channel: self.channel.clone(),
        }
    }
}

/// Compiled candidates for one grammar, reusable across inputs.
#[derive(Debug)]
pub struct Tokenizer {
    candidates: Vec<Candidate>,
    diagnostics: Diagnostics,
}

impl Tokenizer {
    /// Compiles the participating rules. Rules that fail to compile are
    /// reported and never match.
    pub fn new(grammar: &Grammar, options: &TokenizeOptions) -> Self {
        let mut diagnostics = Diagnostics::new();
        let rules = select_rules(grammar, options, &mut diagnostics);

        let mut candidates = Vec::new();
        if options.include_implicit_literals {
            candidates.extend(implicit_literals(grammar));
        }

        let mut compiler = PatternCompiler::new(grammar);
        for rule in rules {
            match compiler.compile_rule(&rule.name) {
                Ok(pattern) => candidates.push(Candidate::from_rule(rule, pattern)),
                Err(error) => report_uncompiled(rule, error, &mut diagnostics),
            }
        }

        Self {
            candidates,
            diagnostics,
        }
    }

    /// Token types in order of precedence.
    pub fn candidate_types(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.kind.as_str())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn tokenize(&self, input: &str) -> TokenizeResult {
        let mut result = TokenizeResult {
            diagnostics: self.diagnostics.clone(),
            ..TokenizeResult::default()
        };
        let mut pos = 0;
        let mut at = Position::start();
        // Text matched by `-> more` rules, owned by the next token.
        let mut pending: Option<(usize, Position, &Candidate)> = None;

        while let Some(character) = input[pos..].chars().next() {
            let Some((candidate, len)) = self.longest_match(input, pos) else {
                if let Some((start, start_at, more)) = pending.take() {
                    result.tokens.push(more.token(input, start, pos, start_at));
                }
                result.errors.push(TokenizeError {
                    offset: pos,
                    line: at.line,
                    column: at.column,
                    character,
                });
                at.advance(&input[pos..pos + character.len_utf8()]);
                pos += character.len_utf8();
                continue;
            };

            let end = pos + len;
            let (start, start_at) = match pending.take() {
                Some((start, start_at, _)) => (start, start_at),
                None => (pos, at),
            };
            at.advance(&input[pos..end]);
            pos = end;

            if candidate.more {
                pending = Some((start, start_at, candidate));
            } else {
                result.tokens.push(candidate.token(input, start, end, start_at));
            }
        }

        if let Some((start, start_at, more)) = pending {
            result.tokens.push(more.token(input, start, pos, start_at));
        }
        result
    }

    fn longest_match(&self, input: &str, pos: usize) -> Option<(&Candidate, usize)> {
        let mut best: Option<(&Candidate, usize)> = None;
        for candidate in &self.candidates {
            if let Some(len) = candidate.pattern.match_at(input, pos)
                && best.is_none_or(|(_, longest)| len > longest)
            {
                best = Some((candidate, len));
            }
        }
        best
    }
}

fn select_rules<'g>(
    grammar: &'g Grammar,
    options: &TokenizeOptions,
    diag: &mut Diagnostics,
) -> Vec<&'g Rule> {
    let Some(names) = &options.rules else {
        let modal = grammar.has_custom_modes();
        return grammar
            .lexer_rules()
            .filter(|r| !r.is_fragment)
            .filter(|r| !modal || r.mode.as_deref() == Some(DEFAULT_MODE))
            .collect();
    };

    let mut rules = Vec::new();
    for name in names {
        match grammar.rule(name) {
            Some(rule) if rule.is_lexer() && !rule.is_fragment => rules.push(rule),
            _ => diag
                .report(DiagnosticKind::UnsupportedPattern)
                .rule(name)
                .message(format!("`{name}` is not a token rule"))
                .emit(),
        }
    }
    rules
}

/// Literals in parser rules with no lexer rule of their own, deduplicated
/// by value in source order.
fn implicit_literals(grammar: &Grammar) -> Vec<Candidate> {
    let mut seen: HashSet<String> = grammar
        .lexer_rules()
        .filter(|r| !r.is_fragment)
        .filter_map(|r| RuleStructure::parse(&r.definition).sole_literal())
        .collect();

    let mut out = Vec::new();
    for rule in grammar.parser_rules() {
        for token in lex_significant(&rule.definition) {
            if !token.is(SyntaxKind::StringLiteral) {
                continue;
            }
            let value = unescape_literal(token.text);
            if value.is_empty() || !seen.insert(value.clone()) {
                continue;
            }
            if let Ok(pattern) = Pattern::literal(&value) {
                out.push(Candidate::literal(token.text.to_string(), pattern));
            }
        }
    }
    out
}

fn report_uncompiled(rule: &Rule, error: Error, diag: &mut Diagnostics) {
    let (kind, detail) = match error {
        Error::InvalidPattern(detail) => (DiagnosticKind::InvalidPattern, detail),
        Error::UnsupportedPattern(detail) => (DiagnosticKind::UnsupportedPattern, detail),
        other => (DiagnosticKind::UnsupportedPattern, other.to_string()),
    };
    diag.report(kind)
        .line(rule.line_number)
        .rule(&rule.name)
        .message(format!("{detail} in `{}`", rule.name))
        .hint("the rule never matches during simulation")
        .emit();
}

//! Pattern compiler: lexer-rule bodies to anchored DFAs.
//!
//! A pattern is translated to regex syntax and built
//! into a dense DFA that only matches at the search start. Matching
//! reports the length of the match at a given offset.
//!
//! Two match semantics are used:
//! - longest match for ordinary patterns (maximal munch),
//! - preference order when the pattern has a non-greedy loop, so that
//!   `'/*' .*? '*/'` stops at the first `*/`.

mod translate;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};

use gramscope_core::Grammar;

use crate::{Error, Result};

pub use translate::{Translation, translate_standalone};

/// A compiled lexer pattern.
#[derive(Clone)]
pub struct Pattern {
    regex: String,
    lazy: bool,
    dfa: dense::DFA<Vec<u32>>,
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("regex", &self.regex)
            .field("lazy", &self.lazy)
            .finish_non_exhaustive()
    }
}

/// Compiles a standalone pattern. Rule references are unsupported here;
/// use [`PatternCompiler`] to resolve them against a grammar.
///
/// ```
/// use gramscope_lib::pattern::compile;
///
/// let number = compile("[0-9]+ ('.' [0-9]+)?").unwrap();
/// assert_eq!(number.match_at("3.14;", 0), Some(4));
/// assert_eq!(number.match_at("x", 0), None);
/// ```
pub fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::from_translation(translate_standalone(pattern)?)
}

impl Pattern {
    /// Exact text, no operators.
    pub fn literal(text: &str) -> Result<Self> {
        Self::build(regex_syntax::escape(text), false)
    }

    pub fn from_translation(translation: Translation) -> Result<Self> {
        Self::build(translation.regex, translation.lazy)
    }

    fn build(regex: String, lazy: bool) -> Result<Self> {
        let match_kind = if lazy {
            MatchKind::LeftmostFirst
        } else {
            MatchKind::All
        };
        let dfa = build_dfa(&regex, match_kind)?;
        Ok(Self { regex, lazy, dfa })
    }

    /// The regex this pattern was built from.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Length in bytes of the match starting at `offset`.
    ///
    /// Empty matches are reported as no match: a token must consume input.
    pub fn match_at(&self, input: &str, offset: usize) -> Option<usize> {
        if offset > input.len() {
            return None;
        }
        let search = Input::new(input).range(offset..).anchored(Anchored::Yes);
        let end = self.dfa.try_search_fwd(&search).ok()??.offset();
        (end > offset).then_some(end - offset)
    }

    /// Whether the pattern matches all of `input`.
    pub fn matches_whole(&self, input: &str) -> bool {
        if input.is_empty() {
            return false;
        }
        if !self.lazy {
            return self.match_at(input, 0) == Some(input.len());
        }
        // Preference order may stop early; test against an end-anchored copy.
        build_dfa(&format!(r"(?:{})\z", self.regex), MatchKind::All)
            .ok()
            .and_then(|dfa| {
                let search = Input::new(input).anchored(Anchored::Yes);
                dfa.try_search_fwd(&search).ok().flatten()
            })
            .is_some()
    }
}

fn build_dfa(regex: &str, match_kind: MatchKind) -> Result<dense::DFA<Vec<u32>>> {
    dense::DFA::builder()
        .configure(
            dense::DFA::config()
                .start_kind(StartKind::Anchored)
                .match_kind(match_kind)
                .minimize(false),
        )
        .build(regex)
        .map_err(|e| Error::InvalidPattern(e.to_string()))
}

/// Translates lexer rules of one grammar, inlining referenced rules.
///
/// Translations are memoized per rule; a rule reaching itself through
/// references is unsupported (it is not a regular language).
pub struct PatternCompiler<'g> {
    grammar: &'g Grammar,
    translations: HashMap<String, Result<Translation>>,
    in_progress: Vec<String>,
}

impl<'g> PatternCompiler<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            translations: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn translate_rule(&mut self, name: &str) -> Result<Translation> {
        if let Some(done) = self.translations.get(name) {
            return done.clone();
        }
        if self.in_progress.iter().any(|n| n == name) {
            return Err(Error::UnsupportedPattern(format!(
                "`{name}` refers to itself"
            )));
        }

        let grammar = self.grammar;
        let Some(rule) = grammar.rule(name) else {
            return Err(Error::UnsupportedPattern(format!(
                "`{name}` is not defined in this grammar"
            )));
        };
        if !rule.is_lexer() {
            return Err(Error::UnsupportedPattern(format!(
                "parser rule `{name}` used in a lexer pattern"
            )));
        }

        self.in_progress.push(name.to_string());
        let result = translate::translate(&rule.definition, &mut |r: &str| self.translate_rule(r));
        self.in_progress.pop();

        // Results inside a cycle depend on the entry point; only cache
        // translations made from the outermost call.
        if self.in_progress.is_empty() || result.is_ok() {
            self.translations.insert(name.to_string(), result.clone());
        }
        result
    }

    /// Translates a pattern written in the grammar, such as one alternative
    /// of a rule, resolving its references against the grammar's rules.
    pub fn translate_pattern(&mut self, pattern: &str) -> Result<Translation> {
        translate::translate(pattern, &mut |r: &str| self.translate_rule(r))
    }

    pub fn compile_rule(&mut self, name: &str) -> Result<Pattern> {
        Pattern::from_translation(self.translate_rule(name)?)
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for gramscope.
//!
//! The grammar model is the artifact every analysis consumes:
//! - **Grammar**: declared name and kind, ordered rules, lexer modes, imports, options
//! - **Rule**: one lexer or parser rule with its body text and extracted references
//! - **LexerMode**: a named lexing context and the lexer rules assigned to it
//!
//! Rule kind is never stored. It is derived from the first character of the
//! rule name (see [`utils::rule_kind`]), so the name and the kind cannot drift apart.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

mod invariants;
pub mod utils;


pub use utils::{is_identifier, is_lexer_name, rule_kind};

/// Name of the implicit lexer mode every grammar has.
pub const DEFAULT_MODE: &str = "DEFAULT_MODE";

/// End-of-input marker, always defined.
pub const EOF: &str = "EOF";

/// Token names a rule body may reference without defining them.
pub const BUILTIN_TOKENS: &[&str] = &[EOF];

// ============================================================================
// Kinds
// ============================================================================

/// Declared grammar flavor (`lexer grammar`, `parser grammar`, or plain `grammar`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarKind {
    Lexer,
    Parser,
    #[default]
    Combined,
}

impl std::fmt::Display for GrammarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarKind::Lexer => write!(f, "lexer"),
            GrammarKind::Parser => write!(f, "parser"),
            GrammarKind::Combined => write!(f, "combined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Lexer,
    Parser,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Lexer => write!(f, "lexer"),
            RuleKind::Parser => write!(f, "parser"),
        }
    }
}

// ============================================================================
// Rule
// ============================================================================

/// One lexer or parser rule, as recovered from source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    pub is_fragment: bool,
    /// Rule body between `:` and the terminating `;`, source lines joined by `\n`.
    pub definition: String,
    /// 1-based line of the rule name.
    pub line_number: usize,
    /// 1-based line where `definition` starts.
    pub body_line: usize,
    /// 1-based line holding the terminating `;` (or the last captured line).
    pub end_line: usize,
    /// Identifiers referenced from the body, in first-occurrence order.
    pub referenced_rules: IndexSet<String>,
    /// Owning lexer mode. `None` for parser rules.
    pub mode: Option<String>,
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        rule_kind(&self.name)
    }

    pub fn is_lexer(&self) -> bool {
        self.kind() == RuleKind::Lexer
    }

    pub fn is_parser(&self) -> bool {
        self.kind() == RuleKind::Parser
    }

    /// Whether the body references the rule's own name.
    pub fn is_self_referencing(&self) -> bool {
        self.referenced_rules.contains(&self.name)
    }

    /// References to other rules, excluding the rule itself.
    pub fn external_references(&self) -> impl Iterator<Item = &str> {
        self.referenced_rules
            .iter()
            .map(String::as_str)
            .filter(move |r| *r != self.name)
    }
}

// ============================================================================
// Lexer modes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexerMode {
    pub name: String,
    /// Declaration line. `None` for the implicit default mode.
    pub line_number: Option<usize>,
    pub rules: IndexSet<String>,
}

impl LexerMode {
    pub fn new(name: impl Into<String>, line_number: Option<usize>) -> Self {
        Self {
            name: name.into(),
            line_number,
            rules: IndexSet::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_MODE
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// A scanned grammar file.
///
/// Rules keep source order: lexer tie-breaks depend on declaration order.
/// `modes[0]` is always the default mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grammar {
    /// Declared grammar name. Empty when the declaration is missing.
    pub name: String,
    pub kind: GrammarKind,
    pub rules: Vec<Rule>,
    pub modes: Vec<LexerMode>,
    pub imports: IndexSet<String>,
    pub options: IndexMap<String, String>,
    /// Names declared in a `tokens { ... }` block.
    pub tokens: IndexSet<String>,
    /// Names declared in a `channels { ... }` block.
    pub channels: IndexSet<String>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: GrammarKind::default(),
            rules: Vec::new(),
            modes: vec![LexerMode::new(DEFAULT_MODE, None)],
            imports: IndexSet::new(),
            options: IndexMap::new(),
            tokens: IndexSet::new(),
            channels: IndexSet::new(),
        }
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }

    /// Whether `name` resolves to a rule, a declared token, or a built-in.
    pub fn defines(&self, name: &str) -> bool {
        self.contains(name) || self.tokens.contains(name) || BUILTIN_TOKENS.contains(&name)
    }

    pub fn lexer_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_lexer())
    }

    pub fn parser_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_parser())
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_fragment)
    }

    pub fn mode(&self, name: &str) -> Option<&LexerMode> {
        self.modes.iter().find(|m| m.name == name)
    }

    pub fn default_mode(&self) -> &LexerMode {
        self.ensure_default_mode()
    }

    /// Whether any mode besides the default one is declared.
    pub fn has_custom_modes(&self) -> bool {
        self.modes.iter().any(|m| !m.is_default())
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

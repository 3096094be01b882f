//! Gramscope: static analysis and simulation for BNF-style lexer/parser grammars.
//!
//! # Example
//!
//! ```
//! use gramscope_lib::Inspection;
//!
//! let source = r#"
//!     grammar Calc;
//!     expr : expr '+' term | term ;
//!     term : INT ;
//!     INT  : [0-9]+ ;
//!     WS   : [ \t]+ -> skip ;
//! "#;
//!
//! let inspection = Inspection::new(source);
//! eprintln!("{}", inspection.diagnostics().render(source));
//!
//! let tokens = inspection.tokenize("1 + 2");
//! assert!(tokens.errors.is_empty());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod config;
pub mod diagnostics;
pub mod matcher;
pub mod metrics;
pub mod pattern;
pub mod scanner;
pub mod simulate;
pub mod syntax;
pub mod tokenize;

mod inspection;


pub use gramscope_core::{Grammar, GrammarKind, LexerMode, Rule, RuleKind};

pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use inspection::Inspection;
pub use scanner::scan;

/// Errors from operations that cannot produce a result.
///
/// Problems in grammar content are never errors; they are [`Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("rule `{0}` is not defined")]
    RuleNotFound(String),

    /// Matching simulates parsing, so the target must be a parser rule.
    #[error("`{0}` is a lexer rule; only parser rules can be tested")]
    NotAParserRule(String),

    /// The pattern uses a construct the simulator cannot express.
    #[error("unsupported construct in pattern: {0}")]
    UnsupportedPattern(String),

    /// The translated pattern was rejected by the regex engine.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, Error>;

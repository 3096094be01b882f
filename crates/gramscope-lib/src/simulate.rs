//! Tokenization behind a swappable backend.
//!
//! A native backend would run the real generated lexer; [`Simulator`] is the
//! fallback built on the simulated tokenizer. Both report through
//! [`SimulationResult`], so callers can switch between them freely.

use serde::Serialize;

use crate::config::{ScanLimits, TokenizeOptions};
use crate::diagnostics::Diagnostics;
use crate::scanner::scan_with;
use crate::tokenize::{Token, TokenizeResult, tokenize_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Generated lexer run by an external toolchain.
    Native,
    Simulation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub success: bool,
    pub mode: SimulationMode,
    pub tokens: Vec<Token>,
    pub errors: Vec<String>,
}

impl SimulationResult {
    /// Wraps a tokenizer result; fails when any character went unmatched.
    pub fn simulated(result: TokenizeResult) -> Self {
        let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        Self {
            success: errors.is_empty(),
            mode: SimulationMode::Simulation,
            tokens: result.tokens,
            errors,
        }
    }

    /// Prepends the error-severity grammar diagnostics to `errors`, failing
    /// the result when there are any. Tokens are kept.
    pub fn with_grammar_errors(mut self, diagnostics: &Diagnostics) -> Self {
        let grammar_errors: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(ToString::to_string)
            .collect();
        if !grammar_errors.is_empty() {
            self.success = false;
            self.errors.splice(0..0, grammar_errors);
        }
        self
    }
}

/// Something that can tokenize input against grammar source text.
pub trait Backend {
    fn mode(&self) -> SimulationMode;

    fn tokenize(&self, grammar_source: &str, input: &str) -> SimulationResult;
}

/// Backend built on the simulated tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    limits: ScanLimits,
    options: TokenizeOptions,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_options(mut self, options: TokenizeOptions) -> Self {
        self.options = options;
        self
    }
}

impl Backend for Simulator {
    fn mode(&self) -> SimulationMode {
        SimulationMode::Simulation
    }

    /// Grammar errors are prepended to the tokenizer's errors and fail the
    /// result, but tokenization still runs on what was scanned.
    fn tokenize(&self, grammar_source: &str, input: &str) -> SimulationResult {
        let (grammar, diagnostics) = scan_with(grammar_source, &self.limits);
        SimulationResult::simulated(tokenize_with(&grammar, input, &self.options))
            .with_grammar_errors(&diagnostics)
    }
}

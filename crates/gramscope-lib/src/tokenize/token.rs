use serde::Serialize;

use crate::diagnostics::Diagnostics;

/// One token produced by the simulated lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Rule name, `type(X)` override, or quoted text for implicit literals.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    /// Byte offsets into the input.
    pub start: usize,
    pub end: usize,
    /// 1-based.
    pub line: usize,
    /// 0-based, in characters.
    pub column: usize,
    /// Produced by a `-> skip` rule; matching ignores it.
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Token {
    /// On the default channel and not skipped.
    pub fn is_visible(&self) -> bool {
        !self.skipped && self.channel.is_none()
    }
}

/// Input position where no rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizeError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub character: char,
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no rule matches {:?} at line {}, column {}",
            self.character, self.line, self.column
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<TokenizeError>,
    /// Lexer rules that could not be compiled and never match.
    pub diagnostics: Diagnostics,
}

impl TokenizeResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Tokens a parser would see.
    pub fn visible(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_visible())
    }

    /// Types of the visible tokens.
    pub fn types(&self) -> Vec<&str> {
        self.visible().map(|t| t.kind.as_str()).collect()
    }
}

/// Line and column tracking over consumed text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Self { line: 1, column: 0 }
    }

    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }
}

//! Lexer commands written after `->` in a lexer rule.

use std::fmt;

use super::{SyntaxKind, Token};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LexerCommand {
    Skip,
    More,
    Channel(String),
    Type(String),
    PushMode(String),
    PopMode,
    Mode(String),
    /// Any command the simulator does not interpret.
    Other(String),
}

impl LexerCommand {
    pub fn new(name: &str, arg: Option<&str>) -> Self {
        match (name, arg) {
            ("skip", None) => Self::Skip,
            ("more", None) => Self::More,
            ("popMode", None) => Self::PopMode,
            ("channel", Some(a)) => Self::Channel(a.to_string()),
            ("type", Some(a)) => Self::Type(a.to_string()),
            ("pushMode", Some(a)) => Self::PushMode(a.to_string()),
            ("mode", Some(a)) => Self::Mode(a.to_string()),
            (n, Some(a)) => Self::Other(format!("{n}({a})")),
            (n, None) => Self::Other(n.to_string()),
        }
    }

    /// Target mode for `pushMode(X)` and `mode(X)`.
    pub fn target_mode(&self) -> Option<&str> {
        match self {
            Self::PushMode(m) | Self::Mode(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for LexerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::More => write!(f, "more"),
            Self::Channel(c) => write!(f, "channel({c})"),
            Self::Type(t) => write!(f, "type({t})"),
            Self::PushMode(m) => write!(f, "pushMode({m})"),
            Self::PopMode => write!(f, "popMode"),
            Self::Mode(m) => write!(f, "mode({m})"),
            Self::Other(o) => write!(f, "{o}"),
        }
    }
}

/// Parses the command list following an `->`.
///
/// `tokens` starts right after the arrow; parsing stops at the first token
/// that cannot continue the list. Returns the commands and the number of
/// tokens consumed.
pub(crate) fn parse_commands(tokens: &[Token<'_>]) -> (Vec<LexerCommand>, usize) {
    let mut commands = Vec::new();
    let mut pos = 0;

    while let Some(name) = tokens.get(pos).filter(|t| t.is(SyntaxKind::Ident)) {
        pos += 1;
        let mut arg = None;
        if tokens.get(pos).is_some_and(|t| t.is(SyntaxKind::ParenOpen)) {
            let mut end = pos + 1;
            while tokens
                .get(end)
                .is_some_and(|t| !t.is(SyntaxKind::ParenClose))
            {
                end += 1;
            }
            arg = tokens.get(pos + 1).filter(|_| end > pos + 1).map(|t| t.text);
            pos = (end + 1).min(tokens.len());
        }
        commands.push(LexerCommand::new(name.text, arg));

        if tokens.get(pos).is_some_and(|t| t.is(SyntaxKind::Comma)) {
            pos += 1;
        } else {
            break;
        }
    }

    (commands, pos)
}

/// Commands of the top-level alternatives of a lexer rule, in source order.
pub fn lexer_commands(definition: &str) -> Vec<LexerCommand> {
    let tokens = super::lex_significant(definition);
    let mut commands = Vec::new();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < tokens.len() {
        match tokens[pos].kind {
            SyntaxKind::ParenOpen => depth += 1,
            SyntaxKind::ParenClose => depth = depth.saturating_sub(1),
            SyntaxKind::Arrow if depth == 0 => {
                let (parsed, used) = parse_commands(&tokens[pos + 1..]);
                for cmd in parsed {
                    if !commands.contains(&cmd) {
                        commands.push(cmd);
                    }
                }
                pos += used;
            }
            _ => {}
        }
        pos += 1;
    }

    commands
}

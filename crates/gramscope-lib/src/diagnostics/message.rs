use serde::Serialize;

/// Diagnostic kinds, grouped by the pass that emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticKind {
    // Scanner: the source could not be read as a grammar
    MissingGrammarDeclaration,
    DuplicateRule,
    MissingColon,
    MissingTerminator,
    UnterminatedBlock,
    UnrecognizedLine,

    // Reference graph
    UndefinedReference,
    UnusedRule,
    DirectLeftRecursion,
    LexerLeftRecursion,
    HiddenLeftRecursion,

    // Alternatives
    DuplicateAlternative,
    OverlappingAlternatives,
    AmbiguousOptional,

    // Lexer rules
    LexerConflict,
    UnsupportedPattern,
    InvalidPattern,
    RedosRisk,

    // Lexer modes
    UndefinedMode,
    UnreachableMode,
    PopFromDefaultMode,
    ModeCycle,
    EmptyMode,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::MissingGrammarDeclaration
            | Self::DuplicateRule
            | Self::MissingColon
            | Self::MissingTerminator
            | Self::UnterminatedBlock
            | Self::UndefinedReference
            | Self::LexerLeftRecursion
            | Self::HiddenLeftRecursion
            | Self::DuplicateAlternative
            | Self::UndefinedMode => Severity::Error,

            Self::DirectLeftRecursion => Severity::Info,

            Self::UnrecognizedLine
            | Self::UnusedRule
            | Self::OverlappingAlternatives
            | Self::AmbiguousOptional
            | Self::LexerConflict
            | Self::UnsupportedPattern
            | Self::InvalidPattern
            | Self::RedosRisk
            | Self::UnreachableMode
            | Self::PopFromDefaultMode
            | Self::ModeCycle
            | Self::EmptyMode => Severity::Warning,
        }
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingGrammarDeclaration => Some("start the file with e.g. `grammar Name;`"),
            Self::MissingTerminator => Some("terminate the rule with `;`"),
            Self::HiddenLeftRecursion => {
                Some("only direct left recursion is rewritten; inline the cycle into one rule")
            }
            Self::LexerLeftRecursion => Some("lexer rules cannot be left-recursive"),
            Self::AmbiguousOptional => Some("`X? X` matches a single `X` two ways; use `X X?`"),
            Self::RedosRisk => Some("make the inner alternatives disjoint or bound the repetition"),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingGrammarDeclaration => "missing grammar declaration",
            Self::DuplicateRule => "duplicate rule",
            Self::MissingColon => "rule name not followed by `:`",
            Self::MissingTerminator => "rule is missing its `;` terminator",
            Self::UnterminatedBlock => "block is never closed",
            Self::UnrecognizedLine => "unrecognized line",

            Self::UndefinedReference => "undefined reference",
            Self::UnusedRule => "rule is never referenced",
            Self::DirectLeftRecursion => "rule is directly left-recursive",
            Self::LexerLeftRecursion => "lexer rule is left-recursive",
            Self::HiddenLeftRecursion => "hidden left recursion",

            Self::DuplicateAlternative => "duplicate alternative",
            Self::OverlappingAlternatives => "alternatives share a common prefix",
            Self::AmbiguousOptional => "ambiguous optional element",

            Self::LexerConflict => "lexer rule is shadowed by an earlier rule",
            Self::UnsupportedPattern => "pattern cannot be simulated",
            Self::InvalidPattern => "pattern does not compile",
            Self::RedosRisk => "pattern may backtrack catastrophically",

            Self::UndefinedMode => "undefined lexer mode",
            Self::UnreachableMode => "lexer mode is never entered",
            Self::PopFromDefaultMode => "`popMode` issued from the default mode",
            Self::ModeCycle => "lexer modes form a cycle",
            Self::EmptyMode => "lexer mode has no rules",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateRule => "rule `{}` is already defined".to_string(),
            Self::MissingColon => "rule `{}` is not followed by `:`".to_string(),
            Self::MissingTerminator => "rule `{}` is missing its `;` terminator".to_string(),
            Self::UndefinedReference => "`{}` is not defined".to_string(),
            Self::UnusedRule => "rule `{}` is never referenced".to_string(),
            Self::DirectLeftRecursion => "rule `{}` is directly left-recursive".to_string(),
            Self::LexerLeftRecursion => "lexer rule `{}` is left-recursive".to_string(),
            Self::UndefinedMode => "mode `{}` is not defined".to_string(),
            Self::UnreachableMode => "mode `{}` is never entered".to_string(),
            Self::EmptyMode => "mode `{}` has no rules".to_string(),

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInfo {
    pub(crate) line: usize,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One issue found in a grammar.
///
/// Issues are data: they accumulate alongside a successful analysis and never abort it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) severity: Severity,
    pub(crate) message: String,
    /// 1-based source line, when the issue can be pinned to one.
    pub(crate) line: Option<usize>,
    pub(crate) rule: Option<String>,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            line: None,
            rule: None,
            related: Vec::new(),
            hints: kind
                .default_hint()
                .map(|h| vec![h.to_string()])
                .unwrap_or_default(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind) -> Self {
        Self::new(kind, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {}: {}", self.severity, line, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        for related in &self.related {
            write!(f, " (related: {} at line {})", related.message, related.line)?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

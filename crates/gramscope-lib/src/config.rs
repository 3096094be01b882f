//! Tunables for each analysis stage.
//!
//! Every struct has a `Default` matching conventional grammar style and
//! `with_*` builders for overrides.

/// Bounds on the scanner's work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLimits {
    /// Lines a single rule may span before it is reported as unterminated.
    pub max_rule_lines: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_rule_lines: 10_000,
        }
    }
}

impl ScanLimits {
    pub fn with_max_rule_lines(mut self, limit: usize) -> Self {
        self.max_rule_lines = limit;
        self
    }
}

/// Rule names conventionally used only through `-> skip` or a hidden channel.
pub const DEFAULT_UNUSED_ALLOW_LIST: &[&str] = &[
    "WS",
    "WHITESPACE",
    "NEWLINE",
    "NL",
    "COMMENT",
    "LINE_COMMENT",
    "BLOCK_COMMENT",
    "DOC_COMMENT",
    "SPACE",
    "SPACES",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Rules never reported as unused.
    pub unused_allow_list: Vec<String>,
    /// Start rules; exempt from the unused-rule check.
    pub entry_rules: Vec<String>,
    /// Tokens of a lexer grammar are its output and count as used.
    pub exempt_lexer_grammar_tokens: bool,
    /// `skip` and `channel(..)` tokens are consumed by the lexer and count
    /// as used.
    pub exempt_hidden_tokens: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            unused_allow_list: DEFAULT_UNUSED_ALLOW_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            entry_rules: Vec::new(),
            exempt_lexer_grammar_tokens: true,
            exempt_hidden_tokens: true,
        }
    }
}

impl ValidateOptions {
    pub fn with_entry_rule(mut self, name: impl Into<String>) -> Self {
        self.entry_rules.push(name.into());
        self
    }

    pub fn with_allowed_unused(mut self, name: impl Into<String>) -> Self {
        self.unused_allow_list.push(name.into());
        self
    }

    pub fn with_exempt_lexer_grammar_tokens(mut self, on: bool) -> Self {
        self.exempt_lexer_grammar_tokens = on;
        self
    }

    pub fn with_exempt_hidden_tokens(mut self, on: bool) -> Self {
        self.exempt_hidden_tokens = on;
        self
    }

    pub(crate) fn exempt_from_unused(&self, name: &str) -> bool {
        self.unused_allow_list.iter().any(|n| n == name) || self.entry_rules.iter().any(|n| n == name)
    }
}

/// Switches for the individual ambiguity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguityOptions {
    pub duplicate_alternatives: bool,
    pub overlapping_prefixes: bool,
    pub ambiguous_optionals: bool,
    pub left_recursion: bool,
    pub lexer_conflicts: bool,
    /// Shortest shared element prefix reported as an overlap.
    pub min_shared_prefix: usize,
}

impl Default for AmbiguityOptions {
    fn default() -> Self {
        Self {
            duplicate_alternatives: true,
            overlapping_prefixes: true,
            ambiguous_optionals: true,
            left_recursion: true,
            lexer_conflicts: true,
            min_shared_prefix: 2,
        }
    }
}

impl AmbiguityOptions {
    /// All checks disabled; enable the wanted ones with the `with_*` builders.
    pub fn none() -> Self {
        Self {
            duplicate_alternatives: false,
            overlapping_prefixes: false,
            ambiguous_optionals: false,
            left_recursion: false,
            lexer_conflicts: false,
            min_shared_prefix: 2,
        }
    }

    pub fn with_duplicate_alternatives(mut self, on: bool) -> Self {
        self.duplicate_alternatives = on;
        self
    }

    pub fn with_overlapping_prefixes(mut self, on: bool) -> Self {
        self.overlapping_prefixes = on;
        self
    }

    pub fn with_ambiguous_optionals(mut self, on: bool) -> Self {
        self.ambiguous_optionals = on;
        self
    }

    pub fn with_left_recursion(mut self, on: bool) -> Self {
        self.left_recursion = on;
        self
    }

    pub fn with_lexer_conflicts(mut self, on: bool) -> Self {
        self.lexer_conflicts = on;
        self
    }

    pub fn with_min_shared_prefix(mut self, len: usize) -> Self {
        self.min_shared_prefix = len.max(1);
        self
    }
}

/// Thresholds for metrics and bottleneck findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Fan-in above this marks a hub rule.
    pub hub_threshold: usize,
    /// Cap on recursion-depth search; also the score of direct self-reference.
    pub max_recursion_depth: usize,
    pub high_complexity: usize,
    pub many_alternatives: usize,
    pub deep_nesting: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            hub_threshold: 5,
            max_recursion_depth: 10,
            high_complexity: 10,
            many_alternatives: 8,
            deep_nesting: 4,
        }
    }
}

impl MetricsConfig {
    pub fn with_hub_threshold(mut self, n: usize) -> Self {
        self.hub_threshold = n;
        self
    }

    pub fn with_max_recursion_depth(mut self, n: usize) -> Self {
        self.max_recursion_depth = n.max(1);
        self
    }

    pub fn with_high_complexity(mut self, n: usize) -> Self {
        self.high_complexity = n;
        self
    }

    pub fn with_many_alternatives(mut self, n: usize) -> Self {
        self.many_alternatives = n;
        self
    }

    pub fn with_deep_nesting(mut self, n: usize) -> Self {
        self.deep_nesting = n;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Restrict tokenization to these lexer rules, in this order of precedence.
    /// Overrides the default-mode restriction.
    pub rules: Option<Vec<String>>,
    /// Add literals used by parser rules that no lexer rule spells out.
    pub include_implicit_literals: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            rules: None,
            include_implicit_literals: true,
        }
    }
}

impl TokenizeOptions {
    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = Some(rules.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_implicit_literals(mut self, on: bool) -> Self {
        self.include_implicit_literals = on;
        self
    }
}

/// Configuration for every stage of an [`Inspection`](crate::Inspection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub scan: ScanLimits,
    pub validate: ValidateOptions,
    pub ambiguity: AmbiguityOptions,
    pub metrics: MetricsConfig,
    pub tokenize: TokenizeOptions,
}

impl Config {
    pub fn with_scan(mut self, scan: ScanLimits) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_validate(mut self, validate: ValidateOptions) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_ambiguity(mut self, ambiguity: AmbiguityOptions) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_tokenize(mut self, tokenize: TokenizeOptions) -> Self {
        self.tokenize = tokenize;
        self
    }
}

//! One grammar source, analyzed once, queried many times.

use std::fmt::Write;

use gramscope_core::{DEFAULT_MODE, Grammar};

use crate::analyze::{RuleUsage, analyze_ambiguities, dependency_order, find_rule_usages, validate};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::matcher::{MatchResult, test_rule, test_rule_tokens};
use crate::metrics::{BottleneckReport, GrammarMetrics, bottlenecks, check_modes, check_redos, metrics};
use crate::scanner::scan_with;
use crate::simulate::SimulationResult;
use crate::syntax::{RuleStructure, lexer_commands};
use crate::tokenize::{TokenizeResult, tokenize_with};
use crate::Result;

/// A scanned and checked grammar.
///
/// Construction runs scan, validation, ambiguity, mode and ReDoS checks and
/// keeps their diagnostics. Metrics, tokenization and matching run on demand.
#[derive(Debug, Clone)]
pub struct Inspection<'s> {
    source: &'s str,
    config: Config,
    grammar: Grammar,
    scan_diagnostics: Diagnostics,
    check_diagnostics: Diagnostics,
}

impl<'s> Inspection<'s> {
    pub fn new(source: &'s str) -> Self {
        Self::run(source, Config::default())
    }

    /// Re-runs every stage under `config`.
    pub fn with_config(self, config: Config) -> Self {
        Self::run(self.source, config)
    }

    fn run(source: &'s str, config: Config) -> Self {
        let (grammar, scan_diagnostics) = scan_with(source, &config.scan);

        let mut check_diagnostics = validate(&grammar, &config.validate);
        check_diagnostics.extend(analyze_ambiguities(&grammar, &config.ambiguity));
        check_diagnostics.extend(check_modes(&grammar));
        check_diagnostics.extend(check_redos(&grammar));

        Self {
            source,
            config,
            grammar,
            scan_diagnostics,
            check_diagnostics,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Problems found while reading the source.
    pub fn scan_diagnostics(&self) -> &Diagnostics {
        &self.scan_diagnostics
    }

    /// Problems found by the checks over the scanned grammar.
    pub fn check_diagnostics(&self) -> &Diagnostics {
        &self.check_diagnostics
    }

    /// Every stage's diagnostics, scan first.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut all = self.scan_diagnostics.clone();
        all.extend(self.check_diagnostics.clone());
        all
    }

    /// No error-severity diagnostics in any stage.
    pub fn is_valid(&self) -> bool {
        !self.scan_diagnostics.has_errors() && !self.check_diagnostics.has_errors()
    }

    pub fn metrics(&self) -> GrammarMetrics {
        metrics(&self.grammar, &self.config.metrics)
    }

    pub fn bottlenecks(&self) -> BottleneckReport {
        bottlenecks(&self.grammar, &self.config.metrics)
    }

    pub fn tokenize(&self, input: &str) -> TokenizeResult {
        tokenize_with(&self.grammar, input, &self.config.tokenize)
    }

    /// Tokenization in the shape a native backend would report. Scan errors
    /// fail the result, as they do for [`Simulator`](crate::simulate::Simulator).
    pub fn simulate(&self, input: &str) -> SimulationResult {
        SimulationResult::simulated(self.tokenize(input)).with_grammar_errors(&self.scan_diagnostics)
    }

    pub fn test_rule(&self, rule: &str, token_types: &[&str]) -> Result<MatchResult> {
        test_rule(&self.grammar, rule, token_types)
    }

    /// Tokenizes `input`, then matches the visible tokens against `rule`.
    pub fn test_rule_input(&self, rule: &str, input: &str) -> Result<MatchResult> {
        test_rule_tokens(&self.grammar, rule, &self.tokenize(input).tokens)
    }

    pub fn rule_usages(&self, name: &str) -> Vec<RuleUsage> {
        find_rule_usages(&self.grammar, name)
    }

    pub fn dependency_order(&self) -> Vec<String> {
        dependency_order(&self.grammar)
    }

    /// One line per rule: name, kind, flags, line, normalized body and
    /// lexer commands.
    pub fn dump_rules(&self) -> String {
        let mut out = String::new();
        for rule in &self.grammar.rules {
            let _ = write!(out, "{} {}", rule.name, rule.kind());
            if rule.is_fragment {
                out.push_str(" fragment");
            }
            if let Some(mode) = rule.mode.as_deref().filter(|m| *m != DEFAULT_MODE) {
                let _ = write!(out, " mode={mode}");
            }
            let structure = RuleStructure::parse(&rule.definition);
            let _ = write!(out, " @{}: {structure}", rule.line_number);
            if rule.is_lexer() {
                for cmd in lexer_commands(&rule.definition) {
                    let _ = write!(out, " -> {cmd}");
                }
            }
            out.push('\n');
        }
        out
    }

    /// Plain one-line-per-diagnostic rendering.
    pub fn dump_diagnostics(&self) -> String {
        self.diagnostics().printer().render()
    }

    pub fn dump_tokens(&self, input: &str) -> String {
        let result = self.tokenize(input);
        let mut out = String::new();
        for t in &result.tokens {
            let _ = write!(
                out,
                "{} {:?} {}..{} @{}:{}",
                t.kind, t.value, t.start, t.end, t.line, t.column
            );
            if t.skipped {
                out.push_str(" skipped");
            }
            if let Some(channel) = &t.channel {
                let _ = write!(out, " channel={channel}");
            }
            out.push('\n');
        }
        for e in &result.errors {
            let _ = writeln!(out, "error: {e}");
        }
        out
    }

    pub fn dump_metrics(&self) -> String {
        let m = self.metrics();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "rules: {} (parser {}, lexer {}, fragments {}), modes: {}",
            m.size.total_rules, m.size.parser_rules, m.size.lexer_rules, m.size.fragments, m.size.modes
        );
        let _ = writeln!(
            out,
            "complexity: avg {:.2}, max {}",
            m.complexity.average, m.complexity.max
        );

        let rows = m
            .complexity
            .rules
            .iter()
            .zip(&m.branching.rules)
            .zip(&m.dependencies.rules);
        for ((c, b), d) in rows {
            let _ = writeln!(
                out,
                "{} complexity={} alternatives={} depth={} in={} out={} recursion={}",
                c.rule, c.complexity, b.alternatives, b.max_depth, d.fan_in, d.fan_out, d.recursion_depth
            );
        }

        let _ = writeln!(out, "orphans: {}", list(&m.dependencies.orphans));
        let _ = writeln!(out, "hubs: {}", list(&m.dependencies.hubs));
        out
    }
}

fn list(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

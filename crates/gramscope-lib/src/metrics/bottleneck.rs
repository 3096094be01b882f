//! Ranked findings over the metrics, ReDoS and mode checks.

use std::fmt;

use serde::Serialize;

use gramscope_core::Grammar;

use super::{RedosKind, check_modes, metrics, redos_findings};
use crate::analyze::dependency_order;
use crate::config::MetricsConfig;
use crate::diagnostics::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckKind {
    HighComplexity,
    ExcessiveAlternatives,
    DeepNesting,
    HubRule,
    DeepRecursion,
    RedosRisk,
    ModeProblem,
}

impl fmt::Display for BottleneckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HighComplexity => "high-complexity",
            Self::ExcessiveAlternatives => "excessive-alternatives",
            Self::DeepNesting => "deep-nesting",
            Self::HubRule => "hub-rule",
            Self::DeepRecursion => "deep-recursion",
            Self::RedosRisk => "redos-risk",
            Self::ModeProblem => "mode-problem",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bottleneck {
    pub kind: BottleneckKind,
    pub rule: Option<String>,
    pub line: Option<usize>,
    pub severity: Severity,
    /// Magnitude within the kind; higher is worse.
    pub score: usize,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.severity, self.kind, self.score)?;
        if let Some(rule) = &self.rule {
            write!(f, " `{rule}`")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggestion: {suggestion})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BottleneckReport {
    /// Most severe first, then highest score; ties keep discovery order.
    pub findings: Vec<Bottleneck>,
    /// Parser rules with each rule after the rules it references.
    pub suggested_order: Vec<String>,
}

pub fn bottlenecks(grammar: &Grammar, config: &MetricsConfig) -> BottleneckReport {
    let mut findings = Vec::new();
    let m = metrics(grammar, config);

    for (rule, c) in grammar.rules.iter().zip(&m.complexity.rules) {
        if c.complexity > config.high_complexity {
            findings.push(Bottleneck {
                kind: BottleneckKind::HighComplexity,
                rule: Some(rule.name.clone()),
                line: Some(rule.line_number),
                severity: escalate(c.complexity, config.high_complexity),
                score: c.complexity,
                message: format!("complexity {} exceeds {}", c.complexity, config.high_complexity),
                suggestion: Some("split the rule into smaller sub-rules".to_string()),
            });
        }
    }

    for (rule, b) in grammar.rules.iter().zip(&m.branching.rules) {
        if b.alternatives > config.many_alternatives {
            findings.push(Bottleneck {
                kind: BottleneckKind::ExcessiveAlternatives,
                rule: Some(rule.name.clone()),
                line: Some(rule.line_number),
                severity: escalate(b.alternatives, config.many_alternatives),
                score: b.alternatives,
                message: format!("{} alternatives", b.alternatives),
                suggestion: Some("group related alternatives under their own rules".to_string()),
            });
        }
        if b.max_depth > config.deep_nesting {
            findings.push(Bottleneck {
                kind: BottleneckKind::DeepNesting,
                rule: Some(rule.name.clone()),
                line: Some(rule.line_number),
                severity: Severity::Info,
                score: b.max_depth,
                message: format!("groups nested {} deep", b.max_depth),
                suggestion: Some("extract nested groups into named rules".to_string()),
            });
        }
    }

    for (rule, d) in grammar.rules.iter().zip(&m.dependencies.rules) {
        if d.fan_in > config.hub_threshold {
            findings.push(Bottleneck {
                kind: BottleneckKind::HubRule,
                rule: Some(rule.name.clone()),
                line: Some(rule.line_number),
                severity: Severity::Info,
                score: d.fan_in,
                message: format!("referenced by {} rules", d.fan_in),
                suggestion: Some("changes here ripple widely; keep the rule stable".to_string()),
            });
        }
        if d.recursion_depth * 2 > config.max_recursion_depth {
            let message = if d.recursion_depth >= config.max_recursion_depth {
                "recursion without a bound".to_string()
            } else {
                format!("recursion through {} rules", d.recursion_depth)
            };
            findings.push(Bottleneck {
                kind: BottleneckKind::DeepRecursion,
                rule: Some(rule.name.clone()),
                line: Some(rule.line_number),
                severity: Severity::Info,
                score: d.recursion_depth,
                message,
                suggestion: None,
            });
        }
    }

    for finding in redos_findings(grammar) {
        let score = match finding.kind {
            RedosKind::NestedQuantifier => 3,
            RedosKind::SharedPrefix => 2,
            RedosKind::BroadRepetition => 1,
        };
        findings.push(Bottleneck {
            kind: BottleneckKind::RedosRisk,
            line: Some(finding.line),
            severity: Severity::Warning,
            score,
            message: format!("{} `{}`", finding.kind, finding.pattern),
            suggestion: Some(match finding.kind {
                RedosKind::BroadRepetition => "use a non-greedy loop or exclude the closing character".to_string(),
                _ => "make the repeated alternatives disjoint".to_string(),
            }),
            rule: Some(finding.rule),
        });
    }

    for d in check_modes(grammar).iter() {
        findings.push(Bottleneck {
            kind: BottleneckKind::ModeProblem,
            rule: d.rule().map(str::to_string),
            line: d.line(),
            severity: d.severity(),
            score: 1,
            message: d.message().to_string(),
            suggestion: d.hints().first().cloned(),
        });
    }

    findings.sort_by(|a, b| a.severity.cmp(&b.severity).then(b.score.cmp(&a.score)));

    BottleneckReport {
        findings,
        suggested_order: dependency_order(grammar),
    }
}

/// Warning at twice the threshold, informational below.
fn escalate(value: usize, threshold: usize) -> Severity {
    if value >= threshold.saturating_mul(2) {
        Severity::Warning
    } else {
        Severity::Info
    }
}

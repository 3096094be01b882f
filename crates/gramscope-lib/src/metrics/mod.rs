//! Grammar metrics and bottleneck findings.
//!
//! Complexity and branching come from one depth-tracking pass over each
//! rule body ([`body_shape`]), so quoted `|` or `(` never count. Fan-in,
//! fan-out and recursion depth come from the [`ReferenceGraph`].

mod bottleneck;
mod modes;
mod redos;

#[cfg(test)]
mod bottleneck_tests;

use std::collections::HashMap;

use serde::Serialize;

use gramscope_core::Grammar;

use crate::analyze::ReferenceGraph;
use crate::config::MetricsConfig;
use crate::syntax::body_shape;

pub use bottleneck::{Bottleneck, BottleneckKind, BottleneckReport, bottlenecks};
pub use modes::{ModeGraph, ModeTransition, check_modes};
pub use redos::{RedosFinding, RedosKind, check_redos, redos_findings};

/// Rules listed in `most_complex`.
const MOST_COMPLEX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarMetrics {
    pub size: SizeMetrics,
    pub branching: BranchingMetrics,
    pub complexity: ComplexityMetrics,
    pub dependencies: DependencyMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeMetrics {
    pub total_rules: usize,
    pub parser_rules: usize,
    /// Lexer rules, fragments included.
    pub lexer_rules: usize,
    pub fragments: usize,
    /// Modes, the default mode included.
    pub modes: usize,
    /// Mean definition length in characters.
    pub average_rule_length: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleBranching {
    pub rule: String,
    pub alternatives: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchingMetrics {
    pub rules: Vec<RuleBranching>,
    pub average_alternatives: f64,
    pub max_alternatives: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleComplexity {
    pub rule: String,
    pub complexity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityMetrics {
    pub rules: Vec<RuleComplexity>,
    pub average: f64,
    pub max: usize,
    /// Highest first; ties in source order.
    pub most_complex: Vec<RuleComplexity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDependencies {
    pub rule: String,
    pub fan_in: usize,
    pub fan_out: usize,
    /// Length of the shortest reference cycle back to the rule, 0 if none.
    pub recursion_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyMetrics {
    pub rules: Vec<RuleDependencies>,
    /// No references from other rules.
    pub orphans: Vec<String>,
    /// Fan-in above the hub threshold.
    pub hubs: Vec<String>,
}

/// Cyclomatic complexity of a rule body: 1, plus one per top-level `|`,
/// plus one per top-level quantifier.
///
/// ```
/// use gramscope_lib::metrics::complexity;
///
/// assert_eq!(complexity("ID"), 1);
/// assert_eq!(complexity("a | b (c | d | e)"), 2);
/// assert_eq!(complexity("a* '|' b+"), 3);
/// ```
pub fn complexity(body: &str) -> usize {
    let shape = body_shape(body);
    1 + shape.top_level_pipes + shape.top_level_quantifiers
}

pub fn metrics(grammar: &Grammar, config: &MetricsConfig) -> GrammarMetrics {
    GrammarMetrics {
        size: size_metrics(grammar),
        branching: branching_metrics(grammar),
        complexity: complexity_metrics(grammar),
        dependencies: dependency_metrics(grammar, config),
    }
}

fn size_metrics(grammar: &Grammar) -> SizeMetrics {
    let total_len: usize = grammar
        .rules
        .iter()
        .map(|r| r.definition.chars().count())
        .sum();
    SizeMetrics {
        total_rules: grammar.rules.len(),
        parser_rules: grammar.parser_rules().count(),
        lexer_rules: grammar.lexer_rules().count(),
        fragments: grammar.fragments().count(),
        modes: grammar.modes.len(),
        average_rule_length: mean(total_len, grammar.rules.len()),
    }
}

fn branching_metrics(grammar: &Grammar) -> BranchingMetrics {
    let rules: Vec<RuleBranching> = grammar
        .rules
        .iter()
        .map(|r| {
            let shape = body_shape(&r.definition);
            RuleBranching {
                rule: r.name.clone(),
                alternatives: shape.alternatives(),
                max_depth: shape.max_depth,
            }
        })
        .collect();

    BranchingMetrics {
        average_alternatives: mean(rules.iter().map(|r| r.alternatives).sum(), rules.len()),
        max_alternatives: rules.iter().map(|r| r.alternatives).max().unwrap_or(0),
        max_depth: rules.iter().map(|r| r.max_depth).max().unwrap_or(0),
        rules,
    }
}

fn complexity_metrics(grammar: &Grammar) -> ComplexityMetrics {
    let rules: Vec<RuleComplexity> = grammar
        .rules
        .iter()
        .map(|r| RuleComplexity {
            rule: r.name.clone(),
            complexity: complexity(&r.definition),
        })
        .collect();

    let mut most_complex = rules.clone();
    most_complex.sort_by(|a, b| b.complexity.cmp(&a.complexity));
    most_complex.truncate(MOST_COMPLEX_LEN);

    ComplexityMetrics {
        average: mean(rules.iter().map(|r| r.complexity).sum(), rules.len()),
        max: rules.iter().map(|r| r.complexity).max().unwrap_or(0),
        most_complex,
        rules,
    }
}

fn dependency_metrics(grammar: &Grammar, config: &MetricsConfig) -> DependencyMetrics {
    let graph = ReferenceGraph::build(grammar);
    let rules: Vec<RuleDependencies> = grammar
        .rules
        .iter()
        .map(|r| RuleDependencies {
            rule: r.name.clone(),
            fan_in: graph.fan_in(&r.name),
            fan_out: graph.fan_out(&r.name),
            recursion_depth: recursion_depth(&graph, &r.name, config.max_recursion_depth),
        })
        .collect();

    DependencyMetrics {
        orphans: rules
            .iter()
            .filter(|r| r.fan_in == 0)
            .map(|r| r.rule.clone())
            .collect(),
        hubs: rules
            .iter()
            .filter(|r| r.fan_in > config.hub_threshold)
            .map(|r| r.rule.clone())
            .collect(),
        rules,
    }
}

/// Length of the shortest reference cycle from `rule` back to itself,
/// searched depth-first up to `cap` steps. 0 when there is none.
///
/// Direct self-reference scores `cap`: the rule can recurse without bound
/// whatever the rest of the graph looks like.
pub fn recursion_depth(graph: &ReferenceGraph, rule: &str, cap: usize) -> usize {
    if graph.is_self_referencing(rule) {
        return cap;
    }

    let mut shortest: Option<usize> = None;
    // Depth at which each rule was first reached; deeper revisits are pruned.
    let mut reached: HashMap<&str, usize> = HashMap::new();
    let mut stack = vec![(rule, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let next_depth = depth + 1;
        for next in graph.successors(node) {
            if next == node {
                continue;
            }
            if next == rule {
                shortest = Some(shortest.map_or(next_depth, |s| s.min(next_depth)));
                continue;
            }
            if next_depth >= cap
                || shortest.is_some_and(|s| next_depth >= s)
                || reached.get(next).is_some_and(|&d| d <= next_depth)
            {
                continue;
            }
            reached.insert(next, next_depth);
            stack.push((next, next_depth));
        }
    }

    shortest.unwrap_or(0)
}

fn mean(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

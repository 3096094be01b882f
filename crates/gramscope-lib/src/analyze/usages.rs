use serde::Serialize;

use gramscope_core::Grammar;

use super::line_at;
use crate::syntax::references;

/// One reference to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleUsage {
    /// Rule whose body contains the reference.
    pub rule: String,
    pub line: usize,
}

/// Every reference to `name`, in source order, self-references included.
pub fn find_rule_usages(grammar: &Grammar, name: &str) -> Vec<RuleUsage> {
    grammar
        .rules
        .iter()
        .flat_map(|rule| {
            references(&rule.definition)
                .into_iter()
                .filter(move |r| r.name == name)
                .map(move |r| RuleUsage {
                    rule: rule.name.clone(),
                    line: line_at(rule, r.offset),
                })
        })
        .collect()
}

//! Structural analysis over the scanned grammar model.
//!
//! - [`validate`]: undefined references and unused rules.
//! - [`analyze_ambiguities`]: alternative-level ambiguity, left recursion
//!   and lexer-rule shadowing, each behind an [`AmbiguityOptions`] switch.
//! - [`dependency_order`] and [`find_rule_usages`]: graph queries.

mod ambiguity;
mod conflicts;
mod graph;
mod order;
mod recursion;
mod usages;
mod validate;

#[cfg(test)]
mod ambiguity_tests;
#[cfg(test)]
mod graph_tests;
#[cfg(test)]
mod recursion_tests;
#[cfg(test)]
mod validate_tests;

use gramscope_core::{Grammar, Rule};

use crate::config::AmbiguityOptions;
use crate::diagnostics::Diagnostics;

pub use graph::ReferenceGraph;
pub use order::dependency_order;
pub use usages::{RuleUsage, find_rule_usages};
pub use validate::validate;

/// Upper bound on the depth of any graph walk.
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

pub fn analyze_ambiguities(grammar: &Grammar, options: &AmbiguityOptions) -> Diagnostics {
    let mut diag = Diagnostics::new();
    ambiguity::check_alternatives(grammar, options, &mut diag);
    if options.left_recursion {
        recursion::check_left_recursion(grammar, &mut diag);
    }
    if options.lexer_conflicts {
        conflicts::check_lexer_conflicts(grammar, &mut diag);
    }
    diag
}

/// Source line of a byte offset inside a rule's definition.
pub(crate) fn line_at(rule: &Rule, offset: usize) -> usize {
    let mut end = offset.min(rule.definition.len());
    while !rule.definition.is_char_boundary(end) {
        end -= 1;
    }
    rule.body_line + rule.definition[..end].matches('\n').count()
}

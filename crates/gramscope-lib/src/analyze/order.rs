//! Dependency ordering of parser rules.

use std::collections::BTreeSet;

use gramscope_core::Grammar;

/// Parser rules ordered so that every rule comes before the rules that
/// reference it (Kahn's algorithm).
///
/// Ties are broken by source order, so the result is deterministic.
/// Self-references are ignored. If the rules form a cycle no such order
/// exists and the source order is returned unchanged.
pub fn dependency_order(grammar: &Grammar) -> Vec<String> {
    let rules: Vec<&str> = grammar.parser_rules().map(|r| r.name.as_str()).collect();
    let index_of = |name: &str| rules.iter().position(|r| *r == name);

    // in_degree[i]: rules that rule i depends on; users[j]: rules depending on j
    let mut in_degree = vec![0usize; rules.len()];
    let mut users: Vec<Vec<usize>> = vec![Vec::new(); rules.len()];
    for (i, rule) in grammar.parser_rules().enumerate() {
        for target in &rule.referenced_rules {
            let Some(j) = index_of(target) else {
                continue;
            };
            if i != j {
                in_degree[i] += 1;
                users[j].push(i);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..rules.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(rules.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &user in &users[i] {
            in_degree[user] -= 1;
            if in_degree[user] == 0 {
                ready.insert(user);
            }
        }
    }

    if order.len() < rules.len() {
        return rules.iter().map(|r| r.to_string()).collect();
    }
    order.into_iter().map(|i| rules[i].to_string()).collect()
}

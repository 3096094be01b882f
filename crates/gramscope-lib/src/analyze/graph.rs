//! Reference graph over rules.
//!
//! Nodes are the grammar's rules in source order. An edge `a -> b` exists
//! when `b` is a rule and appears in `a`'s reference set. Declared tokens and
//! built-ins are not nodes.

use indexmap::{IndexMap, IndexSet};

use gramscope_core::Grammar;

#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    outgoing: IndexMap<String, IndexSet<String>>,
    incoming: IndexMap<String, IndexSet<String>>,
}

impl ReferenceGraph {
    pub fn build(grammar: &Grammar) -> Self {
        let mut outgoing: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut incoming: IndexMap<String, IndexSet<String>> = IndexMap::new();

        for rule in &grammar.rules {
            outgoing.entry(rule.name.clone()).or_default();
            incoming.entry(rule.name.clone()).or_default();
        }

        for rule in &grammar.rules {
            for target in &rule.referenced_rules {
                if !outgoing.contains_key(target) {
                    continue;
                }
                if let Some(out) = outgoing.get_mut(&rule.name) {
                    out.insert(target.clone());
                }
                if let Some(inc) = incoming.get_mut(target) {
                    inc.insert(rule.name.clone());
                }
            }
        }

        Self { outgoing, incoming }
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.outgoing.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.outgoing.contains_key(name)
    }

    /// Rules referenced by `name`, itself included when self-referencing.
    pub fn successors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.outgoing
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Rules other than `name` that reference it.
    pub fn referrers<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.incoming
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
            .filter(move |r| *r != name)
    }

    pub fn fan_in(&self, name: &str) -> usize {
        self.referrers(name).count()
    }

    pub fn fan_out(&self, name: &str) -> usize {
        self.successors(name).filter(|r| *r != name).count()
    }

    pub fn is_self_referencing(&self, name: &str) -> bool {
        self.outgoing.get(name).is_some_and(|s| s.contains(name))
    }
}

//! Left-recursion detection.
//!
//! - Direct: an alternative of `r` starts with `r`. Parser generators rewrite
//!   this for parser rules, so it is informational there and an error for
//!   lexer rules.
//! - Hidden: `a` starts with `b`, which (transitively) starts with `a`. Found
//!   by a depth-first walk over first elements of parser-rule alternatives,
//!   tracking the current path as a recursion stack.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use gramscope_core::{Grammar, Rule, is_lexer_name};

use super::{MAX_TRAVERSAL_DEPTH, line_at};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::RuleStructure;

pub fn check_left_recursion(grammar: &Grammar, diag: &mut Diagnostics) {
    let structures: Vec<(&Rule, RuleStructure)> = grammar
        .rules
        .iter()
        .map(|r| (r, RuleStructure::parse(&r.definition)))
        .collect();

    for (rule, structure) in &structures {
        check_direct(rule, structure, diag);
    }

    let first_edges: HashMap<&str, IndexSet<&str>> = structures
        .iter()
        .filter(|(r, _)| r.is_parser())
        .map(|(r, s)| (r.name.as_str(), first_parser_rules(grammar, r, s)))
        .collect();

    HiddenRecursion::new(grammar, &first_edges).run(diag);
}

fn check_direct(rule: &Rule, structure: &RuleStructure, diag: &mut Diagnostics) {
    let Some(alt) = structure
        .alternatives
        .iter()
        .find(|alt| alt.first_names().contains(&rule.name.as_str()))
    else {
        return;
    };

    let kind = if rule.is_lexer() {
        DiagnosticKind::LexerLeftRecursion
    } else {
        DiagnosticKind::DirectLeftRecursion
    };
    diag.report(kind)
        .line(line_at(rule, alt.offset))
        .rule(&rule.name)
        .message(&rule.name)
        .emit();
}

/// Parser rules that can start `rule`, excluding the rule itself.
fn first_parser_rules<'g>(
    grammar: &'g Grammar,
    rule: &Rule,
    structure: &RuleStructure,
) -> IndexSet<&'g str> {
    structure
        .alternatives
        .iter()
        .flat_map(|alt| alt.first_names())
        .filter(|name| !is_lexer_name(name) && *name != rule.name)
        .filter_map(|name| grammar.rule(name).map(|r| r.name.as_str()))
        .collect()
}

struct HiddenRecursion<'a, 'g> {
    grammar: &'g Grammar,
    edges: &'a HashMap<&'g str, IndexSet<&'g str>>,
    stack: Vec<&'g str>,
    on_stack: HashSet<&'g str>,
    done: HashSet<&'g str>,
    /// Cycles already reported, as sorted member lists.
    seen: HashSet<Vec<&'g str>>,
}

impl<'a, 'g> HiddenRecursion<'a, 'g> {
    fn new(grammar: &'g Grammar, edges: &'a HashMap<&'g str, IndexSet<&'g str>>) -> Self {
        Self {
            grammar,
            edges,
            stack: Vec::new(),
            on_stack: HashSet::new(),
            done: HashSet::new(),
            seen: HashSet::new(),
        }
    }

    fn run(&mut self, diag: &mut Diagnostics) {
        let grammar = self.grammar;
        for rule in grammar.parser_rules() {
            if !self.done.contains(rule.name.as_str()) {
                self.visit(rule.name.as_str(), diag);
            }
        }
    }

    fn visit(&mut self, name: &'g str, diag: &mut Diagnostics) {
        if self.stack.len() >= MAX_TRAVERSAL_DEPTH {
            return;
        }

        self.stack.push(name);
        self.on_stack.insert(name);

        let edges = self.edges;
        if let Some(next) = edges.get(name) {
            for &target in next {
                if self.on_stack.contains(target) {
                    self.report(target, diag);
                } else if !self.done.contains(target) {
                    self.visit(target, diag);
                }
            }
        }

        self.stack.pop();
        self.on_stack.remove(name);
        self.done.insert(name);
    }

    fn report(&mut self, target: &'g str, diag: &mut Diagnostics) {
        let Some(start) = self.stack.iter().position(|n| *n == target) else {
            return;
        };
        let cycle: Vec<&'g str> = self.stack[start..].to_vec();

        let mut key = cycle.clone();
        key.sort_unstable();
        if !self.seen.insert(key) {
            return;
        }

        let chain = cycle
            .iter()
            .chain(std::iter::once(&target))
            .copied()
            .collect::<Vec<_>>()
            .join(" -> ");

        let Some(head) = self.grammar.rule(target) else {
            return;
        };
        let mut builder = diag
            .report(DiagnosticKind::HiddenLeftRecursion)
            .line(head.line_number)
            .rule(&head.name)
            .message(format!("`{}` starts with itself through {chain}", head.name));

        // every edge of the cycle, the closing one back to `target` included
        let next = cycle.iter().skip(1).chain(std::iter::once(&target));
        for (from, to) in cycle.iter().zip(next) {
            if let Some(rule) = self.grammar.rule(from) {
                builder = builder
                    .related_to(format!("`{from}` can start with `{to}`"), rule.line_number);
            }
        }
        builder.emit();
    }
}

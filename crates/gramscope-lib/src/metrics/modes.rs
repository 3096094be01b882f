//! Lexer-mode transition graph.
//!
//! Edges come from `pushMode(X)`, `mode(X)` and `popMode` commands on
//! non-fragment lexer rules, leaving the mode that owns the rule. Checks:
//! undefined targets, modes never reached from the default mode, `popMode`
//! in the default mode, modes without rules, and cycles.
//!
//! Every cycle is reported. One with at least one `pushMode` edge where no
//! mode on the cycle issues `popMode` grows the mode stack without bound and
//! is a warning; any other cycle is informational.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;
use serde::Serialize;

use gramscope_core::{DEFAULT_MODE, Grammar};

use crate::analyze::MAX_TRAVERSAL_DEPTH;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::syntax::{LexerCommand, lexer_commands};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeTransition {
    /// Mode owning the rule.
    pub from: String,
    /// Target mode; `None` for `popMode`.
    pub to: Option<String>,
    /// `pushMode` rather than `mode`.
    pub push: bool,
    pub rule: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ModeGraph {
    transitions: Vec<ModeTransition>,
}

impl ModeGraph {
    pub fn build(grammar: &Grammar) -> Self {
        let mut transitions = Vec::new();
        for rule in grammar.lexer_rules().filter(|r| !r.is_fragment) {
            let from = rule.mode.as_deref().unwrap_or(DEFAULT_MODE);
            for command in lexer_commands(&rule.definition) {
                let (to, push) = match command {
                    LexerCommand::PushMode(m) => (Some(m), true),
                    LexerCommand::Mode(m) => (Some(m), false),
                    LexerCommand::PopMode => (None, false),
                    _ => continue,
                };
                transitions.push(ModeTransition {
                    from: from.to_string(),
                    to,
                    push,
                    rule: rule.name.clone(),
                    line: rule.line_number,
                });
            }
        }
        Self { transitions }
    }

    pub fn transitions(&self) -> &[ModeTransition] {
        &self.transitions
    }

    /// Transitions leaving `mode` for a named mode.
    pub fn outgoing<'a>(&'a self, mode: &'a str) -> impl Iterator<Item = &'a ModeTransition> {
        self.transitions
            .iter()
            .filter(move |t| t.from == mode && t.to.is_some())
    }

    /// Whether a rule in `mode` issues `popMode`.
    pub fn pops(&self, mode: &str) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == mode && t.to.is_none())
    }

    /// Modes reachable from the default mode, the default mode included.
    pub fn reachable(&self) -> IndexSet<&str> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([DEFAULT_MODE]);
        seen.insert(DEFAULT_MODE);

        while let Some(mode) = queue.pop_front() {
            for target in self.outgoing(mode).filter_map(|t| t.to.as_deref()) {
                if seen.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        seen
    }
}

pub fn check_modes(grammar: &Grammar) -> Diagnostics {
    let mut diag = Diagnostics::new();
    let graph = ModeGraph::build(grammar);

    for t in graph.transitions() {
        match &t.to {
            Some(target) if grammar.mode(target).is_none() => diag
                .report(DiagnosticKind::UndefinedMode)
                .line(t.line)
                .rule(&t.rule)
                .message(target)
                .emit(),
            None if t.from == DEFAULT_MODE => diag
                .report(DiagnosticKind::PopFromDefaultMode)
                .line(t.line)
                .rule(&t.rule)
                .message(format!("`{}` pops an empty mode stack", t.rule))
                .emit(),
            _ => {}
        }
    }

    let reachable = graph.reachable();
    for mode in grammar.modes.iter().filter(|m| !m.is_default()) {
        let line = mode.line_number.unwrap_or(1);
        if !reachable.contains(mode.name.as_str()) {
            diag.report(DiagnosticKind::UnreachableMode)
                .line(line)
                .message(&mode.name)
                .emit();
        }
        if mode.rules.is_empty() {
            diag.report(DiagnosticKind::EmptyMode)
                .line(line)
                .message(&mode.name)
                .emit();
        }
    }

    ModeCycles::new(grammar, &graph).run(&mut diag);
    diag
}

struct ModeCycles<'a> {
    grammar: &'a Grammar,
    graph: &'a ModeGraph,
    stack: Vec<&'a str>,
    /// Transition taken from `stack[i]` to `stack[i + 1]`.
    path: Vec<&'a ModeTransition>,
    done: HashSet<&'a str>,
    seen: HashSet<Vec<&'a str>>,
}

impl<'a> ModeCycles<'a> {
    fn new(grammar: &'a Grammar, graph: &'a ModeGraph) -> Self {
        Self {
            grammar,
            graph,
            stack: Vec::new(),
            path: Vec::new(),
            done: HashSet::new(),
            seen: HashSet::new(),
        }
    }

    fn run(&mut self, diag: &mut Diagnostics) {
        let grammar = self.grammar;
        for mode in &grammar.modes {
            if !self.done.contains(mode.name.as_str()) {
                self.visit(mode.name.as_str(), diag);
            }
        }
    }

    fn visit(&mut self, mode: &'a str, diag: &mut Diagnostics) {
        if self.stack.len() >= MAX_TRAVERSAL_DEPTH {
            return;
        }
        self.stack.push(mode);

        let (grammar, graph) = (self.grammar, self.graph);
        for t in graph.outgoing(mode) {
            let Some(target) = t.to.as_deref() else {
                continue;
            };
            let Some(target) = grammar.mode(target).map(|m| m.name.as_str()) else {
                continue;
            };
            if let Some(start) = self.stack.iter().position(|m| *m == target) {
                self.report(start, t, diag);
            } else if !self.done.contains(target) {
                self.path.push(t);
                self.visit(target, diag);
                self.path.pop();
            }
        }

        self.stack.pop();
        self.done.insert(mode);
    }

    fn report(&mut self, start: usize, closing: &'a ModeTransition, diag: &mut Diagnostics) {
        let edges: Vec<&ModeTransition> = self.path[start..]
            .iter()
            .copied()
            .chain(std::iter::once(closing))
            .collect();
        let cycle = &self.stack[start..];
        let grows = edges.iter().any(|t| t.push) && !cycle.iter().any(|m| self.graph.pops(m));

        let mut key = cycle.to_vec();
        key.sort_unstable();
        if !self.seen.insert(key) {
            return;
        }

        let chain = cycle
            .iter()
            .chain(std::iter::once(&cycle[0]))
            .copied()
            .collect::<Vec<_>>()
            .join(" -> ");

        let mut builder = diag
            .report(DiagnosticKind::ModeCycle)
            .line(closing.line)
            .rule(&closing.rule)
            .message(chain);
        builder = if grows {
            builder.hint("no mode on the cycle issues `popMode`, so the mode stack only grows")
        } else {
            builder.severity(Severity::Info)
        };
        for t in &edges[..edges.len() - 1] {
            builder = builder.related_to(
                format!("`{}` leaves `{}`", t.rule, t.from),
                t.line,
            );
        }
        builder.emit();
    }
}

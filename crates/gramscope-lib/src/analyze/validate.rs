//! Reference checks: undefined references and unused rules.

use indexmap::IndexSet;

use gramscope_core::{Grammar, GrammarKind};

use super::{ReferenceGraph, line_at};
use crate::config::ValidateOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::{LexerCommand, lexer_commands, references};

/// Runs the reference checks.
///
/// Undefined references are skipped when the grammar imports others, since
/// the names may resolve there.
pub fn validate(grammar: &Grammar, options: &ValidateOptions) -> Diagnostics {
    let mut diag = Diagnostics::new();
    if grammar.imports.is_empty() {
        check_undefined(grammar, &mut diag);
    }
    check_unused(grammar, options, &mut diag);
    diag
}

fn check_undefined(grammar: &Grammar, diag: &mut Diagnostics) {
    // A parser grammar with `tokenVocab` takes its tokens from elsewhere.
    let external_tokens =
        grammar.kind == GrammarKind::Parser && grammar.option("tokenVocab").is_some();

    for rule in &grammar.rules {
        let mut reported = IndexSet::new();
        for reference in references(&rule.definition) {
            let name = reference.name;
            if grammar.defines(name) || reported.contains(name) {
                continue;
            }
            if external_tokens && gramscope_core::is_lexer_name(name) {
                continue;
            }
            reported.insert(name);
            diag.report(DiagnosticKind::UndefinedReference)
                .line(line_at(rule, reference.offset))
                .rule(&rule.name)
                .message(name)
                .emit();
        }
    }
}

fn check_unused(grammar: &Grammar, options: &ValidateOptions, diag: &mut Diagnostics) {
    let graph = ReferenceGraph::build(grammar);

    for rule in &grammar.rules {
        if graph.fan_in(&rule.name) > 0 || options.exempt_from_unused(&rule.name) {
            continue;
        }
        if rule.is_lexer() && !rule.is_fragment {
            if options.exempt_lexer_grammar_tokens && grammar.kind == GrammarKind::Lexer {
                continue;
            }
            let hidden = options.exempt_hidden_tokens
                && lexer_commands(&rule.definition)
                    .iter()
                    .any(|c| matches!(c, LexerCommand::Skip | LexerCommand::Channel(_)));
            if hidden {
                continue;
            }
        }

        diag.report(DiagnosticKind::UnusedRule)
            .line(rule.line_number)
            .rule(&rule.name)
            .message(&rule.name)
            .emit();
    }
}

//! Alternative-level ambiguity checks.
//!
//! Alternatives are compared after normalization: labels, actions,
//! predicates and lexer commands are dropped and elements are rendered with
//! single spaces, so `x=ID {act();}` and `ID` compare equal.

use gramscope_core::{Grammar, Rule};

use super::line_at;
use crate::config::AmbiguityOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::{Alternative, ElementContent, Modifier, RuleStructure};

pub fn check_alternatives(grammar: &Grammar, options: &AmbiguityOptions, diag: &mut Diagnostics) {
    for rule in &grammar.rules {
        let structure = RuleStructure::parse(&rule.definition);
        let normalized: Vec<Vec<String>> = structure
            .alternatives
            .iter()
            .map(Alternative::normalized)
            .collect();

        if options.duplicate_alternatives {
            check_duplicates(rule, &structure, &normalized, diag);
        }
        if options.overlapping_prefixes && rule.is_parser() {
            check_prefixes(rule, &structure, &normalized, options.min_shared_prefix, diag);
        }
        if options.ambiguous_optionals {
            for alt in &structure.alternatives {
                check_optionals(rule, alt, diag);
            }
        }
    }
}

fn check_duplicates(
    rule: &Rule,
    structure: &RuleStructure,
    normalized: &[Vec<String>],
    diag: &mut Diagnostics,
) {
    for (j, alt) in structure.alternatives.iter().enumerate() {
        let Some(i) = normalized[..j].iter().position(|n| *n == normalized[j]) else {
            continue;
        };
        let first = &structure.alternatives[i];
        diag.report(DiagnosticKind::DuplicateAlternative)
            .line(line_at(rule, alt.offset))
            .rule(&rule.name)
            .message(format!(
                "alternative {} of `{}` repeats alternative {}: `{}`",
                j + 1,
                rule.name,
                i + 1,
                alt
            ))
            .related_to("first occurrence", line_at(rule, first.offset))
            .emit();
    }
}

fn check_prefixes(
    rule: &Rule,
    structure: &RuleStructure,
    normalized: &[Vec<String>],
    min_shared: usize,
    diag: &mut Diagnostics,
) {
    for j in 1..normalized.len() {
        for i in 0..j {
            let (a, b) = (&normalized[i], &normalized[j]);
            if a == b {
                continue;
            }
            let shared = a.iter().zip(b).take_while(|(x, y)| x == y).count();
            if shared < min_shared.max(1) {
                continue;
            }
            diag.report(DiagnosticKind::OverlappingAlternatives)
                .line(line_at(rule, structure.alternatives[j].offset))
                .rule(&rule.name)
                .message(format!(
                    "alternatives {} and {} of `{}` both start with `{}`",
                    i + 1,
                    j + 1,
                    rule.name,
                    a[..shared].join(" ")
                ))
                .emit();
        }
    }
}

/// `X? X` and `X? X*` match one `X` in two ways.
fn check_optionals(rule: &Rule, alt: &Alternative, diag: &mut Diagnostics) {
    for pair in alt.elements.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if first.modifier == Modifier::Optional
            && first.content == second.content
            && matches!(second.modifier, Modifier::None | Modifier::ZeroOrMore)
        {
            diag.report(DiagnosticKind::AmbiguousOptional)
                .line(line_at(rule, alt.offset))
                .rule(&rule.name)
                .message(format!("`{first} {second}` in `{}`", rule.name))
                .emit();
        }
    }

    for element in &alt.elements {
        if let ElementContent::Group(alts) = &element.content {
            for inner in alts {
                check_optionals(rule, inner, diag);
            }
        }
    }
}

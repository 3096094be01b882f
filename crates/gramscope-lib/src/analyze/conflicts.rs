//! Lexer-rule shadowing.
//!
//! A lexer rule whose whole pattern is one literal can never be produced if
//! an earlier token rule of the same mode matches that literal entirely:
//! maximal munch yields a match at least as long, and the tie goes to the
//! earlier rule. `ID : [a-z]+ ; IF : 'if' ;` is the classic case.
//!
//! Rules whose patterns cannot be compiled are skipped.

use gramscope_core::Grammar;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::pattern::{Pattern, PatternCompiler};
use crate::syntax::RuleStructure;

pub fn check_lexer_conflicts(grammar: &Grammar, diag: &mut Diagnostics) {
    let mut compiler = PatternCompiler::new(grammar);
    let mut earlier: Vec<(&str, Option<&str>, Option<Pattern>)> = Vec::new();

    for rule in grammar.lexer_rules().filter(|r| !r.is_fragment) {
        if let Some(literal) = RuleStructure::parse(&rule.definition).sole_literal() {
            let shadow = earlier.iter().find(|(_, mode, pattern)| {
                *mode == rule.mode.as_deref()
                    && pattern.as_ref().is_some_and(|p| p.matches_whole(&literal))
            });
            if let Some((name, _, _)) = shadow {
                diag.report(DiagnosticKind::LexerConflict)
                    .line(rule.line_number)
                    .rule(&rule.name)
                    .message(format!(
                        "`{}` ('{}') loses to `{name}`",
                        rule.name,
                        literal.escape_debug()
                    ))
                    .hint(format!("move `{}` before `{name}`", rule.name))
                    .emit();
            }
        }

        earlier.push((
            rule.name.as_str(),
            rule.mode.as_deref(),
            compiler.compile_rule(&rule.name).ok(),
        ));
    }
}

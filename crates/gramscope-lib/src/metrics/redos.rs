//! Catastrophic-backtracking heuristics for lexer patterns.
//!
//! Flagged shapes:
//! - a repeated group whose body can repeat without bound, `( [a-z]+ )+`,
//!   unless the group's alternatives start on disjoint characters or are
//!   complementary fragments (`Whitespace | NonWhitespace`);
//! - a repeated group whose alternatives start the same way, `( 'ab' | 'ac' )*`;
//! - a greedy loop over `.` or a negated set that can run past the literal
//!   closing it, `.* '*/'`.
//!
//! Findings are advisory. Disjointness is judged on first characters only.

use std::fmt;

use regex_syntax::hir::{Class, ClassUnicode, ClassUnicodeRange, Hir, HirKind};
use serde::Serialize;

use gramscope_core::utils::unescape_literal;
use gramscope_core::{Grammar, Rule};

use crate::analyze::line_at;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::pattern::{Pattern, PatternCompiler};
use crate::syntax::{Alternative, Element, ElementContent, RuleStructure};

/// Prefixes naming the complement of a fragment: `NonWhitespace`, `NOT_WS`.
const NEGATION_PREFIXES: &[&str] = &["Non", "NON_", "Not", "NOT_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedosKind {
    NestedQuantifier,
    SharedPrefix,
    BroadRepetition,
}

impl fmt::Display for RedosKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestedQuantifier => write!(f, "nested quantifier"),
            Self::SharedPrefix => write!(f, "repeated alternatives with a shared prefix"),
            Self::BroadRepetition => write!(f, "broad repetition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedosFinding {
    pub rule: String,
    pub line: usize,
    pub kind: RedosKind,
    /// The offending part of the rule body.
    pub pattern: String,
}

/// Scans every lexer rule, fragments included, in source order.
pub fn redos_findings(grammar: &Grammar) -> Vec<RedosFinding> {
    let mut compiler = PatternCompiler::new(grammar);
    let mut findings = Vec::new();

    for rule in grammar.lexer_rules() {
        let structure = RuleStructure::parse(&rule.definition);
        let mut scan = RuleScan {
            rule,
            compiler: &mut compiler,
            findings: &mut findings,
        };
        for alt in &structure.alternatives {
            scan.sequence(alt);
        }
    }

    findings
}

/// [`redos_findings`] as `RedosRisk` warnings.
pub fn check_redos(grammar: &Grammar) -> Diagnostics {
    let mut diag = Diagnostics::new();
    for finding in redos_findings(grammar) {
        diag.report(DiagnosticKind::RedosRisk)
            .line(finding.line)
            .rule(&finding.rule)
            .message(format!(
                "{} `{}` in `{}`",
                finding.kind, finding.pattern, finding.rule
            ))
            .emit();
    }
    diag
}

struct RuleScan<'a, 'g> {
    rule: &'a Rule,
    compiler: &'a mut PatternCompiler<'g>,
    findings: &'a mut Vec<RedosFinding>,
}

impl RuleScan<'_, '_> {
    fn sequence(&mut self, alt: &Alternative) {
        for (i, element) in alt.elements.iter().enumerate() {
            if let ElementContent::Group(inner) = &element.content {
                if element.is_repeating() {
                    if self.nests_unbounded(inner) {
                        self.report(RedosKind::NestedQuantifier, element.to_string(), alt);
                    }
                    if shares_prefix(inner) {
                        self.report(RedosKind::SharedPrefix, element.to_string(), alt);
                    }
                }
                for nested in inner {
                    self.sequence(nested);
                }
            }

            if let Some(next) = alt.elements.get(i + 1)
                && self.is_broad_loop(element, next)
            {
                self.report(RedosKind::BroadRepetition, format!("{element} {next}"), alt);
            }
        }
    }

    /// Whether a repeated group with these alternatives can split one input
    /// across iterations in more than one way.
    fn nests_unbounded(&mut self, alts: &[Alternative]) -> bool {
        let unbounded = alts
            .iter()
            .any(|alt| alt.elements.iter().any(|e| self.is_unbounded(e)));
        if !unbounded {
            return false;
        }
        match alts {
            // Without a required bounded element there is nothing to anchor
            // an iteration boundary.
            [only] => only
                .elements
                .iter()
                .all(|e| e.is_optional() || self.is_unbounded(e)),
            _ => !self.pairwise_disjoint(alts),
        }
    }

    fn is_unbounded(&mut self, element: &Element) -> bool {
        if element.is_repeating() {
            return true;
        }
        match &element.content {
            ElementContent::Group(alts) => alts
                .iter()
                .any(|alt| alt.elements.iter().any(|e| self.is_unbounded(e))),
            ElementContent::Token(name) => self
                .compiler
                .translate_rule(name)
                .ok()
                .and_then(|t| regex_syntax::parse(&t.regex).ok())
                .is_some_and(|hir| hir.properties().maximum_len().is_none()),
            _ => false,
        }
    }

    fn pairwise_disjoint(&mut self, alts: &[Alternative]) -> bool {
        let firsts: Vec<Option<ClassUnicode>> =
            alts.iter().map(|alt| self.first_chars(alt)).collect();

        for i in 0..alts.len() {
            for j in i + 1..alts.len() {
                if complementary(&alts[i], &alts[j]) {
                    continue;
                }
                match (&firsts[i], &firsts[j]) {
                    (Some(a), Some(b)) if !overlaps(a, b) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// Characters the alternative can start with. `None` when unknown or
    /// when it can match the empty string.
    fn first_chars(&mut self, alt: &Alternative) -> Option<ClassUnicode> {
        let translation = self.compiler.translate_pattern(&alt.to_string()).ok()?;
        let hir = regex_syntax::parse(&translation.regex).ok()?;
        if hir.properties().minimum_len() == Some(0) {
            return None;
        }
        Some(first_class(&hir))
    }

    /// A greedy `.` loop with something after it, or a greedy negated-set
    /// loop that also matches the first character of the literal after it.
    fn is_broad_loop(&mut self, element: &Element, next: &Element) -> bool {
        if !element.is_repeating() || !element.greedy {
            return false;
        }
        match &element.content {
            ElementContent::Wildcard => true,
            ElementContent::Negated(_) => {
                let ElementContent::Literal(quoted) = &next.content else {
                    return false;
                };
                let Some(first) = unescape_literal(quoted).chars().next() else {
                    return false;
                };
                self.compiler
                    .translate_pattern(&element.content.to_string())
                    .ok()
                    .and_then(|t| Pattern::from_translation(t).ok())
                    .is_some_and(|p| p.match_at(first.encode_utf8(&mut [0; 4]), 0).is_some())
            }
            _ => false,
        }
    }

    fn report(&mut self, kind: RedosKind, pattern: String, alt: &Alternative) {
        self.findings.push(RedosFinding {
            rule: self.rule.name.clone(),
            line: line_at(self.rule, alt.offset),
            kind,
            pattern,
        });
    }
}

/// Two alternatives in a repeated group whose first elements are the same,
/// or are literals starting with the same character.
fn shares_prefix(alts: &[Alternative]) -> bool {
    let firsts: Vec<&Element> = alts.iter().filter_map(|a| a.elements.first()).collect();
    firsts.iter().enumerate().any(|(i, a)| {
        firsts[i + 1..].iter().any(|b| {
            if a.to_string() == b.to_string() {
                return true;
            }
            match (&a.content, &b.content) {
                (ElementContent::Literal(x), ElementContent::Literal(y)) => {
                    let (x, y) = (unescape_literal(x), unescape_literal(y));
                    x.chars().next().is_some_and(|c| y.starts_with(c))
                }
                _ => false,
            }
        })
    })
}

/// `Whitespace` and `NonWhitespace` as the whole of two alternatives.
fn complementary(a: &Alternative, b: &Alternative) -> bool {
    let (Some(x), Some(y)) = (sole_token(a), sole_token(b)) else {
        return false;
    };
    negates(x, y) || negates(y, x)
}

fn sole_token(alt: &Alternative) -> Option<&str> {
    match alt.elements.as_slice() {
        [only] => match &only.content {
            ElementContent::Token(name) => Some(name),
            _ => None,
        },
        _ => None,
    }
}

fn negates(negated: &str, base: &str) -> bool {
    NEGATION_PREFIXES
        .iter()
        .any(|p| negated.strip_prefix(p) == Some(base))
}

fn overlaps(a: &ClassUnicode, b: &ClassUnicode) -> bool {
    let mut both = a.clone();
    both.intersect(b);
    !both.ranges().is_empty()
}

/// Union of the characters `hir` can start with.
fn first_class(hir: &Hir) -> ClassUnicode {
    match hir.kind() {
        HirKind::Literal(lit) => std::str::from_utf8(&lit.0)
            .ok()
            .and_then(|s| s.chars().next())
            .map(|c| ClassUnicode::new([ClassUnicodeRange::new(c, c)]))
            .unwrap_or_else(ClassUnicode::empty),
        HirKind::Class(Class::Unicode(class)) => class.clone(),
        HirKind::Class(Class::Bytes(class)) => ClassUnicode::new(
            class
                .ranges()
                .iter()
                .map(|r| ClassUnicodeRange::new(char::from(r.start()), char::from(r.end()))),
        ),
        HirKind::Repetition(rep) => first_class(&rep.sub),
        HirKind::Capture(cap) => first_class(&cap.sub),
        HirKind::Concat(parts) => {
            let mut class = ClassUnicode::empty();
            for part in parts {
                class.union(&first_class(part));
                if part.properties().minimum_len() != Some(0) {
                    break;
                }
            }
            class
        }
        HirKind::Alternation(parts) => {
            let mut class = ClassUnicode::empty();
            for part in parts {
                class.union(&first_class(part));
            }
            class
        }
        _ => ClassUnicode::empty(),
    }
}

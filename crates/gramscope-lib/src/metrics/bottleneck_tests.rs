use indoc::indoc;

use super::*;
use crate::diagnostics::Severity;
use crate::scan;

fn report(source: &str, config: &MetricsConfig) -> BottleneckReport {
    let (grammar, _) = scan(source);
    bottlenecks(&grammar, config)
}

fn dump(report: &BottleneckReport) -> String {
    report.findings.iter().map(|b| format!("{b}\n")).collect()
}

#[test]
fn findings_are_ranked() {
    let source = indoc! {"
        grammar G;
        prog : stmt* EOF ;
        stmt : expr ';' | 'if' expr stmt | block | ';' ;
        block : '{' stmt* '}' ;
        expr : ((atom)) | expr '+' atom ;
        atom : ID | INT ;
        ID : [a-z]+ ;
        INT : [0-9]+ ;
        WORDS : ( [a-z]+ )+ ;
    "};
    let config = MetricsConfig::default()
        .with_high_complexity(3)
        .with_many_alternatives(3)
        .with_deep_nesting(1)
        .with_hub_threshold(1)
        .with_max_recursion_depth(4);
    let report = report(source, &config);

    insta::assert_snapshot!(dump(&report), @r"
    warning redos-risk [3] `WORDS`: nested quantifier `( [a-z]+ )+` (suggestion: make the repeated alternatives disjoint)
    info high-complexity [4] `stmt`: complexity 4 exceeds 3 (suggestion: split the rule into smaller sub-rules)
    info excessive-alternatives [4] `stmt`: 4 alternatives (suggestion: group related alternatives under their own rules)
    info deep-recursion [4] `stmt`: recursion without a bound
    info deep-recursion [4] `expr`: recursion without a bound
    info deep-nesting [2] `expr`: groups nested 2 deep (suggestion: extract nested groups into named rules)
    info hub-rule [2] `stmt`: referenced by 2 rules (suggestion: changes here ripple widely; keep the rule stable)
    ");
    // stmt and block form a cycle, so source order is kept
    assert_eq!(report.suggested_order, ["prog", "stmt", "block", "expr", "atom"]);
}

#[test]
fn far_over_the_threshold_is_a_warning() {
    let source = indoc! {"
        grammar G;
        op : '+' | '-' | '*' | '/' | '%' | '^' ;
    "};
    let config = MetricsConfig::default().with_many_alternatives(3);
    let report = report(source, &config);

    let alternatives: Vec<_> = report
        .findings
        .iter()
        .filter(|b| b.kind == BottleneckKind::ExcessiveAlternatives)
        .collect();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].severity, Severity::Warning);
    assert_eq!(alternatives[0].score, 6);
    assert_eq!(alternatives[0].line, Some(2));
}

#[test]
fn mode_problems_are_findings() {
    let source = indoc! {"
        lexer grammar L;
        ID : [a-z]+ ;
        CLOSE : '>' -> popMode ;
    "};
    let report = report(source, &MetricsConfig::default());

    insta::assert_snapshot!(dump(&report), @r"
    warning mode-problem [1] `CLOSE`: `popMode` issued from the default mode: `CLOSE` pops an empty mode stack
    ");
    assert!(report.suggested_order.is_empty());
}

#[test]
fn clean_grammar_has_no_findings() {
    let source = indoc! {"
        grammar G;
        prog : ID+ EOF ;
        ID : [a-z]+ ;
    "};
    let report = report(source, &MetricsConfig::default());

    assert!(report.findings.is_empty());
    assert_eq!(report.suggested_order, ["prog"]);
}

#[test]
fn report_serialization() {
    let source = indoc! {"
        lexer grammar L;
        WORDS : ( [a-z]+ )+ ;
    "};
    let json = serde_json::to_value(report(source, &MetricsConfig::default())).unwrap();

    assert_eq!(
        json["findings"][0],
        serde_json::json!({
            "kind": "redos_risk",
            "rule": "WORDS",
            "line": 2,
            "severity": "warning",
            "score": 3,
            "message": "nested quantifier `( [a-z]+ )+`",
            "suggestion": "make the repeated alternatives disjoint",
        })
    );
}

use indoc::indoc;

use super::*;
use crate::config::AmbiguityOptions;
use crate::diagnostics::DiagnosticKind;
use crate::scan;

fn recursion(source: &str) -> Diagnostics {
    let (grammar, _) = scan(source);
    analyze_ambiguities(&grammar, &AmbiguityOptions::none().with_left_recursion(true))
}

fn dump(source: &str) -> String {
    recursion(source).iter().map(|d| format!("{d}\n")).collect()
}

#[test]
fn direct_left_recursion_is_informational() {
    let source = indoc! {"
        grammar G;
        expr : expr '+' term | term ;
        term : INT ;
        INT : [0-9]+ ;
    "};

    insta::assert_snapshot!(dump(source), @r"
    info at line 2: rule `expr` is directly left-recursive
    ");
}

#[test]
fn direct_recursion_in_later_alternative() {
    let source = indoc! {"
        grammar G;
        expr
            : INT
            | expr '*' expr
            ;
        INT : [0-9]+ ;
    "};

    insta::assert_snapshot!(dump(source), @r"
    info at line 4: rule `expr` is directly left-recursive
    ");
}

#[test]
fn lexer_left_recursion_is_an_error() {
    let source = indoc! {"
        lexer grammar L;
        A : A 'x' | 'x' ;
    "};

    insta::assert_snapshot!(dump(source), @r"
    error at line 2: lexer rule `A` is left-recursive (hint: lexer rules cannot be left-recursive)
    ");
}

#[test]
fn hidden_left_recursion() {
    let source = indoc! {"
        grammar G;
        a : b 'x' | 'y' ;
        b : a 'z' ;
    "};

    insta::assert_snapshot!(dump(source), @r"
    error at line 2: hidden left recursion: `a` starts with itself through a -> b -> a (related: `a` can start with `b` at line 2) (related: `b` can start with `a` at line 3) (hint: only direct left recursion is rewritten; inline the cycle into one rule)
    ");
}

#[test]
fn hidden_recursion_through_leading_group() {
    let source = indoc! {"
        grammar G;
        a : (b | c) d ;
        b : ID ;
        c : a ;
        d : ID ;
    "};

    let diagnostics = recursion(source);
    assert!(diagnostics.has_kind(DiagnosticKind::HiddenLeftRecursion));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn longer_cycle_reported_once() {
    let source = indoc! {"
        grammar G;
        a : b ;
        b : c ;
        c : a | ID ;
    "};

    let diagnostics = recursion(source);
    let hidden = diagnostics.filter_by_kind(DiagnosticKind::HiddenLeftRecursion);
    assert_eq!(hidden.len(), 1);
    assert!(hidden[0].message().contains("a -> b -> c -> a"));
    assert_eq!(hidden[0].related().len(), 3);
    assert_eq!(hidden[0].related()[2].message(), "`c` can start with `a`");
    assert_eq!(hidden[0].related()[2].line(), 4);
}

#[test]
fn recursion_not_in_first_position_is_fine() {
    let source = indoc! {"
        grammar G;
        a : ID b ;
        b : ID a? ;
        list : ID (',' list)? ;
    "};

    assert!(recursion(source).is_empty());
}

#[test]
fn direct_self_recursion_is_not_hidden() {
    let source = indoc! {"
        grammar G;
        expr : expr '+' expr | ID ;
    "};

    let diagnostics = recursion(source);
    assert!(!diagnostics.has_kind(DiagnosticKind::HiddenLeftRecursion));
    assert!(diagnostics.has_kind(DiagnosticKind::DirectLeftRecursion));
}

#[test]
fn disabled_check_reports_nothing() {
    let (grammar, _) = scan(indoc! {"
        grammar G;
        a : b ;
        b : a ;
    "});

    assert!(analyze_ambiguities(&grammar, &AmbiguityOptions::none()).is_empty());
}

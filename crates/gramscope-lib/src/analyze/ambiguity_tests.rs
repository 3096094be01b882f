use indoc::indoc;

use super::*;
use crate::config::AmbiguityOptions;
use crate::scan;

fn check(source: &str, options: &AmbiguityOptions) -> String {
    let (grammar, _) = scan(source);
    analyze_ambiguities(&grammar, options)
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

fn alternatives_only() -> AmbiguityOptions {
    AmbiguityOptions::default()
        .with_left_recursion(false)
        .with_lexer_conflicts(false)
}

#[test]
fn duplicate_alternative() {
    let source = indoc! {"
        grammar G;
        stmt : ID '=' expr ';'
             | x=ID '=' expr ';' {assign();}
             | ID '(' ')' ';'
             ;
    "};

    insta::assert_snapshot!(check(source, &alternatives_only()), @r"
    error at line 3: duplicate alternative: alternative 2 of `stmt` repeats alternative 1: `ID '=' expr ';'` (related: first occurrence at line 2)
    ");
}

#[test]
fn overlapping_prefix() {
    let source = indoc! {"
        grammar G;
        call : ID '(' ')' | ID '(' args ')' ;
    "};

    insta::assert_snapshot!(check(source, &alternatives_only()), @r"
    warning at line 2: alternatives share a common prefix: alternatives 1 and 2 of `call` both start with `ID '('`
    ");
}

#[test]
fn prefix_length_is_configurable() {
    let source = indoc! {"
        grammar G;
        stmt : ID '=' expr | ID '(' ')' ;
    "};

    insta::assert_snapshot!(check(source, &alternatives_only()), @"");
    insta::assert_snapshot!(check(source, &alternatives_only().with_min_shared_prefix(1)), @r"
    warning at line 2: alternatives share a common prefix: alternatives 1 and 2 of `stmt` both start with `ID`
    ");
}

#[test]
fn lexer_rules_are_not_checked_for_prefixes() {
    let source = indoc! {"
        lexer grammar L;
        NUM : [0-9]+ '.' [0-9]+ | [0-9]+ '.' ;
    "};

    insta::assert_snapshot!(check(source, &alternatives_only()), @"");
}

#[test]
fn ambiguous_optional() {
    let source = indoc! {"
        grammar G;
        list : ID? ID* ;
        pair : '(' (ID? ID) ')' ;
        fine : ID ID? ;
    "};

    insta::assert_snapshot!(check(source, &alternatives_only()), @r"
    warning at line 2: ambiguous optional element: `ID? ID*` in `list` (hint: `X? X` matches a single `X` two ways; use `X X?`)
    warning at line 3: ambiguous optional element: `ID? ID` in `pair` (hint: `X? X` matches a single `X` two ways; use `X X?`)
    ");
}

#[test]
fn checks_toggle_independently() {
    let source = indoc! {"
        grammar G;
        a : ID ID | ID ID ;
        b : ID? ID ;
    "};

    let duplicates_only = AmbiguityOptions::none().with_duplicate_alternatives(true);
    insta::assert_snapshot!(check(source, &duplicates_only), @r"
    error at line 2: duplicate alternative: alternative 2 of `a` repeats alternative 1: `ID ID` (related: first occurrence at line 2)
    ");

    let optionals_only = AmbiguityOptions::none().with_ambiguous_optionals(true);
    insta::assert_snapshot!(check(source, &optionals_only), @r"
    warning at line 3: ambiguous optional element: `ID? ID` in `b` (hint: `X? X` matches a single `X` two ways; use `X X?`)
    ");
}

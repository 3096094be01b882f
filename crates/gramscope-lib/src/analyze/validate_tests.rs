use indoc::indoc;

use super::*;
use crate::config::ValidateOptions;
use crate::scan;

fn check(source: &str, options: &ValidateOptions) -> String {
    let (grammar, _) = scan(source);
    validate(&grammar, options)
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

#[test]
fn undefined_and_unused_rules() {
    let source = indoc! {"
        grammar G;
        start : expr EOF ;
        expr : term (PLUS term)* ;
        term : INT | missing ;
        unused : INT ;
        INT : [0-9]+ ;
        WS : [ \\t]+ -> skip ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default()), @r"
    error at line 3: `PLUS` is not defined
    error at line 4: `missing` is not defined
    warning at line 2: rule `start` is never referenced
    warning at line 5: rule `unused` is never referenced
    ");
}

#[test]
fn entry_rules_are_exempt() {
    let source = indoc! {"
        grammar G;
        start : INT ;
        INT : [0-9]+ ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @"");
}

#[test]
fn self_reference_does_not_count_as_use() {
    let source = indoc! {"
        grammar G;
        start : INT ;
        list : list INT | INT ;
        INT : '1' ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @r"
    warning at line 3: rule `list` is never referenced
    ");
}

#[test]
fn undefined_reference_points_at_its_line() {
    let source = indoc! {"
        grammar G;
        start
            : a
              b
            ;
        a : 'x' ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @r"
    error at line 4: `b` is not defined
    ");
}

#[test]
fn each_undefined_name_reported_once_per_rule() {
    let source = indoc! {"
        grammar G;
        start : X X X ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @r"
    error at line 2: `X` is not defined
    ");
}

#[test]
fn declared_tokens_count_as_defined() {
    let source = indoc! {"
        grammar G;
        tokens { INDENT, DEDENT }
        start : INDENT DEDENT ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @"");
}

#[test]
fn imports_suppress_undefined_references() {
    let source = indoc! {"
        grammar G;
        import Base;
        start : Foo bar ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @"");
}

#[test]
fn token_vocab_supplies_lexer_names() {
    let source = indoc! {"
        parser grammar P;
        options { tokenVocab = L; }
        start : ID rest ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @r"
    error at line 3: `rest` is not defined
    ");
}

#[test]
fn lexer_grammar_tokens_are_never_unused() {
    let source = indoc! {"
        lexer grammar L;
        ID : [a-z]+ ;
        fragment DIGIT : [0-9] ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default()), @r"
    warning at line 3: rule `DIGIT` is never referenced
    ");
}

#[test]
fn hidden_tokens_are_never_unused() {
    let source = indoc! {"
        grammar G;
        start : A ;
        A : 'a' ;
        B : 'b' ;
        C : 'c' -> channel(HIDDEN) ;
        D : 'd' -> skip ;
    "};

    insta::assert_snapshot!(check(source, &ValidateOptions::default().with_entry_rule("start")), @r"
    warning at line 4: rule `B` is never referenced
    ");
}

#[test]
fn token_exemptions_can_be_disabled() {
    let lexer = indoc! {"
        lexer grammar L;
        ID : [a-z]+ ;
    "};
    let options = ValidateOptions::default().with_exempt_lexer_grammar_tokens(false);
    insta::assert_snapshot!(check(lexer, &options), @r"
    warning at line 2: rule `ID` is never referenced
    ");

    let combined = indoc! {"
        grammar G;
        start : A ;
        A : 'a' ;
        D : 'd' -> skip ;
    "};
    let options = ValidateOptions::default()
        .with_entry_rule("start")
        .with_exempt_hidden_tokens(false);
    insta::assert_snapshot!(check(combined, &options), @r"
    warning at line 4: rule `D` is never referenced
    ");
}

#[test]
fn allow_list_is_configurable() {
    let source = indoc! {"
        grammar G;
        start : A ;
        A : 'a' ;
        B : 'b' ;
    "};
    let options = ValidateOptions::default()
        .with_entry_rule("start")
        .with_allowed_unused("B");

    insta::assert_snapshot!(check(source, &options), @"");
}

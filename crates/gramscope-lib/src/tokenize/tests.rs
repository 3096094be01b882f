use indoc::indoc;

use super::*;
use crate::scan;

const CALC: &str = indoc! {"
    grammar Calc;
    expr : expr ('+' | '-') term | term ;
    term : INT | ID | '(' expr ')' ;
    INT : [0-9]+ ;
    ID : [a-z]+ ;
    WS : [ \\t\\r\\n]+ -> skip ;
"};

fn dump(result: &TokenizeResult) -> String {
    let mut out = String::new();
    for t in &result.tokens {
        out.push_str(&format!(
            "{} {:?} {}..{} @{}:{}",
            t.kind, t.value, t.start, t.end, t.line, t.column
        ));
        if t.skipped {
            out.push_str(" skipped");
        }
        if let Some(channel) = &t.channel {
            out.push_str(&format!(" channel={channel}"));
        }
        out.push('\n');
    }
    for e in &result.errors {
        out.push_str(&format!("error: {e}\n"));
    }
    for d in &result.diagnostics {
        out.push_str(&format!("{d}\n"));
    }
    out
}

fn run(source: &str, input: &str) -> String {
    let (grammar, _) = scan(source);
    dump(&tokenize(&grammar, input))
}

#[test]
fn calculator_input() {
    insta::assert_snapshot!(run(CALC, "1 + (x2 - 30)"), @r#"
    INT "1" 0..1 @1:0
    WS " " 1..2 @1:1 skipped
    '+' "+" 2..3 @1:2
    WS " " 3..4 @1:3 skipped
    '(' "(" 4..5 @1:4
    ID "x" 5..6 @1:5
    INT "2" 6..7 @1:6
    WS " " 7..8 @1:7 skipped
    '-' "-" 8..9 @1:8
    WS " " 9..10 @1:9 skipped
    INT "30" 10..12 @1:10
    ')' ")" 12..13 @1:12
    "#);
}

#[test]
fn visible_types_drop_skipped_tokens() {
    let (grammar, _) = scan(CALC);
    let result = tokenize(&grammar, "a + 1");
    assert!(result.is_success());
    assert_eq!(result.types(), ["ID", "'+'", "INT"]);
}

#[test]
fn longest_match_wins() {
    let source = indoc! {"
        lexer grammar L;
        LT : '<' ;
        LE : '<=' ;
        SHL : '<<' ;
    "};

    insta::assert_snapshot!(run(source, "<=<<<"), @r#"
    LE "<=" 0..2 @1:0
    SHL "<<" 2..4 @1:2
    LT "<" 4..5 @1:4
    "#);
}

#[test]
fn ties_go_to_the_earlier_rule() {
    let source = indoc! {"
        lexer grammar L;
        IF : 'if' ;
        ID : [a-z]+ ;
    "};

    insta::assert_snapshot!(run(source, "if iffy"), @r#"
    IF "if" 0..2 @1:0
    ID "iffy" 3..7 @1:3
    error: no rule matches ' ' at line 1, column 2
    "#);
}

#[test]
fn implicit_literals_beat_broad_rules() {
    let source = indoc! {"
        grammar G;
        stmt : 'print' ID ;
        ID : [a-z]+ ;
        WS : ' ' -> skip ;
    "};
    let (grammar, _) = scan(source);
    let result = tokenize(&grammar, "print printer");

    assert_eq!(result.types(), ["'print'", "ID"]);
}

#[test]
fn explicit_rule_replaces_implicit_literal() {
    let source = indoc! {"
        grammar G;
        sum : INT '+' INT ;
        PLUS : '+' ;
        INT : [0-9]+ ;
    "};
    let (grammar, _) = scan(source);
    let tokenizer = Tokenizer::new(&grammar, &TokenizeOptions::default());

    assert_eq!(tokenizer.candidate_types().collect::<Vec<_>>(), ["PLUS", "INT"]);
    assert_eq!(tokenizer.tokenize("1+2").types(), ["INT", "PLUS", "INT"]);
}

#[test]
fn implicit_literals_can_be_disabled() {
    let (grammar, _) = scan(CALC);
    let options = TokenizeOptions::default().with_implicit_literals(false);
    let result = tokenize_with(&grammar, "1+2", &options);

    assert_eq!(result.types(), ["INT", "INT"]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].character, '+');
    assert_eq!(result.errors[0].offset, 1);
}

#[test]
fn unmatched_characters_are_reported_individually() {
    let source = indoc! {"
        lexer grammar L;
        A : 'a' ;
    "};

    insta::assert_snapshot!(run(source, "a\n?é a"), @r#"
    A "a" 0..1 @1:0
    A "a" 6..7 @2:3
    error: no rule matches '\n' at line 1, column 1
    error: no rule matches '?' at line 2, column 0
    error: no rule matches 'é' at line 2, column 1
    error: no rule matches ' ' at line 2, column 2
    "#);
}

#[test]
fn commands_shape_tokens() {
    let source = indoc! {"
        lexer grammar L;
        channels { COMMENTS }
        STRING_START : '\"' -> more ;
        STRING : [a-z]* '\"' ;
        COMMENT : '#' ~[\\n]* -> channel(COMMENTS) ;
        KEYWORD : 'let' -> type(LET) ;
        NL : '\\n' -> channel(HIDDEN) ;
        ID : [a-z]+ ;
        SP : ' ' -> skip ;
    "};

    insta::assert_snapshot!(run(source, "let x \"hi\"#note\n"), @r##"
    LET "let" 0..3 @1:0
    SP " " 3..4 @1:3 skipped
    ID "x" 4..5 @1:4
    SP " " 5..6 @1:5 skipped
    STRING "\"hi\"" 6..10 @1:6
    COMMENT "#note" 10..15 @1:10 channel=COMMENTS
    NL "\n" 15..16 @1:15 channel=HIDDEN
    "##);
}

#[test]
fn dangling_more_becomes_a_token() {
    let source = indoc! {"
        lexer grammar L;
        OPEN : '<' -> more ;
    "};
    let (grammar, _) = scan(source);
    let result = tokenize(&grammar, "<<");

    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, "OPEN");
    assert_eq!(result.tokens[0].value, "<<");
}

#[test]
fn only_default_mode_rules_participate() {
    let source = indoc! {"
        lexer grammar L;
        OPEN : '<' -> pushMode(TAG) ;
        TEXT : ~'<'+ ;
        mode TAG;
        NAME : [a-z]+ ;
        CLOSE : '>' -> popMode ;
    "};
    let (grammar, _) = scan(source);

    let result = tokenize(&grammar, "<b>");
    assert_eq!(result.types(), ["OPEN", "TEXT"]);

    let options = TokenizeOptions::default().with_rules(["OPEN", "NAME", "CLOSE"]);
    let result = tokenize_with(&grammar, "<b>", &options);
    assert_eq!(result.types(), ["OPEN", "NAME", "CLOSE"]);
}

#[test]
fn unknown_or_fragment_rules_are_reported() {
    let source = indoc! {"
        lexer grammar L;
        A : 'a' ;
        fragment F : 'f' ;
    "};
    let (grammar, _) = scan(source);
    let options = TokenizeOptions::default().with_rules(["A", "F", "Nope"]);
    let result = tokenize_with(&grammar, "a", &options);

    insta::assert_snapshot!(dump(&result), @r#"
    A "a" 0..1 @1:0
    warning: pattern cannot be simulated: `F` is not a token rule
    warning: pattern cannot be simulated: `Nope` is not a token rule
    "#);
}

#[test]
fn uncompilable_rules_never_match() {
    let source = indoc! {"
        lexer grammar L;
        A : 'a' {count++;} ;
        B : [a-z] ;
    "};

    insta::assert_snapshot!(run(source, "a"), @r#"
    B "a" 0..1 @1:0
    warning at line 2: pattern cannot be simulated: embedded action `{count++;}` in `A` (hint: the rule never matches during simulation)
    "#);
}

#[test]
fn values_reconstruct_the_input() {
    let (grammar, _) = scan(CALC);
    let input = "foo + (1 - bar)\n\t+ 42";
    let result = tokenize(&grammar, input);

    assert!(result.is_success());
    let joined: String = result.tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(joined, input);
}

#[test]
fn tokenizing_is_deterministic() {
    let (grammar, _) = scan(CALC);
    let input = "a+b-(c+1)";
    assert_eq!(tokenize(&grammar, input), tokenize(&grammar, input));
}

#[test]
fn token_serialization() {
    let (grammar, _) = scan(indoc! {"
        lexer grammar L;
        ID : [a-z]+ ;
        WS : ' ' -> channel(HIDDEN) ;
    "});
    let result = tokenize(&grammar, "a b");
    let json = serde_json::to_value(&result.tokens).unwrap();

    assert_eq!(
        json,
        serde_json::json!([
            {"type": "ID", "value": "a", "start": 0, "end": 1, "line": 1, "column": 0, "skipped": false},
            {"type": "WS", "value": " ", "start": 1, "end": 2, "line": 1, "column": 1, "skipped": false, "channel": "HIDDEN"},
            {"type": "ID", "value": "b", "start": 2, "end": 3, "line": 1, "column": 2, "skipped": false},
        ])
    );
}

use indoc::indoc;

use super::*;
use crate::scan;

fn regex(pattern: &str) -> String {
    match translate_standalone(pattern) {
        Ok(t) => t.regex,
        Err(e) => format!("error: {e}"),
    }
}

#[test]
fn translation_table() {
    insta::assert_snapshot!(
        [
            "'if'",
            "'+'",
            "[a-z_]+",
            "'a'..'z'",
            "~[\\r\\n]*",
            "~'\"'",
            "~('a' | [0-9])",
            ".",
            "'/*' .*? '*/'",
            "[ \\t]+ -> skip",
            "[\\u0041-\\u005A]",
            "[[^&]",
        ]
        .iter()
        .map(|p| format!("{p}  =>  {}", regex(p)))
        .collect::<Vec<_>>()
        .join("\n"),
        @r#"
    'if'  =>  (?:if)
    '+'  =>  (?:\+)
    [a-z_]+  =>  [a-z_]+
    'a'..'z'  =>  [a-z]
    ~[\r\n]*  =>  [^\r\n]*
    ~'"'  =>  [^"]
    ~('a' | [0-9])  =>  [^a0-9]
    .  =>  (?s:.)
    '/*' .*? '*/'  =>  (?:/\*)(?s:.)*?(?:\*/)
    [ \t]+ -> skip  =>  [ \t]+
    [\u0041-\u005A]  =>  [\x{0041}-\x{005A}]
    [[^&]  =>  [\[\^\&]
    "#
    );
}

#[test]
fn unsupported_constructs() {
    insta::assert_snapshot!(
        [
            "'a' {count++;}",
            "{isStart()}? 'a'",
            "ID",
            "'a' EOF",
            "~ID",
            "'a'..'bc'",
        ]
        .iter()
        .map(|p| format!("{p}  =>  {}", regex(p)))
        .collect::<Vec<_>>()
        .join("\n"),
        @"
    'a' {count++;}  =>  error: unsupported construct in pattern: embedded action `{count++;}`
    {isStart()}? 'a'  =>  error: unsupported construct in pattern: semantic predicate `{isStart()}`
    ID  =>  error: unsupported construct in pattern: reference to `ID` outside a grammar
    'a' EOF  =>  error: unsupported construct in pattern: `EOF` in a lexer rule
    ~ID  =>  error: unsupported construct in pattern: negation of `ID`
    'a'..'bc'  =>  error: invalid pattern: 'bc' is not a single character
    "
    );
}

#[test]
fn unbalanced_group_is_invalid() {
    assert!(matches!(compile("'a' )"), Err(Error::InvalidPattern(_))));
}

#[test]
fn longest_match_wins_within_a_pattern() {
    let pattern = compile("'=' | '=='").unwrap();
    assert_eq!(pattern.match_at("==", 0), Some(2));
    assert!(!pattern.is_lazy());
}

#[test]
fn lazy_loop_stops_at_first_terminator() {
    let lazy = compile("'/*' .*? '*/'").unwrap();
    let greedy = compile("'/*' .* '*/'").unwrap();
    let input = "/* a */ b */";

    assert!(lazy.is_lazy());
    assert_eq!(lazy.match_at(input, 0), Some(7));
    assert_eq!(greedy.match_at(input, 0), Some(12));
}

#[test]
fn match_is_anchored_at_offset() {
    let digits = compile("[0-9]+").unwrap();
    assert_eq!(digits.match_at("ab12c", 2), Some(2));
    assert_eq!(digits.match_at("ab12c", 0), None);
    assert_eq!(digits.match_at("ab12c", 5), None);
    assert_eq!(digits.match_at("ab12c", 9), None);
}

#[test]
fn empty_match_is_no_match() {
    let pattern = compile("'a'*").unwrap();
    assert_eq!(pattern.match_at("b", 0), None);
    assert_eq!(pattern.match_at("aab", 0), Some(2));
}

#[test]
fn lengths_are_in_bytes() {
    let line = compile("~[\\r\\n]+").unwrap();
    assert_eq!(line.match_at("héllo\n", 0), Some(6));
}

#[test]
fn literal_escapes_operators() {
    let pattern = Pattern::literal("a+b").unwrap();
    assert_eq!(pattern.match_at("a+b", 0), Some(3));
    assert_eq!(pattern.match_at("aab", 0), None);
}

#[test]
fn whole_input_matching() {
    let word = compile("[a-z]+").unwrap();
    assert!(word.matches_whole("abc"));
    assert!(!word.matches_whole("abc1"));
    assert!(!word.matches_whole(""));

    let comment = compile("'/*' .*? '*/'").unwrap();
    assert!(comment.matches_whole("/* a */ */"));
    assert!(!comment.matches_whole("/* a */ x"));
}

#[test]
fn compiler_inlines_referenced_rules() {
    let (grammar, _) = scan(indoc! {"
        lexer grammar L;
        ID : LETTER (LETTER | DIGIT)* ;
        fragment LETTER : [a-zA-Z] ;
        fragment DIGIT : [0-9] ;
    "});
    let mut compiler = PatternCompiler::new(&grammar);

    insta::assert_snapshot!(
        compiler.translate_rule("ID").unwrap().regex,
        @"(?:[a-zA-Z])(?:(?:[a-zA-Z])|(?:[0-9]))*"
    );
    let id = compiler.compile_rule("ID").unwrap();
    assert_eq!(id.match_at("ab1 c", 0), Some(3));
    assert_eq!(id.match_at("1ab", 0), None);
}

#[test]
fn compiler_propagates_laziness_from_fragments() {
    let (grammar, _) = scan(indoc! {"
        lexer grammar L;
        COMMENT : '/*' BODY '*/' ;
        fragment BODY : .*? ;
    "});
    let pattern = PatternCompiler::new(&grammar).compile_rule("COMMENT").unwrap();
    assert!(pattern.is_lazy());
    assert_eq!(pattern.match_at("/* x */ */", 0), Some(7));
}

#[test]
fn compiler_rejects_cycles_and_parser_rules() {
    let (grammar, _) = scan(indoc! {"
        grammar G;
        start : A ;
        A : 'a' B ;
        B : 'b' A? ;
        C : start ;
        D : MISSING ;
    "});
    let mut compiler = PatternCompiler::new(&grammar);

    assert!(matches!(
        compiler.translate_rule("A"),
        Err(Error::UnsupportedPattern(m)) if m.contains("refers to itself")
    ));
    assert!(matches!(
        compiler.translate_rule("C"),
        Err(Error::UnsupportedPattern(m)) if m.contains("parser rule `start`")
    ));
    assert!(matches!(
        compiler.translate_rule("D"),
        Err(Error::UnsupportedPattern(m)) if m.contains("`MISSING` is not defined")
    ));
}

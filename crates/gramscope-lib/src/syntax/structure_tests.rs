use super::{ElementContent, LexerCommand, Modifier, RuleStructure, lexer_commands};

fn dump(body: &str) -> String {
    let structure = RuleStructure::parse(body);
    let mut out = String::new();
    for (i, alt) in structure.alternatives.iter().enumerate() {
        out.push_str(&format!("{i}: {alt}"));
        if let Some(label) = &alt.label {
            out.push_str(&format!(" #{label}"));
        }
        for cmd in &alt.commands {
            out.push_str(&format!(" -> {cmd}"));
        }
        out.push('\n');
    }
    out
}

#[test]
fn splits_top_level_alternatives() {
    insta::assert_snapshot!(dump("expr '+' term | term | '(' expr ')'"), @r"
    0: expr '+' term
    1: term
    2: '(' expr ')'
    ");
}

#[test]
fn nested_groups_stay_in_one_alternative() {
    insta::assert_snapshot!(dump("a (b | c (d | e)*)+ f?"), @r"
    0: a ( b | c ( d | e )* )+ f?
    ");
}

#[test]
fn labels_actions_and_options_are_dropped() {
    insta::assert_snapshot!(dump("l=e op='^' <assoc=right> r=e {act();} # Pow | INT {p}? # Lit"), @r"
    0: e '^' e #Pow
    1: INT #Lit
    ");
}

#[test]
fn lexer_constructs() {
    insta::assert_snapshot!(dump("'a'..'z' [0-9]+ ~[\\r\\n]* . ~'x' -> skip"), @r"
    0: 'a'..'z' [0-9]+ ~[\r\n]* . ~'x' -> skip
    ");
}

#[test]
fn non_greedy_modifiers() {
    let structure = RuleStructure::parse("'/*' .*? '*/'");
    let elements = &structure.alternatives[0].elements;
    assert_eq!(elements[1].content, ElementContent::Wildcard);
    assert_eq!(elements[1].modifier, Modifier::ZeroOrMore);
    assert!(!elements[1].greedy);
    assert_eq!(elements[1].to_string(), ".*?");
}

#[test]
fn element_classification() {
    let structure = RuleStructure::parse("stmt ID '+' EOF");
    let contents: Vec<_> = structure.alternatives[0]
        .elements
        .iter()
        .map(|e| e.content.clone())
        .collect();
    assert_eq!(
        contents,
        vec![
            ElementContent::Rule("stmt".into()),
            ElementContent::Token("ID".into()),
            ElementContent::Literal("'+'".into()),
            ElementContent::Eof,
        ]
    );
}

#[test]
fn modifier_flags() {
    assert!(Modifier::Optional.is_optional());
    assert!(!Modifier::Optional.is_repeating());
    assert!(Modifier::ZeroOrMore.is_optional());
    assert!(Modifier::ZeroOrMore.is_repeating());
    assert!(!Modifier::OneOrMore.is_optional());
    assert!(Modifier::OneOrMore.is_repeating());
    assert!(!Modifier::None.is_optional());
}

#[test]
fn empty_alternative() {
    let structure = RuleStructure::parse("a |");
    assert_eq!(structure.alternatives.len(), 2);
    assert!(structure.alternatives[1].elements.is_empty());
}

#[test]
fn alternative_offsets() {
    let body = "a b\n| c";
    let structure = RuleStructure::parse(body);
    assert_eq!(structure.alternatives[0].offset, 0);
    assert_eq!(&body[structure.alternatives[1].offset..], "c");
}

#[test]
fn first_names_descend_into_groups() {
    let structure = RuleStructure::parse("(a | B c) d | e");
    assert_eq!(structure.alternatives[0].first_names(), vec!["a", "B"]);
    assert_eq!(structure.alternatives[1].first_names(), vec!["e"]);
}

#[test]
fn stray_close_paren_does_not_drop_rest() {
    let structure = RuleStructure::parse("a ) b");
    assert_eq!(structure.to_string(), "a | b");
}

#[test]
fn commands_of_lexer_rule() {
    assert_eq!(
        lexer_commands("'\"' -> pushMode(STR), more"),
        vec![LexerCommand::PushMode("STR".into()), LexerCommand::More]
    );
    assert_eq!(
        lexer_commands("[ \\t]+ -> channel(HIDDEN)"),
        vec![LexerCommand::Channel("HIDDEN".into())]
    );
    assert_eq!(lexer_commands("'a' -> popMode"), vec![LexerCommand::PopMode]);
    assert_eq!(
        lexer_commands("'a' -> type(B) | 'b' -> type(B)"),
        vec![LexerCommand::Type("B".into())]
    );
    assert!(lexer_commands("'a' ('b' -> skip)").is_empty());
}

#[test]
fn unknown_commands_are_kept_verbatim() {
    assert_eq!(
        lexer_commands("'a' -> custom(X), other"),
        vec![
            LexerCommand::Other("custom(X)".into()),
            LexerCommand::Other("other".into())
        ]
    );
    assert_eq!(
        LexerCommand::Mode("M".into()).target_mode(),
        Some("M")
    );
}

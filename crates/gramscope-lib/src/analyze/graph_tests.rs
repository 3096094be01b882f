use indoc::indoc;

use super::*;
use crate::scan;

fn grammar(source: &str) -> Grammar {
    scan(source).0
}

#[test]
fn fan_in_and_fan_out() {
    let g = grammar(indoc! {"
        grammar G;
        start : expr EOF ;
        expr : expr '+' term | term ;
        term : INT | '(' expr ')' ;
        INT : DIGIT+ ;
        fragment DIGIT : [0-9] ;
    "});
    let graph = ReferenceGraph::build(&g);

    assert_eq!(graph.rules().collect::<Vec<_>>(), ["start", "expr", "term", "INT", "DIGIT"]);
    assert_eq!(graph.successors("expr").collect::<Vec<_>>(), ["expr", "term"]);
    assert_eq!(graph.fan_out("expr"), 1);
    assert_eq!(graph.fan_in("expr"), 2);
    assert_eq!(graph.referrers("expr").collect::<Vec<_>>(), ["start", "term"]);
    assert_eq!(graph.fan_in("start"), 0);
    assert_eq!(graph.fan_in("DIGIT"), 1);
    assert!(graph.is_self_referencing("expr"));
    assert!(!graph.is_self_referencing("term"));
    assert!(!graph.contains("EOF"));
}

#[test]
fn dependencies_come_first() {
    let g = grammar(indoc! {"
        grammar G;
        program : stmt* EOF ;
        stmt : expr ';' | block ;
        block : '{' stmt* '}' ;
        expr : atom ('+' atom)* ;
        atom : ID ;
    "});

    // stmt and block reference each other
    assert_eq!(dependency_order(&g), ["program", "stmt", "block", "expr", "atom"]);
}

#[test]
fn acyclic_order_is_topological() {
    let g = grammar(indoc! {"
        grammar G;
        program : stmt* EOF ;
        stmt : expr ';' ;
        expr : expr '+' atom | atom ;
        atom : ID | literal ;
        literal : INT ;
    "});

    let order = dependency_order(&g);
    assert_eq!(order, ["literal", "atom", "expr", "stmt", "program"]);

    let position = |name: &str| order.iter().position(|r| r == name);
    for rule in g.parser_rules() {
        for target in rule.external_references() {
            if g.rule(target).is_some_and(|r| r.is_parser()) {
                assert!(position(target) < position(&rule.name), "{target} before {}", rule.name);
            }
        }
    }
}

#[test]
fn ties_keep_source_order() {
    let g = grammar(indoc! {"
        grammar G;
        a : c ;
        b : c ;
        c : ID ;
        d : ID ;
    "});

    assert_eq!(dependency_order(&g), ["c", "a", "b", "d"]);
}

#[test]
fn usages_with_lines() {
    let g = grammar(indoc! {"
        grammar G;
        start : expr EOF ;
        expr
            : expr '+' term
            | term
            ;
        term : INT ;
        INT : [0-9]+ ;
    "});

    insta::assert_snapshot!(
        find_rule_usages(&g, "term")
            .iter()
            .map(|u| format!("{} @{}", u.rule, u.line))
            .collect::<Vec<_>>()
            .join("\n"),
        @r"
    expr @4
    expr @5
    "
    );
    assert_eq!(
        find_rule_usages(&g, "expr"),
        [
            RuleUsage { rule: "start".into(), line: 2 },
            RuleUsage { rule: "expr".into(), line: 4 },
        ]
    );
    assert!(find_rule_usages(&g, "start").is_empty());
}

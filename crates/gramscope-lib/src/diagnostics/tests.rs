use super::*;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
    insta::assert_snapshot!(format!("{}", Severity::Info), @"info");
}

#[test]
fn severity_follows_kind() {
    assert_eq!(
        DiagnosticKind::DuplicateRule.default_severity(),
        Severity::Error
    );
    assert_eq!(
        DiagnosticKind::UnusedRule.default_severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticKind::DirectLeftRecursion.default_severity(),
        Severity::Info
    );
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::UnusedRule).line(3).emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(
        diagnostics.as_slice()[0].message(),
        "rule is never referenced"
    );
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedReference)
        .line(2)
        .rule("expr")
        .message("Term")
        .emit();

    let diag = &diagnostics.as_slice()[0];
    assert_eq!(diag.message(), "`Term` is not defined");
    assert_eq!(diag.rule(), Some("expr"));
    assert_eq!(diag.line(), Some(2));
    assert!(diag.is_error());
}

#[test]
fn custom_message_falls_back_to_prefix_template() {
    let msg = DiagnosticKind::LexerConflict.message(Some("`IF` never matches"));
    assert_eq!(
        msg,
        "lexer rule is shadowed by an earlier rule: `IF` never matches"
    );
}

#[test]
fn raw_message_bypasses_template() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::HiddenLeftRecursion)
        .raw_message("a -> b -> a")
        .emit();

    assert_eq!(diagnostics.as_slice()[0].message(), "a -> b -> a");
}

#[test]
fn severity_override() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DirectLeftRecursion)
        .severity(Severity::Error)
        .emit();

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.info_count(), 0);
}

#[test]
fn default_hint_is_attached() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingGrammarDeclaration)
        .emit();

    let hints = diagnostics.as_slice()[0].hints();
    assert_eq!(hints.len(), 1);
    assert!(hints[0].contains("grammar Name;"));
}

#[test]
fn counts_and_filters() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::DuplicateRule).emit();
    diagnostics.report(DiagnosticKind::UnusedRule).rule("a").emit();
    diagnostics.report(DiagnosticKind::UnusedRule).rule("b").emit();
    diagnostics
        .report(DiagnosticKind::DirectLeftRecursion)
        .rule("a")
        .emit();

    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 2);
    assert_eq!(diagnostics.info_count(), 1);
    assert_eq!(diagnostics.filter_by_severity(Severity::Warning).len(), 2);
    assert_eq!(
        diagnostics.filter_by_kind(DiagnosticKind::UnusedRule).len(),
        2
    );
    assert_eq!(diagnostics.for_rule("a").len(), 2);
    assert!(diagnostics.has_kind(DiagnosticKind::DuplicateRule));
    assert!(!diagnostics.has_kind(DiagnosticKind::ModeCycle));
}

#[test]
fn extend_keeps_order() {
    let mut first = Diagnostics::new();
    first.report(DiagnosticKind::DuplicateRule).emit();
    let mut second = Diagnostics::new();
    second.report(DiagnosticKind::UnusedRule).emit();

    first.extend(second);
    let kinds: Vec<_> = first.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::DuplicateRule, DiagnosticKind::UnusedRule]
    );
}

#[test]
fn plain_rendering_without_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnusedRule)
        .line(4)
        .message("helper")
        .emit();
    diagnostics
        .report(DiagnosticKind::DuplicateAlternative)
        .message("`a b`")
        .related_to("first occurrence", 2)
        .emit();

    insta::assert_snapshot!(diagnostics.printer().render(), @r"
    warning at line 4: rule `helper` is never referenced
    error: duplicate alternative: `a b` (related: first occurrence at line 2)
    ");
}

#[test]
fn source_rendering_underlines_line() {
    let source = "grammar T;\n  start : A ;\n";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedReference)
        .line(2)
        .message("A")
        .emit();

    let rendered = diagnostics.render(source);
    assert!(rendered.starts_with("error: `A` is not defined"));
    assert!(rendered.contains("start : A ;"));
    assert!(rendered.contains("^^^"));
}

#[test]
fn source_rendering_includes_hints_and_path() {
    let source = "x : y ;\n";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingGrammarDeclaration)
        .line(1)
        .emit();

    let rendered = diagnostics
        .printer()
        .source(source)
        .path("T.g4")
        .render();
    assert!(rendered.contains("T.g4"));
    assert!(rendered.contains("help"));
    assert!(rendered.contains("grammar Name;"));
}

#[test]
fn source_rendering_without_line() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ModeCycle)
        .message("A -> B -> A")
        .emit();

    let rendered = diagnostics.render("grammar T;\n");
    assert!(rendered.contains("warning: lexer modes form a cycle: A -> B -> A"));
    assert!(!rendered.contains("grammar T;"));
}

#[test]
fn line_past_end_renders_title_only() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::UnusedRule).line(99).emit();

    let rendered = diagnostics.render("grammar T;");
    assert!(rendered.contains("rule is never referenced"));
}

#[test]
fn serializes_with_lowercase_severity() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnusedRule)
        .line(1)
        .rule("ws")
        .emit();

    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["severity"], "warning");
    assert_eq!(json[0]["kind"], "UnusedRule");
    assert_eq!(json[0]["rule"], "ws");
    assert_eq!(json[0]["line"], 1);
}

//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let level = severity_to_level(diag.severity);
            let title = level.primary_title(&diag.message);

            let mut group = match diag.line.and_then(|l| line_range(source, l)) {
                Some(range) => {
                    let mut snippet = Snippet::source(source)
                        .line_start(1)
                        .annotation(AnnotationKind::Primary.span(range));

                    if let Some(p) = self.path {
                        snippet = snippet.path(p);
                    }

                    for related in &diag.related {
                        if let Some(r) = line_range(source, related.line) {
                            snippet = snippet.annotation(
                                AnnotationKind::Context.span(r).label(&related.message),
                            );
                        }
                    }

                    title.element(snippet)
                }
                None => Group::with_title(title),
            };

            for hint in &diag.hints {
                group = group.element(Level::HELP.message(hint));
            }

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&[group]))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", diag)?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
        Severity::Info => Level::INFO,
    }
}

/// Byte range of the non-blank part of 1-based line `line`.
fn line_range(source: &str, line: usize) -> Option<Range<usize>> {
    let mut start = 0;
    for (idx, text) in source.split('\n').enumerate() {
        if idx + 1 == line {
            let content = text.trim_end_matches('\r');
            let indent = content.len() - content.trim_start().len();
            let begin = start + indent;
            let end = start + content.len();
            if begin == end {
                return Some(begin..(begin + 1).min(source.len()));
            }
            return Some(begin..end);
        }
        start += text.len() + 1;
    }
    None
}

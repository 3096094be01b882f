mod message;
mod printer;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use message::{Diagnostic, DiagnosticKind, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

/// Ordered collection of issues produced by the scanner and analysis passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given kind.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(&mut self, kind: DiagnosticKind) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: Diagnostic::with_default_message(kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn info_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_info()).count()
    }

    pub fn filter_by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.messages
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    pub fn filter_by_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.messages.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.messages.iter().any(|d| d.kind == kind)
    }

    /// Diagnostics attached to the named rule.
    pub fn for_rule(&self, rule: &str) -> Vec<&Diagnostic> {
        self.messages
            .iter()
            .filter(|d| d.rule.as_deref() == Some(rule))
            .collect()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }

    pub fn render(&self, source: &str) -> String {
        self.printer().source(source).render()
    }

    pub fn render_colored(&self, source: &str, colored: bool) -> String {
        self.printer().source(source).colored(colored).render()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Replace the message verbatim, bypassing the kind's template.
    pub fn raw_message(mut self, msg: impl Into<String>) -> Self {
        self.message.message = msg.into();
        self
    }

    pub fn line(mut self, line: usize) -> Self {
        self.message.line = Some(line);
        self
    }

    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.message.rule = Some(name.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.message.severity = severity;
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, line: usize) -> Self {
        self.message.related.push(RelatedInfo::new(line, msg));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}

//! Grammar scanner: raw grammar text to a [`Grammar`] model.
//!
//! The scanner is approximate. It never fails: anything it
//! cannot read becomes a diagnostic and scanning continues.
//!
//! Comments are blanked out first (see [`comments`]), keeping the line
//! structure intact. A small state machine then walks the text:
//!
//! - **Outside**: declarations (`grammar`, `import`, `options`, `tokens`,
//!   `channels`, `mode`, `@name {..}`) are recognised by leading keyword;
//!   anything else that starts with an identifier opens a rule.
//! - **PendingName**: a rule name was read; header clauses (`returns [..]`,
//!   `locals [..]`, `throws X`, `options {..}`, `@init {..}`) are tolerated
//!   until the `:` that opens the body.
//! - **InsideRule**: the body is captured up to the terminating `;`, bounded
//!   by [`ScanLimits::max_rule_lines`].
//!
//! Each step returns how many bytes it consumed; the driver alone advances
//! the position.

mod comments;


use gramscope_core::{DEFAULT_MODE, Grammar, GrammarKind, LexerMode, Rule, is_identifier, is_lexer_name};

use crate::config::ScanLimits;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::extract_references;

/// Scans `source` with default limits.
pub fn scan(source: &str) -> (Grammar, Diagnostics) {
    scan_with(source, &ScanLimits::default())
}

pub fn scan_with(source: &str, limits: &ScanLimits) -> (Grammar, Diagnostics) {
    Scanner::new(source, limits).run()
}

const ACCESS_MODIFIERS: &[&str] = &["public", "private", "protected"];

/// A rule whose name has been read but whose body is not yet closed.
#[derive(Debug)]
struct PendingRule {
    name: String,
    is_fragment: bool,
    line: usize,
    after_throws: bool,
}

enum State {
    Outside,
    PendingName(PendingRule),
    InsideRule(PendingRule),
}

enum BodyEnd {
    /// Offset of the terminating `;`.
    Terminator(usize),
    /// Start of a line that opens another rule or mode.
    NextRule(usize),
    /// Start of the first line past the line cap.
    Capped(usize),
    Exhausted,
}

struct Scanner<'a> {
    text: String,
    line_starts: Vec<usize>,
    limits: &'a ScanLimits,
    grammar: Grammar,
    diagnostics: Diagnostics,
    mode: String,
    declared: bool,
}

impl<'a> Scanner<'a> {
    fn new(source: &str, limits: &'a ScanLimits) -> Self {
        let text = comments::strip_comments(source);
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            line_starts,
            limits,
            grammar: Grammar::new(),
            diagnostics: Diagnostics::new(),
            mode: DEFAULT_MODE.to_string(),
            declared: false,
        }
    }

    fn run(mut self) -> (Grammar, Diagnostics) {
        let mut state = State::Outside;
        let mut pos = 0;

        while pos < self.text.len() {
            let (next, consumed) = match state {
                State::Outside => self.outside(pos),
                State::PendingName(rule) => self.pending_name(rule, pos),
                State::InsideRule(rule) => self.inside_rule(rule, pos),
            };
            state = next;
            pos += consumed;
        }

        match state {
            State::Outside => {}
            State::PendingName(rule) => self.missing_colon(&rule),
            State::InsideRule(rule) => {
                let end = self.text.len();
                self.finish_rule(rule, end, end, None);
            }
        }

        let mut diagnostics = Diagnostics::new();
        if !self.declared {
            diagnostics
                .report(DiagnosticKind::MissingGrammarDeclaration)
                .line(1)
                .emit();
        }
        diagnostics.extend(self.diagnostics);

        (self.grammar, diagnostics)
    }

    // ------------------------------------------------------------------
    // Outside
    // ------------------------------------------------------------------

    fn outside(&mut self, pos: usize) -> (State, usize) {
        let Some(c) = self.char_at(pos) else {
            return (State::Outside, 1);
        };
        if c.is_whitespace() {
            return (State::Outside, c.len_utf8());
        }

        let consumed = if self.keyword_at(pos, "grammar")
            || self.keyword_at(pos, "lexer")
            || self.keyword_at(pos, "parser")
        {
            self.grammar_decl(pos)
        } else if self.keyword_at(pos, "import") {
            self.import_decl(pos)
        } else if let Some(kw) = ["options", "tokens", "channels"]
            .into_iter()
            .find(|kw| self.keyword_at(pos, kw))
        {
            self.block_decl(pos, kw)
        } else if self.keyword_at(pos, "mode") {
            self.mode_decl(pos)
        } else if self.keyword_at(pos, "catch") || self.keyword_at(pos, "finally") {
            self.exception_handler(pos)
        } else if c == '@' {
            self.named_action(pos)
        } else if let Some((rule, consumed)) = self.rule_start(pos) {
            return (State::PendingName(rule), consumed);
        } else {
            self.unrecognized(pos)
        };

        (State::Outside, consumed)
    }

    fn grammar_decl(&mut self, pos: usize) -> usize {
        let mut p = pos;
        let mut kind = GrammarKind::Combined;
        if self.keyword_at(p, "lexer") {
            kind = GrammarKind::Lexer;
            p = self.skip_ws(p + "lexer".len());
        } else if self.keyword_at(p, "parser") {
            kind = GrammarKind::Parser;
            p = self.skip_ws(p + "parser".len());
        }
        if !self.keyword_at(p, "grammar") {
            return self.unrecognized(pos);
        }

        let line = self.line_of(pos);
        p = self.skip_ws(p + "grammar".len());
        let name = self.word_at(p).to_string();
        let end = self.statement_end(p);

        if self.declared {
            self.diagnostics
                .report(DiagnosticKind::UnrecognizedLine)
                .line(line)
                .message("grammar is declared more than once")
                .emit();
        } else if name.is_empty() {
            self.diagnostics
                .report(DiagnosticKind::MissingGrammarDeclaration)
                .line(line)
                .raw_message("grammar declaration has no name")
                .emit();
            self.declared = true;
        } else {
            self.grammar.name = name;
            self.grammar.kind = kind;
            self.declared = true;
        }

        end - pos
    }

    fn import_decl(&mut self, pos: usize) -> usize {
        let start = pos + "import".len();
        let end = self.statement_end(start);
        let list = self.text[start..end].trim_end_matches(';');
        for item in list.split(',') {
            // `import Alias = Name;` resolves to `Name`.
            let name = item.rsplit('=').next().unwrap_or(item).trim();
            if is_identifier(name) {
                self.grammar.imports.insert(name.to_string());
            }
        }
        end - pos
    }

    fn block_decl(&mut self, pos: usize, keyword: &str) -> usize {
        let line = self.line_of(pos);
        let open = self.skip_ws(pos + keyword.len());
        if self.char_at(open) != Some('{') {
            return self.unrecognized(pos);
        }

        let Some(close) = self.balanced_end(open, '{', '}') else {
            self.diagnostics
                .report(DiagnosticKind::UnterminatedBlock)
                .line(line)
                .raw_message(format!("`{keyword}` block is never closed"))
                .emit();
            return self.text.len() - pos;
        };

        let content = self.text[open + 1..close - 1].to_string();
        match keyword {
            "options" => {
                for entry in content.split(';') {
                    if let Some((key, value)) = entry.split_once('=') {
                        let key = key.trim();
                        if is_identifier(key) {
                            self.grammar
                                .options
                                .insert(key.to_string(), value.trim().to_string());
                        }
                    }
                }
            }
            _ => {
                let names = content
                    .split([',', ';'])
                    .map(|n| n.split('=').next().unwrap_or(n).trim())
                    .filter(|n| is_identifier(n))
                    .map(str::to_string);
                if keyword == "tokens" {
                    self.grammar.tokens.extend(names);
                } else {
                    self.grammar.channels.extend(names);
                }
            }
        }

        close - pos
    }

    fn mode_decl(&mut self, pos: usize) -> usize {
        let p = self.skip_ws(pos + "mode".len());
        let name = self.word_at(p).to_string();
        if name.is_empty() {
            return self.unrecognized(pos);
        }

        let line = self.line_of(pos);
        if self.grammar.mode(&name).is_none() {
            self.grammar.modes.push(LexerMode::new(name.clone(), Some(line)));
        }
        self.mode = name;
        self.statement_end(p) - pos
    }

    /// `catch [..] {..}` and `finally {..}` trailing a rule.
    fn exception_handler(&mut self, pos: usize) -> usize {
        let mut p = pos + self.word_at(pos).len();
        for (open, close) in [('[', ']'), ('{', '}')] {
            let q = self.skip_ws(p);
            if self.char_at(q) == Some(open) {
                match self.balanced_end(q, open, close) {
                    Some(end) => p = end,
                    None => return self.unterminated(pos),
                }
            }
        }
        p - pos
    }

    /// `@header {..}`, `@lexer::members {..}`.
    fn named_action(&mut self, pos: usize) -> usize {
        let name_end = self.text[pos + 1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
            .map_or(self.text.len(), |i| pos + 1 + i);
        let open = self.skip_ws(name_end);
        if self.char_at(open) != Some('{') {
            return self.unrecognized(pos);
        }
        match self.balanced_end(open, '{', '}') {
            Some(end) => end - pos,
            None => self.unterminated(pos),
        }
    }

    fn rule_start(&self, pos: usize) -> Option<(PendingRule, usize)> {
        let mut p = pos;
        let mut is_fragment = false;
        loop {
            if self.keyword_at(p, "fragment") {
                is_fragment = true;
                p = self.skip_ws(p + "fragment".len());
            } else if let Some(m) = ACCESS_MODIFIERS.iter().find(|m| self.keyword_at(p, m)) {
                p = self.skip_ws(p + m.len());
            } else {
                break;
            }
        }

        let name = self.word_at(p);
        if !is_identifier(name) {
            return None;
        }

        let rule = PendingRule {
            name: name.to_string(),
            is_fragment,
            line: self.line_of(p),
            after_throws: false,
        };
        Some((rule, p + name.len() - pos))
    }

    fn unrecognized(&mut self, pos: usize) -> usize {
        let line = self.line_of(pos);
        let end = self.line_end(pos);
        let text = self.text[pos..end].trim();
        self.diagnostics
            .report(DiagnosticKind::UnrecognizedLine)
            .line(line)
            .message(format!("`{text}`"))
            .emit();
        (end - pos).max(1)
    }

    fn unterminated(&mut self, pos: usize) -> usize {
        let line = self.line_of(pos);
        self.diagnostics
            .report(DiagnosticKind::UnterminatedBlock)
            .line(line)
            .emit();
        self.text.len() - pos
    }

    // ------------------------------------------------------------------
    // PendingName
    // ------------------------------------------------------------------

    fn pending_name(&mut self, mut rule: PendingRule, pos: usize) -> (State, usize) {
        let Some(c) = self.char_at(pos) else {
            return (State::PendingName(rule), 1);
        };
        if c.is_whitespace() {
            if c == '\n' && self.line_of(pos + 1) - rule.line >= self.limits.max_rule_lines {
                self.missing_colon(&rule);
                return (State::Outside, 1);
            }
            return (State::PendingName(rule), c.len_utf8());
        }

        match c {
            ':' => (State::InsideRule(rule), 1),
            '[' | '{' => {
                let close = if c == '[' { ']' } else { '}' };
                match self.balanced_end(pos, c, close) {
                    Some(end) => (State::PendingName(rule), end - pos),
                    None => {
                        self.missing_colon(&rule);
                        (State::Outside, self.unterminated(pos))
                    }
                }
            }
            '@' => {
                let word = self.word_at(pos + 1).len();
                (State::PendingName(rule), 1 + word)
            }
            ',' if rule.after_throws => (State::PendingName(rule), 1),
            _ => {
                let word = self.word_at(pos).to_string();
                match word.as_str() {
                    "returns" | "locals" | "options" => {
                        rule.after_throws = false;
                        let len = word.len();
                        (State::PendingName(rule), len)
                    }
                    "throws" => {
                        rule.after_throws = true;
                        (State::PendingName(rule), word.len())
                    }
                    w if !w.is_empty() && rule.after_throws => {
                        let len = w.len();
                        (State::PendingName(rule), len)
                    }
                    _ => {
                        self.missing_colon(&rule);
                        // The rest of the name's line is part of the broken rule;
                        // a later line may open the next rule.
                        let consumed = if self.line_of(pos) == rule.line {
                            self.line_end(pos) - pos
                        } else {
                            usize::from(c == ';')
                        };
                        (State::Outside, consumed)
                    }
                }
            }
        }
    }

    fn missing_colon(&mut self, rule: &PendingRule) {
        self.diagnostics
            .report(DiagnosticKind::MissingColon)
            .line(rule.line)
            .rule(&rule.name)
            .message(&rule.name)
            .emit();
    }

    // ------------------------------------------------------------------
    // InsideRule
    // ------------------------------------------------------------------

    fn inside_rule(&mut self, rule: PendingRule, pos: usize) -> (State, usize) {
        let (end, terminator) = match self.find_body_end(pos, rule.line) {
            BodyEnd::Terminator(semi) => (semi + 1, Some(semi)),
            BodyEnd::NextRule(at) | BodyEnd::Capped(at) => (at, None),
            BodyEnd::Exhausted => (self.text.len(), None),
        };
        let body_end = terminator.unwrap_or(end);
        self.finish_rule(rule, pos, body_end, terminator);
        (State::Outside, (end - pos).max(1))
    }

    fn find_body_end(&self, from: usize, start_line: usize) -> BodyEnd {
        let mut line = self.line_of(from);
        let mut braces = 0usize;
        let mut quote: Option<char> = None;
        let mut in_class = false;
        let mut escaped = false;

        for (i, c) in self.text[from..].char_indices() {
            let at = from + i;
            if c == '\n' {
                line += 1;
                quote = None;
                in_class = false;
                escaped = false;
                if line - start_line >= self.limits.max_rule_lines {
                    return BodyEnd::Capped(at + 1);
                }
                if braces == 0 && self.looks_like_rule_start(at + 1) {
                    return BodyEnd::NextRule(at + 1);
                }
                continue;
            }
            if escaped {
                escaped = false;
                continue;
            }
            if let Some(q) = quote {
                match c {
                    '\\' => escaped = true,
                    _ if c == q => quote = None,
                    _ => {}
                }
                continue;
            }
            if in_class {
                match c {
                    '\\' => escaped = true,
                    ']' => in_class = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '\'' => quote = Some(c),
                '"' if braces > 0 => quote = Some(c),
                '[' if braces == 0 => in_class = true,
                '{' => braces += 1,
                '}' => braces = braces.saturating_sub(1),
                ';' if braces == 0 => return BodyEnd::Terminator(at),
                _ => {}
            }
        }

        BodyEnd::Exhausted
    }

    /// Column-0 `name :`, `fragment name`, or `mode NAME;`.
    fn looks_like_rule_start(&self, pos: usize) -> bool {
        if self.keyword_at(pos, "fragment") {
            return true;
        }
        if self.keyword_at(pos, "mode") {
            let p = self.skip_inline_ws(pos + "mode".len());
            let name = self.word_at(p);
            let q = self.skip_inline_ws(p + name.len());
            return !name.is_empty() && self.char_at(q) == Some(';');
        }
        let name = self.word_at(pos);
        if !is_identifier(name) {
            return false;
        }
        let p = self.skip_inline_ws(pos + name.len());
        self.char_at(p) == Some(':') && self.char_at(p + 1) != Some(':')
    }

    fn finish_rule(
        &mut self,
        rule: PendingRule,
        body_start: usize,
        body_end: usize,
        terminator: Option<usize>,
    ) {
        let raw = &self.text[body_start..body_end];
        let definition = raw
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        let lead = raw.len() - raw.trim_start().len();
        let body_line = if definition.is_empty() {
            self.line_of(body_start.saturating_sub(1))
        } else {
            self.line_of(body_start + lead)
        };
        let end_line = match terminator {
            Some(semi) => self.line_of(semi),
            None if definition.is_empty() => body_line,
            None => self.line_of(body_start + raw.trim_end().len() - 1),
        };

        if terminator.is_none() {
            self.diagnostics
                .report(DiagnosticKind::MissingTerminator)
                .line(rule.line)
                .rule(&rule.name)
                .message(&rule.name)
                .emit();
        }

        if let Some(first) = self.grammar.rule(&rule.name) {
            let first_line = first.line_number;
            self.diagnostics
                .report(DiagnosticKind::DuplicateRule)
                .line(rule.line)
                .rule(&rule.name)
                .message(&rule.name)
                .related_to("first defined here", first_line)
                .emit();
            return;
        }

        let mode = if is_lexer_name(&rule.name) {
            if !rule.is_fragment
                && let Some(m) = self.grammar.modes.iter_mut().find(|m| m.name == self.mode)
            {
                m.rules.insert(rule.name.clone());
            }
            Some(self.mode.clone())
        } else {
            None
        };

        self.grammar.rules.push(Rule {
            referenced_rules: extract_references(&definition),
            name: rule.name,
            is_fragment: rule.is_fragment,
            definition,
            line_number: rule.line,
            body_line,
            end_line,
            mode,
        });
    }

    // ------------------------------------------------------------------
    // Text helpers
    // ------------------------------------------------------------------

    /// 1-based line of a byte offset.
    fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&s| s <= offset).max(1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map_or(self.text.len(), |i| pos + i)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|s| s.chars().next())
    }

    fn word_at(&self, pos: usize) -> &str {
        let Some(rest) = self.text.get(pos..) else {
            return "";
        };
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn keyword_at(&self, pos: usize, keyword: &str) -> bool {
        self.word_at(pos) == keyword
    }

    fn skip_ws(&self, pos: usize) -> usize {
        self.text[pos.min(self.text.len())..]
            .find(|c: char| !c.is_whitespace())
            .map_or(self.text.len(), |i| pos + i)
    }

    fn skip_inline_ws(&self, pos: usize) -> usize {
        self.text[pos.min(self.text.len())..]
            .find(|c: char| c != ' ' && c != '\t')
            .map_or(self.text.len(), |i| pos + i)
    }

    /// Offset just past the `;` ending a one-line statement, or the line end.
    fn statement_end(&self, pos: usize) -> usize {
        let end = self.line_end(pos);
        self.text[pos..end].find(';').map_or(end, |i| pos + i + 1)
    }

    /// Offset just past the delimiter closing the one at `open`.
    fn balanced_end(&self, open: usize, open_c: char, close_c: char) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (i, c) in self.text[open..].char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q || c == '\n' {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' => quote = Some(c),
                _ if c == open_c => depth += 1,
                _ if c == close_c => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + i + c.len_utf8());
                    }
                }
                _ => {}
            }
        }
        None
    }
}

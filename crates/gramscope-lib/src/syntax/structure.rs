//! Rule bodies parsed into alternatives and elements.
//!
//! Labels (`x=`, `x+=`), embedded actions, predicates and element options
//! (`<assoc=right>`) do not consume input and are dropped. Alternative
//! labels (`# Name`) and lexer commands (`-> skip`) are kept on the
//! alternative that carries them.

use std::fmt;

use gramscope_core::utils::unescape_literal;
use gramscope_core::{EOF, is_lexer_name};

use super::commands::{LexerCommand, parse_commands};
use super::{SyntaxKind, Token, lex_significant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    #[default]
    None,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Modifier {
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    pub fn is_repeating(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementContent {
    /// Lexer rule or declared token: `ID`
    Token(String),
    /// Parser rule: `expr`
    Rule(String),
    /// Quoted literal, quotes included: `'+'`
    Literal(String),
    /// Character class, brackets included: `[a-z]`
    CharSet(String),
    /// Literal range, quotes included: `'a'..'z'`
    Range(String, String),
    /// Parenthesized sub-alternatives
    Group(Vec<Alternative>),
    /// `.`
    Wildcard,
    /// `~X`
    Negated(Box<ElementContent>),
    /// `EOF`
    Eof,
}

impl ElementContent {
    /// Rule or token name for references, `None` for everything else.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Token(n) | Self::Rule(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub content: ElementContent,
    pub modifier: Modifier,
    /// `false` for `*?`, `+?` and `??`.
    pub greedy: bool,
}

impl Element {
    pub fn new(content: ElementContent) -> Self {
        Self {
            content,
            modifier: Modifier::None,
            greedy: true,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.modifier.is_optional()
    }

    pub fn is_repeating(&self) -> bool {
        self.modifier.is_repeating()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alternative {
    pub elements: Vec<Element>,
    /// `# Label` naming this alternative.
    pub label: Option<String>,
    pub commands: Vec<LexerCommand>,
    /// Byte offset of the alternative's first token within the rule body.
    pub offset: usize,
}

impl Alternative {
    /// Element texts, used to compare alternatives after normalization.
    pub fn normalized(&self) -> Vec<String> {
        self.elements.iter().map(ToString::to_string).collect()
    }

    /// Rule and token names that can appear first in this alternative.
    ///
    /// Descends into a leading group, taking the first element of each of
    /// its alternatives.
    pub fn first_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(first) = self.elements.first() {
            collect_first(&first.content, &mut out);
        }
        out
    }
}

fn collect_first<'a>(content: &'a ElementContent, out: &mut Vec<&'a str>) {
    match content {
        ElementContent::Token(n) | ElementContent::Rule(n) => out.push(n),
        ElementContent::Group(alts) => {
            for alt in alts {
                if let Some(first) = alt.elements.first() {
                    collect_first(&first.content, out);
                }
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleStructure {
    pub alternatives: Vec<Alternative>,
}

impl RuleStructure {
    pub fn parse(definition: &str) -> Self {
        let tokens = lex_significant(definition);
        let mut parser = StructureParser {
            tokens: &tokens,
            pos: 0,
        };
        let mut alternatives = parser.alternatives();
        // Stray `)` ends the loop early; keep parsing what follows.
        while !parser.at_end() {
            parser.bump();
            alternatives.extend(parser.alternatives());
        }
        Self { alternatives }
    }

    /// Text of a body that is exactly one unquantified literal, like `'if'`.
    pub fn sole_literal(&self) -> Option<String> {
        let [alt] = self.alternatives.as_slice() else {
            return None;
        };
        let [element] = alt.elements.as_slice() else {
            return None;
        };
        match &element.content {
            ElementContent::Literal(quoted) if element.modifier == Modifier::None => {
                let value = unescape_literal(quoted);
                (!value.is_empty()).then_some(value)
            }
            _ => None,
        }
    }
}

struct StructureParser<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'t, 's> StructureParser<'t, 's> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<SyntaxKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'s>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map(|t| t.offset)
            .unwrap_or(0)
    }

    fn alternatives(&mut self) -> Vec<Alternative> {
        let mut alts = vec![self.alternative()];
        while self.peek() == Some(SyntaxKind::Pipe) {
            self.bump();
            alts.push(self.alternative());
        }
        alts
    }

    fn alternative(&mut self) -> Alternative {
        let mut alt = Alternative {
            offset: self.offset(),
            ..Alternative::default()
        };

        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::Pipe | SyntaxKind::ParenClose => break,
                SyntaxKind::Hash => {
                    self.bump();
                    if self.peek() == Some(SyntaxKind::Ident) {
                        alt.label = self.bump().map(|t| t.text.to_string());
                    }
                }
                SyntaxKind::Arrow => {
                    self.bump();
                    let (commands, used) = parse_commands(&self.tokens[self.pos..]);
                    alt.commands.extend(commands);
                    self.pos += used;
                }
                SyntaxKind::Action => {
                    self.bump();
                    if self.peek() == Some(SyntaxKind::Question) {
                        self.bump();
                    }
                }
                SyntaxKind::Lt => self.skip_options(),
                SyntaxKind::Ident
                    if matches!(
                        self.peek_nth(1),
                        Some(SyntaxKind::Equals | SyntaxKind::PlusEquals)
                    ) =>
                {
                    self.bump();
                    self.bump();
                }
                _ => {
                    if let Some(element) = self.element() {
                        alt.elements.push(element);
                    }
                }
            }
        }

        alt
    }

    fn skip_options(&mut self) {
        while let Some(token) = self.bump() {
            if token.is(SyntaxKind::Gt) {
                break;
            }
        }
    }

    fn element(&mut self) -> Option<Element> {
        let content = self.atom()?;
        let mut element = Element::new(content);

        if self.peek() == Some(SyntaxKind::Lt) {
            self.skip_options();
        }

        if let Some(kind) = self.peek() {
            let (modifier, greedy) = match kind {
                SyntaxKind::Question => (Modifier::Optional, true),
                SyntaxKind::Star => (Modifier::ZeroOrMore, true),
                SyntaxKind::Plus => (Modifier::OneOrMore, true),
                SyntaxKind::QuestionQuestion => (Modifier::Optional, false),
                SyntaxKind::StarQuestion => (Modifier::ZeroOrMore, false),
                SyntaxKind::PlusQuestion => (Modifier::OneOrMore, false),
                _ => return Some(element),
            };
            self.bump();
            element.modifier = modifier;
            element.greedy = greedy;
        }

        Some(element)
    }

    fn atom(&mut self) -> Option<ElementContent> {
        let token = self.bump()?;
        match token.kind {
            SyntaxKind::Ident if token.text == EOF => Some(ElementContent::Eof),
            SyntaxKind::Ident if is_lexer_name(token.text) => {
                Some(ElementContent::Token(token.text.to_string()))
            }
            SyntaxKind::Ident => Some(ElementContent::Rule(token.text.to_string())),
            SyntaxKind::StringLiteral => {
                if self.peek() == Some(SyntaxKind::Range)
                    && self.peek_nth(1) == Some(SyntaxKind::StringLiteral)
                {
                    self.bump();
                    let end = self.bump()?;
                    return Some(ElementContent::Range(
                        token.text.to_string(),
                        end.text.to_string(),
                    ));
                }
                Some(ElementContent::Literal(token.text.to_string()))
            }
            SyntaxKind::CharClass => Some(ElementContent::CharSet(token.text.to_string())),
            SyntaxKind::Dot => Some(ElementContent::Wildcard),
            SyntaxKind::Tilde => {
                if matches!(
                    self.peek(),
                    None | Some(SyntaxKind::Pipe | SyntaxKind::ParenClose)
                ) {
                    return None;
                }
                let inner = self.atom()?;
                Some(ElementContent::Negated(Box::new(inner)))
            }
            SyntaxKind::ParenOpen => {
                let alts = self.alternatives();
                if self.peek() == Some(SyntaxKind::ParenClose) {
                    self.bump();
                }
                Some(ElementContent::Group(alts))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ElementContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(n) | Self::Rule(n) | Self::Literal(n) | Self::CharSet(n) => {
                write!(f, "{n}")
            }
            Self::Range(a, b) => write!(f, "{a}..{b}"),
            Self::Group(alts) => {
                write!(f, "(")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    if !alt.elements.is_empty() {
                        write!(f, " {alt}")?;
                    }
                }
                write!(f, " )")
            }
            Self::Wildcard => write!(f, "."),
            Self::Negated(inner) => write!(f, "~{inner}"),
            Self::Eof => write!(f, "{EOF}"),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.content, self.modifier.symbol())?;
        if !self.greedy {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RuleStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alt) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{alt}")?;
        }
        Ok(())
    }
}

use crate::error::LexError;
use crate::token::{Kind, Token};
use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

/// Characters shown on each side of a lexing failure.
const CONTEXT_LENGTH: usize = 20;

/// Lexing rules in priority order. The first rule that matches at the
/// cursor wins, so free text shadows the whitespace and newline rules
/// wherever both could apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Keyword,
    Label,
    InventoryToken,
    DialogueId,
    Str,
    FreeText,
    Newline,
    Whitespace,
}

impl Rule {
    const PRIORITY: [Rule; 8] = [
        Rule::Keyword,
        Rule::Label,
        Rule::InventoryToken,
        Rule::DialogueId,
        Rule::Str,
        Rule::FreeText,
        Rule::Newline,
        Rule::Whitespace,
    ];
}

struct Patterns {
    keyword: Regex,
    label: Regex,
    inventory_token: Regex,
    dialogue_id: Regex,
    string: Regex,
    word: Regex,
    dialogue_line: Regex,
    newline: Regex,
    whitespace: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    keyword: pattern(r"^(?:SCENE|ACTOR|IF|GOTO|END|GIVE|TAKE)\b"),
    label: pattern(r"^@[A-Za-z_][A-Za-z0-9_]*"),
    inventory_token: pattern(r"^T[0-9]+\b"),
    dialogue_id: pattern(r"^[0-9]+:"),
    string: pattern(r#"^"[^"\n]*""#),
    word: pattern(r"^[^:\s]+"),
    dialogue_line: pattern(r"^[^:\n]+"),
    newline: pattern(r"^\n"),
    whitespace: pattern(r"^[^\S\n]+"),
});

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("lexer patterns are valid")
}

pub struct Lexer<'a> {
    source_code: &'a str,
    line: usize,
    current: usize,
    line_start: usize,
    in_dialogue: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            source_code: input,
            line: 1,
            current: 0,
            line_start: 0,
            in_dialogue: false,
        }
    }

    fn is_eof(&self) -> bool {
        self.current >= self.source_code.len()
    }

    fn create_token(&self, kind: Kind, value: &str) -> Token {
        trace!("line {}: {} {:?}", self.line, kind, value);
        Token {
            kind,
            value: value.to_string(),
            line: self.line,
            column: value.chars().count() + 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.is_eof() {
            let rest = &self.source_code[self.current..];
            let Some((rule, text)) = self.next_match(rest) else {
                return Err(self.error_at_cursor(rest));
            };

            match rule {
                Rule::Newline => {
                    self.line += 1;
                    self.line_start = self.current + text.len();
                    self.in_dialogue = false;
                }
                Rule::Whitespace => {}
                Rule::Keyword => {
                    let kind = Kind::keyword(text).unwrap_or(Kind::DialogueText);
                    tokens.push(self.create_token(kind, text));
                }
                Rule::Label => tokens.push(self.create_token(Kind::Label, text)),
                Rule::InventoryToken => tokens.push(self.create_token(Kind::Token, text)),
                Rule::DialogueId => {
                    tokens.push(self.create_token(Kind::DialogueId, text));
                    self.in_dialogue = true;
                }
                Rule::Str => tokens.push(self.create_token(Kind::String, text)),
                Rule::FreeText => {
                    // Dialogue bodies run to the end of the line and may carry
                    // surrounding blanks; bare words never do.
                    let body = text.trim();
                    if !body.is_empty() {
                        let mut token = self.create_token(Kind::DialogueText, body);
                        token.column = text.chars().count() + 1;
                        tokens.push(token);
                    }
                }
            }

            self.current += text.len();
        }

        debug!("tokenized {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }

    fn next_match<'s>(&self, rest: &'s str) -> Option<(Rule, &'s str)> {
        Rule::PRIORITY.iter().find_map(|&rule| {
            self.pattern(rule)
                .find(rest)
                .map(|found| (rule, found.as_str()))
        })
    }

    fn pattern(&self, rule: Rule) -> &'static Regex {
        let patterns = &*PATTERNS;
        match rule {
            Rule::Keyword => &patterns.keyword,
            Rule::Label => &patterns.label,
            Rule::InventoryToken => &patterns.inventory_token,
            Rule::DialogueId => &patterns.dialogue_id,
            Rule::Str => &patterns.string,
            Rule::FreeText if self.in_dialogue => &patterns.dialogue_line,
            Rule::FreeText => &patterns.word,
            Rule::Newline => &patterns.newline,
            Rule::Whitespace => &patterns.whitespace,
        }
    }

    fn error_at_cursor(&self, rest: &str) -> LexError {
        LexError {
            character: rest.chars().next().unwrap_or('\0'),
            line: self.line,
            column: self.source_code[self.line_start..self.current].chars().count() + 1,
            context: self.context(self.current),
        }
    }

    fn context(&self, position: usize) -> String {
        let before: Vec<char> = self.source_code[..position]
            .chars()
            .rev()
            .take(CONTEXT_LENGTH)
            .collect();
        let after = self.source_code[position..].chars().take(CONTEXT_LENGTH);
        before.into_iter().rev().chain(after).collect()
    }
}

use crate::token::Token;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IOError: {0}")]
    Io(#[from] io::Error),
    #[error("FileNotFoundError: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("ConfigError: {0}")]
    Config(String),
    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raised when the lexer reaches a character no rule accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "LexError: Unexpected character {character:?} at line {line}, column {column}\n\
     Context: \"{context}\""
)]
pub struct LexError {
    pub character: char,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ParseError: {message}: {value} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn from_token(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: token.value.clone(),
            line: token.line,
            column: token.column,
        }
    }
}

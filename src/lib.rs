//! QuestScript: a small line-oriented language for scripting narrative scenes.
//!
//! A script is lexed into [`Token`]s, parsed into a [`Program`] of scenes,
//! and run by an [`Interpreter`] that tracks an inventory of string tokens
//! and writes one line per visible effect.
//!
//! ```text
//! SCENE 1
//!   ACTOR 1 Hero base idle 0 0
//!   GIVE TKey
//!   IF TKey SCENE 2
//! END
//! SCENE 2
//!   1: "Hello"
//! END
//! ```

pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod preprocess;
pub mod token;

pub use config::Config;
pub use error::{LexError, ParseError, ScriptError};
pub use interpreter::{Halt, Interpreter};
pub use lexer::Lexer;
pub use parser::{Command, Parser, Program, Scene, Target};
pub use preprocess::preprocess;
pub use token::{Kind, Token};

use log::info;
use std::fs;
use std::io;
use std::path::Path;

/// Reads a script file, reporting a missing file separately from other I/O failures.
pub fn read_script(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScriptError::FileNotFound(path.to_path_buf()),
        _ => ScriptError::Io(e),
    })
}

/// Preprocesses and tokenizes raw script text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    let processed = preprocess(source);
    Ok(Lexer::new(&processed).tokenize()?)
}

/// Runs the preprocess, lex and parse stages over raw script text.
pub fn load(source: &str) -> Result<Program, ScriptError> {
    let tokens = tokenize(source)?;
    let program = Parser::new(tokens).parse()?;
    info!("loaded {} scenes", program.len());
    Ok(program)
}

pub fn load_file(path: &Path) -> Result<Program, ScriptError> {
    let source = read_script(path)?;
    info!("loading {}", path.display());
    load(&source)
}

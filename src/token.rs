use serde::Serialize;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Token {
    pub kind: Kind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    // Keywords
    Scene,      // SCENE
    Actor,      // ACTOR
    If,         // IF
    Goto,       // GOTO
    End,        // END
    Give,       // GIVE
    Take,       // TAKE

    // Identifiers and literals
    Label,        // @name
    Token,        // T123
    DialogueId,   // 12:
    String,       // "quoted"
    DialogueText, // free text, dialogue body or bare argument
}

impl Kind {
    pub fn keyword(word: &str) -> Option<Kind> {
        match word {
            "SCENE" => Some(Kind::Scene),
            "ACTOR" => Some(Kind::Actor),
            "IF" => Some(Kind::If),
            "GOTO" => Some(Kind::Goto),
            "END" => Some(Kind::End),
            "GIVE" => Some(Kind::Give),
            "TAKE" => Some(Kind::Take),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Kind::Scene => "SCENE",
            Kind::Actor => "ACTOR",
            Kind::If => "IF",
            Kind::Goto => "GOTO",
            Kind::End => "END",
            Kind::Give => "GIVE",
            Kind::Take => "TAKE",
            Kind::Label => "LABEL",
            Kind::Token => "TOKEN",
            Kind::DialogueId => "DIALOGUE_ID",
            Kind::String => "STRING",
            Kind::DialogueText => "DIALOGUE_TEXT",
        };
        write!(f, "{}", name)
    }
}

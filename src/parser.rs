use crate::error::ParseError;
use crate::token::{Kind, Token};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where a GOTO or a taken IF sends execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A label in the current scene, stored without its `@` sigil.
    Label(String),
    /// Another scene, written `SCENE n`.
    Scene(i32),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Label(name) => write!(f, "{}", name),
            Target::Scene(id) => write!(f, "SCENE {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Actor {
        id: String,
        name: String,
        skin: String,
        pose: String,
        x: String,
        y: String,
    },
    If {
        condition: String,
        target: Target,
    },
    Goto {
        target: Target,
    },
    Give {
        token: String,
    },
    Take {
        token: String,
    },
    Dialogue {
        actor: String,
        text: String,
    },
    Label {
        name: String,
    },
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Actor { .. } => "ACTOR",
            Command::If { .. } => "IF",
            Command::Goto { .. } => "GOTO",
            Command::Give { .. } => "GIVE",
            Command::Take { .. } => "TAKE",
            Command::Dialogue { .. } => "DIALOGUE",
            Command::Label { .. } => "LABEL",
        }
    }

    /// The command's arguments in source order, as plain strings.
    pub fn args(&self) -> Vec<String> {
        match self {
            Command::Actor { id, name, skin, pose, x, y } => {
                vec![id.clone(), name.clone(), skin.clone(), pose.clone(), x.clone(), y.clone()]
            }
            Command::If { condition, target } => vec![condition.clone(), target.to_string()],
            Command::Goto { target } => vec![target.to_string()],
            Command::Give { token } | Command::Take { token } => vec![token.clone()],
            Command::Dialogue { actor, text } => vec![actor.clone(), text.clone()],
            Command::Label { name } => vec![name.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub scene_id: i32,
    pub commands: Vec<Command>,
}

impl Scene {
    /// Index of the LABEL command named `name`, if the scene has one.
    pub fn find_label(&self, name: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|command| matches!(command, Command::Label { name: label } if label == name))
    }
}

/// Parsed scenes keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Program {
    scenes: BTreeMap<i32, Scene>,
}

impl Program {
    /// Adds a scene, handing back any scene it replaced.
    pub fn insert(&mut self, scene: Scene) -> Option<Scene> {
        self.scenes.insert(scene.scene_id, scene)
    }

    pub fn get(&self, scene_id: i32) -> Option<&Scene> {
        self.scenes.get(&scene_id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }
}

fn label_name(text: &str) -> String {
    text.strip_prefix('@').unwrap_or(text).to_string()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    fn at(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Error for input that ran out mid-construct, pinned to the last token.
    fn end_of_input(&self, message: String) -> ParseError {
        match self.tokens.last() {
            Some(token) => ParseError::from_token(token, message),
            None => ParseError {
                message,
                value: String::new(),
                line: 0,
                column: 0,
            },
        }
    }

    fn expect_token(&mut self, after: &Token) -> Result<Token, ParseError> {
        self.next_token().ok_or_else(|| {
            self.end_of_input(format!("Unexpected end of script after {}", after.kind))
        })
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        while let Some(token) = self.next_token() {
            if token.kind != Kind::Scene {
                debug!("skipping {} {:?} outside of a scene", token.kind, token.value);
                continue;
            }

            let scene = self.parse_scene(&token)?;
            let scene_id = scene.scene_id;
            if program.insert(scene).is_some() {
                warn!("scene {} is defined more than once; keeping the last definition", scene_id);
            }
        }

        debug!("parsed {} scenes", program.len());
        Ok(program)
    }

    fn parse_scene(&mut self, keyword: &Token) -> Result<Scene, ParseError> {
        let id_token = self.expect_token(keyword)?;
        let scene_id = id_token
            .value
            .parse::<i32>()
            .map_err(|_| ParseError::from_token(&id_token, "Invalid scene id"))?;

        let mut commands = Vec::new();
        loop {
            match self.at().map(|token| token.kind) {
                None => {
                    return Err(self.end_of_input(format!("Missing END for scene {}", scene_id)));
                }
                Some(Kind::End) => {
                    self.position += 1;
                    break;
                }
                Some(_) => commands.push(self.parse_command()?),
            }
        }

        debug!("scene {}: {} commands", scene_id, commands.len());
        Ok(Scene { scene_id, commands })
    }

    fn parse_command(&mut self) -> Result<Command, ParseError> {
        let token = self
            .next_token()
            .ok_or_else(|| self.end_of_input("Expected a command".to_string()))?;

        match token.kind {
            Kind::Actor => self.parse_actor(&token),
            Kind::If => {
                let condition = self.expect_token(&token)?.value;
                let target = self.parse_target(&token)?;
                Ok(Command::If { condition, target })
            }
            Kind::Goto => {
                let target = self.parse_target(&token)?;
                Ok(Command::Goto { target })
            }
            Kind::Give => {
                let item = self.expect_token(&token)?.value;
                Ok(Command::Give { token: item })
            }
            Kind::Take => {
                let item = self.expect_token(&token)?.value;
                Ok(Command::Take { token: item })
            }
            Kind::DialogueId => self.parse_dialogue(&token),
            Kind::Label => Ok(Command::Label {
                name: label_name(&token.value),
            }),
            _ => Err(ParseError::from_token(&token, "Unexpected token")),
        }
    }

    fn parse_actor(&mut self, keyword: &Token) -> Result<Command, ParseError> {
        let id = self.expect_token(keyword)?.value;
        let name = self.expect_token(keyword)?.value;
        let skin = self.expect_token(keyword)?.value;
        let pose = self.expect_token(keyword)?.value;
        let x = self.expect_token(keyword)?.value;
        let y = self.expect_token(keyword)?.value;
        Ok(Command::Actor { id, name, skin, pose, x, y })
    }

    fn parse_target(&mut self, keyword: &Token) -> Result<Target, ParseError> {
        let token = self.expect_token(keyword)?;
        if token.kind != Kind::Scene {
            return Ok(Target::Label(label_name(&token.value)));
        }

        let id_token = self.expect_token(&token)?;
        id_token
            .value
            .parse::<i32>()
            .map(Target::Scene)
            .map_err(|_| ParseError::from_token(&id_token, "Invalid scene id"))
    }

    fn parse_dialogue(&mut self, id_token: &Token) -> Result<Command, ParseError> {
        let text = match self.at() {
            Some(next) if next.kind == Kind::DialogueText && next.line == id_token.line => {
                next.value.clone()
            }
            _ => return Err(ParseError::from_token(id_token, "Unexpected token")),
        };
        self.position += 1;

        let actor = id_token.value.trim_end_matches(':').to_string();
        Ok(Command::Dialogue { actor, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse()
    }

    fn commands(source: &str) -> Vec<Command> {
        let program = parse(source).unwrap();
        let commands = program.scenes().next().unwrap().commands.clone();
        commands
    }

    #[test]
    fn parses_every_command_kind() {
        let parsed = commands(
            "SCENE 1\nACTOR 1 Hero base idle 10 20\n1: Hi there\nGIVE TKey\nTAKE T5\n\
             @top\nIF TKey top\nGOTO SCENE 4\nEND\n",
        );
        assert_eq!(
            parsed,
            vec![
                Command::Actor {
                    id: "1".into(),
                    name: "Hero".into(),
                    skin: "base".into(),
                    pose: "idle".into(),
                    x: "10".into(),
                    y: "20".into(),
                },
                Command::Dialogue {
                    actor: "1".into(),
                    text: "Hi there".into(),
                },
                Command::Give { token: "TKey".into() },
                Command::Take { token: "T5".into() },
                Command::Label { name: "top".into() },
                Command::If {
                    condition: "TKey".into(),
                    target: Target::Label("top".into()),
                },
                Command::Goto { target: Target::Scene(4) },
            ]
        );
    }

    #[test]
    fn argument_arity_matches_kind() {
        let parsed = commands(
            "SCENE 1\nACTOR 1 A b c 0 0\n2: x\nGIVE T1\nTAKE T1\n@l\nIF T1 SCENE 2\nGOTO l\nEND",
        );
        let arities: Vec<(&str, usize)> = parsed
            .iter()
            .map(|c| (c.keyword(), c.args().len()))
            .collect();
        assert_eq!(
            arities,
            vec![
                ("ACTOR", 6),
                ("DIALOGUE", 2),
                ("GIVE", 1),
                ("TAKE", 1),
                ("LABEL", 1),
                ("IF", 2),
                ("GOTO", 1),
            ]
        );
        assert_eq!(parsed[5].args(), vec!["T1".to_string(), "SCENE 2".to_string()]);
    }

    #[test]
    fn skips_tokens_between_scenes() {
        let program = parse("GIVE T1\nSCENE 2\nEND\nstray words\nSCENE 3\nGOTO x\nEND").unwrap();
        let ids: Vec<i32> = program.scenes().map(|scene| scene.scene_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(program.get(2).unwrap().commands.is_empty());
    }

    #[test]
    fn duplicate_scene_ids_keep_the_last() {
        let program = parse("SCENE 1\nGIVE TA\nEND\nSCENE 1\nGIVE TB\nEND").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(
            program.get(1).unwrap().commands,
            vec![Command::Give { token: "TB".into() }]
        );
    }

    #[test]
    fn goto_accepts_label_with_sigil() {
        let parsed = commands("SCENE 1\nGOTO @loop\nEND");
        assert_eq!(parsed, vec![Command::Goto { target: Target::Label("loop".into()) }]);
    }

    #[test]
    fn missing_end_points_at_last_token() {
        let err = parse("SCENE 1\nGIVE TKey\nTAKE TKey").unwrap_err();
        assert_eq!(err.value, "TKey");
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 5);
        assert!(err.message.contains("Missing END"));
    }

    #[test]
    fn non_numeric_scene_id() {
        let err = parse("SCENE intro\nEND").unwrap_err();
        assert_eq!(err.message, "Invalid scene id");
        assert_eq!(err.value, "intro");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn non_numeric_goto_scene() {
        let err = parse("SCENE 1\nGOTO SCENE next\nEND").unwrap_err();
        assert_eq!(err.message, "Invalid scene id");
        assert_eq!(err.value, "next");
    }

    #[test]
    fn short_actor_runs_out_of_tokens() {
        let err = parse("SCENE 1\nACTOR 1 Hero").unwrap_err();
        assert!(err.message.contains("after ACTOR"));
        assert_eq!(err.value, "Hero");
    }

    #[test]
    fn unexpected_leading_token() {
        let err = parse("SCENE 1\nwander\nEND").unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        assert_eq!(err.value, "wander");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn dialogue_id_needs_text_on_same_line() {
        let err = parse("SCENE 1\n4:\nhello\nEND").unwrap_err();
        assert_eq!(err.value, "4:");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn script_without_scenes_is_empty() {
        let program = parse("1: nobody listens\nGIVE T1\n").unwrap();
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
    }

    #[test]
    fn scene_without_id() {
        let err = parse("SCENE").unwrap_err();
        assert!(err.message.contains("after SCENE"));
    }

    #[test]
    fn parsing_is_deterministic() {
        let source = "SCENE 2\n1: a\nEND\nSCENE 1\nGOTO SCENE 2\nEND";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }

    #[test]
    fn find_label_scans_whole_scene() {
        let program = parse("SCENE 1\nGIVE T1\n@a\nTAKE T1\n@b\nEND").unwrap();
        let scene = program.get(1).unwrap();
        assert_eq!(scene.find_label("a"), Some(1));
        assert_eq!(scene.find_label("b"), Some(3));
        assert_eq!(scene.find_label("c"), None);
    }
}

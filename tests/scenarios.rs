use questscript::{Config, Halt, Interpreter, ScriptError};
use std::fs;

fn run(source: &str, scene: i32, limit: Option<usize>) -> (Halt, Vec<String>) {
    let program = questscript::load(source).unwrap();
    let mut interpreter = Interpreter::new(program, Vec::new());
    if let Some(limit) = limit {
        interpreter = interpreter.with_step_limit(limit);
    }
    let halt = interpreter.run(scene);
    let output = String::from_utf8(interpreter.into_output()).unwrap();
    (halt, output.lines().map(str::to_string).collect())
}

#[test]
fn key_opens_the_second_scene() {
    let source = "SCENE 1\nACTOR 1 Hero base idle 0 0\nGIVE TKey\nIF TKey SCENE 2\nEND\n\
                  SCENE 2\n1: \"Hello\"\nEND";
    let (halt, lines) = run(source, 1, None);
    assert_eq!(halt, Halt::FellThrough(2));
    assert_eq!(
        lines,
        vec![
            "Actor 1 (Hero) at (0, 0)",
            "Gave TKey",
            "Switching to Scene 2",
            "Actor 1: \"Hello\"",
        ]
    );
}

#[test]
fn endless_loop_repeats_identically() {
    let source = "SCENE 1\n@loop\nTAKE TMissing\nGOTO loop\nEND";
    let program = questscript::load(source).unwrap();
    assert_eq!(program.get(1).unwrap().find_label("loop"), Some(0));

    let mut interpreter = Interpreter::new(program, Vec::new()).with_step_limit(30);
    assert_eq!(interpreter.run(1), Halt::StepLimit(1));
    // Three commands per pass: the label, TAKE, and GOTO back to index 0.
    assert_eq!(interpreter.steps(), 30);
    assert!(interpreter.inventory().is_empty());

    let output = String::from_utf8(interpreter.into_output()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|line| *line == "Took TMissing"));
}

#[test]
fn missing_end_is_a_parse_error() {
    let err = questscript::load("SCENE 1\nACTOR 1 Hero base idle 0 0\nGIVE TKey\n").unwrap_err();
    match err {
        ScriptError::Parse(err) => {
            assert_eq!(err.value, "TKey");
            assert_eq!(err.line, 3);
            assert_eq!(err.column, 5);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = "; The opening\n\nSCENE 1\n; a note: with a colon\n1: Welcome\n\nEND\n";
    let (halt, lines) = run(source, 1, None);
    assert_eq!(halt, Halt::FellThrough(1));
    assert_eq!(lines, vec!["Actor 1: Welcome"]);
}

#[test]
fn stray_colon_is_a_lex_error() {
    let err = questscript::load("SCENE 1\nHero: hello\nEND").unwrap_err();
    assert!(matches!(err, ScriptError::Lex(ref lex) if lex.line == 2 && lex.character == ':'));
    assert!(err.to_string().starts_with("LexError"));
}

#[test]
fn unknown_start_scene_halts() {
    let (halt, lines) = run("SCENE 1\nEND", 2, None);
    assert_eq!(halt, Halt::SceneNotFound(2));
    assert_eq!(lines, vec!["Scene 2 not found."]);
}

#[test]
fn same_script_same_program() {
    let source = "SCENE 3\n@a\n2: hi\nGOTO a\nEND\nSCENE 1\nGOTO SCENE 3\nEND";
    assert_eq!(questscript::load(source).unwrap(), questscript::load(source).unwrap());
}

#[test]
fn load_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Quest.txt");
    fs::write(&path, "SCENE 1\nGIVE T1\nEND\n").unwrap();

    let program = questscript::load_file(&path).unwrap();
    assert_eq!(program.len(), 1);
}

#[test]
fn missing_script_file_is_reported_separately() {
    let dir = tempfile::tempdir().unwrap();
    let err = questscript::load_file(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, ScriptError::FileNotFound(_)));
}

#[test]
fn config_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        start_scene: 7,
        max_steps: Some(100),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn malformed_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Config::load_from(&path), Err(ScriptError::Config(_))));
}

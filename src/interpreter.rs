use crate::parser::{Command, Program, Scene, Target};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Why a run stopped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The requested scene does not exist.
    SceneNotFound(i32),
    /// The scene ran past its last command without switching scenes.
    FellThrough(i32),
    /// The configured step limit was reached while in this scene.
    StepLimit(i32),
}

enum Flow {
    Next,
    Jump(usize),
    SwitchScene(i32),
}

enum SceneExit {
    Switch(i32),
    FellThrough,
    StepLimit,
}

/// Mutable state of a run, kept apart from the program so a scene can be
/// borrowed while commands mutate the inventory.
struct Runtime<W: Write> {
    inventory: BTreeSet<String>,
    output: W,
    steps: usize,
    step_limit: Option<usize>,
}

impl<W: Write> Runtime<W> {
    fn emit(&mut self, line: String) {
        debug!("{}", line);
        if let Err(err) = writeln!(self.output, "{}", line) {
            warn!("failed to write output line {:?}: {}", line, err);
        }
    }

    fn limit_reached(&self) -> bool {
        self.step_limit.is_some_and(|limit| self.steps >= limit)
    }

    fn run_scene(&mut self, scene: &Scene) -> SceneExit {
        let mut position = 0;

        while let Some(command) = scene.commands.get(position) {
            if self.limit_reached() {
                return SceneExit::StepLimit;
            }
            self.steps += 1;

            match self.execute(command, scene) {
                Flow::Next => position += 1,
                Flow::Jump(index) => position = index,
                Flow::SwitchScene(scene_id) => return SceneExit::Switch(scene_id),
            }
        }

        SceneExit::FellThrough
    }

    fn execute(&mut self, command: &Command, scene: &Scene) -> Flow {
        match command {
            Command::Actor { id, name, x, y, .. } => {
                self.emit(format!("Actor {} ({}) at ({}, {})", id, name, x, y));
                Flow::Next
            }
            Command::If { condition, target } => {
                if self.inventory.contains(condition) {
                    self.goto(target, scene)
                } else {
                    Flow::Next
                }
            }
            Command::Goto { target } => self.goto(target, scene),
            Command::Give { token } => {
                self.inventory.insert(token.clone());
                self.emit(format!("Gave {}", token));
                Flow::Next
            }
            Command::Take { token } => {
                if !self.inventory.remove(token) {
                    debug!("took {} without holding it", token);
                }
                self.emit(format!("Took {}", token));
                Flow::Next
            }
            Command::Dialogue { actor, text } => {
                self.emit(format!("Actor {}: {}", actor, text));
                Flow::Next
            }
            Command::Label { .. } => Flow::Next,
        }
    }

    fn goto(&mut self, target: &Target, scene: &Scene) -> Flow {
        match target {
            Target::Scene(scene_id) => {
                self.emit(format!("Switching to Scene {}", scene_id));
                Flow::SwitchScene(*scene_id)
            }
            Target::Label(name) => match scene.find_label(name) {
                Some(index) => Flow::Jump(index),
                None => {
                    warn!("label {} not found in scene {}", name, scene.scene_id);
                    Flow::Next
                }
            },
        }
    }
}

/// Runs a parsed [`Program`] scene by scene, writing one line per visible
/// effect to its output.
pub struct Interpreter<W: Write> {
    program: Program,
    runtime: Runtime<W>,
}

impl Interpreter<io::Stdout> {
    pub fn with_stdout(program: Program) -> Self {
        Self::new(program, io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(program: Program, output: W) -> Self {
        Self {
            program,
            runtime: Runtime {
                inventory: BTreeSet::new(),
                output,
                steps: 0,
                step_limit: None,
            },
        }
    }

    /// Stop after `limit` commands have executed across the whole run.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.runtime.step_limit = Some(limit);
        self
    }

    pub fn run(&mut self, initial_scene_id: i32) -> Halt {
        let mut current_scene_id = initial_scene_id;

        loop {
            let Some(scene) = self.program.get(current_scene_id) else {
                self.runtime.emit(format!("Scene {} not found.", current_scene_id));
                warn!("scene {} not found, stopping", current_scene_id);
                return Halt::SceneNotFound(current_scene_id);
            };

            info!("entering scene {}", current_scene_id);
            match self.runtime.run_scene(scene) {
                SceneExit::Switch(scene_id) => current_scene_id = scene_id,
                SceneExit::FellThrough => {
                    info!("scene {} finished", current_scene_id);
                    return Halt::FellThrough(current_scene_id);
                }
                SceneExit::StepLimit => {
                    warn!(
                        "step limit of {} reached in scene {}",
                        self.runtime.steps, current_scene_id
                    );
                    return Halt::StepLimit(current_scene_id);
                }
            }
        }
    }

    pub fn inventory(&self) -> &BTreeSet<String> {
        &self.runtime.inventory
    }

    /// Commands executed so far.
    pub fn steps(&self) -> usize {
        self.runtime.steps
    }

    pub fn into_output(self) -> W {
        self.runtime.output
    }
}

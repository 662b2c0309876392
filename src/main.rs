use clap::{Parser as ClapParser, Subcommand};
use log::info;
use questscript::{Config, Halt, Interpreter, ScriptError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(ClapParser)]
#[command(author, version, about = "QuestScript interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script from its starting scene
    Run {
        /// Script to run (defaults to the configured script)
        script: Option<PathBuf>,
        /// Scene to start in
        #[arg(short, long)]
        scene: Option<i32>,
        /// Stop after this many commands
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Print the token stream of a script as JSON
    Tokens {
        script: Option<PathBuf>,
    },
    /// Print the parsed scene table of a script as JSON
    Parse {
        script: Option<PathBuf>,
    },
    /// Manage qscript configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a config file with defaults
    Init,
}

fn run_script(
    config: &Config,
    script: PathBuf,
    scene: i32,
    max_steps: Option<usize>,
) -> Result<(), ScriptError> {
    let program = questscript::load_file(&script)?;

    let mut interpreter = Interpreter::with_stdout(program);
    if let Some(limit) = max_steps.or(config.max_steps) {
        interpreter = interpreter.with_step_limit(limit);
    }

    match interpreter.run(scene) {
        Halt::StepLimit(scene_id) => {
            eprintln!("Stopped after {} steps in scene {}", interpreter.steps(), scene_id);
        }
        halt => info!("run finished: {:?}", halt),
    }
    Ok(())
}

fn execute(cli: Cli) -> Result<(), ScriptError> {
    let config = Config::load()?;

    match cli.command {
        Commands::Run { script, scene, max_steps } => {
            let script = script.unwrap_or_else(|| config.script_path.clone());
            let scene = scene.unwrap_or(config.start_scene);
            run_script(&config, script, scene, max_steps)?;
        }
        Commands::Tokens { script } => {
            let script = script.unwrap_or_else(|| config.script_path.clone());
            let source = questscript::read_script(&script)?;
            let tokens = questscript::tokenize(&source)?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Commands::Parse { script } => {
            let script = script.unwrap_or_else(|| config.script_path.clone());
            let program = questscript::load_file(&script)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("Environment: {}", config.env_name);
                println!("Config file: {}", Config::get_config_path().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Init => {
                let path = Config::get_config_path();
                if path.exists() {
                    println!("Config file already exists at: {}", path.display());
                } else {
                    Config::default().save()?;
                    println!("Initialized new config file at: {}", path.display());
                }
            }
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            match err {
                ScriptError::FileNotFound(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

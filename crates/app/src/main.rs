mod catalog;
mod config;
mod runner;

use std::fmt;
use std::path::PathBuf;

use quiz_core::{Difficulty, GraderKind, ModeId, ParseError};
use services::{QuestionPlan, QuizSession};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, prelude::*};

use config::{AppConfig, CONFIG_ENV};

const LOG_ENV: &str = "QUIZ_LOG";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, source: ParseError },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, source } => write!(f, "invalid {flag} value: {source}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr<Err = ParseError>>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    require_value(args, flag)?
        .parse()
        .map_err(|source| ArgsError::InvalidValue { flag, source })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play] [--config <path>] [--mode <mode>] [--difficulty <level>] [--grader <kind>]");
    eprintln!("  quiz modes");
    eprintln!();
    eprintln!("Modes:        standard, quick, rapid, hardcore, custom");
    eprintln!("Difficulties: entry, junior, mid, senior");
    eprintln!("Graders:      binary, accuracy, score, practice");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CONFIG, QUIZ_MODE, QUIZ_DIFFICULTY, QUIZ_LOG (falls back to RUST_LOG)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Modes,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "modes" => Some(Self::Modes),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    mode: Option<ModeId>,
    difficulty: Option<Difficulty>,
    grader: Option<GraderKind>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            config: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = Some(require_value(args, "--config")?.into()),
                "--mode" => parsed.mode = Some(parse_value(args, "--mode")?),
                "--difficulty" => parsed.difficulty = Some(parse_value(args, "--difficulty")?),
                "--grader" => parsed.grader = Some(parse_value(args, "--grader")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// File first, then environment, then flags.
    fn resolve_config(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        config.apply_env()?;
        self.apply_flags(&mut config);
        Ok(config)
    }

    fn apply_flags(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(grader) = self.grader {
            config.grader = Some(grader);
        }
    }
}

fn init_tracing() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    // Prompts go to stdout, so logs stay on stderr.
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_modes() {
    for id in ModeId::ALL {
        let description = id
            .preset()
            .map_or(quiz_core::CustomOptions::DESCRIPTION, |p| p.description());
        println!(
            "{:<9} {description} (default grader: {})",
            id.as_str(),
            GraderKind::for_mode(id)
        );
    }
}

async fn play(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve_config()?;
    let rules = config.rules()?;
    let grader = config.grader_kind();

    let plan = QuestionPlan::build(&rules.questions, catalog::sample_questions());
    tracing::info!(
        mode = %config.mode,
        difficulty = %config.difficulty,
        %grader,
        selected = plan.len(),
        filtered_out = plan.filtered_out,
        "question plan built"
    );

    println!("{} ({}, {})", rules.description, config.mode, config.difficulty);
    let session = QuizSession::new(rules, plan.into_questions(), grader.build())?;
    session.begin()?;

    let mut stdout = tokio::io::stdout();
    let results = runner::run(&session, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    stdout
        .write_all(runner::render_results(&results).as_bytes())
        .await?;
    stdout.flush().await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Modes => {
            print_modes();
            Ok(())
        }
        Command::Play => play(&parsed).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> std::vec::IntoIter<String> {
        items
            .iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_flags() {
        let parsed = Args::parse(&mut args(&[
            "--mode",
            "rapid",
            "--difficulty",
            "senior",
            "--grader",
            "practice",
            "--config",
            "quiz.toml",
        ]))
        .unwrap();
        assert_eq!(parsed.mode, Some(ModeId::Rapid));
        assert_eq!(parsed.difficulty, Some(Difficulty::Senior));
        assert_eq!(parsed.grader, Some(GraderKind::Practice));
        assert_eq!(parsed.config, Some(PathBuf::from("quiz.toml")));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(
            Args::parse(&mut args(&["--mode"])),
            Err(ArgsError::MissingValue { flag: "--mode" })
        ));
        assert!(matches!(
            Args::parse(&mut args(&["--grader", "lenient"])),
            Err(ArgsError::InvalidValue { flag: "--grader", .. })
        ));
        assert!(matches!(
            Args::parse(&mut args(&["--verbose"])),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn flags_override_config_file() {
        let parsed = Args {
            mode: Some(ModeId::Hardcore),
            grader: Some(GraderKind::Score),
            ..Args::default()
        };
        let mut config = AppConfig::from_toml("mode = \"quick\"\ndifficulty = \"mid\"").unwrap();
        parsed.apply_flags(&mut config);
        assert_eq!(config.mode, ModeId::Hardcore);
        assert_eq!(config.difficulty, Difficulty::Mid);
        assert_eq!(config.grader_kind(), GraderKind::Score);
        assert!(config.rules().unwrap().lives.enabled);
    }

    #[test]
    fn subcommands_are_recognized() {
        assert_eq!(Command::from_arg("play"), Some(Command::Play));
        assert_eq!(Command::from_arg("modes"), Some(Command::Modes));
        assert_eq!(Command::from_arg("serve"), None);
    }
}

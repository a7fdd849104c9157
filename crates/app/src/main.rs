use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use log::warn;
use quiz_core::model::{Explanations, QuizSettings, SelectionSettings};
use services::{Clock, QuizService, QuizSession, SessionError};
use storage::{StatsStore, load_bank, load_explanations};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { flag: &'static str, raw: String },
    InvalidPath { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { flag, raw } => {
                write!(f, "invalid {flag} value: {raw} (expected a positive integer)")
            }
            ArgsError::InvalidPath { flag } => write!(f, "{flag} requires a non-empty path"),
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

fn require_path(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<PathBuf, ArgsError> {
    let value = require_value(args, flag)?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidPath { flag });
    }
    Ok(PathBuf::from(value))
}

fn require_count(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<u32, ArgsError> {
    let value = require_value(args, flag)?;
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ArgsError::InvalidCount { flag, raw: value }),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [take]  [--bank <csv>] [--stats <json>] [--explanations <json>]");
    eprintln!("               [-n|--count <n>] [--coverage <sessions>]");
    eprintln!("  quiz stats   [--bank <csv>] [--stats <json>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bank questions.csv");
    eprintln!("  --stats quiz-stats.json");
    eprintln!("  --count 10");
    eprintln!("  --coverage 20");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK, QUIZ_STATS, QUIZ_EXPLANATIONS, QUIZ_COUNT, QUIZ_COVERAGE");
    eprintln!("  RUST_LOG (default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Take,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "take" => Some(Self::Take),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    bank: PathBuf,
    stats: PathBuf,
    explanations: Option<PathBuf>,
    count: Option<u32>,
    coverage: Option<u32>,
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn env_count(key: &str) -> Option<u32> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            bank: env_path("QUIZ_BANK").unwrap_or_else(|| PathBuf::from("questions.csv")),
            stats: env_path("QUIZ_STATS").unwrap_or_else(|| PathBuf::from("quiz-stats.json")),
            explanations: env_path("QUIZ_EXPLANATIONS"),
            count: env_count("QUIZ_COUNT"),
            coverage: env_count("QUIZ_COVERAGE"),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => parsed.bank = require_path(args, "--bank")?,
                "--stats" => parsed.stats = require_path(args, "--stats")?,
                "--explanations" => {
                    parsed.explanations = Some(require_path(args, "--explanations")?);
                }
                "-n" | "--count" => parsed.count = Some(require_count(args, "--count")?),
                "--coverage" => parsed.coverage = Some(require_count(args, "--coverage")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn settings(&self) -> Result<QuizSettings, quiz_core::Error> {
        let defaults = QuizSettings::default();
        let settings = QuizSettings::new(
            self.count.unwrap_or(defaults.question_count()),
            self.coverage.unwrap_or(defaults.coverage_target()),
            SelectionSettings::default(),
        )?;
        Ok(settings)
    }
}

fn build_service(args: &Args) -> Result<QuizService, Box<dyn std::error::Error>> {
    // A broken bank leaves the quiz unstartable rather than aborting.
    let bank = load_bank(&args.bank).unwrap_or_else(|err| {
        warn!("could not load question bank {}: {err}", args.bank.display());
        Vec::new()
    });

    let explanations = args
        .explanations
        .as_deref()
        .map(load_explanations)
        .unwrap_or_default();

    let service = QuizService::new(
        Clock::default_clock(),
        bank,
        StatsStore::file(&args.stats),
        args.settings()?,
    )
    .with_explanations(explanations);
    Ok(service)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Take,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Take,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut service = build_service(&parsed)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cmd {
        Command::Stats => {
            let report = service.coverage();
            writeln!(out, "questions:  {}", report.total)?;
            writeln!(out, "seen:       {}", report.seen)?;
            writeln!(out, "never seen: {}", report.unseen)?;
            writeln!(out, "sessions:   {}", report.sessions)?;
            Ok(())
        }
        Command::Take => {
            if !service.can_start() {
                writeln!(
                    out,
                    "No questions available in {}; nothing to quiz.",
                    parsed.bank.display()
                )?;
                return Ok(());
            }
            let mut session = service.start_quiz()?;
            let stdin = io::stdin();
            run_quiz(
                &mut session,
                service.explanations(),
                &Clock::default_clock(),
                &mut stdin.lock(),
                &mut out,
            )
        }
    }
}

//
// ─── INTERACTIVE LOOP ──────────────────────────────────────────────────────────
//

/// Parse a line like `1`, `1,3` or `a c` into distinct zero-based choice indices.
fn parse_choices(line: &str) -> Option<BTreeSet<usize>> {
    line.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            if let Ok(number) = token.parse::<usize>() {
                return number.checked_sub(1);
            }
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    Some(usize::from(letter.to_ascii_lowercase() as u8 - b'a'))
                }
                _ => None,
            }
        })
        .collect()
}

fn run_quiz(
    session: &mut QuizSession,
    explanations: &Explanations,
    clock: &Clock,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = session.total();
    let mut line = String::new();

    'questions: for index in 0..total {
        let question = session.question(index)?;
        writeln!(out)?;
        writeln!(out, "[{}/{}] {}", index + 1, total, question.text())?;
        for (n, choice) in question.choices().iter().enumerate() {
            writeln!(out, "  {}. {}", n + 1, choice.text)?;
        }
        let multi = question.is_multi_answer();
        let hint = if multi {
            "select all that apply, e.g. 1,3"
        } else {
            "pick one"
        };

        loop {
            write!(out, "Answer ({hint}): ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break 'questions;
            }
            let Some(choices) = parse_choices(&line) else {
                writeln!(out, "Could not read that answer.")?;
                continue;
            };
            if !multi && choices.len() > 1 {
                writeln!(out, "Pick exactly one choice.")?;
                continue;
            }
            // a line is applied whole or not at all
            session.clear_answer(index)?;
            let mut rejected = None;
            for choice in choices {
                if let Err(err) = session.toggle_answer(index, choice) {
                    rejected = Some(err);
                    break;
                }
            }
            if let Some(err) = rejected {
                session.clear_answer(index)?;
                match err {
                    SessionError::ChoiceOutOfRange { choice, .. } => {
                        writeln!(out, "There is no choice {}.", choice + 1)?;
                    }
                    other => return Err(other.into()),
                }
                continue;
            }
            match session.grade(index, clock.now()) {
                Ok(outcome) => {
                    if outcome.is_correct {
                        writeln!(out, "Correct.")?;
                    } else {
                        let expected: Vec<String> = outcome
                            .correct_choices
                            .iter()
                            .map(|c| (c + 1).to_string())
                            .collect();
                        writeln!(out, "Incorrect. Answer: {}", expected.join(", "))?;
                    }
                    break;
                }
                Err(SessionError::NothingSelected { .. }) => {
                    writeln!(out, "Select at least one choice.")?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(explanation) = session.explain(index, explanations)? {
            if let Some(text) = explanation.text.as_deref() {
                writeln!(out, "  {text}")?;
            }
            for link in &explanation.links {
                writeln!(out, "  - {}: {}", link.label(), link.url())?;
            }
        }
    }

    let summary = session.summary();
    writeln!(out)?;
    writeln!(
        out,
        "Score: {}/{} ({:.0}%)",
        summary.correct, summary.total, summary.score_percent
    )?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

mod input;
mod screen;

use std::fmt;

use quiz_core::catalog::catalog;
use quiz_core::model::{ExamId, Phase, QuizSession};
use services::{AppServices, Clock, Command, QuizConfig, QuizRunner, RunOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use input::{AfterInput, HomeInput, QuizInput, parse_after, parse_home, parse_quiz};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidExam { raw: String },
    InvalidDbUrl { raw: String },
    InvalidBaseUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExam { raw } => write!(f, "invalid --exam value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBaseUrl { raw } => write!(f, "invalid --base-url value: {raw}"),
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

struct Args {
    db_url: String,
    exam: Option<ExamId>,
    base_url: Option<String>,
    verbose: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--exam <n>] [--base-url <url>] [--verbose]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://exam-practice.sqlite3");
    eprintln!("  --exam resumes the exam left unfinished, otherwise shows the exam list");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DB_URL, EXAM_BASE_URL, EXAM_DURATION_SECS, EXAM_AUTO_SUBMIT, EXAM_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EXAM_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://exam-practice.sqlite3".into(), normalize_sqlite_url);
        let mut exam = None;
        let mut base_url = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--exam" => {
                    let value = require_value(args, "--exam")?;
                    let parsed = ExamId::parse(&value)
                        .map_err(|_| ArgsError::InvalidExam { raw: value.clone() })?;
                    exam = Some(parsed);
                }
                "--base-url" => {
                    let value = require_value(args, "--base-url")?;
                    if !(value.starts_with("http://") || value.starts_with("https://")) {
                        return Err(ArgsError::InvalidBaseUrl { raw: value });
                    }
                    base_url = Some(value);
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            exam,
            base_url,
            verbose,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("EXAM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Forward stdin lines; the channel closes at end of input.
fn spawn_line_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Where control goes after an exam screen closes.
enum Next {
    Home,
    Start(ExamId),
    Exit,
}

async fn home(lines: &mut mpsc::Receiver<String>) -> Next {
    println!("{}", screen::home(&catalog()));
    while let Some(line) = lines.recv().await {
        match parse_home(&line) {
            Ok(HomeInput::Start(exam_id)) => return Next::Start(exam_id),
            Ok(HomeInput::Help) => println!("{}", screen::home_help()),
            Ok(HomeInput::Exit) => return Next::Exit,
            Ok(HomeInput::Nothing) => {}
            Err(err) => println!("{err}"),
        }
    }
    Next::Exit
}

async fn after_screen(lines: &mut mpsc::Receiver<String>, exam_id: &ExamId) -> Next {
    while let Some(line) = lines.recv().await {
        match parse_after(&line) {
            Ok(AfterInput::Retry) => return Next::Start(exam_id.clone()),
            Ok(AfterInput::Home) => return Next::Home,
            Ok(AfterInput::Exit) => return Next::Exit,
            Ok(AfterInput::Nothing) => {}
            Err(err) => println!("{err}"),
        }
    }
    Next::Exit
}

fn render(session: &QuizSession, show_answer: bool) {
    match session.phase() {
        Phase::Answering => {
            if let Some(screen) = screen::question(session, show_answer) {
                println!("{screen}");
            }
        }
        Phase::ReviewSummary => println!("{}", screen::review(session)),
        Phase::Loading | Phase::Error | Phase::Finished => {}
    }
}

/// Same screen apart from the clock.
fn same_screen(a: &QuizSession, b: &QuizSession) -> bool {
    a.phase() == b.phase()
        && a.current_index() == b.current_index()
        && a.statuses() == b.statuses()
}

async fn play(
    services: &AppServices,
    exam_id: ExamId,
    lines: &mut mpsc::Receiver<String>,
) -> Result<Next, Box<dyn std::error::Error>> {
    println!("Loading {exam_id} ...");
    let mut service = services.start_session(exam_id.clone()).await?;

    while service.session().phase() == Phase::Error {
        println!("{}", screen::error(service.session()));
        match after_screen(lines, &exam_id).await {
            Next::Start(_) => {
                println!("Loading {exam_id} ...");
                service = service.retry(services.loader()).await?;
            }
            Next::Home => {
                services.abandon_session(service).await?;
                return Ok(Next::Home);
            }
            Next::Exit => {
                // The snapshot stays so the exam can still be resumed from the list.
                services.selection().clear().await?;
                return Ok(Next::Exit);
            }
        }
    }

    services.selection().select(&exam_id).await?;

    let (commands, command_rx) = mpsc::channel(16);
    let (view_tx, mut view) = watch::channel(service.session().clone());
    let runner = QuizRunner::new(service, services.config().auto_submit_on_expiry);
    let task = tokio::spawn(runner.run(command_rx, view_tx));

    let mut shown = view.borrow_and_update().clone();
    let mut show_answer = false;
    let mut warned_time_up = false;
    render(&shown, show_answer);

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = view.borrow_and_update().clone();
                if session.remaining_seconds() == 0
                    && !warned_time_up
                    && session.phase().is_active()
                {
                    warned_time_up = true;
                    println!("{}", screen::time_up());
                }
                if !same_screen(&shown, &session) {
                    if session.current_index() != shown.current_index() {
                        show_answer = false;
                    }
                    render(&session, show_answer);
                }
                shown = session;
                if shown.phase() == Phase::Finished {
                    break;
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                match parse_quiz(&line) {
                    Ok(QuizInput::Command(command)) => {
                        if commands.send(command).await.is_err() {
                            break;
                        }
                    }
                    Ok(QuizInput::ToggleAnswer) => {
                        show_answer = !show_answer;
                        render(&shown, show_answer);
                    }
                    Ok(QuizInput::Help) => println!("{}", screen::quiz_help()),
                    Ok(QuizInput::Exit) => break,
                    Ok(QuizInput::Nothing) => render(&shown, show_answer),
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    drop(commands);
    let outcome = task.await?;
    debug!(?outcome, "quiz run ended");

    match outcome {
        RunOutcome::Finished(session) => {
            services.selection().clear().await?;
            if let Some(report) = screen::result(&session) {
                println!("{report}");
            }
            Ok(after_screen(lines, &exam_id).await)
        }
        RunOutcome::Quit { .. } => {
            services.selection().clear().await?;
            Ok(Next::Home)
        }
        RunOutcome::Closed(_) => {
            println!("Progress saved. Run again to resume {exam_id}.");
            Ok(Next::Exit)
        }
        RunOutcome::NotStarted(session) => {
            println!("{}", screen::error(&session));
            services.selection().clear().await?;
            Ok(Next::Home)
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_tracing(parsed.verbose)?;

    let mut config = QuizConfig::from_env();
    if let Some(base_url) = parsed.base_url {
        config = config.with_base_url(base_url);
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default(), config).await?;

    let mut lines = spawn_line_reader();
    let mut next = match parsed.exam {
        Some(exam_id) => Next::Start(exam_id),
        None => match services.selection().resume_target().await? {
            Some(exam_id) => Next::Start(exam_id),
            None => Next::Home,
        },
    };

    loop {
        next = match next {
            Next::Home => home(&mut lines).await,
            Next::Start(exam_id) => play(&services, exam_id, &mut lines).await?,
            Next::Exit => return Ok(()),
        };
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_exam_and_base_url() {
        let args = parse(&["--exam", "7", "--base-url", "https://example.com/data", "-v"]).unwrap();
        assert_eq!(args.exam, Some(ExamId::numbered(7)));
        assert_eq!(args.base_url.as_deref(), Some("https://example.com/data"));
        assert!(args.verbose);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(parse(&["--exam"]), Err(ArgsError::MissingValue { flag: "--exam" })));
        assert!(matches!(parse(&["--base-url", "ftp://x"]), Err(ArgsError::InvalidBaseUrl { .. })));
        assert!(matches!(parse(&["--db", " "]), Err(ArgsError::InvalidDbUrl { .. })));
        assert!(matches!(parse(&["--nope"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/exams.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/exams.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }
}

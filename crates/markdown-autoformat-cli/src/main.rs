mod app;
mod keys;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_autoformat_config::Config;
use markdown_autoformat_engine::render::{to_html, to_markdown};
use markdown_autoformat_engine::{Dispatcher, io};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::OpenOptions,
    io::stdout,
    path::{Path, PathBuf},
    process,
};

use crate::app::{App, run_app};
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "markdown-autoformat",
    version,
    about = "Block editor that turns markdown prefixes into structure as you type"
)]
struct Cli {
    /// Config file to use instead of ~/.config/markdown-autoformat/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Edit a document in the terminal (default)
    Edit {
        /// Markdown or .json document; created on first save if missing
        file: Option<PathBuf>,
    },
    /// Print a document converted to another format
    Render {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Check the CommonMark renderer against `<name>.md` / `<name>.out` pairs
    Samples {
        dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Html,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("config file {} not found", path.display()))?,
        None => Config::load_or_default()?,
    };
    init_logging(&config.log_file_or_default())?;
    log::info!("markdown-autoformat starting up");
    log::debug!("Config path: {}", Config::config_path().display());

    match cli.command.unwrap_or(Command::Edit { file: None }) {
        Command::Edit { file } => edit(&config, file.or_else(|| config.document_path.clone())),
        Command::Render { file, format } => render(&file, format),
        Command::Samples { dir } => samples(
            &dir.or_else(|| config.samples_path.clone())
                .unwrap_or_else(|| PathBuf::from("tests")),
        ),
    }
}

/// Log to a file: the editor owns the terminal
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn edit(config: &Config, file: Option<PathBuf>) -> Result<()> {
    let keymap = keys::keymap_from_config(&config.hotkeys).context("invalid hotkey in config")?;
    let session = Session::open(file, Dispatcher::new(keymap))?;
    let mut app = App::new(session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn render(file: &Path, format: Format) -> Result<()> {
    let doc = io::read_document(file)?;
    let output = match format {
        Format::Markdown => to_markdown(&doc),
        Format::Html => to_html(&doc),
        Format::Json => serde_json::to_string_pretty(&doc)? + "\n",
    };
    print!("{output}");
    Ok(())
}

fn samples(dir: &Path) -> Result<()> {
    let samples = io::load_samples(dir)?;
    let mut failures = 0;

    for sample in &samples {
        let report = sample.check();
        if report.passed {
            println!("PASS {}", report.name);
        } else {
            failures += 1;
            println!("FAIL {}", report.name);
            println!("--- expected\n{}", report.expected.trim_end());
            println!("+++ rendered\n{}", report.rendered.trim_end());
        }
    }

    println!("{} passed, {failures} failed", samples.len() - failures);
    if failures > 0 {
        log::warn!("{failures} sample(s) failed in {}", dir.display());
        process::exit(1);
    }
    Ok(())
}

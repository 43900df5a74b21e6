//! lispcalc command line entry point.
//!
//! Usage:
//!   lispcalc                         # Interactive prompt, or read piped stdin
//!   lispcalc -v vars.txt             # Pre-load variables
//!   lispcalc -o transcript.txt       # Also write an infix transcript
//!   lispcalc --echo infix            # Echo each parsed expression

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lispcalc::{EchoFormat, Environment, Session, SessionConfig};

const PROMPT: &str = "> ";

/// Prefix-notation calculator: one parenthesized expression per line, `(<>)` to quit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File of `name = integer` lines to pre-load as variables
    #[arg(short, long, value_name = "FILE")]
    variables: Option<PathBuf>,

    /// Write `<infix> = <result>` for every evaluated line to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Echo each parsed expression before its result
    #[arg(short, long, value_enum)]
    echo: Option<EchoFormat>,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays the calculator output (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let env = match &args.variables {
        Some(path) => Environment::from_file(path)
            .with_context(|| format!("failed to load variables from {}", path.display()))?,
        None => Environment::new(),
    };

    let transcript: Option<Box<dyn Write>> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(Box::new(BufWriter::new(file)))
        }
        None => None,
    };

    let config = SessionConfig { echo: args.echo };
    let mut session = Session::with_config(env, config, transcript);

    if io::stdin().is_terminal() {
        return run_interactive(&mut session);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    session
        .run(stdin.lock(), stdout.lock())
        .context("session failed")?;
    Ok(())
}

/// Line-edited prompt with history for terminal use
fn run_interactive<T: Write>(session: &mut Session<T>) -> Result<()> {
    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("failed to create line editor")?;
    let mut stdout = io::stdout();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        tracing::warn!("failed to add history entry: {}", e);
                    }
                }
                if !session
                    .handle_line(&line, &mut stdout)
                    .context("session failed")?
                {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }

    tracing::info!(evaluated = session.evaluated(), "session ended");
    session.finish(&mut stdout).context("session failed")?;
    Ok(())
}

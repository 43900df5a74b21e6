//! Line-oriented calculator session
//!
//! A [`Session`] owns one variable [`Environment`] and turns input lines into
//! printed results:
//!
//! ```text
//! (+(1)(2))        res = 3.00
//! (=(c)(8))        c = 8.00
//! (/(1)(0))        Invalid Result
//! (<>)             Exiting...
//! ```

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::parser::{parse, to_infix, Expression, NodeView};
use crate::runtime::{evaluate, Environment};

/// How to echo each parsed expression before its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EchoFormat {
    /// Re-printed bracketed input, `(+(1)(2))`
    Bracketed,
    /// Infix notation, `(1+2)`
    Infix,
    /// Nested JSON nodes
    Json,
}

/// Session options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Echo parsed expressions in this format
    pub echo: Option<EchoFormat>,
}

/// Result of handling one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Plain expression value
    Value(f64),
    /// Top-level assignment that bound `name`
    Assigned {
        /// Variable that was bound
        name: String,
        /// Bound value
        value: f64,
    },
    /// Expression had no defined value (NaN)
    Invalid,
    /// The `<>` terminator
    Exit,
}

impl fmt::Display for LineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineOutcome::Value(value) => write!(f, "res = {:.2}", value),
            LineOutcome::Assigned { name, value } => write!(f, "{} = {:.2}", name, value),
            LineOutcome::Invalid => write!(f, "Invalid Result"),
            LineOutcome::Exit => write!(f, "Exiting..."),
        }
    }
}

/// One interactive calculator session
pub struct Session<T = io::Sink> {
    env: Environment,
    config: SessionConfig,
    /// Receives `<infix> = <result>` for every evaluated line
    transcript: Option<T>,
    evaluated: usize,
}

impl Session {
    /// Creates a session without a transcript
    pub fn new(env: Environment) -> Self {
        Session::with_config(env, SessionConfig::default(), None)
    }
}

impl<T: Write> Session<T> {
    /// Creates a session writing a transcript to `transcript`
    pub fn with_transcript(env: Environment, transcript: T) -> Self {
        Session::with_config(env, SessionConfig::default(), Some(transcript))
    }

    pub fn with_config(env: Environment, config: SessionConfig, transcript: Option<T>) -> Self {
        Session {
            env,
            config,
            transcript,
            evaluated: 0,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Number of lines evaluated so far
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Finishes the session, handing back the transcript writer
    pub fn into_transcript(self) -> Option<T> {
        self.transcript
    }

    /// Parses and evaluates one line, recording it in the transcript
    pub fn process_line(&mut self, line: &str) -> Result<LineOutcome> {
        let expr = parse(line)?;
        let outcome = self.execute(&expr)?;
        self.record(&expr, &outcome)?;
        Ok(outcome)
    }

    /// Evaluates an already parsed expression
    ///
    /// Nothing is written to the transcript; see [`Session::process_line`].
    pub fn execute(&mut self, expr: &Expression) -> Result<LineOutcome> {
        if expr.is_end_command() {
            return Ok(LineOutcome::Exit);
        }

        let value = evaluate(expr, &mut self.env)?;
        self.evaluated += 1;

        if value.is_nan() {
            Ok(LineOutcome::Invalid)
        } else if let Some(name) = expr.assignment_target() {
            Ok(LineOutcome::Assigned {
                name: name.to_string(),
                value,
            })
        } else {
            Ok(LineOutcome::Value(value))
        }
    }

    /// Appends `<infix> = <result>` for an evaluated line
    ///
    /// Write failures come back as [`Error::Transcript`].
    fn record(&mut self, expr: &Expression, outcome: &LineOutcome) -> Result<()> {
        let Some(transcript) = self.transcript.as_mut() else {
            return Ok(());
        };
        let result = match outcome {
            LineOutcome::Value(value) | LineOutcome::Assigned { value, .. } => {
                format!("{:.2}", value)
            }
            LineOutcome::Invalid => "Invalid Result".to_string(),
            LineOutcome::Exit => return Ok(()),
        };
        let infix = to_infix(expr)?;
        writeln!(transcript, "{} = {}", infix, result)
            .map_err(|err| Error::Transcript(err.to_string()))
    }

    /// Runs the read-evaluate-print loop until `<>` or end of input
    ///
    /// Bad lines are reported on `output` and the loop moves on to the next
    /// one. Only I/O failures on `input`, `output` or the transcript end the
    /// session early.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                tracing::info!(evaluated = self.evaluated, "end of input");
                return self.finish(&mut output);
            }

            let keep_going = match String::from_utf8(std::mem::take(&mut buf)) {
                Ok(line) => self.handle_line(&line, &mut output)?,
                Err(err) => {
                    let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
                    let position = String::from_utf8_lossy(valid).chars().count();
                    self.report(&Error::InvalidEncoding { position }, &mut output)?;
                    true
                }
            };
            if !keep_going {
                tracing::info!(evaluated = self.evaluated, "session ended");
                return self.finish(&mut output);
            }
        }
    }

    /// Handles one input line, writing its result to `output`
    ///
    /// Returns `false` once the session should stop. Parse and evaluation
    /// errors are printed and swallowed; an `Err` means the session itself
    /// failed.
    pub fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<bool> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Ok(true);
        }

        let expr = match parse(line) {
            Ok(expr) => expr,
            Err(err) => {
                self.report(&err, output)?;
                return Ok(true);
            }
        };

        if let Some(format) = self.config.echo {
            if !expr.is_end_command() {
                writeln!(output, "{}", render(&expr, format)?)?;
            }
        }

        match self.execute(&expr) {
            Ok(outcome) => {
                writeln!(output, "{}", outcome)?;
                self.record(&expr, &outcome)?;
                Ok(outcome != LineOutcome::Exit)
            }
            Err(err) => {
                self.report(&err, output)?;
                Ok(true)
            }
        }
    }

    /// Flushes `output` and the transcript
    pub fn finish<W: Write>(&mut self, output: &mut W) -> Result<()> {
        output.flush()?;
        if let Some(transcript) = self.transcript.as_mut() {
            transcript
                .flush()
                .map_err(|err| Error::Transcript(err.to_string()))?;
        }
        Ok(())
    }

    fn report<W: Write>(&self, err: &Error, output: &mut W) -> Result<()> {
        if err.is_parse_error() {
            tracing::warn!(%err, "rejected input");
            writeln!(output, "Invalid input: {}", err)?;
        } else {
            tracing::warn!(%err, "evaluation failed");
            writeln!(output, "Evaluation error: {}", err)?;
        }
        Ok(())
    }
}

fn render(expr: &Expression, format: EchoFormat) -> Result<String> {
    match format {
        EchoFormat::Bracketed => Ok(expr.to_string()),
        EchoFormat::Infix => to_infix(expr),
        EchoFormat::Json => Ok(serde_json::to_string(&NodeView::of(expr))?),
    }
}

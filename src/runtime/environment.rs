use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Variable bindings for one calculator session
///
/// Each name maps to the most recently assigned value. Sessions never share
/// an environment; pass it by `&mut` to the evaluator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    variables: HashMap<String, f64>,
}

impl Environment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Environment {
            variables: HashMap::new(),
        }
    }

    /// Binds `name` to `value`, replacing any previous binding
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    /// Gets the value bound to `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Removes a binding, returning its value
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.variables.remove(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// All bindings sorted by name
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        let mut result: Vec<(String, f64)> =
            self.iter().map(|(k, v)| (k.to_string(), v)).collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    /// Reads `name = value` lines into a new environment
    ///
    /// Blank lines are skipped. The first malformed line aborts the load.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut env = Environment::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim_matches(is_separator).is_empty() {
                continue;
            }
            let (name, value) =
                parse_assignment_line(&line).map_err(|reason| Error::InvalidAssignmentLine {
                    line: index + 1,
                    reason,
                })?;
            env.set(name, value);
        }
        tracing::info!(count = env.len(), "loaded variables");
        Ok(env)
    }

    /// Loads a variable file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::load(BufReader::new(file))
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parses one `<name> = <integer>` line
///
/// Tokens are separated by spaces or tabs; the name is letters only and the
/// value is a signed base-10 integer with nothing after it.
pub fn parse_assignment_line(line: &str) -> std::result::Result<(String, f64), String> {
    let mut tokens = line.split(is_separator).filter(|t| !t.is_empty());

    let name = tokens.next().ok_or("missing variable name")?;
    if !is_name(name) {
        return Err(format!("'{}' is not a valid variable name", name));
    }

    match tokens.next() {
        Some("=") => {}
        Some(other) => return Err(format!("expected '=', found '{}'", other)),
        None => return Err("expected '='".to_string()),
    }

    let number = tokens.next().ok_or("missing value")?;
    let value: i64 = number
        .parse()
        .map_err(|_| format!("'{}' is not an integer", number))?;

    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected '{}' after value", extra));
    }

    Ok((name.to_string(), value as f64))
}

/// Variable names are non-empty runs of ASCII letters
pub fn is_name(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic())
}

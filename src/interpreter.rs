use crate::environment::Environment;
use crate::evaluator::{self, Result, EVAL};
use crate::host::HostCapabilities;
use crate::printer;
use crate::reader;
use std::io::Write;
use std::path::Path;

/// How deeply evaluation may nest before giving up with
/// [`Error::TooDeep`](evaluator::Error::TooDeep).
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Everything one user of the interpreter owns: the name table, the host
/// callbacks scripts may reach, and where `princ` and `with` write.
pub struct Session {
    pub(crate) env: Environment,
    pub(crate) host: HostCapabilities,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    output: Box<dyn Write>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self {
            env: Environment::default(),
            host: HostCapabilities::default(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            output,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Bindings made here survive only until the next top-level line ends.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn host_mut(&mut self) -> &mut HostCapabilities {
        &mut self.host
    }

    /// Each nested expression, lambda call and `with` include counts
    /// towards the limit.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Write one line of program output. Failing to write is not an error
    /// of the program being run, so it is only logged.
    pub(crate) fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            log::warn!("failed to write output: {}", e);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Read, evaluate and print one line, leaving the environment as evaluation
/// left it.
pub(crate) fn rep(line: &str, session: &mut Session) -> Result<String> {
    log::debug!("evaluate {}", line.trim());
    let ast = reader::read_str(line)?;
    let value = EVAL(&ast, session)?;
    Ok(printer::pr_str(&value))
}

/// The non-blank lines of a source file; each holds one top-level form.
pub(crate) fn source_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// Evaluate one top-level line and print its result. The environment is
/// reset to the built-ins afterwards, whether or not evaluation succeeded.
pub fn evaluate(session: &mut Session, text: &str) -> Result<String> {
    let result = rep(text, session);
    session.env.reset();
    result
}

/// Evaluate every non-blank line of a file in order. The lines share one
/// environment and an error on one line does not stop the next; the reset
/// happens once the whole file is done.
pub fn load_file<P: AsRef<Path>>(
    session: &mut Session,
    path: P,
) -> Result<Vec<Result<String>>> {
    let path = path.as_ref();
    log::info!("loading {}", path.display());
    let text = std::fs::read_to_string(path)
        .map_err(|e| evaluator::Error::IOError(path.to_path_buf(), e))?;
    let results = source_lines(&text)
        .map(|line| rep(line, session))
        .collect();
    session.env.reset();
    Ok(results)
}

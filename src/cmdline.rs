use crate::evaluator;
use crate::interpreter::{self, Session};
use ansi_term::Colour::Red;
use linefeed::{DefaultTerminal, Interface, ReadResult, Terminal};
use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;

pub const BANNER: &str = "TLISP 1.0";

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Load(evaluator::Error),
    Usage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IO(e) => write!(f, "{}", e),
            Error::Load(e) => write!(f, "{}", e),
            Error::Usage(program) => write!(f, "usage: {} [FILE]", program),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IO(e)
    }
}

/// How results and errors are shown to the user.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    colour: bool,
}

impl Style {
    /// Colour only when stdout is a terminal.
    pub fn detect() -> Self {
        Self {
            colour: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn plain() -> Self {
        Self { colour: false }
    }

    pub fn result(&self, text: &str) -> String {
        match self.colour {
            true => Red.paint(text).to_string(),
            false => text.to_string(),
        }
    }

    pub fn error(&self, e: &evaluator::Error) -> String {
        let label = match self.colour {
            true => Red.bold().paint("Error!").to_string(),
            false => String::from("Error!"),
        };
        format!("{} {}", label, e)
    }

    pub fn outcome(&self, outcome: &evaluator::Result<String>) -> String {
        match outcome {
            Ok(text) => self.result(text),
            Err(e) => self.error(e),
        }
    }
}

pub fn setup() -> std::io::Result<Interface<DefaultTerminal>> {
    let interface = linefeed::Interface::new("tlisp")?;
    interface.set_prompt("> ")?;
    if let Some(path) = history_path() {
        interface.load_history(path).ok();
    };
    Ok(interface)
}

fn history_path() -> Option<PathBuf> {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push(".tlisp_history");
            Some(path)
        }
        None => None,
    }
}

pub fn save_history<T: Terminal>(interface: &Interface<T>) -> std::io::Result<()> {
    match history_path() {
        Some(path) => interface.save_history(path),
        None => Ok(()),
    }
}

pub fn repl<T: Terminal>(interface: &Interface<T>, session: &mut Session, style: Style) {
    writeln!(interface, "{}", style.result(BANNER)).ok();
    loop {
        match interface.read_line() {
            Ok(ReadResult::Eof) => break,
            Ok(ReadResult::Signal(sig)) => {
                writeln!(interface, "Received signal {:?}", sig).ok();
            }
            Ok(ReadResult::Input(line)) => {
                if line.trim() == "exit" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                interface.add_history_unique(line.clone());
                let outcome = interpreter::evaluate(session, &line);
                writeln!(interface, "{}", style.outcome(&outcome)).ok();
            }
            Err(e) => {
                writeln!(interface, "Error: {}", e).ok();
                break;
            }
        }
    }
}

/// Non-interactive counterpart of [`repl`]: every line of `input` is one
/// top-level line.
pub fn run_lines<R: BufRead>(input: R, session: &mut Session, style: Style) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = interpreter::evaluate(session, &line);
        match &outcome {
            Ok(_) => println!("{}", style.outcome(&outcome)),
            Err(_) => eprintln!("{}", style.outcome(&outcome)),
        }
    }
    Ok(())
}

pub fn run_file(path: &str, session: &mut Session, style: Style) -> Result<(), Error> {
    let outcomes = interpreter::load_file(session, path).map_err(Error::Load)?;
    for outcome in &outcomes {
        match outcome {
            Ok(_) => println!("{}", style.outcome(outcome)),
            Err(_) => eprintln!("{}", style.outcome(outcome)),
        }
    }
    Ok(())
}

/// `tlisp` runs the REPL (or reads stdin line by line when it is not a
/// terminal); `tlisp FILE` runs a script.
pub fn launch(args: Vec<String>, session: &mut Session) -> Result<(), Error> {
    let style = Style::detect();
    match args.as_slice() {
        [_] if atty::is(atty::Stream::Stdin) => {
            let interface = setup()?;
            repl(&interface, session, style);
            save_history(&interface)?;
            Ok(())
        }
        [_] => {
            let stdin = std::io::stdin();
            run_lines(stdin.lock(), session, style)?;
            Ok(())
        }
        [_, path] => run_file(path, session, style),
        _ => Err(Error::Usage(
            args.first().cloned().unwrap_or_else(|| String::from("tlisp")),
        )),
    }
}

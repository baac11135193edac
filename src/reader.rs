use crate::tokens::{tokenize, Token};
use crate::types::Int;
use itertools::Itertools;
use std::fmt;
use std::iter::Peekable;
use std::slice;

type Reader<'a> = Peekable<slice::Iter<'a, Token<'a>>>;

/// Lists nested deeper than this are rejected rather than read.
pub const MAX_NESTING: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Integer(Int),
    Float(f64),
    Symbol(String),
}

/// A parsed expression. Lists keep their elements unevaluated; a lambda body
/// is one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Atom(Atom),
    Node(Vec<Ast>),
}

impl Ast {
    pub fn symbol(name: &str) -> Self {
        Ast::Atom(Atom::Symbol(name.into()))
    }

    pub fn integer(value: Int) -> Self {
        Ast::Atom(Atom::Integer(value))
    }

    pub(crate) fn as_symbol(&self) -> Option<&str> {
        match self {
            Ast::Atom(Atom::Symbol(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Integer(x) => write!(f, "{}", x),
            Atom::Float(x) => write!(f, "{}", crate::printer::float_repr(*x)),
            Atom::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Atom(atom) => write!(f, "{}", atom),
            Ast::Node(elements) => write!(f, "({})", elements.iter().join(" ")),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReadError {
    UnexpectedEndOfInput,
    UnexpectedCloseParen,
    TooDeeplyNested,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            ReadError::UnexpectedCloseParen => write!(f, "unexpected close paren"),
            ReadError::TooDeeplyNested => {
                write!(f, "lists nested more than {} deep", MAX_NESTING)
            }
        }
    }
}

pub type Result = std::result::Result<Ast, ReadError>;

/// Parse the first complete expression in `input`. Anything after it on the
/// line is ignored.
pub fn read_str(input: &str) -> Result {
    let tokens = tokenize(input);
    let mut reader = tokens.iter().peekable();
    read_form(&mut reader, 0)
}

fn read_form(reader: &mut Reader, depth: usize) -> Result {
    match reader.next() {
        Some(Token::OpenRoundBracket) if depth >= MAX_NESTING => {
            Err(ReadError::TooDeeplyNested)
        }
        Some(Token::OpenRoundBracket) => read_list(reader, depth + 1).map(Ast::Node),
        Some(Token::CloseRoundBracket) => Err(ReadError::UnexpectedCloseParen),
        Some(Token::PlainChars(chars)) => Ok(Ast::Atom(read_atom(chars))),
        None => Err(ReadError::UnexpectedEndOfInput),
    }
}

fn read_list(reader: &mut Reader, depth: usize) -> std::result::Result<Vec<Ast>, ReadError> {
    let mut elements = Vec::new();
    loop {
        match reader.peek() {
            Some(Token::CloseRoundBracket) => {
                reader.next();
                break;
            }
            Some(_) => elements.push(read_form(reader, depth)?),
            None => return Err(ReadError::UnexpectedEndOfInput),
        }
    }
    Ok(elements)
}

/// Integer first, then float, then whatever is left is a symbol.
pub fn read_atom(chars: &str) -> Atom {
    if let Ok(value) = chars.parse::<Int>() {
        return Atom::Integer(value);
    }
    if let Ok(value) = chars.parse::<f64>() {
        return Atom::Float(value);
    }
    Atom::Symbol(String::from(chars))
}

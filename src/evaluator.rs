use crate::interpreter::Session;
use crate::reader::{self, Ast, Atom};
use crate::special_forms;
use crate::types::{self, Int, Lambda, PrimitiveFn, Procedure, TypeMismatch, Value};

use itertools::Itertools;
use std::fmt;
use std::path::PathBuf;

pub type Result<T = Value> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Read(reader::ReadError),
    Def(special_forms::DefError),
    Lambda(special_forms::LambdaError),
    Dict(special_forms::DictError),
    With(special_forms::WithError),
    TypeMismatch(types::TypeMismatch),
    BadArgCount(types::BadArgCount),
    BadIndex(Int, usize),
    KeyNotFound(String),
    NotInList(String),
    UnknownCapability(String),
    DivideByZero,
    IntegerOverflow,
    IOError(PathBuf, std::io::Error),
    TooDeep(usize),
}

/// Coarse classification of an [`Error`], for callers that only care about
/// what sort of thing went wrong.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Syntax,
    Lookup,
    Arithmetic,
    Io,
    Type,
    Form,
    Limit,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Read(_) => ErrorKind::Syntax,
            Error::BadIndex(..)
            | Error::KeyNotFound(_)
            | Error::NotInList(_)
            | Error::UnknownCapability(_) => ErrorKind::Lookup,
            Error::DivideByZero | Error::IntegerOverflow => ErrorKind::Arithmetic,
            Error::IOError(..) => ErrorKind::Io,
            Error::TypeMismatch(_) | Error::BadArgCount(_) => ErrorKind::Type,
            Error::Def(_) | Error::Lambda(_) | Error::Dict(_) | Error::With(_) => ErrorKind::Form,
            Error::TooDeep(_) => ErrorKind::Limit,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(e) => write!(f, "syntax error: {}", e),
            Error::Def(e) => write!(f, "def: {:?}", e),
            Error::Lambda(e) => write!(f, "lambda: {:?}", e),
            Error::Dict(e) => write!(f, "dict: {:?}", e),
            Error::With(e) => write!(f, "with: {:?}", e),
            Error::TypeMismatch(e) => write!(f, "type mismatch: {:?}", e),
            Error::BadArgCount(e) => write!(f, "{}", e),
            Error::BadIndex(i, len) => {
                write!(f, "bad index: {} out of range for list of length {}", i, len)
            }
            Error::KeyNotFound(key) => write!(f, "key not found: {}", key),
            Error::NotInList(value) => write!(f, "{} not in list", value),
            Error::UnknownCapability(name) => write!(f, "no host capability named '{}'", name),
            Error::DivideByZero => write!(f, "cannot divide by zero!"),
            Error::IntegerOverflow => write!(f, "integer overflow"),
            Error::IOError(path, e) => write!(f, "io error: {}: {}", path.display(), e),
            Error::TooDeep(limit) => write!(f, "maximum evaluation depth of {} exceeded", limit),
        }
    }
}

impl std::error::Error for Error {}

impl From<types::TypeMismatch> for Error {
    fn from(t: TypeMismatch) -> Self {
        Self::TypeMismatch(t)
    }
}

impl From<types::BadArgCount> for Error {
    fn from(e: types::BadArgCount) -> Self {
        Self::BadArgCount(e)
    }
}

impl From<reader::ReadError> for Error {
    fn from(e: reader::ReadError) -> Self {
        Self::Read(e)
    }
}

#[allow(non_snake_case)]
pub(crate) fn EVAL(ast: &Ast, session: &mut Session) -> Result {
    session.depth += 1;
    if session.depth > session.max_depth {
        session.depth -= 1;
        return Err(Error::TooDeep(session.max_depth));
    }
    let result = eval_nested(ast, session);
    session.depth -= 1;
    result
}

fn eval_nested(ast: &Ast, session: &mut Session) -> Result {
    match ast {
        Ast::Atom(Atom::Symbol(name)) => Ok(session.env.lookup(name)),
        Ast::Atom(atom) => Ok(atom.into()),
        Ast::Node(argv) => match argv.split_first() {
            None => Ok(Value::wrap_list(Vec::new())),
            Some((head, args)) => {
                log::trace!("apply {}", ast);
                apply_form(head, args, session)
            }
        },
    }
}

fn apply_form(head: &Ast, args: &[Ast], session: &mut Session) -> Result {
    let operator = match head {
        Ast::Atom(Atom::Symbol(name)) => {
            match name.as_str() {
                "if" => return special_forms::apply_if(args, session),
                "with" => return special_forms::apply_with(args, session),
                "def" => return special_forms::apply_def(args, session),
                "lambda" => return special_forms::apply_lambda(args),
                "quote" => return Ok(special_forms::apply_quote(args)),
                "begin" => return special_forms::apply_begin(args, session),
                "dict" => return special_forms::apply_dict(args, session),
                "nil" => return Ok(Value::Bool(false)),
                "t" => return Ok(Value::Bool(true)),
                // Any other symbol names an operator and is handled below
                _ => session.env.lookup(name),
            }
        }
        // (1 2 3) evaluates to 1
        Ast::Atom(atom) => return Ok(atom.into()),
        Ast::Node(_) => EVAL(head, session)?,
    };

    let procedure = match operator {
        Value::Procedure(procedure) => procedure,
        // Non-procedures called like functions just yield themselves
        other => return Ok(other),
    };

    match procedure {
        Procedure::Native(func) => {
            let evaluated = evaluate_primitive_args(func, args, session)?;
            call_primitive(func, &evaluated, session)
        }
        Procedure::UserDefined(lambda) => {
            let evaluated = evaluate_sequence_elementwise(args, session)?;
            call_lambda(&lambda, &evaluated, session)
        }
    }
}

pub fn evaluate_sequence_elementwise(seq: &[Ast], session: &mut Session) -> Result<Vec<Value>> {
    seq.iter().map(|ast| EVAL(ast, session)).collect()
}

fn evaluate_primitive_args(
    func: &PrimitiveFn,
    args: &[Ast],
    session: &mut Session,
) -> Result<Vec<Value>> {
    args.iter()
        .enumerate()
        .map(|(position, ast)| match (func.literal_arg, ast.as_symbol()) {
            (Some(literal), Some(name)) if literal == position => Ok(Value::new_symbol(name)),
            _ => EVAL(ast, session),
        })
        .collect()
}

pub(crate) fn pretty_print_args(args: &[Value]) -> String {
    match args.len() {
        0 => "no args".into(),
        1 => args[0].to_string(),
        _ => format!("\n\t{}", args.iter().join("\n\t")),
    }
}

pub fn call_primitive(func: &PrimitiveFn, args: &[Value], session: &mut Session) -> Result {
    func.arity.validate_for(args.len(), func.name)?;
    log::trace!("Call {} with {}", func.name, pretty_print_args(args));
    let result = (func.fn_ptr)(session, args);
    match &result {
        Ok(val) => log::trace!("Call to {} resulted in {}", func.name, val),
        Err(e) => log::trace!("Call to {} failed: {}", func.name, e),
    }
    result
}

/// Parameters are written straight into the session environment and stay
/// there after the call returns, until the end-of-line reset.
pub fn call_lambda(lambda: &Lambda, args: &[Value], session: &mut Session) -> Result {
    log::trace!("Call {} with {}", lambda, pretty_print_args(args));
    lambda.arity().validate_for(args.len(), "lambda")?;
    for (name, value) in lambda.params.iter().zip(args) {
        session.env.define(name.as_str(), value.clone());
    }
    EVAL(&lambda.body, session)
}

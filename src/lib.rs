pub mod cmdline;
pub mod environment;
pub mod evaluator;
pub mod host;
pub mod interpreter;
pub mod printer;
pub mod reader;
pub mod special_forms;
pub mod types;

#[macro_use]
extern crate lazy_static;

mod core;
mod tokens;

pub use interpreter::{evaluate, load_file, Session};
pub use types::Value;

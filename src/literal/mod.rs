//! Object-Literal Text
//!
//! Turns the text a user pastes into the config editor into structured data,
//! and writes configs back out for the editor.
//!
//! Only literal syntax is understood (objects, arrays, strings, numbers,
//! booleans, null). Nothing in the input is ever evaluated.

mod lexer;
mod parser;
mod writer;

pub use parser::parse_object;
pub use writer::{editable_text, to_literal};

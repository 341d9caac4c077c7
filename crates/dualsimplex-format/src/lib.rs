pub mod file;
pub mod lexer;
pub mod parser;

pub use file::ProblemFile;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};

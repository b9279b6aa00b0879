pub mod keywords;
mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{CommentKind, IntBase, Keyword, LiteralKind, Punctuator, Span, Token, TokenKind};

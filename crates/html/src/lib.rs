mod outline;
mod tokenizer;
mod tree_builder;
mod types;

pub use crate::outline::outline;
pub use crate::tokenizer::tokenize;
pub use crate::tree_builder::{is_void_tag, parse};
pub use crate::types::{Node, Token};

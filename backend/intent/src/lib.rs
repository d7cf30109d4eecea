//! Natural-language query parsing.
//!
//! [`QueryParser`] turns instructions such as "enter Surya in Username" or
//! "click Edit in row #A-1042" into a structured [`pinpoint_core::Query`].

pub mod literal;
pub mod parser;
pub mod verbs;

pub use literal::LiteralMatch;
pub use parser::QueryParser;
pub use verbs::VerbTable;

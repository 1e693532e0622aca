pub mod error;
pub mod reader;
pub mod region;

pub use error::ParseError;

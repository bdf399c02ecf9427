pub mod logger;
pub mod parsing;

pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod scanner;

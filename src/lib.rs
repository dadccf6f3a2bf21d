pub mod board;
pub mod cli;
pub mod config;
pub mod session;

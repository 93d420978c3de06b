pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod controller;
pub mod output;
pub mod session;
pub mod source;
pub mod utils;

#[cfg(test)]
mod tests;

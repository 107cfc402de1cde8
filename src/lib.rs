//! # SQL Review Bot Library
//!
//! Slash-command SQL review: lint and auto-fix with sqlfluff, translate the
//! diagnostics, and deliver the result back to the chat out of band.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod delivery;
pub mod error;
pub mod intake;
pub mod linter;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
pub mod server;

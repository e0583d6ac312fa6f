//! orgtree: flat parent/child records rendered as a collapsible hierarchy tree
//!
//! Layers, innermost first:
//! - `domain`: records, the arena forest and its builder (no I/O)
//! - `application`: expansion state, renderer, memoized view, validation report
//! - `infrastructure`: record sources (file, stdin, demo)
//! - `cli`: argument parsing, command dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

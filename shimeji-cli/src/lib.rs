//! Shimeji CLI library.
//!
//! Splits the binary into testable pieces: argument parsing and command
//! execution under [`cli`], structured-logging initialisation under
//! [`logging`].

pub mod cli;
pub mod logging;

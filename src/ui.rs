//! Terminal status output.
//!
//! Every user-facing line goes through these helpers so the glyphs stay
//! consistent across the build phases:
//!
//! - `✓` success (green)
//! - `•` progress/info (cyan)
//! - `!` warning (yellow, stderr)
//! - `x` error (red, stderr)
//! - `>` trace (dimmed, only with `--verbose`)

use colored::*;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable trace output for the rest of the process.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn success(msg: impl Display) {
    println!("{} {}", "✓".green(), msg);
}

pub fn info(msg: impl Display) {
    println!("{} {}", "•".cyan(), msg);
}

pub fn warn(msg: impl Display) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn error(msg: impl Display) {
    eprintln!("{} {}", "x".red(), msg);
}

pub fn trace(msg: impl Display) {
    if is_verbose() {
        println!("{} {}", ">".dimmed(), msg.to_string().dimmed());
    }
}

/// Render a program and its arguments the way a shell would echo them.
pub fn display_command(program: &std::path::Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

//! User-facing console lines. Diagnostics go through `tracing` instead.

use std::fmt::Display;

pub fn info(message: impl Display) {
    println!("[INFO]\t{message}");
}

pub fn done(message: impl Display) {
    println!("[DONE]\t{message}");
}

pub fn warn(message: impl Display) {
    eprintln!("[WARN]\t{message}");
}

pub fn error(message: impl Display) {
    eprintln!("[ERROR]\t{message}");
}

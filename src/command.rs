//! Stdin command reader.
//!
//! The reference daemon polls stdin with a 1-microsecond `select()`
//! timeout each loop iteration. A background reader thread feeding an
//! mpsc channel gives the event loop the same non-blocking observable
//! behavior (a `try_recv()` never blocks) without needing raw fd
//! polling, and is the idiomatic Rust substitute spec.md §5 explicitly
//! permits.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread;

pub struct CommandReader {
    rx: Receiver<String>,
}

impl CommandReader {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    /// Returns the next pending command line, if any, without blocking.
    pub fn try_recv(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

/// `true` iff `line` is the shutdown command (the literal string
/// `exit`, optionally trailing whitespace/newline).
pub fn is_exit_command(line: &str) -> bool {
    line.trim_start().starts_with("exit")
}

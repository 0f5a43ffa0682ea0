//! Text commands sent to the emulator console and the replies it produces.
//!
//! Wire format (one command per line, `\n` terminated):
//! ```text
//! auth <token>
//! event send <type>:<code>:<value> [<type>:<code>:<value> ...]
//! ```
//!
//! # How is a touch expressed? (for beginners)
//!
//! The console injects raw Linux input events.  Each `<type>:<code>:<value>`
//! triple is one `struct input_event`:
//!
//! | Triple       | Meaning                          |
//! |--------------|----------------------------------|
//! | `3:0:X`      | `EV_ABS` / `ABS_X` = X           |
//! | `3:1:Y`      | `EV_ABS` / `ABS_Y` = Y           |
//! | `1:330:1`    | `EV_KEY` / `BTN_TOUCH` pressed   |
//! | `1:330:0`    | `EV_KEY` / `BTN_TOUCH` released  |
//! | `1:CODE:1`   | `EV_KEY` / key CODE pressed      |
//! | `0:0:0`      | `EV_SYN` / `SYN_REPORT`          |
//!
//! A touch-down therefore sets the absolute position, presses `BTN_TOUCH`,
//! and terminates the packet with a sync report.

use std::fmt;

use thiserror::Error;

use crate::keymap::LogicalKeyCode;

const EV_SYN: u16 = 0;
const EV_KEY: u16 = 1;
const EV_ABS: u16 = 3;
const ABS_X: u16 = 0;
const ABS_Y: u16 = 1;
const BTN_TOUCH: u16 = 330;

/// Default TCP port of the first emulator instance's console.
pub const DEFAULT_CONSOLE_PORT: u16 = 5554;

/// Longest reply line accepted before the decoder gives up on it.
pub const MAX_REPLY_LINE: usize = 4096;

/// Errors produced while decoding console replies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A reply line was not valid UTF-8.
    #[error("console reply is not valid UTF-8")]
    InvalidUtf8,

    /// A reply line exceeded [`MAX_REPLY_LINE`] bytes without a newline.
    #[error("console reply exceeds {limit} bytes without a line terminator")]
    LineTooLong { limit: usize },
}

/// A command written to the emulator console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Authenticates the connection with the token from
    /// `~/.emulator_console_auth_token`.
    Auth(String),
    /// Touch contact pressed at a position.
    TouchDown { x: i32, y: i32 },
    /// Touch contact released at a position.
    TouchUp { x: i32, y: i32 },
    /// Touch contact moved while pressed.
    TouchMove { x: i32, y: i32 },
    /// Key pressed.
    KeyDown(LogicalKeyCode),
    /// Key released.
    KeyUp(LogicalKeyCode),
}

struct Triple(u16, u32, i64);

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0, self.1, self.2)
    }
}

impl ConsoleCommand {
    /// Encodes the command as a single `\n`-terminated line.
    pub fn encode(&self) -> String {
        let mut line = match self {
            ConsoleCommand::Auth(token) => format!("auth {}", token.trim()),
            ConsoleCommand::TouchDown { x, y } => event_send(&[
                Triple(EV_ABS, ABS_X.into(), (*x).into()),
                Triple(EV_ABS, ABS_Y.into(), (*y).into()),
                Triple(EV_KEY, BTN_TOUCH.into(), 1),
                Triple(EV_SYN, 0, 0),
            ]),
            ConsoleCommand::TouchUp { x, y } => event_send(&[
                Triple(EV_ABS, ABS_X.into(), (*x).into()),
                Triple(EV_ABS, ABS_Y.into(), (*y).into()),
                Triple(EV_KEY, BTN_TOUCH.into(), 0),
                Triple(EV_SYN, 0, 0),
            ]),
            ConsoleCommand::TouchMove { x, y } => event_send(&[
                Triple(EV_ABS, ABS_X.into(), (*x).into()),
                Triple(EV_ABS, ABS_Y.into(), (*y).into()),
                Triple(EV_SYN, 0, 0),
            ]),
            ConsoleCommand::KeyDown(code) => event_send(&[Triple(EV_KEY, code.code(), 1)]),
            ConsoleCommand::KeyUp(code) => event_send(&[Triple(EV_KEY, code.code(), 0)]),
        };
        line.push('\n');
        line
    }
}

fn event_send(triples: &[Triple]) -> String {
    let mut line = String::from("event send");
    for triple in triples {
        line.push(' ');
        line.push_str(&triple.to_string());
    }
    line
}

/// A classified console reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleReply {
    /// The previous command succeeded.
    Ok,
    /// The previous command failed; carries the console's reason.
    Ko(String),
    /// Any other line: the connection banner, help text, auth hints.
    Info(String),
}

impl ConsoleReply {
    /// Classifies one reply line (without its terminator).
    pub fn parse(line: &str) -> ConsoleReply {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line == "OK" || line.starts_with("OK ") {
            ConsoleReply::Ok
        } else if let Some(reason) = line.strip_prefix("KO") {
            ConsoleReply::Ko(reason.trim_start_matches(':').trim().to_string())
        } else {
            ConsoleReply::Info(line.to_string())
        }
    }
}

/// Splits the inbound console byte stream into [`ConsoleReply`] lines.
#[derive(Debug, Default)]
pub struct ReplyDecoder {
    buf: Vec<u8>,
}

impl ReplyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the socket.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Returns the next complete reply, or `None` when no full line is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidUtf8`] for a line that is not UTF-8 (the
    /// line is discarded), and [`ProtocolError::LineTooLong`] when the buffer
    /// holds more than [`MAX_REPLY_LINE`] bytes without a terminator (the
    /// buffer is cleared).
    pub fn next_reply(&mut self) -> Option<Result<ConsoleReply, ProtocolError>> {
        match self.buf.iter().position(|b| *b == b'\n') {
            Some(end) => {
                let line: Vec<u8> = self.buf.drain(..=end).collect();
                Some(
                    std::str::from_utf8(&line)
                        .map(ConsoleReply::parse)
                        .map_err(|_| ProtocolError::InvalidUtf8),
                )
            }
            None if self.buf.len() > MAX_REPLY_LINE => {
                self.buf.clear();
                Some(Err(ProtocolError::LineTooLong {
                    limit: MAX_REPLY_LINE,
                }))
            }
            None => None,
        }
    }

    /// Bytes held that do not yet form a complete reply.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drops any partially received line, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

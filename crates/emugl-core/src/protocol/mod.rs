//! Emulator console wire protocol.
//!
//! Input reaches the guest through the emulator's text console: the harness
//! writes one command per line and the console answers every command with a
//! line starting with `OK` or `KO:`.  See [`console`] for the command set.

pub mod console;

pub use console::{ConsoleCommand, ConsoleReply, ProtocolError, ReplyDecoder};

//! Input sink implementations.
//!
//! - **`console`** – the emulator console client used in production.
//! - **`mock`** – a recording sink for tests.

pub mod console;
pub mod mock;

pub use console::{load_auth_token, ConsoleInputSink, ConsoleSinkConfig};

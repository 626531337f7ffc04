/// [`crate::osc::Message`] decoded from the console
mod from_console;
/// [`crate::osc::Message`] to the console
mod to_console;
/// Cue payload argument vector
pub mod records;
/// Active/pending text cascade
pub mod text;

pub use from_console::ConsoleEvent;
pub use to_console::ConsoleRequest;

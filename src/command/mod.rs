mod commands;
mod context;
mod history;

pub use commands::{AppliedCommand, Command};
pub use context::CommandContext;
pub use history::CommandHistory;

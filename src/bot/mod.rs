// Chat-facing side: command parsing and dispatch
pub mod commands;
pub mod dispatcher;

pub use commands::Command;
pub use dispatcher::Dispatcher;

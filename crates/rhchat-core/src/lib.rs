// Shared foundation for the HR assistant chat client: configuration, the
// conversation data model, channel messages between the session loop and the
// view, and the error taxonomy.

pub mod config;
pub mod error;
pub mod protocol;

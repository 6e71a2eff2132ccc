// Conversation state machine and the event loop that drives it.

pub mod app;
pub mod session;

#[cfg(test)]
mod test_support;

pub use session::{Session, SubquestionStage, Subquestions};

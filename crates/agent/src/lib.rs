//! The FactQuest assistant and its streaming turn runner.
//!
//! The assistant is a configuration, not logic: instructions, a model, and
//! the news tool. Whether a question is answered from the model's own
//! knowledge or through `news_search` is the model's call.

pub mod assistant;
pub mod relay;
pub mod stream_event;
pub mod turn_runner;

#[cfg(test)]
mod test_helpers;

pub use assistant::{WELCOME_MESSAGE, factquest_agent};
pub use relay::{TurnOutcome, relay_to_channel};
pub use stream_event::AgentStreamEvent;
pub use turn_runner::TurnRunner;

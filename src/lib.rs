//! Sentinel - conversational security-assistant core.
//!
//! The crate implements the stateful half of an interactive chat assistant:
//! the conversation session state machine, the append-only transcript it
//! guards, and the stateless client that exchanges that transcript with a
//! remote chat-completion service. The interactive surface itself stays
//! thin ([`repl`]) and delegates every transcript mutation to the session.

pub mod config;
pub mod credential;
pub mod llm;
pub mod persona;
pub mod repl;
pub mod session;

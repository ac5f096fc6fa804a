//! Terminal command surface
//!
//! Resolves textual commands to handlers and manages the
//! pending-asynchronous-task state machine. The byte-level transport
//! (USB CDC or serial framing) is a collaborator outside this crate's
//! scope; it feeds complete lines in and writes rendered results out.

pub mod commands;
pub mod dispatch;

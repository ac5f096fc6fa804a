//! Contactless Front-End Firmware Library
//!
//! Control plane of a battery-powered contactless-card front end that
//! emulates a family of card types, acts as an active reader of such
//! cards, or passively sniffs traffic between a card and a reader.
//! The active behavior is selected at runtime as a "mode": one codec
//! strategy (physical layer) bound to one application strategy
//! (protocol layer) plus fixed metadata.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Device Controller  │  Command Engine  │  Reader Ops         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    STRATEGY LAYER                            │
//! │  Codec (modulation)  │  Card Application (protocol)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 COLLABORATOR INTERFACES                      │
//! │  Antenna Load  │  Settings Store  │  System Control          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │     cooperative executive (embassy-rs on hardware)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Immutable registry, single mutable instance**: mode profiles
//!   are firmware-resident constants; the one live mode is produced
//!   only by the switch protocol
//! - **Type-driven design**: strategy construction and teardown
//!   ordering is enforced by the type system, not convention
//! - **No allocation**: bounded `heapless` buffers throughout
//! - **Explicit error handling**: all fallible operations return
//!   `Result`/`Option`; command errors are status values
//! - **Cooperative concurrency**: one execution context; blocking
//!   operations are modeled as polled pending tasks

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Mode Profile Registry
///
/// The immutable table of selectable modes.
pub mod profile;

/// Mode Strategies
///
/// Codec and application capability sets and their compiled-in
/// implementations.
pub mod strategy;

/// Device Controller
///
/// The single live mode instance, the switch protocol, and the
/// hardware collaborator interfaces.
pub mod device;

/// Reader Operations
///
/// Asynchronous card operations and the raw frame encoder.
pub mod reader;

/// Terminal Command Surface
///
/// Command table, dispatch engine, and pending-task state machine.
pub mod terminal;

/// Cooperative Executive
///
/// The per-iteration task/tick/poll scheduler loop.
pub mod scheduler;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}

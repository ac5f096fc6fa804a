//! Active reader operations
//!
//! Asynchronous card operations driven by the pending-task engine,
//! and the raw frame encoder for arbitrary-bit transmissions.

pub mod frame;
pub mod ops;

//! Mode strategies
//!
//! The two capability sets a mode binds together: the physical-layer
//! codec and the protocol/emulation application. Both are closed sets
//! fixed at build time, so each is a trait implemented by a tagged
//! union of the compiled-in variants.

pub mod application;
pub mod codec;

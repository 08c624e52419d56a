//! Refresh-token rotation module
//!
//! This module implements the rolling-token scheme:
//! - issuing a token pair at sign-in
//! - rotating a presented refresh token into a new pair
//! - detecting replay of an already-rotated token (theft signal)
//! - read-only validation and explicit revocation

mod engine;

#[cfg(test)]
mod tests;

pub use engine::RotationEngine;

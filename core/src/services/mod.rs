//! Business services containing domain logic and use cases.

pub mod minting;
pub mod rotation;

// Re-export commonly used types
pub use minting::{generate_opaque_token, TokenMinter, REFRESH_TOKEN_BYTES};
pub use rotation::RotationEngine;

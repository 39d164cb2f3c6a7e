//! Top-level facade crate for pagewire.
//!
//! Re-exports core types and the client library so users can depend on a single crate.

pub mod core {
    pub use pagewire_core::*;
}

pub mod client {
    pub use pagewire_client::*;
}

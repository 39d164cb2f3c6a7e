//! pagewire core: transport-agnostic interaction primitives and error types.
//!
//! This crate defines the response envelope every server reply is reduced to,
//! the request model the dispatcher sends, and the required-field validator.
//! It carries no runtime or DOM dependencies so the same contracts can back a
//! browser binding, a headless page, or test fixtures.
//!
//! # Failure surface
//! Nothing here panics: `unwrap`, `expect` and `panic!` are denied by clippy.
//! A reply that cannot be read becomes `PageWireError::Protocol`; an empty
//! required field becomes `PageWireError::Validation`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod validate;

pub use error::{FailureKind, PageWireError, Result};

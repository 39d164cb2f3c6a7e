//! Dispatcher module exports.
//!
//! Re-exports the dispatcher and the interaction model so downstream
//! consumers can depend on this module directly.

pub mod dispatcher;
pub mod interaction;

pub use dispatcher::Dispatcher;
pub use interaction::{Interaction, Outcome, VariantKind};

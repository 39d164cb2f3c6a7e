//! Binding registry: event category + element marker -> interaction variant.
//!
//! The table is plain data so it can be enumerated, extended from config,
//! and tested without a page.

mod registry;

pub use registry::{standard_bindings, Binding, BindingMode, BindingRegistry, EventCategory};

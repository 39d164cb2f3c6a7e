//! pagewire client library entry.
//!
//! This crate wires the binding registry, dispatcher, feedback presenter,
//! page seam, and HTTP transport into the interaction layer of a page. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod bindings;
pub mod config;
pub mod dispatch;
pub mod feedback;
pub mod obs;
pub mod page;
pub mod transport;

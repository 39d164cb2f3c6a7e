//! Protocol modules (reply envelope + outbound request model).
//!
//! - Envelope: the `{errcode, message, data}` reply every call is reduced to.
//! - Request: method, target, ordered form payload, required fields, redirect.
//!
//! Parsers are panic-free: a reply that cannot be normalized is reported as
//! `PageWireError::Protocol` instead of being read as an empty envelope.

pub mod envelope;
pub mod request;

pub use envelope::{normalize, RawReply, ResponseEnvelope};
pub use request::{resolve_target, FormPayload, InteractionRequest, Method};

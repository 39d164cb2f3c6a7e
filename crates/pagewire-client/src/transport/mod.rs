//! Transport layer (network seam).
//!
//! The dispatcher sends every asynchronous interaction through `Transport`
//! and gets back an un-normalized `RawReply`. Multipart submissions never
//! reach this layer; the page submits them natively.

mod http;

use async_trait::async_trait;

use pagewire_core::error::Result;
use pagewire_core::protocol::{InteractionRequest, RawReply};

pub use http::HttpTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request. `Err` means the call did not complete
    /// (`Transport`) or could not be built (`BadConfig` / `Internal`).
    async fn send(&self, req: &InteractionRequest) -> Result<RawReply>;
}

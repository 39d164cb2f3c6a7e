//! Test doubles shared by the client integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Duration;

use pagewire_client::app_state::ClientState;
use pagewire_client::config::ClientConfig;
use pagewire_client::feedback::{Severity, ToastOptions, ToastRenderer};
use pagewire_client::page::MemoryPage;
use pagewire_client::transport::Transport;
use pagewire_core::error::{PageWireError, Result};
use pagewire_core::protocol::{InteractionRequest, RawReply};

pub const LOCATION: &str = "http://docs.local/book/intro";

/// Canned reply for one target.
#[derive(Debug, Clone)]
pub enum Scripted {
    Json(Value),
    Text(String),
    Unreachable,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, (Scripted, Duration)>>,
    sent: Mutex<Vec<InteractionRequest>>,
}

impl ScriptedTransport {
    pub fn reply(&self, target: &str, reply: Scripted) {
        self.reply_after(target, reply, Duration::ZERO);
    }

    pub fn reply_after(&self, target: &str, reply: Scripted, delay: Duration) {
        self.routes
            .lock()
            .unwrap()
            .insert(target.to_string(), (reply, delay));
    }

    pub fn sent(&self) -> Vec<InteractionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, req: &InteractionRequest) -> Result<RawReply> {
        self.sent.lock().unwrap().push(req.clone());
        let route = self.routes.lock().unwrap().get(&req.target).cloned();
        let Some((reply, delay)) = route else {
            return Err(PageWireError::Transport(format!("no route for {}", req.target)));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Scripted::Json(v) => Ok(RawReply::Json(v)),
            Scripted::Text(s) => Ok(RawReply::Text(s)),
            Scripted::Unreachable => Err(PageWireError::Transport("connection refused".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timeout_ms: u64,
}

#[derive(Default)]
pub struct RecordingRenderer {
    shown: Mutex<Vec<Toast>>,
    dismissed: Mutex<Vec<u64>>,
}

impl RecordingRenderer {
    pub fn shown(&self) -> Vec<Toast> {
        self.shown.lock().unwrap().clone()
    }

    pub fn dismissed(&self) -> Vec<u64> {
        self.dismissed.lock().unwrap().clone()
    }
}

impl ToastRenderer for RecordingRenderer {
    fn show(&self, id: u64, title: &str, message: &str, severity: Severity, opts: &ToastOptions) {
        assert!(opts.stack, "toasts must stack");
        self.shown.lock().unwrap().push(Toast {
            id,
            title: title.to_string(),
            message: message.to_string(),
            severity,
            timeout_ms: opts.timeout_ms,
        });
    }

    fn dismiss(&self, id: u64) {
        self.dismissed.lock().unwrap().push(id);
    }
}

pub struct Harness {
    pub state: ClientState,
    pub page: Arc<MemoryPage>,
    pub transport: Arc<ScriptedTransport>,
    pub toasts: Arc<RecordingRenderer>,
}

pub fn harness(page: MemoryPage) -> Harness {
    harness_with(ClientConfig::default(), page)
}

pub fn harness_with(cfg: ClientConfig, page: MemoryPage) -> Harness {
    let page = Arc::new(page);
    let transport = Arc::new(ScriptedTransport::default());
    let toasts = Arc::new(RecordingRenderer::default());
    let state = ClientState::new(cfg, page.clone(), transport.clone(), toasts.clone()).unwrap();
    state.ready();
    Harness {
        state,
        page,
        transport,
        toasts,
    }
}

/// Let spawned timer tasks run after the clock moved.
pub async fn run_pending() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

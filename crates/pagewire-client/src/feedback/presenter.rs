use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

use pagewire_core::error::{PageWireError, Result};

use crate::config::FeedbackSection;
use crate::obs::metrics::ClientMetrics;
use crate::page::Page;

use super::{NotificationStack, ToastOptions, ToastRenderer};

/// Outcome class of a notification; the only input to its visual treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Failure,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Failure => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "fa-check-circle",
            Severity::Failure => "fa-times-circle",
        }
    }
}

/// What to show, for how long, and where to go afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub severity: Severity,
    pub text: String,
    pub duration_ms: u64,
    /// Navigation fired `duration_ms` after presentation, dismissed or not.
    pub on_dismiss_navigate_to: Option<String>,
}

impl FeedbackEvent {
    pub fn success(text: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
            duration_ms,
            on_dismiss_navigate_to: None,
        }
    }

    pub fn failure(text: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            severity: Severity::Failure,
            text: text.into(),
            duration_ms,
            on_dismiss_navigate_to: None,
        }
    }

    pub fn navigate_to(mut self, url: impl Into<String>) -> Self {
        self.on_dismiss_navigate_to = Some(url.into());
        self
    }
}

/// Handle returned for each presented event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    pub toast_id: u64,
    pub navigation: Option<String>,
}

pub struct FeedbackPresenter {
    renderer: Arc<dyn ToastRenderer>,
    page: Arc<dyn Page>,
    stack: Arc<NotificationStack>,
    success_title: String,
    failure_title: String,
    timers: Mutex<Vec<JoinHandle<()>>>,
    runtime: Handle,
    metrics: Arc<ClientMetrics>,
}

impl FeedbackPresenter {
    /// Timers run on the tokio runtime current at construction; building a
    /// presenter outside one is an `Internal` error.
    pub fn new(
        cfg: &FeedbackSection,
        renderer: Arc<dyn ToastRenderer>,
        page: Arc<dyn Page>,
        metrics: Arc<ClientMetrics>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            PageWireError::Internal(format!("feedback presenter needs a tokio runtime: {e}"))
        })?;
        Ok(Self {
            renderer,
            page,
            stack: Arc::new(NotificationStack::new()),
            success_title: cfg.success_title.clone(),
            failure_title: cfg.failure_title.clone(),
            timers: Mutex::new(Vec::new()),
            runtime,
            metrics,
        })
    }

    pub fn stack(&self) -> &NotificationStack {
        &self.stack
    }

    /// Render the toast and schedule its expiry and (optional) navigation.
    pub fn present(&self, ev: FeedbackEvent) -> Presented {
        let duration = Duration::from_millis(ev.duration_ms);
        let title = match ev.severity {
            Severity::Success => &self.success_title,
            Severity::Failure => &self.failure_title,
        };

        let id = self
            .stack
            .push(ev.severity, ev.text.clone(), Instant::now() + duration);
        let opts = ToastOptions::for_severity(ev.severity, ev.duration_ms);
        self.renderer.show(id, title, &ev.text, ev.severity, &opts);
        self.metrics
            .notifications
            .inc(&[("severity", ev.severity.as_str())]);

        let stack = Arc::clone(&self.stack);
        let renderer = Arc::clone(&self.renderer);
        let expiry = self.runtime.spawn(async move {
            sleep(duration).await;
            if stack.remove(id) {
                renderer.dismiss(id);
            }
        });
        self.track(expiry);

        if let Some(url) = ev.on_dismiss_navigate_to.clone() {
            let page = Arc::clone(&self.page);
            let metrics = Arc::clone(&self.metrics);
            let nav = self.runtime.spawn(async move {
                sleep(duration).await;
                tracing::debug!(%url, "delayed navigation");
                metrics.navigations.inc(&[("mode", "delayed")]);
                page.navigate(&url);
            });
            self.track(nav);
        }

        Presented {
            toast_id: id,
            navigation: ev.on_dismiss_navigate_to,
        }
    }

    /// Manual dismissal (close button). Scheduled navigation still fires.
    pub fn dismiss(&self, id: u64) -> bool {
        if self.stack.remove(id) {
            self.renderer.dismiss(id);
            true
        } else {
            false
        }
    }

    /// Wait until every scheduled expiry and navigation has fired.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = match self.timers.lock() {
                Ok(mut t) => t.drain(..).collect(),
                Err(_) => Vec::new(),
            };
            if pending.is_empty() {
                break;
            }
            for res in join_all(pending).await {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "feedback timer task failed");
                }
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut t) = self.timers.lock() {
            t.retain(|h| !h.is_finished());
            t.push(handle);
        }
    }
}

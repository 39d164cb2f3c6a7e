use super::Severity;

/// Rendering options handed to the toast collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastOptions {
    /// New toasts stack below visible ones instead of replacing them.
    pub stack: bool,
    pub icon: &'static str,
    pub has_close_btn: bool,
    pub timeout_ms: u64,
    pub sticky: bool,
    pub has_progress: bool,
}

impl ToastOptions {
    pub fn for_severity(severity: Severity, timeout_ms: u64) -> Self {
        Self {
            stack: true,
            icon: severity.icon(),
            has_close_btn: true,
            timeout_ms,
            sticky: false,
            has_progress: true,
        }
    }
}

/// Presentation collaborator. Owns no control flow.
pub trait ToastRenderer: Send + Sync {
    fn show(&self, id: u64, title: &str, message: &str, severity: Severity, opts: &ToastOptions);
    fn dismiss(&self, id: u64);
}

/// Renderer that only logs; used by the headless binary.
#[derive(Default)]
pub struct TracingToastRenderer;

impl ToastRenderer for TracingToastRenderer {
    fn show(&self, id: u64, title: &str, message: &str, severity: Severity, opts: &ToastOptions) {
        match severity {
            Severity::Success => {
                tracing::info!(id, title, message, timeout_ms = opts.timeout_ms, "toast")
            }
            Severity::Failure => {
                tracing::warn!(id, title, message, timeout_ms = opts.timeout_ms, "toast")
            }
        }
    }

    fn dismiss(&self, id: u64) {
        tracing::debug!(id, "toast dismissed");
    }
}

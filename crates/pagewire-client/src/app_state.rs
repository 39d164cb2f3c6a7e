//! Shared client state: wires config, page, transport, presenter,
//! dispatcher, and binding registry together.

use std::sync::Arc;

use pagewire_core::error::Result;

use crate::bindings::{BindingRegistry, EventCategory};
use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, Outcome};
use crate::feedback::{FeedbackPresenter, ToastRenderer};
use crate::obs::metrics::ClientMetrics;
use crate::page::Page;
use crate::transport::Transport;

#[derive(Clone)]
pub struct ClientState {
    cfg: Arc<ClientConfig>,
    page: Arc<dyn Page>,
    registry: Arc<BindingRegistry>,
    dispatcher: Arc<Dispatcher>,
    presenter: Arc<FeedbackPresenter>,
    metrics: Arc<ClientMetrics>,
}

impl ClientState {
    /// Build client state. Config is validated again so hand-built configs
    /// get the same checks as loaded ones. Must be called from within a
    /// tokio runtime, which then drives the feedback timers.
    pub fn new(
        cfg: ClientConfig,
        page: Arc<dyn Page>,
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn ToastRenderer>,
    ) -> Result<Self> {
        cfg.validate()?;
        let cfg = Arc::new(cfg);
        let metrics = Arc::new(ClientMetrics::default());

        let presenter = Arc::new(FeedbackPresenter::new(
            &cfg.feedback,
            renderer,
            Arc::clone(&page),
            Arc::clone(&metrics),
        )?);

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&cfg),
            Arc::clone(&page),
            transport,
            Arc::clone(&presenter),
            Arc::clone(&metrics),
        ));

        let registry = Arc::new(BindingRegistry::with_config(&cfg.bindings));

        Ok(Self {
            cfg,
            page,
            registry,
            dispatcher,
            presenter,
            metrics,
        })
    }

    /// Page-ready hook: snapshot direct bindings.
    pub fn ready(&self) -> usize {
        self.registry.bind_ready(self.page.as_ref())
    }

    /// Resolve and dispatch one DOM event. `Ok(None)` when no binding applies.
    pub async fn handle_event(&self, category: EventCategory, element_id: &str) -> Result<Option<Outcome>> {
        let Some(interaction) = self.registry.resolve(self.page.as_ref(), category, element_id)? else {
            tracing::debug!(category = category.as_str(), element = element_id, "no binding");
            return Ok(None);
        };
        self.dispatcher.dispatch(interaction).await.map(Some)
    }

    pub fn cfg(&self) -> &ClientConfig {
        &self.cfg
    }

    pub fn page(&self) -> Arc<dyn Page> {
        Arc::clone(&self.page)
    }

    pub fn registry(&self) -> Arc<BindingRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn presenter(&self) -> Arc<FeedbackPresenter> {
        Arc::clone(&self.presenter)
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }
}

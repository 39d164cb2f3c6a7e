use std::sync::Arc;

use tokio::time::Instant;
use tracing::Instrument;

use pagewire_core::error::{FailureKind, PageWireError, Result};
use pagewire_core::protocol::{normalize, FormPayload, InteractionRequest, Method, ResponseEnvelope};
use pagewire_core::validate::require_all;

use crate::config::ClientConfig;
use crate::feedback::{FeedbackEvent, FeedbackPresenter};
use crate::obs::metrics::ClientMetrics;
use crate::page::{FavoriteState, Page};
use crate::transport::Transport;

use super::{Interaction, Outcome, VariantKind};

/// Drives one interaction from trigger to terminal feedback.
///
/// Interaction failures (protocol, application, transport) end at the
/// presenter and come back as `Outcome::Failed`; `Err` is reserved for
/// wiring problems such as an event naming an element the page lacks.
pub struct Dispatcher {
    page: Arc<dyn Page>,
    transport: Arc<dyn Transport>,
    presenter: Arc<FeedbackPresenter>,
    cfg: Arc<ClientConfig>,
    metrics: Arc<ClientMetrics>,
}

impl Dispatcher {
    pub fn new(
        cfg: Arc<ClientConfig>,
        page: Arc<dyn Page>,
        transport: Arc<dyn Transport>,
        presenter: Arc<FeedbackPresenter>,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            page,
            transport,
            presenter,
            cfg,
            metrics,
        }
    }

    pub async fn dispatch(&self, interaction: Interaction) -> Result<Outcome> {
        let variant = interaction.variant();
        let span = tracing::info_span!(
            "interaction",
            variant = variant.as_str(),
            element = interaction.element(),
            target = tracing::field::Empty
        );

        let res = self.run(variant, interaction).instrument(span).await;

        match &res {
            Ok(outcome) => {
                tracing::debug!(variant = variant.as_str(), outcome = outcome.as_str(), "interaction done");
                self.metrics
                    .interactions
                    .inc(&[("variant", variant.as_str()), ("outcome", outcome.as_str())]);
                if let Outcome::Failed(kind) = outcome {
                    self.metrics
                        .failures
                        .inc(&[("variant", variant.as_str()), ("kind", kind.as_str())]);
                }
            }
            Err(e) => {
                tracing::warn!(variant = variant.as_str(), error = %e, "interaction not dispatched");
            }
        }
        res
    }

    async fn run(&self, variant: VariantKind, interaction: Interaction) -> Result<Outcome> {
        match interaction {
            Interaction::FireAndReport { target, .. } => Ok(self.fire_and_report(variant, target).await),
            Interaction::ConfirmGated { target, .. } => {
                if !self.page.confirm(&self.cfg.client.confirm_prompt) {
                    tracing::debug!("confirmation declined");
                    return Ok(Outcome::Declined);
                }
                Ok(self.fire_and_report(variant, target).await)
            }
            Interaction::FieldUpdate {
                element,
                field,
                target,
                method,
            } => self.field_update(variant, element, field, target, method).await,
            Interaction::FormSubmit { form, button } => self.form_submit(variant, form, button).await,
            Interaction::FavoriteToggle { element, target } => {
                Ok(self.favorite_toggle(variant, element, target).await)
            }
            Interaction::Download { target, .. } => Ok(self.download(variant, target).await),
            Interaction::Rating {
                element,
                target,
                score,
                marker,
            } => Ok(self.rating(variant, element, target, score, marker).await),
        }
    }

    async fn fire_and_report(&self, variant: VariantKind, target: String) -> Outcome {
        let req = InteractionRequest::new(Method::Get, target, self.page.location());
        match self.exchange(variant, &req).await {
            Ok(env) => self.succeed(&env, self.cfg.feedback.success_ms, Some(req.redirect)),
            Err(e) => self.fail(e),
        }
    }

    async fn field_update(
        &self,
        variant: VariantKind,
        element: String,
        field: String,
        target: String,
        method: Method,
    ) -> Result<Outcome> {
        let el = self
            .page
            .element(&element)
            .ok_or_else(|| PageWireError::UnknownElement(element.clone()))?;

        // Captured now: a sibling edit completing first must not change what
        // this interaction restores.
        let known_good = el.known_good().map(str::to_string);
        let value = el.value.trim().to_string();

        let payload = FormPayload::new().with("field", field).with("value", value.clone());
        let req = InteractionRequest::new(method, target, self.page.location()).with_payload(payload);

        match self.exchange(variant, &req).await {
            Ok(env) => {
                self.page.commit_value(&element, &value);
                Ok(self.succeed(&env, self.cfg.feedback.success_ms, None))
            }
            Err(e) => {
                match &known_good {
                    Some(prior) => {
                        tracing::debug!(%element, restored = %prior, "rolling back field");
                        self.page.set_value(&element, prior);
                    }
                    None => tracing::warn!(%element, "no known-good value recorded, field left as is"),
                }
                Ok(self.fail(e))
            }
        }
    }

    async fn form_submit(&self, variant: VariantKind, form: String, button: String) -> Result<Outcome> {
        let form_el = self
            .page
            .element(&form)
            .ok_or_else(|| PageWireError::UnknownElement(form.clone()))?;
        let fields = self.page.form_fields(&form);

        let required: Vec<(&str, &str)> = fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| (f.id.as_str(), f.value.as_str()))
            .collect();

        match require_all(required.iter().copied()) {
            Ok(()) => {}
            Err(PageWireError::Validation { field }) => {
                tracing::debug!(%field, "required field empty");
                self.page.focus(&field);
                return Ok(Outcome::Blocked { field });
            }
            Err(e) => return Err(e),
        }

        let method = Method::from_form(form_el.get_attr("method"), form_el.get_attr("enctype"));
        if method == Method::Multipart {
            let frame = self.cfg.client.hidden_frame.clone();
            tracing::info!(%form, %frame, "multipart form handed to page");
            self.page.submit_to_frame(&form, &frame);
            return Ok(Outcome::HandedOff { frame });
        }

        let payload: FormPayload = fields
            .iter()
            .filter(|f| !matches!(f.get_attr("type"), Some("submit") | Some("button")))
            .filter_map(|f| f.get_attr("name").map(|n| (n.to_string(), f.value.clone())))
            .collect();
        let redirect = form_el
            .get_attr("data-url")
            .map(str::to_string)
            .unwrap_or_else(|| self.page.location());
        let target = form_el
            .get_attr("action")
            .map(str::to_string)
            .unwrap_or_else(|| self.page.location());

        let req = InteractionRequest::new(method, target, redirect)
            .with_payload(payload)
            .with_required(required.iter().map(|(id, _)| id.to_string()).collect());

        self.page.set_busy(&button, true);
        let res = self.exchange(variant, &req).await;
        self.page.set_busy(&button, false);

        Ok(match res {
            Ok(env) => self.succeed(&env, self.cfg.feedback.form_success_ms, Some(req.redirect)),
            Err(e) => self.fail(e),
        })
    }

    async fn favorite_toggle(&self, variant: VariantKind, element: String, target: String) -> Outcome {
        let req = InteractionRequest::new(Method::Get, target, self.page.location());
        match self.exchange(variant, &req).await {
            Ok(env) => {
                let state = if env.is_cancel() {
                    FavoriteState::NotFavorited
                } else {
                    FavoriteState::Favorited
                };
                self.page.set_favorite(&element, state);
                self.succeed(&env, self.cfg.feedback.success_ms, None)
            }
            Err(e) => self.fail(e),
        }
    }

    async fn download(&self, variant: VariantKind, target: String) -> Outcome {
        let req = InteractionRequest::new(Method::Get, target, self.page.location());
        let env = match self.exchange(variant, &req).await {
            Ok(env) => env,
            Err(e) => return self.fail(e),
        };
        let Some(url) = env.redirect_url().map(str::to_string) else {
            return self.fail(PageWireError::Protocol("download reply carries no data.url".into()));
        };

        self.succeed(&env, self.cfg.feedback.success_ms, None);
        self.metrics.navigations.inc(&[("mode", "immediate")]);
        self.page.navigate(&url);
        Outcome::Succeeded { navigate_to: Some(url) }
    }

    async fn rating(
        &self,
        variant: VariantKind,
        element: String,
        target: String,
        score: String,
        marker: String,
    ) -> Outcome {
        let req = InteractionRequest::new(Method::Get, target, self.page.location())
            .with_payload(FormPayload::new().with("score", score));
        match self.exchange(variant, &req).await {
            Ok(env) => {
                self.page.remove_class(&element, &marker);
                self.succeed(&env, self.cfg.feedback.success_ms, None)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Send, then normalize; nonzero `errcode` becomes `Application`.
    async fn exchange(&self, variant: VariantKind, req: &InteractionRequest) -> Result<ResponseEnvelope> {
        tracing::Span::current().record("target", req.target.as_str());
        let labels = [("variant", variant.as_str())];
        self.metrics.in_flight.inc(&labels);
        let started = Instant::now();

        let res = match self.transport.send(req).await {
            Ok(raw) => normalize(raw).and_then(ResponseEnvelope::into_result),
            Err(e) => Err(e),
        };

        self.metrics.in_flight.dec(&labels);
        self.metrics.dispatch_duration.observe(&labels, started.elapsed());
        res
    }

    fn succeed(&self, env: &ResponseEnvelope, duration_ms: u64, navigate_to: Option<String>) -> Outcome {
        let text = if env.message.trim().is_empty() {
            self.cfg.messages.empty_success.clone()
        } else {
            env.message.clone()
        };
        let mut ev = FeedbackEvent::success(text, duration_ms);
        if let Some(url) = &navigate_to {
            ev = ev.navigate_to(url.clone());
        }
        self.presenter.present(ev);
        Outcome::Succeeded { navigate_to }
    }

    fn fail(&self, err: PageWireError) -> Outcome {
        let kind = err.kind();
        let msgs = &self.cfg.messages;
        let text = match &err {
            PageWireError::Application { message, .. } if !message.trim().is_empty() => message.clone(),
            PageWireError::Protocol(_) => msgs.protocol_fallback.clone(),
            PageWireError::Transport(_) => msgs.transport_fallback.clone(),
            _ => msgs.empty_failure.clone(),
        };

        match kind {
            FailureKind::Application => {
                tracing::info!(kind = kind.as_str(), error = %err, "server rejected interaction")
            }
            _ => tracing::warn!(kind = kind.as_str(), error = %err, "interaction failed"),
        }

        self.presenter
            .present(FeedbackEvent::failure(text, self.cfg.feedback.failure_ms));
        Outcome::Failed(kind)
    }
}

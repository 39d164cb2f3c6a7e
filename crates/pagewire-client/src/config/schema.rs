use serde::Deserialize;
use url::Url;

use pagewire_core::error::{PageWireError, Result};

use crate::bindings::EventCategory;
use crate::dispatch::VariantKind;

const DURATION_RANGE_MS: std::ops::RangeInclusive<u64> = 500..=60_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub feedback: FeedbackSection,

    #[serde(default)]
    pub messages: MessagesSection,

    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PageWireError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.client.validate()?;
        self.feedback.validate()?;

        for (i, b) in self.bindings.iter().enumerate() {
            let marker = b.marker.trim();
            if marker.is_empty() {
                return Err(PageWireError::BadConfig(format!(
                    "binding for {} has an empty marker",
                    b.variant.as_str()
                )));
            }
            if self.bindings[..i]
                .iter()
                .any(|o| o.category == b.category && o.marker.trim() == marker)
            {
                return Err(PageWireError::BadConfig(format!(
                    "duplicate binding for {} on marker {marker}",
                    b.category.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Base URL relative targets are joined onto.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.client.base_url)
            .map_err(|e| PageWireError::BadConfig(format!("client.base_url invalid: {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            client: ClientSection::default(),
            feedback: FeedbackSection::default(),
            messages: MessagesSection::default(),
            bindings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_confirm_prompt")]
    pub confirm_prompt: String,

    /// Frame multipart forms are submitted into.
    #[serde(default = "default_hidden_frame")]
    pub hidden_frame: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            confirm_prompt: default_confirm_prompt(),
            hidden_frame: default_hidden_frame(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| PageWireError::BadConfig(format!("client.base_url invalid: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(PageWireError::BadConfig(
                "client.base_url must be an absolute http(s) URL".into(),
            ));
        }
        if self.hidden_frame.trim().is_empty() {
            return Err(PageWireError::BadConfig(
                "client.hidden_frame must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8181/".into()
}
fn default_confirm_prompt() -> String {
    "Are you sure you want to perform this action?".into()
}
fn default_hidden_frame() -> String {
    "notarget".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackSection {
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,

    /// Form submissions redirect sooner than other successes.
    #[serde(default = "default_form_success_ms")]
    pub form_success_ms: u64,

    #[serde(default = "default_failure_ms")]
    pub failure_ms: u64,

    #[serde(default = "default_success_title")]
    pub success_title: String,

    #[serde(default = "default_failure_title")]
    pub failure_title: String,
}

impl Default for FeedbackSection {
    fn default() -> Self {
        Self {
            success_ms: default_success_ms(),
            form_success_ms: default_form_success_ms(),
            failure_ms: default_failure_ms(),
            success_title: default_success_title(),
            failure_title: default_failure_title(),
        }
    }
}

impl FeedbackSection {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("feedback.success_ms", self.success_ms),
            ("feedback.form_success_ms", self.form_success_ms),
            ("feedback.failure_ms", self.failure_ms),
        ] {
            if !DURATION_RANGE_MS.contains(&v) {
                return Err(PageWireError::BadConfig(format!(
                    "{name} must be between 500 and 60000"
                )));
            }
        }
        Ok(())
    }
}

fn default_success_ms() -> u64 {
    3000
}
fn default_form_success_ms() -> u64 {
    2000
}
fn default_failure_ms() -> u64 {
    3000
}
fn default_success_title() -> String {
    "Success".into()
}
fn default_failure_title() -> String {
    "Error".into()
}

/// Fallback texts for failures that carry no server message.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesSection {
    #[serde(default = "default_transport_fallback")]
    pub transport_fallback: String,

    #[serde(default = "default_protocol_fallback")]
    pub protocol_fallback: String,

    #[serde(default = "default_empty_success")]
    pub empty_success: String,

    #[serde(default = "default_empty_failure")]
    pub empty_failure: String,
}

impl Default for MessagesSection {
    fn default() -> Self {
        Self {
            transport_fallback: default_transport_fallback(),
            protocol_fallback: default_protocol_fallback(),
            empty_success: default_empty_success(),
            empty_failure: default_empty_failure(),
        }
    }
}

fn default_transport_fallback() -> String {
    "Network error, please try again later".into()
}
fn default_protocol_fallback() -> String {
    "Unexpected server response".into()
}
fn default_empty_success() -> String {
    "Operation succeeded".into()
}
fn default_empty_failure() -> String {
    "Operation failed".into()
}

/// Extra binding row: `{ category, marker, variant, delegated? }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    pub category: EventCategory,
    pub marker: String,
    pub variant: VariantKind,
    #[serde(default)]
    pub delegated: bool,
}

use serde::Deserialize;

use pagewire_core::error::FailureKind;
use pagewire_core::protocol::Method;

/// Interaction pattern a binding resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    FireAndReport,
    ConfirmGated,
    FieldUpdate,
    FormSubmit,
    FavoriteToggle,
    Download,
    Rating,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::FireAndReport => "fire_and_report",
            VariantKind::ConfirmGated => "confirm_gated",
            VariantKind::FieldUpdate => "field_update",
            VariantKind::FormSubmit => "form_submit",
            VariantKind::FavoriteToggle => "favorite_toggle",
            VariantKind::Download => "download",
            VariantKind::Rating => "rating",
        }
    }
}

/// A resolved trigger, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// GET `target`; success reloads the current page after the toast.
    FireAndReport { element: String, target: String },
    /// As `FireAndReport`, behind a confirmation prompt.
    ConfirmGated { element: String, target: String },
    /// Send `field`/`value` for one input; roll back on failure.
    FieldUpdate {
        element: String,
        field: String,
        target: String,
        method: Method,
    },
    /// Validate and submit the form owning `button`.
    FormSubmit { form: String, button: String },
    /// GET `target`; flip the favorite marker from `data.IsCancel`.
    FavoriteToggle { element: String, target: String },
    /// GET `target`; navigate straight to `data.url`.
    Download { element: String, target: String },
    /// GET `target` with `score`; once accepted, `marker` is removed so the
    /// widget stops resolving as a rating target.
    Rating {
        element: String,
        target: String,
        score: String,
        marker: String,
    },
}

impl Interaction {
    pub fn variant(&self) -> VariantKind {
        match self {
            Interaction::FireAndReport { .. } => VariantKind::FireAndReport,
            Interaction::ConfirmGated { .. } => VariantKind::ConfirmGated,
            Interaction::FieldUpdate { .. } => VariantKind::FieldUpdate,
            Interaction::FormSubmit { .. } => VariantKind::FormSubmit,
            Interaction::FavoriteToggle { .. } => VariantKind::FavoriteToggle,
            Interaction::Download { .. } => VariantKind::Download,
            Interaction::Rating { .. } => VariantKind::Rating,
        }
    }

    /// Element the interaction was triggered from.
    pub fn element(&self) -> &str {
        match self {
            Interaction::FireAndReport { element, .. }
            | Interaction::ConfirmGated { element, .. }
            | Interaction::FieldUpdate { element, .. }
            | Interaction::FavoriteToggle { element, .. }
            | Interaction::Download { element, .. }
            | Interaction::Rating { element, .. } => element,
            Interaction::FormSubmit { button, .. } => button,
        }
    }
}

/// Terminal state of one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Success feedback shown; `navigate_to` is the scheduled (or, for
    /// downloads, immediate) navigation.
    Succeeded { navigate_to: Option<String> },
    /// Failure feedback shown.
    Failed(FailureKind),
    /// A required field was empty; focus moved there, nothing sent.
    Blocked { field: String },
    /// Confirmation declined; nothing sent, nothing shown.
    Declined,
    /// Multipart form handed to the page for native submission.
    HandedOff { frame: String },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded { .. } => "succeeded",
            Outcome::Failed(_) => "failed",
            Outcome::Blocked { .. } => "blocked",
            Outcome::Declined => "declined",
            Outcome::HandedOff { .. } => "handed_off",
        }
    }
}

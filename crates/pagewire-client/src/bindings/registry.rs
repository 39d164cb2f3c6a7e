use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::{DashMap, DashSet};
use serde::Deserialize;

use pagewire_core::error::{PageWireError, Result};
use pagewire_core::protocol::Method;

use crate::config::BindingConfig;
use crate::dispatch::{Interaction, VariantKind};
use crate::page::{ElementSpec, Page};

/// DOM event category a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Click,
    Change,
    /// Submit-button click; the marker is matched on the owning form.
    Submit,
}

impl EventCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Click => "click",
            EventCategory::Change => "change",
            EventCategory::Submit => "submit",
        }
    }
}

impl FromStr for EventCategory {
    type Err = PageWireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "click" => Ok(EventCategory::Click),
            "change" => Ok(EventCategory::Change),
            "submit" => Ok(EventCategory::Submit),
            other => Err(PageWireError::BadConfig(format!("unknown event category: {other}"))),
        }
    }
}

/// How a binding finds its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Matched at event time; covers elements inserted after ready.
    Delegated,
    /// Only elements present when `bind_ready` ran.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub category: EventCategory,
    pub marker: String,
    pub variant: VariantKind,
    pub mode: BindingMode,
}

impl Binding {
    pub fn new(category: EventCategory, marker: &str, variant: VariantKind, mode: BindingMode) -> Self {
        Self {
            category,
            marker: marker.to_string(),
            variant,
            mode,
        }
    }
}

impl From<&BindingConfig> for Binding {
    fn from(c: &BindingConfig) -> Self {
        let mode = if c.delegated { BindingMode::Delegated } else { BindingMode::Direct };
        Binding::new(c.category, c.marker.trim(), c.variant, mode)
    }
}

/// The page script's standard table.
pub fn standard_bindings() -> Vec<Binding> {
    use BindingMode::*;
    use EventCategory::*;
    vec![
        Binding::new(Click, "ajax-get", VariantKind::FireAndReport, Delegated),
        Binding::new(Click, "ajax-star", VariantKind::FavoriteToggle, Direct),
        Binding::new(Click, "btn-filedown", VariantKind::Download, Direct),
        Binding::new(Click, "rating", VariantKind::Rating, Direct),
        Binding::new(Change, "change-update", VariantKind::FieldUpdate, Direct),
        Binding::new(Submit, "ajax-form", VariantKind::FormSubmit, Direct),
    ]
}

/// Resolves events to interactions. Rows are tried in order; first match wins.
pub struct BindingRegistry {
    bindings: Vec<Binding>,
    /// binding index -> element ids captured at ready (direct rows only).
    bound: DashMap<usize, DashSet<String>>,
    ready: AtomicBool,
}

impl BindingRegistry {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            bound: DashMap::new(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn standard() -> Self {
        Self::new(standard_bindings())
    }

    /// Standard table with config rows applied. A config row with the same
    /// category and marker as a standard row replaces it in place; any other
    /// row is appended.
    pub fn with_config(extra: &[BindingConfig]) -> Self {
        let mut rows = standard_bindings();
        for c in extra {
            let b = Binding::from(c);
            match rows
                .iter_mut()
                .find(|r| r.category == b.category && r.marker == b.marker)
            {
                Some(slot) => {
                    tracing::info!(
                        category = b.category.as_str(),
                        marker = %b.marker,
                        from = slot.variant.as_str(),
                        to = b.variant.as_str(),
                        "binding overridden by config"
                    );
                    *slot = b;
                }
                None => rows.push(b),
            }
        }
        Self::new(rows)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Capture elements for direct rows. Returns how many were bound.
    /// Calling again re-snapshots the page.
    pub fn bind_ready(&self, page: &dyn Page) -> usize {
        let elements = page.elements();
        let mut total = 0;

        for (idx, b) in self.bindings.iter().enumerate() {
            if b.mode != BindingMode::Direct {
                continue;
            }
            let set = DashSet::new();
            for el in elements.iter().filter(|e| e.has_class(&b.marker)) {
                set.insert(el.id.clone());
            }
            if set.is_empty() {
                tracing::debug!(marker = %b.marker, "direct binding matched no elements");
            }
            total += set.len();
            self.bound.insert(idx, set);
        }

        self.ready.store(true, Ordering::Release);
        tracing::info!(bound = total, rows = self.bindings.len(), "bindings ready");
        total
    }

    /// Resolve an event on `element_id`. `Ok(None)` means no row applies.
    pub fn resolve(
        &self,
        page: &dyn Page,
        category: EventCategory,
        element_id: &str,
    ) -> Result<Option<Interaction>> {
        let el = page
            .element(element_id)
            .ok_or_else(|| PageWireError::UnknownElement(element_id.to_string()))?;

        let subject = match (category, el.form.as_deref()) {
            (EventCategory::Submit, Some(form_id)) => page
                .element(form_id)
                .ok_or_else(|| PageWireError::UnknownElement(form_id.to_string()))?,
            _ => el.clone(),
        };

        for (idx, b) in self.bindings.iter().enumerate() {
            if b.category != category || !subject.has_class(&b.marker) {
                continue;
            }
            if b.mode == BindingMode::Direct && !self.is_bound(idx, &subject.id) {
                continue;
            }
            return build(b, &el, &subject).map(Some);
        }
        Ok(None)
    }

    fn is_bound(&self, idx: usize, id: &str) -> bool {
        self.bound.get(&idx).map(|s| s.contains(id)).unwrap_or(false)
    }
}

fn build(b: &Binding, el: &ElementSpec, subject: &ElementSpec) -> Result<Interaction> {
    let element = el.id.clone();
    Ok(match b.variant {
        VariantKind::FireAndReport if el.has_class("confirm") => Interaction::ConfirmGated {
            element,
            target: require_attr(el, "href")?,
        },
        VariantKind::FireAndReport => Interaction::FireAndReport {
            element,
            target: require_attr(el, "href")?,
        },
        VariantKind::ConfirmGated => Interaction::ConfirmGated {
            element,
            target: require_attr(el, "href")?,
        },
        VariantKind::FieldUpdate => Interaction::FieldUpdate {
            field: el.name().to_string(),
            target: require_attr(el, "data-url")?,
            method: Method::from_attr(el.get_attr("data-method")),
            element,
        },
        VariantKind::FormSubmit => Interaction::FormSubmit {
            form: subject.id.clone(),
            button: element,
        },
        VariantKind::FavoriteToggle => Interaction::FavoriteToggle {
            element,
            target: require_attr(el, "href")?,
        },
        VariantKind::Download => Interaction::Download {
            element,
            target: require_attr(el, "href")?,
        },
        VariantKind::Rating => Interaction::Rating {
            target: require_attr(el, "data-url")?,
            score: require_attr(el, "data-val")?,
            marker: b.marker.clone(),
            element,
        },
    })
}

fn require_attr(el: &ElementSpec, name: &str) -> Result<String> {
    el.get_attr(name)
        .map(str::to_string)
        .ok_or_else(|| PageWireError::BadConfig(format!("element {} is missing {name}", el.id)))
}

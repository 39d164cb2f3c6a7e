use std::collections::BTreeMap;

use serde::Deserialize;

/// Snapshot of one element: marker classes, attributes, and field state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Displayed value (inputs only).
    #[serde(default)]
    pub value: String,
    /// Last known-good value; starts as the value the page loaded with.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Owning form id.
    #[serde(default)]
    pub form: Option<String>,
}

impl ElementSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn in_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute value; empty strings read as absent.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn is_required(&self) -> bool {
        self.attrs.contains_key("required")
    }

    /// Field name used in payloads, falling back to the id.
    pub fn name(&self) -> &str {
        self.get_attr("name").unwrap_or(&self.id)
    }

    /// Last known-good value; `None` when the page never recorded one.
    pub fn known_good(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// Favorite marker state driven by toggle replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    Favorited,
    NotFavorited,
}

impl FavoriteState {
    pub fn as_str(self) -> &'static str {
        match self {
            FavoriteState::Favorited => "favorited",
            FavoriteState::NotFavorited => "not-favorited",
        }
    }
}

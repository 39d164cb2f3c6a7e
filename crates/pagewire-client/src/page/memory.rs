//! In-memory page used by the binary and tests.
//!
//! Elements keep an insertion sequence so `elements()` reports document
//! order even though storage is a concurrent map. Every side effect the
//! dispatcher performs is appended to a history log.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use dashmap::DashMap;
use serde::Deserialize;
use url::Url;

use pagewire_core::error::{PageWireError, Result};

use super::{ElementSpec, FavoriteState, Page};

/// Side effect recorded by `MemoryPage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Focused(String),
    Navigated(String),
    SubmittedToFrame { form: String, frame: String },
    Busy { id: String, busy: bool },
    Confirmed { prompt: String, answer: bool },
}

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    el: ElementSpec,
}

#[derive(Debug)]
pub struct MemoryPage {
    elements: DashMap<String, Slot>,
    seq: AtomicU64,
    location: RwLock<String>,
    confirm_answer: AtomicBool,
    history: Mutex<Vec<PageEvent>>,
}

impl MemoryPage {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            elements: DashMap::new(),
            seq: AtomicU64::new(1),
            location: RwLock::new(location.into()),
            confirm_answer: AtomicBool::new(true),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Append an element at the end of the document (replaces same id).
    pub fn insert(&self, mut el: ElementSpec) {
        if el.default_value.is_none() {
            el.default_value = Some(el.value.clone());
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.elements.insert(el.id.clone(), Slot { seq, el });
    }

    pub fn with(self, el: ElementSpec) -> Self {
        self.insert(el);
        self
    }

    /// Answer given to subsequent confirmation prompts.
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::Relaxed);
    }

    /// Simulate the user typing into a field.
    pub fn type_value(&self, id: &str, value: &str) {
        if let Some(mut slot) = self.elements.get_mut(id) {
            slot.el.value = value.to_string();
        }
    }

    pub fn value_of(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|s| s.el.value.clone())
    }

    pub fn history(&self) -> Vec<PageEvent> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.history()
            .into_iter()
            .filter_map(|e| match e {
                PageEvent::Navigated(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, ev: PageEvent) {
        // Poisoned log means a test panicked mid-push; drop the event.
        if let Ok(mut h) = self.history.lock() {
            h.push(ev);
        }
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut ElementSpec)) {
        if let Some(mut slot) = self.elements.get_mut(id) {
            f(&mut slot.el);
        }
    }
}

impl Page for MemoryPage {
    fn element(&self, id: &str) -> Option<ElementSpec> {
        self.elements.get(id).map(|s| s.el.clone())
    }

    fn elements(&self) -> Vec<ElementSpec> {
        let mut slots: Vec<Slot> = self.elements.iter().map(|r| r.value().clone()).collect();
        slots.sort_by_key(|s| s.seq);
        slots.into_iter().map(|s| s.el).collect()
    }

    fn set_value(&self, id: &str, value: &str) {
        self.update(id, |el| el.value = value.to_string());
    }

    fn commit_value(&self, id: &str, value: &str) {
        self.update(id, |el| el.default_value = Some(value.to_string()));
    }

    fn focus(&self, id: &str) {
        self.record(PageEvent::Focused(id.to_string()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        let answer = self.confirm_answer.load(Ordering::Relaxed);
        self.record(PageEvent::Confirmed {
            prompt: prompt.to_string(),
            answer,
        });
        answer
    }

    fn location(&self) -> String {
        self.location.read().map(|l| l.clone()).unwrap_or_default()
    }

    fn navigate(&self, url: &str) {
        if let Ok(mut l) = self.location.write() {
            *l = url.to_string();
        }
        self.record(PageEvent::Navigated(url.to_string()));
    }

    fn set_busy(&self, id: &str, busy: bool) {
        self.update(id, |el| {
            if busy {
                if !el.has_class("disabled") {
                    el.classes.push("disabled".into());
                }
            } else {
                el.classes.retain(|c| c != "disabled");
            }
        });
        self.record(PageEvent::Busy {
            id: id.to_string(),
            busy,
        });
    }

    fn set_favorite(&self, id: &str, state: FavoriteState) {
        self.update(id, |el| {
            el.attrs.insert("data-state".into(), state.as_str().into());
        });
    }

    fn remove_class(&self, id: &str, class: &str) {
        self.update(id, |el| el.classes.retain(|c| c != class));
    }

    fn submit_to_frame(&self, form_id: &str, frame: &str) {
        self.update(form_id, |el| {
            el.attrs.insert("target".into(), frame.into());
        });
        self.record(PageEvent::SubmittedToFrame {
            form: form_id.to_string(),
            frame: frame.to_string(),
        });
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageFixture {
    location: String,
    #[serde(default = "default_confirm")]
    confirm: bool,
    #[serde(default)]
    elements: Vec<ElementSpec>,
}

fn default_confirm() -> bool {
    true
}

pub fn load_page_from_file(path: &str) -> Result<MemoryPage> {
    let s = fs::read_to_string(path)
        .map_err(|e| PageWireError::Internal(format!("read page fixture failed: {e}")))?;
    load_page_from_str(&s)
}

/// Build a page from a YAML fixture (`location`, `confirm`, `elements`).
pub fn load_page_from_str(s: &str) -> Result<MemoryPage> {
    let fx: PageFixture = serde_yaml::from_str(s)
        .map_err(|e| PageWireError::BadConfig(format!("invalid page yaml: {e}")))?;

    Url::parse(&fx.location)
        .map_err(|e| PageWireError::BadConfig(format!("page location invalid: {e}")))?;

    let page = MemoryPage::new(fx.location);
    page.answer_confirm(fx.confirm);
    for el in fx.elements {
        if el.id.trim().is_empty() {
            return Err(PageWireError::BadConfig("page element with empty id".into()));
        }
        if page.element(&el.id).is_some() {
            return Err(PageWireError::BadConfig(format!(
                "duplicate page element id: {}",
                el.id
            )));
        }
        page.insert(el);
    }
    Ok(page)
}

//! DOM seam.
//!
//! The dispatcher never touches markup directly. Everything it reads or
//! mutates on the page goes through `Page`, so a browser binding, a headless
//! fixture, and tests all drive the same interaction code.

mod element;
mod memory;

pub use element::{ElementSpec, FavoriteState};
pub use memory::{load_page_from_file, load_page_from_str, MemoryPage, PageEvent};

/// Operations the interaction layer performs on the page.
///
/// Lookups return owned snapshots; attribute changes made by other
/// interactions after the snapshot are not reflected in it.
///
/// Field snapshots should carry `default_value` seeded with the value the
/// page loaded with. A field without one is never rolled back.
pub trait Page: Send + Sync {
    fn element(&self, id: &str) -> Option<ElementSpec>;

    /// All elements in document order.
    fn elements(&self) -> Vec<ElementSpec>;

    /// Elements owned by `form_id`, in document order.
    fn form_fields(&self, form_id: &str) -> Vec<ElementSpec> {
        self.elements()
            .into_iter()
            .filter(|e| e.form.as_deref() == Some(form_id))
            .collect()
    }

    /// Replace the displayed value.
    fn set_value(&self, id: &str, value: &str);

    /// Record `value` as the field's last known-good value.
    fn commit_value(&self, id: &str, value: &str);

    fn focus(&self, id: &str);

    /// Blocking yes/no prompt.
    fn confirm(&self, prompt: &str) -> bool;

    /// Current page location (absolute URL).
    fn location(&self) -> String;

    fn navigate(&self, url: &str);

    /// Toggle the pending state of a trigger (submit button).
    fn set_busy(&self, id: &str, busy: bool);

    fn set_favorite(&self, id: &str, state: FavoriteState);

    fn remove_class(&self, id: &str, class: &str);

    /// Native form submission into `frame`, bypassing the envelope path.
    fn submit_to_frame(&self, form_id: &str, frame: &str);
}

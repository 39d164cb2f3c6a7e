//! Feedback presenter: stacked toasts plus delayed navigation.
//!
//! Navigation timers are scheduled independently of the toast lifecycle;
//! dismissing a toast early never cancels or advances its navigation.

mod presenter;
mod stack;
mod toast;

pub use presenter::{FeedbackEvent, FeedbackPresenter, Presented, Severity};
pub use stack::{Notification, NotificationStack};
pub use toast::{ToastOptions, ToastRenderer, TracingToastRenderer};

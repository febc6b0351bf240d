//! Presentation hooks and display formatting.
//!
//! The client pushes a small amount of user-visible feedback (the cart badge)
//! and front-ends push the rest (alerts, the loading indicator) through the
//! same [`Presenter`], so every surface renders it consistently.

use std::sync::Arc;

use chrono::NaiveDateTime;
use shopfront_core::Money;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertKind {
    /// CSS-style class suffix (`alert-success`, `alert-error`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Sink for user-visible feedback.
pub trait Presenter: Send + Sync {
    /// Show a transient notification.
    fn show_alert(&self, message: &str, kind: AlertKind);

    /// Show the loading indicator.
    fn show_loading(&self);

    /// Remove the loading indicator.
    fn hide_loading(&self);

    /// Display the number of cart lines; hidden when `count` is zero.
    fn update_cart_badge(&self, count: usize);
}

impl<P: Presenter + ?Sized> Presenter for Arc<P> {
    fn show_alert(&self, message: &str, kind: AlertKind) {
        (**self).show_alert(message, kind);
    }

    fn show_loading(&self) {
        (**self).show_loading();
    }

    fn hide_loading(&self) {
        (**self).hide_loading();
    }

    fn update_cart_badge(&self, count: usize) {
        (**self).update_cart_badge(count);
    }
}

/// Presenter that writes everything to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn show_alert(&self, message: &str, kind: AlertKind) {
        match kind {
            AlertKind::Error => tracing::error!(alert = message, "Alert"),
            AlertKind::Warning => tracing::warn!(alert = message, "Alert"),
            AlertKind::Success | AlertKind::Info => {
                tracing::info!(alert = message, kind = kind.as_str(), "Alert");
            }
        }
    }

    fn show_loading(&self) {
        tracing::trace!("Loading started");
    }

    fn hide_loading(&self) {
        tracing::trace!("Loading finished");
    }

    fn update_cart_badge(&self, count: usize) {
        tracing::debug!(count, visible = count > 0, "Cart badge updated");
    }
}

/// Presenter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show_alert(&self, _message: &str, _kind: AlertKind) {}
    fn show_loading(&self) {}
    fn hide_loading(&self) {}
    fn update_cart_badge(&self, _count: usize) {}
}

/// Format an amount as `$12.50`.
#[must_use]
pub fn format_currency(amount: Money) -> String {
    amount.to_string()
}

/// Format a timestamp as `Jan 5, 2025`.
#[must_use]
pub fn format_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

#[cfg(any(test, feature = "test-util"))]
pub use recording::{PresenterEvent, RecordingPresenter};

#[cfg(any(test, feature = "test-util"))]
mod recording {
    use std::sync::{Mutex, PoisonError};

    use super::{AlertKind, Presenter};

    /// Something a [`RecordingPresenter`] was asked to show.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PresenterEvent {
        Alert(String, AlertKind),
        Loading(bool),
        CartBadge(usize),
    }

    /// Presenter that records every call, for assertions in tests.
    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        events: Mutex<Vec<PresenterEvent>>,
    }

    impl RecordingPresenter {
        /// Every event so far, oldest first.
        #[must_use]
        pub fn events(&self) -> Vec<PresenterEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// The most recent badge count, if the badge was ever updated.
        #[must_use]
        pub fn badge(&self) -> Option<usize> {
            self.events().iter().rev().find_map(|event| match event {
                PresenterEvent::CartBadge(count) => Some(*count),
                _ => None,
            })
        }

        fn record(&self, event: PresenterEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }

    impl Presenter for RecordingPresenter {
        fn show_alert(&self, message: &str, kind: AlertKind) {
            self.record(PresenterEvent::Alert(message.to_string(), kind));
        }

        fn show_loading(&self) {
            self.record(PresenterEvent::Loading(true));
        }

        fn hide_loading(&self) {
            self.record(PresenterEvent::Loading(false));
        }

        fn update_cart_badge(&self, count: usize) {
            self.record(PresenterEvent::CartBadge(count));
        }
    }
}

//! Page navigation hooks.
//!
//! The client only ever needs two things from its host: which page is being
//! shown, and a way to send the user somewhere else. Front-ends implement
//! [`Navigator`] to map those onto whatever "page" means for them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Host-side navigation.
pub trait Navigator: Send + Sync {
    /// Path or name of the page currently shown.
    fn current_page(&self) -> String;

    /// Navigate to `page`.
    fn redirect(&self, page: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn current_page(&self) -> String {
        (**self).current_page()
    }

    fn redirect(&self, page: &str) {
        (**self).redirect(page);
    }
}

/// Last path segment of `path`, or `index.html` for a bare directory.
///
/// ```
/// use shopfront_client::navigation::page_name;
///
/// assert_eq!(page_name("/shop/cart.html"), "cart.html");
/// assert_eq!(page_name("/shop/"), "index.html");
/// ```
#[must_use]
pub fn page_name(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => "index.html",
    }
}

/// In-memory [`Navigator`] that records every redirect.
///
/// Redirecting also changes the current page, as a browser would.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingNavigator {
    /// Start on `page`.
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(page.into()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Move to `page` without recording a redirect (a user click).
    pub fn visit(&self, page: impl Into<String>) {
        *lock(&self.current) = page.into();
    }

    /// Every redirect issued so far, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        lock(&self.redirects).clone()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new("index.html")
    }
}

impl Navigator for RecordingNavigator {
    fn current_page(&self) -> String {
        lock(&self.current).clone()
    }

    fn redirect(&self, page: &str) {
        tracing::debug!(page, "Redirecting");
        lock(&self.redirects).push(page.to_string());
        *lock(&self.current) = page.to_string();
    }
}

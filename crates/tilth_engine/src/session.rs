//! Per-page session state
//!
//! Values that several handlers read and write across events. One instance
//! is created at startup and owned by the engine; nothing here survives a
//! reload.

use tilth_core::Locale;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    /// Offset seen by the previous header update
    pub last_scroll_top: f64,
    /// Id of the section the navigation currently marks, if any
    pub active_section: Option<String>,
    /// Language currently rendered
    pub locale: Locale,
}

impl SessionState {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }
}

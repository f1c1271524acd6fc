//! Language switcher
//!
//! Translatable elements carry their text for both languages in
//! `data-lang-bn` / `data-lang-en`. Switching rewrites every one of them,
//! updates the picker, and remembers the choice in host storage.

use tilth_core::{Document, EventOutcome, Locale, NodeId};
use tilth_platform::Storage;
use tracing::{debug, info, warn};

use crate::bindings::{closest_bound, LocaleBinding, PageBindings};
use crate::config::LocaleConfig;
use crate::session::SessionState;

pub const DROPDOWN_OPEN_CLASS: &str = "active";

pub struct LocaleSwitcher {
    binding: LocaleBinding,
    storage_key: String,
    default: Locale,
}

impl LocaleSwitcher {
    pub fn new(bindings: &PageBindings, config: &LocaleConfig) -> Self {
        Self {
            binding: bindings.locale.clone(),
            storage_key: config.storage_key.clone(),
            default: config.default,
        }
    }

    /// The persisted language, or the default when unset or unreadable
    pub fn stored_locale(&self, storage: &dyn Storage) -> Locale {
        match storage.get_item(&self.storage_key) {
            None => self.default,
            Some(code) => Locale::from_code(&code).unwrap_or_else(|| {
                warn!(
                    "Ignoring unknown stored language '{}', using '{}'",
                    code, self.default
                );
                self.default
            }),
        }
    }

    /// Restore the persisted language
    pub fn start(&self, doc: &mut Document, session: &mut SessionState, storage: &mut dyn Storage) {
        let locale = self.stored_locale(storage);
        self.apply_language(doc, session, storage, locale);
    }

    /// Render `locale` everywhere and persist it
    pub fn apply_language(
        &self,
        doc: &mut Document,
        session: &mut SessionState,
        storage: &mut dyn Storage,
        locale: Locale,
    ) {
        let root = doc.root();
        doc.set_attr(root, "lang", locale.html_lang());
        doc.set_attr(root, "data-lang", locale.code());

        let attribute = locale.text_attribute();
        let mut rewritten = 0;
        for &node in &self.binding.bound {
            let Some(text) = doc.attr(node, &attribute).map(str::to_string) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            // Buttons keep their icon and only swap the label span
            let target = doc.first_descendant_by_tag(node, "span").unwrap_or(node);
            doc.set_text_content(target, &text);
            rewritten += 1;
        }

        if let Some(label) = self.binding.current_label {
            doc.set_text_content(label, locale.short_label());
        }

        session.locale = locale;
        if let Err(e) = storage.set_item(&self.storage_key, locale.code()) {
            warn!("Could not persist language preference: {}", e);
        }

        if let Some(dropdown) = self.binding.dropdown {
            doc.remove_class(dropdown, DROPDOWN_OPEN_CLASS);
        }

        debug!("Applied language '{}' to {} element(s)", locale, rewritten);
    }

    /// Handle a click on the toggle or an option
    ///
    /// Both stop propagation so the outside-click handler leaves the
    /// dropdown alone.
    pub fn on_click(
        &self,
        doc: &mut Document,
        session: &mut SessionState,
        storage: &mut dyn Storage,
        target: NodeId,
        outcome: &mut EventOutcome,
    ) {
        if let Some(toggle) = self.binding.toggle {
            if doc.contains(toggle, target) {
                outcome.stop_propagation();
                if let Some(dropdown) = self.binding.dropdown {
                    doc.toggle_class(dropdown, DROPDOWN_OPEN_CLASS);
                }
                return;
            }
        }

        let Some(option) = closest_bound(doc, target, &self.binding.options) else {
            return;
        };
        outcome.stop_propagation();

        let selected = doc.attr(option, "data-lang").and_then(Locale::from_code);
        match selected {
            Some(locale) if locale != session.locale => {
                info!("Switching language to '{}'", locale);
                self.apply_language(doc, session, storage, locale);
            }
            Some(_) => {}
            None => debug!("Language option {:?} has no usable data-lang", option),
        }
    }

    /// Document-level click: close the dropdown unless the click was inside it
    pub fn on_document_click(&self, doc: &mut Document, target: NodeId) {
        if let Some(dropdown) = self.binding.dropdown {
            if !doc.contains(dropdown, target) {
                doc.remove_class(dropdown, DROPDOWN_OPEN_CLASS);
            }
        }
    }
}

//! Form validation
//!
//! Controls are checked on blur, re-checked on every input once they are
//! marked invalid, and all checked together on submit. Submission is always
//! intercepted; the result is reported through a notification in the active
//! language.

use regex::Regex;
use tilth_core::{Document, EventOutcome, Locale, NodeId};
use tracing::{debug, info};

use crate::bindings::{FormBinding, PageBindings};
use crate::config::FormConfig;
use crate::error::Result;
use crate::notify::{NotificationKind, Notifier};
use crate::task::Ctx;

pub const ERROR_CLASS: &str = "error";

/// Message shown after a submit attempt
pub fn submit_message(valid: bool, locale: Locale) -> &'static str {
    match (valid, locale) {
        (true, Locale::Bengali) => "ফর্ম সফলভাবে জমা হয়েছে!",
        (true, Locale::English) => "Form submitted successfully!",
        (false, Locale::Bengali) => "অনুগ্রহ করে সব প্রয়োজনীয় ক্ষেত্র পূরণ করুন।",
        (false, Locale::English) => "Please fill in all required fields.",
    }
}

pub struct FormValidator {
    forms: Vec<FormBinding>,
    email: Regex,
    config: FormConfig,
}

impl FormValidator {
    pub fn new(bindings: &PageBindings, config: &FormConfig) -> Result<Self> {
        Ok(Self {
            forms: bindings.forms.clone(),
            email: Regex::new(&config.email_pattern)?,
            config: config.clone(),
        })
    }

    fn is_control(&self, node: NodeId) -> bool {
        self.forms.iter().any(|f| f.controls.contains(&node))
    }

    /// Check one control and mark or clear its error state
    pub fn validate_input(&self, doc: &mut Document, input: NodeId) -> bool {
        let value = doc.value(input).to_string();

        if doc.has_attr(input, "required") && value.trim().is_empty() {
            doc.add_class(input, ERROR_CLASS);
            return false;
        }

        let is_email = doc
            .attr(input, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("email"));
        if self.config.check_email
            && is_email
            && !value.is_empty()
            && !self.email.is_match(&value)
        {
            doc.add_class(input, ERROR_CLASS);
            return false;
        }

        doc.remove_class(input, ERROR_CLASS);
        true
    }

    pub fn on_blur(&self, doc: &mut Document, target: NodeId) {
        if self.config.live_validation && self.is_control(target) {
            self.validate_input(doc, target);
        }
    }

    /// Store the new value and re-check a control already marked invalid
    pub fn on_input(&self, doc: &mut Document, target: NodeId, value: &str) {
        doc.set_value(target, value);
        if self.config.live_validation
            && self.is_control(target)
            && doc.has_class(target, ERROR_CLASS)
        {
            self.validate_input(doc, target);
        }
    }

    /// Validate every control of `form`; returns `None` if the form is not bound
    pub fn on_submit(
        &self,
        ctx: &mut Ctx<'_>,
        notifier: &Notifier,
        form: NodeId,
        outcome: &mut EventOutcome,
    ) -> Option<bool> {
        let binding = self.forms.iter().find(|f| f.form == form)?;
        outcome.prevent_default();

        // Every control is checked so each gets its own error state
        let mut valid = true;
        for &control in &binding.controls {
            if !self.validate_input(ctx.doc, control) {
                valid = false;
            }
        }

        if valid {
            ctx.doc.reset_form(form);
            info!("Form {:?} submitted", form);
        } else {
            debug!("Form {:?} has invalid fields", form);
        }

        if self.config.notify {
            let kind = if valid {
                NotificationKind::Success
            } else {
                NotificationKind::Error
            };
            let message = submit_message(valid, ctx.session.locale);
            notifier.show(ctx, message, kind);
        }
        Some(valid)
    }
}

//! Transient notifications
//!
//! A notification is appended to the body, fades in shortly after, hides
//! after a fixed display time, and is removed once its exit transition has
//! had time to run. Several can be on screen at once.

use std::fmt;

use tilth_core::NodeId;
use tracing::debug;

use crate::config::NotificationConfig;
use crate::task::{Ctx, Task};

pub const SHOW_CLASS: &str = "show";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Notifier {
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Append a notification and schedule its lifecycle
    pub fn show(&self, ctx: &mut Ctx<'_>, message: &str, kind: NotificationKind) -> NodeId {
        let body = ctx.doc.body();
        let node = ctx
            .doc
            .element(body, "div")
            .class("notification")
            .class(&format!("notification-{}", kind))
            .text(message)
            .node();

        ctx.after(self.config.show_delay(), Task::ShowNotification(node));
        ctx.after(self.config.display(), Task::HideNotification(node));
        debug!("Notification ({}): {}", kind, message);
        node
    }

    pub fn on_show(&self, ctx: &mut Ctx<'_>, node: NodeId) {
        ctx.doc.add_class(node, SHOW_CLASS);
    }

    pub fn on_hide(&self, ctx: &mut Ctx<'_>, node: NodeId) {
        ctx.doc.remove_class(node, SHOW_CLASS);
        ctx.after(self.config.remove_delay(), Task::RemoveNode(node));
    }
}

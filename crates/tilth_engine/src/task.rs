//! Deferred work and host requests
//!
//! Handlers never sleep. Anything that happens later is queued as a [`Task`]
//! on the engine's timer queue, and anything only the host can do (moving
//! the real scroll position) is emitted as a [`HostCommand`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tilth_animation::{TimerId, TimerQueue};
use tilth_core::{Document, NodeId};

use crate::session::SessionState;

/// Work scheduled for a later tick
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    /// Add `show` to a notification
    ShowNotification(NodeId),
    /// Remove `show` and schedule removal
    HideNotification(NodeId),
    /// Detach and free a node if it still exists
    RemoveNode(NodeId),
    /// Add `show` to a lightbox overlay that is not closing
    ShowLightbox(NodeId),
    /// Finish closing a lightbox overlay
    DetachLightbox(NodeId),
    /// Start the width transition of a progress bar
    RestoreProgress { node: NodeId, width: String },
    /// Type the next character of the hero title
    TypeNext,
}

/// A request the engine cannot fulfil itself
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum HostCommand {
    /// Scroll the window to a document offset
    ScrollTo { top: f64, smooth: bool },
}

/// Mutable state handed to handlers for the duration of one event or timer
pub struct Ctx<'a> {
    pub doc: &'a mut Document,
    pub session: &'a mut SessionState,
    timers: &'a mut TimerQueue<Task>,
    commands: &'a mut Vec<HostCommand>,
    /// Time of the event, or the due time of the timer being run
    pub now: Instant,
}

impl<'a> Ctx<'a> {
    pub fn new(
        doc: &'a mut Document,
        session: &'a mut SessionState,
        timers: &'a mut TimerQueue<Task>,
        commands: &'a mut Vec<HostCommand>,
        now: Instant,
    ) -> Self {
        Self {
            doc,
            session,
            timers,
            commands,
            now,
        }
    }

    /// Run `task` once `delay` has passed
    pub fn after(&mut self, delay: Duration, task: Task) -> TimerId {
        self.timers.schedule(self.now, delay, task)
    }

    pub fn command(&mut self, command: HostCommand) {
        self.commands.push(command);
    }

    pub fn smooth_scroll_to(&mut self, top: f64) {
        self.command(HostCommand::ScrollTo { top, smooth: true });
    }
}

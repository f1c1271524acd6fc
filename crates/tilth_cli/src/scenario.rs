//! Interaction scenarios
//!
//! A scenario is a TOML list of steps replayed against the engine on a
//! simulated clock:
//!
//! ```toml
//! frame_ms = 16
//!
//! [[steps]]
//! action = "click"
//! target = ".lang-option[data-lang=en]"
//!
//! [[steps]]
//! action = "scroll"
//! to = 900
//!
//! [[steps]]
//! action = "wait"
//! ms = 2500
//! ```
//!
//! Targets are selectors; the first matching element receives the event.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tilth_core::{Key, NodeId, PageEvent};
use tilth_engine::{Engine, HostCommand};
use tilth_platform::Storage;
use tracing::{debug, info};

fn default_frame_ms() -> u64 {
    16
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scenario {
    /// Simulated frame interval used while waiting
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Scroll { to: f64 },
    Click { target: String },
    Key { key: String },
    Hover { target: String },
    Leave { target: String },
    Move { target: String, x: f64, y: f64 },
    Input { target: String, value: String },
    Blur { target: String },
    Submit { target: String },
    Resize { width: f64, height: f64 },
    Wait { ms: u64 },
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml(&content)
    }
}

/// Drives an engine through a scenario on a simulated clock
pub struct Replay<S: Storage> {
    engine: Engine<S>,
    start: Instant,
    elapsed: Duration,
    frame: Duration,
    commands: Vec<HostCommand>,
}

impl<S: Storage> Replay<S> {
    pub fn new(engine: Engine<S>, frame_ms: u64) -> Self {
        Self {
            engine,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            frame: Duration::from_millis(frame_ms.max(1)),
            commands: Vec::new(),
        }
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    pub fn start(&mut self) {
        let now = self.now();
        self.engine.start(now);
        self.engine.tick(now);
    }

    fn resolve(&self, selector: &str) -> Result<NodeId> {
        let found = self
            .engine
            .document()
            .select(selector)
            .with_context(|| format!("Invalid target selector '{}'", selector))?;
        found
            .first()
            .copied()
            .ok_or_else(|| anyhow!("No element matches '{}'", selector))
    }

    fn event(&self, step: &Step) -> Result<Option<PageEvent>> {
        let event = match step {
            Step::Scroll { to } => PageEvent::Scroll { offset: *to },
            Step::Click { target } => PageEvent::Click {
                target: self.resolve(target)?,
            },
            Step::Key { key } => PageEvent::KeyDown {
                key: Key::from_dom(key).ok_or_else(|| anyhow!("Unknown key '{}'", key))?,
            },
            Step::Hover { target } => PageEvent::PointerEnter {
                target: self.resolve(target)?,
            },
            Step::Leave { target } => PageEvent::PointerLeave {
                target: self.resolve(target)?,
            },
            Step::Move { target, x, y } => PageEvent::PointerMove {
                target: self.resolve(target)?,
                x: *x,
                y: *y,
            },
            Step::Input { target, value } => PageEvent::Input {
                target: self.resolve(target)?,
                value: value.clone(),
            },
            Step::Blur { target } => PageEvent::Blur {
                target: self.resolve(target)?,
            },
            Step::Submit { target } => PageEvent::Submit {
                form: self.resolve(target)?,
            },
            Step::Resize { width, height } => PageEvent::Resize {
                width: *width,
                height: *height,
            },
            Step::Wait { .. } => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Apply host commands the way a browser would: scrolling moves the window
    fn apply_commands(&mut self) {
        for command in self.engine.take_commands() {
            match command {
                HostCommand::ScrollTo { top, .. } => {
                    let now = self.now();
                    self.engine.dispatch(PageEvent::Scroll { offset: top.max(0.0) }, now);
                }
            }
            self.commands.push(command);
        }
    }

    pub fn step(&mut self, step: &Step) -> Result<()> {
        if let Step::Wait { ms } = step {
            let until = self.elapsed + Duration::from_millis(*ms);
            while self.elapsed < until {
                self.elapsed = (self.elapsed + self.frame).min(until);
                let now = self.now();
                self.engine.tick(now);
                self.apply_commands();
            }
            return Ok(());
        }

        if let Some(event) = self.event(step)? {
            let now = self.now();
            let name = event.name();
            let outcome = self.engine.dispatch(event, now);
            debug!(
                "{} at {}ms: default prevented {}, propagation stopped {}",
                name,
                self.elapsed.as_millis(),
                outcome.default_prevented,
                outcome.propagation_stopped
            );
            self.apply_commands();
            self.engine.tick(now);
        }
        Ok(())
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<()> {
        for (index, step) in scenario.steps.iter().enumerate() {
            self.step(step)
                .with_context(|| format!("Step {} ({:?}) failed", index + 1, step))?;
        }
        info!(
            "Replayed {} step(s) over {}ms",
            scenario.steps.len(),
            self.elapsed.as_millis()
        );
        Ok(())
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }
}

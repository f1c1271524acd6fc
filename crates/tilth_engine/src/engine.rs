//! Tilth Engine
//!
//! The host-facing entry point. The engine owns the page document, the
//! host storage and every component, and is driven entirely by the host:
//!
//! ```ignore
//! use tilth_engine::prelude::*;
//!
//! let mut engine = Engine::new(doc, MemoryStorage::new(), EngineConfig::default(), Capabilities::default())?;
//! engine.start(now);
//!
//! let outcome = engine.dispatch(PageEvent::Scroll { offset: 640.0 }, now);
//! while engine.tick(now) { /* schedule the next frame */ }
//! for command in engine.take_commands() { /* scroll the real window */ }
//! ```

use std::time::Instant;

use tilth_animation::TimerQueue;
use tilth_core::{Document, EventOutcome, Key, NodeId, PageEvent};
use tilth_platform::{Capabilities, Storage};
use tracing::{debug, info, trace, warn};

use crate::anchors::AnchorScroller;
use crate::bindings::PageBindings;
use crate::config::EngineConfig;
use crate::counter::CounterAnimator;
use crate::error::Result;
use crate::forms::FormValidator;
use crate::hover::{CardHover, PieLinks};
use crate::lazy_images::LazyImageLoader;
use crate::lightbox::LightboxController;
use crate::locale::LocaleSwitcher;
use crate::menu::MobileMenu;
use crate::navigation::{ActiveLinkController, HeaderController, ScrollTopButton};
use crate::notify::Notifier;
use crate::parallax::HeroParallax;
use crate::progress::{stagger_floating, ProgressBars};
use crate::reveal::RevealAnimator;
use crate::session::SessionState;
use crate::task::{Ctx, HostCommand, Task};
use crate::typing::TypingEffect;

/// Every wired component; `None` means disabled or nothing to bind
struct Components {
    menu: Option<MobileMenu>,
    locale: Option<LocaleSwitcher>,
    scroll_top: Option<ScrollTopButton>,
    header: Option<HeaderController>,
    active_links: Option<ActiveLinkController>,
    anchors: Option<AnchorScroller>,
    reveal: Option<RevealAnimator>,
    parallax: Option<HeroParallax>,
    counters: Option<CounterAnimator>,
    lazy_images: Option<LazyImageLoader>,
    card_hover: Option<CardHover>,
    pie_links: Option<PieLinks>,
    lightbox: Option<LightboxController>,
    forms: Option<FormValidator>,
    progress: Option<ProgressBars>,
    typing: Option<TypingEffect>,
}

impl Components {
    fn build(
        doc: &Document,
        bindings: &PageBindings,
        config: &EngineConfig,
        capabilities: &Capabilities,
    ) -> Result<Self> {
        let on = &config.features;
        let scroll = &config.scroll;
        Ok(Self {
            menu: on
                .menu
                .then(|| MobileMenu::new(bindings, &config.menu))
                .flatten(),
            locale: on
                .locale
                .then(|| LocaleSwitcher::new(bindings, &config.locale)),
            scroll_top: on
                .scroll_top
                .then(|| ScrollTopButton::new(bindings, &config.scroll_top, scroll))
                .flatten(),
            header: on
                .header
                .then(|| HeaderController::new(bindings, &config.header, scroll))
                .flatten(),
            active_links: on
                .active_nav
                .then(|| ActiveLinkController::new(bindings, &config.navigation, scroll))
                .flatten(),
            anchors: on
                .anchors
                .then(|| AnchorScroller::new(bindings, &config.anchors)),
            reveal: if on.reveal {
                Some(RevealAnimator::new(bindings, &config.reveal)?)
            } else {
                None
            },
            parallax: on
                .parallax
                .then(|| HeroParallax::new(bindings, &config.parallax, scroll))
                .flatten(),
            counters: on
                .counters
                .then(|| CounterAnimator::new(bindings, &config.counter)),
            lazy_images: if on.lazy_images {
                LazyImageLoader::new(bindings, &config.lazy_images, capabilities)?
            } else {
                None
            },
            card_hover: on
                .card_hover
                .then(|| CardHover::new(bindings, &config.hover)),
            pie_links: on.pie_links.then(|| PieLinks::new(bindings)).flatten(),
            lightbox: on
                .lightbox
                .then(|| LightboxController::new(bindings, &config.lightbox)),
            forms: if on.forms {
                Some(FormValidator::new(bindings, &config.forms)?)
            } else {
                None
            },
            progress: on
                .progress
                .then(|| ProgressBars::new(bindings, &config.progress)),
            typing: on
                .typing
                .then(|| TypingEffect::new(bindings, &config.typing, doc))
                .flatten(),
        })
    }
}

/// The progressive interaction engine for one page
pub struct Engine<S: Storage> {
    doc: Document,
    storage: S,
    config: EngineConfig,
    bindings: PageBindings,
    session: SessionState,
    timers: TimerQueue<Task>,
    commands: Vec<HostCommand>,
    notifier: Notifier,
    components: Components,
    started: bool,
}

impl<S: Storage> Engine<S> {
    /// Bind the page and build every enabled component
    ///
    /// Fails only on invalid configuration. Elements that are missing from
    /// the page leave their feature disabled.
    pub fn new(
        doc: Document,
        storage: S,
        config: EngineConfig,
        capabilities: Capabilities,
    ) -> Result<Self> {
        let bindings = PageBindings::resolve(&doc, &config)?;
        let components = Components::build(&doc, &bindings, &config, &capabilities)?;
        let session = SessionState::new(config.locale.default);
        let notifier = Notifier::new(&config.notifications);

        Ok(Self {
            doc,
            storage,
            config,
            bindings,
            session,
            timers: TimerQueue::new(),
            commands: Vec::new(),
            notifier,
            components,
            started: false,
        })
    }

    /// Page-ready wiring: restore the language, then put every component in
    /// its initial state
    pub fn start(&mut self, now: Instant) {
        if self.started {
            warn!("Engine already started");
            return;
        }
        self.started = true;

        info!("হাওলাদার এগ্রো - Hawladar Agro");
        info!("Sustainable Farming for a Better Future");

        let c = &mut self.components;

        if let Some(locale) = &c.locale {
            locale.start(&mut self.doc, &mut self.session, &mut self.storage);
        }

        // Typing reads the title in the restored language
        if let Some(typing) = &mut c.typing {
            let mut ctx = Ctx::new(
                &mut self.doc,
                &mut self.session,
                &mut self.timers,
                &mut self.commands,
                now,
            );
            typing.start(&mut ctx);
        }

        if let Some(reveal) = &mut c.reveal {
            reveal.start(&mut self.doc);
        }
        if let Some(lightbox) = &c.lightbox {
            lightbox.start(&mut self.doc);
        }
        if self.config.features.floating {
            stagger_floating(&mut self.doc, &self.bindings, &self.config.floating);
        }
        if let Some(lazy) = &mut c.lazy_images {
            lazy.start(&mut self.doc);
        }

        debug!("Engine started in '{}'", self.session.locale);
    }

    /// Deliver one input event
    pub fn dispatch(&mut self, event: PageEvent, now: Instant) -> EventOutcome {
        trace!("Dispatching {}", event.name());
        let mut outcome = EventOutcome::default();

        match event {
            PageEvent::Click { target } => self.on_click(target, now, &mut outcome),
            PageEvent::KeyDown { key: Key::Escape } => self.on_escape(now),
            PageEvent::KeyDown { .. } => {}
            PageEvent::Scroll { offset } => self.on_scroll(offset, now),
            PageEvent::Resize { width, height } => self.doc.set_viewport_size(width, height),
            PageEvent::PointerMove { target, x, y } => {
                if let Some(hover) = &self.components.card_hover {
                    hover.on_pointer_move(&mut self.doc, target, x, y);
                }
            }
            PageEvent::PointerEnter { target } => {
                if let Some(hover) = &self.components.card_hover {
                    hover.on_pointer_enter(&mut self.doc, target);
                }
                if let Some(links) = &self.components.pie_links {
                    links.on_pointer_enter(&mut self.doc, target);
                }
            }
            PageEvent::PointerLeave { target } => {
                if let Some(hover) = &self.components.card_hover {
                    hover.on_pointer_leave(&mut self.doc, target);
                }
                if let Some(links) = &self.components.pie_links {
                    links.on_pointer_leave(&mut self.doc, target);
                }
            }
            PageEvent::Blur { target } => {
                if let Some(forms) = &self.components.forms {
                    forms.on_blur(&mut self.doc, target);
                }
            }
            PageEvent::Input { target, value } => match &self.components.forms {
                Some(forms) => forms.on_input(&mut self.doc, target, &value),
                None => self.doc.set_value(target, &value),
            },
            PageEvent::Submit { form } => {
                if let Some(forms) = &self.components.forms {
                    let mut ctx = Ctx::new(
                        &mut self.doc,
                        &mut self.session,
                        &mut self.timers,
                        &mut self.commands,
                        now,
                    );
                    forms.on_submit(&mut ctx, &self.notifier, form, &mut outcome);
                }
            }
        }

        outcome
    }

    fn on_click(&mut self, target: NodeId, now: Instant, outcome: &mut EventOutcome) {
        let c = &mut self.components;
        let mut ctx = Ctx::new(
            &mut self.doc,
            &mut self.session,
            &mut self.timers,
            &mut self.commands,
            now,
        );

        // Element handlers, each seeing the click independently
        if let Some(lightbox) = &mut c.lightbox {
            lightbox.on_click(&mut ctx, target);
        }
        if let Some(locale) = &c.locale {
            locale.on_click(ctx.doc, ctx.session, &mut self.storage, target, outcome);
        }
        if let Some(menu) = &c.menu {
            menu.on_click(ctx.doc, target);
        }
        if let Some(anchors) = &c.anchors {
            anchors.on_click(&mut ctx, target, outcome);
        }
        if let Some(button) = &c.scroll_top {
            button.on_click(&mut ctx, target);
        }

        // Document-level handlers
        if outcome.propagation_stopped {
            return;
        }
        if let Some(menu) = &c.menu {
            menu.on_document_click(ctx.doc, target);
        }
        if let Some(locale) = &c.locale {
            locale.on_document_click(ctx.doc, target);
        }
    }

    fn on_escape(&mut self, now: Instant) {
        let c = &mut self.components;
        if let Some(lightbox) = &mut c.lightbox {
            let mut ctx = Ctx::new(
                &mut self.doc,
                &mut self.session,
                &mut self.timers,
                &mut self.commands,
                now,
            );
            lightbox.on_escape(&mut ctx);
        }
        if let Some(menu) = &c.menu {
            menu.on_escape(&mut self.doc);
        }
    }

    fn on_scroll(&mut self, offset: f64, now: Instant) {
        self.doc.scroll_to(offset);
        let c = &mut self.components;
        if let Some(header) = &mut c.header {
            header.on_scroll(&mut self.doc, &mut self.session, now);
        }
        if let Some(links) = &mut c.active_links {
            links.on_scroll(&mut self.doc, &mut self.session, now);
        }
        if let Some(button) = &mut c.scroll_top {
            button.on_scroll(&mut self.doc, now);
        }
        if let Some(parallax) = &mut c.parallax {
            parallax.on_scroll(&mut self.doc, now);
        }
    }

    /// Run due timers, visibility checks and one animation frame
    ///
    /// Returns `true` while timers are pending or counters are running, so
    /// the host knows to keep ticking.
    pub fn tick(&mut self, now: Instant) -> bool {
        while let Some((due, task)) = self.timers.pop_due(now) {
            self.run_task(task, due);
        }

        let c = &mut self.components;
        if let Some(reveal) = &mut c.reveal {
            reveal.update(&mut self.doc);
        }
        if let Some(counters) = &mut c.counters {
            counters.update(&self.doc, now);
        }
        if let Some(lazy) = &mut c.lazy_images {
            lazy.update(&mut self.doc);
        }
        if let Some(progress) = &mut c.progress {
            let mut ctx = Ctx::new(
                &mut self.doc,
                &mut self.session,
                &mut self.timers,
                &mut self.commands,
                now,
            );
            progress.update(&mut ctx);
        }

        let counting = match &mut c.counters {
            Some(counters) => counters.frame(&mut self.doc, now),
            None => false,
        };
        counting || !self.timers.is_empty()
    }

    fn run_task(&mut self, task: Task, due: Instant) {
        let c = &mut self.components;
        let mut ctx = Ctx::new(
            &mut self.doc,
            &mut self.session,
            &mut self.timers,
            &mut self.commands,
            due,
        );

        match task {
            Task::ShowNotification(node) => self.notifier.on_show(&mut ctx, node),
            Task::HideNotification(node) => self.notifier.on_hide(&mut ctx, node),
            Task::RemoveNode(node) => ctx.doc.destroy(node),
            Task::ShowLightbox(overlay) => {
                if let Some(lightbox) = &c.lightbox {
                    lightbox.show(ctx.doc, overlay);
                }
            }
            Task::DetachLightbox(overlay) => {
                if let Some(lightbox) = &mut c.lightbox {
                    lightbox.detach(ctx.doc, overlay);
                }
            }
            Task::RestoreProgress { node, width } => {
                if let Some(progress) = &c.progress {
                    progress.restore(ctx.doc, node, &width);
                }
            }
            Task::TypeNext => {
                if let Some(typing) = &mut c.typing {
                    typing.type_next(&mut ctx);
                }
            }
        }
    }

    /// Host requests queued since the last call
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Earliest pending timer, for hosts that sleep between ticks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for host-driven layout updates
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bindings(&self) -> &PageBindings {
        &self.bindings
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Give the document and storage back to the host
    pub fn into_parts(self) -> (Document, S) {
        (self.doc, self.storage)
    }
}

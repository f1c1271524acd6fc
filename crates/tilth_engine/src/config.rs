//! Engine configuration
//!
//! One engine serves both flavours of the site. [`EngineConfig::enhanced`]
//! (the default) wires every behaviour with the richer effects, while
//! [`EngineConfig::classic`] reproduces the simpler variant: inline-style
//! reveals, unthrottled scroll handlers, a stepped linear counter, and a
//! lightbox that closes on any click.
//!
//! Configs load from TOML. Every field has a default, so a file only needs
//! the values it changes:
//!
//! ```toml
//! [features]
//! typing = false
//!
//! [navigation.rule]
//! kind = "window"
//! lookahead = 120.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tilth_animation::Easing;
use tilth_core::Locale;

use crate::error::Result;

/// Top-level engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: Features,
    pub scroll: ScrollConfig,
    pub menu: MenuConfig,
    pub locale: LocaleConfig,
    pub scroll_top: ScrollTopConfig,
    pub header: HeaderConfig,
    pub anchors: AnchorConfig,
    pub reveal: RevealConfig,
    pub parallax: ParallaxConfig,
    pub counter: CounterConfig,
    pub navigation: NavigationConfig,
    pub lazy_images: LazyImageConfig,
    pub hover: HoverConfig,
    pub lightbox: LightboxConfig,
    pub forms: FormConfig,
    pub notifications: NotificationConfig,
    pub progress: ProgressConfig,
    pub floating: FloatingConfig,
    pub typing: TypingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::enhanced()
    }
}

impl EngineConfig {
    /// Every behaviour, with the richer effects
    pub fn enhanced() -> Self {
        Self {
            features: Features::default(),
            scroll: ScrollConfig::default(),
            menu: MenuConfig::default(),
            locale: LocaleConfig::default(),
            scroll_top: ScrollTopConfig::default(),
            header: HeaderConfig::default(),
            anchors: AnchorConfig::default(),
            reveal: RevealConfig::default(),
            parallax: ParallaxConfig::default(),
            counter: CounterConfig::default(),
            navigation: NavigationConfig::default(),
            lazy_images: LazyImageConfig::default(),
            hover: HoverConfig::default(),
            lightbox: LightboxConfig::default(),
            forms: FormConfig::default(),
            notifications: NotificationConfig::default(),
            progress: ProgressConfig::default(),
            floating: FloatingConfig::default(),
            typing: TypingConfig::default(),
        }
    }

    /// The simpler, single-language variant
    pub fn classic() -> Self {
        Self {
            features: Features {
                locale: false,
                progress: false,
                floating: false,
                typing: false,
                pie_links: false,
                ..Features::default()
            },
            scroll: ScrollConfig {
                throttle_ms: 0,
                parallax_throttle_ms: 0,
            },
            menu: MenuConfig {
                mark_toggle: false,
                body_class: String::new(),
                close_on_escape: false,
                animate_bars: true,
                ..MenuConfig::default()
            },
            scroll_top: ScrollTopConfig {
                selector: ".et_pb_scroll_top.et-pb-icon".to_string(),
                ..ScrollTopConfig::default()
            },
            header: HeaderConfig {
                style: HeaderStyle::Shadow,
                auto_hide: false,
                ..HeaderConfig::default()
            },
            anchors: AnchorConfig {
                always_prevent_default: true,
                ..AnchorConfig::default()
            },
            reveal: RevealConfig {
                selector: ".project-card, .investment-card, .blog-card, .stat-item".to_string(),
                thresholds: vec![0.1],
                root_margin: "0px".to_string(),
                mode: RevealMode::InlineStyle,
                ..RevealConfig::default()
            },
            parallax: ParallaxConfig {
                speed: 0.5,
                target: ParallaxTarget::HeroPosition,
                ..ParallaxConfig::default()
            },
            counter: CounterConfig {
                easing: Easing::Linear,
                steps: Some(50),
                read_data_count: false,
                localize_digits: false,
                ..CounterConfig::default()
            },
            navigation: NavigationConfig {
                links: ".nav-menu a".to_string(),
                rule: SectionRule::Reached { offset: 100.0 },
                ..NavigationConfig::default()
            },
            lazy_images: LazyImageConfig {
                mode: LazyImageMode::Native,
                ..LazyImageConfig::default()
            },
            hover: HoverConfig {
                cards: ".project-card, .investment-card, .blog-card".to_string(),
                effect: CardEffect::Lift,
                ..HoverConfig::default()
            },
            lightbox: LightboxConfig {
                triggers: ".blog-card img".to_string(),
                close_delay_ms: 0,
                close_on_escape: false,
                close_on_image_click: true,
                lock_scroll: false,
                ..LightboxConfig::default()
            },
            forms: FormConfig {
                live_validation: false,
                check_email: false,
                notify: false,
                ..FormConfig::default()
            },
            ..Self::enhanced()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "enhanced" | "default" => Some(Self::enhanced()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Which behaviours are wired at startup
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub menu: bool,
    pub locale: bool,
    pub scroll_top: bool,
    pub header: bool,
    pub anchors: bool,
    pub reveal: bool,
    pub parallax: bool,
    pub counters: bool,
    pub active_nav: bool,
    pub lazy_images: bool,
    pub card_hover: bool,
    pub pie_links: bool,
    pub lightbox: bool,
    pub forms: bool,
    pub progress: bool,
    pub floating: bool,
    pub typing: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            menu: true,
            locale: true,
            scroll_top: true,
            header: true,
            anchors: true,
            reveal: true,
            parallax: true,
            counters: true,
            active_nav: true,
            lazy_images: true,
            card_hover: true,
            pie_links: true,
            lightbox: true,
            forms: true,
            progress: true,
            floating: true,
            typing: true,
        }
    }
}

/// Rate limits for scroll handlers; zero disables throttling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub throttle_ms: u64,
    pub parallax_throttle_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            parallax_throttle_ms: 16,
        }
    }
}

impl ScrollConfig {
    pub fn throttle(&self) -> Duration {
        ms(self.throttle_ms)
    }

    pub fn parallax_throttle(&self) -> Duration {
        ms(self.parallax_throttle_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub toggle: String,
    pub menu: String,
    /// Also mark the toggle button `active` while open
    pub mark_toggle: bool,
    /// Class toggled on `<body>` while open; empty for none
    pub body_class: String,
    pub close_on_escape: bool,
    /// Morph the three hamburger bars with inline styles
    pub animate_bars: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle: ".mobile-menu-toggle".to_string(),
            menu: ".nav-menu".to_string(),
            mark_toggle: true,
            body_class: "menu-open".to_string(),
            close_on_escape: true,
            animate_bars: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Storage key holding the preferred language
    pub storage_key: String,
    /// Language used when nothing valid is stored
    pub default: Locale,
    pub toggle: String,
    pub dropdown: String,
    pub options: String,
    pub current_label: String,
    pub bound: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            storage_key: "preferredLanguage".to_string(),
            default: Locale::Bengali,
            toggle: "#langToggle".to_string(),
            dropdown: ".lang-dropdown".to_string(),
            options: ".lang-option".to_string(),
            current_label: ".lang-current".to_string(),
            bound: "[data-lang-en], [data-lang-bn]".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTopConfig {
    pub selector: String,
    /// Offset past which the button shows
    pub threshold: f64,
}

impl Default for ScrollTopConfig {
    fn default() -> Self {
        Self {
            selector: ".scroll-top".to_string(),
            threshold: 300.0,
        }
    }
}

/// How the header shows that the page has scrolled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderStyle {
    /// Toggle the `scrolled` class
    Class,
    /// Swap an inline `box-shadow`
    Shadow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub selector: String,
    pub scrolled_offset: f64,
    pub hide_offset: f64,
    pub style: HeaderStyle,
    /// Slide the header away while scrolling down
    pub auto_hide: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: "#main-header".to_string(),
            scrolled_offset: 50.0,
            hide_offset: 100.0,
            style: HeaderStyle::Class,
            auto_hide: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub selector: String,
    /// Height of the fixed header to keep clear when scrolling to a target
    pub header_offset: f64,
    /// Cancel navigation even when the target is missing
    pub always_prevent_default: bool,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            selector: "a[href^=\"#\"]".to_string(),
            header_offset: 80.0,
            always_prevent_default: false,
        }
    }
}

/// How revealed elements reach their final state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealMode {
    /// Stagger with `transition-delay`, then add `visible`
    Class,
    /// Hide with inline styles, then add `animate-in`
    InlineStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub thresholds: Vec<f64>,
    pub root_margin: String,
    pub stagger_step_ms: u64,
    /// Stagger index wraps after this many elements
    pub stagger_cycle: usize,
    pub mode: RevealMode,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: concat!(
                ".scroll-reveal, .scroll-reveal-left, .scroll-reveal-right, .scroll-reveal-scale, ",
                ".project-card, .investment-card, .blog-card, .team-card, .facility-card, ",
                ".stat-card, .gallery-item, .media-logo-item, .opportunity-card, ",
                ".facility-item, .stat-item, .trust-content, .livestock-content, .about-content"
            )
            .to_string(),
            thresholds: vec![0.1, 0.25, 0.5],
            root_margin: "0px 0px -50px 0px".to_string(),
            stagger_step_ms: 100,
            stagger_cycle: 6,
            mode: RevealMode::Class,
        }
    }
}

/// Where the parallax offset is written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParallaxTarget {
    /// `transform: translateY(..)` on the hero background layer
    BackgroundTransform,
    /// `background-position-y` on the hero section itself
    HeroPosition,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub hero: String,
    pub background: String,
    pub speed: f64,
    pub target: ParallaxTarget,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            hero: ".hero-section".to_string(),
            background: ".hero-background".to_string(),
            speed: 0.4,
            target: ParallaxTarget::BackgroundTransform,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub selector: String,
    pub duration_ms: u64,
    pub threshold: f64,
    pub easing: Easing,
    /// Advance in this many equal steps instead of every frame
    pub steps: Option<u32>,
    /// Prefer the `data-count` attribute over the element's text
    pub read_data_count: bool,
    /// Render Bengali digits when the initial text used them
    pub localize_digits: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            selector: ".stat-number".to_string(),
            duration_ms: 2000,
            threshold: 0.5,
            easing: Easing::EaseOutQuart,
            steps: None,
            read_data_count: true,
            localize_digits: true,
        }
    }
}

impl CounterConfig {
    pub fn duration(&self) -> Duration {
        ms(self.duration_ms)
    }
}

/// How the current section is picked from the scroll offset
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SectionRule {
    /// `offset + lookahead` lies within `[top, top + height)`
    Window { lookahead: f64 },
    /// Scroll position has reached `top - offset`, ignoring section height
    Reached { offset: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub sections: String,
    pub links: String,
    pub rule: SectionRule,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sections: "section[id]".to_string(),
            links: ".nav-menu a[href^=\"#\"]".to_string(),
            rule: SectionRule::Window { lookahead: 150.0 },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LazyImageMode {
    /// Swap in `data-src` when the image first nears the viewport
    Observe,
    /// Copy `data-src` up front and let the host defer the load
    Native,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyImageConfig {
    pub selector: String,
    pub native_selector: String,
    pub root_margin: String,
    pub threshold: f64,
    pub mode: LazyImageMode,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            selector: "img[data-src]".to_string(),
            native_selector: "img[loading=\"lazy\"]".to_string(),
            root_margin: "50px 0px".to_string(),
            threshold: 0.01,
            mode: LazyImageMode::Observe,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardEffect {
    /// 3D tilt following the pointer
    Tilt,
    /// Lift and scale while hovered
    Lift,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub cards: String,
    pub effect: CardEffect,
    /// Pointer offset from the centre is divided by this to get degrees
    pub tilt_divisor: f64,
    pub pie_slices: String,
    pub profit_cards: String,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            cards: ".project-card, .investment-card, .blog-card, .team-card".to_string(),
            effect: CardEffect::Tilt,
            tilt_divisor: 20.0,
            pie_slices: ".pie-slice".to_string(),
            profit_cards: ".profit-card".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    pub triggers: String,
    pub show_delay_ms: u64,
    /// Time between `closing` and removal; zero removes immediately
    pub close_delay_ms: u64,
    pub close_on_escape: bool,
    /// Clicking the enlarged image itself closes the overlay
    pub close_on_image_click: bool,
    /// Hide body overflow while open
    pub lock_scroll: bool,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            triggers: ".gallery-item img, .blog-card img".to_string(),
            show_delay_ms: 10,
            close_delay_ms: 300,
            close_on_escape: true,
            close_on_image_click: false,
            lock_scroll: true,
        }
    }
}

impl LightboxConfig {
    pub fn show_delay(&self) -> Duration {
        ms(self.show_delay_ms)
    }

    pub fn close_delay(&self) -> Duration {
        ms(self.close_delay_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub forms: String,
    pub controls: String,
    pub email_pattern: String,
    /// Validate on blur, and on input once a control is marked invalid
    pub live_validation: bool,
    pub check_email: bool,
    /// Raise a notification with the submit result
    pub notify: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            forms: "form".to_string(),
            controls: "input, textarea, select".to_string(),
            email_pattern: r"^[^\s@]+@[^\s@]+\.[^\s@]+$".to_string(),
            live_validation: true,
            check_email: true,
            notify: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub show_delay_ms: u64,
    pub display_ms: u64,
    pub remove_delay_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: 10,
            display_ms: 3000,
            remove_delay_ms: 300,
        }
    }
}

impl NotificationConfig {
    pub fn show_delay(&self) -> Duration {
        ms(self.show_delay_ms)
    }

    pub fn display(&self) -> Duration {
        ms(self.display_ms)
    }

    pub fn remove_delay(&self) -> Duration {
        ms(self.remove_delay_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub selector: String,
    pub threshold: f64,
    pub restore_delay_ms: u64,
    pub transition: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            selector: ".progress-fill".to_string(),
            threshold: 0.5,
            restore_delay_ms: 200,
            transition: "width 1.5s ease-out".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    pub selector: String,
    /// Seconds of `animation-delay` added per element
    pub step: f64,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            selector: ".floating".to_string(),
            step: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub selector: String,
    /// The effect only runs on viewports wider than this
    pub min_viewport_width: f64,
    pub start_delay_ms: u64,
    pub char_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            selector: ".title-typing".to_string(),
            min_viewport_width: 768.0,
            start_delay_ms: 1000,
            char_delay_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_enhanced() {
        assert_eq!(EngineConfig::default(), EngineConfig::enhanced());
        assert_eq!(EngineConfig::preset("classic"), Some(EngineConfig::classic()));
        assert_eq!(EngineConfig::preset("fancy"), None);
    }

    #[test]
    fn test_classic_differs() {
        let classic = EngineConfig::classic();
        assert!(!classic.features.locale);
        assert_eq!(classic.scroll.throttle(), Duration::ZERO);
        assert_eq!(classic.reveal.mode, RevealMode::InlineStyle);
        assert_eq!(classic.counter.steps, Some(50));
        assert_eq!(classic.navigation.rule, SectionRule::Reached { offset: 100.0 });
        // Untouched sections keep enhanced values
        assert_eq!(classic.notifications, NotificationConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
            [features]
            typing = false

            [counter]
            duration_ms = 1500

            [navigation.rule]
            kind = "reached"
            offset = 80.0
            "#,
        )
        .unwrap();

        assert!(!config.features.typing);
        assert!(config.features.reveal);
        assert_eq!(config.counter.duration(), Duration::from_millis(1500));
        assert_eq!(config.counter.threshold, 0.5);
        assert_eq!(config.navigation.rule, SectionRule::Reached { offset: 80.0 });
        assert_eq!(config.locale.storage_key, "preferredLanguage");
    }

    #[test]
    fn test_toml_roundtrip_of_presets() {
        for config in [EngineConfig::enhanced(), EngineConfig::classic()] {
            let text = config.to_toml_string().unwrap();
            assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
        }
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = EngineConfig::from_toml_str("[counter]\nduration_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::EngineError::ConfigParse(_)));
    }
}

//! Tilth CLI
//!
//! Replay interaction scenarios against a page fixture and inspect the
//! resulting page state.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tilth_engine::{Engine, EngineConfig, PageBindings};
use tilth_platform::{Capabilities, JsonFileStorage, MemoryStorage, Storage};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod fixture;
mod report;
mod scenario;

use fixture::PageFixture;
use report::{NodeSnapshot, ReplayReport};
use scenario::{Replay, Scenario};

#[derive(Parser)]
#[command(name = "tilth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tilth interaction engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario against a page fixture
    Run {
        /// Page fixture (JSON)
        #[arg(short, long)]
        page: PathBuf,

        /// Scenario to replay (TOML); without one the page is only started
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Engine configuration file (TOML), overrides --preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in configuration (enhanced, classic)
        #[arg(long, default_value = "enhanced")]
        preset: String,

        /// Persist storage to this JSON file instead of memory
        #[arg(long)]
        storage: Option<PathBuf>,

        /// Pretend the host has no optional platform features
        #[arg(long)]
        minimal: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a built-in configuration as TOML
    Config {
        /// Preset to print (enhanced, classic)
        #[arg(default_value = "enhanced")]
        preset: String,
    },

    /// Show which page elements a configuration binds
    Check {
        /// Page fixture (JSON)
        #[arg(short, long)]
        page: PathBuf,

        /// Engine configuration file (TOML), overrides --preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in configuration (enhanced, classic)
        #[arg(long, default_value = "enhanced")]
        preset: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            page,
            scenario,
            config,
            preset,
            storage,
            minimal,
            json,
        } => {
            let config = load_config(config.as_deref(), &preset)?;
            let capabilities = if minimal {
                Capabilities::minimal()
            } else {
                Capabilities::default()
            };
            let options = RunOptions {
                page: &page,
                scenario: scenario.as_deref(),
                config,
                capabilities,
                json,
            };
            match storage {
                Some(path) => {
                    let storage = JsonFileStorage::open(&path)
                        .with_context(|| format!("Failed to open storage {}", path.display()))?;
                    cmd_run(options, storage)
                }
                None => cmd_run(options, MemoryStorage::new()),
            }
        }

        Commands::Config { preset } => cmd_config(&preset),

        Commands::Check {
            page,
            config,
            preset,
        } => cmd_check(&page, config.as_deref(), &preset),
    }
}

fn load_config(path: Option<&Path>, preset: &str) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            EngineConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))
        }
        None => EngineConfig::preset(preset).with_context(|| {
            format!("Unknown preset '{}'. Valid presets: enhanced, classic", preset)
        }),
    }
}

struct RunOptions<'a> {
    page: &'a Path,
    scenario: Option<&'a Path>,
    config: EngineConfig,
    capabilities: Capabilities,
    json: bool,
}

fn cmd_run<S: Storage>(options: RunOptions<'_>, storage: S) -> Result<()> {
    let fixture = PageFixture::load(options.page)?;
    let scenario = match options.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::from_toml("")?,
    };

    let engine = Engine::new(fixture.build(), storage, options.config, options.capabilities)
        .context("Failed to start engine")?;
    let mut replay = Replay::new(engine, scenario.frame_ms);
    replay.start();
    replay.run(&scenario)?;

    let engine = replay.engine();
    let doc = engine.document();
    let key = &engine.config().locale.storage_key;
    let report = ReplayReport {
        elapsed_ms: replay.elapsed().as_millis(),
        locale: engine.session().locale,
        scroll_y: doc.scroll_y(),
        active_section: engine.session().active_section.clone(),
        commands: replay.commands().to_vec(),
        stored: engine
            .storage()
            .get_item(key)
            .map(|value| (key.clone(), value))
            .into_iter()
            .collect(),
        document: NodeSnapshot::capture(doc, doc.body()),
    };

    if options.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_outline());
    }
    Ok(())
}

fn cmd_config(preset: &str) -> Result<()> {
    let config = load_config(None, preset)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn cmd_check(page: &Path, config: Option<&Path>, preset: &str) -> Result<()> {
    let config = load_config(config, preset)?;
    let doc = PageFixture::load(page)?.build();
    let bindings = PageBindings::resolve(&doc, &config)?;

    let flag = |found: bool| if found { "found" } else { "missing" };
    println!("menu:          {}", flag(bindings.menu.is_some()));
    println!("header:        {}", flag(bindings.header.is_some()));
    println!("scroll-top:    {}", flag(bindings.scroll_top.is_some()));
    println!("hero:          {}", flag(bindings.hero.is_some()));
    println!("typing title:  {}", flag(bindings.typing.is_some()));
    println!("translatable:  {}", bindings.locale.bound.len());
    println!("lang options:  {}", bindings.locale.options.len());
    println!("anchors:       {}", bindings.anchors.len());
    println!("reveal:        {}", bindings.reveal.len());
    println!("counters:      {}", bindings.counters.len());
    println!("sections:      {}", bindings.sections.len());
    println!("nav links:     {}", bindings.nav_links.len());
    println!("lazy images:   {}", bindings.lazy_images.len());
    println!("cards:         {}", bindings.cards.len());
    println!("pie slices:    {}", bindings.pie_slices.len());
    println!("profit cards:  {}", bindings.profit_cards.len());
    println!("lightbox:      {}", bindings.lightbox_triggers.len());
    println!("forms:         {}", bindings.forms.len());
    println!("progress bars: {}", bindings.progress_bars.len());
    println!("floating:      {}", bindings.floating.len());
    Ok(())
}

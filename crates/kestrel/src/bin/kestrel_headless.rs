//! Runs the demo scene without a window.
//!
//! ```text
//! kestrel_headless [config.toml]
//! kestrel_headless --print-config
//! ```
//!
//! Without a path the built-in defaults are used. `RUST_LOG` overrides the
//! config's `log_filter`.

use anyhow::{Context, Result};
use kestrel::scene::build_demo_scene;
use kestrel::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let arg = std::env::args().nth(1);

    if arg.as_deref() == Some("--print-config") {
        print!("{}", EngineConfig::default().to_toml_string()?);
        return Ok(());
    }

    let config = match &arg {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.simulation.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = &arg {
        tracing::info!(path, "configuration loaded");
    }

    let mut engine = Engine::new(config).context("starting engine")?;
    build_demo_scene(&mut engine).context("building demo scene")?;

    let summary = engine.run().context("running simulation")?;
    let last = summary.last_frame;
    tracing::info!(
        frames = summary.frames,
        simulated_seconds = summary.simulated_seconds,
        wall_ms = summary.wall_time.as_secs_f64() * 1000.0,
        bodies = last.map_or(0, |frame| frame.bodies),
        draw_commands = last.map_or(0, |frame| frame.draw_commands),
        "done"
    );

    Ok(())
}

//! Dry run: load a trigger profile, open the joystick and log every fired
//! trigger and key action.
//!
//! ```text
//! RUST_LOG=joytrigger=debug cargo run --example triggers -- demos/triggers.toml
//! ```

use color_eyre::{eyre::WrapErr, Result};
use joytrigger::{Device, LogSink, TriggerManager, TriggerProfile};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/triggers.toml".to_string());
    let profile =
        TriggerProfile::load(&path).wrap_err_with(|| format!("loading profile {path}"))?;

    let mut manager = TriggerManager::open(&profile).wrap_err("opening joystick")?;
    info!(
        profile = %profile.name,
        device = manager.decoder().device().id(),
        triggers = manager.engine().len(),
        "waiting for gestures"
    );

    manager.run(&mut LogSink::new())?;
    Ok(())
}

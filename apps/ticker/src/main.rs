//! Demo backend: draws an incrementing counter into a grid surface and
//! echoes clicks, keys, and menu commands into a text surface. Run it under
//! a compatible front end that speaks the line protocol on stdin/stdout.

use std::time::Duration;

use anyhow::Result;
use panebridge::{Bridge, BridgeConfig, GridOptions, SurfaceId, TextOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Protocol owns stdout; diagnostics go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let bridge = Bridge::stdio(BridgeConfig::from_env());

    let reports = bridge.open_text(TextOptions::new("Reports", "pages/log.html", 400, 300));
    let clock = bridge.open_grid(GridOptions::new("Ticker", "pages/grid.html", 40, 3));

    bridge.register_command("Say Hello", "CmdOrCtrl+H");
    bridge.menu_separator();
    bridge.register_command("Flash", "");
    bridge.build_menu();
    bridge.allow_quit();

    let mut tick: u64 = 0;
    while !bridge.should_quit().await? {
        tick += 1;
        clock.clear();
        for (i, digit) in tick.to_string().chars().enumerate() {
            clock.set(i as i32 + 1, 1, &digit.to_string(), "g", "0")?;
        }
        clock.flip(false).await;

        while let Some(click) = bridge.next_click(clock.id()).await? {
            reports.append(&format!(
                "click at ({}, {}), button {}",
                click.x, click.y, click.button
            ));
        }
        while let Some(key) = bridge.next_key(SurfaceId::UNSCOPED).await? {
            reports.append(&format!("key: {key}"));
        }
        while let Some(command) = bridge.next_command().await? {
            match command.as_str() {
                "Say Hello" => bridge.alert("Hello from the backend."),
                "Flash" => bridge.flash_effect(clock.id(), 1, 1, 0, 200, 255),
                other => reports.append(&format!("command: {other}")),
            }
        }

        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    tracing::info!(ticks = tick, "front end asked us to quit");
    Ok(())
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use config::ViewerConfig;
use log::info;

mod app;
mod chart;
mod cli;
mod config;
mod console;
mod link;
mod scene;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse(std::env::args().skip(1))?;
    if args.help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_args(&args);
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let input = cli::Input::resolve(&args, &config)?;
    let source = input.open(&config)?;
    let interrupted = install_interrupt_handler()?;

    if args.headless {
        console::run(source, config.monitor_config(), &interrupted)?;
        return Ok(());
    }

    info!("Starting viewer ({:?} view)", config.view);
    let input_name = input.describe();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 600.0])
            .with_title(format!("tiltscope - {}", input_name)),
        ..Default::default()
    };
    eframe::run_native(
        "tiltscope",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ViewerApp::new(
                cc,
                config,
                input_name,
                source,
                interrupted,
            )))
        }),
    )
    .map_err(|e| anyhow!("Viewer failed: {}", e))
}

/// Ctrl-C raises the returned flag so the read loop can stop and close the
/// port. A second Ctrl-C exits at once, for sources blocked in a read.
fn install_interrupt_handler() -> anyhow::Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        info!("Interrupted, shutting down (press Ctrl-C again to force)");
    })
    .context("Failed to install the Ctrl-C handler")?;
    Ok(interrupted)
}

//! Binary entry point: arguments, configuration, logging, demo run

use crate::app::cli::Args;
use crate::app::config::AppConfig;
use crate::app::demo::{run_demo, DemoReport};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, level_with_verbosity};
use crate::core::version::version_banner;
use crate::dispatch::EventManager;
use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;

/// Initialize application startup
pub fn startup() {
    let args = Args::parse();
    if args.version {
        println!("{}", version_banner());
        return;
    }

    let is_terminal = std::io::stdout().is_terminal();

    let (config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Logging is not configured yet; fall back to CLI-only settings
            let color = args.color_override().unwrap_or(is_terminal);
            if let Err(log_err) = init_logging(args.log_level.as_deref(), None, None, color) {
                eprintln!("Error initialising logging: {}", log_err);
            }
            log_error_with_context(&e, "Configuration loading");
            std::process::exit(1);
        }
    };

    let use_color = config.use_color(is_terminal);
    colored::control::set_override(use_color);

    let level = level_with_verbosity(&config.logging.level, args.verbosity());
    let log_file = config
        .logging
        .file
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        Some(level),
        Some(config.log_format()),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    log::info!("{}", version_banner());
    match &config_path {
        Some(path) => log::debug!("configuration loaded from {}", path.display()),
        None => log::debug!("no configuration file, using defaults"),
    }
    log::debug!("effective configuration: {:?}", config);

    let manager = EventManager::from_settings(&config.manager);
    match run_demo(&manager, &config) {
        Ok(report) => print_report(&report),
        Err(e) => {
            log_error_with_context(&e, "Event processing");
            std::process::exit(1);
        }
    }
}

fn load_config(
    args: &Args,
) -> Result<(AppConfig, Option<std::path::PathBuf>), crate::app::config::ConfigError> {
    let (mut config, path) = AppConfig::load(args.config_file.as_deref())?;
    config.apply_args(args)?;
    Ok((config, path))
}

fn print_report(report: &DemoReport) {
    println!(
        "{} {} admitted, {} rejected",
        "posted:".bold(),
        report.admitted,
        report.rejected
    );
    for (index, stats) in report.passes.iter().enumerate() {
        println!(
            "{} {:>3} live  {:>3} discarded  {} holder(s)",
            format!("pass {}:", index + 1).bold(),
            stats.live.to_string().green(),
            stats.discarded.to_string().yellow(),
            stats.gate_holders
        );
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Labeling Tool
//!
//! A cross-platform desktop application for labeling images and videos
//! with classed polygon and line shapes, organized in database-backed
//! projects.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::LabelApp;
use config::{AppConfig, LogLevel};

/// Logger whose own filter lets every level through, so the global max
/// level alone decides verbosity and can be raised at runtime. Directives
/// from `env` still narrow it.
fn build_logger(env: env_logger::Env) -> env_logger::Logger {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_env(env)
        .build()
}

fn init_logging(level: LogLevel) -> Result<()> {
    let overridden = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();
    let logger = build_logger(env_logger::Env::default());
    let env_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;

    // RUST_LOG wins over the configured level
    log::set_max_level(if overridden {
        env_level
    } else {
        level.to_level_filter()
    });
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::load();
    init_logging(config.log_level)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Labeling Tool"),
        ..Default::default()
    };

    eframe::run_native(
        "Labeling Tool",
        options,
        Box::new(|cc| {
            let app = LabelApp::new(config);
            cc.egui_ctx.set_visuals(app.visuals());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_logger_leaves_level_to_max_level() {
        let logger = build_logger(env_logger::Env::new().filter("LABELTOOL_TEST_LOG_UNSET"));
        assert_eq!(logger.filter(), log::LevelFilter::Trace);

        let debug = log::Metadata::builder()
            .level(log::Level::Debug)
            .target("labeltool")
            .build();
        assert!(logger.enabled(&debug));
    }
}

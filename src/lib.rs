//! NeuroUI: compose small neural circuits on a schematic and run them on a
//! simulation server.
//!
//! The editor core is split the way data flows through it: [`geometry`] places
//! anatomy on the surface, [`hit_test`] maps pointer positions back to anatomy,
//! [`interaction`] turns input into edits of the [`circuit`], and [`render`] draws
//! the result. [`app::Workbench`] wires those into an eframe application.

pub mod app;
pub mod chat;
pub mod circuit;
pub mod config;
pub mod dataflow;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod population;
pub mod render;
pub mod service;
pub mod snapshot;
pub mod themes;
pub mod widgets;

use eframe::egui;

pub use app::Workbench;
pub use config::WorkbenchConfig;

/// Open the workbench window and block until it is closed.
pub fn run(config: WorkbenchConfig) -> eframe::Result {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&config.title)
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            if let Err(err) =
                ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
            {
                log::warn!("failed to set exit signal handler: {err}");
            }

            cc.egui_ctx
                .set_style_of(egui::Theme::Light, themes::workbench_light());
            cc.egui_ctx
                .set_style_of(egui::Theme::Dark, themes::workbench_dark());
            cc.egui_ctx.set_theme(themes::detect_theme());

            log::info!("talking to simulation server at {}", config.server_url);
            Ok(Box::new(Workbench::new(&config)))
        }),
    )
}

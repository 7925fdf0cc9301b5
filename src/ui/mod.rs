//! egui/eframe user interface
//!
//! `WidgetState` is the chat widget's model; `ParleyApp` draws it each frame
//! from the components in [`components`].

mod app;
pub mod components;
pub mod selection;
pub mod state;
mod theme;

pub use app::ParleyApp;
pub use selection::InstructionSelection;
pub use state::{Platform, WidgetState};
pub use theme::Theme;

use crate::config::ParleyConfig;

/// Open the chat window and block until it is closed
pub fn run(config: ParleyConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([360.0, 420.0])
            .with_title("Parley"),
        ..Default::default()
    };

    eframe::run_native(
        "Parley",
        options,
        Box::new(move |cc| {
            let app = ParleyApp::new(cc, &config)?;
            Ok(Box::new(app))
        }),
    )
}

//! Main application struct and eframe integration

use crate::backend::BackendWorker;
use crate::config::ParleyConfig;
use crate::ui::components::{ControlBar, InputBar, InstructionPicker, MessageList, VoicePicker};
use crate::ui::state::{Platform, WidgetState};
use crate::ui::theme::Theme;
use crate::Result;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::{Duration, Instant};
use tracing::info;

/// Repaint interval while nothing is in progress, so backend events still
/// get picked up
const IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct ParleyApp {
    state: WidgetState,
    theme: Theme,
}

impl ParleyApp {
    /// Start the backend worker and native speech capabilities
    pub fn new(cc: &eframe::CreationContext<'_>, config: &ParleyConfig) -> Result<Self> {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        // The worker exits once the state's backend handle is dropped
        let (backend, _worker) = BackendWorker::spawn(&config.backend)?;
        let state = WidgetState::new(config, backend, Platform::native(config));

        Ok(Self { state, theme })
    }

    /// Wrap an existing state
    pub fn with_state(state: WidgetState, theme: Theme) -> Self {
        Self { state, theme }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WidgetState {
        &mut self.state
    }

    /// Run one frame: initialize, poll, draw, schedule the next repaint
    pub fn frame(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.state.initialize();
        self.state.poll_events(now);

        self.show_header(ctx);
        self.show_footer(ctx);
        self.show_content(ctx);

        if self.state.is_busy() {
            ctx.request_repaint();
        } else if let Some(deadline) = self.state.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing_sm * 1.5),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Parley")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        VoicePicker::new(&mut self.state, &self.theme).show(ui);
                    });
                });
                InstructionPicker::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing_sm * 1.5),
            )
            .show(ctx, |ui| {
                ControlBar::new(&mut self.state, &self.theme).show(ui);
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing_sm),
            )
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for ParleyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Parley shutting down");
        self.state.speech_input.stop();
        self.state.speech_output.stop();
    }
}

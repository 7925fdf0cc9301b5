//! Microphone and speaker toggles

use crate::ui::state::WidgetState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

pub struct ControlBar<'a> {
    state: &'a mut WidgetState,
    theme: &'a Theme,
}

impl<'a> ControlBar<'a> {
    pub fn new(state: &'a mut WidgetState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            self.show_mic_button(ui);
            self.show_speaker_button(ui);

            if self.state.speech_input.is_listening() {
                ui.label(RichText::new("Listening...").color(self.theme.listening));
            }
        });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let listening = self.state.speech_input.is_listening();
        let available = self.state.speech_input.is_available();

        let (icon, color) = if listening {
            ("⏹", self.theme.listening)
        } else {
            ("🎤", self.theme.text_secondary)
        };
        let mut button = egui::Button::new(RichText::new(icon).size(18.0).color(color))
            .min_size(Vec2::splat(36.0))
            .rounding(self.theme.button_rounding);
        if listening {
            button = button.fill(self.theme.listening.gamma_multiply(0.2));
        }

        let response = ui.add_enabled(available, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, available, "Microphone")
        });

        let tooltip = match (available, listening) {
            (false, _) => "Speech recognition unavailable",
            (true, true) => "Stop listening",
            (true, false) => "Start listening",
        };
        if response.on_hover_text(tooltip).clicked() {
            self.state.toggle_listening();
        }
    }

    fn show_speaker_button(&mut self, ui: &mut egui::Ui) {
        let speaking = self.state.speech_output.is_speaking();
        let enabled = !self.state.transcript.is_empty();

        let (icon, color) = if speaking {
            ("🔇", self.theme.speaking)
        } else {
            ("🔊", self.theme.text_secondary)
        };
        let mut button = egui::Button::new(RichText::new(icon).size(18.0).color(color))
            .min_size(Vec2::splat(36.0))
            .rounding(self.theme.button_rounding);
        if speaking {
            button = button.fill(self.theme.speaking.gamma_multiply(0.2));
        }

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, "Speaker")
        });

        let tooltip = if speaking { "Stop speaking" } else { "Read the last reply aloud" };
        if response.on_hover_text(tooltip).clicked() {
            self.state.toggle_speaker();
        }
    }
}

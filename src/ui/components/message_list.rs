//! Message list component
//!
//! User messages sit on the right in an accent bubble, assistant replies on
//! the left. While a reply is pending a "Typing..." line is shown.

use crate::messages::Message;
use crate::ui::state::WidgetState;
use crate::ui::theme::Theme;
use egui::{self, Align, RichText};

pub struct MessageList<'a> {
    state: &'a WidgetState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a WidgetState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.transcript.get_all();

        egui::ScrollArea::vertical()
            .id_salt("messages")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing_sm);

                if messages.is_empty() && !self.state.loading {
                    self.show_empty_state(ui);
                }

                for message in &messages {
                    self.show_message(ui, message);
                    ui.add_space(self.theme.spacing_sm);
                }

                if self.state.loading {
                    self.show_typing(ui);
                }

                ui.add_space(self.theme.spacing_sm);
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(
                RichText::new("Type a message or press the microphone to talk.")
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = message.is_user();
        let (bubble, text_color, align) = if is_user {
            (self.theme.user_bubble, self.theme.user_text, Align::RIGHT)
        } else {
            (
                self.theme.assistant_bubble,
                self.theme.assistant_text,
                Align::LEFT,
            )
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    let response = ui.label(RichText::new(&message.content).color(text_color));
                    let label = if is_user {
                        format!("User message: {}", message.content)
                    } else {
                        format!("Assistant message: {}", message.content)
                    };
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                });

            ui.label(
                RichText::new(message.timestamp.format("%H:%M").to_string())
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_typing(&self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            let response = ui.label(
                RichText::new("Typing...")
                    .italics()
                    .color(self.theme.text_muted),
            );
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Typing indicator")
            });
        });
    }
}

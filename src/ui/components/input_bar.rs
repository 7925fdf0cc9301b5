//! Text input and send button

use crate::ui::state::WidgetState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

pub struct InputBar<'a> {
    state: &'a mut WidgetState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut WidgetState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let available_width = ui.available_width() - 80.0;

            let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
                .hint_text("Type a message...")
                .desired_width(available_width)
                .margin(egui::Margin::symmetric(10.0, 6.0))
                .id(egui::Id::new("message_input"));
            let response = ui.add(text_edit);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
            });

            // Singleline edits drop focus on Enter
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let can_send = self.state.can_submit();
            let button = egui::Button::new(RichText::new("Send").color(egui::Color32::WHITE))
                .min_size(Vec2::new(64.0, 32.0))
                .rounding(self.theme.button_rounding)
                .fill(if can_send {
                    self.theme.primary
                } else {
                    self.theme.text_muted
                });
            let send = ui.add_enabled(can_send, button);
            send.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
            });

            if (send.clicked() || enter) && can_send {
                self.state.submit();
                response.request_focus();
            }
        });
    }
}

use crate::ui::state::WidgetState;
use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Voice selector, fed by the synthesizer's voice list
pub struct VoicePicker<'a> {
    state: &'a mut WidgetState,
    theme: &'a Theme,
}

impl<'a> VoicePicker<'a> {
    pub fn new(state: &'a mut WidgetState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Voice:").color(self.theme.text_secondary));

            let catalog = self.state.speech_output.voices();
            let enabled = !catalog.is_empty();
            let selected_text = match catalog.selected() {
                Some(voice) => voice.label(),
                None if enabled => "Default".to_string(),
                None => "No voices".to_string(),
            };

            let mut picked: Option<String> = None;
            let combo = ui.add_enabled_ui(enabled, |ui| {
                egui::ComboBox::from_id_salt("voice")
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        for voice in catalog.voices() {
                            let is_selected = catalog.selected_name() == Some(voice.name.as_str());
                            if ui.selectable_label(is_selected, voice.label()).clicked() {
                                picked = Some(voice.name.clone());
                            }
                        }
                    })
                    .response
            });
            combo.inner.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::ComboBox, enabled, "Voice")
            });

            if let Some(name) = picked {
                self.state.speech_output.voices_mut().select(&name);
            }
        });
    }
}

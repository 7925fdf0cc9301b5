//! Instruction-set picker
//!
//! A combo box over the backend's catalog plus a numeric field for an id
//! that is not in the catalog.

use crate::ui::state::WidgetState;
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub struct InstructionPicker<'a> {
    state: &'a mut WidgetState,
    theme: &'a Theme,
}

impl<'a> InstructionPicker<'a> {
    pub fn new(state: &'a mut WidgetState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Instructions:").color(self.theme.text_secondary));

            let selection = &self.state.instructions;
            let selected_text = match selection.selected() {
                Some(id) => selection.catalog().name_of(id).unwrap_or(id).to_string(),
                None if !selection.custom().is_empty() => "Custom".to_string(),
                None if selection.catalog().is_empty() => "Loading...".to_string(),
                None => "Select...".to_string(),
            };

            let mut picked: Option<String> = None;
            let combo = egui::ComboBox::from_id_salt("instruction_set")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (id, name) in selection.catalog().entries() {
                        let is_selected = selection.selected() == Some(id.as_str());
                        if ui.selectable_label(is_selected, name).clicked() {
                            picked = Some(id.clone());
                        }
                    }
                });
            combo.response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::ComboBox, true, "Instruction set")
            });

            let mut custom = self.state.instructions.custom().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut custom)
                    .hint_text("Custom id")
                    .desired_width(80.0)
                    .id(egui::Id::new("custom_instruction")),
            );
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Custom instruction")
            });

            if let Some(id) = picked {
                self.state.select_instruction(&id);
            } else if response.changed() {
                self.state.set_custom_instruction(&custom);
            }
        });
    }
}

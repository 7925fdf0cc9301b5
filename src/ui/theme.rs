//! Colors, spacing and text styles for the chat window

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

#[derive(Clone, Debug)]
pub struct Theme {
    /// Accent color for buttons and highlights
    pub primary: Color32,
    /// Active microphone
    pub listening: Color32,
    /// Active speaker
    pub speaking: Color32,

    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Bubble behind the user's messages
    pub user_bubble: Color32,
    pub user_text: Color32,
    /// Bubble behind the assistant's messages
    pub assistant_bubble: Color32,
    pub assistant_text: Color32,

    pub button_rounding: Rounding,
    pub bubble_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(0, 123, 255),
            listening: Color32::from_rgb(220, 38, 38),
            speaking: Color32::from_rgb(22, 163, 74),

            bg_primary: Color32::from_rgb(255, 255, 255),
            bg_secondary: Color32::from_rgb(243, 244, 246),
            bg_tertiary: Color32::from_rgb(229, 231, 235),

            text_primary: Color32::from_rgb(17, 24, 39),
            text_secondary: Color32::from_rgb(55, 65, 81),
            text_muted: Color32::from_rgb(107, 114, 128),

            user_bubble: Color32::from_rgb(0, 123, 255),
            user_text: Color32::WHITE,
            assistant_bubble: Color32::from_rgb(233, 236, 239),
            assistant_text: Color32::from_rgb(17, 24, 39),

            button_rounding: Rounding::same(8.0),
            bubble_rounding: Rounding::same(14.0),
            card_rounding: Rounding::same(12.0),

            spacing: 16.0,
            spacing_sm: 8.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(59, 130, 246),
            listening: Color32::from_rgb(239, 68, 68),
            speaking: Color32::from_rgb(34, 197, 94),

            bg_primary: Color32::from_rgb(17, 24, 39),
            bg_secondary: Color32::from_rgb(31, 41, 55),
            bg_tertiary: Color32::from_rgb(55, 65, 81),

            text_primary: Color32::from_rgb(249, 250, 251),
            text_secondary: Color32::from_rgb(209, 213, 219),
            text_muted: Color32::from_rgb(156, 163, 175),

            user_bubble: Color32::from_rgb(37, 99, 235),
            user_text: Color32::WHITE,
            assistant_bubble: Color32::from_rgb(55, 65, 81),
            assistant_text: Color32::from_rgb(249, 250, 251),

            ..Self::light()
        }
    }

    /// Install the theme into an egui context
    pub fn apply(&self, ctx: &egui::Context) {
        let dark = self.bg_primary.r() < 128;
        let mut visuals = if dark { Visuals::dark() } else { Visuals::light() };

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_secondary;

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);
        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.8);
        visuals.widgets.active.bg_fill = self.primary;

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);
        visuals.hyperlink_color = self.primary;
        visuals.window_rounding = self.card_rounding;

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(self.spacing_sm * 1.5, self.spacing_sm);
        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(22.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(11.0, FontFamily::Proportional),
        );
        ctx.set_style(style);
    }
}

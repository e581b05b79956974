//! Modal prompt for the authorization token

use eframe::egui;

use crate::config::token;
use crate::gui::constants::*;

#[derive(Default)]
pub struct TokenDialog {
    open: bool,
    input: String,
    reveal: bool,
    reason: Option<String>,
}

impl TokenDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog, optionally explaining why a token is needed
    pub fn open(&mut self, reason: Option<String>) {
        self.open = true;
        self.input.clear();
        self.reveal = false;
        self.reason = reason;
    }

    /// Returns the normalized token once the user confirms a non-empty value
    pub fn ui(&mut self, ctx: &egui::Context) -> Option<String> {
        if !self.open {
            return None;
        }

        let mut submitted = None;
        let mut close = false;

        egui::Window::new("Set Auth Token")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if let Some(reason) = &self.reason {
                    ui.colored_label(STATUS_WARN, reason);
                    ui.add_space(ITEM_SPACING);
                }

                ui.label("Paste the authorization token (a leading 'JWT ' is removed):");
                ui.add(
                    egui::TextEdit::singleline(&mut self.input)
                        .password(!self.reveal)
                        .desired_width(380.0),
                );
                ui.checkbox(&mut self.reveal, "Show token");

                let normalized = token::normalize(&self.input);
                ui.add_space(ITEM_SPACING);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!normalized.is_empty(), egui::Button::new("Set Token"))
                        .clicked()
                    {
                        submitted = Some(normalized.clone());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.open = false;
            self.input.clear();
        }
        submitted
    }
}

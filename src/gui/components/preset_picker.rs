//! Buttons that overwrite a group of keys with a named preset

use eframe::egui;

use crate::config::{Configuration, PresetKind, apply_preset};
use crate::error::ConfigError;
use crate::gui::constants::*;

fn kind_title(kind: PresetKind) -> &'static str {
    match kind {
        PresetKind::Client => "Client",
        PresetKind::Location => "Location",
        PresetKind::Endpoint => "Endpoint",
    }
}

/// Renders the preset rows. Returns the result of a clicked preset, if any.
pub fn ui(ui: &mut egui::Ui, config: &mut Configuration) -> Option<Result<String, ConfigError>> {
    let mut applied = None;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Presets").strong());
        ui.add_space(ITEM_SPACING / 2.0);

        for kind in PresetKind::ALL {
            ui.horizontal_wrapped(|ui| {
                ui.label(format!("{}:", kind_title(kind)));
                for name in kind.names() {
                    let hover = kind.keys().join(", ");
                    if ui.small_button(name).on_hover_text(hover).clicked() {
                        applied = Some(apply_preset(config.clone(), name, kind).map(|updated| {
                            *config = updated;
                            format!("Applied {kind} preset '{name}'")
                        }));
                    }
                }
            });
        }
    });

    applied
}

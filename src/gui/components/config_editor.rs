//! Tabbed editor over the working configuration

use eframe::egui;

use crate::config::{Category, Configuration, catalog, env_file};
use crate::constants::keys;
use crate::gui::constants::*;
use crate::request::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorTab {
    Known(Category),
    Other,
}

pub struct ConfigEditor {
    tab: EditorTab,
    reveal_sensitive: bool,
    new_key: String,
    new_value: String,
    add_error: Option<String>,
}

impl Default for ConfigEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigEditor {
    pub fn new() -> Self {
        Self {
            tab: EditorTab::Known(Category::Api),
            reveal_sensitive: false,
            new_key: String::new(),
            new_value: String::new(),
            add_error: None,
        }
    }

    /// Renders the editor and returns true if any value changed
    pub fn ui(&mut self, ui: &mut egui::Ui, config: &mut Configuration) -> bool {
        let mut changed = false;

        ui.horizontal_wrapped(|ui| {
            for category in Category::ALL {
                ui.selectable_value(&mut self.tab, EditorTab::Known(category), category.title());
            }
            ui.selectable_value(&mut self.tab, EditorTab::Other, "Other");
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("config_editor_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                EditorTab::Known(category) => {
                    changed |= self.category_ui(ui, config, category);
                }
                EditorTab::Other => {
                    changed |= self.other_ui(ui, config);
                }
            });

        changed
    }

    fn category_ui(&mut self, ui: &mut egui::Ui, config: &mut Configuration, category: Category) -> bool {
        let mut changed = false;

        if catalog::in_category(category).any(|p| p.sensitive) {
            ui.checkbox(&mut self.reveal_sensitive, "Show sensitive values");
            ui.add_space(ITEM_SPACING / 2.0);
        }

        egui::Grid::new(("config_grid", category.title()))
            .num_columns(2)
            .spacing([ITEM_SPACING, ITEM_SPACING])
            .striped(true)
            .show(ui, |ui| {
                for param in catalog::in_category(category) {
                    let hover = if param.description.is_empty() {
                        param.key.to_string()
                    } else {
                        format!("{}\n{}", param.key, param.description)
                    };
                    ui.add_sized([EDITOR_LABEL_WIDTH, 18.0], egui::Label::new(param.label))
                        .on_hover_text(hover);
                    changed |= value_ui(ui, config, param.key, param.sensitive && !self.reveal_sensitive);
                    ui.end_row();
                }
            });

        changed
    }

    fn other_ui(&mut self, ui: &mut egui::Ui, config: &mut Configuration) -> bool {
        let mut changed = false;
        let entries = unlisted_entries(config);

        if entries.is_empty() {
            ui.label(egui::RichText::new("(No extra keys in this configuration)").italics().weak());
        }

        let mut removed = None;
        egui::Grid::new("config_grid_other")
            .num_columns(3)
            .spacing([ITEM_SPACING, ITEM_SPACING])
            .striped(true)
            .show(ui, |ui| {
                for (key, _) in &entries {
                    ui.add_sized([EDITOR_LABEL_WIDTH, 18.0], egui::Label::new(key.as_str()));
                    changed |= value_ui(ui, config, key, false);
                    if ui.small_button("🗑").on_hover_text("Remove key").clicked() {
                        removed = Some(key.clone());
                    }
                    ui.end_row();
                }
            });

        if let Some(key) = removed {
            config.remove(&key);
            changed = true;
        }

        ui.add_space(SECTION_SPACING);
        ui.group(|ui| {
            ui.label(egui::RichText::new("Add Key").strong());
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut self.new_key).hint_text("KEY").desired_width(150.0));
                ui.add(egui::TextEdit::singleline(&mut self.new_value).hint_text("value"));
                if ui.button("➕ Add").clicked() {
                    match add_entry(config, &self.new_key, &self.new_value) {
                        Ok(()) => {
                            self.new_key.clear();
                            self.new_value.clear();
                            self.add_error = None;
                            changed = true;
                        }
                        Err(message) => self.add_error = Some(message),
                    }
                }
            });
            if let Some(message) = &self.add_error {
                ui.colored_label(STATUS_ERROR, message);
            }
        });

        changed
    }
}

/// Editor widget for one key, picked by what the key holds
fn value_ui(ui: &mut egui::Ui, config: &mut Configuration, key: &str, masked: bool) -> bool {
    if BOOL_KEYS.contains(&key) {
        let mut enabled = config.flag(key);
        if ui.checkbox(&mut enabled, "").changed() {
            config.set(key, enabled.to_string());
            return true;
        }
        return false;
    }

    if key == keys::API_ENDPOINT {
        let mut changed = false;
        let current = config.value(key).to_string();
        egui::ComboBox::from_id_salt("endpoint_selector")
            .selected_text(if current.is_empty() { Endpoint::default().name() } else { current.as_str() })
            .show_ui(ui, |ui| {
                for endpoint in Endpoint::ALL {
                    if ui.selectable_label(current == endpoint.name(), endpoint.name()).clicked() {
                        config.set(key, endpoint.name());
                        changed = true;
                    }
                }
            });
        return changed;
    }

    let mut value = config.value(key).to_string();
    let edit = if MULTILINE_KEYS.contains(&key) && !masked {
        egui::TextEdit::multiline(&mut value)
            .desired_rows(MULTILINE_ROWS)
            .code_editor()
    } else {
        egui::TextEdit::singleline(&mut value).password(masked)
    };
    if ui.add(edit.desired_width(f32::INFINITY)).changed() {
        config.set(key, value);
        return true;
    }
    false
}

/// Entries whose keys have no catalog metadata, in file order
fn unlisted_entries(config: &Configuration) -> Vec<(String, String)> {
    config
        .iter()
        .filter(|(key, _)| catalog::lookup(key).is_none())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn add_entry(config: &mut Configuration, key: &str, value: &str) -> Result<(), String> {
    let key = key.trim();
    if !env_file::is_valid_key(key) {
        return Err(format!("'{key}' is not a valid key: use letters, digits and underscores"));
    }
    if config.get(key).is_some() {
        return Err(format!("{key} already exists: edit it in place"));
    }
    config.set(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlisted_entries_skips_catalog_keys() {
        let config = Configuration::parse("API_HOST='h'\nMY_EXTRA='1'\nOTHER='2'\n");
        assert_eq!(
            unlisted_entries(&config),
            vec![
                ("MY_EXTRA".to_string(), "1".to_string()),
                ("OTHER".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_add_entry_validates_key() {
        let mut config = Configuration::new();
        assert!(add_entry(&mut config, "bad key", "x").is_err());
        assert!(add_entry(&mut config, " NEW_KEY ", "x").is_ok());
        assert_eq!(config.get("NEW_KEY"), Some("x"));
        assert!(add_entry(&mut config, "NEW_KEY", "y").unwrap_err().contains("already exists"));
    }
}

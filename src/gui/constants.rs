//! GUI-specific constants for layout and status colors

/// Main window dimensions
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 860.0;
pub const WINDOW_MIN_WIDTH: f32 = 900.0;
pub const WINDOW_MIN_HEIGHT: f32 = 600.0;

/// Layout spacing
pub const PADDING: f32 = 10.0;
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;

/// Panels
pub const ACTIONS_PANEL_WIDTH: f32 = 230.0;
pub const EDITOR_PANEL_WIDTH: f32 = 460.0;
pub const EDITOR_LABEL_WIDTH: f32 = 150.0;
pub const MULTILINE_ROWS: usize = 4;

/// Status colors
pub const STATUS_OK: egui::Color32 = egui::Color32::from_rgb(0, 170, 0);
pub const STATUS_ERROR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
pub const STATUS_WARN: egui::Color32 = egui::Color32::from_rgb(200, 150, 0);
pub const STATUS_INFO: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);

/// Keys edited with a checkbox instead of a text field
pub const BOOL_KEYS: &[&str] = &[
    crate::constants::keys::SUPPORT_PARTNER_DASHPASS,
    crate::constants::keys::DEFAULT_VERBOSE,
    crate::constants::keys::USE_PROXY,
];

/// Keys edited with a multi-line text field
pub const MULTILINE_KEYS: &[&str] = &[
    crate::constants::keys::COOKIE,
    crate::constants::keys::REALTIME_EVENTS,
    crate::constants::keys::DD_IDS,
    crate::constants::keys::DD_LOCATION_CONTEXT,
];

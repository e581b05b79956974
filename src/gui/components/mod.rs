pub mod config_editor;
pub mod preset_picker;
pub mod response_view;
pub mod token_dialog;

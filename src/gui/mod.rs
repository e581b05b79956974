//! Desktop editor for the request configuration, built on egui/eframe

mod app;
mod components;
mod constants;

pub use app::run_gui;

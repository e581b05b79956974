//! Desktop app: editor, actions and response tabs around one request cycle

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use eframe::{CreationContext, NativeOptions, egui};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use super::components::config_editor::ConfigEditor;
use super::components::preset_picker;
use super::components::response_view::{self, ResponseView};
use super::components::token_dialog::TokenDialog;
use super::constants::*;
use crate::config::Configuration;
use crate::constants::{http::DEFAULT_TIMEOUT_SECS, keys};
use crate::error::ConfigError;
use crate::executor::ExecuteOptions;
use crate::pipeline::{self, RequestCycle, RequestEvent};
use crate::request::{self, Request, TokenDisplay};

struct StatusMessage {
    text: String,
    color: egui::Color32,
    at: DateTime<Local>,
}

struct FeedProbeApp {
    runtime: Runtime,
    config_path: PathBuf,
    /// Edited by the widgets
    working: Configuration,
    /// Used for requests; updated by Save to Memory / Save to File / Reload
    committed: Configuration,
    cycle: RequestCycle,
    events_tx: Sender<RequestEvent>,
    events_rx: Receiver<RequestEvent>,
    last_request: Option<Request>,
    verbose: bool,
    editor: ConfigEditor,
    token_dialog: TokenDialog,
    response_view: ResponseView,
    curl_preview: Option<String>,
    show_save_confirm: bool,
    status_message: Option<StatusMessage>,
}

impl FeedProbeApp {
    fn new(_cc: &CreationContext<'_>, runtime: Runtime, config_path: PathBuf) -> Self {
        info!(config = %config_path.display(), "Initializing feedprobe GUI");

        let (events_tx, events_rx) = mpsc::channel();
        let mut app = Self {
            runtime,
            config_path,
            working: Configuration::new(),
            committed: Configuration::new(),
            cycle: RequestCycle::new(),
            events_tx,
            events_rx,
            last_request: None,
            verbose: false,
            editor: ConfigEditor::new(),
            token_dialog: TokenDialog::new(),
            response_view: ResponseView::new(),
            curl_preview: None,
            show_save_confirm: false,
            status_message: None,
        };

        match Configuration::load(&app.config_path) {
            Ok(config) => {
                app.verbose = config.flag(keys::DEFAULT_VERBOSE);
                app.working = config.clone();
                app.committed = config;
                app.set_status(format!("Loaded {}", app.config_path.display()), STATUS_INFO);
            }
            Err(err @ ConfigError::Missing { .. }) => {
                warn!(error = %err, "starting with an empty configuration");
                app.set_status(format!("{err}. Fill in the settings and use Save to File."), STATUS_WARN);
            }
            Err(err) => {
                error!(error = %err, "Failed to load configuration");
                app.set_status(err.to_string(), STATUS_ERROR);
            }
        }

        app
    }

    fn set_status(&mut self, text: impl Into<String>, color: egui::Color32) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            color,
            at: Local::now(),
        });
    }

    fn is_dirty(&self) -> bool {
        self.working != self.committed
    }

    fn poll_events(&mut self) {
        while let Ok(RequestEvent::Finished(result)) = self.events_rx.try_recv() {
            match &result {
                Ok(report) => {
                    let color = if report.is_success() { STATUS_OK } else { STATUS_WARN };
                    self.set_status(
                        format!(
                            "HTTP {} in {:.2}s, {} '{}' values",
                            report.status,
                            report.elapsed.as_secs_f64(),
                            report.extracted_items.len(),
                            report.extract_field
                        ),
                        color,
                    );
                    self.response_view.select(response_view::preferred_tab(report));
                }
                Err(err) => {
                    warn!(error = %err, "request failed");
                    self.set_status(format!("Request failed: {err}"), STATUS_ERROR);
                }
            }
            self.cycle.finish(result);
        }
    }

    /// Open the token dialog if the committed token cannot be sent
    fn require_token(&mut self, action: &str) -> bool {
        if self.committed.token().is_usable() {
            return true;
        }
        let message = format!("{action} needs an authorization token. Set one to continue.");
        self.set_status(&message, STATUS_WARN);
        self.token_dialog.open(Some(message));
        false
    }

    fn build_request(&mut self) -> Option<Request> {
        let endpoint = self.committed.endpoint();
        match request::build(&self.committed, endpoint) {
            Ok(request) => Some(request),
            Err(err) => {
                self.set_status(err.to_string(), STATUS_ERROR);
                None
            }
        }
    }

    fn make_request(&mut self, ctx: &egui::Context) {
        if self.cycle.is_requesting() || !self.require_token("Make Request") {
            return;
        }
        let Some(request) = self.build_request() else {
            return;
        };
        let options = match ExecuteOptions::from_config(&self.committed, Duration::from_secs(DEFAULT_TIMEOUT_SECS)) {
            Ok(options) => options,
            Err(err) => {
                self.set_status(err.to_string(), STATUS_ERROR);
                return;
            }
        };
        if !self.cycle.begin() {
            return;
        }

        info!(endpoint = %request.endpoint, url = %request.url, "dispatching request");
        self.last_request = Some(request.clone());
        self.set_status(format!("Requesting {}...", request.endpoint), STATUS_INFO);

        let ctx = ctx.clone();
        pipeline::dispatch(
            self.runtime.handle(),
            request,
            options,
            self.committed.extract_field().to_string(),
            self.events_tx.clone(),
            move || ctx.request_repaint(),
        );
    }

    fn clear_response(&mut self) {
        if self.cycle.is_requesting() {
            self.set_status("A request is in flight; wait for it to finish", STATUS_WARN);
            return;
        }
        self.cycle.reset();
        self.last_request = None;
        self.curl_preview = None;
        self.set_status("Response cleared", STATUS_INFO);
    }

    fn copy_curl(&mut self, ctx: &egui::Context) {
        if !self.require_token("Copy as cURL") {
            return;
        }
        let Some(request) = self.build_request() else {
            return;
        };
        ctx.copy_text(request::render_curl(&request, TokenDisplay::Full));
        self.curl_preview = Some(request::render_curl(&request, TokenDisplay::Masked));
        self.set_status("cURL command copied to clipboard (includes the full token)", STATUS_OK);
    }

    fn apply_token(&mut self, token: String) {
        self.working.set(keys::AUTHORIZATION_TOKEN, token.as_str());
        self.committed.set(keys::AUTHORIZATION_TOKEN, token);
        info!("authorization token updated");
        self.set_status("Authorization token set (not yet saved to file)", STATUS_OK);
    }

    fn save_to_memory(&mut self) {
        self.committed = self.working.clone();
        self.set_status("Settings saved to memory; requests now use them", STATUS_OK);
    }

    fn save_to_file(&mut self) {
        match self.working.save(&self.config_path) {
            Ok(report) => {
                self.committed = self.working.clone();
                let text = match &report.backup {
                    Some(backup) => format!(
                        "Saved {} (backup: {})",
                        report.path.display(),
                        backup.display()
                    ),
                    None => format!("Saved {}", report.path.display()),
                };
                self.set_status(text, STATUS_OK);
            }
            Err(err) => {
                error!(error = %err, "Failed to save configuration");
                self.set_status(err.to_string(), STATUS_ERROR);
            }
        }
    }

    fn reload(&mut self) {
        match Configuration::load(&self.config_path) {
            Ok(config) => {
                self.working = config.clone();
                self.committed = config;
                self.set_status(format!("Reloaded {}", self.config_path.display()), STATUS_OK);
            }
            Err(err) => {
                warn!(error = %err, "reload failed, keeping current settings");
                self.set_status(err.to_string(), STATUS_ERROR);
            }
        }
    }

    fn actions_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label(egui::RichText::new("Request").strong());
        ui.add_space(ITEM_SPACING / 2.0);

        let requesting = self.cycle.is_requesting();
        let label = if requesting { "⏳ Requesting..." } else { "▶ Make Request" };
        if ui
            .add_enabled(!requesting, egui::Button::new(label).min_size([ui.available_width(), 28.0].into()))
            .clicked()
        {
            self.make_request(ctx);
        }
        if ui.button("🗑 Clear Response").clicked() {
            self.clear_response();
        }
        if ui.button("📋 Copy as cURL").clicked() {
            self.copy_curl(ctx);
        }
        ui.checkbox(&mut self.verbose, "Verbose output");

        ui.add_space(SECTION_SPACING);
        ui.label(egui::RichText::new("Configuration").strong());
        ui.add_space(ITEM_SPACING / 2.0);

        if ui.button("🔑 Set Auth Token").clicked() {
            self.token_dialog.open(None);
        }
        if ui.button("💾 Save to Memory").clicked() {
            self.save_to_memory();
        }
        if ui.button("📝 Save to File").clicked() {
            self.show_save_confirm = true;
        }
        if ui.button("🔄 Reload from File").clicked() {
            self.reload();
        }

        if self.is_dirty() {
            ui.add_space(ITEM_SPACING);
            ui.colored_label(
                STATUS_WARN,
                egui::RichText::new("Unsaved edits are not used by requests until saved").small(),
            );
        }

        ui.add_space(SECTION_SPACING);
        ui.label(egui::RichText::new("Config file").strong());
        ui.label(egui::RichText::new(self.config_path.display().to_string()).small().weak());

        if let Some(preview) = &self.curl_preview {
            ui.add_space(SECTION_SPACING);
            ui.label(egui::RichText::new("Last cURL (token masked)").strong());
            egui::ScrollArea::vertical()
                .id_salt("curl_preview_scroll")
                .max_height(200.0)
                .show(ui, |ui| {
                    ui.add(egui::TextEdit::multiline(&mut preview.as_str()).code_editor());
                });
        }
    }

    fn warnings_ui(&self, ui: &mut egui::Ui) {
        let warnings = self.committed.warnings();
        if warnings.is_empty() {
            return;
        }
        ui.group(|ui| {
            for warning in warnings {
                ui.colored_label(STATUS_WARN, format!("⚠ {warning}"));
            }
        });
        ui.add_space(ITEM_SPACING);
    }

    fn save_confirm_ui(&mut self, ctx: &egui::Context) {
        if !self.show_save_confirm {
            return;
        }
        let mut confirmed = false;
        let mut cancelled = false;

        egui::Window::new("Save to File")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Overwrite {}?", self.config_path.display()));
                ui.label(
                    egui::RichText::new("The current file is copied to a .backup file first.")
                        .small()
                        .weak(),
                );
                ui.add_space(ITEM_SPACING);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            self.save_to_file();
        }
        if confirmed || cancelled {
            self.show_save_confirm = false;
        }
    }

    fn status_bar_ui(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| match &self.status_message {
            Some(message) => {
                ui.label(
                    egui::RichText::new(message.at.format("[%H:%M:%S]").to_string())
                        .small()
                        .weak(),
                );
                ui.colored_label(message.color, &message.text);
            }
            None => {
                ui.label(egui::RichText::new("Ready").weak());
            }
        });
    }
}

impl eframe::App for FeedProbeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        if let Some(token) = self.token_dialog.ui(ctx) {
            self.apply_token(token);
        }
        self.save_confirm_ui(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.add_space(ITEM_SPACING / 2.0);
            self.status_bar_ui(ui);
            ui.add_space(ITEM_SPACING / 2.0);
        });

        egui::SidePanel::left("actions_panel")
            .exact_width(ACTIONS_PANEL_WIDTH)
            .show(ctx, |ui| {
                ui.add_space(PADDING);
                ui.heading("FeedProbe");
                ui.add_space(SECTION_SPACING);
                self.actions_ui(ui, ctx);
            });

        egui::SidePanel::left("editor_panel")
            .default_width(EDITOR_PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(PADDING);
                self.warnings_ui(ui);
                if let Some(result) = preset_picker::ui(ui, &mut self.working) {
                    match result {
                        Ok(text) => self.set_status(text, STATUS_OK),
                        Err(err) => self.set_status(err.to_string(), STATUS_ERROR),
                    }
                }
                ui.add_space(ITEM_SPACING);
                self.editor.ui(ui, &mut self.working);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(PADDING);
            self.response_view
                .ui(ui, &self.cycle, self.last_request.as_ref(), self.verbose);
        });

        if self.cycle.is_requesting() {
            // keep the elapsed counter moving
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.is_dirty() {
            warn!("exiting with unsaved configuration edits");
        }
        info!("GUI exiting");
    }
}

pub fn run_gui(config_path: PathBuf) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title("FeedProbe"),
        ..Default::default()
    };

    eframe::run_native(
        "FeedProbe",
        options,
        Box::new(move |cc| Ok(Box::new(FeedProbeApp::new(cc, runtime, config_path)))),
    )
    .map_err(|err| anyhow!("Failed to launch feedprobe GUI: {err}"))
}

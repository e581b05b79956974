//! Response tabs for the current request cycle

use eframe::egui;

use crate::gui::constants::*;
use crate::interpret::{self, Report};
use crate::pipeline::{RequestCycle, RequestState};
use crate::request::{self, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTab {
    Summary,
    Extracted,
    Carousels,
    Experiments,
    Raw,
    Request,
}

impl ResponseTab {
    const ALL: [ResponseTab; 6] = [
        ResponseTab::Summary,
        ResponseTab::Extracted,
        ResponseTab::Carousels,
        ResponseTab::Experiments,
        ResponseTab::Raw,
        ResponseTab::Request,
    ];

    fn label(&self) -> &'static str {
        match self {
            ResponseTab::Summary => "Summary",
            ResponseTab::Extracted => "Extracted",
            ResponseTab::Carousels => "Carousels",
            ResponseTab::Experiments => "Experiments",
            ResponseTab::Raw => "Raw",
            ResponseTab::Request => "Request",
        }
    }
}

/// Tab to show first for a fresh report
pub fn preferred_tab(report: &Report) -> ResponseTab {
    match &report.experiments {
        Some(analysis) if !analysis.experiments.is_empty() => ResponseTab::Experiments,
        _ => ResponseTab::Summary,
    }
}

/// Text for `tab`; `None` when the tab needs a completed report
pub fn tab_text(tab: ResponseTab, report: Option<&Report>, request: Option<&Request>, verbose: bool) -> Option<String> {
    match tab {
        ResponseTab::Request => request.map(request::render_request_details),
        ResponseTab::Summary => report.map(|r| interpret::render_summary(r, verbose)),
        ResponseTab::Extracted => report.map(interpret::render_extracted),
        ResponseTab::Carousels => report.map(interpret::render_carousels),
        ResponseTab::Experiments => report.map(interpret::render_experiments),
        ResponseTab::Raw if verbose => report.map(|r| interpret::render_raw(r, None)),
        ResponseTab::Raw => report.map(|r| r.raw_body.clone()),
    }
}

pub struct ResponseView {
    tab: ResponseTab,
}

impl Default for ResponseView {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseView {
    pub fn new() -> Self {
        Self {
            tab: ResponseTab::Summary,
        }
    }

    pub fn select(&mut self, tab: ResponseTab) {
        self.tab = tab;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, cycle: &RequestCycle, request: Option<&Request>, verbose: bool) {
        ui.horizontal(|ui| {
            for tab in ResponseTab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
        });
        ui.separator();

        match cycle.state() {
            RequestState::Idle if self.tab != ResponseTab::Request => {
                ui.label(egui::RichText::new("No response yet. Use Make Request to send one.").italics().weak());
                return;
            }
            RequestState::Requesting { started } if self.tab != ResponseTab::Request => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Requesting... {:.1}s", started.elapsed().as_secs_f64()));
                });
                return;
            }
            RequestState::Failed(err) if self.tab != ResponseTab::Request => {
                ui.colored_label(STATUS_ERROR, egui::RichText::new("Request failed").strong());
                ui.colored_label(STATUS_ERROR, err.to_string());
                return;
            }
            _ => {}
        }

        let Some(text) = tab_text(self.tab, cycle.report(), request, verbose) else {
            ui.label(egui::RichText::new("No request has been built yet.").italics().weak());
            return;
        };

        egui::ScrollArea::both()
            .id_salt("response_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut text.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
    }
}

//! "Open from Brain" dialog listing the pipelines stored on the server.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::pipeline::PipelineSummary;
use egui::{RichText, Ui};

#[derive(Debug, Default)]
pub struct OpenPipelineState {
    pub filter: String,
    pub selected: Option<String>,
}

impl DialogState for OpenPipelineState {
    fn is_valid(&self) -> bool {
        self.selected.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpenPipelineAction {
    Refresh,
    Open(String),
}

pub struct OpenPipelineContext<'a> {
    /// `None` while the list request is in flight.
    pub pipelines: Option<&'a [PipelineSummary]>,
}

pub struct OpenPipelineDialog;

/// Case-insensitive match on name, id or description.
pub fn matches_filter(summary: &PipelineSummary, filter: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    filter.is_empty()
        || summary.name.to_lowercase().contains(&filter)
        || summary.id.to_lowercase().contains(&filter)
        || summary.description.to_lowercase().contains(&filter)
}

impl Dialog for OpenPipelineDialog {
    type State = OpenPipelineState;
    type Action = OpenPipelineAction;
    type Context<'a> = OpenPipelineContext<'a>;

    fn title(_state: &Self::State) -> &'static str {
        "Open from Brain"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig {
            default_width: 420.0,
            ..DialogWindowConfig::default()
        }
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let mut action = DialogAction::None;

        ui.horizontal(|ui| {
            ui.label("Filter:");
            ui.text_edit_singleline(&mut state.filter);
            if ui.button("⟳").on_hover_text("Reload list").clicked() {
                action = DialogAction::Action(OpenPipelineAction::Refresh);
            }
        });
        ui.separator();

        match ctx.pipelines {
            None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading pipelines...");
                });
            }
            Some([]) => {
                ui.label(RichText::new("No pipelines saved yet.").weak());
            }
            Some(pipelines) => {
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for summary in pipelines.iter().filter(|p| matches_filter(p, &state.filter)) {
                        let selected = state.selected.as_deref() == Some(summary.id.as_str());
                        let response = ui.selectable_label(selected, summary.label());
                        let response = if summary.description.is_empty() {
                            response
                        } else {
                            response.on_hover_text(&summary.description)
                        };
                        if response.clicked() {
                            state.selected = Some(summary.id.clone());
                        }
                        if response.double_clicked() {
                            action = DialogAction::CloseWithAction(OpenPipelineAction::Open(
                                summary.id.clone(),
                            ));
                        }
                    }
                });
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                action = DialogAction::Close;
            }
            let open = ui.add_enabled(state.is_valid(), egui::Button::new("Open"));
            if open.clicked() {
                if let Some(id) = state.selected.clone() {
                    action = DialogAction::CloseWithAction(OpenPipelineAction::Open(id));
                }
            }
        });

        action
    }
}

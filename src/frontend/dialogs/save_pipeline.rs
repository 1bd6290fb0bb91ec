//! "Save As" dialog asking for the pipeline name and description.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use egui::Ui;

#[derive(Debug, Default)]
pub struct SavePipelineState {
    pub name: String,
    pub description: String,
}

impl SavePipelineState {
    pub fn with_defaults(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl DialogState for SavePipelineState {
    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavePipelineAction {
    pub name: String,
    pub description: String,
}

pub struct SavePipelineDialog;

impl Dialog for SavePipelineDialog {
    type State = SavePipelineState;
    type Action = SavePipelineAction;
    type Context<'a> = ();

    fn title(_state: &Self::State) -> &'static str {
        "Save Pipeline As"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(360.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let mut action = DialogAction::None;

        egui::Grid::new("save_pipeline_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut state.name);
                ui.end_row();

                ui.label("Description:");
                ui.text_edit_multiline(&mut state.description);
                ui.end_row();
            });

        if !state.is_valid() {
            ui.colored_label(egui::Color32::LIGHT_RED, "A name is required.");
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                action = DialogAction::Close;
            }
            if ui
                .add_enabled(state.is_valid(), egui::Button::new("Save"))
                .clicked()
            {
                action = DialogAction::CloseWithAction(SavePipelineAction {
                    name: state.name.trim().to_string(),
                    description: state.description.trim().to_string(),
                });
            }
        });

        action
    }
}

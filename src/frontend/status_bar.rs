//! Status bar panel: pipeline identity, graph counts, shape health and the
//! Brain connection target.

use egui::{Color32, RichText, Ui};

use crate::pipeline::GraphStore;

use super::state::PipelineSession;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub store: &'a GraphStore,
    pub session: &'a PipelineSession,
    pub brain_url: &'a str,
    pub status: Option<&'a str>,
}

pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === Save state dot + pipeline name ===
        let (dot_color, save_text) = if ctx.session.is_saving() {
            (Color32::YELLOW, "Saving")
        } else if ctx.session.is_dirty(ctx.store) {
            (Color32::from_rgb(255, 160, 60), "Unsaved")
        } else if ctx.session.is_persisted() {
            (Color32::GREEN, "Saved")
        } else {
            (Color32::GRAY, "Local")
        };
        ui.colored_label(dot_color, "●");
        ui.label(RichText::new(format!("{}: {}", save_text, ctx.session.name)).small());

        ui.separator();

        ui.label(RichText::new(format!("Data: {}", ctx.store.data_type())).small());
        ui.separator();
        ui.label(
            RichText::new(format!(
                "Blocks: {}  Connections: {}",
                ctx.store.blocks().len(),
                ctx.store.connections().len()
            ))
            .small(),
        );

        ui.separator();

        let problems = ctx.store.shape_errors().len() + ctx.store.cycles().len();
        if problems > 0 {
            ui.colored_label(
                Color32::LIGHT_RED,
                RichText::new(format!("Shape issues: {}", problems)).small(),
            );
        } else {
            ui.colored_label(Color32::from_rgb(100, 255, 100), RichText::new("Shapes OK").small());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("Brain: {}", ctx.brain_url)).small().weak());
            if let Some(status) = ctx.status {
                ui.separator();
                ui.label(RichText::new(status).small());
            }
        });
    });
}

//! Frontend module for egui UI
//!
//! The window is a single pipeline editor: menu bar, an optional error
//! banner, the canvas with its configuration panel, and a status bar. All
//! Brain traffic goes through the [`PersistenceBridge`]; replies are drained
//! at the start of every frame.
//!
//! # Main Types
//!
//! - [`ThothApp`] - Main application state implementing [`eframe::App`]
//! - [`PipelineEditorState`] - Canvas view state (viewport, selection, drags)
//! - [`AppAction`] - Edits and commands produced by the UI
//!
//! # Submodules
//!
//! - `pipeline_editor` - Canvas painting and block configuration panel
//! - `dialogs` - Open-from-Brain and Save-As dialogs
//! - `state` - Actions and the save-state of the current pipeline

pub mod dialogs;
pub mod pipeline_editor;
pub mod state;
mod status_bar;

pub use pipeline_editor::PipelineEditorState;
pub use state::{AppAction, ErrorBanner, PipelineSession};

use dialogs::{
    show_dialog, OpenPipelineAction, OpenPipelineContext, OpenPipelineDialog, OpenPipelineState,
    SavePipelineDialog, SavePipelineState,
};
use status_bar::{render_status_bar, StatusBarContext};

use crate::backend::{Operation, PersistenceBridge, PersistenceMessage};
use crate::config::{self, AppConfig, AppState, PipelineFile};
use crate::editor::Viewport;
use crate::pipeline::{templates, DataType, GraphStore, PipelineDocument, PipelineSummary};
use egui::{Color32, RichText};
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

/// Poll interval while a Brain request is outstanding.
const PENDING_REPAINT: Duration = Duration::from_millis(150);

/// Main application state
pub struct ThothApp {
    // === Communication ===
    persistence: PersistenceBridge,
    worker: Option<JoinHandle<()>>,

    // === Configuration ===
    config: AppConfig,
    app_state: AppState,

    // === Pipeline ===
    store: GraphStore,
    session: PipelineSession,
    editor: PipelineEditorState,

    // === Brain requests ===
    pipeline_list: Option<Vec<PipelineSummary>>,
    opening: Option<String>,

    // === Dialogs ===
    open_dialog_open: bool,
    open_dialog_state: OpenPipelineState,
    save_dialog_open: bool,
    save_dialog_state: SavePipelineState,

    // === Feedback ===
    error: Option<ErrorBanner>,
    status: Option<String>,
    applied_dark_mode: Option<bool>,
    window_title: String,
}

impl ThothApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        persistence: PersistenceBridge,
        worker: Option<JoinHandle<()>>,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        let mut app = Self::from_parts(persistence, worker, config, app_state);
        app.apply_visuals(&cc.egui_ctx);
        app
    }

    /// Build the app without a window, e.g. for tests.
    pub fn from_parts(
        persistence: PersistenceBridge,
        worker: Option<JoinHandle<()>>,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        let data_type = app_state
            .last_data_type
            .filter(|dt| DataType::selectable().contains(dt))
            .unwrap_or(config.editor.default_data_type);
        let store = GraphStore::new(data_type)
            .with_bounds(config.editor.bounds())
            .with_convention(config.editor.shape_convention);
        let (min_zoom, max_zoom) = config.editor.zoom_range();

        Self {
            persistence,
            worker,
            store,
            session: PipelineSession::default(),
            editor: PipelineEditorState::new(Viewport::new(min_zoom, max_zoom)),
            config,
            app_state,
            pipeline_list: None,
            opening: None,
            open_dialog_open: false,
            open_dialog_state: OpenPipelineState::default(),
            save_dialog_open: false,
            save_dialog_state: SavePipelineState::default(),
            error: None,
            status: None,
            applied_dark_mode: None,
            window_title: String::new(),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    fn has_pending_requests(&self) -> bool {
        self.session.is_saving()
            || self.opening.is_some()
            || (self.open_dialog_open && self.pipeline_list.is_none())
    }

    /// Apply every reply the persistence worker has sent since last frame.
    pub fn process_persistence_messages(&mut self) -> bool {
        let messages = self.persistence.drain();
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.apply_persistence_message(msg);
        }
        had_messages
    }

    fn apply_persistence_message(&mut self, msg: PersistenceMessage) {
        match msg {
            PersistenceMessage::PipelineList(list) => {
                tracing::info!("Received {} pipelines", list.len());
                self.pipeline_list = Some(list);
            }
            PersistenceMessage::PipelineOpened(doc) => {
                self.opening = None;
                self.load_pipeline(doc, true);
            }
            PersistenceMessage::PipelineCreated(doc) | PersistenceMessage::PipelineUpdated(doc) => {
                self.session.mark_saved(&doc, &self.store);
                if let Some(id) = &self.session.pipeline_id {
                    self.app_state.add_recent_pipeline(id, &self.session.name);
                }
                self.status = Some(format!("Saved '{}'", self.session.name));
            }
            PersistenceMessage::Error { operation, message } => {
                match operation {
                    Operation::Create | Operation::Update => self.session.save_failed(),
                    Operation::Open => self.opening = None,
                    Operation::List => self.pipeline_list = Some(Vec::new()),
                }
                self.error = Some(ErrorBanner::new(format!("Failed to {}: {}", operation, message)));
            }
            PersistenceMessage::Shutdown => {
                tracing::info!("Persistence worker shutdown received");
            }
        }
    }

    /// Replace the graph with `doc`. The Brain id is kept only for documents
    /// that came from the Brain.
    fn load_pipeline(&mut self, mut doc: PipelineDocument, from_brain: bool) {
        if !from_brain {
            doc.id = None;
        }
        if let Some(data_type) = doc.source_data_type() {
            self.store.set_data_type(data_type);
        }
        if let Err(e) = self.store.load_document(&doc) {
            tracing::warn!("Failed to load pipeline '{}': {}", doc.name, e);
            self.error = Some(ErrorBanner::new(format!("Failed to load pipeline: {}", e)));
            return;
        }

        self.session = PipelineSession::opened(&doc, &self.store);
        if let Some(id) = &doc.id {
            self.app_state.add_recent_pipeline(id, &doc.name);
        }
        self.app_state.last_data_type = Some(self.store.data_type());
        self.editor.graph_replaced();
        self.status = Some(format!("Opened '{}'", doc.name));
    }

    fn report_send(&mut self, sent: bool) {
        if !sent {
            self.session.save_failed();
            self.opening = None;
            self.error = Some(ErrorBanner::new("Persistence worker is not running"));
        }
    }

    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::AddBlock(type_id) => match self.store.add_block(type_id) {
                Ok(id) => self.editor.selected = Some(id),
                Err(e) => self.error = Some(ErrorBanner::new(e.to_string())),
            },
            AppAction::DeleteBlock(id) => {
                if let Err(e) = self.store.delete_block(&id) {
                    tracing::warn!("{}", e);
                }
                self.editor.block_removed(&id);
            }
            AppAction::Connect { from, to } => {
                self.store.add_connection(&from, &to);
            }
            AppAction::Disconnect { from, to } => {
                self.store.delete_connection(&from, &to);
            }
            AppAction::MoveBlock { id, position } => {
                if let Err(e) = self.store.move_block(&id, position) {
                    tracing::warn!("{}", e);
                }
            }
            AppAction::SetConfigValue { id, key, value } => {
                if let Err(e) = self.store.set_config_value(&id, &key, value) {
                    tracing::warn!("{}", e);
                }
            }
            AppAction::SetDataType(data_type) => {
                self.store.set_data_type(data_type);
                self.app_state.last_data_type = Some(data_type);
            }
            AppAction::NewPipeline => {
                self.store.clear();
                self.session = PipelineSession::default();
                self.editor.graph_replaced();
                self.status = None;
            }
            AppAction::ApplyTemplate(name) => {
                let Some(template) = templates::find(name) else {
                    tracing::warn!("Unknown template '{}'", name);
                    return;
                };
                match self.store.apply_template(template) {
                    Ok(()) => {
                        self.session = PipelineSession::unsaved(template.name, template.description);
                        self.app_state.last_data_type = Some(template.data_type);
                        self.editor.graph_replaced();
                    }
                    Err(e) => self.error = Some(ErrorBanner::new(e.to_string())),
                }
            }
            AppAction::BrowseBrain => {
                self.open_dialog_open = true;
                self.handle_action(AppAction::RefreshPipelineList);
            }
            AppAction::RefreshPipelineList => {
                self.pipeline_list = None;
                let sent = self.persistence.list_pipelines();
                if !sent {
                    self.pipeline_list = Some(Vec::new());
                }
                self.report_send(sent);
            }
            AppAction::OpenFromBrain(id) => {
                self.status = Some(format!("Opening {}...", id));
                self.opening = Some(id.clone());
                let sent = self.persistence.open_pipeline(id);
                self.report_send(sent);
            }
            AppAction::Save => match self.session.pipeline_id.clone() {
                Some(id) => {
                    self.session.begin_save(&self.store);
                    let sent = self.persistence.update_pipeline(id, self.store.update_request());
                    self.report_send(sent);
                }
                None => {
                    self.save_dialog_state =
                        SavePipelineState::with_defaults(&self.session.name, &self.session.description);
                    self.save_dialog_open = true;
                }
            },
            AppAction::SaveAs { name, description } => {
                self.session.name = name.clone();
                self.session.description = description.clone();
                self.session.begin_save(&self.store);
                let sent = self
                    .persistence
                    .create_pipeline(self.store.create_request(&name, &description));
                self.report_send(sent);
            }
            AppAction::ImportJson(path) => self.import_json(path),
            AppAction::ExportJson(path) => self.export_json(path),
            AppAction::FitToContent => self.editor.request_fit(),
            AppAction::ResetView => self.editor.reset_view(),
            AppAction::SetDarkMode(dark) => self.app_state.ui_preferences.dark_mode = dark,
            AppAction::SetShowGrid(show) => self.app_state.ui_preferences.show_grid = show,
            AppAction::DismissError => self.error = None,
        }
    }

    fn import_json(&mut self, path: PathBuf) {
        match PipelineFile::load(&path) {
            Ok(file) => {
                self.store.set_data_type(file.data_type);
                self.load_pipeline(file.pipeline, false);
                self.app_state.last_file_dir = path.parent().map(PathBuf::from);
            }
            Err(e) => {
                tracing::warn!("Import failed: {}", e);
                self.error = Some(ErrorBanner::new(e.to_string()));
            }
        }
    }

    fn export_json(&mut self, path: PathBuf) {
        let path = config::with_pipeline_extension(path);
        let mut doc = self.store.to_document(&self.session.name, &self.session.description);
        doc.id = self.session.pipeline_id.clone();

        match PipelineFile::new(doc, self.store.data_type()).save(&path) {
            Ok(()) => {
                tracing::info!("Exported pipeline to {:?}", path);
                self.status = Some(format!("Exported to {}", path.display()));
                self.app_state.last_file_dir = path.parent().map(PathBuf::from);
            }
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                self.error = Some(ErrorBanner::new(e.to_string()));
            }
        }
    }

    fn file_dialog(&self) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new().add_filter("Thoth Pipeline", &["json"]);
        match &self.app_state.last_file_dir {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        let dark = self.app_state.ui_preferences.dark_mode;
        if self.applied_dark_mode != Some(dark) {
            ctx.set_visuals(if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.applied_dark_mode = Some(dark);
        }
    }

    fn update_window_title(&mut self, ctx: &egui::Context) {
        let title = format!("{} - Thoth Studio", self.session.title(&self.store));
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        use egui::Key;

        let mut actions = Vec::new();
        ctx.input(|i| {
            if i.key_pressed(Key::S) && i.modifiers.command_only() {
                actions.push(AppAction::Save);
            }
            if i.key_pressed(Key::O) && i.modifiers.command_only() {
                actions.push(AppAction::BrowseBrain);
            }
            if i.key_pressed(Key::F) && i.modifiers.command_only() {
                actions.push(AppAction::FitToContent);
            }
        });
        actions
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    actions.push(AppAction::NewPipeline);
                    ui.close();
                }
                ui.menu_button("Templates", |ui| {
                    for template in templates::all() {
                        if ui
                            .button(template.name)
                            .on_hover_text(template.description)
                            .clicked()
                        {
                            actions.push(AppAction::ApplyTemplate(template.name));
                            ui.close();
                        }
                    }
                });
                ui.separator();
                if ui.button("Open from Brain...").clicked() {
                    actions.push(AppAction::BrowseBrain);
                    ui.close();
                }
                ui.add_enabled_ui(!self.app_state.recent_pipelines.is_empty(), |ui| {
                    ui.menu_button("Open Recent", |ui| {
                        for recent in &self.app_state.recent_pipelines {
                            if ui.button(&recent.name).on_hover_text(&recent.id).clicked() {
                                actions.push(AppAction::OpenFromBrain(recent.id.clone()));
                                ui.close();
                            }
                        }
                    });
                });
                ui.separator();
                if ui.button("Save").clicked() {
                    actions.push(AppAction::Save);
                    ui.close();
                }
                if ui.button("Save As...").clicked() {
                    self.save_dialog_state =
                        SavePipelineState::with_defaults(&self.session.name, &self.session.description);
                    self.save_dialog_open = true;
                    ui.close();
                }
                ui.separator();
                if ui.button("Import JSON...").clicked() {
                    if let Some(path) = self.file_dialog().set_title("Import Pipeline").pick_file() {
                        actions.push(AppAction::ImportJson(path));
                    }
                    ui.close();
                }
                if ui.button("Export JSON...").clicked() {
                    let file_name = format!("{}.{}", self.session.name, config::PIPELINE_FILE_EXTENSION);
                    if let Some(path) = self
                        .file_dialog()
                        .set_title("Export Pipeline")
                        .set_file_name(file_name)
                        .save_file()
                    {
                        actions.push(AppAction::ExportJson(path));
                    }
                    ui.close();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Fit to content").clicked() {
                    actions.push(AppAction::FitToContent);
                    ui.close();
                }
                if ui.button("Reset view").clicked() {
                    actions.push(AppAction::ResetView);
                    ui.close();
                }
                ui.separator();
                let mut dark = self.app_state.ui_preferences.dark_mode;
                if ui.checkbox(&mut dark, "Dark mode").changed() {
                    actions.push(AppAction::SetDarkMode(dark));
                }
                let mut grid = self.app_state.ui_preferences.show_grid;
                if ui.checkbox(&mut grid, "Show grid").changed() {
                    actions.push(AppAction::SetShowGrid(grid));
                }
            });

            ui.separator();
            ui.label("Data type:");
            let current = self.store.data_type();
            egui::ComboBox::from_id_salt("data_type_selector")
                .selected_text(current.display_name())
                .show_ui(ui, |ui| {
                    for data_type in DataType::selectable() {
                        if ui
                            .selectable_label(current == *data_type, data_type.display_name())
                            .clicked()
                            && current != *data_type
                        {
                            actions.push(AppAction::SetDataType(*data_type));
                        }
                    }
                });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.has_pending_requests() {
                    ui.spinner();
                }
                ui.label(RichText::new(self.session.title(&self.store)).strong());
            });
        });
    }

    fn render_error_banner(&self, ctx: &egui::Context, actions: &mut Vec<AppAction>) {
        let Some(error) = &self.error else {
            return;
        };
        egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
            egui::Frame::new()
                .fill(Color32::from_rgb(120, 30, 30))
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::WHITE, &error.message);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                                actions.push(AppAction::DismissError);
                            }
                        });
                    });
                });
        });
    }

    fn render_dialogs(&mut self, ctx: &egui::Context, actions: &mut Vec<AppAction>) {
        let dialog_ctx = OpenPipelineContext {
            pipelines: self.pipeline_list.as_deref(),
        };
        if let Some(action) = show_dialog::<OpenPipelineDialog>(
            ctx,
            &mut self.open_dialog_open,
            &mut self.open_dialog_state,
            dialog_ctx,
        ) {
            actions.push(match action {
                OpenPipelineAction::Refresh => AppAction::RefreshPipelineList,
                OpenPipelineAction::Open(id) => AppAction::OpenFromBrain(id),
            });
        }

        if let Some(save) = show_dialog::<SavePipelineDialog>(
            ctx,
            &mut self.save_dialog_open,
            &mut self.save_dialog_state,
            (),
        ) {
            actions.push(AppAction::SaveAs {
                name: save.name,
                description: save.description,
            });
        }
    }
}

impl eframe::App for ThothApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_persistence_messages();
        if had_messages {
            ctx.request_repaint();
        } else if self.has_pending_requests() {
            ctx.request_repaint_after(PENDING_REPAINT);
        }

        let mut actions = self.handle_keyboard_shortcuts(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui, &mut actions);
        });

        self.render_error_banner(ctx, &mut actions);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    store: &self.store,
                    session: &self.session,
                    brain_url: &self.config.backend.base_url,
                    status: self.status.as_deref(),
                },
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            actions.extend(pipeline_editor::render(
                &mut self.editor,
                &self.store,
                self.app_state.ui_preferences.show_grid,
                ui,
            ));
        });

        self.render_dialogs(ctx, &mut actions);

        for action in actions {
            self.handle_action(action);
        }

        self.apply_visuals(ctx);
        self.update_window_title(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.persistence.shutdown();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::warn!("Persistence worker panicked");
            }
        }

        self.app_state.last_data_type = Some(self.store.data_type());
        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PersistenceCommand;
    use crossbeam_channel::{Receiver, Sender};

    fn test_app() -> (ThothApp, Receiver<PersistenceCommand>, Sender<PersistenceMessage>) {
        let (bridge, cmd_rx, msg_tx) = PersistenceBridge::new();
        let app = ThothApp::from_parts(bridge, None, AppConfig::default(), AppState::default());
        (app, cmd_rx, msg_tx)
    }

    #[test]
    fn test_starts_with_configured_data_type() {
        let (bridge, _cmd_rx, _msg_tx) = PersistenceBridge::new();
        let state = AppState {
            last_data_type: Some(DataType::Imu),
            ..AppState::default()
        };
        let app = ThothApp::from_parts(bridge, None, AppConfig::default(), state);
        assert_eq!(app.store().data_type(), DataType::Imu);
    }

    #[test]
    fn test_save_unsaved_pipeline_asks_for_name() {
        let (mut app, cmd_rx, _msg_tx) = test_app();
        app.handle_action(AppAction::AddBlock("csi_loader"));
        app.handle_action(AppAction::Save);
        assert!(app.save_dialog_open);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn test_save_as_then_created() {
        let (mut app, cmd_rx, msg_tx) = test_app();
        app.handle_action(AppAction::ApplyTemplate("CSI basic"));
        app.handle_action(AppAction::SaveAs {
            name: "gestures".into(),
            description: "room A".into(),
        });
        assert!(app.session().is_saving());

        let request = match cmd_rx.try_recv() {
            Ok(PersistenceCommand::CreatePipeline(request)) => request,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(request.name, "gestures");
        assert_eq!(request.blocks.len(), 5);

        let mut doc = app.store().to_document("gestures", "room A");
        doc.id = Some("p-31".into());
        msg_tx.send(PersistenceMessage::PipelineCreated(doc)).unwrap();
        app.process_persistence_messages();

        assert_eq!(app.session().pipeline_id.as_deref(), Some("p-31"));
        assert!(!app.session().is_dirty(app.store()));
        assert_eq!(app.app_state().recent_pipelines[0].id, "p-31");

        app.handle_action(AppAction::Save);
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(PersistenceCommand::UpdatePipeline { id, .. }) if id == "p-31"
        ));
    }

    #[test]
    fn test_save_failure_keeps_graph_and_shows_banner() {
        let (mut app, _cmd_rx, msg_tx) = test_app();
        app.handle_action(AppAction::ApplyTemplate("CSI basic"));
        app.handle_action(AppAction::SaveAs {
            name: "x".into(),
            description: String::new(),
        });
        let generation = app.store().generation();

        msg_tx
            .send(PersistenceMessage::Error {
                operation: Operation::Create,
                message: "Backend returned 500: boom".into(),
            })
            .unwrap();
        app.process_persistence_messages();

        assert_eq!(app.store().blocks().len(), 5);
        assert_eq!(app.store().generation(), generation);
        assert!(!app.session().is_persisted());
        assert!(!app.session().is_saving());
        assert!(app.error().unwrap().message.contains("boom"));

        app.handle_action(AppAction::DismissError);
        assert!(app.error().is_none());
    }

    #[test]
    fn test_opened_pipeline_replaces_graph() {
        let (mut app, _cmd_rx, msg_tx) = test_app();
        app.handle_action(AppAction::AddBlock("csi_loader"));

        let template = templates::find("IMU activity windows").unwrap();
        let mut doc = template.document();
        doc.id = Some("p-5".into());
        msg_tx.send(PersistenceMessage::PipelineOpened(doc)).unwrap();
        app.process_persistence_messages();

        assert_eq!(app.store().blocks().len(), 5);
        assert_eq!(app.store().data_type(), DataType::Imu);
        assert_eq!(app.session().pipeline_id.as_deref(), Some("p-5"));
        assert!(!app.session().is_dirty(app.store()));
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _cmd_rx, _msg_tx) = test_app();
        app.handle_action(AppAction::ApplyTemplate("CSI amplitude + phase fusion"));
        app.handle_action(AppAction::ExportJson(dir.path().join("fusion")));
        assert!(app.error().is_none());

        let (mut other, _cmd_rx, _msg_tx) = test_app();
        other.handle_action(AppAction::ImportJson(dir.path().join("fusion.thothpipe.json")));
        assert!(other.error().is_none());
        assert_eq!(other.store().blocks(), app.store().blocks());
        assert_eq!(other.store().connections(), app.store().connections());
        assert!(!other.session().is_persisted());
    }

    #[test]
    fn test_rejected_connection_is_silent() {
        let (mut app, _cmd_rx, _msg_tx) = test_app();
        app.handle_action(AppAction::AddBlock("csi_loader"));
        app.handle_action(AppAction::AddBlock("csi_loader"));
        let ids: Vec<_> = app.store().blocks().iter().map(|b| b.id.clone()).collect();
        app.handle_action(AppAction::Connect {
            from: ids[0].clone(),
            to: ids[1].clone(),
        });
        assert!(app.store().connections().is_empty());
        assert!(app.error().is_none());
    }
}

//! Pipeline editor canvas: blocks, ports, connections and the per-block
//! configuration panel.
//!
//! Rendering is immediate-mode over a read-only [`GraphStore`]; every edit is
//! returned as an [`AppAction`] and applied by the app after the frame.
//!
//! Mouse controls:
//! - drag a block body to move it
//! - drag from a port to a port on another block to connect them
//! - drag empty space (or middle mouse) to pan, scroll to zoom
//! - `Delete` removes the selected block

use std::collections::HashMap;

use egui::{Color32, FontId, Pos2, Rect, RichText, Stroke, Ui, Vec2};

use crate::editor::interaction::{
    self, block_at, bezier_points, connection_curve, hit_port, port_position, BlockDrag,
    ConnectionDraft, PORT_RADIUS,
};
use crate::editor::viewport::{content_rect, Viewport};
use crate::frontend::state::AppAction;
use crate::pipeline::{
    registry, BlockCategory, BlockId, BlockInstance, BlockTypeDescriptor, ConfigValue, DataType,
    GraphStore, PortKind,
};

/// World-space spacing of the background grid.
const GRID_STEP: f32 = 40.0;
const CURVE_SEGMENTS: usize = 32;
const CORNER_RADIUS: f32 = 6.0;

/// UI state of the editor pane. The graph itself lives in [`GraphStore`].
pub struct PipelineEditorState {
    pub viewport: Viewport,
    pub selected: Option<BlockId>,
    drag: Option<BlockDrag>,
    draft: Option<ConnectionDraft>,
    panning: bool,
    pub add_block_open: bool,
    search: String,
    /// Text being edited for string and list config values, keyed by key.
    config_text: HashMap<String, String>,
    config_text_owner: Option<BlockId>,
    fit_requested: bool,
    hovered: Option<BlockId>,
}

impl Default for PipelineEditorState {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl PipelineEditorState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            selected: None,
            drag: None,
            draft: None,
            panning: false,
            add_block_open: false,
            search: String::new(),
            config_text: HashMap::new(),
            config_text_owner: None,
            fit_requested: false,
            hovered: None,
        }
    }

    /// Fit the content into view on the next frame.
    pub fn request_fit(&mut self) {
        self.fit_requested = true;
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Drop all per-graph UI state after the graph was replaced.
    pub fn graph_replaced(&mut self) {
        self.selected = None;
        self.drag = None;
        self.draft = None;
        self.config_text.clear();
        self.config_text_owner = None;
        self.fit_requested = true;
    }

    /// Forget UI state that refers to a deleted block.
    pub fn block_removed(&mut self, id: &BlockId) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.drag.as_ref().is_some_and(|d| &d.block == id) {
            self.drag = None;
        }
        if self.draft.as_ref().is_some_and(|d| &d.from.block == id) {
            self.draft = None;
        }
    }
}

/// Render the whole pane: toolbar, banner, config panel and canvas.
pub fn render(
    state: &mut PipelineEditorState,
    store: &GraphStore,
    show_grid: bool,
    ui: &mut Ui,
) -> Vec<AppAction> {
    let mut actions = Vec::new();

    if state
        .selected
        .as_ref()
        .is_some_and(|id| !store.contains(id))
    {
        state.selected = None;
    }

    render_toolbar(state, ui, &mut actions);
    render_shape_banner(store, ui);
    render_add_block_window(state, store.data_type(), ui.ctx(), &mut actions);

    if let Some(block) = state.selected.as_ref().and_then(|id| store.block(id)) {
        egui::SidePanel::right("block_config_panel")
            .resizable(true)
            .default_width(280.0)
            .show_inside(ui, |ui| {
                render_config_panel(state, store, block, ui, &mut actions);
            });
    }

    render_canvas(state, store, show_grid, ui, &mut actions);

    actions
}

fn render_toolbar(state: &mut PipelineEditorState, ui: &mut Ui, actions: &mut Vec<AppAction>) {
    ui.horizontal(|ui| {
        if ui.button("+ Add Block").clicked() {
            state.add_block_open = !state.add_block_open;
        }
        ui.separator();
        if ui.button("Fit").on_hover_text("Fit to content").clicked() {
            actions.push(AppAction::FitToContent);
        }
        if ui.button("Reset").on_hover_text("Reset view").clicked() {
            actions.push(AppAction::ResetView);
        }
        ui.label(RichText::new(format!("{:.0}%", state.viewport.zoom() * 100.0)).small());
    });
    ui.separator();
}

/// One-line summary of the shape problems in the graph, if any.
pub fn problem_summary(store: &GraphStore) -> Option<String> {
    let mismatches = store.shape_errors().len();
    let cycles = store.cycles().len();
    let mut parts = Vec::new();
    if mismatches > 0 {
        parts.push(format!(
            "{} shape mismatch{}",
            mismatches,
            if mismatches == 1 { "" } else { "es" }
        ));
    }
    if cycles > 0 {
        let ids: Vec<&str> = store.cycles().iter().map(BlockId::as_str).collect();
        parts.push(format!("cycle through {}", ids.join(", ")));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn render_shape_banner(store: &GraphStore, ui: &mut Ui) {
    let Some(summary) = problem_summary(store) else {
        return;
    };
    egui::Frame::new()
        .fill(Color32::from_rgb(90, 40, 30))
        .inner_margin(6.0)
        .corner_radius(4.0)
        .show(ui, |ui| {
            let response = ui.colored_label(Color32::from_rgb(255, 200, 120), format!("⚠ {}", summary));
            if !store.shape_errors().is_empty() {
                response.on_hover_ui(|ui| {
                    for (id, message) in store.shape_errors() {
                        ui.label(format!("{}: {}", id, message));
                    }
                });
            }
        });
}

/// Registry search for the add-block menu, grouped by category.
pub fn grouped_block_types(
    query: &str,
    data_type: DataType,
) -> Vec<(BlockCategory, Vec<&'static BlockTypeDescriptor>)> {
    BlockCategory::all()
        .iter()
        .filter_map(|category| {
            let types: Vec<_> = registry::search(query, data_type)
                .filter(|d| d.category == *category)
                .collect();
            (!types.is_empty()).then_some((*category, types))
        })
        .collect()
}

fn render_add_block_window(
    state: &mut PipelineEditorState,
    data_type: DataType,
    ctx: &egui::Context,
    actions: &mut Vec<AppAction>,
) {
    if !state.add_block_open {
        return;
    }

    let mut open = true;
    let mut chosen = None;
    egui::Window::new("Add Block")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, [10.0, 60.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.text_edit_singleline(&mut state.search);
            });
            ui.label(RichText::new(format!("Blocks for {}", data_type)).small().weak());
            ui.separator();

            let groups = grouped_block_types(&state.search, data_type);
            if groups.is_empty() {
                ui.label(RichText::new("No matching blocks").weak());
            }
            egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                for (category, types) in groups {
                    ui.label(RichText::new(category.display_name()).strong());
                    for descriptor in types {
                        if ui
                            .button(descriptor.name)
                            .on_hover_text(descriptor.description)
                            .clicked()
                        {
                            chosen = Some(descriptor.type_id);
                        }
                    }
                    ui.add_space(4.0);
                }
            });
        });

    if let Some(type_id) = chosen {
        actions.push(AppAction::AddBlock(type_id));
        open = false;
    }
    if !open {
        state.add_block_open = false;
        state.search.clear();
    }
}

fn render_config_panel(
    state: &mut PipelineEditorState,
    store: &GraphStore,
    block: &BlockInstance,
    ui: &mut Ui,
    actions: &mut Vec<AppAction>,
) {
    if state.config_text_owner.as_ref() != Some(&block.id) {
        state.config_text.clear();
        state.config_text_owner = Some(block.id.clone());
    }

    ui.heading(block.display_name());
    ui.label(RichText::new(format!("{} ({})", block.id, block.type_id)).small().weak());
    if let Some(descriptor) = block.descriptor() {
        ui.label(descriptor.description);
    } else {
        ui.colored_label(Color32::LIGHT_RED, "Unknown block type");
    }
    ui.separator();

    egui::Grid::new("block_shapes").num_columns(2).show(ui, |ui| {
        ui.label("Input:");
        ui.monospace(block.input_shape.to_string());
        ui.end_row();
        ui.label("Output:");
        ui.monospace(block.output_shape.to_string());
        ui.end_row();
    });
    if let Some(message) = store.shape_errors().get(&block.id) {
        ui.colored_label(Color32::LIGHT_RED, message);
    }
    ui.separator();

    ui.label(RichText::new("Configuration").strong());
    if block.config.is_empty() {
        ui.label(RichText::new("No parameters").weak());
    }
    egui::Grid::new("block_config_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            for (key, value) in block.config.iter() {
                ui.label(key);
                if let Some(edited) = config_value_editor(state, key, value, ui) {
                    actions.push(AppAction::SetConfigValue {
                        id: block.id.clone(),
                        key: key.clone(),
                        value: edited,
                    });
                }
                ui.end_row();
            }
        });
    ui.separator();

    ui.label(RichText::new("Connections").strong());
    let incident: Vec<_> = store
        .connections()
        .iter()
        .filter(|c| c.touches(&block.id))
        .collect();
    if incident.is_empty() {
        ui.label(RichText::new("Not connected").weak());
    }
    for conn in incident {
        ui.horizontal(|ui| {
            ui.label(conn.to_string());
            if ui.small_button("✕").on_hover_text("Disconnect").clicked() {
                actions.push(AppAction::Disconnect {
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                });
            }
        });
    }
    ui.separator();

    if ui
        .button("Delete block")
        .on_hover_text("Delete this block (or press Delete)")
        .clicked()
    {
        actions.push(AppAction::DeleteBlock(block.id.clone()));
    }
}

/// Editor widget for one config value; returns the new value when edited.
fn config_value_editor(
    state: &mut PipelineEditorState,
    key: &str,
    value: &ConfigValue,
    ui: &mut Ui,
) -> Option<ConfigValue> {
    match value {
        ConfigValue::Bool(v) => {
            let mut v = *v;
            ui.checkbox(&mut v, "")
                .changed()
                .then_some(ConfigValue::Bool(v))
        }
        ConfigValue::Int(v) => {
            let mut v = *v;
            ui.add(egui::DragValue::new(&mut v))
                .changed()
                .then_some(ConfigValue::Int(v))
        }
        ConfigValue::Float(v) => {
            let mut v = *v;
            ui.add(egui::DragValue::new(&mut v).speed(0.01).max_decimals(4))
                .changed()
                .then_some(ConfigValue::Float(v))
        }
        ConfigValue::String(_) | ConfigValue::List(_) => {
            let text = state
                .config_text
                .entry(key.to_string())
                .or_insert_with(|| value.display_text());
            let response = ui.text_edit_singleline(text);
            let parsed = value.parse_like(text);
            if parsed.is_none() {
                response.on_hover_text("Expected a JSON array, e.g. [\"mean\", \"std\"]");
                ui.colored_label(Color32::LIGHT_RED, "invalid");
                return None;
            }
            if response.changed() {
                parsed.filter(|p| p != value)
            } else {
                None
            }
        }
    }
}

fn category_color(category: Option<BlockCategory>) -> Color32 {
    match category {
        Some(BlockCategory::Loaders) => Color32::from_rgb(60, 140, 60),
        Some(BlockCategory::Extractors) => Color32::from_rgb(140, 90, 170),
        Some(BlockCategory::Filters) => Color32::from_rgb(60, 100, 180),
        Some(BlockCategory::Transforms) => Color32::from_rgb(40, 130, 140),
        Some(BlockCategory::Combiners) => Color32::from_rgb(200, 120, 40),
        None => Color32::from_rgb(100, 100, 100),
    }
}

fn render_canvas(
    state: &mut PipelineEditorState,
    store: &GraphStore,
    show_grid: bool,
    ui: &mut Ui,
    actions: &mut Vec<AppAction>,
) {
    let (response, painter) =
        ui.allocate_painter(ui.available_size_before_wrap(), egui::Sense::click_and_drag());
    let canvas_rect = response.rect;
    state.viewport.origin = canvas_rect.min;

    let bounds = *store.bounds();
    let block_size = bounds.block_size();

    if state.fit_requested {
        state.fit_requested = false;
        match content_rect(store.blocks().iter().map(|b| b.position.to_pos2()), block_size) {
            Some(content) => state.viewport.zoom_to_fit(content, canvas_rect),
            None => state.viewport.reset(),
        }
    }

    // Zoom around the cursor
    if let Some(hover) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            state.viewport.zoom_by(1.0 + scroll * 0.002, hover);
        }
        let pinch = ui.input(|i| i.zoom_delta());
        if pinch != 1.0 {
            state.viewport.zoom_by(pinch, hover);
        }
    }

    let vp = state.viewport;
    let zoom = vp.zoom();

    painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(30));
    let world_canvas = Rect::from_min_size(Pos2::ZERO, Vec2::new(bounds.width, bounds.height));
    let screen_canvas = vp.world_rect_to_screen(world_canvas);
    painter.rect_filled(screen_canvas, 0.0, Color32::from_gray(36));
    if show_grid {
        paint_grid(&painter, &vp, world_canvas, canvas_rect);
    }
    painter.rect_stroke(
        screen_canvas,
        0.0,
        Stroke::new(1.0, Color32::from_gray(70)),
        egui::StrokeKind::Outside,
    );

    // ── Pointer interaction ──

    let pointer_world = response
        .interact_pointer_pos()
        .or(response.hover_pos())
        .map(|p| vp.screen_to_world(p));
    let port_radius = PORT_RADIUS / zoom.min(1.0);

    if response.drag_started_by(egui::PointerButton::Primary) {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .map(|p| vp.screen_to_world(p));
        if let Some(world) = origin {
            if let Some(port) = hit_port(store.blocks(), world, block_size, port_radius) {
                state.draft = Some(ConnectionDraft::begin(port.block, port.kind, world));
            } else if let Some(id) = block_at(store.blocks(), world, block_size) {
                if let Some(block) = store.block(id) {
                    state.drag = Some(BlockDrag::begin(id.clone(), world, block.position));
                    state.selected = Some(id.clone());
                }
            } else {
                state.panning = true;
            }
        }
    }

    if response.dragged_by(egui::PointerButton::Middle) || (state.panning && response.dragged()) {
        state.viewport.pan_by(response.drag_delta());
    }

    if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(world) = pointer_world {
            if let Some(drag) = &state.drag {
                let position = drag.update(world, &bounds);
                let moved = store
                    .block(&drag.block)
                    .is_some_and(|b| b.position != position);
                if moved {
                    actions.push(AppAction::MoveBlock {
                        id: drag.block.clone(),
                        position,
                    });
                }
            }
            if let Some(draft) = &mut state.draft {
                draft.update(world);
            }
        }
    }

    if response.drag_stopped() {
        if let Some(draft) = state.draft.take() {
            let target = hit_port(store.blocks(), draft.pointer, block_size, port_radius);
            if let Some((from, to)) = draft.finish(target) {
                actions.push(AppAction::Connect { from, to });
            }
        }
        state.drag = None;
        state.panning = false;
    }

    if response.clicked() {
        state.selected = pointer_world.and_then(|w| block_at(store.blocks(), w, block_size).cloned());
    }

    if let Some(id) = &state.selected {
        let delete = ui.input(|i| i.key_pressed(egui::Key::Delete));
        if delete && !ui.ctx().wants_keyboard_input() {
            actions.push(AppAction::DeleteBlock(id.clone()));
        }
    }

    state.hovered = response
        .hover_pos()
        .and_then(|p| block_at(store.blocks(), vp.screen_to_world(p), block_size).cloned());

    // ── Connections (behind blocks) ──

    for conn in store.connections() {
        let (Some(from), Some(to)) = (store.block(&conn.from), store.block(&conn.to)) else {
            continue;
        };
        let start = vp.world_to_screen(port_position(from.position, PortKind::Output, block_size));
        let end = vp.world_to_screen(port_position(to.position, PortKind::Input, block_size));
        let color = if store.shape_errors().contains_key(&to.id) {
            Color32::from_rgb(220, 90, 70)
        } else {
            Color32::from_gray(150)
        };
        painter.add(egui::Shape::line(
            bezier_points(connection_curve(start, end), CURVE_SEGMENTS),
            Stroke::new(2.0 * zoom, color),
        ));
    }

    if let Some(draft) = &state.draft {
        if let Some(block) = store.block(&draft.from.block) {
            let port = vp.world_to_screen(port_position(block.position, draft.from.kind, block_size));
            let pointer = vp.world_to_screen(draft.pointer);
            let (a, b) = match draft.from.kind {
                PortKind::Output => (port, pointer),
                PortKind::Input => (pointer, port),
            };
            painter.add(egui::Shape::line(
                bezier_points(connection_curve(a, b), CURVE_SEGMENTS),
                Stroke::new(2.0 * zoom, Color32::YELLOW),
            ));
        }
    }

    // ── Blocks ──

    let hover_world = response.hover_pos().map(|p| vp.screen_to_world(p));
    let hovered_port = hover_world.and_then(|w| hit_port(store.blocks(), w, block_size, port_radius));

    for block in store.blocks() {
        paint_block(
            &painter,
            &vp,
            block,
            block_size,
            state.selected.as_ref() == Some(&block.id),
            store.shape_errors().contains_key(&block.id),
            store.cycles().contains(&block.id),
            hovered_port.as_ref().filter(|h| h.block == block.id).map(|h| h.kind),
        );
    }

    if store.is_empty() {
        painter.text(
            canvas_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Add a block or start from a template (File ▸ Templates)",
            FontId::proportional(14.0),
            Color32::from_gray(140),
        );
    }

    if state.drag.is_none() && state.draft.is_none() {
        if let Some(block) = state.hovered.as_ref().and_then(|id| store.block(id)) {
            response.on_hover_ui_at_pointer(|ui| {
                ui.set_max_width(300.0);
                ui.label(RichText::new(block.display_name()).strong());
                if let Some(descriptor) = block.descriptor() {
                    ui.label(descriptor.description);
                }
                ui.label(format!("{} → {}", block.input_shape, block.output_shape));
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_block(
    painter: &egui::Painter,
    vp: &Viewport,
    block: &BlockInstance,
    size: Vec2,
    selected: bool,
    has_error: bool,
    in_cycle: bool,
    hovered_port: Option<PortKind>,
) {
    let zoom = vp.zoom();
    let rect = vp.world_rect_to_screen(interaction::block_rect(block.position, size));
    let fill = category_color(block.descriptor().map(|d| d.category));

    let stroke = if selected {
        Stroke::new(3.0 * zoom, Color32::WHITE)
    } else if has_error || in_cycle {
        Stroke::new(2.5 * zoom, Color32::from_rgb(230, 70, 60))
    } else {
        Stroke::new(zoom, Color32::from_gray(80))
    };

    painter.rect_filled(rect, CORNER_RADIUS * zoom, fill);
    painter.rect_stroke(rect, CORNER_RADIUS * zoom, stroke, egui::StrokeKind::Outside);

    let line = rect.height() / 4.0;
    painter.text(
        Pos2::new(rect.center().x, rect.top() + line),
        egui::Align2::CENTER_CENTER,
        block.display_name(),
        FontId::proportional(13.0 * zoom),
        Color32::WHITE,
    );
    let shape_color = Color32::from_gray(225);
    if !block.is_source() {
        painter.text(
            Pos2::new(rect.center().x, rect.top() + 2.0 * line),
            egui::Align2::CENTER_CENTER,
            format!("in  {}", block.input_shape),
            FontId::monospace(10.0 * zoom),
            shape_color,
        );
    }
    painter.text(
        Pos2::new(rect.center().x, rect.top() + 3.0 * line),
        egui::Align2::CENTER_CENTER,
        format!("out {}", block.output_shape),
        FontId::monospace(10.0 * zoom),
        shape_color,
    );

    for kind in [PortKind::Input, PortKind::Output] {
        if !kind.exists_on(block.is_source()) {
            continue;
        }
        let center = vp.world_to_screen(port_position(block.position, kind, size));
        let color = match (hovered_port == Some(kind), kind) {
            (true, PortKind::Input) => Color32::LIGHT_GREEN,
            (true, PortKind::Output) => Color32::LIGHT_BLUE,
            _ => Color32::from_gray(200),
        };
        painter.circle_filled(center, 6.0 * zoom, color);
    }
}

fn paint_grid(painter: &egui::Painter, vp: &Viewport, world_canvas: Rect, screen: Rect) {
    let visible = Rect::from_min_max(vp.screen_to_world(screen.min), vp.screen_to_world(screen.max))
        .intersect(world_canvas);
    if !visible.is_positive() {
        return;
    }
    let stroke = Stroke::new(1.0, Color32::from_gray(45));

    let mut x = (visible.min.x / GRID_STEP).ceil() * GRID_STEP;
    while x <= visible.max.x {
        painter.line_segment(
            [
                vp.world_to_screen(Pos2::new(x, visible.min.y)),
                vp.world_to_screen(Pos2::new(x, visible.max.y)),
            ],
            stroke,
        );
        x += GRID_STEP;
    }
    let mut y = (visible.min.y / GRID_STEP).ceil() * GRID_STEP;
    while y <= visible.max.y {
        painter.line_segment(
            [
                vp.world_to_screen(Pos2::new(visible.min.x, y)),
                vp.world_to_screen(Pos2::new(visible.max.x, y)),
            ],
            stroke,
        );
        y += GRID_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_block_types_follow_category_order() {
        let groups = grouped_block_types("", DataType::Csi);
        let categories: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, BlockCategory::all().to_vec());
        let loaders = &groups[0].1;
        assert!(loaders.iter().all(|d| d.is_compatible_with(DataType::Csi)));
        assert!(loaders.iter().any(|d| d.type_id == "csi_loader"));
        assert!(!loaders.iter().any(|d| d.type_id == "imu_loader"));
    }

    #[test]
    fn test_grouped_block_types_search() {
        let groups = grouped_block_types("WINDOW", DataType::Imu);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, BlockCategory::Transforms);
        assert!(groups[0].1.iter().any(|d| d.type_id == "windowing"));

        assert!(grouped_block_types("no such block", DataType::Imu).is_empty());
    }

    #[test]
    fn test_problem_summary() {
        let mut store = GraphStore::new(DataType::Csi);
        assert_eq!(problem_summary(&store), None);

        // Windowed and raw streams into one concat disagree on rank.
        let a = store.add_block("csi_loader").unwrap();
        let w = store.add_block("windowing").unwrap();
        let s = store.add_block("subcarrier_filter").unwrap();
        let c = store.add_block("feature_concat").unwrap();
        assert!(store.add_connection(&a, &w));
        assert!(store.add_connection(&a, &s));
        assert!(store.add_connection(&w, &c));
        assert!(store.add_connection(&s, &c));
        assert_eq!(problem_summary(&store).as_deref(), Some("1 shape mismatch"));
    }

    #[test]
    fn test_state_forgets_removed_block() {
        let mut state = PipelineEditorState::default();
        state.selected = Some(BlockId::from("block_0"));
        state.block_removed(&BlockId::from("block_1"));
        assert!(state.selected.is_some());
        state.block_removed(&BlockId::from("block_0"));
        assert!(state.selected.is_none());
    }
}

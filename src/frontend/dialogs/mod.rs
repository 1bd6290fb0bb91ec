//! Dialog trait system
//!
//! Each dialog implements [`Dialog`], keeping its state, actions and
//! rendering together. [`show_dialog`] drives the window lifecycle.

mod open_pipeline;
mod save_pipeline;

pub use open_pipeline::{OpenPipelineAction, OpenPipelineContext, OpenPipelineDialog, OpenPipelineState};
pub use save_pipeline::{SavePipelineAction, SavePipelineDialog, SavePipelineState};

use egui::{Align2, Context, Ui};

/// Actions that a dialog can return after rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogAction<A> {
    /// Keep the dialog open, no action needed
    #[default]
    None,
    /// Close the dialog without performing any action
    Close,
    /// Close the dialog and perform the specified action
    CloseWithAction(A),
    /// Keep the dialog open but perform the specified action
    Action(A),
}

impl<A> DialogAction<A> {
    pub fn should_close(&self) -> bool {
        matches!(self, DialogAction::Close | DialogAction::CloseWithAction(_))
    }

    pub fn into_action(self) -> Option<A> {
        match self {
            DialogAction::CloseWithAction(a) | DialogAction::Action(a) => Some(a),
            _ => None,
        }
    }
}

/// Dialog state lifecycle
pub trait DialogState: Default {
    /// Reset the dialog state to its default values
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check if the dialog has valid data to proceed with its action
    fn is_valid(&self) -> bool {
        true
    }
}

/// Window appearance of a dialog
#[derive(Debug, Clone)]
pub struct DialogWindowConfig {
    pub default_width: f32,
    pub resizable: bool,
    pub anchor: Option<(Align2, [f32; 2])>,
}

impl Default for DialogWindowConfig {
    fn default() -> Self {
        Self {
            default_width: 400.0,
            resizable: true,
            anchor: None,
        }
    }
}

impl DialogWindowConfig {
    /// A fixed-size dialog centered on screen
    pub fn centered(width: f32) -> Self {
        Self {
            default_width: width,
            resizable: false,
            anchor: Some((Align2::CENTER_CENTER, [0.0, 0.0])),
        }
    }
}

/// Main dialog trait
///
/// ```ignore
/// impl Dialog for MyDialog {
///     type State = MyDialogState;
///     type Action = MyDialogAction;
///     type Context<'a> = &'a SomeData;
///
///     fn title(_state: &Self::State) -> &'static str { "My Dialog" }
///
///     fn render(state: &mut Self::State, ctx: Self::Context<'_>, ui: &mut Ui)
///         -> DialogAction<Self::Action> { DialogAction::None }
/// }
/// ```
pub trait Dialog {
    type State: DialogState;
    type Action;
    type Context<'a>;

    fn title(state: &Self::State) -> &'static str;

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::default()
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Show a dialog while `is_open` is set
///
/// Closing resets the state. Returns the action the dialog produced this
/// frame, if any.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let config = D::window_config();
    let mut window = egui::Window::new(D::title(state))
        .collapsible(false)
        .resizable(config.resizable)
        .default_width(config.default_width);

    if let Some((align, offset)) = config.anchor {
        window = window.anchor(align, offset);
    }

    let mut outcome = DialogAction::None;
    let mut window_open = true;
    window.open(&mut window_open).show(ctx, |ui| {
        outcome = D::render(state, dialog_ctx, ui);
    });

    if !window_open || outcome.should_close() {
        *is_open = false;
        state.reset();
    }

    outcome.into_action()
}

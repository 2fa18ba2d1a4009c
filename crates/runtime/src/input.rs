use pixel_novel::{EditCommand, FAST_MOVE_STEP, MOVE_STEP};
use winit::event::{ElementState, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Input actions produced by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    None,
    /// Pointer or touch press on the canvas.
    Tap,
    ToggleEditor,
    Edit(EditCommand),
    Quit,
}

/// Input trait that maps window events into presenter actions.
pub trait Input {
    fn handle_window_event(&mut self, event: &WindowEvent) -> InputAction;
}

/// Fixed presenter key map. Shift is tracked from modifier events so arrow
/// moves can take the larger step.
#[derive(Clone, Debug, Default)]
pub struct PresenterInput {
    shift: bool,
}

impl PresenterInput {
    pub fn shift_held(&self) -> bool {
        self.shift
    }
}

impl Input for PresenterInput {
    fn handle_window_event(&mut self, event: &WindowEvent) -> InputAction {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
                InputAction::None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => InputAction::Tap,
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => InputAction::Tap,
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } if key_event.state == ElementState::Pressed => match key_event.physical_key {
                PhysicalKey::Code(key) => action_for_key(key, self.shift),
                PhysicalKey::Unidentified(_) => InputAction::None,
            },
            _ => InputAction::None,
        }
    }
}

/// Key binding table. Editor commands are produced in every mode; the
/// session drops them while viewing.
pub fn action_for_key(key: KeyCode, shift: bool) -> InputAction {
    let step = if shift { FAST_MOVE_STEP } else { MOVE_STEP };
    let edit = InputAction::Edit;
    match key {
        KeyCode::KeyE => InputAction::ToggleEditor,
        KeyCode::Escape => InputAction::Quit,
        KeyCode::ArrowLeft => edit(EditCommand::Move { dx: -step, dy: 0 }),
        KeyCode::ArrowRight => edit(EditCommand::Move { dx: step, dy: 0 }),
        KeyCode::ArrowUp => edit(EditCommand::Move { dx: 0, dy: -step }),
        KeyCode::ArrowDown => edit(EditCommand::Move { dx: 0, dy: step }),
        KeyCode::Equal | KeyCode::NumpadAdd => edit(EditCommand::ScaleUp),
        KeyCode::Minus | KeyCode::NumpadSubtract => edit(EditCommand::ScaleDown),
        KeyCode::Digit0 | KeyCode::Numpad0 => edit(EditCommand::ScaleReset),
        KeyCode::BracketLeft => edit(EditCommand::PrevScene),
        KeyCode::BracketRight => edit(EditCommand::NextScene),
        KeyCode::KeyG => edit(EditCommand::ToggleGrid),
        KeyCode::KeyP => edit(EditCommand::ToggleSprite),
        KeyCode::KeyC => edit(EditCommand::ToggleCaption),
        KeyCode::KeyD => edit(EditCommand::Dump),
        _ => InputAction::None,
    }
}

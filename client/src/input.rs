use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Held while dragging to orbit the camera.
    Orbit,
    ToggleAutoRotate,
    ToggleHelpers,
}

pub fn default_input_map() -> InputMap<InputAction> {
    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Orbit, MouseButton::Left);
    input_map.insert(InputAction::ToggleAutoRotate, KeyCode::Space);
    input_map.insert(InputAction::ToggleHelpers, KeyCode::KeyH);
    input_map
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<InputAction>::default());
}

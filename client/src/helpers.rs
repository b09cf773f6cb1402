use std::f32::consts::FRAC_PI_2;

use crate::{input::InputAction, settings::SceneSettings};
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            toggle_helpers,
            draw_helpers.run_if(|settings: Res<SceneSettings>| settings.helpers),
        )
            .chain(),
    );
}

/// 12 x 12 cells of 1 m, centered on the origin.
const GRID_CELLS: u32 = 12;
const GRID_SPACING: f32 = 1.0;
const AXES_LENGTH: f32 = 4.0;
const GRID_COLOR: Color = Color::srgb(0.53, 0.53, 0.53);

fn toggle_helpers(actions: Res<ActionState<InputAction>>, mut settings: ResMut<SceneSettings>) {
    if actions.just_pressed(&InputAction::ToggleHelpers) {
        settings.helpers = !settings.helpers;
        info!(helpers = settings.helpers, "toggled scene helpers");
    }
}

fn draw_helpers(mut gizmos: Gizmos) {
    // Gizmo grids lie in the XY plane; tip it onto the ground.
    gizmos.grid(
        Isometry3d::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        UVec2::splat(GRID_CELLS),
        Vec2::splat(GRID_SPACING),
        GRID_COLOR,
    );
    gizmos.axes(Transform::IDENTITY, AXES_LENGTH);
}

// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod environment;
mod helpers;
mod input;
mod physics;
mod scene;
mod settings;

use bevy::prelude::*;
use settings::SceneSettings;

/// Background color shown until (or instead of) the environment map.
const CLEAR_COLOR: Color = Color::srgb(254.0 / 255.0, 254.0 / 255.0, 254.0 / 255.0);

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

/// Top-level lifecycle: wait for the environment map, then build the scene and run the loop.
#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "HDR Physics Scene".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.insert_resource(SceneSettings::from_env());
        app.insert_resource(ClearColor(CLEAR_COLOR));
        app.init_state::<AppState>();

        app.add_plugins((
            input::plugin,
            camera::plugin,
            physics::plugin,
            environment::plugin,
            scene::plugin,
            helpers::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}

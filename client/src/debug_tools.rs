//! Debug/performance tooling for native dev builds.
//!
//! Gate behind `dev_native` (`#[cfg(feature = "dev_native")] mod debug_tools;` in `main.rs`).
//! Besides the stock frame/entity diagnostics this publishes the physics step count and
//! simulated time, so a stalled or runaway simulation shows up next to the frame time.

use crate::physics::Physics;
use bevy::diagnostic::{
    Diagnostic, DiagnosticPath, Diagnostics, EntityCountDiagnosticsPlugin,
    FrameTimeDiagnosticsPlugin, RegisterDiagnostic,
};
use bevy::prelude::*;
use iyes_perf_ui::prelude::*;

pub const PHYSICS_STEPS: DiagnosticPath = DiagnosticPath::const_new("physics/steps");
pub const PHYSICS_ELAPSED: DiagnosticPath = DiagnosticPath::const_new("physics/elapsed_secs");

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        PerfUiPlugin,
    ));

    app.register_diagnostic(Diagnostic::new(PHYSICS_STEPS))
        .register_diagnostic(Diagnostic::new(PHYSICS_ELAPSED).with_suffix("s"));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(
        Update,
        measure_physics.run_if(resource_exists::<Physics>),
    );
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn measure_physics(mut diagnostics: Diagnostics, physics: Res<Physics>) {
    diagnostics.add_measurement(&PHYSICS_STEPS, || physics.steps() as f64);
    diagnostics.add_measurement(&PHYSICS_ELAPSED, || f64::from(physics.elapsed()));
}

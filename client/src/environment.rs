//! HDR environment map: loading, equirect-to-cube conversion, and hand-off to the camera.
//!
//! The scene stays in [`AppState::Loading`] until the map either finishes loading or fails.
//! Both outcomes move on to [`AppState::Running`]; a failed load only costs the background.

use std::f32::consts::{PI, TAU};

use crate::{AppState, camera::OrbitCamera, settings::SceneSettings};
use bevy::{
    asset::{LoadState, RenderAssetUsages},
    core_pipeline::Skybox,
    light::GeneratedEnvironmentMapLight,
    prelude::*,
    render::render_resource::{
        Extent3d, TextureDimension, TextureFormat, TextureViewDescriptor, TextureViewDimension,
    },
};
use half::f16;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, load_environment_map);
    app.add_systems(
        Update,
        await_environment_map.run_if(in_state(AppState::Loading)),
    );
}

/// Smallest and largest cube face edge we generate, in texels.
const MIN_FACE_SIZE: u32 = 32;
const MAX_FACE_SIZE: u32 = 512;

const SKYBOX_BRIGHTNESS: f32 = 1000.0;
const ENVIRONMENT_INTENSITY: f32 = 900.0;

/// Equirect source image being loaded. The generated cube map lives on the camera.
#[derive(Resource, Debug)]
pub struct EnvironmentMap {
    pub source: Handle<Image>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EnvironmentError {
    #[error("environment image is empty")]
    Empty,
    #[error("unsupported environment image format {0:?}")]
    UnsupportedFormat(TextureFormat),
    #[error("environment image holds {actual} bytes, expected {expected}")]
    Truncated { expected: usize, actual: usize },
}

fn load_environment_map(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
) {
    info!(path = %settings.env_map, "loading environment map");
    commands.insert_resource(EnvironmentMap {
        source: asset_server.load(settings.env_map.clone()),
    });
}

fn await_environment_map(
    mut commands: Commands,
    env: Res<EnvironmentMap>,
    mut images: ResMut<Assets<Image>>,
    mut next_state: ResMut<NextState<AppState>>,
    asset_server: Res<AssetServer>,
    camera: Single<Entity, With<OrbitCamera>>,
) {
    match asset_server.load_state(env.source.id()) {
        LoadState::Loaded => {
            let Some(source) = images.get(&env.source) else {
                return;
            };

            let face_size = face_size_for(source.height());
            match equirect_to_cubemap(source, face_size) {
                Ok(cubemap) => {
                    let handle = images.add(cubemap);
                    commands.entity(*camera).insert(camera_environment(handle));
                    info!(face_size, "environment map ready");
                }
                Err(err) => error!("environment map unusable: {err}"),
            }
            next_state.set(AppState::Running);
        }
        LoadState::Failed(err) => {
            error!("environment map failed to load: {err}");
            next_state.set(AppState::Running);
        }
        LoadState::NotLoaded | LoadState::Loading => {}
    }
}

/// Background and image-based lighting, both fed from the same cube map.
pub fn camera_environment(cubemap: Handle<Image>) -> (Skybox, GeneratedEnvironmentMapLight) {
    (
        Skybox {
            image: cubemap.clone(),
            brightness: SKYBOX_BRIGHTNESS,
            ..default()
        },
        GeneratedEnvironmentMapLight {
            environment_map: cubemap,
            intensity: ENVIRONMENT_INTENSITY,
            ..default()
        },
    )
}

/// Pick a power-of-two face edge close to half the equirect height.
pub fn face_size_for(source_height: u32) -> u32 {
    (source_height / 2)
        .max(1)
        .next_power_of_two()
        .clamp(MIN_FACE_SIZE, MAX_FACE_SIZE)
}

/// Linear RGBA texels of an equirectangular image.
struct Equirect {
    width: usize,
    height: usize,
    texels: Vec<[f32; 4]>,
}

impl Equirect {
    fn from_image(image: &Image) -> Result<Self, EnvironmentError> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let data = image.data.as_deref().unwrap_or_default();
        if width == 0 || height == 0 || data.is_empty() {
            return Err(EnvironmentError::Empty);
        }

        let format = image.texture_descriptor.format;
        let bytes_per_channel = match format {
            TextureFormat::Rgba32Float => 4,
            TextureFormat::Rgba16Float => 2,
            other => return Err(EnvironmentError::UnsupportedFormat(other)),
        };

        let expected = width * height * 4 * bytes_per_channel;
        if data.len() < expected {
            return Err(EnvironmentError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let channel = |bytes: &[u8]| -> f32 {
            match bytes {
                [a, b, c, d] => f32::from_le_bytes([*a, *b, *c, *d]),
                [a, b] => f16::from_le_bytes([*a, *b]).to_f32(),
                _ => 0.0,
            }
        };

        let texels = data[..expected]
            .chunks_exact(4 * bytes_per_channel)
            .map(|px| {
                let mut out = [0.0; 4];
                for (slot, bytes) in out.iter_mut().zip(px.chunks_exact(bytes_per_channel)) {
                    *slot = channel(bytes);
                }
                out
            })
            .collect();

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    fn texel(&self, x: usize, y: usize) -> [f32; 4] {
        self.texels[y * self.width + x]
    }

    /// Bilinear sample at normalized `(u, v)`; wraps horizontally, clamps vertically.
    fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let fx = u.rem_euclid(1.0) * self.width as f32 - 0.5;
        let fy = (v.clamp(0.0, 1.0) * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0f = fx.floor();
        let tx = fx - x0f;
        let x0 = (x0f as isize).rem_euclid(self.width as isize) as usize;
        let x1 = (x0 + 1) % self.width;

        let y0 = fy.floor() as usize;
        let ty = fy - y0 as f32;
        let y1 = (y0 + 1).min(self.height - 1);

        let (a, b) = (self.texel(x0, y0), self.texel(x1, y0));
        let (c, d) = (self.texel(x0, y1), self.texel(x1, y1));

        let mut out = [0.0; 4];
        for i in 0..4 {
            let top = a[i] + (b[i] - a[i]) * tx;
            let bottom = c[i] + (d[i] - c[i]) * tx;
            out[i] = top + (bottom - top) * ty;
        }
        out
    }
}

/// World direction through texel `(u, v)` (both in -1..=1, v pointing down) of cube `face`.
///
/// Faces follow the GPU layer order: +X, -X, +Y, -Y, +Z, -Z.
pub fn cube_face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    let dir = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };
    dir.normalize()
}

/// Equirect texture coordinates for a world direction. `v = 0` is straight up.
pub fn direction_to_equirect(dir: Vec3) -> (f32, f32) {
    let u = 0.5 + dir.z.atan2(dir.x) / TAU;
    let v = dir.y.clamp(-1.0, 1.0).acos() / PI;
    (u, v)
}

/// Radiance can exceed the half-float range; saturate instead of overflowing to infinity.
fn encode_channel(value: f32) -> f16 {
    if value.is_nan() {
        return f16::ZERO;
    }
    f16::from_f32(value.clamp(0.0, f16::MAX.to_f32()))
}

/// Resample an equirectangular HDR image into a six-layer `Rgba16Float` cube map.
pub fn equirect_to_cubemap(source: &Image, face_size: u32) -> Result<Image, EnvironmentError> {
    let equirect = Equirect::from_image(source)?;
    let size = face_size.max(1) as usize;

    let mut data = Vec::with_capacity(6 * size * size * 4 * 2);
    for face in 0..6 {
        for y in 0..size {
            let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
            for x in 0..size {
                let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let (su, sv) = direction_to_equirect(cube_face_direction(face, u, v));
                for channel in equirect.sample(su, sv) {
                    data.extend_from_slice(&encode_channel(channel).to_le_bytes());
                }
            }
        }
    }

    let mut image = Image::new(
        Extent3d {
            width: size as u32,
            height: size as u32,
            depth_or_array_layers: 6,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba16Float,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    image.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    Ok(image)
}

//! Scene setup system
//!
//! This module handles the initial setup of the 3D scene: the offscreen
//! render target, the orbit camera, lights, the star field point cloud and
//! the asynchronous load of the solar system model.

use bevy::{
    asset::{Assets, RenderAssetUsages},
    camera::{visibility::NoFrustumCulling, RenderTarget},
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    light::NotShadowCaster,
    math::Vec3,
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, PrimitiveTopology, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};

use crate::bevy::components::{OffscreenCamera, OrbitCamera, StarPoints};
use crate::bevy::loader::ModelLoad;
use crate::bevy::orbit::OrbitController;
use crate::bevy::plugins::frame_copy::FrameCopier;
use crate::bevy::resources::{RenderTargetHandle, StarFieldMesh, ViewportRes};
use crate::bevy::star_field::StarField;
use crate::config::{camera, lighting, model};
use crate::tauri_bridge::shared_state::ViewportSize;

/// Render target texture that can be copied back to the CPU
pub fn render_target_image(size: ViewportSize) -> Image {
    let mut image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    image
}

pub fn extent(size: ViewportSize) -> Extent3d {
    Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Point-list mesh holding one vertex per star
pub fn star_mesh(stars: &StarField) -> Mesh {
    Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, stars.positions().to_vec())
}

/// Point cloud entity for the star field; backdrop only, so it stays out of
/// the shadow pass
pub fn star_points(mesh: Handle<Mesh>, material: Handle<StandardMaterial>) -> impl Bundle {
    (
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::default(),
        // Vertices move every frame; the initial bounds would go stale
        NoFrustumCulling,
        NotShadowCaster,
        StarPoints,
    )
}

/// Setup the 3D scene with camera, lights, stars, and kick off the model load
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    asset_server: Res<AssetServer>,
    viewport: Res<ViewportRes>,
    stars: Res<StarField>,
    orbit: Res<OrbitController>,
) {
    info!("[Bevy] Setting up scene...");

    let size = viewport.0.current().unwrap_or_default();

    // Create render target texture
    let render_target_image_handle = images.add(render_target_image(size));
    commands.insert_resource(RenderTargetHandle(render_target_image_handle.clone()));

    // Spawn frame copier for GPU-to-CPU transfer
    commands.spawn(FrameCopier::new(
        render_target_image_handle.clone(),
        extent(size),
        &render_device,
    ));

    // Spawn camera with orbit controller
    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(render_target_image_handle.into()),
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: camera::FOV_DEGREES.to_radians(),
            near: camera::NEAR,
            far: camera::FAR,
            aspect_ratio: size.aspect_ratio(),
            ..default()
        }),
        AmbientLight {
            color: Color::srgb_u8(
                lighting::AMBIENT_RGB[0],
                lighting::AMBIENT_RGB[1],
                lighting::AMBIENT_RGB[2],
            ),
            brightness: lighting::AMBIENT_BRIGHTNESS,
            ..default()
        },
        Tonemapping::None,
        orbit.transform(),
        OffscreenCamera,
        OrbitCamera,
    ));

    // Key light
    commands.spawn((
        DirectionalLight {
            illuminance: lighting::DIRECTIONAL_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(lighting::DIRECTIONAL_POSITION))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Star field backdrop
    let star_mesh_handle = meshes.add(star_mesh(&stars));
    commands.insert_resource(StarFieldMesh(star_mesh_handle.clone()));
    let star_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    });
    commands.spawn(star_points(star_mesh_handle, star_material));

    // Solar system model, attached once it has loaded
    commands.insert_resource(ModelLoad::start(&asset_server, model::resource_id()));

    info!(
        "[Bevy] Scene setup complete ({} stars, {}x{} target)",
        stars.len(),
        size.width,
        size.height
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::star_field::StarField;

    #[test]
    fn star_points_do_not_cast_shadows() {
        let mut world = World::new();
        let entity = world
            .spawn(star_points(Handle::default(), Handle::default()))
            .id();

        let star = world.entity(entity);
        assert!(star.contains::<NotShadowCaster>());
        assert!(star.contains::<NoFrustumCulling>());
        assert!(star.contains::<StarPoints>());
    }

    #[test]
    fn star_mesh_has_one_point_per_star() {
        let stars = StarField::from_positions(vec![[0.0; 3]; 4], -1.0, 1.0);
        let mesh = star_mesh(&stars);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(mesh.count_vertices(), 4);
    }
}

//! Post-load material normalization
//!
//! Every mesh of the loaded model gets a fresh standard PBR material that
//! keeps only the base color, normal and metallic-roughness texture maps.
//! Ambient occlusion, emissive and alpha settings of the source material are
//! dropped on purpose; see DESIGN.md.

use bevy::{
    light::{NotShadowCaster, NotShadowReceiver},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    scene::Scene,
};

/// Rebuild `source` as a plain standard material carrying only its texture
/// maps. Factors are white base color, full roughness and no metalness, so the
/// maps alone drive the shading.
pub fn normalize_material(source: &StandardMaterial) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        base_color_texture: source.base_color_texture.clone(),
        normal_map_texture: source.normal_map_texture.clone(),
        metallic_roughness_texture: source.metallic_roughness_texture.clone(),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..default()
    }
}

/// Normalize every mesh material inside a loaded scene and mark its meshes to
/// cast and receive shadows. Returns the number of meshes touched.
pub fn normalize_scene_materials(
    scene: &mut Scene,
    materials: &mut Assets<StandardMaterial>,
) -> usize {
    let mut query = scene
        .world
        .query::<(Entity, &mut MeshMaterial3d<StandardMaterial>)>();

    let mut meshes = Vec::new();
    for (entity, mut material) in query.iter_mut(&mut scene.world) {
        let normalized = materials
            .get(&material.0)
            .map(normalize_material)
            .unwrap_or_else(|| normalize_material(&StandardMaterial::default()));
        material.0 = materials.add(normalized);
        meshes.push(entity);
    }

    for entity in &meshes {
        scene
            .world
            .entity_mut(*entity)
            .remove::<(NotShadowCaster, NotShadowReceiver)>();
    }

    meshes.len()
}

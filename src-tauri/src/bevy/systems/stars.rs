//! Star field drift system

use bevy::{mesh::VertexAttributeValues, prelude::*};

use crate::bevy::resources::StarFieldMesh;
use crate::bevy::star_field::StarField;
use crate::config::stars::DRIFT_STEP;

/// Drift every star one step and upload the new positions to the point mesh
pub fn advance_star_field(
    mut stars: ResMut<StarField>,
    star_mesh: Option<Res<StarFieldMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    stars.advance(DRIFT_STEP);

    let Some(mesh) = star_mesh.and_then(|handle| meshes.get_mut(&handle.0)) else {
        return;
    };
    if let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        if positions.len() == stars.len() {
            positions.copy_from_slice(stars.positions());
            return;
        }
    }
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, stars.positions().to_vec());
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The accumulated scene data model.
//!
//! One construction pass produces a [`SceneDescription`]: the flat mesh list
//! the kernel streamed out, plus the material records resolved for it. The
//! model is deliberately renderer-agnostic; buffers and transforms pass
//! through exactly as the kernel emitted them.

use std::collections::HashSet;

use crate::catalog::MaterialRecord;
use crate::kernel::RuntimeComponentId;
use crate::math::{Mat4, UvTransform};

/// The upsert identity of a named mesh within its owning component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshKey {
    /// Mesh id, stable within the owning component.
    pub mesh_id: String,
    /// Geometry id, stable within the mesh.
    pub geometry_id: String,
}

/// One renderable primitive of the accumulated scene.
///
/// Entries with an identity are *named*: later construction events may update
/// them in place, and `(runtime_component_id, mesh_id, geometry_id)` is
/// unique among them. Entries without an identity are *baked*: anonymous
/// geometry that is appended once and never matched again.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    /// Runtime id of the component that owns the geometry.
    pub runtime_component_id: RuntimeComponentId,
    /// Whether the geometry belongs to the environment rather than the
    /// configured product.
    pub environment_geometry: bool,
    /// Upsert identity; `None` marks a baked entry.
    pub identity: Option<MeshKey>,
    /// Catalog id of the material applied to the geometry.
    pub material_id: String,
    /// Vertex positions, three floats per vertex.
    pub vertices: Vec<f32>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Texture coordinates, two floats per vertex.
    pub uv_coords: Vec<f32>,
    /// Vertex normals, three floats per vertex.
    pub normals: Vec<f32>,
    /// Local transform; baked entries carry none.
    pub transform: Option<Mat4>,
    /// UV transform, when the kernel supplied one.
    pub uv_transform: Option<UvTransform>,
}

impl SceneMesh {
    /// Whether this entry is baked (anonymous, never updated in place).
    pub fn is_baked(&self) -> bool {
        self.identity.is_none()
    }

    /// Whether this entry is the named mesh identified by the given key.
    /// Baked entries match nothing.
    pub fn is_named(&self, runtime_component_id: RuntimeComponentId, mesh_id: &str, geometry_id: &str) -> bool {
        match &self.identity {
            Some(key) => {
                self.runtime_component_id == runtime_component_id
                    && key.mesh_id == mesh_id
                    && key.geometry_id == geometry_id
            }
            None => false,
        }
    }
}

/// The finished output of one construction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    /// The accumulated meshes, in kernel emission order (updates preserve
    /// position).
    pub meshes: Vec<SceneMesh>,
    /// Material records resolved for the meshes' material ids. May be empty
    /// on resolution failure (partial result).
    pub materials: Vec<MaterialRecord>,
}

/// The distinct material ids referenced by a mesh list, in first-appearance
/// order.
pub fn distinct_material_ids(meshes: &[SceneMesh]) -> Vec<String> {
    let mut seen = HashSet::new();
    meshes
        .iter()
        .filter(|mesh| seen.insert(mesh.material_id.clone()))
        .map(|mesh| mesh.material_id.clone())
        .collect()
}

/// The distinct runtime component ids referenced by a mesh list, in
/// first-appearance order.
pub fn distinct_runtime_component_ids(meshes: &[SceneMesh]) -> Vec<RuntimeComponentId> {
    let mut seen = HashSet::new();
    meshes
        .iter()
        .filter(|mesh| seen.insert(mesh.runtime_component_id))
        .map(|mesh| mesh.runtime_component_id)
        .collect()
}

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

//! The incremental scene accumulator.
//!
//! One call to [`SceneAccumulator::construct`] triggers the kernel's
//! synchronous geometry construction, during which the kernel streams mesh
//! events through the router into this accumulator. Events arrive small,
//! possibly duplicated, and possibly as in-place updates; the accumulator
//! folds them into one consistent mesh list, then resolves the material
//! records the list references.
//!
//! State is scoped to exactly one pass: it is created fresh when `construct`
//! begins and taken out when the kernel call returns. Events arriving outside
//! a pass find no state and are ignored.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use atelier_core::catalog::CatalogGateway;
use atelier_core::event::{BakedMesh, ConstructionSink, NamedMesh, NamedMeshUpdate};
use atelier_core::kernel::{ConfigurationKernel, PlanObjectId, RuntimeComponentId};
use atelier_core::scene::{distinct_material_ids, MeshKey, SceneDescription, SceneMesh};

#[derive(Default)]
struct SceneState {
    meshes: Vec<SceneMesh>,
}

impl SceneState {
    fn find_named_mut(
        &mut self,
        runtime_component_id: RuntimeComponentId,
        mesh_id: &str,
        geometry_id: &str,
    ) -> Option<&mut SceneMesh> {
        self.meshes
            .iter_mut()
            .find(|mesh| mesh.is_named(runtime_component_id, mesh_id, geometry_id))
    }
}

/// Accumulates the kernel's construction events into a [`SceneDescription`].
pub struct SceneAccumulator {
    kernel: Rc<RefCell<dyn ConfigurationKernel>>,
    catalog: Rc<dyn CatalogGateway>,
    state: RefCell<Option<SceneState>>,
}

impl SceneAccumulator {
    /// Creates an accumulator with no pass in progress.
    pub fn new(kernel: Rc<RefCell<dyn ConfigurationKernel>>, catalog: Rc<dyn CatalogGateway>) -> Self {
        Self {
            kernel,
            catalog,
            state: RefCell::new(None),
        }
    }

    /// Runs one construction pass for a plan object and returns the finished
    /// scene description.
    ///
    /// The kernel call is synchronous; every mesh event it emits lands in
    /// this accumulator before the call returns. Afterwards the distinct
    /// material ids of the accumulated meshes are resolved in one catalog
    /// batch. A failing material batch is logged and yields a scene with an
    /// empty material list rather than an error.
    pub async fn construct(&self, root_id: PlanObjectId) -> Result<SceneDescription> {
        log::debug!("constructing plan object {root_id}");
        *self.state.borrow_mut() = Some(SceneState::default());
        self.kernel.borrow_mut().request_construction(root_id);
        let state = self.state.borrow_mut().take().unwrap_or_default();

        let material_ids = distinct_material_ids(&state.meshes);
        let materials = if material_ids.is_empty() {
            Vec::new()
        } else {
            match self.catalog.materials(&material_ids).await {
                Ok(records) => records,
                Err(err) => {
                    log::warn!("material resolution failed for plan object {root_id}: {err}");
                    Vec::new()
                }
            }
        };

        log::debug!(
            "constructed plan object {root_id}: {} meshes, {} materials",
            state.meshes.len(),
            materials.len()
        );
        Ok(SceneDescription {
            meshes: state.meshes,
            materials,
        })
    }
}

impl ConstructionSink for SceneAccumulator {
    fn add_baked_mesh(&self, mesh: BakedMesh) {
        let mut guard = self.state.borrow_mut();
        let Some(state) = guard.as_mut() else { return };
        // Baked geometry has no identity: every event appends, and no later
        // event can match it.
        state.meshes.push(SceneMesh {
            runtime_component_id: mesh.runtime_component_id,
            environment_geometry: mesh.environment_geometry,
            identity: None,
            material_id: mesh.material_id,
            vertices: mesh.vertices,
            indices: mesh.indices,
            uv_coords: mesh.uv_coords,
            normals: mesh.normals,
            transform: None,
            uv_transform: None,
        });
    }

    fn add_named_mesh(&self, mesh: NamedMesh) {
        let mut guard = self.state.borrow_mut();
        let Some(state) = guard.as_mut() else { return };
        match state.find_named_mut(mesh.runtime_component_id, &mesh.mesh_id, &mesh.geometry_id) {
            Some(entry) => {
                // Update in place; the entry keeps its position in the list.
                entry.environment_geometry = mesh.environment_geometry;
                entry.material_id = mesh.material_id;
                entry.vertices = mesh.vertices;
                entry.indices = mesh.indices;
                entry.uv_coords = mesh.uv_coords;
                entry.normals = mesh.normals;
                entry.transform = Some(mesh.transform);
                entry.uv_transform = mesh.uv_transform;
            }
            None => state.meshes.push(SceneMesh {
                runtime_component_id: mesh.runtime_component_id,
                environment_geometry: mesh.environment_geometry,
                identity: Some(MeshKey {
                    mesh_id: mesh.mesh_id,
                    geometry_id: mesh.geometry_id,
                }),
                material_id: mesh.material_id,
                vertices: mesh.vertices,
                indices: mesh.indices,
                uv_coords: mesh.uv_coords,
                normals: mesh.normals,
                transform: Some(mesh.transform),
                uv_transform: mesh.uv_transform,
            }),
        }
    }

    fn changed_named_mesh(&self, update: NamedMeshUpdate) {
        let mut guard = self.state.borrow_mut();
        let Some(state) = guard.as_mut() else { return };
        if let Some(entry) =
            state.find_named_mut(update.runtime_component_id, &update.mesh_id, &update.geometry_id)
        {
            // Geometry buffers are untouched; only appearance changes.
            entry.material_id = update.material_id;
            entry.transform = Some(update.transform);
            entry.uv_transform = update.uv_transform;
        }
    }

    fn remove_named_mesh(&self, runtime_component_id: RuntimeComponentId, geometry_id: &str) {
        // Accepted but has no effect: removed meshes are never purged from
        // the accumulated list, so an entry can go stale if its component
        // leaves the configuration mid-pass. Known lifecycle gap; fixing it
        // requires a removal policy the kernel contract does not pin down.
        log::trace!("remove_named_mesh ignored for {runtime_component_id} '{geometry_id}'");
    }

    fn construction_done(&self, plan_object_id: PlanObjectId) {
        // No effect; construct() observes completion by the kernel call
        // returning, not by this event.
        log::trace!("construction_done for plan object {plan_object_id}");
    }
}

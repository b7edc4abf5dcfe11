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

//! The callback surface the kernel emits into.
//!
//! Kernel events fall into two unrelated groups: *resolution* events (the
//! kernel declaring a data dependency it cannot satisfy itself) and
//! *construction* events (the kernel streaming out geometry and material
//! state while it builds a plan object). Rather than one monolithic callback
//! object, each group gets its own narrow sink trait; a router owns at most
//! one attached sink per group and forwards events 1:1.
//!
//! All callbacks are invoked synchronously from inside a kernel call, and a
//! sink may be re-entered while a feedback call it triggered is still on the
//! stack. Implementations must therefore confine any interior-mutability
//! borrow to a single push or swap, and must never call back into the kernel.

use crate::kernel::{ComponentConfiguration, ConversationId, KernelComponent, PlanObjectId, RuntimeComponentId};
use crate::math::{Mat4, UvTransform, Vec3};

/// Payload of a baked-mesh event: anonymous geometry with no stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedMesh {
    /// Runtime id of the component that owns the geometry.
    pub runtime_component_id: RuntimeComponentId,
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
    /// Whether the geometry belongs to the environment rather than the
    /// configured product.
    pub environment_geometry: bool,
}

/// Payload of a named-mesh event: identified geometry that later events may
/// update in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMesh {
    /// Runtime id of the component that owns the geometry.
    pub runtime_component_id: RuntimeComponentId,
    /// Mesh id, stable within the owning component.
    pub mesh_id: String,
    /// Geometry id, stable within the mesh.
    pub geometry_id: String,
    /// Catalog id of the material applied to the geometry.
    pub material_id: String,
    /// Local transform of the geometry.
    pub transform: Mat4,
    /// Vertex positions, three floats per vertex.
    pub vertices: Vec<f32>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Texture coordinates, two floats per vertex.
    pub uv_coords: Vec<f32>,
    /// Vertex normals, three floats per vertex.
    pub normals: Vec<f32>,
    /// Whether the geometry belongs to the environment.
    pub environment_geometry: bool,
    /// UV transform, when the kernel supplies one.
    pub uv_transform: Option<UvTransform>,
}

/// Payload of a named-mesh-changed event: a material/transform update for an
/// already-emitted named mesh. Geometry buffers are not part of the update.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMeshUpdate {
    /// Runtime id of the component that owns the geometry.
    pub runtime_component_id: RuntimeComponentId,
    /// Mesh id of the entry to update.
    pub mesh_id: String,
    /// Geometry id of the entry to update.
    pub geometry_id: String,
    /// New material id.
    pub material_id: String,
    /// New local transform.
    pub transform: Mat4,
    /// New UV transform, when the kernel supplies one.
    pub uv_transform: Option<UvTransform>,
}

/// Consumer of resolution events: the kernel declaring data dependencies and
/// reporting evaluation milestones.
///
/// The request methods are the load-bearing part of the contract; the
/// informational ones default to no-ops so a resolver only implements what it
/// acts on.
pub trait ResolutionSink {
    /// The kernel needs a component definition to continue evaluating the
    /// identified conversation.
    fn request_component(
        &self,
        conversation_id: ConversationId,
        configuration: ComponentConfiguration,
        parent_id: RuntimeComponentId,
    );

    /// The kernel needs a sub-component definition for a part slot.
    fn request_sub_component(&self, parent_id: RuntimeComponentId, part_id: &str, component_id: &str);

    /// The kernel needs property maps for the given materials.
    fn request_material_properties(&self, material_ids: &[String]);

    /// The kernel needs an externally authored mesh at the given quality.
    fn request_external_mesh(&self, mesh_id: &str, quality: u32);

    /// The kernel asks for the materials of the given groups. Accepted as
    /// part of the surface; not acted on.
    fn request_materials_in_group(&self, _group_ids: &[String]) {}

    /// A top-level configuration finished loading.
    fn configuration_loaded(
        &self,
        _conversation_id: ConversationId,
        _object_id: PlanObjectId,
        _component_id: RuntimeComponentId,
        _hash: &str,
        _errors: &[String],
    ) {
    }

    /// A configuration failed to load.
    fn configuration_loading_error(&self, _runtime_id: RuntimeComponentId, _errors: &[String]) {}

    /// A component's configuration changed after evaluation.
    fn component_configuration_updated(
        &self,
        _runtime_component_id: RuntimeComponentId,
        _geometry_changed: bool,
    ) {
    }

    /// A component's metadata record was refreshed.
    fn component_meta_updated(&self, _component: &KernelComponent) {}

    /// A plan object was created for a conversation.
    fn plan_object_created(&self, _conversation_id: ConversationId, _plan_object_id: PlanObjectId) {}

    /// A plan object was updated.
    fn plan_object_updated(&self, _plan_object_id: PlanObjectId) {}

    /// The kernel's scene was cleared.
    fn scene_cleared(&self) {}
}

/// Consumer of construction events: the kernel streaming out geometry while
/// it builds a plan object.
pub trait ConstructionSink {
    /// Anonymous baked geometry. Always appends; never updated later.
    fn add_baked_mesh(&self, mesh: BakedMesh);

    /// Identified geometry. Upserts by `(runtime_component_id, mesh_id,
    /// geometry_id)`.
    fn add_named_mesh(&self, mesh: NamedMesh);

    /// Material/transform update for an already-emitted named mesh.
    fn changed_named_mesh(&self, update: NamedMeshUpdate);

    /// A named mesh left the kernel's scene.
    fn remove_named_mesh(&self, runtime_component_id: RuntimeComponentId, geometry_id: &str);

    /// Construction of a plan object completed.
    fn construction_done(&self, plan_object_id: PlanObjectId);

    /// A component instance was created during construction.
    fn component_created(
        &self,
        _id: RuntimeComponentId,
        _position: Vec3,
        _euler_angles: Vec3,
        _parent_object_id: PlanObjectId,
        _is_root_component: bool,
    ) {
    }

    /// The root component of a plan object was created.
    fn root_component_created(
        &self,
        _id: RuntimeComponentId,
        _position: Vec3,
        _euler_angles: Vec3,
        _parent_object_id: PlanObjectId,
    ) {
    }

    /// A component's geometry became ready.
    fn geometry_ready(&self, _id: RuntimeComponentId) {}

    /// A component's geometry became invalid.
    fn geometry_not_ready(&self, _id: RuntimeComponentId) {}

    /// Construction of a component began.
    fn begin_construction(&self, _component_id: RuntimeComponentId, _is_delta_update: bool) {}

    /// Construction of a component ended.
    fn end_construction(&self, _id: RuntimeComponentId) {}
}

/// The full event surface the kernel is registered against.
///
/// A router implements this by forwarding each event to whichever narrow sink
/// is currently attached for its group; the kernel itself never sees the
/// narrow traits.
pub trait KernelEventSink {
    /// See [`ResolutionSink::request_component`].
    fn request_component(
        &self,
        conversation_id: ConversationId,
        configuration: ComponentConfiguration,
        parent_id: RuntimeComponentId,
    );
    /// See [`ResolutionSink::request_sub_component`].
    fn request_sub_component(&self, parent_id: RuntimeComponentId, part_id: &str, component_id: &str);
    /// See [`ResolutionSink::request_material_properties`].
    fn request_material_properties(&self, material_ids: &[String]);
    /// See [`ResolutionSink::request_external_mesh`].
    fn request_external_mesh(&self, mesh_id: &str, quality: u32);
    /// See [`ResolutionSink::request_materials_in_group`].
    fn request_materials_in_group(&self, group_ids: &[String]);
    /// See [`ResolutionSink::configuration_loaded`].
    fn configuration_loaded(
        &self,
        conversation_id: ConversationId,
        object_id: PlanObjectId,
        component_id: RuntimeComponentId,
        hash: &str,
        errors: &[String],
    );
    /// See [`ResolutionSink::configuration_loading_error`].
    fn configuration_loading_error(&self, runtime_id: RuntimeComponentId, errors: &[String]);
    /// See [`ResolutionSink::component_configuration_updated`].
    fn component_configuration_updated(
        &self,
        runtime_component_id: RuntimeComponentId,
        geometry_changed: bool,
    );
    /// See [`ResolutionSink::component_meta_updated`].
    fn component_meta_updated(&self, component: &KernelComponent);
    /// See [`ResolutionSink::plan_object_created`].
    fn plan_object_created(&self, conversation_id: ConversationId, plan_object_id: PlanObjectId);
    /// See [`ResolutionSink::plan_object_updated`].
    fn plan_object_updated(&self, plan_object_id: PlanObjectId);
    /// See [`ResolutionSink::scene_cleared`].
    fn scene_cleared(&self);

    /// See [`ConstructionSink::add_baked_mesh`].
    fn add_baked_mesh(&self, mesh: BakedMesh);
    /// See [`ConstructionSink::add_named_mesh`].
    fn add_named_mesh(&self, mesh: NamedMesh);
    /// See [`ConstructionSink::changed_named_mesh`].
    fn changed_named_mesh(&self, update: NamedMeshUpdate);
    /// See [`ConstructionSink::remove_named_mesh`].
    fn remove_named_mesh(&self, runtime_component_id: RuntimeComponentId, geometry_id: &str);
    /// See [`ConstructionSink::construction_done`].
    fn construction_done(&self, plan_object_id: PlanObjectId);
    /// See [`ConstructionSink::component_created`].
    fn component_created(
        &self,
        id: RuntimeComponentId,
        position: Vec3,
        euler_angles: Vec3,
        parent_object_id: PlanObjectId,
        is_root_component: bool,
    );
    /// See [`ConstructionSink::root_component_created`].
    fn root_component_created(
        &self,
        id: RuntimeComponentId,
        position: Vec3,
        euler_angles: Vec3,
        parent_object_id: PlanObjectId,
    );
    /// See [`ConstructionSink::geometry_ready`].
    fn geometry_ready(&self, id: RuntimeComponentId);
    /// See [`ConstructionSink::geometry_not_ready`].
    fn geometry_not_ready(&self, id: RuntimeComponentId);
    /// See [`ConstructionSink::begin_construction`].
    fn begin_construction(&self, component_id: RuntimeComponentId, is_delta_update: bool);
    /// See [`ConstructionSink::end_construction`].
    fn end_construction(&self, id: RuntimeComponentId);
}

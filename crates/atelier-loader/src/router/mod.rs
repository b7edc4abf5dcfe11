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

//! The callback router between the kernel and its two consumers.
//!
//! The kernel is registered against one [`KernelEventSink`]; this router
//! implements it by forwarding every event to whichever narrow sink is
//! currently attached for its group. An event whose target is detached is
//! logged and dropped — never an error, because detaching a consumer
//! mid-session is a supported state, not a bug.
//!
//! The sink handles are cloned out of their cells before an event is
//! forwarded, so a re-entrant attach or detach from inside a callback can
//! never observe an open borrow.

use std::cell::RefCell;
use std::rc::Rc;

use atelier_core::event::{
    BakedMesh, ConstructionSink, KernelEventSink, NamedMesh, NamedMeshUpdate, ResolutionSink,
};
use atelier_core::kernel::{
    ComponentConfiguration, ConversationId, KernelComponent, PlanObjectId, RuntimeComponentId,
};
use atelier_core::math::Vec3;

/// Routes kernel events to at most one resolution and one construction
/// consumer.
#[derive(Default)]
pub struct CallbackRouter {
    resolution: RefCell<Option<Rc<dyn ResolutionSink>>>,
    construction: RefCell<Option<Rc<dyn ConstructionSink>>>,
}

impl CallbackRouter {
    /// Creates a router with no consumers attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the resolution consumer, replacing any previous one.
    pub fn attach_resolution(&self, sink: Rc<dyn ResolutionSink>) {
        *self.resolution.borrow_mut() = Some(sink);
    }

    /// Detaches the resolution consumer; its events are dropped from now on.
    pub fn detach_resolution(&self) {
        *self.resolution.borrow_mut() = None;
    }

    /// Attaches the construction consumer, replacing any previous one.
    pub fn attach_construction(&self, sink: Rc<dyn ConstructionSink>) {
        *self.construction.borrow_mut() = Some(sink);
    }

    /// Detaches the construction consumer; its events are dropped from now
    /// on.
    pub fn detach_construction(&self) {
        *self.construction.borrow_mut() = None;
    }

    fn with_resolution(&self, event: &'static str, forward: impl FnOnce(&dyn ResolutionSink)) {
        let sink = self.resolution.borrow().clone();
        match sink {
            Some(sink) => {
                log::trace!("kernel event: {event}");
                forward(sink.as_ref());
            }
            None => log::debug!("kernel event dropped, no resolution consumer: {event}"),
        }
    }

    fn with_construction(&self, event: &'static str, forward: impl FnOnce(&dyn ConstructionSink)) {
        let sink = self.construction.borrow().clone();
        match sink {
            Some(sink) => {
                log::trace!("kernel event: {event}");
                forward(sink.as_ref());
            }
            None => log::debug!("kernel event dropped, no construction consumer: {event}"),
        }
    }
}

impl KernelEventSink for CallbackRouter {
    fn request_component(
        &self,
        conversation_id: ConversationId,
        configuration: ComponentConfiguration,
        parent_id: RuntimeComponentId,
    ) {
        self.with_resolution("request_component", |sink| {
            sink.request_component(conversation_id, configuration, parent_id);
        });
    }

    fn request_sub_component(&self, parent_id: RuntimeComponentId, part_id: &str, component_id: &str) {
        self.with_resolution("request_sub_component", |sink| {
            sink.request_sub_component(parent_id, part_id, component_id);
        });
    }

    fn request_material_properties(&self, material_ids: &[String]) {
        self.with_resolution("request_material_properties", |sink| {
            sink.request_material_properties(material_ids);
        });
    }

    fn request_external_mesh(&self, mesh_id: &str, quality: u32) {
        self.with_resolution("request_external_mesh", |sink| {
            sink.request_external_mesh(mesh_id, quality);
        });
    }

    fn request_materials_in_group(&self, group_ids: &[String]) {
        self.with_resolution("request_materials_in_group", |sink| {
            sink.request_materials_in_group(group_ids);
        });
    }

    fn configuration_loaded(
        &self,
        conversation_id: ConversationId,
        object_id: PlanObjectId,
        component_id: RuntimeComponentId,
        hash: &str,
        errors: &[String],
    ) {
        self.with_resolution("configuration_loaded", |sink| {
            sink.configuration_loaded(conversation_id, object_id, component_id, hash, errors);
        });
    }

    fn configuration_loading_error(&self, runtime_id: RuntimeComponentId, errors: &[String]) {
        self.with_resolution("configuration_loading_error", |sink| {
            sink.configuration_loading_error(runtime_id, errors);
        });
    }

    fn component_configuration_updated(
        &self,
        runtime_component_id: RuntimeComponentId,
        geometry_changed: bool,
    ) {
        self.with_resolution("component_configuration_updated", |sink| {
            sink.component_configuration_updated(runtime_component_id, geometry_changed);
        });
    }

    fn component_meta_updated(&self, component: &KernelComponent) {
        self.with_resolution("component_meta_updated", |sink| {
            sink.component_meta_updated(component);
        });
    }

    fn plan_object_created(&self, conversation_id: ConversationId, plan_object_id: PlanObjectId) {
        self.with_resolution("plan_object_created", |sink| {
            sink.plan_object_created(conversation_id, plan_object_id);
        });
    }

    fn plan_object_updated(&self, plan_object_id: PlanObjectId) {
        self.with_resolution("plan_object_updated", |sink| {
            sink.plan_object_updated(plan_object_id);
        });
    }

    fn scene_cleared(&self) {
        self.with_resolution("scene_cleared", |sink| sink.scene_cleared());
    }

    fn add_baked_mesh(&self, mesh: BakedMesh) {
        self.with_construction("add_baked_mesh", |sink| sink.add_baked_mesh(mesh));
    }

    fn add_named_mesh(&self, mesh: NamedMesh) {
        self.with_construction("add_named_mesh", |sink| sink.add_named_mesh(mesh));
    }

    fn changed_named_mesh(&self, update: NamedMeshUpdate) {
        self.with_construction("changed_named_mesh", |sink| sink.changed_named_mesh(update));
    }

    fn remove_named_mesh(&self, runtime_component_id: RuntimeComponentId, geometry_id: &str) {
        self.with_construction("remove_named_mesh", |sink| {
            sink.remove_named_mesh(runtime_component_id, geometry_id);
        });
    }

    fn construction_done(&self, plan_object_id: PlanObjectId) {
        self.with_construction("construction_done", |sink| {
            sink.construction_done(plan_object_id);
        });
    }

    fn component_created(
        &self,
        id: RuntimeComponentId,
        position: Vec3,
        euler_angles: Vec3,
        parent_object_id: PlanObjectId,
        is_root_component: bool,
    ) {
        self.with_construction("component_created", |sink| {
            sink.component_created(id, position, euler_angles, parent_object_id, is_root_component);
        });
    }

    fn root_component_created(
        &self,
        id: RuntimeComponentId,
        position: Vec3,
        euler_angles: Vec3,
        parent_object_id: PlanObjectId,
    ) {
        self.with_construction("root_component_created", |sink| {
            sink.root_component_created(id, position, euler_angles, parent_object_id);
        });
    }

    fn geometry_ready(&self, id: RuntimeComponentId) {
        self.with_construction("geometry_ready", |sink| sink.geometry_ready(id));
    }

    fn geometry_not_ready(&self, id: RuntimeComponentId) {
        self.with_construction("geometry_not_ready", |sink| sink.geometry_not_ready(id));
    }

    fn begin_construction(&self, component_id: RuntimeComponentId, is_delta_update: bool) {
        self.with_construction("begin_construction", |sink| {
            sink.begin_construction(component_id, is_delta_update);
        });
    }

    fn end_construction(&self, id: RuntimeComponentId) {
        self.with_construction("end_construction", |sink| sink.end_construction(id));
    }
}

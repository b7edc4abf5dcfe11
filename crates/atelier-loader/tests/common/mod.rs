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

//! Shared fakes for the loader integration tests: a scripted kernel that
//! replays callback events through the router, and an in-memory catalog that
//! records every batch it serves.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use atelier_core::catalog::{
    CatalogGateway, ComponentRecord, MaterialRecord, MeshDataEntry, MeshDataManifest, MeshLinks,
    MeshRecord,
};
use atelier_core::error::GatewayError;
use atelier_core::event::{BakedMesh, KernelEventSink, NamedMesh, NamedMeshUpdate};
use atelier_core::kernel::{
    ComponentConfiguration, ConfigurationKernel, ConversationId, KernelComponent,
    MaterialPropertySet, PlanObjectId, RuntimeComponentId,
};
use atelier_core::math::{Mat4, UvTransform, Vec3};
use atelier_loader::router::CallbackRouter;

/// One call the loader made into the kernel, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelCall {
    LoadConfiguration {
        conversation_id: ConversationId,
        definition: String,
    },
    LoadComponent {
        conversation_id: ConversationId,
        component_id: String,
        definition: String,
        parent_id: RuntimeComponentId,
    },
    LoadedSubComponent {
        parent_id: RuntimeComponentId,
        part_id: String,
        component_id: String,
        definition: String,
    },
    SetMaterialProperties {
        ids: Vec<String>,
    },
    AddExternalMesh {
        mesh_id: String,
        quality: u32,
        payload: Vec<u8>,
    },
    RequestConstruction {
        root_id: PlanObjectId,
    },
    ClearAll,
}

/// One callback event the scripted kernel replays through the router while a
/// kernel call is on the stack.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    RequestComponent {
        component_id: String,
        parent_id: i64,
    },
    RequestSubComponent {
        parent_id: i64,
        part_id: String,
        component_id: String,
    },
    RequestMaterialProperties(Vec<String>),
    RequestExternalMesh {
        mesh_id: String,
        quality: u32,
    },
    Baked(BakedMesh),
    Named(NamedMesh),
    Changed(NamedMeshUpdate),
    Removed {
        runtime_component_id: i64,
        geometry_id: String,
    },
    Done,
}

/// A stand-in for the native configuration kernel: records every call it
/// receives and synchronously replays scripted callback events, exercising
/// the same re-entrancy the real kernel produces.
#[derive(Default)]
pub struct ScriptedKernel {
    router: RefCell<Option<Rc<CallbackRouter>>>,
    /// Every call received, in order.
    pub calls: Vec<KernelCall>,
    /// Replayed while `load_configuration` is on the stack.
    pub on_configuration: Vec<ScriptedEvent>,
    /// Replayed while `load_component` for the keyed component id is on the
    /// stack.
    pub on_component: HashMap<String, Vec<ScriptedEvent>>,
    /// Replayed while `request_construction` is on the stack.
    pub on_construction: Vec<ScriptedEvent>,
    /// Component records served by `component()`.
    pub components: HashMap<i64, KernelComponent>,
}

impl ScriptedKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the event sink the kernel emits into, as the embedder does
    /// once at startup.
    pub fn register_router(&self, router: Rc<CallbackRouter>) {
        *self.router.borrow_mut() = Some(router);
    }

    fn replay(&self, conversation_id: ConversationId, events: &[ScriptedEvent]) {
        let Some(router) = self.router.borrow().clone() else {
            return;
        };
        for event in events {
            match event {
                ScriptedEvent::RequestComponent {
                    component_id,
                    parent_id,
                } => router.request_component(
                    conversation_id,
                    ComponentConfiguration::new(component_id.clone()),
                    RuntimeComponentId(*parent_id),
                ),
                ScriptedEvent::RequestSubComponent {
                    parent_id,
                    part_id,
                    component_id,
                } => router.request_sub_component(
                    RuntimeComponentId(*parent_id),
                    part_id,
                    component_id,
                ),
                ScriptedEvent::RequestMaterialProperties(ids) => {
                    router.request_material_properties(ids)
                }
                ScriptedEvent::RequestExternalMesh { mesh_id, quality } => {
                    router.request_external_mesh(mesh_id, *quality)
                }
                ScriptedEvent::Baked(mesh) => router.add_baked_mesh(mesh.clone()),
                ScriptedEvent::Named(mesh) => router.add_named_mesh(mesh.clone()),
                ScriptedEvent::Changed(update) => router.changed_named_mesh(update.clone()),
                ScriptedEvent::Removed {
                    runtime_component_id,
                    geometry_id,
                } => router.remove_named_mesh(
                    RuntimeComponentId(*runtime_component_id),
                    geometry_id,
                ),
                ScriptedEvent::Done => router.construction_done(PlanObjectId(1)),
            }
        }
    }
}

impl ConfigurationKernel for ScriptedKernel {
    fn load_configuration(&mut self, conversation_id: ConversationId, definition: &str, _bounds: Vec3) {
        self.calls.push(KernelCall::LoadConfiguration {
            conversation_id,
            definition: definition.to_string(),
        });
        let events = self.on_configuration.clone();
        self.replay(conversation_id, &events);
    }

    fn load_component(
        &mut self,
        conversation_id: ConversationId,
        definition: &str,
        configuration: &ComponentConfiguration,
        parent_id: RuntimeComponentId,
    ) {
        self.calls.push(KernelCall::LoadComponent {
            conversation_id,
            component_id: configuration.component_id.clone(),
            definition: definition.to_string(),
            parent_id,
        });
        if let Some(events) = self.on_component.get(&configuration.component_id).cloned() {
            self.replay(conversation_id, &events);
        }
    }

    fn loaded_sub_component(
        &mut self,
        parent_id: RuntimeComponentId,
        part_id: &str,
        component_id: &str,
        definition: &str,
    ) {
        self.calls.push(KernelCall::LoadedSubComponent {
            parent_id,
            part_id: part_id.to_string(),
            component_id: component_id.to_string(),
            definition: definition.to_string(),
        });
    }

    fn set_material_properties(&mut self, materials: &[MaterialPropertySet]) {
        self.calls.push(KernelCall::SetMaterialProperties {
            ids: materials.iter().map(|set| set.id.clone()).collect(),
        });
    }

    fn add_external_mesh(&mut self, mesh_id: &str, quality: u32, data: &[u8]) {
        self.calls.push(KernelCall::AddExternalMesh {
            mesh_id: mesh_id.to_string(),
            quality,
            payload: data.to_vec(),
        });
    }

    fn request_construction(&mut self, root_id: PlanObjectId) {
        self.calls.push(KernelCall::RequestConstruction { root_id });
        let events = self.on_construction.clone();
        self.replay(ConversationId(0), &events);
    }

    fn component(&self, runtime_id: RuntimeComponentId) -> Option<KernelComponent> {
        self.components.get(&runtime_id.0).cloned()
    }

    fn clear_all(&mut self) {
        self.calls.push(KernelCall::ClearAll);
    }
}

/// One request the fake catalog served, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    Configuration(String),
    Item(String),
    Components(Vec<String>),
    Materials(Vec<String>),
    Mesh { mesh_id: String, quality: u32 },
    Manifest(String),
    Blob(String),
}

/// In-memory catalog: serves whatever records it was seeded with, matching
/// batch ids case-insensitively the way the service does, and records every
/// call.
#[derive(Default)]
pub struct FakeCatalog {
    pub configurations: HashMap<String, String>,
    pub items: HashMap<String, String>,
    pub components: Vec<ComponentRecord>,
    pub materials: Vec<MaterialRecord>,
    pub meshes: HashMap<String, MeshRecord>,
    pub manifests: HashMap<String, MeshDataManifest>,
    pub blobs: HashMap<String, Vec<u8>>,
    /// When set, batch endpoints answer with a server error.
    pub fail_batches: bool,
    pub calls: RefCell<Vec<CatalogCall>>,
}

impl FakeCatalog {
    fn batch_failure(&self, url: &str) -> GatewayError {
        GatewayError::Status {
            url: url.to_string(),
            code: 500,
        }
    }
}

#[async_trait(?Send)]
impl CatalogGateway for FakeCatalog {
    async fn configuration_definition(&self, configuration_id: &str) -> Result<String, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Configuration(configuration_id.to_string()));
        self.configurations
            .get(configuration_id)
            .cloned()
            .ok_or(GatewayError::Status {
                url: format!("fake://configurations/{configuration_id}"),
                code: 404,
            })
    }

    async fn item_definition(&self, item_id: &str) -> Result<String, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Item(item_id.to_string()));
        self.items.get(item_id).cloned().ok_or(GatewayError::Status {
            url: format!("fake://items/{item_id}"),
            code: 404,
        })
    }

    async fn components(&self, ids: &[String]) -> Result<Vec<ComponentRecord>, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Components(ids.to_vec()));
        if self.fail_batches {
            return Err(self.batch_failure("fake://components"));
        }
        Ok(self
            .components
            .iter()
            .filter(|record| ids.iter().any(|id| id.eq_ignore_ascii_case(&record.id)))
            .cloned()
            .collect())
    }

    async fn materials(&self, ids: &[String]) -> Result<Vec<MaterialRecord>, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Materials(ids.to_vec()));
        if self.fail_batches {
            return Err(self.batch_failure("fake://materials"));
        }
        Ok(self
            .materials
            .iter()
            .filter(|record| ids.iter().any(|id| id.eq_ignore_ascii_case(&record.id)))
            .cloned()
            .collect())
    }

    async fn mesh(&self, mesh_id: &str, quality: u32) -> Result<MeshRecord, GatewayError> {
        self.calls.borrow_mut().push(CatalogCall::Mesh {
            mesh_id: mesh_id.to_string(),
            quality,
        });
        self.meshes.get(mesh_id).cloned().ok_or(GatewayError::Status {
            url: format!("fake://meshes/{mesh_id}"),
            code: 404,
        })
    }

    async fn mesh_manifest(&self, path: &str) -> Result<MeshDataManifest, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Manifest(path.to_string()));
        self.manifests.get(path).cloned().ok_or(GatewayError::Status {
            url: format!("fake://{path}"),
            code: 404,
        })
    }

    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        self.calls
            .borrow_mut()
            .push(CatalogCall::Blob(url.to_string()));
        self.blobs.get(url).cloned().ok_or(GatewayError::Status {
            url: url.to_string(),
            code: 404,
        })
    }
}

pub fn component_record(id: &str, definition: &str) -> ComponentRecord {
    ComponentRecord {
        id: id.to_string(),
        configuration: definition.to_string(),
    }
}

pub fn material_record(id: &str, pairs: &[(&str, &str)]) -> MaterialRecord {
    MaterialRecord {
        id: id.to_string(),
        properties: pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        shading: None,
        texture_objects: None,
    }
}

pub fn mesh_record(data_path: &str) -> MeshRecord {
    MeshRecord {
        links: MeshLinks {
            data: data_path.to_string(),
        },
    }
}

pub fn mesh_manifest(urls: &[&str]) -> MeshDataManifest {
    MeshDataManifest {
        mesh_datas: urls
            .iter()
            .map(|url| MeshDataEntry {
                url: url.to_string(),
            })
            .collect(),
    }
}

pub fn baked(component: i64, material: &str) -> BakedMesh {
    BakedMesh {
        runtime_component_id: RuntimeComponentId(component),
        material_id: material.to_string(),
        vertices: vec![0.0; 9],
        indices: vec![0, 1, 2],
        uv_coords: vec![0.0; 6],
        normals: vec![0.0; 9],
        environment_geometry: false,
    }
}

pub fn named(component: i64, mesh_id: &str, geometry_id: &str, material: &str) -> NamedMesh {
    NamedMesh {
        runtime_component_id: RuntimeComponentId(component),
        mesh_id: mesh_id.to_string(),
        geometry_id: geometry_id.to_string(),
        material_id: material.to_string(),
        transform: Mat4::IDENTITY,
        vertices: vec![1.0; 9],
        indices: vec![0, 1, 2],
        uv_coords: vec![0.5; 6],
        normals: vec![0.0; 9],
        environment_geometry: false,
        uv_transform: None,
    }
}

pub fn update(component: i64, mesh_id: &str, geometry_id: &str, material: &str) -> NamedMeshUpdate {
    NamedMeshUpdate {
        runtime_component_id: RuntimeComponentId(component),
        mesh_id: mesh_id.to_string(),
        geometry_id: geometry_id.to_string(),
        material_id: material.to_string(),
        transform: Mat4::from_array([
            2.0, 0.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, 0.0, //
            0.0, 0.0, 2.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ]),
        uv_transform: Some(UvTransform::IDENTITY),
    }
}

pub fn kernel_component(runtime_id: i64, component_id: &str) -> KernelComponent {
    KernelComponent {
        id: RuntimeComponentId(runtime_id),
        component_id: component_id.to_string(),
        global_transform: Mat4::IDENTITY,
    }
}

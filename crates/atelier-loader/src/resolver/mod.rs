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

//! The demand-driven dependency resolver.
//!
//! The kernel declares data dependencies through the callback surface while
//! it evaluates a configuration; the resolver queues them, batches them per
//! class, fetches them from the catalog, and feeds the results back — which
//! may synchronously enqueue more requests. [`DependencyResolver::drain`]
//! repeats that cycle until all four queues are simultaneously empty.
//!
//! Queue discipline: each queue is swapped for an empty one immediately
//! before its batch is dispatched, so requests enqueued during the batch's
//! network I/O or kernel feedback always land in the *next* round. Requests
//! are never dropped by the loop itself; only a failed or incomplete batch
//! drops them, with a log line.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::json;

use atelier_core::catalog::{CatalogGateway, ComponentRecord};
use atelier_core::error::GatewayError;
use atelier_core::event::ResolutionSink;
use atelier_core::kernel::{
    ComponentConfiguration, ConfigurationKernel, ConversationCounter, ConversationId,
    MaterialPropertySet, RuntimeComponentId,
};
use atelier_core::math::Vec3;

/// A queued component-definition request, still carrying the conversation it
/// belongs to.
#[derive(Debug, Clone)]
struct ComponentRequest {
    conversation_id: ConversationId,
    configuration: ComponentConfiguration,
    parent_id: RuntimeComponentId,
}

/// A queued sub-component request. No conversation correlation.
#[derive(Debug, Clone)]
struct SubComponentRequest {
    parent_id: RuntimeComponentId,
    part_id: String,
    component_id: String,
}

/// A queued external-mesh request.
#[derive(Debug, Clone)]
struct ExternalMeshRequest {
    mesh_id: String,
    quality: u32,
}

/// The four request queues. Push-only from the callback side; the drain loop
/// is the only consumer. Borrows never outlive a single push or swap, so
/// re-entrant kernel callbacks can always append.
#[derive(Default)]
struct RequestQueues {
    components: RefCell<Vec<ComponentRequest>>,
    sub_components: RefCell<Vec<SubComponentRequest>>,
    material_properties: RefCell<Vec<String>>,
    external_meshes: RefCell<Vec<ExternalMeshRequest>>,
}

impl RequestQueues {
    fn is_drained(&self) -> bool {
        self.components.borrow().is_empty()
            && self.sub_components.borrow().is_empty()
            && self.material_properties.borrow().is_empty()
            && self.external_meshes.borrow().is_empty()
    }
}

/// Resolves the kernel's data dependencies against the catalog until
/// evaluation is quiescent.
pub struct DependencyResolver {
    kernel: Rc<RefCell<dyn ConfigurationKernel>>,
    catalog: Rc<dyn CatalogGateway>,
    conversations: ConversationCounter,
    queues: RequestQueues,
}

impl DependencyResolver {
    /// Creates a resolver with its own conversation counter.
    pub fn new(kernel: Rc<RefCell<dyn ConfigurationKernel>>, catalog: Rc<dyn CatalogGateway>) -> Self {
        Self {
            kernel,
            catalog,
            conversations: ConversationCounter::new(),
            queues: RequestQueues::default(),
        }
    }

    /// Loads a configuration by identifier and resolves every dependency the
    /// kernel declares for it.
    ///
    /// The identifier decides how the initial definition is obtained:
    /// `component@<id>` synthesizes a one-field definition locally, an id
    /// with exactly one colon is fetched as an item, anything else as a full
    /// configuration. A failure to obtain the initial definition is the only
    /// error that propagates; batch failures during the drain are logged and
    /// swallowed.
    pub async fn load(&self, configuration_id: &str) -> Result<()> {
        log::debug!("loading '{configuration_id}'");
        let conversation_id = self.conversations.next();
        let definition = self
            .initial_definition(configuration_id)
            .await
            .with_context(|| format!("failed to resolve the definition of '{configuration_id}'"))?;
        self.kernel
            .borrow_mut()
            .load_configuration(conversation_id, &definition, Vec3::ZERO);
        self.drain().await;
        log::debug!("loaded '{configuration_id}'");
        Ok(())
    }

    async fn initial_definition(&self, configuration_id: &str) -> Result<String, GatewayError> {
        if let Some(component_id) = configuration_id.strip_prefix("component@") {
            return Ok(json!({ "componentId": component_id }).to_string());
        }
        match configuration_id.matches(':').count() {
            1 => self.catalog.item_definition(configuration_id).await,
            _ => self.catalog.configuration_definition(configuration_id).await,
        }
    }

    /// Drains all four request queues to a fixed point.
    ///
    /// Each round swaps a queue for an empty one and dispatches the captured
    /// batch; feeding results back into the kernel may enqueue new requests,
    /// which the next round picks up. The loop re-checks every queue after
    /// every round, so it terminates only when evaluation is quiescent.
    pub async fn drain(&self) {
        while !self.queues.is_drained() {
            let components = self.queues.components.take();
            if !components.is_empty() {
                if let Err(err) = self.resolve_components(components).await {
                    log::warn!("component batch dropped: {err}");
                }
            }

            let sub_components = self.queues.sub_components.take();
            if !sub_components.is_empty() {
                if let Err(err) = self.resolve_sub_components(sub_components).await {
                    log::warn!("sub-component batch dropped: {err}");
                }
            }

            let material_ids = self.queues.material_properties.take();
            if !material_ids.is_empty() {
                if let Err(err) = self.resolve_material_properties(material_ids).await {
                    log::warn!("material-property batch dropped: {err}");
                }
            }

            let external_meshes = self.queues.external_meshes.take();
            if !external_meshes.is_empty() {
                if let Err(err) = self.resolve_external_meshes(external_meshes).await {
                    log::warn!("external-mesh batch dropped: {err}");
                }
            }
        }
    }

    /// Whether any request is still queued. `false` after [`drain`] returns.
    ///
    /// [`drain`]: DependencyResolver::drain
    pub fn has_pending_requests(&self) -> bool {
        !self.queues.is_drained()
    }

    async fn resolve_components(&self, requests: Vec<ComponentRequest>) -> Result<(), GatewayError> {
        let ids = dedup_ids(requests.iter().map(|request| request.configuration.component_id.as_str()));
        let records = self.catalog.components(&ids).await?;
        for request in &requests {
            match find_component(&records, &request.configuration.component_id) {
                Some(record) => {
                    self.kernel.borrow_mut().load_component(
                        request.conversation_id,
                        &record.configuration,
                        &request.configuration,
                        request.parent_id,
                    );
                }
                None => log::warn!(
                    "component '{}' missing from catalog response, request dropped",
                    request.configuration.component_id
                ),
            }
        }
        Ok(())
    }

    async fn resolve_sub_components(&self, requests: Vec<SubComponentRequest>) -> Result<(), GatewayError> {
        let ids = dedup_ids(requests.iter().map(|request| request.component_id.as_str()));
        let records = self.catalog.components(&ids).await?;
        for request in &requests {
            match find_component(&records, &request.component_id) {
                Some(record) => {
                    self.kernel.borrow_mut().loaded_sub_component(
                        request.parent_id,
                        &request.part_id,
                        &request.component_id,
                        &record.configuration,
                    );
                }
                None => log::warn!(
                    "sub-component '{}' missing from catalog response, request dropped",
                    request.component_id
                ),
            }
        }
        Ok(())
    }

    async fn resolve_material_properties(&self, material_ids: Vec<String>) -> Result<(), GatewayError> {
        let ids = dedup_ids(material_ids.iter().map(String::as_str));
        let records = self.catalog.materials(&ids).await?;
        let property_sets: Vec<MaterialPropertySet> = records
            .into_iter()
            .filter(|record| !record.properties.is_empty())
            .map(|record| MaterialPropertySet {
                id: record.id,
                properties: record.properties,
            })
            .collect();
        if !property_sets.is_empty() {
            self.kernel.borrow_mut().set_material_properties(&property_sets);
        }
        Ok(())
    }

    async fn resolve_external_meshes(&self, requests: Vec<ExternalMeshRequest>) -> Result<(), GatewayError> {
        // Meshes are resolved one by one; a failure abandons the remainder
        // of the batch, matching the all-or-nothing handling of the other
        // batch classes.
        for request in &requests {
            let mesh = self.catalog.mesh(&request.mesh_id, request.quality).await?;
            let manifest = self.catalog.mesh_manifest(&mesh.links.data).await?;
            for entry in &manifest.mesh_datas {
                let payload = self.catalog.fetch_blob(&entry.url).await?;
                self.kernel
                    .borrow_mut()
                    .add_external_mesh(&request.mesh_id, request.quality, &payload);
            }
        }
        Ok(())
    }
}

impl ResolutionSink for DependencyResolver {
    fn request_component(
        &self,
        conversation_id: ConversationId,
        configuration: ComponentConfiguration,
        parent_id: RuntimeComponentId,
    ) {
        self.queues.components.borrow_mut().push(ComponentRequest {
            conversation_id,
            configuration,
            parent_id,
        });
    }

    fn request_sub_component(&self, parent_id: RuntimeComponentId, part_id: &str, component_id: &str) {
        self.queues.sub_components.borrow_mut().push(SubComponentRequest {
            parent_id,
            part_id: part_id.to_string(),
            component_id: component_id.to_string(),
        });
    }

    fn request_material_properties(&self, material_ids: &[String]) {
        self.queues
            .material_properties
            .borrow_mut()
            .extend_from_slice(material_ids);
    }

    fn request_external_mesh(&self, mesh_id: &str, quality: u32) {
        self.queues.external_meshes.borrow_mut().push(ExternalMeshRequest {
            mesh_id: mesh_id.to_string(),
            quality,
        });
    }

    fn configuration_loading_error(&self, runtime_id: RuntimeComponentId, errors: &[String]) {
        log::error!("configuration loading failed for runtime component {runtime_id}: {errors:?}");
    }
}

/// Deduplicates ids case-insensitively, preserving first-appearance order
/// and original casing.
fn dedup_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for id in ids {
        if seen.insert(id.to_lowercase()) {
            deduped.push(id.to_string());
        }
    }
    deduped
}

/// Finds a component record by id, case-insensitively; catalog responses do
/// not always preserve the casing of the requested id.
fn find_component<'a>(records: &'a [ComponentRecord], component_id: &str) -> Option<&'a ComponentRecord> {
    let needle = component_id.to_lowercase();
    records.iter().find(|record| record.id.to_lowercase() == needle)
}

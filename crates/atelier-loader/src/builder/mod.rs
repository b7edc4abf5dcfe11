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

//! The scene-builder facade.
//!
//! [`SceneBuilder`] wires resolver, accumulator, and router together and runs
//! one complete pass: attach both sinks, clear the kernel, load the
//! configuration, construct its geometry, detach, and bundle the result with
//! derived per-material render properties and the plan components the meshes
//! belong to.
//!
//! The property derivation is the only place that interprets material
//! shading data; everything upstream passes records through untouched.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use atelier_core::catalog::{CatalogGateway, MaterialRecord};
use atelier_core::kernel::{ConfigurationKernel, KernelComponent, PlanObjectId, RuntimeComponentId};
use atelier_core::scene::{distinct_runtime_component_ids, SceneDescription};

use crate::accumulator::SceneAccumulator;
use crate::resolver::DependencyResolver;
use crate::router::CallbackRouter;

/// The kernel assigns id 1 to the first plan object of a cleared scene, and
/// every pass starts from a cleared scene.
const ROOT_PLAN_OBJECT: PlanObjectId = PlanObjectId(1);

/// A texture reference ready for upload: where to fetch it and the physical
/// extent it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureMap {
    /// Where to fetch the texture image.
    pub url: String,
    /// Physical width the texture covers, in millimeters. Zero means
    /// unspecified.
    pub mm_width: f32,
    /// Physical height the texture covers, in millimeters. Zero means
    /// unspecified.
    pub mm_height: f32,
}

/// Render-ready PBR properties derived from one material record, with every
/// absent shading value replaced by its default.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperties {
    /// Whether both faces of the geometry are shaded.
    pub double_sided: bool,
    /// Base color as linear RGB.
    pub base_color: [f32; 3],
    /// Diffuse texture, when the record carries one.
    pub diffuse_map: Option<TextureMap>,
    /// Whether the diffuse texture carries an alpha channel.
    pub diffuse_map_has_alpha: bool,
    /// Normal map, when the record carries one.
    pub normal_map: Option<TextureMap>,
    /// Occlusion/roughness/metallic map, when the record carries one.
    pub orm_map: Option<TextureMap>,
    /// Opacity, 0..1.
    pub alpha: f32,
    /// Roughness, 0..1.
    pub roughness: f32,
    /// Metallic factor after the version-1 remapping.
    pub metallic: f32,
    /// Reflectivity recovered from the version-1 metallic slot.
    pub reflectivity: f32,
    /// Light transmission factor, 0..1.
    pub transmission: f32,
    /// Index of refraction offset used with transmission.
    pub transmission_ior: f32,
}

/// A resolved material record paired with its derived render properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAppearance {
    /// The catalog record the properties were derived from.
    pub record: MaterialRecord,
    /// The derived render properties.
    pub properties: MaterialProperties,
}

/// One plan component referenced by the accumulated meshes, with the global
/// transform the presentation layer places its geometry by.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanComponent {
    /// Runtime id of the component instance.
    pub id: RuntimeComponentId,
    /// The kernel's component record.
    pub component: KernelComponent,
}

/// Everything one pass produces: the accumulated scene, derived material
/// properties, and the plan components the meshes reference.
#[derive(Debug, Clone, Default)]
pub struct SceneBundle {
    /// The accumulated scene description.
    pub scene: SceneDescription,
    /// One appearance per resolved material record, in record order.
    pub materials: Vec<MaterialAppearance>,
    /// The plan components referenced by the meshes, in first-appearance
    /// order. Runtime ids the kernel no longer knows are skipped.
    pub plan_components: Vec<PlanComponent>,
}

/// Orchestrates one full load-and-construct pass over the kernel.
pub struct SceneBuilder {
    kernel: Rc<RefCell<dyn ConfigurationKernel>>,
    router: Rc<CallbackRouter>,
    resolver: Rc<DependencyResolver>,
    accumulator: Rc<SceneAccumulator>,
}

impl SceneBuilder {
    /// Creates a builder with its own router, resolver, and accumulator over
    /// the given kernel and catalog.
    ///
    /// The kernel must be registered against [`SceneBuilder::router`] as its
    /// event sink before the first pass; the builder cannot do that itself
    /// because kernel construction is owned by the embedder.
    pub fn new(kernel: Rc<RefCell<dyn ConfigurationKernel>>, catalog: Rc<dyn CatalogGateway>) -> Self {
        let router = Rc::new(CallbackRouter::new());
        let resolver = Rc::new(DependencyResolver::new(kernel.clone(), catalog.clone()));
        let accumulator = Rc::new(SceneAccumulator::new(kernel.clone(), catalog));
        Self {
            kernel,
            router,
            resolver,
            accumulator,
        }
    }

    /// The event sink the kernel must be registered against.
    pub fn router(&self) -> Rc<CallbackRouter> {
        self.router.clone()
    }

    /// Runs one full pass for a configuration identifier and returns the
    /// finished bundle.
    ///
    /// Both sinks are attached only for the duration of the pass; events the
    /// kernel emits outside a pass are dropped by the router. The kernel's
    /// scene is cleared first, so each pass builds plan object 1 from
    /// scratch.
    pub async fn construct_scene(&self, configuration_id: &str) -> Result<SceneBundle> {
        self.router.attach_resolution(self.resolver.clone());
        self.router.attach_construction(self.accumulator.clone());
        self.kernel.borrow_mut().clear_all();
        let outcome = self.run_pass(configuration_id).await;
        self.router.detach_resolution();
        self.router.detach_construction();
        let scene = outcome?;
        log_scene(&scene);

        let materials = scene
            .materials
            .iter()
            .map(|record| MaterialAppearance {
                record: record.clone(),
                properties: derive_material_properties(record),
            })
            .collect();
        let plan_components = self.plan_components(&scene);
        Ok(SceneBundle {
            scene,
            materials,
            plan_components,
        })
    }

    async fn run_pass(&self, configuration_id: &str) -> Result<SceneDescription> {
        self.resolver.load(configuration_id).await?;
        self.accumulator.construct(ROOT_PLAN_OBJECT).await
    }

    fn plan_components(&self, scene: &SceneDescription) -> Vec<PlanComponent> {
        let kernel = self.kernel.borrow();
        distinct_runtime_component_ids(&scene.meshes)
            .into_iter()
            .filter_map(|id| match kernel.component(id) {
                Some(component) => Some(PlanComponent { id, component }),
                None => {
                    log::warn!("plan component {id} unknown to the kernel, skipped");
                    None
                }
            })
            .collect()
    }
}

/// Derives render-ready properties from one material record.
///
/// Texture classification follows the record's channel-mapping tag: `RGB`
/// and `RGBA` feed the diffuse slot (the latter flagging an alpha channel),
/// `XYZ` the normal slot, `ORM` the occlusion/roughness/metallic slot, and
/// anything else falls back to diffuse.
pub fn derive_material_properties(record: &MaterialRecord) -> MaterialProperties {
    let shading = record.shading.unwrap_or_default();

    let mut diffuse_map = None;
    let mut diffuse_map_has_alpha = false;
    let mut normal_map = None;
    let mut orm_map = None;
    if let Some(textures) = &record.texture_objects {
        for texture in textures {
            let map = TextureMap {
                url: texture.url.clone(),
                mm_width: texture.mm_width,
                mm_height: texture.mm_height,
            };
            match texture.mapping.as_deref().map(str::to_uppercase).as_deref() {
                Some("RGB") => diffuse_map = Some(map),
                Some("RGBA") => {
                    diffuse_map = Some(map);
                    diffuse_map_has_alpha = true;
                }
                Some("XYZ") => normal_map = Some(map),
                Some("ORM") => orm_map = Some(map),
                _ => diffuse_map = Some(map),
            }
        }
    }

    // Version-1 records encode reflectivity in the metallic slot: only an
    // exact 1 means a truly metallic surface, everything else shades as a
    // half-metal with the slot value as reflectivity.
    let (metallic, reflectivity) = match shading.metallic {
        Some(value) => (if value == 1.0 { 1.0 } else { 0.5 }, value),
        None => (0.0, 0.5),
    };

    MaterialProperties {
        double_sided: shading.double_sided.unwrap_or(true),
        base_color: shading
            .basecolor
            .map(|color| [color.r, color.g, color.b])
            .unwrap_or([0.7, 0.7, 0.7]),
        diffuse_map,
        diffuse_map_has_alpha,
        normal_map,
        orm_map,
        alpha: shading.alpha.unwrap_or(1.0),
        roughness: shading.roughness.unwrap_or(0.0),
        metallic,
        reflectivity,
        transmission: shading.transmission.unwrap_or(0.0),
        transmission_ior: shading.transmission_ior.unwrap_or(0.0),
    }
}

fn log_scene(scene: &SceneDescription) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("geometry:");
    for mesh in &scene.meshes {
        let name = match &mesh.identity {
            Some(key) => format!("{} {}", key.mesh_id, key.geometry_id),
            None => "baked".to_string(),
        };
        log::debug!(
            "  {} {name}{} v: {} i: {}",
            mesh.runtime_component_id,
            if mesh.environment_geometry { " environment" } else { "" },
            mesh.vertices.len(),
            mesh.indices.len()
        );
    }
    log::debug!("materials:");
    for material in &scene.materials {
        let color = material
            .shading
            .and_then(|shading| shading.basecolor)
            .map(|color| format!("RGB: {}, {}, {}", color.r, color.g, color.b))
            .unwrap_or_default();
        log::debug!(
            "  {} {color} textures: {}",
            material.id,
            material.texture_objects.as_ref().map_or(0, Vec::len)
        );
    }
}

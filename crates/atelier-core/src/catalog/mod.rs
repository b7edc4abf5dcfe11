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

//! The asynchronous catalog gateway contract.
//!
//! The remote data store is an external REST service addressed by opaque
//! string identifiers. This module defines the trait the loader fetches
//! through and the typed records that come back; the concrete HTTP client
//! lives in `atelier-gateway`, and in-memory fakes implement the same trait
//! for tests. Untyped JSON never crosses this boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Connection settings for the catalog service, applied as fixed query
/// parameters on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
    /// API key identifying the calling application.
    pub api_key: String,
    /// Language for localized catalog content.
    pub language: String,
    /// Access token; the anonymous token grants read access to public
    /// catalog content.
    pub token: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://catalog.atelier.example/api/v2".to_string(),
            api_key: "atelier_portal".to_string(),
            language: "en".to_string(),
            token: "anonym".to_string(),
        }
    }
}

/// A component definition record from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Catalog id of the component.
    pub id: String,
    /// The component definition, as the JSON source string the kernel
    /// evaluates.
    pub configuration: String,
}

/// An RGB color inside a material's shading block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadingColor {
    /// Red channel, 0..1.
    pub r: f32,
    /// Green channel, 0..1.
    pub g: f32,
    /// Blue channel, 0..1.
    pub b: f32,
}

/// The shading block of a material record. Every field is optional; absent
/// values fall back to defaults at derivation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialShading {
    /// Base color of the material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basecolor: Option<ShadingColor>,
    /// Opacity, 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    /// Roughness, 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    /// Metallic factor. Version-1 records encode reflectivity here; see the
    /// derivation in the loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic: Option<f32>,
    /// Whether both faces of the geometry are shaded.
    #[serde(default, rename = "doubleSided", skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<bool>,
    /// Light transmission factor, 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<f32>,
    /// Index of refraction offset used with transmission.
    #[serde(default, rename = "transmissionIOR", skip_serializing_if = "Option::is_none")]
    pub transmission_ior: Option<f32>,
}

/// A texture reference inside a material record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureObject {
    /// Where to fetch the texture image.
    pub url: String,
    /// Channel mapping tag (`RGB`, `RGBA`, `XYZ`, `ORM`); absent means
    /// plain diffuse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
    /// Physical width the texture covers, in millimeters. Zero means
    /// unspecified.
    #[serde(default, rename = "mmWidth")]
    pub mm_width: f32,
    /// Physical height the texture covers, in millimeters. Zero means
    /// unspecified.
    #[serde(default, rename = "mmHeight")]
    pub mm_height: f32,
}

/// A material record from the catalog, optionally enriched with a resolved
/// key/value property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Catalog id of the material.
    pub id: String,
    /// Resolved key/value properties. Materials the catalog does not know
    /// simply never get one.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
    /// Shading parameters, when authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<MaterialShading>,
    /// Texture references, when authored.
    #[serde(default, rename = "textureObjects", skip_serializing_if = "Option::is_none")]
    pub texture_objects: Option<Vec<TextureObject>>,
}

/// Link block of a mesh descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLinks {
    /// Path of the mesh's data manifest, relative to the API base.
    pub data: String,
}

/// A mesh descriptor record: where to find the binary payloads of an
/// externally authored mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Links to the mesh's data.
    pub links: MeshLinks,
}

/// One entry of a mesh-data manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshDataEntry {
    /// Absolute URL of the binary geometry payload.
    pub url: String,
}

/// The data manifest of a mesh: the list of binary payloads that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshDataManifest {
    /// The payload entries, in the order the kernel should receive them.
    #[serde(default, rename = "meshDatas")]
    pub mesh_datas: Vec<MeshDataEntry>,
}

/// The asynchronous catalog gateway the loader fetches dependency data
/// through.
///
/// Batch endpoints (`components`, `materials`) take an id array and return
/// only the records the service knows; callers match results back to
/// requests and treat holes as unresolved. Implementations translate
/// transport, HTTP-status, and decode failures into [`GatewayError`].
///
/// The loader is single-threaded, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait CatalogGateway {
    /// Fetches the definition source of a full configuration.
    async fn configuration_definition(&self, configuration_id: &str) -> Result<String, GatewayError>;

    /// Fetches the definition source of a catalog item.
    async fn item_definition(&self, item_id: &str) -> Result<String, GatewayError>;

    /// Batch-fetches component records by id.
    async fn components(&self, ids: &[String]) -> Result<Vec<ComponentRecord>, GatewayError>;

    /// Batch-fetches material records by id, with textures embedded.
    async fn materials(&self, ids: &[String]) -> Result<Vec<MaterialRecord>, GatewayError>;

    /// Fetches the descriptor of an externally authored mesh at a target
    /// quality.
    async fn mesh(&self, mesh_id: &str, quality: u32) -> Result<MeshRecord, GatewayError>;

    /// Fetches a mesh's data manifest by its API-relative path.
    async fn mesh_manifest(&self, path: &str) -> Result<MeshDataManifest, GatewayError>;

    /// Fetches a binary payload from an absolute URL.
    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>, GatewayError>;
}

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

//! The REST implementation of [`CatalogGateway`].
//!
//! Every request carries the fixed `apiKey`/`language`/`token` query
//! parameters from [`GatewayConfig`]; batch endpoints encode their id array
//! as repeated `ids[]` parameters. Responses are decoded into the typed
//! envelopes of [`crate::schema`] and unwrapped before they leave this crate.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use atelier_core::catalog::{
    CatalogGateway, ComponentRecord, GatewayConfig, MaterialRecord, MeshDataManifest, MeshRecord,
};
use atelier_core::error::GatewayError;

use crate::schema::{ComponentsEnvelope, ConfigurationEnvelope, ItemEnvelope, MaterialsEnvelope, MeshEnvelope};

/// Catalog-service client backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct RestCatalog {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl RestCatalog {
    /// Creates a client with a fresh connection pool.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a client reusing an existing connection pool.
    pub fn with_client(http: reqwest::Client, config: GatewayConfig) -> Self {
        Self { http, config }
    }

    /// Builds `{base}/{collection}/{id}`, tolerating ids that already start
    /// with a slash (the service hands such paths out in link blocks).
    fn resource_url(&self, collection: &str, id: &str) -> String {
        let separator = if id.starts_with('/') { "" } else { "/" };
        format!("{}/{}{}{}", self.config.base_url, collection, separator, id)
    }

    /// Builds `{base}/{path}` for API-relative paths.
    fn api_url(&self, path: &str) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{}{}{}", self.config.base_url, separator, path)
    }

    fn base_query(&self) -> [(&'static str, &str); 3] {
        [
            ("apiKey", self.config.api_key.as_str()),
            ("language", self.config.language.as_str()),
            ("token", self.config.token.as_str()),
        ]
    }

    async fn get_json<T>(&self, url: &str, extra: &[(&str, String)]) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        log::trace!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(&self.base_query())
            .query(extra)
            .send()
            .await
            .map_err(|err| GatewayError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|err| GatewayError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    fn ids_query(ids: &[String]) -> Vec<(&'static str, String)> {
        ids.iter().map(|id| ("ids[]", id.clone())).collect()
    }
}

#[async_trait(?Send)]
impl CatalogGateway for RestCatalog {
    async fn configuration_definition(&self, configuration_id: &str) -> Result<String, GatewayError> {
        let url = self.resource_url("configurations", configuration_id);
        let envelope: ConfigurationEnvelope = self.get_json(&url, &[]).await?;
        Ok(envelope.configuration.configuration)
    }

    async fn item_definition(&self, item_id: &str) -> Result<String, GatewayError> {
        let url = self.resource_url("items", item_id);
        let envelope: ItemEnvelope = self.get_json(&url, &[]).await?;
        Ok(envelope.item.configuration)
    }

    async fn components(&self, ids: &[String]) -> Result<Vec<ComponentRecord>, GatewayError> {
        let url = self.api_url("components");
        let envelope: ComponentsEnvelope = self.get_json(&url, &Self::ids_query(ids)).await?;
        Ok(envelope.components)
    }

    async fn materials(&self, ids: &[String]) -> Result<Vec<MaterialRecord>, GatewayError> {
        let url = self.api_url("materials");
        let mut query = Self::ids_query(ids);
        query.push(("embedTextures", "true".to_string()));
        let envelope: MaterialsEnvelope = self.get_json(&url, &query).await?;
        Ok(envelope.materials)
    }

    async fn mesh(&self, mesh_id: &str, quality: u32) -> Result<MeshRecord, GatewayError> {
        let url = self.resource_url("meshes", mesh_id);
        let query = [
            ("format", "crt".to_string()),
            ("targetQuality", quality.to_string()),
        ];
        let envelope: MeshEnvelope = self.get_json(&url, &query).await?;
        Ok(envelope.mesh)
    }

    async fn mesh_manifest(&self, path: &str) -> Result<MeshDataManifest, GatewayError> {
        let url = self.api_url(path);
        self.get_json(&url, &[]).await
    }

    async fn fetch_blob(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        log::trace!("GET {url} (binary)");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| GatewayError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| GatewayError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

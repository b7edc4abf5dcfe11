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

//! Response envelopes of the catalog REST API.
//!
//! The service wraps every resource in a top-level object keyed by resource
//! kind; these envelopes exist only to peel that wrapper off. The payload
//! records themselves are the shared types from `atelier-core`.

use atelier_core::catalog::{ComponentRecord, MaterialRecord, MeshRecord};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigurationEnvelope {
    pub configuration: ConfigurationBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigurationBody {
    /// The definition source the kernel evaluates.
    pub configuration: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemEnvelope {
    pub item: ItemBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemBody {
    pub configuration: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComponentsEnvelope {
    /// Absent when the service knows none of the requested ids.
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaterialsEnvelope {
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeshEnvelope {
    pub mesh: MeshRecord,
}

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

//! The synchronous call surface of the native configuration kernel.
//!
//! The kernel is an external collaborator: it owns the product-configuration
//! domain model and geometry construction. This module defines the trait the
//! loader drives it through, plus the record types that cross that boundary.
//! A concrete implementation will typically wrap an FFI module; tests use
//! scripted fakes.
//!
//! Every method is synchronous and may re-enter the loader through the
//! callback surface (see [`crate::event`]) before it returns.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

use crate::math::{Mat4, Vec3};

/// Correlates an outstanding component request with the top-level kernel call
/// that eventually consumes its result.
///
/// One id is minted per top-level `load`; ids strictly increase and are never
/// reused for the lifetime of the counter that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a component instance inside the kernel's runtime scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeComponentId(pub i64);

impl fmt::Display for RuntimeComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a plan object (a constructed root) inside the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanObjectId(pub i64);

impl fmt::Display for PlanObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints strictly increasing [`ConversationId`]s.
///
/// Explicit state owned by whoever resolves dependencies, rather than a
/// process-wide global: each resolver instance gets its own counter, which
/// keeps tests isolated from one another.
#[derive(Debug, Default)]
pub struct ConversationCounter(Cell<i64>);

impl ConversationCounter {
    /// Creates a counter starting at zero; the first minted id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next id. Never returns the same id twice.
    pub fn next(&self) -> ConversationId {
        let next = self.0.get() + 1;
        self.0.set(next);
        ConversationId(next)
    }
}

/// The slice of a kernel configuration this layer reads: the id of the
/// component the configuration instantiates.
///
/// The kernel's full configuration tree (children, docking, parameters) never
/// crosses this boundary; the loader only needs the component id to fetch the
/// definition, and hands the configuration back to the kernel untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentConfiguration {
    /// Catalog id of the component this configuration instantiates.
    pub component_id: String,
}

impl ComponentConfiguration {
    /// Creates a configuration referencing the given component id.
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
        }
    }
}

/// A component record as returned by kernel lookups, carrying the global
/// transform the presentation layer needs to place its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelComponent {
    /// Runtime id of the component instance.
    pub id: RuntimeComponentId,
    /// Catalog id of the component definition.
    pub component_id: String,
    /// World-space transform of the component instance.
    pub global_transform: Mat4,
}

/// One material's resolved property map, fed back to the kernel in bulk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialPropertySet {
    /// Catalog id of the material.
    pub id: String,
    /// Resolved key/value properties. Never empty when fed to the kernel.
    pub properties: HashMap<String, String>,
}

/// The fixed call surface of the native configuration kernel.
///
/// All methods are synchronous from the caller's point of view; the kernel
/// never suspends. Feeding data in (`load_component`,
/// `loaded_sub_component`, …) may synchronously trigger further callback
/// events through the router before the call returns, so callers must not
/// hold loader state borrows across any of these calls.
pub trait ConfigurationKernel {
    /// Submits a top-level configuration definition for evaluation.
    fn load_configuration(
        &mut self,
        conversation_id: ConversationId,
        definition: &str,
        bounds: Vec3,
    );

    /// Feeds a resolved component definition back for a pending request.
    fn load_component(
        &mut self,
        conversation_id: ConversationId,
        definition: &str,
        configuration: &ComponentConfiguration,
        parent_id: RuntimeComponentId,
    );

    /// Feeds a resolved sub-component definition back. Carries no
    /// conversation correlation.
    fn loaded_sub_component(
        &mut self,
        parent_id: RuntimeComponentId,
        part_id: &str,
        component_id: &str,
        definition: &str,
    );

    /// Feeds resolved material property maps back in one bulk call.
    fn set_material_properties(&mut self, materials: &[MaterialPropertySet]);

    /// Feeds one binary payload of an externally authored mesh back, tagged
    /// by the `(mesh_id, quality)` pair of the request it answers.
    fn add_external_mesh(&mut self, mesh_id: &str, quality: u32, data: &[u8]);

    /// Triggers geometry construction for a plan object. Synchronously emits
    /// a burst of construction events through the callback surface.
    fn request_construction(&mut self, root_id: PlanObjectId);

    /// Looks up a component instance by runtime id.
    fn component(&self, runtime_id: RuntimeComponentId) -> Option<KernelComponent>;

    /// Resets the kernel's scene to an empty state.
    fn clear_all(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_counter_is_strictly_increasing() {
        let counter = ConversationCounter::new();
        let a = counter.next();
        let b = counter.next();
        let c = counter.next();
        assert_eq!(a, ConversationId(1));
        assert_eq!(b, ConversationId(2));
        assert_eq!(c, ConversationId(3));
    }

    #[test]
    fn counters_are_independent() {
        let first = ConversationCounter::new();
        let second = ConversationCounter::new();
        first.next();
        first.next();
        assert_eq!(second.next(), ConversationId(1));
    }
}

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

//! Minimal math types for the scene data model.
//!
//! The loader performs no geometric computation of its own; these types exist
//! to carry bounds and transforms between the kernel, the catalog, and the
//! consumer unchanged. Anything heavier (projection, decomposition, quaternion
//! math) belongs to the rendering layer, not here.

use serde::{Deserialize, Serialize};

/// A 3-dimensional vector with `f32` components.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vec3 {
    /// The x component of the vector.
    pub x: f32,
    /// The y component of the vector.
    pub y: f32,
    /// The z component of the vector.
    pub z: f32,
}

impl Vec3 {
    /// A vector with all components set to `0.0`.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new `Vec3` with the specified components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A 4x4 transform carried as 16 floats in the element order the kernel
/// emits it.
///
/// The loader treats transforms as opaque passthrough data: it never
/// multiplies, inverts, or re-bases them. Consumers that need a specific
/// convention (row- vs column-major) transpose on their side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Mat4 {
    /// The 16 matrix elements, in kernel emission order.
    pub m: [f32; 16],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Creates a matrix from 16 elements in kernel emission order.
    #[inline]
    pub const fn from_array(m: [f32; 16]) -> Self {
        Self { m }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A 2x3 affine UV transform carried as 6 floats, as emitted by the kernel
/// alongside named meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct UvTransform {
    /// The 6 affine coefficients, in kernel emission order.
    pub m: [f32; 6],
}

impl UvTransform {
    /// The identity UV transform.
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Creates a UV transform from 6 affine coefficients.
    #[inline]
    pub const fn from_array(m: [f32; 6]) -> Self {
        Self { m }
    }
}

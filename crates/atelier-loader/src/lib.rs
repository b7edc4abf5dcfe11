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

//! # Atelier Loader
//!
//! The active half of the loader architecture: the dependency resolver that
//! drains the kernel's data requests to a fixed point, the scene accumulator
//! that folds construction events into a renderable scene description, the
//! callback router that connects both to the kernel's event surface, and the
//! scene builder facade that runs one full load-and-construct pass.
//!
//! Everything here runs on a single logical thread. Kernel calls are
//! synchronous and may re-enter the router while a feedback call is still on
//! the stack; the only suspension points are the awaited catalog fetches.

#![warn(missing_docs)]

pub mod accumulator;
pub mod builder;
pub mod resolver;
pub mod router;

pub use accumulator::SceneAccumulator;
pub use builder::{SceneBuilder, SceneBundle};
pub use resolver::DependencyResolver;
pub use router::CallbackRouter;

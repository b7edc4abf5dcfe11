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

//! Error types for the catalog gateway boundary.

use std::fmt;

/// A failure while talking to the catalog service.
///
/// The loader's batch handlers collapse every variant to a logged message and
/// a dropped batch; the variants exist so those messages say what actually
/// went wrong.
#[derive(Debug)]
pub enum GatewayError {
    /// The request never produced an HTTP response (DNS, connect, timeout,
    /// protocol error).
    Transport {
        /// The URL that was being fetched.
        url: String,
        /// Description of the underlying transport failure.
        message: String,
    },
    /// The service answered with a non-success HTTP status.
    Status {
        /// The URL that was fetched.
        url: String,
        /// The HTTP status code.
        code: u16,
    },
    /// The response body did not match the expected schema.
    Decode {
        /// The URL that was fetched.
        url: String,
        /// Description of the schema mismatch.
        message: String,
    },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport { url, message } => {
                write!(f, "transport failure fetching '{url}': {message}")
            }
            GatewayError::Status { url, code } => {
                write!(f, "catalog answered {code} for '{url}'")
            }
            GatewayError::Decode { url, message } => {
                write!(f, "malformed catalog response from '{url}': {message}")
            }
        }
    }
}

impl std::error::Error for GatewayError {}

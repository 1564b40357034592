// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parse result.

use crate::query_option::CustomQueryOption;
use crate::query_option::QueryOptions;
use crate::query_option::SystemQueryOptionKind;
use crate::resource::UriResource;
use odata_edm::EdmEntityType;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What the request addresses as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriInfoKind {
    /// Resource path starting at the entity container.
    Resource,
    Metadata,
    /// Service document (empty path).
    Service,
    Batch,
    Crossjoin,
    All,
    /// `$entity?$id=...`.
    EntityId,
}

/// Fully resolved request URI. Immutable once returned by the parser.
#[derive(Debug, Clone)]
pub struct UriInfo {
    pub kind: UriInfoKind,
    pub resources: Vec<UriResource>,
    /// Cast of `$entity/Namespace.Type` or `$all/Namespace.Type`.
    pub entity_type_cast: Option<Arc<EdmEntityType>>,
    pub crossjoin_entity_sets: Vec<String>,
    /// Fragment of a `$metadata` request.
    pub fragment: Option<String>,
    pub options: QueryOptions,
    pub custom_options: Vec<CustomQueryOption>,
    pub aliases: BTreeMap<String, String>,
}

impl UriInfo {
    pub(crate) fn new(kind: UriInfoKind) -> Self {
        Self {
            kind,
            resources: Vec::new(),
            entity_type_cast: None,
            crossjoin_entity_sets: Vec::new(),
            fragment: None,
            options: QueryOptions::default(),
            custom_options: Vec::new(),
            aliases: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> UriInfoKind {
        self.kind
    }

    #[must_use]
    pub fn resources(&self) -> &[UriResource] {
        &self.resources
    }

    #[must_use]
    pub fn last_resource(&self) -> Option<&UriResource> {
        self.resources.last()
    }

    /// Text of a system query option as written in the request.
    #[must_use]
    pub fn system_query_option(&self, kind: SystemQueryOptionKind) -> Option<&str> {
        self.options.text(kind)
    }

    #[must_use]
    pub fn custom_query_options(&self) -> &[CustomQueryOption] {
        &self.custom_options
    }

    /// Value of a parameter alias, `name` including the `@`.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }
}

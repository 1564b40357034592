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

use crate::names::FullQualifiedName;
use crate::names::SimpleIdentifier;
use std::sync::Arc;

/// Navigation property binding: `path` of a navigation property and the
/// entity set or singleton it leads to.
#[derive(Debug, Clone)]
pub struct EdmNavigationPropertyBinding {
    pub path: String,
    pub target: String,
}

/// Entity set of a container.
#[derive(Debug)]
pub struct EdmEntitySet {
    pub name: SimpleIdentifier,
    pub container: FullQualifiedName,
    pub entity_type: FullQualifiedName,
    pub navigation_bindings: Vec<EdmNavigationPropertyBinding>,
    pub include_in_service_document: bool,
}

/// Singleton of a container.
#[derive(Debug)]
pub struct EdmSingleton {
    pub name: SimpleIdentifier,
    pub container: FullQualifiedName,
    pub entity_type: FullQualifiedName,
    pub navigation_bindings: Vec<EdmNavigationPropertyBinding>,
}

#[derive(Debug)]
pub struct EdmActionImport {
    pub name: SimpleIdentifier,
    pub action: FullQualifiedName,
    pub entity_set: Option<String>,
}

#[derive(Debug)]
pub struct EdmFunctionImport {
    pub name: SimpleIdentifier,
    pub function: FullQualifiedName,
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
}

fn binding_target<'a>(bindings: &'a [EdmNavigationPropertyBinding], path: &str) -> Option<&'a str> {
    bindings
        .iter()
        .find(|b| b.path == path)
        .map(|b| b.target.as_str())
}

impl EdmEntitySet {
    /// Target of the navigation property binding for `path`.
    #[must_use]
    pub fn navigation_binding_target(&self, path: &str) -> Option<&str> {
        binding_target(&self.navigation_bindings, path)
    }
}

impl EdmSingleton {
    #[must_use]
    pub fn navigation_binding_target(&self, path: &str) -> Option<&str> {
        binding_target(&self.navigation_bindings, path)
    }
}

/// Resolved entity container.
#[derive(Debug)]
pub struct EdmEntityContainer {
    pub name: FullQualifiedName,
    pub entity_sets: Vec<Arc<EdmEntitySet>>,
    pub singletons: Vec<Arc<EdmSingleton>>,
    pub action_imports: Vec<Arc<EdmActionImport>>,
    pub function_imports: Vec<Arc<EdmFunctionImport>>,
}

impl EdmEntityContainer {
    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&Arc<EdmEntitySet>> {
        self.entity_sets.iter().find(|v| v.name.as_str() == name)
    }

    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<&Arc<EdmSingleton>> {
        self.singletons.iter().find(|v| v.name.as_str() == name)
    }

    #[must_use]
    pub fn action_import(&self, name: &str) -> Option<&Arc<EdmActionImport>> {
        self.action_imports.iter().find(|v| v.name.as_str() == name)
    }

    #[must_use]
    pub fn function_import(&self, name: &str) -> Option<&Arc<EdmFunctionImport>> {
        self.function_imports.iter().find(|v| v.name.as_str() == name)
    }
}

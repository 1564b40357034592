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

//! Schema provider interface.
//!
//! The directory never reads CSDL itself. It asks a provider for single
//! elements by (alias-resolved) name. A provider answers with
//! `Ok(Some(..))` when it knows the element, `Ok(None)` when it does not
//! and `Err(..)` only for real failures.

/// Provider over schemas held in memory.
pub mod in_memory;

use crate::csdl::CsdlAction;
use crate::csdl::CsdlAnnotations;
use crate::csdl::CsdlComplexType;
use crate::csdl::CsdlEntityContainer;
use crate::csdl::CsdlEntityType;
use crate::csdl::CsdlEnumType;
use crate::csdl::CsdlFunction;
use crate::csdl::CsdlSchema;
use crate::csdl::CsdlTerm;
use crate::csdl::CsdlTypeDefinition;
use crate::names::FullQualifiedName;
use crate::names::Namespace;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[doc(inline)]
pub use in_memory::InMemoryProvider;

/// Found, not found, or failed.
pub type ProviderResult<T> = Result<Option<T>, ProviderError>;

/// Failure reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "provider error: {}", self.message)
    }
}

impl StdError for ProviderError {}

/// Source of schema elements.
///
/// Names passed to the getters have their aliases already replaced by
/// real namespaces.
pub trait EdmProvider: Send + Sync {
    /// All schemas known to the provider.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn schemas(&self) -> Result<Vec<CsdlSchema>, ProviderError>;

    /// Alias to namespace pairs. Derived from [`EdmProvider::schemas`]
    /// unless overridden.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn aliases(&self) -> Result<Vec<(Namespace, Namespace)>, ProviderError> {
        Ok(self
            .schemas()?
            .into_iter()
            .filter_map(|schema| {
                schema
                    .alias
                    .map(|alias| (Namespace::from(alias), schema.namespace))
            })
            .collect())
    }

    /// # Errors
    ///
    /// Provider failure.
    fn schema(&self, namespace: &Namespace) -> ProviderResult<CsdlSchema> {
        Ok(self
            .schemas()?
            .into_iter()
            .find(|schema| schema.namespace == *namespace))
    }

    /// # Errors
    ///
    /// Provider failure.
    fn entity_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlEntityType>;

    /// # Errors
    ///
    /// Provider failure.
    fn complex_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlComplexType>;

    /// # Errors
    ///
    /// Provider failure.
    fn enum_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlEnumType>;

    /// # Errors
    ///
    /// Provider failure.
    fn type_definition(&self, name: &FullQualifiedName) -> ProviderResult<CsdlTypeDefinition>;

    /// # Errors
    ///
    /// Provider failure.
    fn term(&self, name: &FullQualifiedName) -> ProviderResult<CsdlTerm>;

    /// Entity container by name, or the default container for `None`.
    /// The answer carries the full qualified name of the container.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn entity_container(
        &self,
        name: Option<&FullQualifiedName>,
    ) -> ProviderResult<(FullQualifiedName, CsdlEntityContainer)>;

    /// External annotations targeting `target`.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn annotations_group(
        &self,
        target: &FullQualifiedName,
        qualifier: Option<&str>,
    ) -> ProviderResult<CsdlAnnotations>;

    /// Every action (bound or not) with this name.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn actions(&self, name: &FullQualifiedName) -> Result<Vec<CsdlAction>, ProviderError>;

    /// Every function overload (bound or not) with this name.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn functions(&self, name: &FullQualifiedName) -> Result<Vec<CsdlFunction>, ProviderError>;

    /// Types directly derived from `base`.
    ///
    /// # Errors
    ///
    /// Provider failure.
    fn derived_types(
        &self,
        _base: &FullQualifiedName,
    ) -> Result<Vec<FullQualifiedName>, ProviderError> {
        Ok(Vec::new())
    }
}

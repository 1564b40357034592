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

//! OData entity data model directory.
//!
//! [`Edm`] resolves schema elements on demand from an [`EdmProvider`],
//! rewrites aliases to namespaces and caches every element it
//! materializes for the lifetime of the directory.

/// Names of schema elements
pub mod names;

/// Provider-side schema description
pub mod csdl;

/// Schema provider interface
pub mod provider;

/// `Edm` primitive types and literals
pub mod primitive;

/// Resolved entity and complex types
pub mod structured;

/// Resolved enum types, type definitions, terms and annotations
pub mod types;

/// Resolved entity container
pub mod container;

/// Resolved actions and functions
pub mod operation;

/// Type directory
pub mod directory;

/// Errors of the type directory
pub mod error;

#[doc(inline)]
pub use container::EdmActionImport;
#[doc(inline)]
pub use container::EdmEntityContainer;
#[doc(inline)]
pub use container::EdmEntitySet;
#[doc(inline)]
pub use container::EdmFunctionImport;
#[doc(inline)]
pub use container::EdmSingleton;
#[doc(inline)]
pub use directory::Edm;
#[doc(inline)]
pub use directory::EdmSchema;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use names::FullQualifiedName;
#[doc(inline)]
pub use names::Namespace;
#[doc(inline)]
pub use names::SimpleIdentifier;
#[doc(inline)]
pub use operation::EdmAction;
#[doc(inline)]
pub use operation::EdmFunction;
#[doc(inline)]
pub use operation::EdmOperation;
#[doc(inline)]
pub use operation::EdmParameter;
#[doc(inline)]
pub use operation::EdmReturnType;
#[doc(inline)]
pub use operation::OperationKey;
#[doc(inline)]
pub use primitive::EdmPrimitiveTypeKind;
#[doc(inline)]
pub use primitive::LiteralError;
#[doc(inline)]
pub use primitive::PrimitiveValue;
#[doc(inline)]
pub use provider::EdmProvider;
#[doc(inline)]
pub use provider::InMemoryProvider;
#[doc(inline)]
pub use provider::ProviderError;
#[doc(inline)]
pub use structured::EdmComplexType;
#[doc(inline)]
pub use structured::EdmEntityType;
#[doc(inline)]
pub use structured::EdmKeyProperty;
#[doc(inline)]
pub use structured::EdmNavigationProperty;
#[doc(inline)]
pub use structured::EdmProperty;
#[doc(inline)]
pub use structured::EdmStructuredType;
#[doc(inline)]
pub use structured::EdmTypeRef;
#[doc(inline)]
pub use types::EdmEnumType;
#[doc(inline)]
pub use types::EdmType;
#[doc(inline)]
pub use types::EdmTypeKind;

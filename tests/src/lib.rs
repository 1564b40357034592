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

//! Shared fixtures of the URI parser integration tests.

/// Technical service schema.
pub mod tecsvc;
/// Expectations in tests.
pub mod expect;

#[doc(inline)]
pub use expect::expect_semantic;
#[doc(inline)]
pub use expect::expect_syntax;
#[doc(inline)]
pub use expect::expect_validation;
#[doc(inline)]
pub use tecsvc::edm;
#[doc(inline)]
pub use tecsvc::parse;

/// Namespace of the technical service.
pub const NAMESPACE: &str = "olingo.odata.test1";
/// Alias of [`NAMESPACE`].
pub const ALIAS: &str = "Namespace1_Alias";

/// Result of an integration test.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;

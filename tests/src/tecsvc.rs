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

//! Technical service: entity sets, singletons and operations the URI
//! parser is exercised with.

use odata_edm::Edm;
use odata_edm::InMemoryProvider;
use odata_uri::Parser;
use odata_uri::ParserError;
use odata_uri::UriInfo;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const SCHEMA: &str = include_str!("../schemas/tecsvc.json");

fn init_tracing() {
    // Another test binary may have installed a subscriber already.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Directory over the technical service, shared by all tests of a
/// binary.
///
/// # Panics
///
/// If the schema fixture is not valid JSON.
pub fn edm() -> &'static Edm {
    static EDM: OnceLock<Edm> = OnceLock::new();
    EDM.get_or_init(|| {
        init_tracing();
        let schema = serde_json::from_str(SCHEMA).expect("invalid tecsvc schema");
        Edm::new(InMemoryProvider::new(vec![schema]))
    })
}

/// Parse `path` and `query` with the default configuration.
///
/// # Errors
///
/// Parser errors as is.
pub fn parse(path: &str, query: Option<&str>) -> Result<UriInfo, ParserError> {
    Parser::new(edm()).parse_uri(path, query, None)
}

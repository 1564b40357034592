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

//! Expected failures.

use crate::tecsvc::parse;
use http::Method;
use odata_uri::error::SemanticMessageKey;
use odata_uri::error::SyntaxMessageKey;
use odata_uri::error::ValidationMessageKey;
use odata_uri::ParserError;
use odata_uri::UriValidator;

/// Parse must fail with a syntax error of `key`.
///
/// # Panics
///
/// If parsing succeeds or fails differently.
pub fn expect_syntax(path: &str, query: Option<&str>, key: SyntaxMessageKey) {
    match parse(path, query) {
        Err(ParserError::Syntax(err)) => assert_eq!(err.key, key, "{path}?{query:?}: {err}"),
        Err(err) => panic!("{path}?{query:?}: expected {key}, got {err}"),
        Ok(info) => panic!("{path}?{query:?}: expected {key}, parsed {info:?}"),
    }
}

/// Parse must fail with a semantic error of `key`.
///
/// # Panics
///
/// If parsing succeeds or fails differently.
pub fn expect_semantic(path: &str, query: Option<&str>, key: SemanticMessageKey) {
    match parse(path, query) {
        Err(ParserError::Semantic(err)) => assert_eq!(err.key, key, "{path}?{query:?}: {err}"),
        Err(err) => panic!("{path}?{query:?}: expected {key}, got {err}"),
        Ok(info) => panic!("{path}?{query:?}: expected {key}, parsed {info:?}"),
    }
}

/// Parse must succeed and validation for `method` fail with `key`.
///
/// # Panics
///
/// If parsing fails or validation passes.
pub fn expect_validation(path: &str, query: Option<&str>, method: &Method, key: ValidationMessageKey) {
    let info = parse(path, query).unwrap_or_else(|err| panic!("{path}?{query:?}: {err}"));
    let err = UriValidator::new()
        .validate(&info, method)
        .expect_err(&format!("{method} {path}?{query:?} must be rejected"));
    assert_eq!(err.key, key, "{method} {path}?{query:?}: {err}");
}

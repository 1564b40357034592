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

use http::Method;
use http::StatusCode;
use odata_uri::error::ValidationMessageKey;
use odata_uri::UriValidator;
use odata_uri_tests::expect_validation;
use odata_uri_tests::parse;
use odata_uri_tests::TestResult;

fn validate(path: &str, query: Option<&str>, method: &Method) -> TestResult {
    let info = parse(path, query)?;
    UriValidator::new().validate(&info, method)?;
    Ok(())
}

// Check system query options allowed per resource kind.
#[test]
fn options_per_resource_test() -> TestResult {
    validate("ESAllPrim", Some("$filter=PropertyInt16 eq 1&$top=2&$orderby=PropertyString"), &Method::GET)?;
    validate("ESAllPrim/$count", Some("$filter=PropertyInt16 eq 1&$search=blue"), &Method::GET)?;
    validate("ESAllPrim(1)", Some("$select=PropertyString&$expand=NavPropertyETTwoPrimOne"), &Method::GET)?;
    validate("ESAllPrim(1)/PropertyString/$value", Some("$format=json"), &Method::GET)?;
    validate("$crossjoin(ESAllPrim,ESTwoPrim)", Some("$filter=ESAllPrim/PropertyInt16 eq 1"), &Method::GET)?;
    validate("$all", Some("$search=blue&$top=10"), &Method::GET)?;
    validate("$metadata", Some("$format=xml"), &Method::GET)?;
    validate("$entity", Some("$id=ESAllPrim(1)&$format=json"), &Method::GET)?;
    validate(
        "$entity/olingo.odata.test1.ETAllPrim",
        Some("$id=ESAllPrim(1)&$select=PropertyString"),
        &Method::GET,
    )?;

    let not_allowed = ValidationMessageKey::SystemQueryOptionNotAllowed;
    expect_validation("ESAllPrim(1)", Some("$filter=PropertyInt16 eq 1"), &Method::GET, not_allowed);
    expect_validation("ESAllPrim/$count", Some("$top=1"), &Method::GET, not_allowed);
    expect_validation("ESAllPrim", Some("$id=ESAllPrim(1)"), &Method::GET, not_allowed);
    expect_validation("ESAllPrim(1)/PropertyString", Some("$top=1"), &Method::GET, not_allowed);
    expect_validation("$metadata", Some("$top=1"), &Method::GET, not_allowed);
    expect_validation("", Some("$select=*"), &Method::GET, not_allowed);
    expect_validation("$entity", Some("$id=ESAllPrim(1)&$top=1"), &Method::GET, not_allowed);
    expect_validation(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='a')/CollPropertyString",
        Some("$expand=*"),
        &Method::GET,
        not_allowed,
    );
    Ok(())
}

// Check single and collection references.
#[test]
fn references_test() -> TestResult {
    validate("Orders(8)/CustomerForOrder/$ref", None, &Method::GET)?;
    validate("ESAllPrim(1)/NavPropertyETTwoPrimMany/$ref", Some("$top=1&$filter=PropertyInt16 eq 1"), &Method::GET)?;
    validate("ESAllPrim(1)/NavPropertyETTwoPrimMany/$ref", Some("$id=ESTwoPrim(3)"), &Method::DELETE)?;

    expect_validation(
        "Orders(8)/CustomerForOrder/$ref",
        Some("$filter=Name eq 'x'"),
        &Method::GET,
        ValidationMessageKey::SystemQueryOptionNotAllowed,
    );
    expect_validation(
        "ESAllPrim(1)/NavPropertyETTwoPrimMany/$ref",
        Some("$id=ESTwoPrim(3)"),
        &Method::GET,
        ValidationMessageKey::SystemQueryOptionNotAllowedForHttpMethod,
    );
    expect_validation(
        "ESAllPrim(1)/NavPropertyETTwoPrimMany/$ref",
        Some("$id=ESTwoPrim(3)&$top=1"),
        &Method::DELETE,
        ValidationMessageKey::SystemQueryOptionNotAllowedForHttpMethod,
    );
    Ok(())
}

// Check requests restricted to one method.
#[test]
fn method_pairing_test() -> TestResult {
    let unsupported = ValidationMessageKey::UnsupportedHttpMethod;
    validate("$batch", None, &Method::POST)?;
    expect_validation("$batch", None, &Method::GET, unsupported);
    expect_validation("$metadata", None, &Method::POST, unsupported);
    expect_validation("$entity", Some("$id=ESAllPrim(1)"), &Method::DELETE, unsupported);
    expect_validation("$all", None, &Method::PUT, unsupported);
    expect_validation("$crossjoin(ESAllPrim,ESTwoPrim)", None, &Method::POST, unsupported);

    validate("FICRTCollESTwoKeyNavParam(ParameterInt16=123)/$count", None, &Method::GET)?;
    expect_validation(
        "FICRTCollESTwoKeyNavParam(ParameterInt16=123)/$count",
        None,
        &Method::POST,
        unsupported,
    );
    expect_validation("ESAllPrim/$count", None, &Method::DELETE, unsupported);

    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        validate("ESAllPrim(1)", None, &method)?;
    }
    Ok(())
}

// Check property updates and deletes.
#[test]
fn property_methods_test() -> TestResult {
    let unsupported = ValidationMessageKey::UnsupportedHttpMethod;
    let coll = "ESTwoKeyNav(PropertyInt16=1,PropertyString='a')/CollPropertyString";
    validate(coll, None, &Method::PUT)?;
    expect_validation(coll, None, &Method::PATCH, unsupported);

    validate("ESAllPrim(1)/PropertyString", None, &Method::DELETE)?;
    validate("ESAllPrim(1)/PropertyString/$value", None, &Method::DELETE)?;
    expect_validation(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='a')/PropertyComp",
        None,
        &Method::DELETE,
        unsupported,
    );
    validate(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='a')/PropertyComp",
        None,
        &Method::PATCH,
    )?;
    Ok(())
}

// Check options sent with methods other than GET.
#[test]
fn options_with_other_methods_test() -> TestResult {
    let key = ValidationMessageKey::SystemQueryOptionNotAllowedForHttpMethod;
    expect_validation("ESAllPrim", Some("$top=1"), &Method::POST, key);
    expect_validation("ESAllPrim(1)", Some("$select=PropertyString"), &Method::PATCH, key);
    expect_validation("", Some("$format=json"), &Method::PUT, key);

    validate(
        "ESAllPrim/olingo.odata.test1.BAESAllPrimRTETAllPrim",
        Some("$select=PropertyString"),
        &Method::POST,
    )?;
    validate("AIRTString", Some("$format=json"), &Method::POST)?;
    Ok(())
}

// Check the HTTP status of validation failures.
#[test]
fn status_test() -> TestResult {
    let info = parse("ESAllPrim", None)?;
    let err = UriValidator::new()
        .validate(&info, &Method::HEAD)
        .err()
        .ok_or("HEAD must be rejected")?;
    assert_eq!(err.key, ValidationMessageKey::UnsupportedHttpMethod);
    assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(err.params, vec!["HEAD"]);

    let info = parse("ESAllPrim(1)", Some("$top=1"))?;
    let err = UriValidator::new()
        .validate(&info, &Method::GET)
        .err()
        .ok_or("$top on an entity must be rejected")?;
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "SYSTEM_QUERY_OPTION_NOT_ALLOWED: $top");
    Ok(())
}

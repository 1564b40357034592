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

use odata_edm::FullQualifiedName;
use odata_edm::Namespace;
use odata_uri_tests::edm;
use odata_uri_tests::TestResult;
use odata_uri_tests::ALIAS;
use odata_uri_tests::NAMESPACE;
use std::sync::Arc;
use std::thread;

fn fqn(namespace: &str, name: &str) -> Result<FullQualifiedName, Box<dyn std::error::Error>> {
    Ok(FullQualifiedName::from_parts(namespace, name)?)
}

// Check that alias and namespace resolve to the same cached element.
#[test]
fn alias_resolution_test() -> TestResult {
    let by_alias = edm().entity_type(&fqn(ALIAS, "ETAllPrim")?)?.ok_or("no type")?;
    let by_namespace = edm().entity_type(&fqn(NAMESPACE, "ETAllPrim")?)?.ok_or("no type")?;
    assert!(Arc::ptr_eq(&by_alias, &by_namespace));
    assert_eq!(by_alias.name.to_string(), "olingo.odata.test1.ETAllPrim");

    let enum_type = edm().enum_type(&fqn(ALIAS, "ENString")?)?.ok_or("no enum")?;
    assert_eq!(enum_type.name.namespace.to_string(), NAMESPACE);

    assert_eq!(
        edm().resolve_namespace(&ALIAS.parse::<Namespace>()?)?.to_string(),
        NAMESPACE
    );

    let function = edm()
        .unbound_function(&fqn(ALIAS, "UFCRTCollETTwoKeyNavParam")?, &["ParameterInt16"])?
        .ok_or("no function")?;
    assert!(function.is_composable());
    assert!(edm()
        .unbound_function(&fqn(ALIAS, "UFCRTCollETTwoKeyNavParam")?, &["Nope"])?
        .is_none());
    Ok(())
}

// Check bound operation lookup by binding type.
#[test]
fn bound_operation_test() -> TestResult {
    let two_key_nav = fqn(NAMESPACE, "ETTwoKeyNav")?;
    let action = edm().bound_action(&fqn(ALIAS, "BAESTwoKeyNavRTESTwoKeyNav")?, &two_key_nav, true)?;
    assert!(action.is_some());
    assert!(edm()
        .bound_action(&fqn(ALIAS, "BAESTwoKeyNavRTESTwoKeyNav")?, &two_key_nav, false)?
        .is_none());

    // Derived binding types find operations bound to the base.
    let derived = fqn(NAMESPACE, "ETBaseTwoKeyNav")?;
    let function = edm().bound_function::<&str>(
        &fqn(NAMESPACE, "BFCETTwoKeyNavRTETTwoKeyNav")?,
        &derived,
        false,
        &[],
    )?;
    assert!(function.is_some());
    Ok(())
}

// Check containers and derived types.
#[test]
fn container_and_derived_types_test() -> TestResult {
    let container = edm().entity_container(None)?.ok_or("no container")?;
    let entity_set = container.entity_set("ESTwoKeyNav").ok_or("no entity set")?;
    assert_eq!(entity_set.entity_type.to_string(), "olingo.odata.test1.ETTwoKeyNav");
    assert!(container.singleton("SI").is_some());
    assert!(container.function_import("FICRTCollESTwoKeyNavParam").is_some());
    assert!(container.action_import("AIRTString").is_some());

    let derived = edm().derived_types(&fqn(ALIAS, "ETTwoKeyNav")?)?;
    assert_eq!(derived, vec![fqn(NAMESPACE, "ETBaseTwoKeyNav")?]);

    let schema = edm().schema(&ALIAS.parse()?)?.ok_or("no schema")?;
    assert_eq!(schema.namespace.to_string(), NAMESPACE);
    assert!(schema.entity_types.len() > 10);
    Ok(())
}

// Check that the directory is shared across threads.
#[test]
fn concurrent_lookup_test() -> TestResult {
    let handles = (0..8)
        .map(|n| {
            thread::spawn(move || {
                let namespace = if n % 2 == 0 { ALIAS } else { NAMESPACE };
                let name = FullQualifiedName::from_parts(namespace, "ETTwoKeyNav").unwrap();
                edm().entity_type(&name).unwrap().unwrap()
            })
        })
        .collect::<Vec<_>>();
    let types = handles
        .into_iter()
        .map(|h| h.join().map_err(|_| "lookup thread panicked"))
        .collect::<Result<Vec<_>, _>>()?;
    assert!(types.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    Ok(())
}

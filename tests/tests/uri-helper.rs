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

use odata_edm::EdmEntityContainer;
use odata_edm::EdmEntitySet;
use odata_edm::FullQualifiedName;
use odata_edm::PrimitiveValue;
use odata_uri::error::DeserializerMessageKey;
use odata_uri::error::SemanticMessageKey;
use odata_uri::ContextUrl;
use odata_uri::EntityKey;
use odata_uri::HelperError;
use odata_uri::ParserError;
use odata_uri::Suffix;
use odata_uri::UriHelper;
use odata_uri_tests::edm;
use odata_uri_tests::parse;
use odata_uri_tests::TestResult;
use std::error::Error as _;
use std::sync::Arc;
use url::Url;

const ROOT: &str = "http://host/service/";

fn container() -> Result<Arc<EdmEntityContainer>, Box<dyn std::error::Error>> {
    Ok(edm().entity_container(None)?.ok_or("no entity container")?)
}

fn entity_set(name: &str) -> Result<Arc<EdmEntitySet>, Box<dyn std::error::Error>> {
    Ok(Arc::clone(
        container()?.entity_set(name).ok_or("no such entity set")?,
    ))
}

fn key(values: Vec<(&str, PrimitiveValue)>) -> EntityKey {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

// Check canonical URLs of single and composite keys.
#[test]
fn canonical_url_test() -> TestResult {
    let helper = UriHelper::new(edm());
    let url = helper.build_canonical_url(
        &*entity_set("ESAllPrim")?,
        &key(vec![("PropertyInt16", PrimitiveValue::Int16(1))]),
    )?;
    assert_eq!(url, "ESAllPrim(1)");

    let url = helper.build_canonical_url(
        &*entity_set("ESTwoKeyNav")?,
        &key(vec![
            ("PropertyString", PrimitiveValue::String("O'Neil b".into())),
            ("PropertyInt16", PrimitiveValue::Int16(-3)),
        ]),
    )?;
    assert_eq!(url, "ESTwoKeyNav(PropertyInt16=-3,PropertyString='O''Neil%20b')");

    let err = helper
        .build_canonical_url(
            &*entity_set("ESTwoKeyNav")?,
            &key(vec![("PropertyInt16", PrimitiveValue::Int16(1))]),
        )
        .err()
        .ok_or("missing key must be rejected")?;
    assert!(matches!(&err, HelperError::MissingKeyProperty(name) if name == "PropertyString"));
    assert_eq!(err.to_string(), "missing value for key property PropertyString");
    Ok(())
}

// Check that canonical URLs parse back to the same entity.
#[test]
fn entity_id_round_trip_test() -> TestResult {
    let helper = UriHelper::new(edm());
    let url = helper.build_canonical_url(
        &*entity_set("ESTwoKeyNav")?,
        &key(vec![
            ("PropertyInt16", PrimitiveValue::Int16(7)),
            ("PropertyString", PrimitiveValue::String("a b".into())),
        ]),
    )?;

    let relative = helper.parse_entity_id(&url, None)?;
    assert_eq!(relative.entity_set.name.as_str(), "ESTwoKeyNav");
    assert_eq!(relative.keys.len(), 2);
    assert_eq!(relative.keys[1].value.to_string(), "'a b'");

    let absolute = helper.parse_entity_id(&format!("{ROOT}{url}"), Some(ROOT))?;
    assert_eq!(absolute.entity_set.name.as_str(), "ESTwoKeyNav");
    assert_eq!(absolute.keys[0].value.to_string(), "7");

    let collection = helper.parse_entity_id("ESAllPrim", None)?;
    assert!(collection.keys.is_empty());
    Ok(())
}

// Check entity ids that do not address an entity set.
#[test]
fn invalid_entity_id_test() -> TestResult {
    let helper = UriHelper::new(edm());

    let err = helper
        .parse_entity_id("ESAllPrim(1)/NavPropertyETTwoPrimOne", None)
        .err()
        .ok_or("navigation must be rejected")?;
    assert_eq!(err.key, DeserializerMessageKey::InvalidEntityBindingLink);
    assert_eq!(err.params, vec!["ESAllPrim(1)/NavPropertyETTwoPrimOne"]);
    assert!(err.source().is_none());

    let err = helper
        .parse_entity_id("ESNope(1)", None)
        .err()
        .ok_or("unknown entity set must be rejected")?;
    assert_eq!(err.key, DeserializerMessageKey::InvalidEntityBindingLink);
    match &err.source {
        Some(ParserError::Semantic(source)) => {
            assert_eq!(source.key, SemanticMessageKey::ResourceNotFound);
        }
        other => return Err(format!("unexpected source {other:?}").into()),
    }
    assert!(err.source().is_some());

    assert!(helper.parse_entity_id("SI", None).is_err());
    assert!(helper.parse_entity_id("$metadata", None).is_err());
    Ok(())
}

// Check select lists of context URLs built from parsed options.
#[test]
fn context_url_select_list_test() -> TestResult {
    let customer = edm()
        .entity_type(&"olingo.odata.test1.Customer".parse::<FullQualifiedName>()?)?
        .ok_or("no Customer type")?;

    let info = parse(
        "Customers",
        Some("$select=Name,Address/City&$expand=Orders($select=Amount)"),
    )?;
    let list = UriHelper::build_context_url_select_list(
        customer.as_ref(),
        info.options.expand.as_deref(),
        info.options.select.as_deref(),
    );
    assert_eq!(list, "Name,Address/City,Orders(Amount)");

    let info = parse("Customers", Some("$expand=Orders"))?;
    let list = UriHelper::build_context_url_select_list(
        customer.as_ref(),
        info.options.expand.as_deref(),
        info.options.select.as_deref(),
    );
    assert_eq!(list, "Orders()");

    let info = parse("Customers", Some("$select=*&$expand=Orders/$ref"))?;
    let list = UriHelper::build_context_url_select_list(
        customer.as_ref(),
        info.options.expand.as_deref(),
        info.options.select.as_deref(),
    );
    assert!(list.is_empty());

    let two_key_nav = edm()
        .entity_type(&"Namespace1_Alias.ETTwoKeyNav".parse::<FullQualifiedName>()?)?
        .ok_or("no ETTwoKeyNav type")?;
    let info = parse(
        "ESTwoKeyNav",
        Some("$select=olingo.odata.test1.ETBaseTwoKeyNav/PropertyDate,olingo.odata.test1.*"),
    )?;
    let list = UriHelper::build_context_url_select_list(
        two_key_nav.as_ref(),
        None,
        info.options.select.as_deref(),
    );
    assert_eq!(
        list,
        "olingo.odata.test1.ETBaseTwoKeyNav/PropertyDate,olingo.odata.test1.*"
    );
    Ok(())
}

// Check context URLs assembled from model elements.
#[test]
fn context_url_test() -> TestResult {
    let root = Url::parse(ROOT)?;
    let customers = entity_set("Customers")?;
    let customer = edm()
        .entity_type(&"olingo.odata.test1.Customer".parse::<FullQualifiedName>()?)?
        .ok_or("no Customer type")?;
    let info = parse("Customers", Some("$select=Name"))?;
    let select = UriHelper::build_context_url_select_list(
        customer.as_ref(),
        None,
        info.options.select.as_deref(),
    );
    let url = ContextUrl::new()
        .service_root(root.clone())
        .entity_set(&customers)
        .select_list(select)
        .build()?;
    assert_eq!(url, "http://host/service/$metadata#Customers(Name)");

    let url = ContextUrl::new()
        .service_root(root.clone())
        .entity_set(&customers)
        .derived_entity(&"olingo.odata.test1.VipCustomer".parse()?)
        .suffix(Suffix::Entity)
        .build()?;
    assert_eq!(
        url,
        "http://host/service/$metadata#Customers/olingo.odata.test1.VipCustomer/$entity"
    );

    let container = container()?;
    let singleton = container.singleton("SINav").ok_or("no singleton")?;
    let url = ContextUrl::new()
        .service_root(root)
        .singleton(singleton)
        .navigation_or_property_path("PropertyComp")
        .build()?;
    assert_eq!(url, "http://host/service/$metadata#SINav/PropertyComp");

    let err = ContextUrl::new()
        .entity_set(&customers)
        .suffix(Suffix::Reference)
        .build()
        .err()
        .ok_or("reference with entity set must be rejected")?;
    assert!(matches!(err, HelperError::InvalidContextUrl(_)));
    Ok(())
}

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

use odata_edm::EdmOperation as _;
use odata_edm::EdmStructuredType as _;
use odata_edm::PrimitiveValue;
use odata_uri::error::SemanticMessageKey;
use odata_uri::error::SyntaxMessageKey;
use odata_uri::resource::KeyValue;
use odata_uri::resource::ParameterValue;
use odata_uri::ParserError;
use odata_uri::UriInfoKind;
use odata_uri::UriResource;
use odata_uri::UriResourceKind;
use odata_uri_tests::expect_semantic;
use odata_uri_tests::expect_syntax;
use odata_uri_tests::parse;
use odata_uri_tests::TestResult;

fn kinds(path: &str) -> Result<Vec<UriResourceKind>, ParserError> {
    Ok(parse(path, None)?
        .resources
        .iter()
        .map(UriResource::kind)
        .collect())
}

// Check requests without resource path.
#[test]
fn service_and_metadata_test() -> TestResult {
    assert_eq!(parse("", None)?.kind, UriInfoKind::Service);
    assert_eq!(parse("/", None)?.kind, UriInfoKind::Service);
    assert_eq!(parse("$metadata", None)?.kind, UriInfoKind::Metadata);
    assert_eq!(parse("$batch", None)?.kind, UriInfoKind::Batch);
    assert_eq!(parse("$all", None)?.kind, UriInfoKind::All);

    let info = odata_uri::Parser::new(odata_uri_tests::edm()).parse_uri(
        "$metadata",
        None,
        Some("ETAllPrim"),
    )?;
    assert_eq!(info.fragment.as_deref(), Some("ETAllPrim"));

    expect_syntax("$metadata/ESAllPrim", None, SyntaxMessageKey::MustBeLastSegment);
    expect_syntax("$batch/$metadata", None, SyntaxMessageKey::MustBeLastSegment);
    expect_syntax("$unknown", None, SyntaxMessageKey::Syntax);
    Ok(())
}

// Check `$entity` and `$all` with and without a type cast.
#[test]
fn entity_id_and_all_test() -> TestResult {
    let info = parse("$entity", Some("$id=ESAllPrim(1)"))?;
    assert_eq!(info.kind, UriInfoKind::EntityId);
    assert_eq!(info.options.id.as_deref(), Some("ESAllPrim(1)"));
    assert!(info.entity_type_cast.is_none());

    let info = parse(
        "$entity/olingo.odata.test1.ETAllPrim",
        Some("$id=ESAllPrim(1)&$select=PropertyString"),
    )?;
    let cast = info.entity_type_cast.as_ref().ok_or("no cast")?;
    assert_eq!(cast.name().to_string(), "olingo.odata.test1.ETAllPrim");
    assert_eq!(info.options.select.as_ref().map(Vec::len), Some(1));

    let info = parse("$all/Namespace1_Alias.ETTwoKeyNav", None)?;
    assert_eq!(info.kind, UriInfoKind::All);
    assert!(info.entity_type_cast.is_some());

    expect_semantic("$entity/olingo.odata.test1.Nope", None, SemanticMessageKey::UnknownType);
    // `$entity` names nothing without `$id`.
    for query in [None, Some(""), Some("$format=json")] {
        expect_syntax("$entity", query, SyntaxMessageKey::WrongValueForSystemQueryOption);
    }
    expect_syntax(
        "$entity/olingo.odata.test1.ETAllPrim",
        Some("$select=PropertyString"),
        SyntaxMessageKey::WrongValueForSystemQueryOption,
    );
    Ok(())
}

// Check crossjoin of entity sets.
#[test]
fn crossjoin_test() -> TestResult {
    let info = parse("$crossjoin(ESAllPrim,ESTwoPrim)", None)?;
    assert_eq!(info.kind, UriInfoKind::Crossjoin);
    assert_eq!(info.crossjoin_entity_sets, vec!["ESAllPrim", "ESTwoPrim"]);

    let info = parse(
        "$crossjoin(ESAllPrim,ESTwoPrim)",
        Some("$filter=ESAllPrim/PropertyInt16 eq ESTwoPrim/PropertyInt16"),
    )?;
    assert!(info.options.filter.is_some());

    expect_semantic("$crossjoin(ESAllPrim,ESNope)", None, SemanticMessageKey::ResourceNotFound);
    expect_syntax("$crossjoin()", None, SyntaxMessageKey::Syntax);
    Ok(())
}

// Check entity sets with single and composite keys.
#[test]
fn entity_set_keys_test() -> TestResult {
    let info = parse("ESAllPrim", None)?;
    assert_eq!(info.kind, UriInfoKind::Resource);
    assert!(info.resources[0].is_collection());

    let info = parse("ESAllPrim(32767)", None)?;
    let UriResource::EntitySet(es) = &info.resources[0] else {
        return Err("not an entity set".into());
    };
    assert_eq!(es.entity_set.name.as_str(), "ESAllPrim");
    assert!(!info.resources[0].is_collection());
    assert_eq!(es.keys.len(), 1);
    assert_eq!(es.keys[0].name, "PropertyInt16");
    assert_eq!(
        es.keys[0].value,
        KeyValue::Literal("32767".into(), PrimitiveValue::Int16(32767))
    );

    // Named form of a single key and reordered composite keys.
    assert_eq!(parse("ESAllPrim(PropertyInt16=1)", None)?.resources[0].keys().len(), 1);
    let info = parse("ESTwoKeyNav(PropertyString='abc',PropertyInt16=1)", None)?;
    let names = info.resources[0]
        .keys()
        .iter()
        .map(|k| k.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["PropertyInt16", "PropertyString"]);
    Ok(())
}

// Parsed key names are exactly the declared key properties.
#[test]
fn key_predicate_errors_test() {
    expect_semantic(
        "ESTwoKeyNav(PropertyInt16=1)",
        None,
        SemanticMessageKey::InvalidKeyProperty,
    );
    expect_semantic(
        "ESTwoKeyNav(PropertyInt16=1,PropertyNope='a')",
        None,
        SemanticMessageKey::InvalidKeyProperty,
    );
    expect_semantic(
        "ESTwoKeyNav(PropertyInt16=1,PropertyInt16=2)",
        None,
        SemanticMessageKey::DoubleKeyProperty,
    );
    expect_semantic("ESTwoKeyNav(1)", None, SemanticMessageKey::WrongNumberOfKeyProperties);
    expect_semantic("ESAllPrim()", None, SemanticMessageKey::WrongNumberOfKeyProperties);
    expect_semantic("ESAllPrim('a')", None, SemanticMessageKey::InvalidKeyProperty);
    expect_semantic("ESAllPrim(null)", None, SemanticMessageKey::InvalidKeyProperty);
    expect_semantic("ESAllPrim(40000)", None, SemanticMessageKey::InvalidKeyProperty);
    expect_semantic("SI(1)", None, SemanticMessageKey::KeyNotAllowed);
    expect_syntax("ESAllPrim(1", None, SyntaxMessageKey::Syntax);
}

// Check keys given by alias, by key alias and through complex paths.
#[test]
fn key_aliases_test() -> TestResult {
    let info = parse("ESAllPrim(@k)", Some("@k=5"))?;
    assert_eq!(info.resources[0].keys()[0].value, KeyValue::Alias("@k".into()));
    assert_eq!(info.alias("@k"), Some("5"));
    expect_semantic("ESAllPrim(@k)", None, SemanticMessageKey::UnknownAlias);
    expect_semantic("ESAllPrim(@k)", Some("@k='x'"), SemanticMessageKey::InvalidKeyProperty);

    let info = parse("ESKeyAlias(KeyAlias1=7)", None)?;
    let key = &info.resources[0].keys()[0];
    assert_eq!(key.name, "PropertyComp/PropertyInt16");
    assert_eq!(key.uri_name(), "KeyAlias1");
    Ok(())
}

// Check percent-encoded segments.
#[test]
fn percent_encoding_test() -> TestResult {
    let info = parse("ESTwoKeyNav(PropertyInt16=1,PropertyString='a%2Fb%20c')", None)?;
    let key = &info.resources[0].keys()[1];
    assert_eq!(key.value.to_string(), "'a/b c'");
    expect_syntax("ESAllPrim%2", None, SyntaxMessageKey::WrongPercentEncoding);
    Ok(())
}

// Check singletons, navigation and properties.
#[test]
fn navigation_test() -> TestResult {
    assert_eq!(
        kinds("SINav/NavPropertyETTwoKeyNavMany(PropertyInt16=1,PropertyString='1')/PropertyComp/PropertyInt16")?,
        vec![
            UriResourceKind::Singleton,
            UriResourceKind::NavigationProperty,
            UriResourceKind::ComplexProperty,
            UriResourceKind::PrimitiveProperty,
        ]
    );

    // A key on a collection navigation makes the segment single-valued.
    let info = parse("ESKeyNav(1)/NavPropertyETTwoKeyNavMany(PropertyInt16=1,PropertyString='2')", None)?;
    let UriResource::NavigationProperty(nav) = &info.resources[1] else {
        return Err("not a navigation".into());
    };
    assert!(nav.property.is_collection());
    assert!(!info.resources[1].is_collection());

    let info = parse("ESKeyNav(1)/NavPropertyETTwoKeyNavMany", None)?;
    assert!(info.resources[1].is_collection());

    let info = parse("ESTwoKeyNav(PropertyInt16=1,PropertyString='2')/CollPropertyComp", None)?;
    assert_eq!(info.resources[1].kind(), UriResourceKind::ComplexProperty);
    assert!(info.resources[1].is_collection());

    expect_semantic("ESKeyNav(1)/PropertyNope", None, SemanticMessageKey::PropertyNotInType);
    expect_semantic("ESKeyNav(1)/NavPropertyETKeyNavOne(1)", None, SemanticMessageKey::KeyNotAllowed);
    expect_semantic("ESKeyNav/PropertyString", None, SemanticMessageKey::PropertyAfterCollection);
    expect_semantic("ESNope", None, SemanticMessageKey::ResourceNotFound);
    Ok(())
}

// Check `$count`, `$value` and `$ref` segments.
#[test]
fn dollar_segments_test() -> TestResult {
    assert_eq!(
        kinds("ESAllPrim/$count")?,
        vec![UriResourceKind::EntitySet, UriResourceKind::Count]
    );
    assert_eq!(
        kinds("ESAllPrim(1)/PropertyString/$value")?,
        vec![
            UriResourceKind::EntitySet,
            UriResourceKind::PrimitiveProperty,
            UriResourceKind::Value,
        ]
    );
    assert_eq!(kinds("ESMedia(1)/$value")?.last(), Some(&UriResourceKind::Value));
    assert_eq!(kinds("ESAllPrim(1)/$ref")?.last(), Some(&UriResourceKind::Ref));
    assert_eq!(
        kinds("ESCollAllPrim(1)/CollPropertyString/$count")?.last(),
        Some(&UriResourceKind::Count)
    );

    expect_semantic("ESAllPrim(1)/$count", None, SemanticMessageKey::OnlyForCollections);
    expect_semantic("ESAllPrim(1)/$value", None, SemanticMessageKey::NotAMediaResource);
    expect_semantic("ESAllPrim/$value", None, SemanticMessageKey::OnlyForPrimitiveTypes);
    expect_semantic("ESAllPrim(1)/PropertyString/$ref", None, SemanticMessageKey::OnlyForEntityTypes);
    expect_syntax("ESAllPrim/$count/$ref", None, SyntaxMessageKey::MustBeLastSegment);
    expect_syntax("ESAllPrim(1)/$ref/PropertyString", None, SyntaxMessageKey::MustBeLastSegment);
    expect_syntax("ESAllPrim/$nope", None, SyntaxMessageKey::Syntax);
    Ok(())
}

// Navigation to a single entity followed by `$ref`.
#[test]
fn navigation_reference_test() -> TestResult {
    let info = parse("Orders(8)/CustomerForOrder/$ref", None)?;
    let UriResource::EntitySet(orders) = &info.resources[0] else {
        return Err("not an entity set".into());
    };
    assert_eq!(orders.entity_set.name.as_str(), "Orders");
    assert_eq!(orders.keys[0].value.to_string(), "8");
    let UriResource::NavigationProperty(nav) = &info.resources[1] else {
        return Err("not a navigation".into());
    };
    assert_eq!(nav.property.name(), "CustomerForOrder");
    assert!(!info.resources[1].is_collection());
    assert_eq!(info.resources[2].kind(), UriResourceKind::Ref);
    Ok(())
}

// Check type casts on collections, entries and complex properties.
#[test]
fn type_cast_test() -> TestResult {
    let info = parse("ESTwoKeyNav/olingo.odata.test1.ETBaseTwoKeyNav", None)?;
    let (on_collection, on_entry) = info.resources[0].type_filters();
    assert_eq!(
        on_collection.map(ToString::to_string).as_deref(),
        Some("olingo.odata.test1.ETBaseTwoKeyNav")
    );
    assert!(on_entry.is_none());
    assert_eq!(info.resources.len(), 1);

    let info = parse(
        "ESTwoKeyNav/Namespace1_Alias.ETBaseTwoKeyNav(PropertyInt16=1,PropertyString='1')/PropertyDate",
        None,
    )?;
    assert_eq!(info.resources[0].keys().len(), 2);
    assert_eq!(info.resources[1].kind(), UriResourceKind::PrimitiveProperty);

    let info = parse("ESTwoKeyNav(PropertyInt16=1,PropertyString='1')/olingo.odata.test1.ETBaseTwoKeyNav", None)?;
    assert!(info.resources[0].type_filters().1.is_some());

    let info = parse(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='1')/PropertyComp/olingo.odata.test1.CTBase/AdditionalPropString",
        None,
    )?;
    assert!(info.resources[1].type_filters().1.is_some());

    expect_semantic(
        "ESTwoKeyNav/olingo.odata.test1.ETAllPrim",
        None,
        SemanticMessageKey::IncompatibleTypeFilter,
    );
    expect_semantic(
        "ESTwoKeyNav/olingo.odata.test1.ETBaseTwoKeyNav/olingo.odata.test1.ETTwoBaseTwoKeyNav",
        None,
        SemanticMessageKey::TypeFilterNotChainable,
    );
    expect_semantic(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='1')/PropertyInt16/olingo.odata.test1.CTBase",
        None,
        SemanticMessageKey::OnlyForStructuralTypes,
    );
    expect_semantic(
        "ESAllPrim(1)/olingo.odata.test1.ETAllPrim(1)",
        None,
        SemanticMessageKey::KeyNotAllowed,
    );
    Ok(())
}

// Check function and action imports.
#[test]
fn operation_imports_test() -> TestResult {
    let info = parse("FICRTCollESTwoKeyNavParam(ParameterInt16=123)/$count", None)?;
    let UriResource::Function(function) = &info.resources[0] else {
        return Err("not a function".into());
    };
    assert_eq!(
        function.import.as_ref().map(|i| i.name.as_str()),
        Some("FICRTCollESTwoKeyNavParam")
    );
    assert_eq!(function.parameters[0].name, "ParameterInt16");
    assert_eq!(
        function.parameters[0].value,
        ParameterValue::Literal("123".into(), Some(PrimitiveValue::Int16(123)))
    );
    assert_eq!(info.resources[1].kind(), UriResourceKind::Count);

    let info = parse(
        "FICRTCollESTwoKeyNavParam(ParameterInt16=1)(PropertyInt16=2,PropertyString='3')/PropertyComp",
        None,
    )?;
    assert!(!info.resources[0].is_collection());
    assert_eq!(info.resources[1].kind(), UriResourceKind::ComplexProperty);

    let info = parse("FICRTCollESTwoKeyNavParam(ParameterInt16=@p)", Some("@p=1"))?;
    let UriResource::Function(function) = &info.resources[0] else {
        return Err("not a function".into());
    };
    assert_eq!(function.parameters[0].value, ParameterValue::Alias("@p".into()));

    assert_eq!(kinds("FICRTString()")?, vec![UriResourceKind::Function]);
    assert_eq!(kinds("AIRTString")?, vec![UriResourceKind::Action]);

    expect_semantic(
        "FICRTCollESTwoKeyNavParam(ParameterInt16='x')",
        None,
        SemanticMessageKey::TypeMismatch,
    );
    expect_semantic(
        "FICRTCollESTwoKeyNavParam(Nope=1)",
        None,
        SemanticMessageKey::FunctionNotFound,
    );
    expect_semantic("FICRTString()(1)", None, SemanticMessageKey::KeyNotAllowed);
    expect_syntax("FICRTString()/PropertyInt16", None, SyntaxMessageKey::MustBeLastSegment);
    expect_syntax("AIRTString/$count", None, SyntaxMessageKey::MustBeLastSegment);
    Ok(())
}

// Check bound actions and functions.
#[test]
fn bound_operations_test() -> TestResult {
    let info = parse("ESTwoKeyNav/olingo.odata.test1.BAESTwoKeyNavRTESTwoKeyNav", None)?;
    let UriResource::Action(action) = &info.resources[1] else {
        return Err("not an action".into());
    };
    assert!(action.action.is_bound());
    assert!(info.resources[1].is_collection());

    let info = parse("ESAllPrim/Namespace1_Alias.BAESAllPrimRTETAllPrim", None)?;
    assert_eq!(info.resources[1].kind(), UriResourceKind::Action);

    let info = parse("ESTwoKeyNav/olingo.odata.test1.BFCESTwoKeyNavRTString()", None)?;
    assert_eq!(info.resources[1].kind(), UriResourceKind::Function);

    assert_eq!(
        kinds("ESTwoKeyNav(PropertyInt16=1,PropertyString='1')/olingo.odata.test1.BFCETTwoKeyNavRTETTwoKeyNav()/PropertyString")?,
        vec![
            UriResourceKind::EntitySet,
            UriResourceKind::Function,
            UriResourceKind::PrimitiveProperty,
        ]
    );

    // Bound to the collection, not to a single entity.
    expect_semantic(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='1')/olingo.odata.test1.BAESTwoKeyNavRTESTwoKeyNav",
        None,
        SemanticMessageKey::ActionNotFound,
    );
    expect_semantic(
        "ESAllPrim/olingo.odata.test1.BFCESTwoKeyNavRTString()",
        None,
        SemanticMessageKey::FunctionNotFound,
    );
    expect_syntax(
        "ESTwoKeyNav/olingo.odata.test1.BFCESTwoKeyNavRTString()/PropertyString",
        None,
        SyntaxMessageKey::MustBeLastSegment,
    );
    expect_syntax(
        "ESTwoKeyNav/olingo.odata.test1.BAESTwoKeyNavRTESTwoKeyNav/$count",
        None,
        SyntaxMessageKey::MustBeLastSegment,
    );
    Ok(())
}

// Check unbound operations addressed by qualified name.
#[test]
fn unbound_operation_by_name_test() -> TestResult {
    assert_eq!(kinds("olingo.odata.test1.UFCRTString()")?, vec![UriResourceKind::Function]);
    assert_eq!(kinds("olingo.odata.test1.UARTString")?, vec![UriResourceKind::Action]);
    expect_semantic("olingo.odata.test1.Nope()", None, SemanticMessageKey::ResourceNotFound);
    Ok(())
}

// Status codes follow the error kind.
#[test]
fn error_status_test() -> TestResult {
    let err = parse("ESNope", None).err().ok_or("must fail")?;
    assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
    assert_eq!(err.message_key(), Some("RESOURCE_NOT_FOUND"));
    let err = parse("ESAllPrim(", None).err().ok_or("must fail")?;
    assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
    Ok(())
}

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

use odata_edm::EdmPrimitiveTypeKind;
use odata_uri::error::SemanticMessageKey;
use odata_uri::error::SyntaxMessageKey;
use odata_uri::query_option::CustomQueryOption;
use odata_uri::query_option::Format;
use odata_uri::query_option::Levels;
use odata_uri::Expression;
use odata_uri::Parser;
use odata_uri::ParserConfig;
use odata_uri::ParserError;
use odata_uri::SearchExpression;
use odata_uri::SystemQueryOptionKind;
use odata_uri::UriInfo;
use odata_uri::UriResource;
use odata_uri::UriResourceKind;
use odata_uri_tests::edm;
use odata_uri_tests::expect_semantic;
use odata_uri_tests::expect_syntax;
use odata_uri_tests::parse;
use odata_uri_tests::TestResult;

fn filter(path: &str, query: &str) -> Result<Expression, Box<dyn std::error::Error>> {
    Ok(parse(path, Some(query))?
        .options
        .filter
        .ok_or("filter is not set")?)
}

fn parse_with(config: ParserConfig, path: &str, query: &str) -> Result<UriInfo, ParserError> {
    Parser::new(edm())
        .with_config(config)
        .parse_uri(path, Some(query), None)
}

// Check that filters are typed and printed back in canonical form.
#[test]
fn filter_test() -> TestResult {
    let expression = filter("ESAllPrim", "$filter=PropertyInt16 eq 1")?;
    assert_eq!(expression.to_string(), "PropertyInt16 eq 1");
    assert_eq!(
        expression.ty().and_then(|t| t.as_primitive()),
        Some(EdmPrimitiveTypeKind::Boolean)
    );

    let expression = filter(
        "ESAllPrim",
        "$filter=PropertyInt16 eq 1 and PropertyString eq 'a' or not PropertyBoolean",
    )?;
    assert_eq!(
        expression.to_string(),
        "PropertyInt16 eq 1 and PropertyString eq 'a' or not PropertyBoolean"
    );

    let expression = filter("ESAllPrim", "$filter=(PropertyInt16 add 1) mul 2 gt 10")?;
    assert_eq!(expression.to_string(), "(PropertyInt16 add 1) mul 2 gt 10");

    filter("ESAllPrim", "$filter=contains(PropertyString,'a')")?;
    filter("ESAllPrim", "$filter=length(PropertyString) gt 2")?;
    filter("ESAllPrim", "$filter=PropertyInt16 in (1,2,3)")?;
    let expression = filter("ESAllPrim", "$filter=PropertyString in ('a','b')")?;
    assert_eq!(expression.to_string(), "PropertyString in ('a','b')");
    filter("ESAllPrim", "$filter=PropertyInt16 in (1)")?;
    filter("ESAllPrim", "$filter=PropertyInt16 in @list&@list=(1,2)")?;
    filter("ESAllPrim", "$filter=PropertyString eq null")?;
    filter("ESAllPrim", "$filter=$it/PropertyInt16 eq 1")?;
    filter("ESAllPrim", "$filter=PropertyString%20eq%20'a%20b'")?;
    Ok(())
}

// Check filter errors: non-boolean root, type mismatch, unknown members.
#[test]
fn filter_errors_test() {
    expect_semantic("ESAllPrim", Some("$filter=PropertyString"), SemanticMessageKey::TypeMismatch);
    expect_semantic("ESAllPrim", Some("$filter=PropertyString eq 1"), SemanticMessageKey::TypeMismatch);
    expect_semantic(
        "ESAllPrim",
        Some("$filter=PropertyNope eq 1"),
        SemanticMessageKey::ExpressionPropertyNotInType,
    );
    expect_syntax("ESAllPrim", Some("$filter=contains(PropertyString)"), SyntaxMessageKey::Syntax);
    expect_syntax("ESAllPrim", Some("$filter=PropertyInt16 eq"), SyntaxMessageKey::Syntax);
    expect_syntax("ESAllPrim", Some("$filter=%zz"), SyntaxMessageKey::WrongPercentEncoding);
    // Lists only follow `in`, which takes a list or an alias.
    for query in [
        "$filter=(1,2)",
        "$filter=PropertyInt16 eq (1,2)",
        "$filter=PropertyInt16 in 1",
        "$filter=PropertyInt16 in PropertyInt16",
        "$filter=PropertyInt16 in ()",
    ] {
        expect_syntax("ESAllPrim", Some(query), SyntaxMessageKey::Syntax);
    }
    expect_semantic(
        "ESAllPrim",
        Some("$filter=PropertyInt16 in ('a','b')"),
        SemanticMessageKey::TypeMismatch,
    );
    expect_semantic(
        "ESAllPrim",
        Some("$filter=PropertyInt16 in (1,'b')"),
        SemanticMessageKey::TypeMismatch,
    );
    expect_semantic(
        "$crossjoin(ESAllPrim,ESTwoPrim)",
        Some("$filter=PropertyInt16 eq 1"),
        SemanticMessageKey::OnlyForTypedParts,
    );
}

// Check `any` and `all` over navigation and primitive collections.
#[test]
fn lambda_test() -> TestResult {
    let expression = filter("ESTwoKeyNav", "$filter=CollPropertyString/any(d:d eq 'x')")?;
    let Expression::Member { resources, .. } = &expression else {
        return Err("not a member expression".into());
    };
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[1].kind(), UriResourceKind::LambdaAny);
    assert_eq!(expression.to_string(), "CollPropertyString/any(d:d eq 'x')");

    filter(
        "ESTwoKeyNav",
        "$filter=NavPropertyETTwoKeyNavMany/all(d:d/PropertyInt16 gt 1)",
    )?;
    filter("ESTwoKeyNav", "$filter=NavPropertyETTwoKeyNavMany/any()")?;
    filter("ESTwoKeyNav", "$filter=NavPropertyETTwoKeyNavMany/$count gt 2")?;

    expect_semantic(
        "ESTwoKeyNav",
        Some("$filter=NavPropertyETTwoKeyNavOne/any(d:true)"),
        SemanticMessageKey::OnlyForCollections,
    );
    expect_semantic(
        "ESTwoKeyNav",
        Some("$filter=NavPropertyETTwoKeyNavMany/any(d:d/PropertyString)"),
        SemanticMessageKey::TypeMismatch,
    );
    expect_semantic(
        "ESTwoKeyNav",
        Some("$filter=NavPropertyETTwoKeyNavMany/PropertyInt16 eq 1"),
        SemanticMessageKey::PropertyAfterCollection,
    );
    Ok(())
}

// Check `$root` paths and enumeration literals.
#[test]
fn root_and_enum_test() -> TestResult {
    let expression = filter(
        "ESTwoKeyNav",
        "$filter=PropertyInt16 eq $root/ESAllPrim(1)/PropertyInt16",
    )?;
    let Expression::Binary { right, .. } = &expression else {
        return Err("not a binary expression".into());
    };
    let Expression::Member { resources, .. } = right.as_ref() else {
        return Err("not a member expression".into());
    };
    assert_eq!(resources[0].kind(), UriResourceKind::EntitySet);
    assert!(!resources[0].is_collection());

    let expression = filter(
        "ESMixEnumDefCollComp",
        "$filter=PropertyEnumString has olingo.odata.test1.ENString'String1'",
    )?;
    let Expression::Binary { right, .. } = &expression else {
        return Err("not a binary expression".into());
    };
    let Expression::Enum { values, .. } = right.as_ref() else {
        return Err("not an enum literal".into());
    };
    assert_eq!(values, &["String1"]);
    filter("ESMixEnumDefCollComp", "$filter=PropertyEnumString eq 'String2'")?;

    expect_semantic(
        "ESMixEnumDefCollComp",
        Some("$filter=PropertyEnumString has olingo.odata.test1.ENString'String9'"),
        SemanticMessageKey::UnknownPart,
    );
    expect_semantic(
        "ESMixEnumDefCollComp",
        Some("$filter=PropertyEnumString has olingo.odata.test1.ENNope'String1'"),
        SemanticMessageKey::UnknownType,
    );
    expect_semantic(
        "ESAllPrim",
        Some("$filter=PropertyInt16 eq $root/ESNope(1)/PropertyInt16"),
        SemanticMessageKey::ResourceNotFound,
    );
    Ok(())
}

// Check `$orderby` items and directions.
#[test]
fn orderby_test() -> TestResult {
    let info = parse("ESAllPrim", Some("$orderby=PropertyString desc,PropertyInt16 asc,PropertyByte"))?;
    let orderby = info.options.orderby.ok_or("orderby is not set")?;
    assert_eq!(orderby.len(), 3);
    assert!(orderby[0].descending);
    assert!(!orderby[1].descending);
    assert!(!orderby[2].descending);
    assert_eq!(orderby[0].to_string(), "PropertyString desc");
    assert_eq!(orderby[1].to_string(), "PropertyInt16");

    expect_semantic(
        "ESAllPrim",
        Some("$orderby=PropertyNope"),
        SemanticMessageKey::ExpressionPropertyNotInType,
    );
    expect_syntax("ESAllPrim", Some("$orderby=PropertyString up"), SyntaxMessageKey::Syntax);
    Ok(())
}

// Check `$select` of properties, stars, casts and bound operations.
#[test]
fn select_test() -> TestResult {
    let select = parse("ESAllPrim", Some("$select=*"))?.options.select.ok_or("no select")?;
    assert!(select[0].is_star);

    let select = parse("ESAllPrim", Some("$select=olingo.odata.test1.*"))?
        .options
        .select
        .ok_or("no select")?;
    assert_eq!(
        select[0].all_operations_in_schema.as_ref().map(ToString::to_string).as_deref(),
        Some("olingo.odata.test1")
    );

    let select = parse("ESTwoKeyNav", Some("$select=PropertyComp/PropertyString,CollPropertyString"))?
        .options
        .select
        .ok_or("no select")?;
    assert_eq!(select.len(), 2);
    assert_eq!(select[0].path.len(), 2);
    assert_eq!(select[0].path[0].kind(), UriResourceKind::ComplexProperty);
    assert_eq!(select[0].to_string(), "PropertyComp/PropertyString");
    assert!(select[1].path[0].is_collection());

    let select = parse(
        "ESTwoKeyNav",
        Some("$select=olingo.odata.test1.ETBaseTwoKeyNav/PropertyDate"),
    )?
    .options
    .select
    .ok_or("no select")?;
    assert!(select[0].type_filter.is_some());
    assert_eq!(
        select[0].to_string(),
        "olingo.odata.test1.ETBaseTwoKeyNav/PropertyDate"
    );

    let select = parse(
        "ESTwoKeyNav(PropertyInt16=1,PropertyString='a')",
        Some("$select=olingo.odata.test1.BAETTwoKeyNavRTETTwoKeyNav"),
    )?
    .options
    .select
    .ok_or("no select")?;
    assert_eq!(select[0].path[0].kind(), UriResourceKind::Action);

    expect_semantic("ESAllPrim", Some("$select=PropertyNope"), SemanticMessageKey::PropertyNotInType);
    expect_semantic(
        "ESAllPrim",
        Some("$select=olingo.odata.test1.ETTwoPrim/PropertyInt16"),
        SemanticMessageKey::IncompatibleTypeFilter,
    );
    expect_semantic(
        "ESAllPrim",
        Some("$select=olingo.odata.test1.UnknownOperation"),
        SemanticMessageKey::UnknownPart,
    );
    expect_semantic(
        "$crossjoin(ESAllPrim,ESTwoPrim)",
        Some("$select=PropertyInt16"),
        SemanticMessageKey::OnlyForTypedParts,
    );
    Ok(())
}

// Check `$expand` with nested options, `$levels`, `$ref` and `$count`.
#[test]
fn expand_test() -> TestResult {
    let info = parse("Customers", Some("$expand=Orders($select=Amount;$top=2;$levels=max)"))?;
    let expand = info.options.expand.ok_or("no expand")?;
    assert_eq!(expand.len(), 1);
    assert_eq!(expand[0].levels(), Some(Levels::Max));
    assert_eq!(expand[0].options.top, Some(2));
    assert_eq!(expand[0].options.select.as_ref().map(Vec::len), Some(1));
    assert_eq!(expand[0].to_string(), "Orders($select=Amount;$top=2;$levels=max)");

    let expand = parse(
        "ESTwoKeyNav",
        Some("$expand=NavPropertyETTwoKeyNavMany/$ref,NavPropertyETKeyNavOne/$count"),
    )?
    .options
    .expand
    .ok_or("no expand")?;
    assert!(expand[0].is_ref);
    assert!(!expand[0].is_count);
    assert!(expand[1].is_count);
    assert_eq!(expand[0].to_string(), "NavPropertyETTwoKeyNavMany/$ref");

    let expand = parse("ESTwoKeyNav", Some("$expand=*"))?.options.expand.ok_or("no expand")?;
    assert!(expand[0].is_star);
    assert!(expand[0].path.is_empty());

    let expand = parse("ESTwoKeyNav", Some("$expand=PropertyCompNav/NavPropertyETTwoKeyNavOne"))?
        .options
        .expand
        .ok_or("no expand")?;
    assert_eq!(expand[0].path.len(), 2);
    assert!(matches!(expand[0].path[1], UriResource::NavigationProperty(_)));

    let expand = parse(
        "ESTwoKeyNav",
        Some("$expand=olingo.odata.test1.ETBaseTwoKeyNav/NavPropertyETTwoKeyNavMany($filter=PropertyInt16 gt 1)"),
    )?
    .options
    .expand
    .ok_or("no expand")?;
    assert!(expand[0].type_filter.is_some());
    assert!(expand[0].options.filter.is_some());
    Ok(())
}

// Check `$expand` failures.
#[test]
fn expand_errors_test() {
    expect_semantic("ESTwoKeyNav", Some("$expand=PropertyString"), SemanticMessageKey::PropertyNotInType);
    expect_semantic("ESTwoKeyNav", Some("$expand=NavPropertyNope"), SemanticMessageKey::PropertyNotInType);
    expect_syntax(
        "ESTwoKeyNav",
        Some("$expand=NavPropertyETTwoKeyNavOne($format=json)"),
        SyntaxMessageKey::Syntax,
    );
    expect_syntax(
        "ESTwoKeyNav",
        Some("$expand=NavPropertyETTwoKeyNavOne($top=1;$top=2)"),
        SyntaxMessageKey::DoubleSystemQueryOption,
    );
    expect_syntax(
        "ESTwoKeyNav",
        Some("$expand=NavPropertyETTwoKeyNavOne($levels=101)"),
        SyntaxMessageKey::WrongValueForSystemQueryOption,
    );
    expect_syntax(
        "ESTwoKeyNav",
        Some("$expand=NavPropertyETTwoKeyNavOne($select=PropertyString"),
        SyntaxMessageKey::Syntax,
    );
}

// Check paging, counting, search and format values.
#[test]
fn simple_options_test() -> TestResult {
    let info = parse(
        "ESAllPrim",
        Some("$top=5&$skip=10&$count=true&$skiptoken=abc&$format=json"),
    )?;
    assert_eq!(info.options.top, Some(5));
    assert_eq!(info.options.skip, Some(10));
    assert_eq!(info.options.count, Some(true));
    assert_eq!(info.options.skiptoken.as_deref(), Some("abc"));
    assert_eq!(info.options.format, Some(Format::Json));

    let info = parse("ESAllPrim", Some("$format=application/json;odata.metadata=minimal"))?;
    assert_eq!(
        info.options.format,
        Some(Format::Custom("application/json;odata.metadata=minimal".into()))
    );

    let info = parse("ESAllPrim", Some("$search=blue OR \"green apple\""))?;
    let search = info.options.search.ok_or("no search")?;
    assert!(matches!(search, SearchExpression::Or(_, _)));
    assert_eq!(search.to_string(), "blue OR \"green apple\"");

    for query in ["$top=-1", "$top=", "$skip=abc", "$count=yes", "$format=yaml", "$skiptoken="] {
        expect_syntax("ESAllPrim", Some(query), SyntaxMessageKey::WrongValueForSystemQueryOption);
    }
    expect_syntax("$entity", Some("$id="), SyntaxMessageKey::WrongValueForSystemQueryOption);
    expect_syntax("ESAllPrim", Some("$search=(blue"), SyntaxMessageKey::Syntax);
    Ok(())
}

// Check options given twice, unknown options and `$levels` outside `$expand`.
#[test]
fn query_keys_test() {
    for (path, query) in [
        ("ESAllPrim", "$top=1&$top=2"),
        ("ESAllPrim(1)", "$select=*&$select=PropertyString"),
        ("$metadata", "$format=xml&$format=json"),
        ("$crossjoin(ESAllPrim,ESTwoPrim)", "$count=true&$count=false"),
    ] {
        expect_syntax(path, Some(query), SyntaxMessageKey::DoubleSystemQueryOption);
    }
    expect_syntax("ESAllPrim", Some("$unknown=1"), SyntaxMessageKey::UnknownSystemQueryOption);
    expect_syntax(
        "ESAllPrim",
        Some("$FILTER=PropertyInt16 eq 1"),
        SyntaxMessageKey::UnknownSystemQueryOption,
    );
    expect_syntax(
        "ESTwoKeyNav",
        Some("$levels=2"),
        SyntaxMessageKey::SystemQueryOptionLevelsNotAllowedHere,
    );
    expect_syntax("ESAllPrim", Some("@p=1&@p=2"), SyntaxMessageKey::DuplicatedAlias);
}

// Check aliases and custom options.
#[test]
fn aliases_and_custom_options_test() -> TestResult {
    let info = parse("ESAllPrim", Some("$filter=PropertyInt16 eq @p&@p=1"))?;
    assert_eq!(info.alias("@p"), Some("1"));
    assert!(info.options.filter.is_some());

    let info = parse("ESAllPrim", Some("sap-client=100&debug&filter=x"))?;
    assert_eq!(
        info.custom_options,
        vec![
            CustomQueryOption {
                name: "sap-client".into(),
                text: "100".into()
            },
            CustomQueryOption {
                name: "debug".into(),
                text: String::new()
            },
            CustomQueryOption {
                name: "filter".into(),
                text: "x".into()
            },
        ]
    );
    assert!(info.options.is_empty());
    Ok(())
}

// Check the leniency switches and limits of the parser configuration.
#[test]
fn config_test() -> TestResult {
    let config = ParserConfig {
        case_insensitive_system_options: true,
        ..ParserConfig::default()
    };
    let info = parse_with(config, "ESAllPrim", "$FILTER=PropertyInt16 eq 1&$Top=1")?;
    assert!(info.options.filter.is_some());
    assert_eq!(info.options.top, Some(1));

    let config = ParserConfig {
        allow_missing_dollar: true,
        ..ParserConfig::default()
    };
    let info = parse_with(config, "ESAllPrim", "top=3&sap-client=1")?;
    assert_eq!(info.options.top, Some(3));
    assert_eq!(info.custom_options.len(), 1);

    let config = ParserConfig::from_toml("max_nesting_depth = 2\nmax_levels = 3")?;
    assert_eq!(config.max_levels, 3);
    let nested = "$expand=NavPropertyETTwoKeyNavOne($expand=NavPropertyETTwoKeyNavOne($expand=NavPropertyETTwoKeyNavOne))";
    match parse_with(config.clone(), "ESTwoKeyNav", nested) {
        Err(ParserError::Syntax(err)) => assert_eq!(err.key, SyntaxMessageKey::TooDeeplyNested),
        other => return Err(format!("expected TOO_DEEPLY_NESTED, got {other:?}").into()),
    }
    match parse_with(config.clone(), "ESAllPrim", "$filter=(((PropertyInt16 eq 1)))") {
        Err(ParserError::Syntax(err)) => assert_eq!(err.key, SyntaxMessageKey::TooDeeplyNested),
        other => return Err(format!("expected TOO_DEEPLY_NESTED, got {other:?}").into()),
    }
    match parse_with(config.clone(), "ESAllPrim", "$search=((blue OR green))") {
        Ok(info) => assert!(info.options.search.is_some()),
        other => return Err(format!("expected search, got {other:?}").into()),
    }
    for search in ["$search=(((blue)))", "$search=NOT NOT NOT blue"] {
        match parse_with(config.clone(), "ESAllPrim", search) {
            Err(ParserError::Syntax(err)) => assert_eq!(err.key, SyntaxMessageKey::TooDeeplyNested),
            other => return Err(format!("expected TOO_DEEPLY_NESTED, got {other:?}").into()),
        }
    }
    // Same limit as $filter with the default configuration.
    for depth in [200, 200_000] {
        let query = format!("$search={}blue{}", "(".repeat(depth), ")".repeat(depth));
        expect_syntax("ESAllPrim", Some(&query), SyntaxMessageKey::TooDeeplyNested);
    }
    match parse_with(config, "ESTwoKeyNav", "$expand=NavPropertyETTwoKeyNavOne($levels=4)") {
        Err(ParserError::Syntax(err)) => {
            assert_eq!(err.key, SyntaxMessageKey::WrongValueForSystemQueryOption);
        }
        other => return Err(format!("expected WRONG_VALUE, got {other:?}").into()),
    }

    assert!(ParserConfig::from_toml("max_depth = 2").is_err());
    Ok(())
}

// Check rendering of parsed options back to a query string.
#[test]
fn to_query_string_test() -> TestResult {
    let info = parse("ESAllPrim", Some("$top=5&$filter=PropertyInt16 eq 1&$count=true"))?;
    assert_eq!(
        info.options.to_query_string(),
        "$filter=PropertyInt16 eq 1&$top=5&$count=true"
    );
    assert_eq!(info.options.text(SystemQueryOptionKind::Top), Some("5"));
    assert_eq!(
        info.system_query_option(SystemQueryOptionKind::Filter),
        Some("PropertyInt16 eq 1")
    );
    assert_eq!(
        info.options.kinds(),
        vec![
            SystemQueryOptionKind::Filter,
            SystemQueryOptionKind::Top,
            SystemQueryOptionKind::Count
        ]
    );
    Ok(())
}

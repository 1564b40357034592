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

//! Validation of parsed requests against the HTTP method.
//!
//! Every parsed [`UriInfo`] maps to one [`Row`] of a fixed decision
//! table listing the system query options legal for that resource. The
//! method is checked first, then the options against the row.

use crate::error::ValidationError;
use crate::error::ValidationMessageKey;
use crate::info::UriInfo;
use crate::info::UriInfoKind;
use crate::query_option::SystemQueryOptionKind;
use crate::resource::UriResource;
use http::Method;
use odata_edm::EdmType;
use tracing::debug;

/// Option columns of the decision table.
const COLUMNS: [SystemQueryOptionKind; 11] = [
    SystemQueryOptionKind::Filter,
    SystemQueryOptionKind::Format,
    SystemQueryOptionKind::Expand,
    SystemQueryOptionKind::Id,
    SystemQueryOptionKind::Count,
    SystemQueryOptionKind::OrderBy,
    SystemQueryOptionKind::Search,
    SystemQueryOptionKind::Select,
    SystemQueryOptionKind::Skip,
    SystemQueryOptionKind::SkipToken,
    SystemQueryOptionKind::Top,
];

const T: bool = true;
const F: bool = false;

/// Indexed by [`Row`], columns as in [`COLUMNS`].
#[rustfmt::skip]
const TABLE: [[bool; 11]; 20] = [
    //  filter format expand id  count orderby search select skip skiptoken top
    [T, T, T, F, T, T, T, T, T, T, T], // all
    [F, F, F, F, F, F, F, F, F, F, F], // batch
    [T, T, T, F, T, T, T, T, T, T, T], // crossjoin
    [F, T, T, T, F, F, F, T, F, F, F], // entityId
    [F, T, F, F, F, F, F, F, F, F, F], // metadata
    [F, T, F, F, F, F, F, F, F, F, F], // service
    [T, T, T, F, T, T, T, T, T, T, T], // entitySet
    [T, F, F, F, F, F, T, F, F, F, F], // entitySetCount
    [F, T, T, F, F, F, F, T, F, F, F], // entity
    [F, F, F, F, F, F, F, F, F, F, F], // mediaStream
    [T, T, F, T, T, T, T, F, T, T, T], // references
    [F, T, F, F, F, F, F, F, F, F, F], // reference
    [F, T, T, F, F, F, F, T, F, F, F], // propertyComplex
    [T, T, T, F, T, T, F, T, T, T, T], // propertyComplexCollection
    [T, F, F, F, F, F, T, F, F, F, F], // propertyComplexCollectionCount
    [F, T, F, F, F, F, F, F, F, F, F], // propertyPrimitive
    [T, T, F, F, T, T, F, F, T, T, T], // propertyPrimitiveCollection
    [T, F, F, F, F, F, F, F, F, F, F], // propertyPrimitiveCollectionCount
    [F, T, F, F, F, F, F, F, F, F, F], // propertyPrimitiveValue
    [F, T, F, F, F, F, F, F, F, F, F], // none
];

/// Shape of the addressed resource, one per table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    All,
    Batch,
    Crossjoin,
    EntityId,
    Metadata,
    Service,
    EntitySet,
    EntitySetCount,
    Entity,
    MediaStream,
    References,
    Reference,
    PropertyComplex,
    PropertyComplexCollection,
    PropertyComplexCollectionCount,
    PropertyPrimitive,
    PropertyPrimitiveCollection,
    PropertyPrimitiveCollectionCount,
    PropertyPrimitiveValue,
    None,
}

impl Row {
    /// Row for a parsed request.
    #[must_use]
    pub fn of(info: &UriInfo) -> Self {
        match info.kind {
            UriInfoKind::All => Self::All,
            UriInfoKind::Batch => Self::Batch,
            UriInfoKind::Crossjoin => Self::Crossjoin,
            UriInfoKind::EntityId => Self::EntityId,
            UriInfoKind::Metadata => Self::Metadata,
            UriInfoKind::Service => Self::Service,
            UriInfoKind::Resource => Self::of_resources(&info.resources),
        }
    }

    fn of_resources(resources: &[UriResource]) -> Self {
        let Some((last, before)) = resources.split_last() else {
            return Self::None;
        };
        let previous = before.last();
        match last {
            UriResource::Count => previous.map_or(Self::None, |p| Self::of_count(p.edm_type())),
            UriResource::Ref => {
                if previous.is_some_and(UriResource::is_collection) {
                    Self::References
                } else {
                    Self::Reference
                }
            }
            UriResource::Value => {
                if previous
                    .and_then(UriResource::edm_type)
                    .is_some_and(|t| t.as_entity().is_some())
                {
                    Self::MediaStream
                } else {
                    Self::PropertyPrimitiveValue
                }
            }
            UriResource::It(_)
            | UriResource::LambdaVariable(_)
            | UriResource::LambdaAll(_)
            | UriResource::LambdaAny(_) => Self::None,
            resource => Self::of_type(resource.edm_type(), resource.is_collection()),
        }
    }

    fn of_type(ty: Option<EdmType>, collection: bool) -> Self {
        match (ty, collection) {
            (None, _) => Self::None,
            (Some(EdmType::Entity(_)), true) => Self::EntitySet,
            (Some(EdmType::Entity(_)), false) => Self::Entity,
            (Some(EdmType::Complex(_)), true) => Self::PropertyComplexCollection,
            (Some(EdmType::Complex(_)), false) => Self::PropertyComplex,
            (Some(_), true) => Self::PropertyPrimitiveCollection,
            (Some(_), false) => Self::PropertyPrimitive,
        }
    }

    fn of_count(ty: Option<EdmType>) -> Self {
        match ty {
            None => Self::None,
            Some(EdmType::Entity(_)) => Self::EntitySetCount,
            Some(EdmType::Complex(_)) => Self::PropertyComplexCollectionCount,
            Some(_) => Self::PropertyPrimitiveCollectionCount,
        }
    }

    const fn is_count(self) -> bool {
        matches!(
            self,
            Self::EntitySetCount
                | Self::PropertyComplexCollectionCount
                | Self::PropertyPrimitiveCollectionCount
        )
    }

    /// `true` if `option` may be used on this row. `$levels` belongs to
    /// `$expand` and is never a column.
    #[must_use]
    pub fn allows(self, option: SystemQueryOptionKind) -> bool {
        COLUMNS
            .iter()
            .position(|c| *c == option)
            .is_some_and(|column| TABLE[self as usize][column])
    }
}

/// Checks system query options and HTTP method of parsed requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriValidator;

impl UriValidator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate `info` for `method`.
    ///
    /// # Errors
    ///
    /// - `UNSUPPORTED_HTTP_METHOD` if the method cannot be applied to the resource
    /// - `SYSTEM_QUERY_OPTION_NOT_ALLOWED_FOR_HTTP_METHOD` if options come with a
    ///   method that takes none
    /// - `SYSTEM_QUERY_OPTION_NOT_ALLOWED` if an option is not legal for the resource.
    pub fn validate(&self, info: &UriInfo, method: &Method) -> Result<(), ValidationError> {
        let row = Row::of(info);
        let result = Self::check_method(info, row, method).and_then(|()| Self::check_options(info, row, method));
        if let Err(err) = &result {
            debug!(%err, %method, ?row, "request rejected");
        }
        result
    }

    fn unsupported(method: &Method) -> ValidationError {
        ValidationError::new(ValidationMessageKey::UnsupportedHttpMethod, &[method.as_str()])
    }

    fn check_method(info: &UriInfo, row: Row, method: &Method) -> Result<(), ValidationError> {
        if ![Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method) {
            return Err(Self::unsupported(method));
        }
        let get_only = matches!(
            info.kind,
            UriInfoKind::Metadata | UriInfoKind::All | UriInfoKind::Crossjoin | UriInfoKind::EntityId
        ) || row.is_count();
        if (info.kind == UriInfoKind::Batch && *method != Method::POST) || (get_only && *method != Method::GET) {
            return Err(Self::unsupported(method));
        }
        let (last, property) = match info.resources.as_slice() {
            [.., property, UriResource::Value] => (true, property),
            [.., property] => (false, property),
            [] => return Ok(()),
        };
        if let UriResource::PrimitiveProperty(p) | UriResource::ComplexProperty(p) = property {
            if *method == Method::PATCH && !last && property.is_collection() {
                return Err(Self::unsupported(method));
            }
            if *method == Method::DELETE && !p.property.is_nullable() {
                return Err(Self::unsupported(method));
            }
        }
        Ok(())
    }

    fn check_options(info: &UriInfo, row: Row, method: &Method) -> Result<(), ValidationError> {
        let options = info
            .options
            .kinds()
            .into_iter()
            .filter(|kind| *kind != SystemQueryOptionKind::Levels)
            .collect::<Vec<_>>();
        if *method != Method::GET {
            let action = *method == Method::POST
                && matches!(info.resources.last(), Some(UriResource::Action(_)));
            let delete_reference = *method == Method::DELETE
                && row == Row::References
                && options == [SystemQueryOptionKind::Id];
            if let Some(first) = options.first().filter(|_| !action && !delete_reference) {
                return Err(ValidationError::new(
                    ValidationMessageKey::SystemQueryOptionNotAllowedForHttpMethod,
                    &[first.name(), method.as_str()],
                ));
            }
        } else if row == Row::References && options.contains(&SystemQueryOptionKind::Id) {
            return Err(ValidationError::new(
                ValidationMessageKey::SystemQueryOptionNotAllowedForHttpMethod,
                &[SystemQueryOptionKind::Id.name(), method.as_str()],
            ));
        }
        match options.into_iter().find(|kind| !row.allows(*kind)) {
            Some(kind) => Err(ValidationError::new(
                ValidationMessageKey::SystemQueryOptionNotAllowed,
                &[kind.name()],
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ValidationMessageKey as Key;

    fn info(kind: UriInfoKind) -> UriInfo {
        UriInfo::new(kind)
    }

    #[test]
    fn test_table_rows() {
        assert!(Row::EntitySet.allows(SystemQueryOptionKind::Filter));
        assert!(!Row::EntitySet.allows(SystemQueryOptionKind::Id));
        assert!(!Row::Entity.allows(SystemQueryOptionKind::Filter));
        assert!(Row::Entity.allows(SystemQueryOptionKind::Expand));
        assert!(Row::EntityId.allows(SystemQueryOptionKind::Id));
        assert!(Row::References.allows(SystemQueryOptionKind::Id));
        assert!(!Row::References.allows(SystemQueryOptionKind::Select));
        assert!(!Row::PropertyComplexCollection.allows(SystemQueryOptionKind::Search));
        assert!(Row::PropertyPrimitiveCollectionCount.allows(SystemQueryOptionKind::Filter));
        assert!(!Row::PropertyPrimitiveCollectionCount.allows(SystemQueryOptionKind::Search));
        assert!(!Row::EntitySet.allows(SystemQueryOptionKind::Levels));
        for kind in COLUMNS {
            assert!(!Row::Batch.allows(kind));
            assert!(!Row::MediaStream.allows(kind));
        }
    }

    #[test]
    fn test_metadata_format_only() {
        let mut metadata = info(UriInfoKind::Metadata);
        metadata.options.format = Some(crate::query_option::Format::Xml);
        assert!(UriValidator::new().validate(&metadata, &Method::GET).is_ok());

        metadata.options.top = Some(1);
        let err = UriValidator::new().validate(&metadata, &Method::GET).unwrap_err();
        assert_eq!(err.key, Key::SystemQueryOptionNotAllowed);
        assert_eq!(err.params, vec!["$top"]);
    }

    #[test]
    fn test_method_pairing() {
        let validator = UriValidator::new();
        let batch = info(UriInfoKind::Batch);
        assert!(validator.validate(&batch, &Method::POST).is_ok());
        assert_eq!(
            validator.validate(&batch, &Method::GET).unwrap_err().key,
            Key::UnsupportedHttpMethod
        );
        let metadata = info(UriInfoKind::Metadata);
        assert_eq!(
            validator.validate(&metadata, &Method::DELETE).unwrap_err().key,
            Key::UnsupportedHttpMethod
        );
        let service = info(UriInfoKind::Service);
        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(validator.validate(&service, &method).is_ok());
        }
        assert_eq!(
            validator.validate(&service, &Method::HEAD).unwrap_err().status(),
            http::StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_options_with_other_methods() {
        let mut service = info(UriInfoKind::Service);
        service.options.format = Some(crate::query_option::Format::Json);
        let err = UriValidator::new().validate(&service, &Method::PUT).unwrap_err();
        assert_eq!(err.key, Key::SystemQueryOptionNotAllowedForHttpMethod);
        assert_eq!(err.params, vec!["$format", "PUT"]);
    }

    #[test]
    fn test_entity_id() {
        let mut entity_id = info(UriInfoKind::EntityId);
        entity_id.options.id = Some("ESAllPrim(1)".into());
        assert!(UriValidator::new().validate(&entity_id, &Method::GET).is_ok());
        entity_id.options.top = Some(2);
        assert_eq!(
            UriValidator::new().validate(&entity_id, &Method::GET).unwrap_err().key,
            Key::SystemQueryOptionNotAllowed
        );
    }
}

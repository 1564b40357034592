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

//! The type directory.
//!
//! Every getter has the same shape: rewrite an alias to its namespace,
//! look in the per-kind cache, on a miss ask the provider and store what
//! it materialized. A provider miss is never cached. Two threads racing
//! on the same miss both materialize; the first insert wins and both get
//! the cached instance.

use crate::container::EdmActionImport;
use crate::container::EdmEntityContainer;
use crate::container::EdmEntitySet;
use crate::container::EdmFunctionImport;
use crate::container::EdmNavigationPropertyBinding;
use crate::container::EdmSingleton;
use crate::csdl::CsdlAction;
use crate::csdl::CsdlAnnotations;
use crate::csdl::CsdlComplexType;
use crate::csdl::CsdlEntityContainer;
use crate::csdl::CsdlEntityType;
use crate::csdl::CsdlFunction;
use crate::csdl::CsdlNavigationProperty;
use crate::csdl::CsdlNavigationPropertyBinding;
use crate::csdl::CsdlParameter;
use crate::csdl::CsdlProperty;
use crate::csdl::CsdlPropertyRef;
use crate::csdl::CsdlReturnType;
use crate::csdl::CsdlSchema;
use crate::names::FullQualifiedName;
use crate::names::Namespace;
use crate::names::SimpleIdentifier;
use crate::names::TypeRef;
use crate::operation::EdmAction;
use crate::operation::EdmFunction;
use crate::operation::EdmOperation;
use crate::operation::EdmParameter;
use crate::operation::EdmReturnType;
use crate::operation::OperationKey;
use crate::primitive::EdmPrimitiveTypeKind;
use crate::provider::EdmProvider;
use crate::structured::EdmComplexType;
use crate::structured::EdmEntityType;
use crate::structured::EdmKeyProperty;
use crate::structured::EdmNavigationProperty;
use crate::structured::EdmProperty;
use crate::structured::EdmStructuredType;
use crate::structured::EdmTypeRef;
use crate::structured::IsCollection;
use crate::structured::IsNullable;
use crate::types::EdmAnnotation;
use crate::types::EdmAnnotationValue;
use crate::types::EdmAnnotations;
use crate::types::EdmEnumMember;
use crate::types::EdmEnumType;
use crate::types::EdmTerm;
use crate::types::EdmType;
use crate::types::EdmTypeDefinition;
use crate::Error;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::debug;
use tracing::trace;

/// All materialized elements of one schema.
#[derive(Debug)]
pub struct EdmSchema {
    pub namespace: Namespace,
    pub alias: Option<SimpleIdentifier>,
    pub entity_types: Vec<Arc<EdmEntityType>>,
    pub complex_types: Vec<Arc<EdmComplexType>>,
    pub enum_types: Vec<Arc<EdmEnumType>>,
    pub type_definitions: Vec<Arc<EdmTypeDefinition>>,
    pub terms: Vec<Arc<EdmTerm>>,
    pub actions: Vec<Arc<EdmAction>>,
    pub functions: Vec<Arc<EdmFunction>>,
    pub entity_container: Option<Arc<EdmEntityContainer>>,
    pub annotations: Vec<Arc<EdmAnnotations>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnnotationsKey {
    target: FullQualifiedName,
    qualifier: Option<String>,
}

impl Display for AnnotationsKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}#{qualifier}", self.target),
            None => Display::fmt(&self.target, f),
        }
    }
}

/// Lazy, cached, alias-aware directory of schema elements.
///
/// Built once per service metadata and shared (`Arc<Edm>`) by every
/// parse call.
pub struct Edm {
    provider: Arc<dyn EdmProvider>,
    aliases: OnceLock<HashMap<Namespace, Namespace>>,
    default_container: OnceLock<FullQualifiedName>,
    schemas: DashMap<Namespace, Arc<EdmSchema>>,
    entity_types: DashMap<FullQualifiedName, Arc<EdmEntityType>>,
    complex_types: DashMap<FullQualifiedName, Arc<EdmComplexType>>,
    enum_types: DashMap<FullQualifiedName, Arc<EdmEnumType>>,
    type_definitions: DashMap<FullQualifiedName, Arc<EdmTypeDefinition>>,
    terms: DashMap<FullQualifiedName, Arc<EdmTerm>>,
    containers: DashMap<FullQualifiedName, Arc<EdmEntityContainer>>,
    annotations: DashMap<AnnotationsKey, Arc<EdmAnnotations>>,
    actions: DashMap<OperationKey, Arc<EdmAction>>,
    functions: DashMap<OperationKey, Arc<EdmFunction>>,
    unbound_function_lists: DashMap<FullQualifiedName, Vec<Arc<EdmFunction>>>,
}

impl Debug for Edm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Edm")
            .field("entity_types", &self.entity_types.len())
            .field("complex_types", &self.complex_types.len())
            .field("containers", &self.containers.len())
            .field("actions", &self.actions.len())
            .field("functions", &self.functions.len())
            .finish_non_exhaustive()
    }
}

fn cached<K, V>(
    cache: &DashMap<K, Arc<V>>,
    key: K,
    what: &'static str,
    materialize: impl FnOnce(&K) -> Result<Option<V>, Error>,
) -> Result<Option<Arc<V>>, Error>
where
    K: Eq + Hash + Clone + Display,
{
    // The shard guard must be released before materializing: resolving
    // a base type re-enters the same cache.
    let hit = cache.get(&key).map(|v| Arc::clone(v.value()));
    if hit.is_some() {
        trace!(%key, what, "cache hit");
        return Ok(hit);
    }
    debug!(%key, what, "cache miss");
    let Some(value) = materialize(&key)? else {
        debug!(%key, what, "not found");
        return Ok(None);
    };
    Ok(Some(Arc::clone(
        cache.entry(key).or_insert_with(|| Arc::new(value)).value(),
    )))
}

fn register<T: EdmOperation>(
    cache: &DashMap<OperationKey, Arc<T>>,
    operations: Vec<T>,
) -> Result<Vec<Arc<T>>, Error> {
    operations
        .iter()
        .try_fold(HashSet::new(), |mut seen, op| {
            let key = op.overload_key();
            if seen.insert(key.clone()) {
                Ok(seen)
            } else {
                Err(Error::DuplicateOperation(key))
            }
        })?;
    Ok(operations
        .into_iter()
        .map(|op| {
            let key = op.overload_key();
            Arc::clone(cache.entry(key).or_insert_with(|| Arc::new(op)).value())
        })
        .collect())
}

impl Edm {
    #[must_use]
    pub fn new(provider: impl EdmProvider + 'static) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    #[must_use]
    pub fn with_provider(provider: Arc<dyn EdmProvider>) -> Self {
        Self {
            provider,
            aliases: OnceLock::new(),
            default_container: OnceLock::new(),
            schemas: DashMap::new(),
            entity_types: DashMap::new(),
            complex_types: DashMap::new(),
            enum_types: DashMap::new(),
            type_definitions: DashMap::new(),
            terms: DashMap::new(),
            containers: DashMap::new(),
            annotations: DashMap::new(),
            actions: DashMap::new(),
            functions: DashMap::new(),
            unbound_function_lists: DashMap::new(),
        }
    }

    fn alias_table(&self) -> Result<&HashMap<Namespace, Namespace>, Error> {
        if let Some(table) = self.aliases.get() {
            return Ok(table);
        }
        let table = self.provider.aliases()?.into_iter().collect::<HashMap<_, _>>();
        debug!(aliases = table.len(), "alias table built");
        Ok(self.aliases.get_or_init(|| table))
    }

    /// Namespace for an alias, or the namespace itself.
    ///
    /// # Errors
    ///
    /// Provider failure while building the alias table.
    pub fn resolve_namespace(&self, namespace: &Namespace) -> Result<Namespace, Error> {
        Ok(self
            .alias_table()?
            .get(namespace)
            .unwrap_or(namespace)
            .clone())
    }

    /// Name with an alias namespace replaced by the real one.
    ///
    /// # Errors
    ///
    /// Provider failure while building the alias table.
    pub fn resolve_alias(&self, name: &FullQualifiedName) -> Result<FullQualifiedName, Error> {
        if name.is_edm() {
            return Ok(name.clone());
        }
        Ok(self
            .alias_table()?
            .get(&name.namespace)
            .map_or_else(|| name.clone(), |ns| name.with_namespace(ns.clone())))
    }

    fn type_ref(&self, type_ref: &TypeRef) -> Result<EdmTypeRef, Error> {
        Ok(EdmTypeRef::new(
            self.resolve_alias(type_ref.type_name())?,
            type_ref.is_collection(),
        ))
    }

    /// Whole schema with every element materialized.
    ///
    /// # Errors
    ///
    /// Provider failure or schema defect in one of the elements.
    pub fn schema(&self, namespace: &Namespace) -> Result<Option<Arc<EdmSchema>>, Error> {
        let namespace = self.resolve_namespace(namespace)?;
        cached(&self.schemas, namespace, "schema", |namespace| {
            self.provider
                .schema(namespace)?
                .map(|schema| self.materialize_schema(schema))
                .transpose()
        })
    }

    fn materialize_schema(&self, schema: CsdlSchema) -> Result<EdmSchema, Error> {
        let ns = &schema.namespace;
        let qualify = |name: &SimpleIdentifier| FullQualifiedName::new(ns.clone(), name.clone());
        let action_names = schema.actions.iter().map(|a| &a.name).collect::<BTreeSet<_>>();
        let function_names = schema.functions.iter().map(|f| &f.name).collect::<BTreeSet<_>>();
        Ok(EdmSchema {
            namespace: ns.clone(),
            alias: schema.alias.clone(),
            entity_types: schema
                .entity_types
                .iter()
                .filter_map(|t| self.entity_type(&qualify(&t.name)).transpose())
                .collect::<Result<_, _>>()?,
            complex_types: schema
                .complex_types
                .iter()
                .filter_map(|t| self.complex_type(&qualify(&t.name)).transpose())
                .collect::<Result<_, _>>()?,
            enum_types: schema
                .enum_types
                .iter()
                .filter_map(|t| self.enum_type(&qualify(&t.name)).transpose())
                .collect::<Result<_, _>>()?,
            type_definitions: schema
                .type_definitions
                .iter()
                .filter_map(|t| self.type_definition(&qualify(&t.name)).transpose())
                .collect::<Result<_, _>>()?,
            terms: schema
                .terms
                .iter()
                .filter_map(|t| self.term(&qualify(&t.name)).transpose())
                .collect::<Result<_, _>>()?,
            actions: action_names
                .into_iter()
                .map(|name| self.actions_named(&qualify(name)))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .flatten()
                .collect(),
            functions: function_names
                .into_iter()
                .map(|name| self.functions_named(&qualify(name)))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .flatten()
                .collect(),
            entity_container: schema
                .entity_container
                .as_ref()
                .map(|c| self.entity_container(Some(&qualify(&c.name))))
                .transpose()?
                .flatten(),
            annotations: schema
                .annotations
                .iter()
                .filter_map(|group| {
                    group
                        .target
                        .parse::<FullQualifiedName>()
                        .ok()
                        .map(|target| (target, group.qualifier.as_deref()))
                })
                .filter_map(|(target, qualifier)| {
                    self.annotations_group(&target, qualifier).transpose()
                })
                .collect::<Result<_, _>>()?,
        })
    }

    /// # Errors
    ///
    /// Provider failure, unresolved or cyclic base type, unresolved key
    /// property.
    pub fn entity_type(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Option<Arc<EdmEntityType>>, Error> {
        let name = self.resolve_alias(name)?;
        self.entity_type_visiting(name, &mut Vec::new())
    }

    fn entity_type_visiting(
        &self,
        name: FullQualifiedName,
        visiting: &mut Vec<FullQualifiedName>,
    ) -> Result<Option<Arc<EdmEntityType>>, Error> {
        if visiting.contains(&name) {
            return Err(Error::CyclicBaseType(name));
        }
        cached(&self.entity_types, name, "entity type", |name| {
            let Some(csdl) = self.provider.entity_type(name)? else {
                return Ok(None);
            };
            visiting.push(name.clone());
            let resolved = self.materialize_entity_type(name, csdl, visiting);
            visiting.pop();
            resolved
                .map(Some)
                .map_err(|err| Error::EntityType(name.clone(), Box::new(err)))
        })
    }

    fn materialize_entity_type(
        &self,
        name: &FullQualifiedName,
        csdl: CsdlEntityType,
        visiting: &mut Vec<FullQualifiedName>,
    ) -> Result<EdmEntityType, Error> {
        let base = csdl
            .base_type
            .as_ref()
            .map(|base| {
                let base = self.resolve_alias(base)?;
                self.entity_type_visiting(base.clone(), visiting)?
                    .ok_or(Error::UnresolvedType(base))
            })
            .transpose()?;
        let mut entity_type = EdmEntityType {
            name: name.clone(),
            keys: Vec::new(),
            is_abstract: csdl.r#abstract,
            open_type: csdl.open_type,
            has_stream: csdl.has_stream,
            properties: self.properties(csdl.properties)?,
            navigation_properties: self.navigation_properties(csdl.navigation_properties)?,
            base,
        };
        entity_type.keys = if csdl.key.is_empty() {
            entity_type
                .base
                .as_ref()
                .map(|base| base.keys.clone())
                .unwrap_or_default()
        } else {
            csdl.key
                .iter()
                .map(|key| self.key_property(&entity_type, key))
                .collect::<Result<_, _>>()?
        };
        Ok(entity_type)
    }

    fn key_property(
        &self,
        entity_type: &EdmEntityType,
        key: &CsdlPropertyRef,
    ) -> Result<EdmKeyProperty, Error> {
        let unresolved = || Error::UnresolvedKeyProperty(key.name.clone());
        let path = key
            .name
            .split('/')
            .map(str::parse)
            .collect::<Result<Vec<SimpleIdentifier>, _>>()?;
        let (first, rest) = path.split_first().ok_or_else(unresolved)?;
        let first = entity_type
            .property(first.as_str())
            .cloned()
            .ok_or_else(unresolved)?;
        let property = rest.iter().try_fold(first, |property, segment| {
            self.complex_type(&property.type_ref.name)?
                .and_then(|complex| complex.property(segment.as_str()).cloned())
                .ok_or_else(unresolved)
        })?;
        Ok(EdmKeyProperty {
            name: key.alias.clone().unwrap_or_else(|| key.name.clone()),
            path,
            property,
        })
    }

    fn properties(&self, properties: Vec<CsdlProperty>) -> Result<Vec<EdmProperty>, Error> {
        properties
            .into_iter()
            .map(|p| {
                Ok(EdmProperty {
                    type_ref: self.type_ref(&p.ptype)?,
                    name: p.name,
                    nullable: IsNullable::new(p.nullable.unwrap_or(true)),
                    max_length: p.max_length,
                    precision: p.precision,
                    scale: p.scale,
                    default_value: p.default_value,
                })
            })
            .collect()
    }

    fn navigation_properties(
        &self,
        properties: Vec<CsdlNavigationProperty>,
    ) -> Result<Vec<EdmNavigationProperty>, Error> {
        properties
            .into_iter()
            .map(|p| {
                Ok(EdmNavigationProperty {
                    target: self.resolve_alias(p.ptype.type_name())?,
                    collection: IsCollection::new(p.ptype.is_collection()),
                    name: p.name,
                    nullable: IsNullable::new(p.nullable.unwrap_or(true)),
                    partner: p.partner,
                    contains_target: p.contains_target,
                })
            })
            .collect()
    }

    /// # Errors
    ///
    /// Provider failure, unresolved or cyclic base type.
    pub fn complex_type(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Option<Arc<EdmComplexType>>, Error> {
        let name = self.resolve_alias(name)?;
        self.complex_type_visiting(name, &mut Vec::new())
    }

    fn complex_type_visiting(
        &self,
        name: FullQualifiedName,
        visiting: &mut Vec<FullQualifiedName>,
    ) -> Result<Option<Arc<EdmComplexType>>, Error> {
        if visiting.contains(&name) {
            return Err(Error::CyclicBaseType(name));
        }
        cached(&self.complex_types, name, "complex type", |name| {
            let Some(csdl) = self.provider.complex_type(name)? else {
                return Ok(None);
            };
            visiting.push(name.clone());
            let resolved = self.materialize_complex_type(name, csdl, visiting);
            visiting.pop();
            resolved
                .map(Some)
                .map_err(|err| Error::ComplexType(name.clone(), Box::new(err)))
        })
    }

    fn materialize_complex_type(
        &self,
        name: &FullQualifiedName,
        csdl: CsdlComplexType,
        visiting: &mut Vec<FullQualifiedName>,
    ) -> Result<EdmComplexType, Error> {
        let base = csdl
            .base_type
            .as_ref()
            .map(|base| {
                let base = self.resolve_alias(base)?;
                self.complex_type_visiting(base.clone(), visiting)?
                    .ok_or(Error::UnresolvedType(base))
            })
            .transpose()?;
        Ok(EdmComplexType {
            name: name.clone(),
            base,
            is_abstract: csdl.r#abstract,
            open_type: csdl.open_type,
            properties: self.properties(csdl.properties)?,
            navigation_properties: self.navigation_properties(csdl.navigation_properties)?,
        })
    }

    /// # Errors
    ///
    /// Provider failure or non-primitive underlying type.
    pub fn enum_type(&self, name: &FullQualifiedName) -> Result<Option<Arc<EdmEnumType>>, Error> {
        let name = self.resolve_alias(name)?;
        cached(&self.enum_types, name, "enum type", |name| {
            let Some(csdl) = self.provider.enum_type(name)? else {
                return Ok(None);
            };
            let underlying_type = csdl
                .underlying_type
                .as_ref()
                .map_or(Some(EdmPrimitiveTypeKind::Int32), EdmPrimitiveTypeKind::from_fqn)
                .ok_or_else(|| {
                    Error::UnresolvedType(
                        csdl.underlying_type.clone().unwrap_or_else(|| name.clone()),
                    )
                })?;
            let members = csdl
                .members
                .into_iter()
                .zip(0..)
                .map(|(member, position)| EdmEnumMember {
                    value: member.value.unwrap_or(position),
                    name: member.name,
                })
                .collect();
            Ok(Some(EdmEnumType {
                name: name.clone(),
                underlying_type,
                is_flags: csdl.is_flags,
                members,
            }))
        })
    }

    /// # Errors
    ///
    /// Provider failure or non-primitive underlying type.
    pub fn type_definition(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Option<Arc<EdmTypeDefinition>>, Error> {
        let name = self.resolve_alias(name)?;
        cached(&self.type_definitions, name, "type definition", |name| {
            let Some(csdl) = self.provider.type_definition(name)? else {
                return Ok(None);
            };
            let underlying_type = EdmPrimitiveTypeKind::from_fqn(&csdl.underlying_type)
                .ok_or_else(|| Error::UnresolvedType(csdl.underlying_type.clone()))?;
            Ok(Some(EdmTypeDefinition {
                name: name.clone(),
                underlying_type,
                max_length: csdl.max_length,
                precision: csdl.precision,
                scale: csdl.scale,
            }))
        })
    }

    /// # Errors
    ///
    /// Provider failure.
    pub fn term(&self, name: &FullQualifiedName) -> Result<Option<Arc<EdmTerm>>, Error> {
        let name = self.resolve_alias(name)?;
        cached(&self.terms, name, "term", |name| {
            let Some(csdl) = self.provider.term(name)? else {
                return Ok(None);
            };
            Ok(Some(EdmTerm {
                name: name.clone(),
                type_ref: self.type_ref(&csdl.ttype)?,
                base_term: csdl
                    .base_term
                    .as_ref()
                    .map(|t| self.resolve_alias(t))
                    .transpose()?,
                applies_to: csdl
                    .applies_to
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(String::from)
                    .collect(),
                default_value: csdl.default_value,
                nullable: IsNullable::new(csdl.nullable.unwrap_or(true)),
            }))
        })
    }

    /// External annotations targeting `target`.
    ///
    /// # Errors
    ///
    /// Provider failure.
    pub fn annotations_group(
        &self,
        target: &FullQualifiedName,
        qualifier: Option<&str>,
    ) -> Result<Option<Arc<EdmAnnotations>>, Error> {
        let key = AnnotationsKey {
            target: self.resolve_alias(target)?,
            qualifier: qualifier.map(String::from),
        };
        cached(&self.annotations, key, "annotations", |key| {
            self.provider
                .annotations_group(&key.target, key.qualifier.as_deref())?
                .map(|group| self.materialize_annotations(key, group))
                .transpose()
        })
    }

    fn materialize_annotations(
        &self,
        key: &AnnotationsKey,
        group: CsdlAnnotations,
    ) -> Result<EdmAnnotations, Error> {
        Ok(EdmAnnotations {
            target: key.target.clone(),
            qualifier: key.qualifier.clone(),
            annotations: group
                .annotations
                .into_iter()
                .map(|a| {
                    let value = if let Some(v) = a.string {
                        EdmAnnotationValue::String(v)
                    } else if let Some(v) = a.bool {
                        EdmAnnotationValue::Bool(v)
                    } else if let Some(v) = a.int {
                        EdmAnnotationValue::Int(v)
                    } else if let Some(v) = a.enum_member {
                        EdmAnnotationValue::EnumMember(v)
                    } else {
                        EdmAnnotationValue::Default
                    };
                    Ok(EdmAnnotation {
                        term: self.resolve_alias(&a.term)?,
                        qualifier: a.qualifier,
                        value,
                    })
                })
                .collect::<Result<_, Error>>()?,
        })
    }

    /// Entity container by name, or the default container for `None`.
    ///
    /// # Errors
    ///
    /// Provider failure.
    pub fn entity_container(
        &self,
        name: Option<&FullQualifiedName>,
    ) -> Result<Option<Arc<EdmEntityContainer>>, Error> {
        if let Some(name) = name.or_else(|| self.default_container.get()) {
            let name = self.resolve_alias(name)?;
            return cached(&self.containers, name, "entity container", |name| {
                self.provider
                    .entity_container(Some(name))?
                    .map(|(name, container)| self.materialize_container(name, container))
                    .transpose()
            });
        }
        debug!("default entity container");
        let Some((name, container)) = self.provider.entity_container(None)? else {
            return Ok(None);
        };
        let name = self.resolve_alias(&name)?;
        let container = self.materialize_container(name.clone(), container)?;
        let container = Arc::clone(
            self.containers
                .entry(name.clone())
                .or_insert_with(|| Arc::new(container))
                .value(),
        );
        self.default_container.get_or_init(|| name);
        Ok(Some(container))
    }

    fn materialize_container(
        &self,
        name: FullQualifiedName,
        container: CsdlEntityContainer,
    ) -> Result<EdmEntityContainer, Error> {
        let bindings = |bindings: Vec<CsdlNavigationPropertyBinding>| {
            bindings
                .into_iter()
                .map(|b| EdmNavigationPropertyBinding {
                    path: b.path,
                    target: b.target,
                })
                .collect::<Vec<_>>()
        };
        Ok(EdmEntityContainer {
            entity_sets: container
                .entity_sets
                .into_iter()
                .map(|es| {
                    Ok(Arc::new(EdmEntitySet {
                        container: name.clone(),
                        entity_type: self.resolve_alias(&es.entity_type)?,
                        name: es.name,
                        navigation_bindings: bindings(es.navigation_property_bindings),
                        include_in_service_document: es.include_in_service_document.unwrap_or(true),
                    }))
                })
                .collect::<Result<_, Error>>()?,
            singletons: container
                .singletons
                .into_iter()
                .map(|s| {
                    Ok(Arc::new(EdmSingleton {
                        container: name.clone(),
                        entity_type: self.resolve_alias(&s.stype)?,
                        name: s.name,
                        navigation_bindings: bindings(s.navigation_property_bindings),
                    }))
                })
                .collect::<Result<_, Error>>()?,
            action_imports: container
                .action_imports
                .into_iter()
                .map(|ai| {
                    Ok(Arc::new(EdmActionImport {
                        action: self.resolve_alias(&ai.action)?,
                        name: ai.name,
                        entity_set: ai.entity_set,
                    }))
                })
                .collect::<Result<_, Error>>()?,
            function_imports: container
                .function_imports
                .into_iter()
                .map(|fi| {
                    Ok(Arc::new(EdmFunctionImport {
                        function: self.resolve_alias(&fi.function)?,
                        name: fi.name,
                        entity_set: fi.entity_set,
                        include_in_service_document: fi.include_in_service_document.unwrap_or(false),
                    }))
                })
                .collect::<Result<_, Error>>()?,
            name,
        })
    }

    fn parameters(&self, parameters: Vec<CsdlParameter>) -> Result<Vec<EdmParameter>, Error> {
        parameters
            .into_iter()
            .map(|p| {
                Ok(EdmParameter {
                    type_ref: self.type_ref(&p.ptype)?,
                    name: p.name,
                    nullable: IsNullable::new(p.nullable.unwrap_or(true)),
                })
            })
            .collect()
    }

    fn return_type(&self, return_type: &CsdlReturnType) -> Result<EdmReturnType, Error> {
        Ok(EdmReturnType {
            type_ref: self.type_ref(&return_type.rtype)?,
            nullable: IsNullable::new(return_type.nullable.unwrap_or(true)),
        })
    }

    fn materialize_action(
        &self,
        name: &FullQualifiedName,
        action: CsdlAction,
    ) -> Result<EdmAction, Error> {
        if action.is_bound && action.parameters.is_empty() {
            return Err(Error::NoBindingParameter(name.clone()));
        }
        Ok(EdmAction {
            name: name.clone(),
            is_bound: action.is_bound,
            entity_set_path: action.entity_set_path,
            return_type: action
                .return_type
                .as_ref()
                .map(|r| self.return_type(r))
                .transpose()?,
            parameters: self.parameters(action.parameters)?,
        })
    }

    fn materialize_function(
        &self,
        name: &FullQualifiedName,
        function: CsdlFunction,
    ) -> Result<EdmFunction, Error> {
        if function.is_bound && function.parameters.is_empty() {
            return Err(Error::NoBindingParameter(name.clone()));
        }
        Ok(EdmFunction {
            name: name.clone(),
            is_bound: function.is_bound,
            is_composable: function.is_composable,
            entity_set_path: function.entity_set_path,
            return_type: self.return_type(&function.return_type)?,
            parameters: self.parameters(function.parameters)?,
        })
    }

    fn actions_named(&self, name: &FullQualifiedName) -> Result<Vec<Arc<EdmAction>>, Error> {
        let actions = self
            .provider
            .actions(name)?
            .into_iter()
            .map(|a| self.materialize_action(name, a))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|actions| register(&self.actions, actions))
            .map_err(|err| Error::Operation(name.clone(), Box::new(err)))?;
        debug!(%name, overloads = actions.len(), "actions materialized");
        Ok(actions)
    }

    fn functions_named(&self, name: &FullQualifiedName) -> Result<Vec<Arc<EdmFunction>>, Error> {
        let functions = self
            .provider
            .functions(name)?
            .into_iter()
            .map(|f| self.materialize_function(name, f))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|functions| register(&self.functions, functions))
            .map_err(|err| Error::Operation(name.clone(), Box::new(err)))?;
        debug!(%name, overloads = functions.len(), "functions materialized");
        Ok(functions)
    }

    fn action(&self, key: &OperationKey) -> Result<Option<Arc<EdmAction>>, Error> {
        let hit = self.actions.get(key).map(|v| Arc::clone(v.value()));
        if hit.is_some() {
            trace!(%key, "action cache hit");
            return Ok(hit);
        }
        debug!(%key, "action cache miss");
        Ok(self
            .actions_named(&key.name)?
            .into_iter()
            .find(|a| a.overload_key() == *key))
    }

    fn function(&self, key: &OperationKey) -> Result<Option<Arc<EdmFunction>>, Error> {
        let hit = self.functions.get(key).map(|v| Arc::clone(v.value()));
        if hit.is_some() {
            trace!(%key, "function cache hit");
            return Ok(hit);
        }
        debug!(%key, "function cache miss");
        Ok(self
            .functions_named(&key.name)?
            .into_iter()
            .find(|f| f.overload_key() == *key))
    }

    /// Direct base of a structured type.
    fn base_type_name(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Option<FullQualifiedName>, Error> {
        if let Some(t) = self.entity_type(name)? {
            return Ok(t.base_type().map(|b| b.name().clone()));
        }
        Ok(self
            .complex_type(name)?
            .and_then(|t| t.base_type().map(|b| b.name().clone())))
    }

    /// Look up a bound operation, retrying with each base type of the
    /// binding type.
    fn bound_lookup<T>(
        &self,
        key: OperationKey,
        lookup: impl Fn(&Self, &OperationKey) -> Result<Option<Arc<T>>, Error>,
    ) -> Result<Option<Arc<T>>, Error> {
        let mut key = key;
        loop {
            if let Some(found) = lookup(self, &key)? {
                return Ok(Some(found));
            }
            let Some(binding) = &key.binding else {
                return Ok(None);
            };
            let Some(base) = self.base_type_name(&binding.type_name)? else {
                return Ok(None);
            };
            trace!(%key, %base, "trying base type");
            key = key.rebind(base);
        }
    }

    /// # Errors
    ///
    /// Provider failure or duplicate overload.
    pub fn unbound_action(&self, name: &FullQualifiedName) -> Result<Option<Arc<EdmAction>>, Error> {
        self.action(&OperationKey::unbound_action(self.resolve_alias(name)?))
    }

    /// Action bound to `binding_type` or to one of its base types.
    ///
    /// # Errors
    ///
    /// Provider failure or duplicate overload.
    pub fn bound_action(
        &self,
        name: &FullQualifiedName,
        binding_type: &FullQualifiedName,
        is_binding_collection: bool,
    ) -> Result<Option<Arc<EdmAction>>, Error> {
        let key = OperationKey::bound_action(
            self.resolve_alias(name)?,
            self.resolve_alias(binding_type)?,
            is_binding_collection,
        );
        self.bound_lookup(key, Self::action)
    }

    /// Every unbound overload of a function.
    ///
    /// # Errors
    ///
    /// Provider failure or duplicate overload.
    pub fn unbound_functions(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Vec<Arc<EdmFunction>>, Error> {
        let name = self.resolve_alias(name)?;
        let hit = self.unbound_function_lists.get(&name).map(|v| v.value().clone());
        if let Some(hit) = hit {
            trace!(%name, "function overloads cache hit");
            return Ok(hit);
        }
        let functions = self
            .functions_named(&name)?
            .into_iter()
            .filter(|f| !f.is_bound())
            .collect::<Vec<_>>();
        if !functions.is_empty() {
            self.unbound_function_lists.insert(name, functions.clone());
        }
        Ok(functions)
    }

    /// Unbound function overload with exactly these parameter names.
    ///
    /// # Errors
    ///
    /// Provider failure or duplicate overload.
    pub fn unbound_function<S: AsRef<str>>(
        &self,
        name: &FullQualifiedName,
        parameter_names: &[S],
    ) -> Result<Option<Arc<EdmFunction>>, Error> {
        self.function(&OperationKey::unbound_function(
            self.resolve_alias(name)?,
            parameter_names,
        ))
    }

    /// Function bound to `binding_type` (or a base type) with exactly
    /// these non-binding parameter names.
    ///
    /// # Errors
    ///
    /// Provider failure or duplicate overload.
    pub fn bound_function<S: AsRef<str>>(
        &self,
        name: &FullQualifiedName,
        binding_type: &FullQualifiedName,
        is_binding_collection: bool,
        parameter_names: &[S],
    ) -> Result<Option<Arc<EdmFunction>>, Error> {
        let key = OperationKey::bound_function(
            self.resolve_alias(name)?,
            self.resolve_alias(binding_type)?,
            is_binding_collection,
            parameter_names,
        );
        self.bound_lookup(key, Self::function)
    }

    /// Any type by name: primitive, entity, complex, enum or type
    /// definition.
    ///
    /// # Errors
    ///
    /// Provider failure or schema defect of the resolved type.
    pub fn resolve_type(&self, name: &FullQualifiedName) -> Result<Option<EdmType>, Error> {
        let name = self.resolve_alias(name)?;
        if name.is_edm() {
            return Ok(EdmPrimitiveTypeKind::from_fqn(&name).map(EdmType::Primitive));
        }
        if let Some(t) = self.entity_type(&name)? {
            return Ok(Some(EdmType::Entity(t)));
        }
        if let Some(t) = self.complex_type(&name)? {
            return Ok(Some(EdmType::Complex(t)));
        }
        if let Some(t) = self.enum_type(&name)? {
            return Ok(Some(EdmType::Enum(t)));
        }
        Ok(self.type_definition(&name)?.map(EdmType::Definition))
    }

    /// Types directly derived from `name`.
    ///
    /// # Errors
    ///
    /// Provider failure.
    pub fn derived_types(
        &self,
        name: &FullQualifiedName,
    ) -> Result<Vec<FullQualifiedName>, Error> {
        let name = self.resolve_alias(name)?;
        self.provider
            .derived_types(&name)?
            .iter()
            .map(|t| self.resolve_alias(t))
            .collect()
    }
}

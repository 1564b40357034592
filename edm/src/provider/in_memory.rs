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

use crate::csdl::CsdlAction;
use crate::csdl::CsdlAnnotations;
use crate::csdl::CsdlComplexType;
use crate::csdl::CsdlEntityContainer;
use crate::csdl::CsdlEntityType;
use crate::csdl::CsdlEnumType;
use crate::csdl::CsdlFunction;
use crate::csdl::CsdlSchema;
use crate::csdl::CsdlTerm;
use crate::csdl::CsdlTypeDefinition;
use crate::names::FullQualifiedName;
use crate::names::Namespace;
use crate::names::SimpleIdentifier;
use crate::provider::EdmProvider;
use crate::provider::ProviderError;
use crate::provider::ProviderResult;
use std::collections::HashMap;

/// Provider answering from a fixed set of schemas.
#[derive(Debug)]
pub struct InMemoryProvider {
    schemas: Vec<CsdlSchema>,
    index: HashMap<Namespace, usize>,
    aliases: HashMap<Namespace, Namespace>,
    /// Mapping from base types to the types directly derived from them.
    /// Built for complex and entity types.
    child_map: HashMap<FullQualifiedName, Vec<FullQualifiedName>>,
}

impl InMemoryProvider {
    /// Index the provided schemas. Schema order is kept: the first schema
    /// with an entity container holds the default container.
    #[must_use]
    pub fn new(schemas: Vec<CsdlSchema>) -> Self {
        let index = schemas
            .iter()
            .enumerate()
            .map(|(n, s)| (s.namespace.clone(), n))
            .collect();
        let aliases: HashMap<Namespace, Namespace> = schemas
            .iter()
            .filter_map(|s| {
                s.alias
                    .clone()
                    .map(|alias| (Namespace::from(alias), s.namespace.clone()))
            })
            .collect();
        let child_map = schemas.iter().fold(HashMap::new(), |map, s| {
            let entity_types = s
                .entity_types
                .iter()
                .filter_map(|et| et.base_type.as_ref().map(|base| (&et.name, base)));
            let complex_types = s
                .complex_types
                .iter()
                .filter_map(|ct| ct.base_type.as_ref().map(|base| (&ct.name, base)));
            entity_types
                .chain(complex_types)
                .fold(map, |mut map, (name, base)| {
                    let qname = FullQualifiedName::new(s.namespace.clone(), name.clone());
                    map.entry(resolve_alias(&aliases, base))
                        .or_insert_with(Vec::new)
                        .push(qname);
                    map
                })
        });
        Self {
            schemas,
            index,
            aliases,
            child_map,
        }
    }

    fn get(&self, namespace: &Namespace) -> Option<&CsdlSchema> {
        let namespace = self.aliases.get(namespace).unwrap_or(namespace);
        self.index.get(namespace).and_then(|n| self.schemas.get(*n))
    }

    fn find<T: Clone>(
        &self,
        name: &FullQualifiedName,
        items: impl Fn(&CsdlSchema) -> &[T],
        item_name: impl Fn(&T) -> &SimpleIdentifier,
    ) -> Option<T> {
        self.get(&name.namespace).and_then(|schema| {
            items(schema)
                .iter()
                .find(|item| *item_name(item) == name.name)
                .cloned()
        })
    }
}

fn resolve_alias(
    aliases: &HashMap<Namespace, Namespace>,
    name: &FullQualifiedName,
) -> FullQualifiedName {
    aliases
        .get(&name.namespace)
        .map_or_else(|| name.clone(), |ns| name.with_namespace(ns.clone()))
}

impl EdmProvider for InMemoryProvider {
    fn schemas(&self) -> Result<Vec<CsdlSchema>, ProviderError> {
        Ok(self.schemas.clone())
    }

    fn schema(&self, namespace: &Namespace) -> ProviderResult<CsdlSchema> {
        Ok(self.get(namespace).cloned())
    }

    fn entity_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlEntityType> {
        Ok(self.find(name, |s| &s.entity_types, |t| &t.name))
    }

    fn complex_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlComplexType> {
        Ok(self.find(name, |s| &s.complex_types, |t| &t.name))
    }

    fn enum_type(&self, name: &FullQualifiedName) -> ProviderResult<CsdlEnumType> {
        Ok(self.find(name, |s| &s.enum_types, |t| &t.name))
    }

    fn type_definition(&self, name: &FullQualifiedName) -> ProviderResult<CsdlTypeDefinition> {
        Ok(self.find(name, |s| &s.type_definitions, |t| &t.name))
    }

    fn term(&self, name: &FullQualifiedName) -> ProviderResult<CsdlTerm> {
        Ok(self.find(name, |s| &s.terms, |t| &t.name))
    }

    fn entity_container(
        &self,
        name: Option<&FullQualifiedName>,
    ) -> ProviderResult<(FullQualifiedName, CsdlEntityContainer)> {
        let with_name = |s: &CsdlSchema| {
            s.entity_container.as_ref().map(|c| {
                (
                    FullQualifiedName::new(s.namespace.clone(), c.name.clone()),
                    c.clone(),
                )
            })
        };
        Ok(match name {
            None => self.schemas.iter().find_map(with_name),
            Some(name) => self
                .get(&name.namespace)
                .and_then(with_name)
                .filter(|(fqn, _)| fqn.name == name.name),
        })
    }

    fn annotations_group(
        &self,
        target: &FullQualifiedName,
        qualifier: Option<&str>,
    ) -> ProviderResult<CsdlAnnotations> {
        Ok(self
            .schemas
            .iter()
            .flat_map(|s| s.annotations.iter())
            .find(|group| {
                group.qualifier.as_deref() == qualifier
                    && group
                        .target
                        .parse::<FullQualifiedName>()
                        .is_ok_and(|t| resolve_alias(&self.aliases, &t) == *target)
            })
            .cloned())
    }

    fn actions(&self, name: &FullQualifiedName) -> Result<Vec<CsdlAction>, ProviderError> {
        Ok(self
            .get(&name.namespace)
            .map(|s| {
                s.actions
                    .iter()
                    .filter(|a| a.name == name.name)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn functions(&self, name: &FullQualifiedName) -> Result<Vec<CsdlFunction>, ProviderError> {
        Ok(self
            .get(&name.namespace)
            .map(|s| {
                s.functions
                    .iter()
                    .filter(|f| f.name == name.name)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn derived_types(
        &self,
        base: &FullQualifiedName,
    ) -> Result<Vec<FullQualifiedName>, ProviderError> {
        Ok(self.child_map.get(base).cloned().unwrap_or_default())
    }
}

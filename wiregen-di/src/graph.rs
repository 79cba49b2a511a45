//! Core functionality for resolving requested types into a graph of services.
//!
//! Resolution is memoized by the identity of the requested type, so requesting the same type
//! multiple times (directly or as a dependency of other services) always yields the same
//! [ServiceNode]. This is also what lets two services share a common dependency.

use crate::catalog::{CapabilityType, Constructor, TypeCatalog, TypeIdentity};
use crate::error::GenerationError;
use crate::lifetime::Lifetime;
use crate::locator::locate_all;
use convert_case::{Case, Casing};
use derivative::Derivative;
use derive_more::Display;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use std::ops::Index;
use tracing::{debug, trace, warn};

/// Identifier of a node within a [ServiceGraph]. Ids are assigned in discovery order.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[display(fmt = "#{}", _0)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A resolved service: the chosen implementation for a requested type, its lifetime and its own
/// resolved constructor dependencies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceNode {
    /// The type originally asked for. Might be equal to the implementation.
    pub requested_type: TypeIdentity,

    /// Concrete type satisfying the request. Never abstract.
    pub implementation_type: TypeIdentity,

    pub lifetime: Lifetime,

    /// Constructor parameters of the implementation, in declaration order.
    pub dependencies: Vec<NodeId>,

    /// Unique name used for the field holding a shared instance.
    pub identifier: String,
}

impl ServiceNode {
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.lifetime == Lifetime::Shared
    }
}

/// Arena of [ServiceNode]s produced by a single resolution pass.
#[derive(Clone, Debug, Default)]
pub struct ServiceGraph {
    nodes: Vec<ServiceNode>,
    memo: FxHashMap<TypeIdentity, NodeId>,
    identifiers: FxHashSet<String>,
}

impl ServiceGraph {
    /// Resolves all requested types against given catalog.
    pub fn resolve<'a, I>(requested: I, catalog: &dyn TypeCatalog) -> Result<Self, GenerationError>
    where
        I: IntoIterator<Item = &'a TypeIdentity>,
    {
        let mut builder = GraphBuilder::new(catalog);
        for requested in requested {
            builder.resolve(requested)?;
        }

        Ok(builder.build())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ServiceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&ServiceNode> {
        self.nodes.get(id.0)
    }

    /// Returns the node created for given requested type.
    #[inline]
    pub fn node_id(&self, requested: &TypeIdentity) -> Option<NodeId> {
        self.memo.get(requested).copied()
    }

    #[inline]
    pub fn find(&self, requested: &TypeIdentity) -> Option<&ServiceNode> {
        self.node_id(requested).and_then(|id| self.get(id))
    }

    fn insert(
        &mut self,
        requested_type: TypeIdentity,
        implementation_type: TypeIdentity,
        lifetime: Lifetime,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let identifier = self.unique_identifier(&implementation_type);

        self.memo.insert(requested_type.clone(), id);
        self.nodes.push(ServiceNode {
            requested_type,
            implementation_type,
            lifetime,
            dependencies: vec![],
            identifier,
        });

        id
    }

    /// Drops all nodes discovered at or after given one.
    fn truncate(&mut self, id: NodeId) {
        for node in self.nodes.drain(id.0..) {
            self.memo.remove(&node.requested_type);
            self.identifiers.remove(&node.identifier);
        }
    }

    fn unique_identifier(&mut self, implementation: &TypeIdentity) -> String {
        let base = base_identifier(implementation);
        let identifier = if self.identifiers.contains(&base) {
            (2..)
                .map(|suffix| format!("{base}{suffix}"))
                .find(|candidate| !self.identifiers.contains(candidate))
                .unwrap_or_default()
        } else {
            base
        };

        self.identifiers.insert(identifier.clone());
        identifier
    }
}

impl Index<NodeId> for ServiceGraph {
    type Output = ServiceNode;

    #[inline]
    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.0]
    }
}

/// Derives a field name from the implementation name: lower case, with generic brackets,
/// nullability markers and other punctuation stripped.
pub fn base_identifier(implementation: &TypeIdentity) -> String {
    let words: String = implementation
        .simple_name()
        .chars()
        .map(|character| {
            if character.is_alphabetic() || character.is_ascii_digit() || character == '_' {
                character
            } else {
                ' '
            }
        })
        .collect();

    let identifier = words.to_case(Case::Flat);
    match identifier.chars().next() {
        None => "service".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{identifier}"),
        Some(_) => identifier,
    }
}

/// Selects the constructor used to create an implementation: among public constructors, the one
/// marked as primary wins, otherwise the first one declared. Returns `None` if there are no public
/// constructors - the type is then assumed to be default-constructible.
pub fn select_constructor(implementation: &CapabilityType) -> Option<&Constructor> {
    let mut public = implementation
        .constructors
        .iter()
        .filter(|constructor| constructor.is_public());

    let first = public.clone().next();
    public
        .find(|constructor| constructor.is_primary)
        .or(first)
}

/// Recursively builds a [ServiceGraph]. Nodes are inserted before their dependencies are
/// resolved and kept on a stack until finished, which is used to detect dependency cycles. A failed
/// resolution leaves the builder as it was before the call.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GraphBuilder<'a> {
    #[derivative(Debug = "ignore")]
    catalog: &'a dyn TypeCatalog,
    graph: ServiceGraph,
    under_construction: Vec<NodeId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog) -> Self {
        Self {
            catalog,
            graph: Default::default(),
            under_construction: vec![],
        }
    }

    /// Resolves given type into a service node, reusing the existing node if the type has already
    /// been resolved in this pass.
    pub fn resolve(&mut self, requested: &TypeIdentity) -> Result<NodeId, GenerationError> {
        if let Some(id) = self.graph.node_id(requested) {
            if let Some(position) = self
                .under_construction
                .iter()
                .position(|candidate| *candidate == id)
            {
                let chain = self.under_construction[position..]
                    .iter()
                    .map(|id| self.graph[*id].requested_type.clone())
                    .chain([requested.clone()])
                    .collect_vec();

                return Err(GenerationError::DependencyCycle { chain });
            }

            trace!(%requested, "Reusing already resolved service.");
            return Ok(id);
        }

        let catalog = self.catalog;
        let requested_type = catalog
            .find(requested)
            .ok_or_else(|| GenerationError::UnresolvedType(requested.clone()))?;

        let implementation = if requested_type.is_abstract {
            Self::locate_implementation(catalog, requested)?
        } else {
            requested_type
        };

        let lifetime = Lifetime::of(requested_type);
        let id = self
            .graph
            .insert(requested.clone(), implementation.identity.clone(), lifetime);

        self.under_construction.push(id);
        let dependencies = self.resolve_dependencies(implementation);
        self.under_construction.pop();

        // nodes discovered after this one are either its dependencies or already rolled back
        match dependencies {
            Ok(dependencies) => self.graph.nodes[id.0].dependencies = dependencies,
            Err(error) => {
                self.graph.truncate(id);
                return Err(error);
            }
        }

        debug!(
            %requested,
            implementation = %implementation.identity,
            %lifetime,
            "Resolved service."
        );

        Ok(id)
    }

    /// Finishes building and returns the resulting graph.
    #[inline]
    pub fn build(self) -> ServiceGraph {
        self.graph
    }

    fn locate_implementation<'c>(
        catalog: &'c dyn TypeCatalog,
        requested: &'c TypeIdentity,
    ) -> Result<&'c CapabilityType, GenerationError> {
        let mut candidates = locate_all(requested, catalog);
        let implementation = candidates
            .next()
            .ok_or_else(|| GenerationError::UnresolvedType(requested.clone()))?;

        let skipped = candidates.map(|ty| &ty.identity).join(", ");
        if !skipped.is_empty() {
            debug!(
                %requested,
                selected = %implementation.identity,
                %skipped,
                "Multiple implementations found - using the first one."
            );
        }

        Ok(implementation)
    }

    fn resolve_dependencies(
        &mut self,
        implementation: &CapabilityType,
    ) -> Result<Vec<NodeId>, GenerationError> {
        let Some(constructor) = select_constructor(implementation) else {
            if !implementation.constructors.is_empty() {
                warn!(
                    implementation = %implementation.identity,
                    "No public constructor found - assuming the type is default constructible."
                );
            }

            return Ok(vec![]);
        };

        constructor
            .parameters
            .iter()
            .map(|parameter| self.resolve(parameter))
            .collect()
    }
}

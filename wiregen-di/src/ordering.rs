//! Linearization of a [ServiceGraph] into an emission-safe sequence, in which every shared service
//! needed to construct a service comes before the service itself. Field initializers can then only
//! reference fields which have already been declared. Per-request services are constructed in
//! place, so only the shared services reachable through them matter.

use crate::error::GenerationError;
use crate::graph::{NodeId, ServiceGraph};
use fxhash::FxHashSet;
#[cfg(test)]
use mockall::automock;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

/// Decides the order in which services are emitted.
#[cfg_attr(test, automock)]
pub trait OrderingPolicy {
    fn order(&self, graph: &ServiceGraph) -> Result<Vec<NodeId>, GenerationError>;
}

/// Sorts services ascending by the number of their direct dependencies, keeping discovery order
/// for ties.
///
/// Note: dependency count is only a proxy for depth in the graph. It is correct for chains and
/// trees, but a service with few dependencies might still end up before one of its dependencies
/// with many dependencies, which the emitter then reports as a missing field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DependencyCountOrdering;

impl OrderingPolicy for DependencyCountOrdering {
    fn order(&self, graph: &ServiceGraph) -> Result<Vec<NodeId>, GenerationError> {
        let mut order: Vec<_> = graph.nodes().map(|(id, _)| id).collect();
        order.sort_by_key(|id| graph[*id].dependencies.len());
        Ok(order)
    }
}

/// Returns shared services whose fields have to be declared before given service can be
/// constructed. Per-request dependencies are walked through, since they are constructed in place.
pub fn required_fields(graph: &ServiceGraph, id: NodeId) -> FxHashSet<NodeId> {
    let mut required = FxHashSet::default();
    let mut visited = FxHashSet::default();
    let mut pending = graph[id].dependencies.clone();

    while let Some(dependency) = pending.pop() {
        if !visited.insert(dependency) {
            continue;
        }

        let node = &graph[dependency];
        if node.is_shared() {
            required.insert(dependency);
        } else {
            pending.extend(node.dependencies.iter().copied());
        }
    }

    required
}

/// Topological ordering using Kahn's algorithm. Among the services whose
/// [required fields](required_fields) have already been emitted, the one with the fewest direct
/// dependencies is picked next, with ties broken by discovery order. Per-request services are
/// never constrained, as nothing refers to them by name. Whenever [DependencyCountOrdering]
/// produces a valid order, this policy produces the very same one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TopologicalOrdering;

impl OrderingPolicy for TopologicalOrdering {
    fn order(&self, graph: &ServiceGraph) -> Result<Vec<NodeId>, GenerationError> {
        let mut pending = vec![0usize; graph.len()];
        let mut dependents = vec![vec![]; graph.len()];

        for (id, node) in graph.nodes() {
            if !node.is_shared() {
                continue;
            }

            let required = required_fields(graph, id);
            pending[id.index()] = required.len();
            for dependency in required {
                dependents[dependency.index()].push(id);
            }
        }

        let priority = |id: NodeId| Reverse((graph[id].dependencies.len(), id));

        let mut ready: BinaryHeap<_> = graph
            .nodes()
            .filter(|(id, _)| pending[id.index()] == 0)
            .map(|(id, _)| priority(id))
            .collect();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(Reverse((_, id))) = ready.pop() {
            trace!(requested = %graph[id].requested_type, "Ordering service.");
            order.push(id);

            for dependent in &dependents[id.index()] {
                let remaining = &mut pending[dependent.index()];
                *remaining -= 1;

                if *remaining == 0 {
                    ready.push(priority(*dependent));
                }
            }
        }

        if order.len() != graph.len() {
            return Err(GenerationError::DependencyCycle {
                chain: graph
                    .nodes()
                    .filter(|(id, _)| pending[id.index()] > 0)
                    .map(|(_, node)| node.requested_type.clone())
                    .collect(),
            });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CapabilityType, Catalog, Constructor, TypeIdentity};
    use crate::graph::ServiceGraph;
    use crate::ordering::{
        required_fields, DependencyCountOrdering, OrderingPolicy, TopologicalOrdering,
    };
    use fxhash::FxHashSet;

    fn resolve(catalog: &Catalog, requested: &[&str]) -> ServiceGraph {
        let requested: Vec<_> = requested.iter().map(|name| TypeIdentity::from(*name)).collect();
        ServiceGraph::resolve(&requested, catalog).unwrap()
    }

    fn requested_order(graph: &ServiceGraph, policy: &dyn OrderingPolicy) -> Vec<String> {
        policy
            .order(graph)
            .unwrap()
            .into_iter()
            .map(|id| graph[id].requested_type.to_string())
            .collect()
    }

    // A depends on X only, while X sits on top of a wide fan-out.
    fn create_fan_out_catalog() -> Catalog {
        Catalog::try_from_types([
            CapabilityType::concrete("A").with_constructor(Constructor::public(["X"])),
            CapabilityType::concrete("X").with_constructor(Constructor::public(["L1", "L2"])),
            CapabilityType::concrete("L1"),
            CapabilityType::concrete("L2"),
        ])
        .unwrap()
    }

    #[test]
    fn should_order_by_dependency_count() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("A").with_constructor(Constructor::public(["B"])),
            CapabilityType::concrete("B"),
            CapabilityType::concrete("C"),
        ])
        .unwrap();
        let graph = resolve(&catalog, &["A", "C"]);

        assert_eq!(
            requested_order(&graph, &DependencyCountOrdering),
            vec!["B", "C", "A"]
        );
    }

    #[test]
    fn should_match_dependency_count_order_when_valid() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("A").with_constructor(Constructor::public(["B"])),
            CapabilityType::concrete("B"),
            CapabilityType::concrete("C"),
            CapabilityType::concrete("D").with_constructor(Constructor::public(["A", "C"])),
        ])
        .unwrap();
        let graph = resolve(&catalog, &["D", "A", "C", "B"]);

        assert_eq!(
            requested_order(&graph, &TopologicalOrdering),
            requested_order(&graph, &DependencyCountOrdering)
        );
    }

    #[test]
    fn should_match_dependency_count_order_with_per_request_dependency() {
        let catalog = Catalog::try_from_types([
            CapabilityType::abstract_type("IBar"),
            CapabilityType::concrete("Bar")
                .implementing("IBar")
                .with_constructor(Constructor::public(["IFoo"])),
            CapabilityType::abstract_type("IFoo").transient(),
            CapabilityType::concrete("Foo")
                .implementing("IFoo")
                .with_constructor(Constructor::public(["L1", "L2"])),
            CapabilityType::concrete("L1"),
            CapabilityType::concrete("L2"),
        ])
        .unwrap();
        let graph = resolve(&catalog, &["IBar"]);

        assert_eq!(
            requested_order(&graph, &TopologicalOrdering),
            vec!["L1", "L2", "IBar", "IFoo"]
        );
        assert_eq!(
            requested_order(&graph, &TopologicalOrdering),
            requested_order(&graph, &DependencyCountOrdering)
        );
    }

    #[test]
    fn should_require_fields_behind_per_request_dependencies() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("Handler")
                .with_constructor(Constructor::public(["IRequest", "Clock"])),
            CapabilityType::abstract_type("IRequest").transient(),
            CapabilityType::concrete("Request")
                .implementing("IRequest")
                .with_constructor(Constructor::public(["Clock", "Settings"])),
            CapabilityType::concrete("Clock"),
            CapabilityType::concrete("Settings"),
        ])
        .unwrap();
        let graph = resolve(&catalog, &["Handler"]);

        let handler = graph.node_id(&"Handler".into()).unwrap();
        let request = graph.node_id(&"IRequest".into()).unwrap();
        let expected: FxHashSet<_> = [
            graph.node_id(&"Clock".into()).unwrap(),
            graph.node_id(&"Settings".into()).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(required_fields(&graph, handler), expected);
        assert_eq!(required_fields(&graph, request), expected);
    }

    #[test]
    fn should_misorder_fan_out_by_dependency_count() {
        let graph = resolve(&create_fan_out_catalog(), &["A"]);

        assert_eq!(
            requested_order(&graph, &DependencyCountOrdering),
            vec!["L1", "L2", "A", "X"]
        );
    }

    #[test]
    fn should_order_fan_out_topologically() {
        let graph = resolve(&create_fan_out_catalog(), &["A"]);

        assert_eq!(
            requested_order(&graph, &TopologicalOrdering),
            vec!["L1", "L2", "X", "A"]
        );
    }

    #[test]
    fn should_order_empty_graph() {
        let graph = ServiceGraph::default();

        assert!(TopologicalOrdering.order(&graph).unwrap().is_empty());
        assert!(DependencyCountOrdering.order(&graph).unwrap().is_empty());
    }
}

//! The complete resolution pass: requested types -> service graph -> order -> source text.

use crate::catalog::{TypeCatalog, TypeIdentity};
use crate::emitter::CodeEmitter;
use crate::error::GenerationError;
use crate::graph::ServiceGraph;
use crate::ordering::OrderingPolicy;
use tracing::info;

/// Runs a single resolution pass. Either the complete services class is returned, or the first
/// error encountered - there is no partial output.
pub fn synthesize(
    requested: &[TypeIdentity],
    catalog: &dyn TypeCatalog,
    ordering: &dyn OrderingPolicy,
    emitter: &CodeEmitter,
) -> Result<String, GenerationError> {
    info!(requested = requested.len(), "Resolving services...");

    let graph = ServiceGraph::resolve(requested, catalog)?;
    let order = ordering.order(&graph)?;

    info!(services = graph.len(), "Generating services class...");

    emitter.emit(&graph, &order)
}

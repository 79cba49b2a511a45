//! Static dependency injection graph resolution and initialization code synthesis.
//!
//! Given a list of requested service types and a [catalog](catalog::TypeCatalog) of known types,
//! the engine picks a concrete implementation for every request, resolves constructor
//! dependencies recursively into a [ServiceGraph](graph::ServiceGraph), decides on a
//! [Lifetime](lifetime::Lifetime) for each service, orders the services with an
//! [OrderingPolicy](ordering::OrderingPolicy) and finally renders a services class with the
//! [CodeEmitter](emitter::CodeEmitter).
//!
//! The whole pipeline is available as [synthesize](synthesis::synthesize).

pub mod catalog;
pub mod emitter;
mod error;
pub mod graph;
pub mod lifetime;
pub mod locator;
pub mod ordering;
pub mod synthesis;

pub use error::{Diagnostic, GenerationError, Severity};

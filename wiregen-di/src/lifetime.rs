//! Every service has a [Lifetime] deciding when its instance is created. [Shared](Lifetime::Shared)
//! services are constructed once and stored in a static field of the generated class, while
//! [PerRequest](Lifetime::PerRequest) ones are constructed anew at every point of use.
//!
//! Note: lifetime is decided by the *requested* type, not by the implementation. A shared service
//! depending on a per-request one gets a fresh instance of the dependency when it is constructed,
//! but that instance then lives as long as the shared service does.

use crate::catalog::CapabilityType;
use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, Default, Eq, PartialEq, Hash)]
pub enum Lifetime {
    /// One instance per generated class, reused by all dependents.
    #[default]
    Shared,
    /// A fresh instance at every use site.
    PerRequest,
}

impl Lifetime {
    /// Decides the lifetime for a service requested as the given type.
    #[inline]
    pub fn of(requested: &CapabilityType) -> Self {
        if requested.is_transient {
            Self::PerRequest
        } else {
            Self::Shared
        }
    }
}

//! Discovery of requested service types. Finding out which types a program asks for is tied to the
//! host's own source analysis (e.g. scanning for calls to the generated `Resolve<T>()` method), so
//! the generator only depends on the [RequestSource] abstraction.

use derive_more::Constructor;
#[cfg(test)]
use mockall::automock;
use wiregen_di::catalog::TypeIdentity;

/// Provides the types requested from the generated services class. Duplicates are allowed.
#[cfg_attr(test, automock)]
pub trait RequestSource {
    fn requested_types(&self) -> Vec<TypeIdentity>;
}

/// [RequestSource] returning a fixed list of types.
#[derive(Clone, Debug, Default, Constructor)]
pub struct StaticRequestSource {
    requested: Vec<TypeIdentity>,
}

impl<T: Into<TypeIdentity>> FromIterator<T> for StaticRequestSource {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            requested: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl RequestSource for StaticRequestSource {
    fn requested_types(&self) -> Vec<TypeIdentity> {
        self.requested.clone()
    }
}

//! Locating concrete implementations of abstract types.

use crate::catalog::{CapabilityType, TypeCatalog, TypeIdentity};

/// Returns all concrete types implementing given capability, in catalog order.
pub fn locate_all<'a>(
    capability: &'a TypeIdentity,
    catalog: &'a dyn TypeCatalog,
) -> impl Iterator<Item = &'a CapabilityType> + 'a {
    catalog
        .types()
        .iter()
        .filter(move |ty| !ty.is_abstract && ty.implements(capability))
}

/// Returns the first concrete type implementing given capability. The catalog order is never
/// changed, so ties are broken solely by it.
#[inline]
pub fn locate<'a>(
    capability: &'a TypeIdentity,
    catalog: &'a dyn TypeCatalog,
) -> Option<&'a CapabilityType> {
    locate_all(capability, catalog).next()
}

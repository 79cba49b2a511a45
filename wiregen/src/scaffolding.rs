//! Types the generated code relies on, which are not part of the user's program: the services
//! class itself and the two marker attributes. They are added to the catalog as ordinary entries
//! before resolution. The marker attributes are also emitted as sources alongside the generated
//! services class.

use tracing::debug;
use wiregen_di::catalog::{CapabilityType, Catalog, TypeCatalog, TypeIdentity};
use wiregen_di::GenerationError;

/// Hint name of the transient marker source.
pub const TRANSIENT_ATTRIBUTE_FILE: &str = "TransientAttribute.cs";

/// Hint name of the primary constructor marker source.
pub const PRIMARY_CONSTRUCTOR_ATTRIBUTE_FILE: &str = "PrimaryConstructorAttribute.cs";

/// Identities and source texts of the scaffolding types within a namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scaffolding {
    namespace: String,
    class_name: String,
}

impl Scaffolding {
    pub fn new<N, C>(namespace: N, class_name: C) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
        }
    }

    pub fn services_stub(&self) -> TypeIdentity {
        TypeIdentity::new(format!("{}.{}", self.namespace, self.class_name))
    }

    pub fn transient_attribute(&self) -> TypeIdentity {
        TypeIdentity::new(format!("{}.TransientAttribute", self.namespace))
    }

    pub fn primary_constructor_attribute(&self) -> TypeIdentity {
        TypeIdentity::new(format!("{}.PrimaryConstructorAttribute", self.namespace))
    }

    fn identities(&self) -> [TypeIdentity; 3] {
        [
            self.transient_attribute(),
            self.primary_constructor_attribute(),
            self.services_stub(),
        ]
    }

    /// Adds scaffolding types missing from the catalog.
    pub fn add_to(&self, catalog: &mut Catalog) -> Result<(), GenerationError> {
        for identity in self.identities() {
            if catalog.contains(&identity) {
                debug!(%identity, "Scaffolding type already present.");
                continue;
            }

            catalog.register(CapabilityType::concrete(identity))?;
        }

        Ok(())
    }

    /// Checks that every scaffolding type can be found in the catalog.
    pub fn verify(&self, catalog: &dyn TypeCatalog) -> Result<(), GenerationError> {
        self.identities()
            .into_iter()
            .try_for_each(|identity| match catalog.find(&identity) {
                Some(_) => Ok(()),
                None => Err(GenerationError::MissingScaffolding(identity)),
            })
    }

    pub fn transient_attribute_source(&self) -> String {
        format!(
            r#"
using System;

namespace {}
{{
    [AttributeUsage(AttributeTargets.Interface)]
    public class TransientAttribute : Attribute {{ }}
}}"#,
            self.namespace
        )
    }

    pub fn primary_constructor_attribute_source(&self) -> String {
        format!(
            r#"
using System;

namespace {}
{{
    [AttributeUsage(AttributeTargets.Constructor)]
    public class PrimaryConstructorAttribute : Attribute {{ }}
}}"#,
            self.namespace
        )
    }
}

//! Read-only view over the types known to the host. The host translates its own notion of a type
//! (symbols from a semantic model, a manifest file, etc.) into [CapabilityType]s, including all
//! marker information, so the rest of the engine never needs to know how markers are spelled.

use crate::error::GenerationError;
use derive_more::Display;
use fxhash::FxHashMap;

/// Identity of a type - its qualified name, e.g. `App.Services.IFoo`. Matching is always done by
/// identity, never by structure.
#[derive(Clone, Debug, Display, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeIdentity(String);

impl TypeIdentity {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the qualified name. Dots nested in generic arguments are not
    /// treated as separators, so `App.Repository<App.User>` yields `Repository<App.User>`.
    pub fn simple_name(&self) -> &str {
        let mut depth = 0usize;
        let mut start = 0;

        for (index, character) in self.0.char_indices() {
            match character {
                '<' | '[' | '(' => depth += 1,
                '>' | ']' | ')' => depth = depth.saturating_sub(1),
                '.' if depth == 0 => start = index + 1,
                _ => {}
            }
        }

        &self.0[start..]
    }
}

impl From<&str> for TypeIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Default)]
pub enum Accessibility {
    #[default]
    #[display(fmt = "public")]
    Public,
    #[display(fmt = "non-public")]
    NonPublic,
}

/// A constructor of a concrete type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Constructor {
    pub accessibility: Accessibility,

    /// Parameter types in declaration order.
    pub parameters: Vec<TypeIdentity>,

    /// Set when the constructor carries the primary constructor marker.
    pub is_primary: bool,
}

impl Constructor {
    pub fn public<I, T>(parameters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeIdentity>,
    {
        Self {
            accessibility: Accessibility::Public,
            parameters: parameters.into_iter().map(Into::into).collect(),
            is_primary: false,
        }
    }

    pub fn non_public<I, T>(parameters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeIdentity>,
    {
        Self {
            accessibility: Accessibility::NonPublic,
            ..Self::public(parameters)
        }
    }

    /// Marks this constructor as primary.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.accessibility == Accessibility::Public
    }
}

/// Minimal capability view of a host type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapabilityType {
    pub identity: TypeIdentity,

    /// Abstract types (interfaces, abstract classes) need an implementation to be located.
    pub is_abstract: bool,

    /// Set when the type carries the per-request (transient) marker.
    pub is_transient: bool,

    /// Identities of implemented capabilities, in declaration order.
    pub capabilities: Vec<TypeIdentity>,

    /// Constructors in declaration order.
    pub constructors: Vec<Constructor>,
}

impl CapabilityType {
    /// Creates an abstract type, e.g. an interface.
    pub fn abstract_type<T: Into<TypeIdentity>>(identity: T) -> Self {
        Self {
            identity: identity.into(),
            is_abstract: true,
            is_transient: false,
            capabilities: vec![],
            constructors: vec![],
        }
    }

    /// Creates a concrete, constructible type.
    pub fn concrete<T: Into<TypeIdentity>>(identity: T) -> Self {
        Self {
            is_abstract: false,
            ..Self::abstract_type(identity)
        }
    }

    /// Marks the type as per-request.
    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    pub fn implementing<T: Into<TypeIdentity>>(mut self, capability: T) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    #[inline]
    pub fn implements(&self, capability: &TypeIdentity) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Source of [CapabilityType]s. Enumeration order is defined by the catalog and is significant -
/// it decides which implementation wins when there is more than one.
pub trait TypeCatalog {
    /// Returns all known types in catalog order.
    fn types(&self) -> &[CapabilityType];

    /// Finds a type by its identity.
    fn find(&self, identity: &TypeIdentity) -> Option<&CapabilityType> {
        self.types().iter().find(|ty| &ty.identity == identity)
    }
}

/// In-memory [TypeCatalog] preserving registration order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    types: Vec<CapabilityType>,
    index: FxHashMap<TypeIdentity, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from given types, rejecting duplicated identities.
    pub fn try_from_types<I: IntoIterator<Item = CapabilityType>>(
        types: I,
    ) -> Result<Self, GenerationError> {
        let mut catalog = Self::new();
        for ty in types {
            catalog.register(ty)?;
        }

        Ok(catalog)
    }

    /// Appends a new type at the end of the catalog.
    pub fn register(&mut self, ty: CapabilityType) -> Result<(), GenerationError> {
        if self.index.contains_key(&ty.identity) {
            return Err(GenerationError::DuplicateType(ty.identity));
        }

        self.index.insert(ty.identity.clone(), self.types.len());
        self.types.push(ty);

        Ok(())
    }

    #[inline]
    pub fn contains(&self, identity: &TypeIdentity) -> bool {
        self.index.contains_key(identity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for Catalog {
    #[inline]
    fn types(&self) -> &[CapabilityType] {
        &self.types
    }

    #[inline]
    fn find(&self, identity: &TypeIdentity) -> Option<&CapabilityType> {
        self.index.get(identity).map(|index| &self.types[*index])
    }
}

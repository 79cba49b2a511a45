//! Host-neutral catalog description. A manifest lists the known types together with their marker
//! information, as well as the requested types, which makes it possible to drive the generator
//! from any tool able to write a JSON, TOML or YAML file.
//!
//! ```json
//! {
//!     "requests": ["App.IFoo", "App.IBar"],
//!     "types": [
//!         { "identity": "App.IFoo", "abstract": true, "transient": true },
//!         { "identity": "App.Foo", "implements": ["App.IFoo"] },
//!         { "identity": "App.IBar", "abstract": true },
//!         {
//!             "identity": "App.Bar",
//!             "implements": ["App.IBar"],
//!             "constructors": [{ "primary": true, "parameters": ["App.IFoo"] }]
//!         }
//!     ]
//! }
//! ```

use crate::discovery::RequestSource;
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use wiregen_di::catalog::{Accessibility, CapabilityType, Catalog, Constructor, TypeIdentity};
use wiregen_di::GenerationError;

fn default_public() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConstructorEntry {
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeEntry {
    pub identity: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub transient: bool,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub requests: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

impl Manifest {
    /// Loads a manifest file. The format is deduced from the file extension.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path))
            .build()
            .and_then(|config| config.try_deserialize())
    }

    /// Parses manifest text in given format.
    pub fn parse(text: &str, format: FileFormat) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(text, format))
            .build()
            .and_then(|config| config.try_deserialize())
    }

    /// Converts listed types into a [Catalog], keeping their order.
    pub fn to_catalog(&self) -> Result<Catalog, GenerationError> {
        Catalog::try_from_types(self.types.iter().map(|entry| CapabilityType {
            identity: TypeIdentity::new(entry.identity.as_str()),
            is_abstract: entry.is_abstract,
            is_transient: entry.transient,
            capabilities: entry
                .implements
                .iter()
                .map(|capability| TypeIdentity::new(capability.as_str()))
                .collect(),
            constructors: entry
                .constructors
                .iter()
                .map(|constructor| Constructor {
                    accessibility: if constructor.public {
                        Accessibility::Public
                    } else {
                        Accessibility::NonPublic
                    },
                    parameters: constructor
                        .parameters
                        .iter()
                        .map(|parameter| TypeIdentity::new(parameter.as_str()))
                        .collect(),
                    is_primary: constructor.primary,
                })
                .collect(),
        }))
    }
}

impl RequestSource for Manifest {
    fn requested_types(&self) -> Vec<TypeIdentity> {
        self.requests
            .iter()
            .map(|requested| TypeIdentity::new(requested.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::discovery::RequestSource;
    use crate::manifest::Manifest;
    use config::FileFormat;
    use wiregen_di::catalog::{Accessibility, TypeCatalog, TypeIdentity};
    use wiregen_di::GenerationError;

    const MANIFEST: &str = r#"{
        "requests": ["App.IFoo", "App.IBar"],
        "types": [
            { "identity": "App.IFoo", "abstract": true, "transient": true },
            { "identity": "App.Foo", "implements": ["App.IFoo"] },
            { "identity": "App.IBar", "abstract": true },
            {
                "identity": "App.Bar",
                "implements": ["App.IBar"],
                "constructors": [
                    { "parameters": [] },
                    { "primary": true, "parameters": ["App.IFoo"] },
                    { "public": false, "parameters": ["App.IBar"] }
                ]
            }
        ]
    }"#;

    #[test]
    fn should_convert_manifest_to_catalog() {
        let manifest = Manifest::parse(MANIFEST, FileFormat::Json).unwrap();
        let catalog = manifest.to_catalog().unwrap();

        assert_eq!(catalog.len(), 4);

        let foo = catalog.find(&"App.IFoo".into()).unwrap();
        assert!(foo.is_abstract);
        assert!(foo.is_transient);

        let bar = catalog.find(&"App.Bar".into()).unwrap();
        assert!(!bar.is_abstract);
        assert!(bar.implements(&"App.IBar".into()));
        assert_eq!(bar.constructors.len(), 3);
        assert!(bar.constructors[1].is_primary);
        assert_eq!(
            bar.constructors[1].parameters,
            vec![TypeIdentity::from("App.IFoo")]
        );
        assert_eq!(bar.constructors[2].accessibility, Accessibility::NonPublic);
    }

    #[test]
    fn should_provide_requested_types() {
        let manifest = Manifest::parse(MANIFEST, FileFormat::Json).unwrap();

        assert_eq!(
            manifest.requested_types(),
            vec![TypeIdentity::from("App.IFoo"), TypeIdentity::from("App.IBar")]
        );
    }

    #[test]
    fn should_reject_duplicate_types() {
        let manifest = Manifest::parse(
            r#"{ "types": [{ "identity": "App.Foo" }, { "identity": "App.Foo" }] }"#,
            FileFormat::Json,
        )
        .unwrap();

        assert_eq!(
            manifest.to_catalog().unwrap_err(),
            GenerationError::DuplicateType("App.Foo".into())
        );
    }

    #[test]
    fn should_parse_toml_manifest() {
        let manifest = Manifest::parse(
            r#"
            requests = ["Clock"]

            [[types]]
            identity = "Clock"
            "#,
            FileFormat::Toml,
        )
        .unwrap();

        assert!(manifest.requests.contains(&"Clock".to_string()));
        assert_eq!(manifest.types.len(), 1);
    }
}

//! Generator configuration is represented by [GeneratorConfig], which decides how the services
//! class is named and which [OrderingPolicy] is used.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by `wiregen.json` file or environment variables prefixed with `WIREGEN_`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use wiregen_di::emitter::EmitterOptions;
use wiregen_di::ordering::{DependencyCountOrdering, OrderingPolicy, TopologicalOrdering};

const CONFIG_ENV_PREFIX: &str = "WIREGEN";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "wiregen.json";

/// Strategy used to order services before emission.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Dependency-respecting topological order.
    #[default]
    Topological,
    /// Sort by the number of direct dependencies only.
    DependencyCount,
}

impl OrderingStrategy {
    pub fn policy(self) -> Box<dyn OrderingPolicy + Send + Sync> {
        match self {
            Self::Topological => Box::new(TopologicalOrdering),
            Self::DependencyCount => Box::new(DependencyCountOrdering),
        }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratorConfig {
    /// Namespace of the generated class and the scaffolding types.
    pub namespace: String,

    /// Name of the generated static class.
    pub class_name: String,

    /// Name of the generic dispatch method.
    pub resolve_method: String,

    /// Hint name of the generated services source.
    pub file_name: String,

    pub ordering: OrderingStrategy,

    /// Should a default tracing logger be installed when creating the generator.
    pub install_tracing_logger: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let emitter = EmitterOptions::default();
        Self {
            namespace: emitter.namespace,
            class_name: emitter.class_name,
            resolve_method: emitter.resolve_method,
            file_name: "DISourceGen.Services.cs".to_string(),
            ordering: Default::default(),
            install_tracing_logger: true,
        }
    }
}

impl From<OptionalGeneratorConfig> for GeneratorConfig {
    fn from(value: OptionalGeneratorConfig) -> Self {
        let default = Self::default();
        Self {
            namespace: value.namespace.unwrap_or(default.namespace),
            class_name: value.class_name.unwrap_or(default.class_name),
            resolve_method: value.resolve_method.unwrap_or(default.resolve_method),
            file_name: value.file_name.unwrap_or(default.file_name),
            ordering: value.ordering.unwrap_or(default.ordering),
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
        }
    }
}

impl GeneratorConfig {
    /// Reads the config from [CONFIG_FILE] and the environment, falling back to defaults for
    /// missing values.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX)),
        )
    }

    /// Reads the config from given file only.
    pub fn init_from_file(path: &str) -> Result<Self, ConfigError> {
        Self::init_from_builder(Config::builder().add_source(File::with_name(path)))
    }

    fn init_from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalGeneratorConfig>())
            .map(|config| config.into())
    }

    /// Options for the [CodeEmitter](wiregen_di::emitter::CodeEmitter).
    pub fn emitter_options(&self) -> EmitterOptions {
        EmitterOptions {
            namespace: self.namespace.clone(),
            class_name: self.class_name.clone(),
            resolve_method: self.resolve_method.clone(),
        }
    }
}

#[derive(Deserialize)]
struct OptionalGeneratorConfig {
    namespace: Option<String>,
    class_name: Option<String>,
    resolve_method: Option<String>,
    file_name: Option<String>,
    ordering: Option<OrderingStrategy>,
    install_tracing_logger: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{GeneratorConfig, OptionalGeneratorConfig, OrderingStrategy};
    use config::{Config, File, FileFormat};

    fn parse(json: &str) -> GeneratorConfig {
        GeneratorConfig::init_from_builder(
            Config::builder().add_source(File::from_str(json, FileFormat::Json)),
        )
        .unwrap()
    }

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config: GeneratorConfig = OptionalGeneratorConfig {
            namespace: Some("App.Generated".to_string()),
            class_name: None,
            resolve_method: None,
            file_name: None,
            ordering: None,
            install_tracing_logger: None,
        }
        .into();

        assert_eq!(config.namespace, "App.Generated");
        assert_eq!(config.class_name, "Services");
        assert_eq!(config.file_name, "DISourceGen.Services.cs");
        assert_eq!(config.ordering, OrderingStrategy::Topological);
        assert!(config.install_tracing_logger);
    }

    #[test]
    fn should_read_config_source() {
        let config = parse(
            r#"{
                "class_name": "Container",
                "resolve_method": "Get",
                "ordering": "dependency_count",
                "install_tracing_logger": false
            }"#,
        );

        assert_eq!(config.namespace, "DI");
        assert_eq!(config.class_name, "Container");
        assert_eq!(config.ordering, OrderingStrategy::DependencyCount);
        assert!(!config.install_tracing_logger);

        let options = config.emitter_options();
        assert_eq!(options.class_name, "Container");
        assert_eq!(options.resolve_method, "Get");
    }

    #[test]
    fn should_use_defaults_for_empty_source() {
        assert_eq!(parse("{}"), GeneratorConfig::default());
    }
}

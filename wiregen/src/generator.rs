//! Core generator functionality.

use crate::config::GeneratorConfig;
use crate::discovery::RequestSource;
use crate::logging::install_tracing_logger;
use crate::scaffolding::{Scaffolding, PRIMARY_CONSTRUCTOR_ATTRIBUTE_FILE, TRANSIENT_ATTRIBUTE_FILE};
use derivative::Derivative;
use derive_more::Constructor;
use tracing::{debug, error, info};
use wiregen_di::catalog::Catalog;
use wiregen_di::emitter::CodeEmitter;
use wiregen_di::ordering::OrderingPolicy;
use wiregen_di::synthesis::synthesize;
use wiregen_di::{Diagnostic, GenerationError};

/// A source file to be compiled together with the user's program.
#[derive(Clone, Debug, Eq, PartialEq, Constructor)]
pub struct GeneratedSource {
    pub hint_name: String,
    pub text: String,
}

/// Result of a single generator run: either all sources, or a single diagnostic explaining why
/// nothing was generated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneratorOutput {
    pub sources: Vec<GeneratedSource>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratorOutput {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finds a generated source by its hint name.
    pub fn source(&self, hint_name: &str) -> Option<&GeneratedSource> {
        self.sources
            .iter()
            .find(|source| source.hint_name == hint_name)
    }
}

/// Main entrypoint for generation. Holds no state between runs, so a single instance can serve
/// any number of independent compilation units.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    scaffolding: Scaffolding,
    emitter: CodeEmitter,
    #[derivative(Debug = "ignore")]
    ordering: Box<dyn OrderingPolicy + Send + Sync>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        if config.install_tracing_logger {
            if let Err(error) = install_tracing_logger() {
                debug!(%error, "Not installing tracing logger.");
            }
        }

        Self {
            scaffolding: Scaffolding::new(config.namespace.as_str(), config.class_name.as_str()),
            emitter: CodeEmitter::new(config.emitter_options()),
            ordering: config.ordering.policy(),
            config,
        }
    }

    /// Replaces the ordering policy chosen by the config.
    pub fn with_ordering(mut self, ordering: Box<dyn OrderingPolicy + Send + Sync>) -> Self {
        self.ordering = ordering;
        self
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the generator, converting any failure into a diagnostic. On failure, no sources are
    /// produced.
    pub fn execute(&self, catalog: Catalog, requests: &dyn RequestSource) -> GeneratorOutput {
        match self.build_services_class(catalog, requests) {
            Ok(services) => {
                info!(file = %self.config.file_name, "Generated services class.");

                GeneratorOutput {
                    sources: vec![
                        GeneratedSource::new(
                            TRANSIENT_ATTRIBUTE_FILE.to_string(),
                            self.scaffolding.transient_attribute_source(),
                        ),
                        GeneratedSource::new(
                            PRIMARY_CONSTRUCTOR_ATTRIBUTE_FILE.to_string(),
                            self.scaffolding.primary_constructor_attribute_source(),
                        ),
                        GeneratedSource::new(self.config.file_name.clone(), services),
                    ],
                    diagnostics: vec![],
                }
            }
            Err(error) => {
                error!(%error, "Generating services class failed.");

                GeneratorOutput {
                    sources: vec![],
                    diagnostics: vec![error.to_diagnostic()],
                }
            }
        }
    }

    /// Adds scaffolding types to the catalog and generates the services class for all requested
    /// types.
    pub fn build_services_class(
        &self,
        mut catalog: Catalog,
        requests: &dyn RequestSource,
    ) -> Result<String, GenerationError> {
        self.scaffolding.add_to(&mut catalog)?;
        self.scaffolding.verify(&catalog)?;

        let requested = requests.requested_types();
        synthesize(&requested, &catalog, self.ordering.as_ref(), &self.emitter)
    }
}

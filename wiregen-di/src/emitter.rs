//! Rendering of an ordered [ServiceGraph] into the source text of a static services class.
//!
//! The output consists of two parts:
//!
//! * a field for every shared service, initialized by calling the implementation's constructor
//! with previously declared fields as arguments,
//! * a generic `Resolve<T>()` method dispatching on the requested type, returning either the
//! cached field or a freshly constructed instance.
//!
//! Per-request services never get a field - a construction expression is inlined at every use
//! site instead, recursively applying the same rules to their own dependencies.

use crate::error::GenerationError;
use crate::graph::{NodeId, ServiceGraph, ServiceNode};
use derive_more::Constructor;
use fxhash::FxHashSet;
use itertools::Itertools;
use tracing::debug;

const INDENT: &str = "    ";

/// Identifiers which need escaping to be used as field names.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Names used in the generated class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmitterOptions {
    pub namespace: String,
    pub class_name: String,
    pub resolve_method: String,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            namespace: "DI".to_string(),
            class_name: "Services".to_string(),
            resolve_method: "Resolve".to_string(),
        }
    }
}

#[derive(Default)]
struct SourceWriter {
    text: String,
}

impl SourceWriter {
    fn line(&mut self, depth: usize, line: &str) {
        for _ in 0..depth {
            self.text.push_str(INDENT);
        }

        self.text.push_str(line);
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }
}

/// Renders services classes. Reads the graph only, never modifies it.
#[derive(Clone, Debug, Default, Constructor)]
pub struct CodeEmitter {
    options: EmitterOptions,
}

impl CodeEmitter {
    #[inline]
    pub fn options(&self) -> &EmitterOptions {
        &self.options
    }

    /// Renders the whole services class for services in given order.
    pub fn emit(&self, graph: &ServiceGraph, order: &[NodeId]) -> Result<String, GenerationError> {
        let mut writer = SourceWriter::default();

        writer.line(0, "// <auto-generated />");
        writer.line(0, "using System;");
        writer.blank();
        writer.line(0, &format!("namespace {}", self.options.namespace));
        writer.line(0, "{");
        writer.line(
            1,
            &format!("public static class {}", self.options.class_name),
        );
        writer.line(1, "{");

        let fields = self.emit_fields(graph, order, &mut writer)?;
        if !fields.is_empty() {
            writer.blank();
        }

        self.emit_dispatch(graph, order, &fields, &mut writer)?;

        writer.line(1, "}");
        writer.line(0, "}");

        debug!(
            services = order.len(),
            fields = fields.len(),
            "Emitted services class."
        );

        Ok(writer.text)
    }

    fn emit_fields(
        &self,
        graph: &ServiceGraph,
        order: &[NodeId],
        writer: &mut SourceWriter,
    ) -> Result<FxHashSet<NodeId>, GenerationError> {
        let mut fields = FxHashSet::default();

        for id in order {
            let node = &graph[*id];
            if !node.is_shared() || fields.contains(id) {
                continue;
            }

            let construction = construction_expression(graph, node, &fields)?;
            writer.line(
                2,
                &format!(
                    "private static {} {} = {};",
                    node.requested_type,
                    field_name(node),
                    construction
                ),
            );

            fields.insert(*id);
        }

        Ok(fields)
    }

    fn emit_dispatch(
        &self,
        graph: &ServiceGraph,
        order: &[NodeId],
        fields: &FxHashSet<NodeId>,
        writer: &mut SourceWriter,
    ) -> Result<(), GenerationError> {
        writer.line(
            2,
            &format!("public static T {}<T>()", self.options.resolve_method),
        );
        writer.line(2, "{");

        let mut dispatched = FxHashSet::default();
        let order = order
            .iter()
            .filter(|id| dispatched.insert(**id))
            .collect_vec();

        if order.is_empty() {
            writer.line(
                3,
                "throw new System.InvalidOperationException(\"This code is unreachable.\");",
            );
        }

        for (position, id) in order.iter().enumerate() {
            let node = &graph[**id];
            let instance = if node.is_shared() {
                field_name(node)
            } else {
                format!("({})", construction_expression(graph, node, fields)?)
            };

            let statement = format!("return (T)(object){instance};");

            // the last service acts as the unconditional fallback
            if position + 1 == order.len() {
                writer.line(3, &statement);
            } else {
                writer.line(
                    3,
                    &format!("if (typeof(T) == typeof({}))", node.requested_type),
                );
                writer.line(3, "{");
                writer.line(4, &statement);
                writer.line(3, "}");
                writer.blank();
            }
        }

        writer.line(2, "}");
        Ok(())
    }
}

/// Renders the identifier of a shared service as a field name, escaping reserved words.
pub fn field_name(node: &ServiceNode) -> String {
    if RESERVED_WORDS.contains(&node.identifier.as_str()) {
        format!("@{}", node.identifier)
    } else {
        node.identifier.clone()
    }
}

/// Renders `new Implementation(arguments)` for given service. Shared dependencies must already be
/// present in `fields`, while per-request ones are constructed in place.
pub fn construction_expression(
    graph: &ServiceGraph,
    node: &ServiceNode,
    fields: &FxHashSet<NodeId>,
) -> Result<String, GenerationError> {
    let arguments: Vec<String> = node
        .dependencies
        .iter()
        .map(|id| {
            let dependency = &graph[*id];
            if !dependency.is_shared() {
                construction_expression(graph, dependency, fields)
            } else if fields.contains(id) {
                Ok(field_name(dependency))
            } else {
                Err(GenerationError::MissingField {
                    identifier: dependency.identifier.clone(),
                    required_by: node.implementation_type.clone(),
                })
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(format!(
        "new {}({})",
        node.implementation_type,
        arguments.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CapabilityType, Catalog, Constructor, TypeIdentity};
    use crate::emitter::{CodeEmitter, EmitterOptions};
    use crate::error::GenerationError;
    use crate::graph::ServiceGraph;
    use crate::ordering::{DependencyCountOrdering, OrderingPolicy, TopologicalOrdering};

    fn resolve(catalog: &Catalog, requested: &[&str]) -> ServiceGraph {
        let requested: Vec<_> = requested.iter().map(|name| TypeIdentity::from(*name)).collect();
        ServiceGraph::resolve(&requested, catalog).unwrap()
    }

    fn emit(graph: &ServiceGraph) -> Result<String, GenerationError> {
        let order = TopologicalOrdering.order(graph).unwrap();
        CodeEmitter::default().emit(graph, &order)
    }

    #[test]
    fn should_emit_unreachable_dispatch_for_empty_graph() {
        let text = emit(&ServiceGraph::default()).unwrap();

        assert!(text.contains("public static T Resolve<T>()"));
        assert!(text.contains(
            "throw new System.InvalidOperationException(\"This code is unreachable.\");"
        ));
        assert!(!text.contains("private static"));
        assert!(!text.contains("return"));
    }

    #[test]
    fn should_emit_fields_for_shared_chain() {
        let catalog = Catalog::try_from_types([
            CapabilityType::abstract_type("IRepository"),
            CapabilityType::concrete("Repository").implementing("IRepository"),
            CapabilityType::abstract_type("IService"),
            CapabilityType::concrete("Service")
                .implementing("IService")
                .with_constructor(Constructor::public(["IRepository"])),
        ])
        .unwrap();
        let text = emit(&resolve(&catalog, &["IService"])).unwrap();

        let repository = text
            .find("private static IRepository repository = new Repository();")
            .unwrap();
        let service = text
            .find("private static IService service = new Service(repository);")
            .unwrap();
        assert!(repository < service);
    }

    #[test]
    fn should_inline_nested_per_request_dependencies() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("Clock"),
            CapabilityType::abstract_type("IRequest").transient(),
            CapabilityType::concrete("Request")
                .implementing("IRequest")
                .with_constructor(Constructor::public(["IContext"])),
            CapabilityType::abstract_type("IContext").transient(),
            CapabilityType::concrete("Context")
                .implementing("IContext")
                .with_constructor(Constructor::public(["Clock"])),
            CapabilityType::concrete("Handler").with_constructor(Constructor::public(["IRequest"])),
        ])
        .unwrap();
        let text = emit(&resolve(&catalog, &["Handler", "IRequest"])).unwrap();

        assert!(text.contains(
            "private static Handler handler = new Handler(new Request(new Context(clock)));"
        ));
        assert!(text.contains("return (T)(object)(new Request(new Context(clock)));"));
        assert!(!text.contains(" request "));
        assert!(!text.contains(" context "));
    }

    #[test]
    fn should_use_last_service_as_fallback() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("A"),
            CapabilityType::concrete("B"),
        ])
        .unwrap();
        let text = emit(&resolve(&catalog, &["A", "B"])).unwrap();

        assert!(text.contains("if (typeof(T) == typeof(A))"));
        assert!(!text.contains("typeof(B)"));
        assert!(text.contains("return (T)(object)b;"));
    }

    #[test]
    fn should_report_missing_field_for_invalid_order() {
        let catalog = Catalog::try_from_types([
            CapabilityType::concrete("A").with_constructor(Constructor::public(["X"])),
            CapabilityType::concrete("X").with_constructor(Constructor::public(["L1", "L2"])),
            CapabilityType::concrete("L1"),
            CapabilityType::concrete("L2"),
        ])
        .unwrap();
        let graph = resolve(&catalog, &["A"]);
        let order = DependencyCountOrdering.order(&graph).unwrap();

        assert_eq!(
            CodeEmitter::default().emit(&graph, &order).unwrap_err(),
            GenerationError::MissingField {
                identifier: "x".to_string(),
                required_by: "A".into(),
            }
        );
    }

    #[test]
    fn should_escape_reserved_identifiers() {
        let catalog = Catalog::try_from_types([CapabilityType::concrete("System.Object")]).unwrap();
        let text = emit(&resolve(&catalog, &["System.Object"])).unwrap();

        assert!(text.contains("private static System.Object @object = new System.Object();"));
        assert!(text.contains("return (T)(object)@object;"));
    }

    #[test]
    fn should_use_configured_names() {
        let emitter = CodeEmitter::new(EmitterOptions {
            namespace: "App.Generated".to_string(),
            class_name: "Container".to_string(),
            resolve_method: "Get".to_string(),
        });
        let text = emitter.emit(&ServiceGraph::default(), &[]).unwrap();

        assert!(text.contains("namespace App.Generated"));
        assert!(text.contains("public static class Container"));
        assert!(text.contains("public static T Get<T>()"));
    }
}

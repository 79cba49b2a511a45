//! Dependency injection source generator based on [wiregen_di].
//!
//! A program asks for services by calling a static `Resolve<T>()` method on a services class,
//! which does not exist until it is generated. This crate ties the resolution engine together with
//! everything needed to produce that class: the scaffolding types the generated code relies on,
//! configuration of the generated names, a pluggable [RequestSource](discovery::RequestSource) for
//! finding out which types are requested, and the [Generator](generator::Generator) itself, which
//! turns every failure into a single [Diagnostic](wiregen_di::Diagnostic) instead of partial
//! output.
//!
//! Catalogs can be built directly, or read from a [Manifest](manifest::Manifest) file.

pub mod config;
pub mod discovery;
pub mod generator;
pub mod logging;
pub mod manifest;
pub mod scaffolding;

//! The compiler pipeline.
//!
//! A validated [`Specification`] flows through three stages:
//! normalization into API IR, dependency analysis over the schema
//! registry, and assembly into a TypeScript module. [`generate`] wires
//! the stages together and renders the result.

pub mod api;
pub mod codegen;
pub mod compile;
pub mod emit;
pub mod graph;
pub mod naming;
pub mod normalize;
pub mod schema;
pub mod types;
pub mod utils;

use tracing::debug;

use crate::error::Error;
use crate::spec::Specification;

use self::codegen::CodegenOptions;
use self::emit::Emit;
use self::naming::NamingConfig;

/// Options for a single generation run.
#[derive(Debug, Default)]
pub struct GenerateOptions {
    /// Input path or URL, echoed into the output banner.
    pub source: String,
    /// Optional identifier naming configuration.
    pub naming: Option<NamingConfig>,
    /// Emit structural types alongside validators.
    pub explicit_types: bool,
}

/// Compile a specification into the generated client source text.
pub fn generate(spec: &Specification, options: &GenerateOptions) -> Result<String, Error> {
    let api = normalize::normalize_spec(spec, options.naming.as_ref());
    let graph = graph::analyze(&api.registry);
    debug!(
        schemas = api.registry.len(),
        operations = api.operations.len(),
        circular = graph.circular.len(),
        "analyzed document"
    );

    let module = codegen::assemble(
        &api,
        &graph,
        &CodegenOptions {
            source: options.source.clone(),
            explicit_types: options.explicit_types,
        },
    )?;
    Ok(module.emit())
}

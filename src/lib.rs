//! zodegen compiles an OpenAPI 3.x document into a single TypeScript
//! module: one zod validator per named schema and a client class with
//! one method per operation.
//!
//! The pipeline is linear and synchronous: read, parse, validate,
//! normalize, analyze, compile, assemble, write. See [`run`].

pub mod error;
pub mod ir;
pub mod reader;
pub mod spec;
pub mod writer;

use std::path::{Path, PathBuf};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use error::Error;
pub use ir::GenerateOptions;

fn is_plain_level(value: &str) -> bool {
    matches!(value, "trace" | "debug" | "info" | "warn" | "error")
}

/// Initialize logging to stderr.
///
/// `ZODEGEN_LOG` takes a plain level ("trace" through "error") or a
/// full tracing filter spec like `zodegen=debug`.
pub fn init_tracing() {
    let crate_root = module_path!().to_string();
    let filter = match std::env::var("ZODEGEN_LOG") {
        Ok(level) if is_plain_level(&level) => format!("{crate_root}={level}"),
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// One full compile run: load the document from `input`, generate the
/// client, and write it under `output`. Returns the written path.
pub fn run(input: &str, output: &Path, options: &GenerateOptions) -> Result<PathBuf, Error> {
    let spec = reader::load_specification(input)?;
    let text = ir::generate(&spec, options)?;
    writer::write_output(output, &text)
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;

use zodegen::GenerateOptions;
use zodegen::ir::naming::{NamingConfig, NamingConvention};

/// Generate a typed TypeScript client from an OpenAPI 3.x document.
#[derive(Parser)]
#[command(name = "zodegen", version, about)]
struct Cli {
    /// Path or URL of the document (JSON or YAML)
    #[arg(long)]
    input: String,

    /// Output directory for the generated client
    #[arg(long, default_value = "generated")]
    output: PathBuf,

    /// Casing applied to generated method names
    #[arg(long, value_enum)]
    naming_convention: Option<ConventionArg>,

    /// Emit structural types alongside validators
    #[arg(long)]
    explicit_types: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConventionArg {
    #[value(name = "camelCase")]
    Camel,
    #[value(name = "PascalCase")]
    Pascal,
    #[value(name = "snake_case")]
    Snake,
    #[value(name = "kebab-case")]
    Kebab,
    #[value(name = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    #[value(name = "SCREAMING-KEBAB-CASE")]
    ScreamingKebab,
}

impl From<ConventionArg> for NamingConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Camel => NamingConvention::CamelCase,
            ConventionArg::Pascal => NamingConvention::PascalCase,
            ConventionArg::Snake => NamingConvention::SnakeCase,
            ConventionArg::Kebab => NamingConvention::KebabCase,
            ConventionArg::ScreamingSnake => NamingConvention::ScreamingSnakeCase,
            ConventionArg::ScreamingKebab => NamingConvention::ScreamingKebabCase,
        }
    }
}

fn main() -> ExitCode {
    zodegen::init_tracing();
    let cli = Cli::parse();

    let options = GenerateOptions {
        source: cli.input.clone(),
        naming: cli
            .naming_convention
            .map(|c| NamingConfig::Convention(c.into())),
        explicit_types: cli.explicit_types,
    };

    match zodegen::run(&cli.input, &cli.output, &options) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

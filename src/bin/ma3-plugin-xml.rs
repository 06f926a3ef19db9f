//! CLI binary for ma3-plugin-xml.
//!
//! A thin shim over the library crate that maps workflow inputs (flags or
//! `INPUT_*` environment variables) to a run and turns a fatal failure into
//! a non-zero exit status.

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use ma3_plugin_xml::{
    run_and_report, ActionInputs, ArtifactSink, BuildConfig, ChunkUnit, Diagnostics, FsSource,
    HttpArtifactSink, TracingDiagnostics, WorkflowCommands,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Package one plugin
  ma3-plugin-xml --output-file plugins.xml \
    --plugins '[{"name": "Fade", "version": "1.0.0", "path": "fade.lua"}]'

  # Keep guids stable across releases
  ma3-plugin-xml -o plugins.xml --plugins '[{
      "name": "Fade", "version": "1.0.1", "path": "fade.lua",
      "pluginGuid": "C3 13 5E E5 B6 B5 10 02 15 9F 34 2F 14 B7 E5 8B",
      "luaGuid": "C3 13 5E E5 81 D3 10 02 EB 89 05 59 8F 53 BF 8B"}]'

  # Inside a CI job (inputs come from the environment)
  INPUT_PLUGINS="$(cat plugins.json)" INPUT_OUTPUTFILE=plugins.xml \
    INPUT_GENERATEARTIFACT=true MA3_ARTIFACT_URL=https://store.example.com/artifacts \
    ma3-plugin-xml

ENVIRONMENT VARIABLES:
  INPUT_PLUGINS           JSON array of plugin descriptors
  INPUT_OUTPUTFILE        Path of the XML file to write
  INPUT_GENERATEARTIFACT  "true" uploads the written file as an artifact
  MA3_ARTIFACT_URL        Artifact store endpoint
  MA3_ARTIFACT_TOKEN      Bearer token for the artifact store
  GITHUB_ACTIONS          "true" switches diagnostics to workflow commands
  RUST_LOG                Overrides the log filter
"#;

/// Package grandMA3 Lua plugins into a single XML document.
#[derive(Parser, Debug)]
#[command(
    name = "ma3-plugin-xml",
    version,
    about = "Package grandMA3 Lua plugins into a single XML document",
    long_about = "Reads a JSON array of plugin descriptors (name, version, Lua file path, \
optional guids) and writes the grandMA3 plugin XML with every Lua file embedded as \
base64 blocks. Optionally uploads the result as a build artifact.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON array of plugin descriptors.
    #[arg(long, env = "INPUT_PLUGINS")]
    plugins: String,

    /// Write the XML document to this file.
    #[arg(short, long, env = "INPUT_OUTPUTFILE")]
    output_file: PathBuf,

    /// "true" uploads the written file as an artifact; anything else skips it.
    #[arg(long, env = "INPUT_GENERATEARTIFACT", default_value = "false")]
    generate_artifact: String,

    /// Artifact store endpoint used when uploading.
    #[arg(long, env = "MA3_ARTIFACT_URL")]
    artifact_url: Option<String>,

    /// Bearer token for the artifact store.
    #[arg(long, env = "MA3_ARTIFACT_TOKEN", hide_env_values = true)]
    artifact_token: Option<String>,

    /// Artifact upload timeout in seconds.
    #[arg(long, env = "MA3_UPLOAD_TIMEOUT", default_value_t = 120)]
    upload_timeout: u64,

    /// DataVersion written on the GMA3 root element.
    #[arg(long, env = "MA3_DATA_VERSION", default_value = ma3_plugin_xml::MA3_DATA_VERSION)]
    data_version: String,

    /// Source units per Block element.
    #[arg(long, env = "MA3_BLOCK_SIZE", default_value_t = ma3_plugin_xml::BLOCK_SIZE)]
    block_size: usize,

    /// Cut blocks on byte or character boundaries.
    #[arg(long, env = "MA3_CHUNK_UNIT", value_enum, default_value = "bytes")]
    chunk_unit: ChunkUnitArg,

    /// Indentation width of the formatted document.
    #[arg(long, env = "MA3_INDENT", default_value_t = 4)]
    indent: usize,

    /// Reject descriptors with an empty name, version or path.
    #[arg(long, env = "MA3_STRICT", value_parser = FalseyValueParser::new())]
    strict: bool,

    /// Report through CI workflow commands (::debug:: / ::error::) on stdout.
    #[arg(long, env = "GITHUB_ACTIONS", value_parser = FalseyValueParser::new())]
    workflow_commands: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MA3_VERBOSE", value_parser = FalseyValueParser::new())]
    verbose: bool,

    /// Suppress all log output except errors.
    #[arg(short, long, env = "MA3_QUIET", value_parser = FalseyValueParser::new())]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ChunkUnitArg {
    Bytes,
    Chars,
}

impl From<ChunkUnitArg> for ChunkUnit {
    fn from(v: ChunkUnitArg) -> Self {
        match v {
            ChunkUnitArg::Bytes => ChunkUnit::Bytes,
            ChunkUnitArg::Chars => ChunkUnit::Chars,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    let artifacts: Option<HttpArtifactSink> = match cli.artifact_url {
        Some(ref url) if !url.is_empty() => Some(
            HttpArtifactSink::new(url, cli.artifact_token.clone(), config.upload_timeout_secs)
                .context("Invalid artifact store configuration")?,
        ),
        _ => None,
    };

    let diagnostics: Box<dyn Diagnostics> = if cli.workflow_commands {
        Box::new(WorkflowCommands::stdout())
    } else {
        Box::new(TracingDiagnostics)
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let inputs = ActionInputs::new(cli.plugins, cli.output_file, &cli.generate_artifact);

    let outcome = run_and_report(
        &inputs,
        &config,
        &FsSource,
        diagnostics.as_ref(),
        artifacts.as_ref().map(|s| s as &dyn ArtifactSink),
    );

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

/// Map CLI args to `BuildConfig`.
fn build_config(cli: &Cli) -> Result<BuildConfig> {
    BuildConfig::builder()
        .data_version(cli.data_version.clone())
        .block_size(cli.block_size)
        .chunk_unit(cli.chunk_unit.clone().into())
        .indent(cli.indent)
        .strict(cli.strict)
        .upload_timeout_secs(cli.upload_timeout)
        .build()
        .context("Invalid configuration")
}

//! # ma3-plugin-xml
//!
//! Package grandMA3 Lua plugins into the single XML document the console
//! imports.
//!
//! Each plugin descriptor (name, version, path to its Lua file, optional
//! guids) becomes one `UserPlugin` element; the Lua source is embedded as an
//! ordered sequence of base64 `Block`s.
//!
//! ## Pipeline Overview
//!
//! ```text
//! plugins JSON
//!  │
//!  ├─ 1. Input    parse descriptors (all-or-nothing)
//!  ├─ 2. Source   read each Lua file as bytes
//!  ├─ 3. Encode   cut into 1024-unit blocks, base64 each
//!  ├─ 4. Guid     fill in missing guids from a CSPRNG
//!  ├─ 5. Tree     GMA3 → UserPlugin → ComponentLua → FileContent → Block*
//!  └─ 6. Output   indented XML, written atomically, optionally uploaded
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ma3_plugin_xml::{convert, BuildConfig};
//!
//! let plugins = r#"[{"name": "Fade", "version": "1.0.0", "path": "fade.lua"}]"#;
//! let xml = convert(plugins, &BuildConfig::default())?;
//! println!("{xml}");
//! # Ok::<(), ma3_plugin_xml::PluginXmlError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ma3-plugin-xml` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod action;
pub mod artifact;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use action::{run, run_and_report, write_output, ActionInputs};
pub use artifact::{ArtifactSink, HttpArtifactSink, ARTIFACT_NAME};
pub use config::{BuildConfig, BuildConfigBuilder, ChunkUnit, BLOCK_SIZE, MA3_DATA_VERSION};
pub use convert::{build_xml, convert, DocumentBuilder};
pub use error::PluginXmlError;
pub use pipeline::input::{parse_descriptors, PluginDescriptor};
pub use pipeline::source::{ByteSource, FsSource};
pub use report::{Diagnostics, NoopDiagnostics, TracingDiagnostics, WorkflowCommands};

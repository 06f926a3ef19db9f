//! Run orchestration: inputs → XML file on disk → optional artifact.
//!
//! This is the single top-level boundary of a run. Every failure surfaces
//! here as one [`PluginXmlError`]; [`run_and_report`] forwards its message to
//! the fatal-failure channel exactly once. The output file is written
//! atomically as the last fallible step, so a failed run never leaves a file
//! behind.

use crate::artifact::{ArtifactSink, ARTIFACT_NAME};
use crate::config::BuildConfig;
use crate::convert::DocumentBuilder;
use crate::error::PluginXmlError;
use crate::pipeline::input::{parse_descriptors, validate_descriptors};
use crate::pipeline::source::ByteSource;
use crate::report::Diagnostics;
use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The three workflow inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    /// Raw JSON array of plugin descriptors.
    pub plugins: String,
    /// Where the XML document is written.
    pub output_file: PathBuf,
    /// Upload the written file as an artifact.
    pub generate_artifact: bool,
}

impl ActionInputs {
    /// Only the literal string `"true"` enables the upload.
    pub fn new(
        plugins: impl Into<String>,
        output_file: impl Into<PathBuf>,
        generate_artifact: &str,
    ) -> Self {
        Self {
            plugins: plugins.into(),
            output_file: output_file.into(),
            generate_artifact: generate_artifact == "true",
        }
    }
}

/// Execute one run.
///
/// Debug messages, in order: the raw input, the generated XML, the
/// destination path, and (when uploading) the upload notice.
pub fn run(
    inputs: &ActionInputs,
    config: &BuildConfig,
    source: &dyn ByteSource,
    diagnostics: &dyn Diagnostics,
    artifacts: Option<&dyn ArtifactSink>,
) -> Result<(), PluginXmlError> {
    diagnostics.debug(&format!("Received input: {}", inputs.plugins));

    let plugins = parse_descriptors(&inputs.plugins)?;
    if config.strict {
        validate_descriptors(&plugins)?;
    }

    let xml = DocumentBuilder::new(config, source, rand::rng()).build(&plugins)?;
    diagnostics.debug(&format!("Generated XML file:\n{xml}"));

    diagnostics.debug(&format!(
        "Saving to \"{}\"...",
        inputs.output_file.display()
    ));
    write_output(&inputs.output_file, &xml)?;
    info!(
        "Wrote {} plugin(s) to {}",
        plugins.len(),
        inputs.output_file.display()
    );

    if inputs.generate_artifact {
        diagnostics.debug("Uploading file as artifact...");
        upload(&inputs.output_file, artifacts);
    }

    Ok(())
}

/// [`run`], then report a failure on the fatal-failure channel.
///
/// The reported message is the error's `Display` text; the error is still
/// returned so the caller can pick an exit status.
pub fn run_and_report(
    inputs: &ActionInputs,
    config: &BuildConfig,
    source: &dyn ByteSource,
    diagnostics: &dyn Diagnostics,
    artifacts: Option<&dyn ArtifactSink>,
) -> Result<(), PluginXmlError> {
    run(inputs, config, source, diagnostics, artifacts).inspect_err(|e| {
        diagnostics.set_failed(&e.to_string());
    })
}

/// Write `xml` to `path`, replacing any existing file.
///
/// Atomic: written to a temp file in the destination directory, synced, then
/// renamed. An existing file keeps its permissions; a new file is created
/// world-readable (`0644` on Unix) since it is a release artifact.
pub fn write_output(path: &Path, xml: &str) -> Result<(), PluginXmlError> {
    let write_failed = |source: std::io::Error| PluginXmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(xml.as_bytes()).map_err(write_failed)?;
    if let Some(permissions) = output_permissions(path) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(write_failed)?;
    }
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}

/// Permissions for the output file: those of the file being replaced, or the
/// platform default for a new file.
fn output_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

/// Best-effort upload; failures are logged, never returned.
fn upload(output_file: &Path, artifacts: Option<&dyn ArtifactSink>) {
    let Some(sink) = artifacts else {
        warn!("Artifact upload requested but no artifact endpoint is configured; skipping");
        return;
    };

    let files = [output_file.to_path_buf()];
    if let Err(e) = sink.upload(ARTIFACT_NAME, &files, Path::new(".")) {
        warn!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_literal_true_enables_upload() {
        assert!(ActionInputs::new("[]", "out.xml", "true").generate_artifact);
        for value in ["false", "True", "TRUE", "1", "yes", ""] {
            assert!(
                !ActionInputs::new("[]", "out.xml", value).generate_artifact,
                "{value:?}"
            );
        }
    }

    #[test]
    fn write_output_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.xml");
        std::fs::write(&path, "old").unwrap();

        write_output(&path, "<GMA3/>\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<GMA3/>\n");
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn new_output_file_is_world_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.xml");

        write_output(&path, "<GMA3/>\n").unwrap();
        assert_eq!(mode(&path), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn replaced_output_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for existing in [0o644, 0o640] {
            let path = dir.path().join(format!("plugins-{existing:o}.xml"));
            std::fs::write(&path, "old").unwrap();
            std::fs::set_permissions(&path, Permissions::from_mode(existing)).unwrap();

            write_output(&path, "<GMA3/>\n").unwrap();
            assert_eq!(mode(&path), existing);
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "<GMA3/>\n");
        }
    }

    #[test]
    fn failure_without_diagnostics_still_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.xml");
        let inputs = ActionInputs::new("{not json", &path, "false");

        let result = run_and_report(
            &inputs,
            &BuildConfig::default(),
            &crate::pipeline::source::FsSource,
            &crate::report::NoopDiagnostics,
            None,
        );
        assert!(matches!(result, Err(PluginXmlError::MalformedInput { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn write_output_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/plugins.xml");
        let err = write_output(&path, "x").unwrap_err();
        assert!(
            err.to_string().starts_with("Unable to write output file"),
            "got: {err}"
        );
        assert!(!path.exists());
    }
}

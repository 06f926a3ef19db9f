//! Artifact upload: hand the generated XML to an external store.
//!
//! Uploading is optional and best-effort. [`crate::action::run`] calls the
//! sink once after the output file is on disk and only logs a failure, so an
//! unreachable store never fails a build that already produced its file.

use crate::error::PluginXmlError;
use reqwest::blocking::Client;
use reqwest::Url;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Archive name used for the generated plugin file.
pub const ARTIFACT_NAME: &str = "MA3 Plugins Release";

/// Destination for build artifacts.
pub trait ArtifactSink {
    /// Upload `files` as one artifact called `name`.
    ///
    /// Paths inside the artifact are taken relative to `root_dir`.
    fn upload(&self, name: &str, files: &[PathBuf], root_dir: &Path) -> Result<(), PluginXmlError>;
}

/// Uploads each file with an HTTP `PUT` to `<endpoint>/<name>/<relative path>`.
#[derive(Debug)]
pub struct HttpArtifactSink {
    endpoint: Url,
    token: Option<String>,
    client: Client,
}

impl HttpArtifactSink {
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, PluginXmlError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            PluginXmlError::InvalidConfig(format!("Invalid artifact URL '{endpoint}': {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(PluginXmlError::InvalidConfig(format!(
                "Artifact URL '{endpoint}' cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PluginXmlError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    /// Target URL for `file` inside artifact `name`.
    pub fn file_url(&self, name: &str, file: &Path, root_dir: &Path) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
            for part in relative_components(file, root_dir) {
                segments.push(&part);
            }
        }
        url
    }
}

impl ArtifactSink for HttpArtifactSink {
    fn upload(&self, name: &str, files: &[PathBuf], root_dir: &Path) -> Result<(), PluginXmlError> {
        let failed = |reason: String| PluginXmlError::ArtifactUploadFailed {
            name: name.to_string(),
            reason,
        };

        for file in files {
            let body = std::fs::read(file)
                .map_err(|e| failed(format!("cannot read '{}': {e}", file.display())))?;
            let url = self.file_url(name, file, root_dir);
            debug!("PUT {} ({} bytes)", url, body.len());

            let mut request = self
                .client
                .put(url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/xml")
                .body(body);
            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().map_err(|e| failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP {} from {}", response.status(), url)));
            }
        }

        info!("Uploaded {} file(s) as artifact '{}'", files.len(), name);
        Ok(())
    }
}

/// Path components of `file` relative to `root_dir`, falling back to the file name.
fn relative_components(file: &Path, root_dir: &Path) -> Vec<String> {
    let file = file.strip_prefix("./").unwrap_or(file);
    let root = root_dir.strip_prefix("./").unwrap_or(root_dir);

    let relative = if root.as_os_str().is_empty() || root == Path::new(".") {
        Some(file)
    } else {
        file.strip_prefix(root).ok()
    };

    match relative {
        Some(rel) if rel.components().all(|c| matches!(c, Component::Normal(_))) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect(),
        _ => file
            .file_name()
            .map(|n| vec![n.to_string_lossy().into_owned()])
            .unwrap_or_default(),
    }
}

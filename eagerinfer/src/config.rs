use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schema::{
    normalize_domain, EAGER_MS_OPSET_VERSION, EAGER_ONNX_OPSET_VERSION, MS_DOMAIN, ONNX_DOMAIN,
};

/// Where the version used for kernel matching comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    /// Each domain uses its pinned baseline opset; the caller's version is
    /// only reported in errors.
    #[default]
    OpsetBaseline,
    /// The caller's version replaces the baseline of the requested domain.
    Caller,
}

fn default_domain_versions() -> HashMap<String, i32> {
    HashMap::from([
        (ONNX_DOMAIN.to_string(), EAGER_ONNX_OPSET_VERSION),
        (MS_DOMAIN.to_string(), EAGER_MS_OPSET_VERSION),
    ])
}

/// Settings of a [`crate::KernelInvoker`].
///
/// # Example
/// ```no_run
/// # use eagerinfer::{InvokerConfig, VersionSource};
/// # fn main() -> anyhow::Result<()> {
/// let config = InvokerConfig::from_json_str(r#"{ "version_source": "caller" }"#)?;
/// assert_eq!(config.version_source, VersionSource::Caller);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Opset imported per domain.
    pub domain_versions: HashMap<String, i32>,
    pub version_source: VersionSource,
    /// Resolve kernels through their persisted identity hash.
    pub resolve_by_kernel_hash: bool,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            domain_versions: default_domain_versions(),
            version_source: VersionSource::default(),
            resolve_by_kernel_hash: false,
        }
    }
}

impl InvokerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| "failed to parse invoker config")
    }

    /// Import `domain` at `version`, replacing any previous entry.
    pub fn with_domain(mut self, domain: &str, version: i32) -> Self {
        self.domain_versions
            .insert(normalize_domain(domain).to_string(), version);
        self
    }

    pub fn with_version_source(mut self, source: VersionSource) -> Self {
        self.version_source = source;
        self
    }

    pub fn with_kernel_hash_resolution(mut self, enabled: bool) -> Self {
        self.resolve_by_kernel_hash = enabled;
        self
    }

    /// Opset map for a call on `domain` with the caller's `version`.
    ///
    /// Under [`VersionSource::Caller`] the version replaces the baseline of a
    /// known domain. Unknown domains are never added.
    pub fn domain_versions_for(&self, domain: &str, version: i32) -> HashMap<String, i32> {
        let mut versions: HashMap<String, i32> = self
            .domain_versions
            .iter()
            .map(|(name, version)| (normalize_domain(name).to_string(), *version))
            .collect();
        if self.version_source == VersionSource::Caller {
            if let Some(slot) = versions.get_mut(normalize_domain(domain)) {
                *slot = version;
            }
        }
        versions
    }
}

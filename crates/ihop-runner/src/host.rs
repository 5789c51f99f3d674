//! # Host Identity
//!
//! Operating system and toolchain facts reported in the `start` response
//! alongside the backend's own identity.

use ihop_core::Implementation;
use ihop_schema::{BackendInfo, ValidatorBackend};

/// Facts about the machine and toolchain running the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Operating system family.
    pub os: String,
    /// Operating system release.
    pub os_version: String,
    /// Compiler version the harness was built with.
    pub language_version: String,
}

impl HostInfo {
    /// Detect the running OS and the compiler this harness was built with.
    pub fn detect() -> Self {
        let os = os_info::get();
        Self {
            os: os.os_type().to_string(),
            os_version: os.version().to_string(),
            language_version: rustc_version_runtime::version().to_string(),
        }
    }

    /// Combine with a backend's identity into the `start` payload.
    pub fn implementation<B: ValidatorBackend>(&self, backend: &B) -> Implementation {
        let BackendInfo {
            name,
            version,
            homepage,
            documentation,
            issues,
            source,
            links,
        } = backend.info();
        Implementation {
            language: "rust".to_string(),
            name,
            version,
            dialects: backend
                .supported_dialects()
                .iter()
                .map(|d| d.uri().to_string())
                .collect(),
            homepage,
            documentation,
            issues,
            source,
            os: self.os.clone(),
            os_version: self.os_version.clone(),
            language_version: self.language_version.clone(),
            links,
        }
    }
}

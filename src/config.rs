//! Fixed locations of the managed payload. Both files are expected to sit
//! next to the host executable.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::HostError;

pub const ASSEMBLY_FILE_NAME: &str = "ManagedLibrary.dll";
pub const RUNTIME_CONFIG_FILE_NAME: &str = "ManagedLibrary.runtimeconfig.json";
pub const ENTRY_TYPE_NAME: &str = "ManagedLibrary.Library, ManagedLibrary";
pub const ENTRY_METHOD_NAME: &str = "SayHello";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub base_dir: PathBuf,
    pub assembly_path: PathBuf,
    pub runtime_config_path: PathBuf,
    pub type_name: &'static str,
    pub method_name: &'static str,
}

impl HostConfig {
    /// Derives the configuration from the directory holding the running binary.
    pub fn from_current_exe() -> Result<HostConfig, HostError> {
        let exe = env::current_exe().map_err(HostError::ExecutablePath)?;
        let dir = exe.parent().ok_or_else(|| {
            HostError::ExecutablePath(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} has no parent directory", exe.display()),
            ))
        })?;
        Ok(HostConfig::in_dir(dir))
    }

    pub fn in_dir(dir: &Path) -> HostConfig {
        HostConfig {
            base_dir: dir.to_path_buf(),
            assembly_path: dir.join(ASSEMBLY_FILE_NAME),
            runtime_config_path: dir.join(RUNTIME_CONFIG_FILE_NAME),
            type_name: ENTRY_TYPE_NAME,
            method_name: ENTRY_METHOD_NAME,
        }
    }
}

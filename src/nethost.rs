//! Asking nethost where hostfxr lives.
//!
//! nethost is pointed at the runtime config, so an app-local hostfxr beside
//! it is found before any global install.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use netcorehost::nethost;
use netcorehost::pdcstring::{PdCStr, PdCString};
use tracing::info;

use crate::error::HostError;
use crate::hostfxr::pd_string;

pub fn resolve_hostfxr_path(runtime_config_path: &Path) -> Result<PathBuf, HostError> {
    resolve_with(runtime_config_path, |assembly_path| {
        nethost::get_hostfxr_path_with_assembly_path(assembly_path)
            .map_err(|err| err.to_string())
            .and_then(|path| PdCString::from_os_str(path).map_err(|err| err.to_string()))
    })
}

fn resolve_with<F, E>(runtime_config_path: &Path, get_hostfxr_path: F) -> Result<PathBuf, HostError>
where
    F: FnOnce(&PdCStr) -> Result<PdCString, E>,
    E: Display,
{
    let assembly_path = pd_string(runtime_config_path.as_os_str())?;
    let found = get_hostfxr_path(&assembly_path).map_err(|err| HostError::HostfxrPath {
        reason: err.to_string(),
    })?;
    let path = PathBuf::from(found.to_os_string());
    info!("resolved hostfxr at {}", path.display());
    Ok(path)
}

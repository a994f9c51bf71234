//! Error types for the bootstrap host.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A status value returned by nethost, hostfxr or a runtime delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0);

    /// Only a plain zero counts; the "already initialized" success codes are
    /// not expected in a process that creates exactly one context.
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 as u32 {
            0x0000_0000 => "Success",
            0x0000_0001 => "Success_HostAlreadyInitialized",
            0x0000_0002 => "Success_DifferentRuntimeProperties",
            0x8000_8081 => "InvalidArgFailure",
            0x8000_8082 => "CoreHostLibLoadFailure",
            0x8000_8083 => "CoreHostLibMissingFailure",
            0x8000_8084 => "CoreHostEntryPointFailure",
            0x8000_8085 => "CurrentHostFindFailure",
            0x8000_8087 => "CoreClrResolveFailure",
            0x8000_8088 => "CoreClrBindFailure",
            0x8000_8089 => "CoreClrInitFailure",
            0x8000_808a => "CoreClrExeFailure",
            0x8000_808b => "ResolverInitFailure",
            0x8000_808c => "ResolverResolveFailure",
            0x8000_808e => "LibHostInitFailure",
            0x8000_8092 => "LibHostInvalidArgs",
            0x8000_8093 => "InvalidConfigFile",
            0x8000_8094 => "AppArgNotRunnable",
            0x8000_8095 => "AppHostExeNotBoundFailure",
            0x8000_8096 => "FrameworkMissingFailure",
            0x8000_8097 => "HostApiFailed",
            0x8000_8098 => "HostApiBufferTooSmall",
            0x8000_809a => "AppPathFindFailure",
            0x8000_809b => "SdkResolverResolveFailure",
            0x8000_809c => "FrameworkCompatFailure",
            0x8000_809d => "FrameworkCompatRetry",
            0x8000_80a0 => "BundleExtractionFailure",
            0x8000_80a1 => "BundleExtractionIOError",
            0x8000_80a2 => "LibHostDuplicateProperty",
            0x8000_80a3 => "HostApiUnsupportedVersion",
            0x8000_80a4 => "HostInvalidState",
            0x8000_80a5 => "HostPropertyNotFound",
            0x8000_80a6 => "CoreHostIncompatibleConfig",
            0x8000_80a7 => "HostApiUnsupportedScenario",
            0x8000_80a8 => "HostFeatureDisabled",
            0x8007_0002 => "FileNotFound",
            0x8013_1513 => "MissingMethod",
            0x8013_1522 => "TypeLoad",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0 as u32)?;
        if let Some(name) = self.name() {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        StatusCode(code)
    }
}

/// Every way the bootstrap sequence can fail. Each variant names the step.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to resolve the running executable's directory: {0}")]
    ExecutablePath(#[source] io::Error),

    #[error("get_hostfxr_path failed: {reason}")]
    HostfxrPath { reason: String },

    #[error("dlopen({path}) failed: {source}")]
    HostfxrLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("failed to resolve hostfxr export {symbol}: {source}")]
    MissingExport {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("hostfxr_initialize_for_runtime_config failed, rc={code}")]
    Initialize { code: StatusCode },

    #[error("hostfxr_get_runtime_delegate failed, rc={code}")]
    GetDelegate { code: StatusCode },

    #[error("load_assembly_and_get_function_pointer failed, rc={code}")]
    LoadAssembly { code: StatusCode },

    #[error("string cannot be passed to the hosting API: {0:?}")]
    InvalidString(String),
}

extern crate libloading as lib;

use std::ffi::OsStr;
use std::marker::PhantomData;
use std::mem;
use std::os::raw::{c_int, c_void};
use std::path::Path;
use std::ptr;

use netcorehost::pdcstring::{PdCString, PdChar};
use tracing::{debug, warn};

use crate::error::{HostError, StatusCode};

pub type HostfxrHandle = *mut c_void;

pub type HostfxrInitializeForRuntimeConfig =
    unsafe extern "C" fn(*const PdChar, *const c_void, *mut HostfxrHandle) -> i32;
pub type HostfxrGetRuntimeDelegate =
    unsafe extern "C" fn(HostfxrHandle, c_int, *mut *mut c_void) -> i32;
pub type HostfxrClose = unsafe extern "C" fn(HostfxrHandle) -> i32;

pub type LoadAssemblyAndGetFunctionPointer = unsafe extern "system" fn(
    *const PdChar,
    *const PdChar,
    *const PdChar,
    *const PdChar,
    *mut c_void,
    *mut *mut c_void,
) -> i32;

/// The one managed signature this host can call: no arguments, no result.
pub type EntryPoint = unsafe extern "system" fn();

/// `hdt_load_assembly_and_get_function_pointer` in `hostfxr_delegate_type`.
pub const HDT_LOAD_ASSEMBLY_AND_GET_FUNCTION_POINTER: c_int = 5;

/// `(const char_t*)-1`: asks for an `[UnmanagedCallersOnly]` method rather
/// than a delegate type.
pub const UNMANAGEDCALLERSONLY_METHOD: *const PdChar = usize::MAX as *const PdChar;

const INITIALIZE_SYMBOL: &str = "hostfxr_initialize_for_runtime_config";
const GET_DELEGATE_SYMBOL: &str = "hostfxr_get_runtime_delegate";
const CLOSE_SYMBOL: &str = "hostfxr_close";

#[derive(Debug, Clone, Copy)]
pub(crate) struct HostfxrExports {
    pub(crate) initialize: HostfxrInitializeForRuntimeConfig,
    pub(crate) get_runtime_delegate: HostfxrGetRuntimeDelegate,
    pub(crate) close: HostfxrClose,
}

/// A loaded hostfxr library and the three exports the host needs.
#[derive(Debug)]
pub struct Hostfxr {
    exports: HostfxrExports,
    // Unloaded on drop, after every HostContext borrowing it is gone.
    _library: Option<lib::Library>,
}

impl Hostfxr {
    pub fn load(path: &Path) -> Result<Hostfxr, HostError> {
        debug!("loading {}", path.display());
        let library = open_library(path).map_err(|source| HostError::HostfxrLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let exports = unsafe {
            HostfxrExports {
                initialize: export(&library, INITIALIZE_SYMBOL)?,
                get_runtime_delegate: export(&library, GET_DELEGATE_SYMBOL)?,
                close: export(&library, CLOSE_SYMBOL)?,
            }
        };
        Ok(Hostfxr {
            exports,
            _library: Some(library),
        })
    }

    /// # Safety
    ///
    /// Each pointer must implement the matching hostfxr contract.
    #[cfg(test)]
    pub(crate) unsafe fn from_exports(exports: HostfxrExports) -> Hostfxr {
        Hostfxr {
            exports,
            _library: None,
        }
    }

    pub fn initialize_for_runtime_config(
        &self,
        runtime_config_path: &Path,
    ) -> Result<HostContext<'_>, HostError> {
        debug!("initializing runtime from {}", runtime_config_path.display());
        let config_path = pd_string(runtime_config_path.as_os_str())?;
        let mut handle: HostfxrHandle = ptr::null_mut();
        let code = StatusCode(unsafe {
            (self.exports.initialize)(config_path.as_ptr(), ptr::null(), &mut handle)
        });
        if handle.is_null() {
            return Err(HostError::Initialize { code });
        }
        // Any handle we were given gets closed, even when the code says failure.
        let context = HostContext {
            hostfxr: self,
            handle,
        };
        if !code.is_success() {
            return Err(HostError::Initialize { code });
        }
        Ok(context)
    }
}

#[cfg(unix)]
fn open_library(path: &Path) -> Result<lib::Library, lib::Error> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LAZY};
    unsafe { Library::open(Some(path), RTLD_LAZY | RTLD_GLOBAL) }.map(Into::into)
}

#[cfg(not(unix))]
fn open_library(path: &Path) -> Result<lib::Library, lib::Error> {
    unsafe { lib::Library::new(path) }
}

pub(crate) fn pd_string(s: &OsStr) -> Result<PdCString, HostError> {
    PdCString::from_os_str(s)
        .map_err(|err| HostError::InvalidString(format!("{:?}: {}", s, err)))
}

unsafe fn export<T: Copy>(library: &lib::Library, symbol: &'static str) -> Result<T, HostError> {
    library
        .get::<T>(symbol.as_bytes())
        .map(|found| *found)
        .map_err(|source| HostError::MissingExport { symbol, source })
}

/// One live runtime instance. Closed with `hostfxr_close` on drop.
#[derive(Debug)]
pub struct HostContext<'fxr> {
    hostfxr: &'fxr Hostfxr,
    handle: HostfxrHandle,
}

impl<'fxr> HostContext<'fxr> {
    pub fn load_assembly_and_get_function_pointer_delegate(
        &self,
    ) -> Result<AssemblyDelegateLoader<'_>, HostError> {
        let mut delegate: *mut c_void = ptr::null_mut();
        let code = StatusCode(unsafe {
            (self.hostfxr.exports.get_runtime_delegate)(
                self.handle,
                HDT_LOAD_ASSEMBLY_AND_GET_FUNCTION_POINTER,
                &mut delegate,
            )
        });
        if !code.is_success() || delegate.is_null() {
            return Err(HostError::GetDelegate { code });
        }
        let load = unsafe { mem::transmute::<*mut c_void, LoadAssemblyAndGetFunctionPointer>(delegate) };
        Ok(AssemblyDelegateLoader {
            load,
            phantom: PhantomData,
        })
    }
}

impl<'fxr> Drop for HostContext<'fxr> {
    fn drop(&mut self) {
        let code = StatusCode(unsafe { (self.hostfxr.exports.close)(self.handle) });
        if code.is_success() {
            debug!("host context closed");
        } else {
            warn!("hostfxr_close failed, rc={}", code);
        }
    }
}

/// The runtime's `load_assembly_and_get_function_pointer` delegate.
pub struct AssemblyDelegateLoader<'clr> {
    load: LoadAssemblyAndGetFunctionPointer,
    phantom: PhantomData<&'clr ()>,
}

impl<'clr> AssemblyDelegateLoader<'clr> {
    /// Loads `assembly_path` and looks up an `[UnmanagedCallersOnly]` method.
    pub fn get_unmanaged_callers_only(
        &self,
        assembly_path: &Path,
        type_name: &str,
        method_name: &str,
    ) -> Result<ManagedDelegate<'clr>, HostError> {
        debug!("resolving {}::{} from {}", type_name, method_name, assembly_path.display());
        let assembly_path = pd_string(assembly_path.as_os_str())?;
        let type_name = pd_string(OsStr::new(type_name))?;
        let method_name = pd_string(OsStr::new(method_name))?;
        let mut function: *mut c_void = ptr::null_mut();
        let code = StatusCode(unsafe {
            (self.load)(
                assembly_path.as_ptr(),
                type_name.as_ptr(),
                method_name.as_ptr(),
                UNMANAGEDCALLERSONLY_METHOD,
                ptr::null_mut(),
                &mut function,
            )
        });
        if !code.is_success() || function.is_null() {
            return Err(HostError::LoadAssembly { code });
        }
        Ok(ManagedDelegate {
            function: unsafe { mem::transmute::<*mut c_void, EntryPoint>(function) },
            phantom: PhantomData,
        })
    }
}

pub struct ManagedDelegate<'clr> {
    function: EntryPoint,
    phantom: PhantomData<&'clr ()>,
}

impl<'clr> ManagedDelegate<'clr> {
    /// Calls the managed method. Consumes the delegate, so it runs once.
    ///
    /// # Safety
    ///
    /// The managed method must really take no arguments and return nothing.
    pub unsafe fn invoke(self) {
        (self.function)()
    }
}

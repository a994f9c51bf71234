//! In-process stand-ins for the hostfxr exports and the runtime delegates.
//! State is thread-local so parallel tests never observe each other.
//!
//! The fakes run behind `extern` boundaries where a panic aborts the whole
//! test binary, so contract violations are recorded and checked afterwards
//! with [`assert_contract_held`].

use std::cell::{Cell, RefCell};
use std::os::raw::{c_int, c_void};
use std::path::PathBuf;

use netcorehost::pdcstring::PdChar;

use crate::hostfxr::{
    EntryPoint, Hostfxr, HostfxrExports, HostfxrHandle, LoadAssemblyAndGetFunctionPointer,
    HDT_LOAD_ASSEMBLY_AND_GET_FUNCTION_POINTER, UNMANAGEDCALLERSONLY_METHOD,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Behaviour {
    pub initialize_rc: i32,
    pub hand_out_handle_on_error: bool,
    pub get_delegate_rc: i32,
    pub load_assembly_rc: i32,
}

thread_local! {
    static BEHAVIOUR: Cell<Behaviour> = Cell::new(Behaviour::default());
    static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    static RUNTIME_CONFIG: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
    static REQUESTED_METHOD: RefCell<Option<(String, String)>> = const { RefCell::new(None) };
    static INVOCATIONS: Cell<usize> = const { Cell::new(0) };
    static MISMATCHES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

static CONTEXT_TOKEN: u8 = 0;

pub fn reset(behaviour: Behaviour) {
    BEHAVIOUR.with(|b| b.set(behaviour));
    CALLS.with(|c| c.borrow_mut().clear());
    RUNTIME_CONFIG.with(|p| *p.borrow_mut() = None);
    REQUESTED_METHOD.with(|m| *m.borrow_mut() = None);
    INVOCATIONS.with(|i| i.set(0));
    MISMATCHES.with(|m| m.borrow_mut().clear());
}

pub fn hostfxr() -> Hostfxr {
    unsafe {
        Hostfxr::from_exports(HostfxrExports {
            initialize: fake_initialize,
            get_runtime_delegate: fake_get_runtime_delegate,
            close: fake_close,
        })
    }
}

pub fn calls() -> Vec<&'static str> {
    CALLS.with(|c| c.borrow().clone())
}

pub fn runtime_config_path() -> Option<PathBuf> {
    RUNTIME_CONFIG.with(|p| p.borrow().clone())
}

pub fn requested_method() -> Option<(String, String)> {
    REQUESTED_METHOD.with(|m| m.borrow().clone())
}

pub fn invocations() -> usize {
    INVOCATIONS.with(Cell::get)
}

pub fn assert_contract_held() {
    let mismatches = MISMATCHES.with(|m| m.borrow().clone());
    assert!(mismatches.is_empty(), "fake exports saw: {:?}", mismatches);
}

fn expect(holds: bool, what: &str) {
    if !holds {
        MISMATCHES.with(|m| m.borrow_mut().push(what.to_string()));
    }
}

fn behaviour() -> Behaviour {
    BEHAVIOUR.with(Cell::get)
}

fn record(call: &'static str) {
    CALLS.with(|c| c.borrow_mut().push(call));
}

#[cfg(not(windows))]
unsafe fn read(s: *const PdChar) -> PathBuf {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(CStr::from_ptr(s.cast()).to_bytes()))
}

#[cfg(windows)]
unsafe fn read(s: *const PdChar) -> PathBuf {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    let mut len = 0;
    while *s.add(len) != 0 {
        len += 1;
    }
    PathBuf::from(OsString::from_wide(std::slice::from_raw_parts(s, len)))
}

fn context_handle() -> HostfxrHandle {
    &CONTEXT_TOKEN as *const u8 as HostfxrHandle
}

unsafe extern "C" fn fake_initialize(
    runtime_config_path: *const PdChar,
    _parameters: *const c_void,
    handle: *mut HostfxrHandle,
) -> i32 {
    record("initialize");
    RUNTIME_CONFIG.with(|p| *p.borrow_mut() = Some(read(runtime_config_path)));
    let behaviour = behaviour();
    if behaviour.initialize_rc == 0 || behaviour.hand_out_handle_on_error {
        *handle = context_handle();
    }
    behaviour.initialize_rc
}

unsafe extern "C" fn fake_get_runtime_delegate(
    handle: HostfxrHandle,
    kind: c_int,
    delegate: *mut *mut c_void,
) -> i32 {
    record("get_delegate");
    expect(handle == context_handle(), "get_delegate on a foreign handle");
    expect(
        kind == HDT_LOAD_ASSEMBLY_AND_GET_FUNCTION_POINTER,
        "get_delegate for the wrong delegate kind",
    );
    let rc = behaviour().get_delegate_rc;
    if rc == 0 {
        *delegate = fake_load_assembly as LoadAssemblyAndGetFunctionPointer as *mut c_void;
    }
    rc
}

unsafe extern "C" fn fake_close(handle: HostfxrHandle) -> i32 {
    record("close");
    expect(handle == context_handle(), "close on a foreign handle");
    0
}

unsafe extern "system" fn fake_load_assembly(
    _assembly_path: *const PdChar,
    type_name: *const PdChar,
    method_name: *const PdChar,
    delegate_type_name: *const PdChar,
    reserved: *mut c_void,
    delegate: *mut *mut c_void,
) -> i32 {
    record("load_assembly");
    expect(
        delegate_type_name == UNMANAGEDCALLERSONLY_METHOD,
        "load_assembly without UNMANAGEDCALLERSONLY_METHOD",
    );
    expect(reserved.is_null(), "load_assembly with a non-null reserved pointer");
    REQUESTED_METHOD.with(|m| {
        *m.borrow_mut() = Some((
            read(type_name).to_string_lossy().into_owned(),
            read(method_name).to_string_lossy().into_owned(),
        ))
    });
    let rc = behaviour().load_assembly_rc;
    if rc == 0 {
        *delegate = fake_entry_point as EntryPoint as *mut c_void;
    }
    rc
}

unsafe extern "system" fn fake_entry_point() {
    record("invoke");
    INVOCATIONS.with(|i| i.set(i.get() + 1));
}

mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "close on a foreign handle")]
    fn contract_violations_surface_in_the_test_body() {
        reset(Behaviour::default());
        let status = unsafe { fake_close(std::ptr::null_mut()) };
        assert_eq!(status, 0);
        assert_contract_held();
    }
}

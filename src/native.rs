//! Functions the managed library imports back from this process.
//!
//! `ManagedLibrary` binds these through `DllImport("__Internal")`, which its
//! resolver maps to `dlopen(NULL)`, so they must appear in the executable's
//! dynamic symbol table (see `build.rs`).

#[no_mangle]
pub extern "C" fn add_numbers(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

//! A native bootstrap host for .NET.
//!
//! Locates hostfxr, initializes a runtime from the `runtimeconfig.json`
//! sitting next to the executable, and calls one `[UnmanagedCallersOnly]`
//! method from the managed library.

pub mod config;
pub mod error;
pub mod hostfxr;
pub mod logging;
pub mod native;
pub mod nethost;

#[cfg(test)]
mod testing;

use tracing::debug;

pub use config::HostConfig;
pub use error::{HostError, StatusCode};
pub use hostfxr::{AssemblyDelegateLoader, HostContext, Hostfxr, ManagedDelegate};

/// Resolves and loads hostfxr, then runs the managed entry point.
pub fn run(config: &HostConfig) -> Result<(), HostError> {
    let hostfxr_path = nethost::resolve_hostfxr_path(&config.runtime_config_path)?;
    let hostfxr = Hostfxr::load(&hostfxr_path)?;
    run_with(&hostfxr, config)
}

/// Initializes the runtime through an already loaded hostfxr and invokes the
/// entry point once. The context is closed on every path out of here.
pub fn run_with(hostfxr: &Hostfxr, config: &HostConfig) -> Result<(), HostError> {
    let context = hostfxr.initialize_for_runtime_config(&config.runtime_config_path)?;
    let loader = context.load_assembly_and_get_function_pointer_delegate()?;
    let entry_point = loader.get_unmanaged_callers_only(
        &config.assembly_path,
        config.type_name,
        config.method_name,
    )?;

    println!("Calling the managed entry point...");
    // The managed side declares this method with no parameters and a void return.
    unsafe { entry_point.invoke() };
    debug!("{} returned", config.method_name);

    drop(context);
    println!("Done.");
    Ok(())
}

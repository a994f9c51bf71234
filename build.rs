use std::env;

fn main() {
    // The managed side looks up `add_numbers` with dlopen(NULL); export it.
    if env::var("CARGO_CFG_TARGET_FAMILY").as_deref() == Ok("unix") {
        println!("cargo:rustc-link-arg=-rdynamic");
    }
    println!("cargo:rerun-if-changed=build.rs");
}

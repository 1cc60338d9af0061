//! Build script for bitview-core
//!
//! Checks the compiler before building:
//! - Minimum Rust version (let-else and `Option::is_some_and` need 1.70.0)

use rustc_version::Version;

const MIN_RUST_VERSION: Version = Version::new(1, 70, 0);

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    match rustc_version::version() {
        Ok(found) if found < MIN_RUST_VERSION => {
            panic!("bitview-core requires Rust {MIN_RUST_VERSION} or newer, found {found}");
        }
        Ok(_) => {}
        // Some build environments hide the compiler version; just warn
        Err(err) => println!("cargo:warning=could not verify Rust version: {err}"),
    }
}

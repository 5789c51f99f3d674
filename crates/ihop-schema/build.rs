//! Build script that records the resolved versions of the validation
//! libraries from the workspace lockfile.

use std::path::PathBuf;

use cargo_lock::Lockfile;

/// Packages whose locked version is exposed as `IHOP_<NAME>_VERSION`.
const TRACKED: [(&str, &str); 2] = [
    ("jsonschema", "IHOP_JSONSCHEMA_VERSION"),
    ("boon", "IHOP_BOON_VERSION"),
];

fn main() {
    let lockfile = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default())
        .join("..")
        .join("..")
        .join("Cargo.lock");
    println!("cargo:rerun-if-changed={}", lockfile.display());

    let locked = Lockfile::load(&lockfile).ok();
    for (package, var) in TRACKED {
        let version = locked
            .as_ref()
            .and_then(|lock| lock.packages.iter().find(|p| p.name.as_str() == package))
            .map(|p| p.version.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("cargo:rustc-env={var}={version}");
    }
}

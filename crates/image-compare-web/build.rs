//! Stamps the workspace `VERSION` file into `IMAGE_COMPARE_VERSION`.

use std::path::Path;

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir");
    let version_path = Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("workspace root above crates/<name>")
        .join("VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    let contents = std::fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("read {}: {error}", version_path.display()));
    let version = contents.trim();
    if version.is_empty() || version.contains(char::is_whitespace) {
        panic!("VERSION must hold a single non-empty token, found {contents:?}");
    }

    println!("cargo:rustc-env=IMAGE_COMPARE_VERSION={version}");
}

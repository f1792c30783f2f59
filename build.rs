fn main() {
    // Tell Cargo to rerun this build script if any test fixture changes
    println!("cargo:rerun-if-changed=tests/fixtures");

    let fixture_dir = std::path::Path::new("tests/fixtures");
    let Ok(entries) = std::fs::read_dir(fixture_dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}

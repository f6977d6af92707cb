fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_TESSERACT");

    // The default build shells out to the `tesseract` executable; only the
    // in-process binding needs the native libraries.
    if std::env::var_os("CARGO_FEATURE_TESSERACT").is_none() {
        return;
    }

    // Elsewhere tesseract-sys finds the libraries through pkg-config.
    let target_env = std::env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    if target_env != "msvc" {
        return;
    }

    println!("cargo:rerun-if-changed=../target/vcpkg/installed/vcpkg/status");

    let tesseract_found = vcpkg::find_package("tesseract");
    let leptonica_found = vcpkg::find_package("leptonica");

    if tesseract_found.is_err() {
        println!("cargo:warning=Missing vcpkg dependency: tesseract");
    }

    if leptonica_found.is_err() {
        println!("cargo:warning=Missing vcpkg dependency: leptonica");
    }

    if tesseract_found.is_err() || leptonica_found.is_err() {
        eprintln!("Please install the missing dependencies with cargo-vcpkg");
        eprintln!("Run the following commands:");
        eprintln!();
        eprintln!("cargo install cargo-vcpkg");
        eprintln!("cargo vcpkg build");
        eprintln!();
        eprintln!("Then try cargo build --features tesseract again.");
        panic!("Missing vcpkg dependencies");
    }
}

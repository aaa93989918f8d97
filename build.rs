use std::env;
use std::path::PathBuf;

fn main() {
    // Only regenerate the header when the FFI surface or its config changes.
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let crate_dir = PathBuf::from(crate_dir);
    let header = crate_dir.join("include").join("folio.h");

    std::fs::create_dir_all(header.parent().expect("header path has a parent"))
        .expect("failed to create include/ directory");

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))
        .expect("failed to read cbindgen.toml");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
        }
        Err(e) => println!("cargo:warning=cbindgen could not generate folio.h: {e}"),
    }
}

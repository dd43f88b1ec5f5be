use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    println!("cargo:rerun-if-changed=src/lib.rs");

    match cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("DAMB_MIX_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("damb_mix.h"));
        }
        Err(err) => println!("cargo:warning=Skipping C header generation: {}", err),
    }
}

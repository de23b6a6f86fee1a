//! Build script for generating protobuf code
//!
//! Generates Rust code from the monitoring protobuf definitions when the
//! `proto-gen` feature is enabled. Without the feature (or without protoc)
//! the committed stubs in `src/proto/mod.rs` are used instead.

use std::path::PathBuf;
use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run if proto files change
    println!("cargo:rerun-if-changed=../../proto/monitoring/v1/monitoring.proto");

    if std::env::var("CARGO_FEATURE_PROTO_GEN").is_err() {
        return Ok(());
    }

    // Check if protoc is available
    let protoc_available =
        std::env::var("PROTOC").is_ok() || Command::new("protoc").arg("--version").output().is_ok();

    if !protoc_available {
        println!("cargo:warning=protoc not found, skipping proto generation");
        println!("cargo:warning=Install protoc or set PROTOC env var to generate proto code");
        return Ok(());
    }

    // Output directory for generated code
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    // Compile protobuf definitions
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir(&out_dir)
        .compile(
            &["../../proto/monitoring/v1/monitoring.proto"],
            &["../../proto"],
        )?;

    Ok(())
}

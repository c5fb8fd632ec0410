use chrono::Utc;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_default());
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let manifest = manifest_dir.join("Cargo.toml");
    let target = out_dir.join("version.rs");

    if is_fresh(&target, &manifest) {
        return Ok(());
    }

    let contents = format!(
        "pub const EVENT_API_VERSION: &str = \"{}\";\n\
         pub const BUILD_TIME: &str = \"{}\";\n\
         pub const GIT_HASH: &str = \"{}\";\n",
        event_api_version(&manifest),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        git_hash(),
    );
    fs::write(&target, contents)
}

/// Generated file exists and is newer than the manifest
fn is_fresh(target: &Path, manifest: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(target), modified(manifest)) {
        (Some(generated), Some(source)) => generated >= source,
        _ => false,
    }
}

/// `[package.metadata] event_api_version` from the manifest
fn event_api_version(manifest: &Path) -> String {
    fs::read_to_string(manifest)
        .ok()
        .and_then(|text| text.parse::<toml::Table>().ok())
        .and_then(|table| {
            table
                .get("package")?
                .get("metadata")?
                .get("event_api_version")?
                .as_integer()
        })
        .map(|version| version.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

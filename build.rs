//! Stamps `dp --version` with the commit and build time.
//!
//! Exposes `DP_GIT_COMMIT` (short hash, `-dirty` suffix when the tree has
//! uncommitted changes, "unknown" outside git) and `DP_BUILD_TIMESTAMP`
//! (UTC, RFC 3339) to the crate at compile time.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let commit = git(&["describe", "--always", "--dirty", "--abbrev=10"])
        .unwrap_or_else(|| "unknown".to_string());
    let built = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=DP_GIT_COMMIT={commit}");
    println!("cargo:rustc-env=DP_BUILD_TIMESTAMP={built}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

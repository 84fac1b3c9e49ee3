// Build metadata for `tcolor --version`.

use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-env-changed=TCOLOR_BUILD_COMMIT");

    // Source tarballs have no .git; packagers pass the commit in instead.
    let commit = env::var("TCOLOR_BUILD_COMMIT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=9"]))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=TCOLOR_BUILD_COMMIT={}", commit);

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TCOLOR_BUILD_TARGET={}", target);
    println!("cargo:rustc-env=TCOLOR_BUILD_PROFILE={}", profile);
}

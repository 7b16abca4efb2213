//! Stamps the melprep binary with the source revision it was built from
//!
//! Sets `MELPREP_REVISION` (short commit, `+dirty` when the work tree has
//! local edits, `unknown` outside a checkout) and `MELPREP_BUILD_DATE`
//! (UTC calendar date). Both go into the startup log line so a spectrogram
//! dataset can be matched to the binary that produced it.

use std::path::Path;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn main() {
    let revision = match git(&["rev-parse", "--short=8", "HEAD"]) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .map_or(false, |status| !status.is_empty());
            if dirty {
                format!("{}+dirty", hash)
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    };

    let build_date = chrono::Utc::now().format("%Y-%m-%d");

    println!("cargo:rustc-env=MELPREP_REVISION={}", revision);
    println!("cargo:rustc-env=MELPREP_BUILD_DATE={}", build_date);

    // Rebuild the stamp on commit or checkout, not on every source edit
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        let head = Path::new(&git_dir).join("HEAD");
        println!("cargo:rerun-if-changed={}", head.display());
        if let Some(reference) = git(&["symbolic-ref", "-q", "HEAD"]) {
            println!("cargo:rerun-if-changed={}", Path::new(&git_dir).join(reference).display());
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}

use std::process::Command;

fn strip_tag_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix('v') {
        Some(rest) if rest.starts_with(|ch: char| ch.is_ascii_digit()) => rest.to_string(),
        _ => trimmed.to_string(),
    }
}

fn version_from_git() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let version = strip_tag_prefix(&described);
    (!version.is_empty()).then_some(version)
}

fn main() {
    println!("cargo:rerun-if-env-changed=TASKDECK_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/packed-refs");

    let version = std::env::var("TASKDECK_VERSION")
        .ok()
        .map(|raw| strip_tag_prefix(&raw))
        .filter(|version| !version.is_empty())
        .or_else(version_from_git)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=TASKDECK_BUILD_VERSION={version}");
}

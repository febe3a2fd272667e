use std::fs;
use std::path::{Path, PathBuf};

fn rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rel(path: &Path) -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[test]
fn target_os_cfg_is_scoped_to_the_platform_module() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        if !content.contains("target_os") {
            continue;
        }
        let rel_path = rel(&file);
        if !rel_path.starts_with("src/system/platform/") {
            violations.push(format!(
                "{rel_path} contains `target_os` cfg but is outside src/system/platform/"
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "Platform cfg leaked out of the probe layer:\n{}",
        violations.join("\n")
    );
}

#[test]
fn core_does_not_import_the_cli_layer() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/system");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        for forbidden in ["crate::config", "clap", "tokio"] {
            if content.contains(forbidden) {
                violations.push(format!(
                    "{} imports forbidden dependency `{}`",
                    rel(&file),
                    forbidden
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Core/CLI layering violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn platform_internals_stay_behind_the_wrapper_functions() {
    // Everything outside src/system/ must go through procsnap::system, never
    // name the per-OS impl modules directly.
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let rel_path = rel(&file);
        if rel_path.starts_with("src/system/") {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        for forbidden in ["platform::linux", "platform::macos", "platform::windows"] {
            if content.contains(forbidden) {
                violations.push(format!(
                    "{rel_path} reaches into per-OS module `{forbidden}`"
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Platform encapsulation violations:\n{}",
        violations.join("\n")
    );
}

// ABOUTME: Shared helper for integration tests that drive the compiled binary end-to-end

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Writes `source` to a script file under the test binary's scratch
/// directory and runs it through the actual `thanatos` binary, returning
/// captured stdout and the process exit code. Used by tests that assert on
/// the bit-exact stdout contract spec.md §8 describes, which unit tests
/// inside the library can't observe directly since `print` writes straight
/// to the process's stdout.
pub fn run_script(name: &str, source: &str) -> (String, i32) {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
    fs::create_dir_all(&dir).expect("create scratch dir");
    let path = dir.join(format!("{name}.lang"));
    fs::write(&path, source).expect("write script fixture");

    let output = Command::new(env!("CARGO_BIN_EXE_thanatos"))
        .arg(&path)
        .output()
        .expect("failed to run the thanatos binary");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let code = output.status.code().unwrap_or(-1);
    (stdout, code)
}

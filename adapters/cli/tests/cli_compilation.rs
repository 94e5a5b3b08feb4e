use std::process::{Command, Output};

fn demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["run", "--quiet", "--bin", "tessera-demo", "--"])
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to invoke cargo run for the demo binary")
}

#[test]
fn demo_binary_compiles() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "tessera-demo"])
        .status()
        .expect("failed to invoke cargo check for the demo binary");

    assert!(status.success(), "cargo check --bin tessera-demo should succeed");
}

#[test]
fn headless_runs_exit_cleanly() {
    let output = demo(&["--headless", "--frames", "30", "--seed", "11"]);

    assert!(
        output.status.success(),
        "headless run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn missing_settings_files_are_reported() {
    let output = demo(&["--headless", "--settings", "does/not/exist.toml"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does/not/exist.toml"));
}

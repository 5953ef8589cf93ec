use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;

mod common;

#[test]
fn test_install_with_prefix() {
    let mut ctx = common::undockit();
    let prefix = ctx.dir.path().join("prefix");
    ctx.cmd
        .args(["install", "deezer/spleeter:latest", "--no-undockit", "--prefix"])
        .arg(&prefix);
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed deezer/spleeter:latest as"));

    let tool = prefix.join("bin").join("spleeter");
    let content = std::fs::read_to_string(&tool).unwrap();
    assert_eq!(
        content,
        "#!/usr/bin/env -S undockit run --timeout=600\nFROM deezer/spleeter:latest\n"
    );
    let mode = std::fs::metadata(&tool).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert!(!prefix.join("bin").join("undockit").exists());
}

#[test]
fn test_install_options_in_shebang() {
    let mut ctx = common::undockit();
    let prefix = ctx.dir.path().join("prefix");
    ctx.cmd
        .args([
            "install",
            "nvidia/cuda",
            "--name",
            "cuda-tool",
            "--timeout",
            "900",
            "--no-gpu",
            "--no-undockit",
            "--prefix",
        ])
        .arg(&prefix);
    ctx.cmd.assert().success();

    let content = std::fs::read_to_string(prefix.join("bin").join("cuda-tool")).unwrap();
    assert!(content.starts_with("#!/usr/bin/env -S undockit run --timeout=900 --no-gpu\n"));
}

#[test]
fn test_install_deploys_launcher() {
    let mut ctx = common::undockit();
    let prefix = ctx.dir.path().join("prefix");
    ctx.cmd.args(["install", "alpine", "--prefix"]).arg(&prefix);
    ctx.cmd.assert().success();

    let launcher = prefix.join("bin").join("undockit");
    let output = std::process::Command::new(&launcher)
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("undockit {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_install_refuses_foreign_file() {
    let mut ctx = common::undockit();
    let bin = ctx.dir.path().join("prefix").join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::write(bin.join("alpine"), "#!/bin/sh\necho mine\n").unwrap();

    ctx.cmd
        .args(["install", "alpine", "--no-undockit", "--prefix"])
        .arg(ctx.dir.path().join("prefix"));
    ctx.cmd
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Refusing to overwrite"));
}

#[test]
fn test_install_env_target_without_environment() {
    let mut ctx = common::undockit();
    ctx.cmd
        .env_remove("VIRTUAL_ENV")
        .env_remove("CONDA_PREFIX")
        .args(["install", "alpine", "--to", "env", "--no-undockit"]);
    ctx.cmd
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No active environment"));
}

#[test]
fn test_install_invalid_target() {
    let mut ctx = common::undockit();
    ctx.cmd
        .args(["install", "alpine", "--to", "system", "--no-undockit"]);
    ctx.cmd
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid target"));
}

#[test]
fn test_completion_hidden_but_available() {
    let mut ctx = common::undockit();
    ctx.cmd.args(["completion", "bash"]);
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("undockit"));

    ctx.new_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("completion").not());
}

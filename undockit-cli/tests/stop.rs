use predicates::prelude::*;

mod common;

#[test]
fn test_stop_running_instance() {
    let mut ctx = common::undockit();
    ctx.cmd.arg("run").arg(&ctx.spec).arg("true");
    ctx.cmd.assert().success();

    ctx.new_cmd()
        .arg("stop")
        .arg(&ctx.spec)
        .assert()
        .success()
        .stdout(predicate::str::contains("undockit-").and(predicate::str::contains("abc123def456")));

    let calls = ctx.calls();
    let stop = calls.find("stop undockit-").unwrap();
    let rm = calls.find("rm undockit-").unwrap();
    assert!(stop < rm);
}

#[test]
fn test_stop_without_instance_fails() {
    let mut ctx = common::undockit();
    ctx.cmd.arg("stop").arg(&ctx.spec);
    ctx.cmd
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no container"));
}

#[test]
fn test_run_after_stop_starts_again() {
    let mut ctx = common::undockit();
    ctx.cmd.arg("run").arg(&ctx.spec).arg("true");
    ctx.cmd.assert().success();
    ctx.new_cmd().arg("stop").arg(&ctx.spec).assert().success();
    ctx.new_cmd()
        .arg("run")
        .arg(&ctx.spec)
        .arg("true")
        .assert()
        .success();
    assert_eq!(ctx.starts(), 2);
}

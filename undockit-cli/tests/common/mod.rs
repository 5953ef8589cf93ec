use assert_cmd::Command;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Stand-in for `podman`, selected through `UNDOCKIT_ENGINE_PATH`.
///
/// Logs every call to `$FAKE_STATE/calls.log` and keeps the running
/// instance name in `$FAKE_STATE/running`. `exec` runs the command on the
/// host from the workdir with the host mount stripped.
const FAKE_ENGINE: &str = r#"#!/bin/sh
state="$FAKE_STATE"
printf '%s\n' "$*" >> "$state/calls.log"
case "$1" in
    build)
        if [ -n "$FAKE_BUILD_FAIL" ]; then
            echo "Error: build exploded" >&2
            exit 1
        fi
        echo "STEP 1/1: FROM alpine"
        echo "abc123def4567890abc123def4567890"
        ;;
    inspect)
        case "$4" in
            *Entrypoint*) printf '%s\n' "$FAKE_ENTRYPOINT" ;;
            *) printf '%s\n' "$FAKE_CMD" ;;
        esac
        ;;
    run)
        echo "$5" > "$state/running"
        echo "f00dcafe0123456789"
        ;;
    ps)
        if [ -f "$state/running" ]; then
            cat "$state/running"
        fi
        ;;
    stop)
        if [ -f "$state/running" ] && [ "$(cat "$state/running")" = "$2" ]; then
            exit 0
        fi
        echo "Error: no container with name or ID \"$2\" found" >&2
        exit 125
        ;;
    rm)
        rm -f "$state/running"
        ;;
    exec)
        shift 2
        if [ "$1" = "-t" ]; then
            shift
        fi
        shift 2
        workdir="$1"
        shift
        cd "${workdir#/host}" || exit 1
        exec "$@"
        ;;
    *)
        echo "unknown command: $1" >&2
        exit 125
        ;;
esac
"#;

pub struct TestContext {
    pub cmd: Command,
    pub dir: TempDir,
    #[allow(dead_code)]
    pub spec: PathBuf,
}

impl TestContext {
    /// A fresh command sharing this context's engine state.
    #[allow(dead_code)]
    pub fn new_cmd(&self) -> Command {
        command(self.dir.path())
    }

    /// Engine calls so far, one per line (multi-line arguments included).
    #[allow(dead_code)]
    pub fn calls(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("calls.log")).unwrap_or_default()
    }

    /// Number of instance starts so far.
    #[allow(dead_code)]
    pub fn starts(&self) -> usize {
        self.calls()
            .lines()
            .filter(|line| line.starts_with("run -d --replace"))
            .count()
    }
}

fn command(dir: &Path) -> Command {
    let bin_path = env!("CARGO_BIN_EXE_undockit");
    let mut cmd = Command::new(bin_path);
    cmd.timeout(Duration::from_secs(30));
    cmd.current_dir(dir)
        .env("UNDOCKIT_ENGINE_PATH", dir.join("podman"))
        .env("FAKE_STATE", dir)
        .env("FAKE_ENTRYPOINT", "null")
        .env("FAKE_CMD", r#"["sh","-c"]"#)
        .env_remove("UNDOCKIT_ENGINE")
        .env_remove("FAKE_BUILD_FAIL")
        .env_remove("RUST_LOG");
    cmd
}

pub fn undockit() -> TestContext {
    let dir = TempDir::new().expect("Failed to create test directory");

    let engine = dir.path().join("podman");
    std::fs::write(&engine, FAKE_ENGINE).expect("Failed to write fake engine");
    std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake engine executable");

    let spec = dir.path().join("tool");
    std::fs::write(&spec, "#!/usr/bin/env -S undockit run --timeout=600\nFROM alpine\n")
        .expect("Failed to write build spec");

    let cmd = command(dir.path());
    TestContext { cmd, dir, spec }
}

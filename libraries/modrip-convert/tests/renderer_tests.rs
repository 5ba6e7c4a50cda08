//! Renderer adapter tests
//! Drive `OpenMptRenderer` against small shell scripts standing in for openmpt123
#![cfg(unix)]

use modrip_convert::OpenMptRenderer;
use modrip_core::{ModripError, Renderer};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Scripts are written and executed in the same process; running the tests one
/// at a time keeps a concurrent fork from holding a script open for writing.
static SERIAL: Mutex<()> = Mutex::const_new(());

/// Write an executable script that receives `--render <module>` as `$1 $2`
fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn module_in(dir: &TempDir) -> PathBuf {
    let module = dir.path().join("song.xm");
    std::fs::write(&module, b"Extended Module: song").unwrap();
    module
}

#[tokio::test]
async fn successful_render_returns_sibling_waveform() {
    let _serial = SERIAL.lock().await;
    let dir = TempDir::new().unwrap();
    let module = module_in(&dir);
    let tool = fake_tool(
        dir.path(),
        "openmpt123",
        r#"[ "$1" = "--render" ] || exit 64
printf 'RIFF' > "$2.wav""#,
    );

    let waveform = OpenMptRenderer::new(tool).render(&module).await.unwrap();

    assert_eq!(waveform, dir.path().join("song.xm.wav"));
    assert!(waveform.exists());
}

#[tokio::test]
async fn non_zero_exit_is_render_failure_with_stderr() {
    let _serial = SERIAL.lock().await;
    let dir = TempDir::new().unwrap();
    let module = module_in(&dir);
    let tool = fake_tool(dir.path(), "openmpt123", "echo 'unsupported module' >&2\nexit 1");

    let err = OpenMptRenderer::new(tool).render(&module).await.unwrap_err();

    match err {
        ModripError::Render { module, message } => {
            assert_eq!(module, "song.xm");
            assert!(message.contains("unsupported module"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn zero_exit_without_waveform_is_render_failure() {
    let _serial = SERIAL.lock().await;
    let dir = TempDir::new().unwrap();
    let module = module_in(&dir);
    let tool = fake_tool(dir.path(), "openmpt123", "exit 0");

    let err = OpenMptRenderer::new(tool).render(&module).await.unwrap_err();

    assert!(err.to_string().contains("no waveform produced"));
}

#[tokio::test]
async fn stale_waveform_does_not_mask_failure() {
    let _serial = SERIAL.lock().await;
    let dir = TempDir::new().unwrap();
    let module = module_in(&dir);
    std::fs::write(dir.path().join("song.xm.wav"), b"stale").unwrap();
    let tool = fake_tool(dir.path(), "openmpt123", "exit 0");

    let result = OpenMptRenderer::new(tool).render(&module).await;

    assert!(result.is_err());
    assert!(!dir.path().join("song.xm.wav").exists());
}

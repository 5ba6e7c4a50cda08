//! Shared fixtures for pipeline tests
#![allow(dead_code)]

use async_trait::async_trait;
use modrip_core::{waveform_path_for, ModripError, Renderer, Result, Transcoder, HEADER_LEN};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Write an XM module whose header carries `title`
pub fn write_xm(dir: &Path, name: &str, title: &str) -> PathBuf {
    let mut header = b"Extended Module: ".to_vec();
    let mut field = title.as_bytes().to_vec();
    field.resize(20, 0);
    header.extend_from_slice(&field);
    header.resize(HEADER_LEN, 0);

    let path = dir.join(name);
    std::fs::write(&path, header).unwrap();
    path
}

/// Write a file with no recognisable module signature
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not a tracker module").unwrap();
    path
}

/// Renderer stand-in that writes a small waveform next to the module
#[derive(Default)]
pub struct FakeRenderer {
    pub delay: Option<Duration>,
    pub fail_on: HashSet<String>,
    pub panic_on: HashSet<String>,
    pub cancel_after_first: Option<CancellationToken>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_on(mut self, module: &str) -> Self {
        self.fail_on.insert(module.to_string());
        self
    }

    pub fn panicking_on(mut self, module: &str) -> Self {
        self.panic_on.insert(module.to_string());
        self
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_after_first = Some(token);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, module: &Path) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = module.file_name().unwrap().to_string_lossy().into_owned();

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(token) = &self.cancel_after_first {
            token.cancel();
        }

        if self.panic_on.contains(&name) {
            panic!("renderer exploded on {}", name);
        }

        if self.fail_on.contains(&name) {
            return Err(ModripError::render(name, "exit status: 1"));
        }

        let waveform = waveform_path_for(module);
        tokio::fs::write(&waveform, b"RIFF").await?;
        Ok(waveform)
    }
}

/// Transcoder stand-in that writes the title as the output body
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail_on: HashSet<String>,
    titles: Mutex<HashMap<String, String>>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, output_name: &str) -> Self {
        self.fail_on.insert(output_name.to_string());
        self
    }

    /// Title passed for an output file name
    pub fn title_for(&self, output_name: &str) -> Option<String> {
        self.titles.lock().unwrap().get(output_name).cloned()
    }

    pub fn transcoded(&self) -> usize {
        self.titles.lock().unwrap().len()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, waveform: &Path, output: &Path, title: &str) -> Result<()> {
        assert!(waveform.exists(), "waveform missing at transcode time");
        let name = output.file_name().unwrap().to_string_lossy().into_owned();

        if self.fail_on.contains(&name) {
            return Err(ModripError::transcode("invalid data found when processing input"));
        }

        tokio::fs::write(output, title.as_bytes()).await?;
        self.titles.lock().unwrap().insert(name, title.to_string());
        Ok(())
    }
}

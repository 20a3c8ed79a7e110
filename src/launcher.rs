//! Batch render launcher
//!
//! Drives the host's command line renderer over a list of test scenes
//! described in a JSON manifest. Each active test renders in its own child
//! process with a per-test log file; a stuck render is killed at the
//! deadline and the batch moves on.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};
use thiserror::Error;

const DEFAULT_CAMERA: &str = "persp";

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("could not read test list {path}: {source}")]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed test list {path}: {source}")]
    ParseList {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry of the test manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub camera: Option<String>,
}

impl TestDescriptor {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Camera to render through, falling back to the default viewport one.
    pub fn camera(&self) -> &str {
        self.camera.as_deref().unwrap_or(DEFAULT_CAMERA)
    }
}

/// Batch configuration, usually filled from the command line.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub tests_list: PathBuf,
    pub render_path: PathBuf,
    pub scene_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_img_dir: PathBuf,
    pub output_file_ext: String,
    pub timeout: Duration,
}

/// Parse the JSON test manifest.
pub fn load_tests(path: &Path) -> Result<Vec<TestDescriptor>, LauncherError> {
    let text = std::fs::read_to_string(path).map_err(|source| LauncherError::ReadList {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LauncherError::ParseList {
        path: path.to_path_buf(),
        source,
    })
}

/// Argument vector for one test render, in the renderer's CLI dialect.
pub fn render_args(config: &LauncherConfig, test: &TestDescriptor) -> Vec<String> {
    let log_file = config.output_dir.join(format!("{}.log", test.name));
    vec![
        "-r".to_string(),
        "arnold".to_string(),
        "-log".to_string(),
        log_file.to_string_lossy().into_owned(),
        "-rd".to_string(),
        config.output_img_dir.to_string_lossy().into_owned(),
        "-cam".to_string(),
        test.camera().to_string(),
        "-im".to_string(),
        test.name.clone(),
        "-of".to_string(),
        config.output_file_ext.clone(),
        config
            .scene_path
            .join(&test.name)
            .to_string_lossy()
            .into_owned(),
    ]
}

/// Run every active test in the manifest. Returns how many rendered to
/// completion; per-test failures are logged, not fatal.
pub fn run_batch(config: &LauncherConfig) -> Result<usize, LauncherError> {
    std::fs::create_dir_all(&config.output_img_dir).map_err(|source| {
        LauncherError::OutputDir {
            path: config.output_img_dir.clone(),
            source,
        }
    })?;

    let tests = load_tests(&config.tests_list)?;
    let mut completed = 0;
    for test in tests.iter().filter(|t| t.is_active()) {
        log::info!("rendering {} through camera {}", test.name, test.camera());
        let mut command = Command::new(&config.render_path);
        command.args(render_args(config, test));

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                log::warn!("could not start renderer for {}: {}", test.name, err);
                continue;
            }
        };
        match wait_with_deadline(&mut child, config.timeout) {
            Ok(true) => completed += 1,
            Ok(false) => log::warn!("render of {} timed out, killed", test.name),
            Err(err) => log::warn!("render of {} failed: {}", test.name, err),
        }
    }
    Ok(completed)
}

/// Poll the child until it exits or the deadline passes. A timed out child
/// is killed and reaped; returns whether it finished on its own.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait()?.is_some() {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(false);
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

use std::future::Future;
use std::io::ErrorKind;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The inspection program is not installed (or not at the configured path)
    #[error("Media probe program '{0}' not found")]
    NotFound(String),

    #[error("Failed to run media probe: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media probe exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

impl ProbeError {
    /// A missing program stays missing; everything else may be transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProbeError::NotFound(_))
    }
}

/// Runs an external media inspector against a URL and returns its flat
/// `key=value` stream report.
pub trait MediaProber {
    fn probe(&self, url: &str) -> impl Future<Output = Result<String, ProbeError>> + Send;
}

/// [`MediaProber`] that shells out to `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MediaProber for FfprobeProber {
    async fn probe(&self, url: &str) -> Result<String, ProbeError> {
        tracing::debug!(program = %self.program, url = %url, "Probing media streams");

        let output = Command::new(&self.program)
            .args(["-hide_banner", "-v", "quiet", "-show_streams", "-print_format", "flat"])
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProbeError::NotFound(self.program.clone()),
                _ => ProbeError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extracts a whole-second duration from a flat stream report.
///
/// Stream 1 is preferred (video when an audio track comes first), falling
/// back to stream 0. Values that are not numbers, such as `N/A`, count as
/// absent. Fractional seconds are truncated.
pub fn parse_duration(report: &str) -> Option<u64> {
    stream_duration(report, 1).or_else(|| stream_duration(report, 0))
}

fn stream_duration(report: &str, index: usize) -> Option<u64> {
    let key = format!("streams.stream.{}.duration", index);
    report.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let seconds: f64 = v.trim().trim_matches('"').parse().ok()?;
        (seconds.is_finite() && seconds >= 0.0).then(|| seconds.trunc() as u64)
    })
}

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use crate::Error;

/// ffmpeg argv for one media stream: demux the input, drop video, emit raw
/// 16-bit little-endian PCM at 16 kHz mono on stdout.
fn transcode_args(input_url: &str) -> Vec<String> {
    [
        "-fflags",
        "nobuffer",
        "-flags",
        "low_delay",
        "-i",
        input_url,
        "-vn",
        "-acodec",
        "pcm_s16le",
        "-ar",
        "16000",
        "-ac",
        "1",
        "-f",
        "s16le",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Owns the audio-transcoding subprocess for one media stream.
pub struct Transcoder {
    child: Child,
}

impl Transcoder {
    /// Spawn the subprocess reading `input_url`. Returns the supervisor and
    /// the piped stdout carrying raw PCM. stderr is drained to debug logs.
    pub fn spawn(bin: &str, input_url: &str) -> Result<(Self, ChildStdout), Error> {
        let mut child = Command::new(bin)
            .args(transcode_args(input_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::Spawn)?;

        let stdout = child.stdout.take().ok_or(Error::MissingStdout)?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(line = %line, "transcoder_stderr");
                }
            });
        }

        Ok((Self { child }, stdout))
    }

    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    /// Terminate and reap the subprocess. Errors are ignored: the process
    /// may already be gone.
    pub async fn kill(&mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

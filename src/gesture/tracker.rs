//! External hand-tracker process.
//!
//! The tracker owns the camera. It is started with `sh -c <command>` and must
//! print one JSON [`LandmarkFrame`] per line on stdout. On unix the shell
//! leads its own process group and the whole group is killed when the
//! [`HandTracker`] is stopped or dropped, so commands the shell forks
//! (`cd dir && python3 tracker.py`) go down with it.

use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::landmarks::LandmarkFrame;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no hand tracker command configured")]
    NotConfigured,

    #[error("failed to start hand tracker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("hand tracker did not expose stdout")]
    NoOutput,

    #[error("failed to read from hand tracker: {0}")]
    Read(#[source] std::io::Error),
}

/// What the UI shows about gesture control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureStatus {
    /// Keyboard only
    Off,
    /// Tracker running
    Active,
    /// Gesture mode selected but the camera is unavailable
    CameraNeeded(String),
}

impl GestureStatus {
    pub fn label(&self) -> &str {
        match self {
            GestureStatus::Off => "Keyboard",
            GestureStatus::Active => "Gesture",
            GestureStatus::CameraNeeded(_) => "Camera needed",
        }
    }
}

/// Running tracker process and its frame stream
pub struct HandTracker {
    child: Child,
    /// Process group of the tracker; `None` once it has been killed
    group: Option<u32>,
    lines: Lines<BufReader<ChildStdout>>,
}

impl HandTracker {
    /// Spawn the tracker. A partially started child is killed before returning an error.
    pub fn start(command: &str) -> Result<Self, TrackerError> {
        if command.trim().is_empty() {
            return Err(TrackerError::NotConfigured);
        }

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(TrackerError::Spawn)?;
        let group = child.id();

        let Some(stdout) = child.stdout.take() else {
            kill_process_group(group);
            return Err(TrackerError::NoOutput);
        };

        info!(command, pid = ?group, "hand tracker started");

        Ok(Self {
            child,
            group,
            lines: BufReader::new(stdout).lines(),
        })
    }

    /// Next frame, or `None` once the tracker has exited. Malformed lines are skipped.
    pub async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, TrackerError> {
        loop {
            let Some(line) = self.lines.next_line().await.map_err(TrackerError::Read)? else {
                return Ok(None);
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<LandmarkFrame>(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => debug!(error = %e, "skipping malformed tracker line"),
            }
        }
    }

    /// Kill the tracker and wait for it to exit
    pub async fn stop(mut self) {
        kill_process_group(self.group.take());
        match self.child.kill().await {
            Ok(()) => info!("hand tracker stopped"),
            Err(e) => warn!(error = %e, "failed to stop hand tracker"),
        }
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        kill_process_group(self.group.take());
        // Already exited or already killed is fine here
        let _ = self.child.start_kill();
    }
}

/// SIGKILL every process in the group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid addresses a process group
    let rc = unsafe { libc::kill(-pid, libc::SIGKILL) };
    if rc != 0 {
        debug!(pgid = pid, error = %std::io::Error::last_os_error(), "tracker group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reads_frames_and_skips_garbage() {
        let command = r#"printf '%s\n' '{"timestamp_ms":1,"hands":[]}' 'garbage' '' '{"timestamp_ms":2}'"#;
        let mut tracker = HandTracker::start(command).unwrap();

        let first = tracker.next_frame().await.unwrap().unwrap();
        assert_eq!(first.timestamp_ms, 1);
        let second = tracker.next_frame().await.unwrap().unwrap();
        assert_eq!(second.timestamp_ms, 2);
        assert!(tracker.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_command() {
        assert!(matches!(
            HandTracker::start("   "),
            Err(TrackerError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_failed_camera_ends_stream() {
        let mut tracker = HandTracker::start("exit 3").unwrap();
        assert!(tracker.next_frame().await.unwrap().is_none());
    }

    /// Whether any process still runs with `pattern` in its command line
    fn is_running(pattern: &str) -> bool {
        std::process::Command::new("pgrep")
            .args(["-f", pattern])
            .output()
            .unwrap()
            .status
            .success()
    }

    async fn wait_until_gone(pattern: &str) -> bool {
        for _ in 0..40 {
            if !is_running(pattern) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_stop_kills_commands_forked_by_the_shell() {
        let tracker = HandTracker::start("sleep 4242; true").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(is_running("sleep 4242"));

        tracker.stop().await;
        assert!(wait_until_gone("sleep 4242").await);
    }

    #[tokio::test]
    async fn test_drop_kills_commands_forked_by_the_shell() {
        let tracker = HandTracker::start("sleep 4343; true").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(is_running("sleep 4343"));

        drop(tracker);
        assert!(wait_until_gone("sleep 4343").await);
    }

    #[tokio::test]
    async fn test_stop_kills_long_running_tracker() {
        let tracker = HandTracker::start("sleep 30").unwrap();
        tokio::time::timeout(Duration::from_secs(5), tracker.stop())
            .await
            .expect("tracker did not stop");
    }
}

//! Concrete equalizer controls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{EqualizerControl, EqualizerError, Preset};

/// Dry-run control: only logs the preset it was asked to apply.
#[derive(Debug, Default)]
pub struct LoggingEqualizer;

#[async_trait]
impl EqualizerControl for LoggingEqualizer {
    async fn apply(&self, preset: &Preset) -> Result<(), EqualizerError> {
        info!("Equalizer set to {}", preset);
        Ok(())
    }
}

/// Runs an external program with the ten gains appended as arguments.
///
/// With `program = ["eqctl", "--set"]` a jazz preset runs
/// `eqctl --set 2 1 0 1 2 -1 -2 -1 1 2`.
#[derive(Debug, Clone)]
pub struct CommandEqualizer {
    program: String,
    args: Vec<String>,
}

impl CommandEqualizer {
    /// Returns `None` when `command` is empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn arguments(&self, preset: &Preset) -> Vec<String> {
        self.args
            .iter()
            .cloned()
            .chain(preset.gains().iter().map(|g| g.to_string()))
            .collect()
    }
}

#[async_trait]
impl EqualizerControl for CommandEqualizer {
    async fn apply(&self, preset: &Preset) -> Result<(), EqualizerError> {
        let args = self.arguments(preset);
        debug!(program = %self.program, ?args, "Running equalizer command");

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(EqualizerError::CommandFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// The latest preset published by a [`WatchEqualizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPreset {
    pub preset: Preset,
    pub applied_at: DateTime<Utc>,
}

/// Publishes presets on a watch channel for in-process consumers.
pub struct WatchEqualizer {
    sender: watch::Sender<Option<AppliedPreset>>,
}

impl WatchEqualizer {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AppliedPreset>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<AppliedPreset> {
        self.sender.borrow().clone()
    }
}

impl Default for WatchEqualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EqualizerControl for WatchEqualizer {
    async fn apply(&self, preset: &Preset) -> Result<(), EqualizerError> {
        self.sender.send_replace(Some(AppliedPreset {
            preset: *preset,
            applied_at: Utc::now(),
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAZZ: Preset = Preset::new([2, 1, 0, 1, 2, -1, -2, -1, 1, 2]);

    #[tokio::test]
    async fn test_logging_equalizer_always_succeeds() {
        assert!(LoggingEqualizer.apply(&JAZZ).await.is_ok());
    }

    #[test]
    fn test_command_equalizer_requires_program() {
        assert!(CommandEqualizer::new(&[]).is_none());
    }

    #[test]
    fn test_command_arguments_append_gains() {
        let eq = CommandEqualizer::new(&["eqctl".to_string(), "--set".to_string()]).unwrap();
        assert_eq!(
            eq.arguments(&JAZZ),
            vec!["--set", "2", "1", "0", "1", "2", "-1", "-2", "-1", "1", "2"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_equalizer_success() {
        let eq = CommandEqualizer::new(&["true".to_string()]).unwrap();
        assert!(eq.apply(&JAZZ).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_equalizer_reports_failure_status() {
        let eq = CommandEqualizer::new(&["false".to_string()]).unwrap();
        let err = eq.apply(&JAZZ).await.unwrap_err();
        assert!(matches!(
            err,
            EqualizerError::CommandFailed {
                status: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_command_equalizer_missing_program_is_io_error() {
        let eq = CommandEqualizer::new(&["definitely-not-an-eq-program-4711".to_string()]).unwrap();
        let err = eq.apply(&JAZZ).await.unwrap_err();
        assert!(matches!(err, EqualizerError::Io(_)));
    }

    #[tokio::test]
    async fn test_watch_equalizer_publishes_latest() {
        let eq = WatchEqualizer::new();
        let mut rx = eq.subscribe();
        assert!(eq.current().is_none());

        eq.apply(&JAZZ).await.unwrap();

        rx.changed().await.unwrap();
        let applied = rx.borrow().clone().unwrap();
        assert_eq!(applied.preset, JAZZ);
        assert_eq!(eq.current().unwrap().preset, JAZZ);
    }

    #[tokio::test]
    async fn test_watch_equalizer_works_without_subscribers() {
        let eq = WatchEqualizer::new();
        eq.apply(&Preset::FLAT).await.unwrap();
        assert_eq!(eq.current().unwrap().preset, Preset::FLAT);
    }
}

// Out-of-process strategy: one child process per request, JSON over stdio.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::draft::state::GameSnapshot;
use crate::error::StrategyError;
use crate::protocol::{
    AttemptedFantasyActions, DraftSelection, RequestKind, StrategyRequest, WaiverClaim,
    PROTOCOL_VERSION,
};

use super::Strategy;

/// Runs an external command for every decision.
///
/// The request is written to stdin as a single JSON line and the last
/// non-empty stdout line is parsed as the response, so a bot may print
/// diagnostics before answering. The child is killed if the call is dropped
/// (for example by the runner's timeout).
pub struct ProcessStrategy {
    name: String,
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessStrategy {
    pub fn new(name: &str, command: &[String]) -> Result<Self, StrategyError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| StrategyError::Failed(format!("{}: empty command", name)))?;
        Ok(ProcessStrategy {
            name: name.to_string(),
            program: program.clone(),
            args: args.to_vec(),
            cwd: None,
        })
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: &StrategyRequest,
    ) -> Result<T, StrategyError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| StrategyError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| StrategyError::Failed("failed to capture stdin".into()))?;
        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');

        // Feed stdin while draining stdout so neither pipe can fill up and
        // stall the child. A bot may answer without reading its request.
        let name = &self.name;
        let write = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            match result {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin before reading the request", name);
                    Ok(())
                }
                other => other,
            }
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;
        written?;
        if !output.status.success() {
            return Err(StrategyError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| StrategyError::Failed(format!("{}: empty response", self.name)))?;
        debug!("{} responded: {}", self.name, line);
        Ok(serde_json::from_str(line)?)
    }

    fn check_version(&self, version: u32) {
        if version > PROTOCOL_VERSION {
            warn!(
                "{} speaks protocol version {}, host understands {}",
                self.name, version, PROTOCOL_VERSION
            );
        }
    }
}

#[async_trait::async_trait]
impl Strategy for ProcessStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn draft_player(&self, snapshot: &GameSnapshot) -> Result<String, StrategyError> {
        let request = StrategyRequest::new(RequestKind::DraftPlayer, snapshot.clone());
        let selection: DraftSelection = self.exchange(&request).await?;
        self.check_version(selection.protocol_version);
        Ok(selection.player_id)
    }

    async fn weekly_actions(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Vec<WaiverClaim>, StrategyError> {
        let request = StrategyRequest::new(RequestKind::WeeklyActions, snapshot.clone());
        let actions: AttemptedFantasyActions = self.exchange(&request).await?;
        self.check_version(actions.protocol_version);
        Ok(actions.waiver_claims)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::draft::pick::Position;
    use crate::draft::player::{Player, PlayerPool};
    use crate::draft::roster::RosterSlot;
    use crate::draft::state::{DraftState, LeagueSettings, Team};

    fn snapshot() -> GameSnapshot {
        let settings = LeagueSettings {
            num_teams: 1,
            total_rounds: 1,
            is_snake_draft: false,
            points_per_reception: 0.0,
            year: 2024,
            roster_slots: vec![RosterSlot::new("K", vec![Position::Kicker])],
        };
        let players =
            PlayerPool::new(vec![Player::new("k1", "Kicker", vec![Position::Kicker], 1)]).unwrap();
        DraftState::new(settings, vec![Team::new("t1", "T1", 0)], players)
            .unwrap()
            .snapshot("t1", None)
    }

    fn sh(script: &str) -> ProcessStrategy {
        let command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
        ProcessStrategy::new("sh-bot", &command).unwrap()
    }

    #[test]
    fn empty_command_rejected() {
        assert!(ProcessStrategy::new("none", &[]).is_err());
    }

    #[tokio::test]
    async fn reads_last_stdout_line() {
        let bot = sh("cat > /dev/null; echo 'thinking...'; echo '{\"player_id\":\"k1\"}'");
        assert_eq!(bot.draft_player(&snapshot()).await.unwrap(), "k1");
    }

    #[tokio::test]
    async fn request_carries_snapshot() {
        // Echo the player id from the request back as the selection.
        let bot = sh("grep -o '\"id\":\"k1\"' > /dev/null && echo '{\"player_id\":\"k1\"}'");
        assert_eq!(bot.draft_player(&snapshot()).await.unwrap(), "k1");
    }

    #[tokio::test]
    async fn answer_without_reading_large_request() {
        let settings = LeagueSettings {
            num_teams: 1,
            total_rounds: 1,
            is_snake_draft: false,
            points_per_reception: 0.0,
            year: 2024,
            roster_slots: vec![RosterSlot::new("K", vec![Position::Kicker])],
        };
        let players = PlayerPool::new(
            (1..=2000)
                .map(|i| {
                    Player::new(
                        &format!("k{}", i),
                        &format!("Kicker Number {}", i),
                        vec![Position::Kicker],
                        i,
                    )
                })
                .collect(),
        )
        .unwrap();
        let snapshot = DraftState::new(settings, vec![Team::new("t1", "T1", 0)], players)
            .unwrap()
            .snapshot("t1", None);

        let bot = sh("echo '{\"player_id\":\"k1\"}'");
        assert_eq!(bot.draft_player(&snapshot).await.unwrap(), "k1");
    }

    #[tokio::test]
    async fn weekly_actions_parsed() {
        let bot = sh(
            "cat > /dev/null; echo '{\"waiver_claims\":[{\"player_to_add_id\":\"k1\",\"bid_amount\":3}]}'",
        );
        let claims = bot.weekly_actions(&snapshot()).await.unwrap();
        assert_eq!(claims, vec![WaiverClaim::new("k1", "", 3)]);
    }

    #[tokio::test]
    async fn nonzero_exit_is_error() {
        let bot = sh("cat > /dev/null; echo oops >&2; exit 3");
        let err = bot.draft_player(&snapshot()).await.unwrap_err();
        assert!(matches!(err, StrategyError::ExitStatus { ref stderr, .. } if stderr == "oops"));
    }

    #[tokio::test]
    async fn garbage_output_is_protocol_error() {
        let bot = sh("cat > /dev/null; echo not-json");
        let err = bot.draft_player(&snapshot()).await.unwrap_err();
        assert!(matches!(err, StrategyError::Protocol(_)));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let command = vec!["/nonexistent/gridiron-bot".to_string()];
        let bot = ProcessStrategy::new("ghost", &command).unwrap();
        let err = bot.draft_player(&snapshot()).await.unwrap_err();
        assert!(matches!(err, StrategyError::Spawn { .. }));
    }
}

//! Spreadsheet mirror sync
//!
//! Best-effort denormalized copy of problems and users pushed to an external
//! HTTP sink. Mirror failures must never block or roll back core mutations:
//! events flow through an unbounded channel to a background worker, and
//! failed pushes stay queued locally for replay ahead of newer events.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::constants::MIRROR_REPLAY_INTERVAL_SECONDS;
use crate::models::{Problem, User};

/// Actions understood by the spreadsheet endpoint
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MirrorAction {
    AddSurvey,
    UpdateUser,
    AddBonusPoints,
    SyncAllData,
}

/// One mirror push
#[derive(Debug, Clone, Serialize)]
pub struct MirrorEvent {
    pub action: MirrorAction,
    pub payload: Value,
}

impl MirrorEvent {
    pub fn add_survey(problem: &Problem) -> Self {
        Self {
            action: MirrorAction::AddSurvey,
            payload: serde_json::to_value(problem).unwrap_or(Value::Null),
        }
    }

    pub fn update_user(user: &User) -> Self {
        Self {
            action: MirrorAction::UpdateUser,
            payload: serde_json::to_value(user).unwrap_or(Value::Null),
        }
    }

    pub fn add_bonus_points(problem_id: Uuid, author_id: Uuid, bonus: i64) -> Self {
        Self {
            action: MirrorAction::AddBonusPoints,
            payload: serde_json::json!({
                "problemId": problem_id,
                "authorId": author_id,
                "bonusPoints": bonus,
            }),
        }
    }

    pub fn sync_all(users: &[User], problems: &[Problem]) -> Self {
        Self {
            action: MirrorAction::SyncAllData,
            payload: serde_json::json!({
                "users": users,
                "problems": problems,
            }),
        }
    }
}

/// Handle used by services to enqueue mirror events
#[derive(Clone)]
pub struct MirrorHandle {
    tx: Option<mpsc::UnboundedSender<MirrorEvent>>,
}

impl MirrorHandle {
    /// No-op handle for deployments without a configured mirror
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue an event; never fails, never blocks.
    pub fn push(&self, event: MirrorEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::warn!("mirror worker is gone, event dropped");
            }
        }
    }
}

/// Spawn the background mirror worker
pub fn spawn(url: String) -> MirrorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(worker(url, rx));
    MirrorHandle { tx: Some(tx) }
}

async fn worker(url: String, mut rx: mpsc::UnboundedReceiver<MirrorEvent>) {
    let client = reqwest::Client::new();
    let mut pending: VecDeque<MirrorEvent> = VecDeque::new();
    let mut tick = tokio::time::interval(Duration::from_secs(MIRROR_REPLAY_INTERVAL_SECONDS));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(event) => {
                    pending.push_back(event);
                    flush(&client, &url, &mut pending).await;
                }
                None => {
                    flush(&client, &url, &mut pending).await;
                    break;
                }
            },
            _ = tick.tick() => {
                if !pending.is_empty() {
                    flush(&client, &url, &mut pending).await;
                }
            }
        }
    }
}

/// Replay queued events in order, stopping at the first failure.
async fn flush(client: &reqwest::Client, url: &str, pending: &mut VecDeque<MirrorEvent>) {
    while let Some(event) = pending.front() {
        match client.post(url).json(event).send().await {
            Ok(response) if response.status().is_success() => {
                pending.pop_front();
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    queued = pending.len(),
                    "mirror push rejected, will replay"
                );
                break;
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    queued = pending.len(),
                    "mirror push failed, will replay"
                );
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        let names: Vec<String> = [
            MirrorAction::AddSurvey,
            MirrorAction::UpdateUser,
            MirrorAction::AddBonusPoints,
            MirrorAction::SyncAllData,
        ]
        .iter()
        .map(|a| serde_json::to_value(a).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(names, ["addSurvey", "updateUser", "addBonusPoints", "syncAllData"]);
    }

    #[test]
    fn test_event_shape() {
        let event = MirrorEvent::add_bonus_points(Uuid::new_v4(), Uuid::new_v4(), 5);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "addBonusPoints");
        assert_eq!(value["payload"]["bonusPoints"], 5);
    }

    #[test]
    fn test_disabled_handle_accepts_events() {
        let handle = MirrorHandle::disabled();
        handle.push(MirrorEvent {
            action: MirrorAction::SyncAllData,
            payload: Value::Null,
        });
    }
}

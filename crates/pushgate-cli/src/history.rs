use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use pushgate_core::{Notification, PushError};
use pushgate_dispatch::NotificationStore;

/// Appends persisted notifications to a JSON-lines history file.
pub struct JsonlNotificationStore {
    path: PathBuf,
}

impl JsonlNotificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NotificationStore for JsonlNotificationStore {
    async fn persist(&self, notification: &Notification) -> Result<(), PushError> {
        let mut line = serde_json::to_string(notification)
            .map_err(|e| PushError::Internal(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                PushError::Internal(format!("cannot open {}: {e}", self.path.display()))
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PushError::Internal(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pushgate_core::NotificationFields;

    use super::*;

    #[tokio::test]
    async fn appends_one_json_line_per_notification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let store = JsonlNotificationStore::new(&path);

        for message in ["first", "second"] {
            let n = NotificationFields {
                message: message.to_string(),
                ..Default::default()
            }
            .build()
            .unwrap();
            store.persist(&n).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "first");
        assert_eq!(first["persist"], "unset");
    }
}

//! Change notifications for a mirrored key.
//!
//! Other processes (a second window, another workflow screen) write the mirror
//! behind our back. A watcher re-reads one key at a fixed interval and publishes
//! the value on a `watch` channel whenever it differs from the last one seen, so
//! consumers wait on `changed()` instead of polling themselves. Changes become
//! visible at most one interval late.

use super::{DataKey, KeyValueStore, LocalMirror};
use serde_json::Value;
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};

/// Spawns a task that polls `key` in `mirror` every `interval`.
///
/// The receiver starts with the value read at spawn time. The task ends once
/// every receiver has been dropped.
pub async fn watch_mirror(
    mirror: LocalMirror,
    key: DataKey,
    interval: Duration,
) -> (watch::Receiver<Value>, JoinHandle<()>) {
    let initial = mirror.get(key).await.unwrap_or_else(|e| {
        warn!(key = %key, error = %e, "cannot read mirror for watcher");
        key.empty_value()
    });
    let (tx, rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            match mirror.get(key).await {
                Ok(value) => {
                    let changed = tx.send_if_modified(|current| {
                        if *current == value {
                            false
                        } else {
                            *current = value;
                            true
                        }
                    });
                    if changed {
                        debug!(key = %key, "mirror changed");
                    }
                }
                Err(e) => warn!(key = %key, error = %e, "mirror re-read failed"),
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_watcher_publishes_external_write() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::open(dir.path()).await.unwrap();
        let (mut rx, handle) =
            watch_mirror(mirror.clone(), DataKey::RencanaTransferBarang, Duration::from_millis(10))
                .await;
        assert_eq!(*rx.borrow(), json!([]));

        // A different writer touches the same mirror directory.
        let other = LocalMirror::open(dir.path()).await.unwrap();
        other
            .set(DataKey::RencanaTransferBarang, json!([{ "id": "1" }]))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*rx.borrow_and_update(), json!([{ "id": "1" }]));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

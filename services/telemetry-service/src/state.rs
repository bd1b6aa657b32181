use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ServiceConfig;
use crate::models::Reading;

#[derive(Clone)]
pub struct AppState {
    pub devices: DeviceStore,
    pub device_id_max_len: usize,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            devices: DeviceStore::default(),
            device_id_max_len: config.device_id_max_len,
        }
    }
}

/// Latest reading per device id. One lock guards the whole map.
#[derive(Clone, Default)]
pub struct DeviceStore {
    inner: Arc<Mutex<BTreeMap<String, Reading>>>,
}

impl DeviceStore {
    /// Replaces the reading for `device_id` and returns what was stored.
    ///
    /// A device's timestamp never goes backwards: if `received_at` is older
    /// than the stored one (wall clock stepped back), the stored one is kept.
    pub async fn upsert(
        &self,
        device_id: String,
        distance: f64,
        state: Value,
        received_at: DateTime<Utc>,
    ) -> Reading {
        let mut devices = self.inner.lock().await;
        let timestamp = match devices.get(&device_id) {
            Some(previous) if previous.timestamp > received_at => previous.timestamp,
            _ => received_at,
        };
        let reading = Reading {
            distance,
            state,
            timestamp,
        };
        devices.insert(device_id, reading.clone());
        reading
    }

    pub async fn snapshot(&self) -> BTreeMap<String, Reading> {
        self.inner.lock().await.clone()
    }
}

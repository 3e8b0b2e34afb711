use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::crypto::random_hex;
use crate::crypto::token::DEVICE_ID_BYTES;
use crate::{Device, DeviceError, PendingTransfer};

/// Longest device name kept, in characters.
pub const MAX_NAME_LEN: usize = 40;

type Result<T> = std::result::Result<T, DeviceError>;

struct DeviceState {
    info: Device,
    pending: Option<PendingTransfer>,
}

/// Registered receiving devices, each with at most one pending transfer.
///
/// Everything handed out is a copy; callers never hold a reference into the
/// map.
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, DeviceState>>,
    max_devices: usize,
}

impl DeviceRegistry {
    /// `max_devices` of zero means no limit.
    pub fn new(max_devices: usize) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            max_devices,
        }
    }

    pub async fn register(&self, name: &str) -> Result<Device> {
        let name = normalize_name(name)?;
        let mut devices = self.devices.write().await;
        self.register_locked(&mut devices, name)
    }

    fn register_locked(
        &self,
        devices: &mut HashMap<String, DeviceState>,
        name: String,
    ) -> Result<Device> {
        if self.max_devices > 0 && devices.len() >= self.max_devices {
            return Err(DeviceError::RegistryFull(self.max_devices));
        }

        let id = random_hex(DEVICE_ID_BYTES).map_err(|_| DeviceError::Random)?;
        let now = Utc::now();
        let device = Device {
            id: id.clone(),
            name,
            registered_at: now,
            last_seen: now,
        };

        devices.insert(
            id,
            DeviceState {
                info: device.clone(),
                pending: None,
            },
        );
        info!(device_id = %device.id, name = %device.name, "device registered");
        Ok(device)
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<Device> {
        let name = normalize_name(name)?;
        let mut devices = self.devices.write().await;
        let state = devices
            .get_mut(id)
            .ok_or_else(|| DeviceError::NotFound(id.to_string()))?;

        state.info.name = name;
        state.info.last_seen = Utc::now();
        Ok(state.info.clone())
    }

    /// Renames the device when `id` is known, otherwise registers a new one.
    pub async fn upsert(&self, id: &str, name: &str) -> Result<Device> {
        if !id.is_empty() {
            match self.update(id, name).await {
                Err(DeviceError::NotFound(_)) => {}
                other => return other,
            }
        }
        self.register(name).await
    }

    pub async fn get(&self, id: &str) -> Option<Device> {
        let devices = self.devices.read().await;
        devices.get(id).map(|state| state.info.clone())
    }

    /// All devices, oldest registration first.
    pub async fn list(&self) -> Vec<Device> {
        let devices = self.devices.read().await;
        let mut out: Vec<Device> = devices.values().map(|state| state.info.clone()).collect();
        out.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    /// Replaces whatever was pending for the device.
    pub async fn notify(&self, device_id: &str, pending: PendingTransfer) -> Result<()> {
        let mut devices = self.devices.write().await;
        let state = devices
            .get_mut(device_id)
            .ok_or_else(|| DeviceError::NotFound(device_id.to_string()))?;

        debug!(device_id, transfer_id = %pending.transfer_id, "pending transfer set");
        state.pending = Some(pending);
        state.info.last_seen = Utc::now();
        Ok(())
    }

    /// The device's pending transfer, if any. Counts as the device being
    /// seen.
    pub async fn pending(&self, device_id: &str) -> Result<Option<PendingTransfer>> {
        let mut devices = self.devices.write().await;
        let state = devices
            .get_mut(device_id)
            .ok_or_else(|| DeviceError::NotFound(device_id.to_string()))?;

        state.info.last_seen = Utc::now();
        Ok(state.pending.clone())
    }

    /// Clears the pending slot if it still refers to `transfer_id`, or
    /// unconditionally when `transfer_id` is empty.
    pub async fn clear(&self, device_id: &str, transfer_id: &str) {
        let mut devices = self.devices.write().await;
        let Some(state) = devices.get_mut(device_id) else {
            return;
        };

        let matches = match &state.pending {
            Some(pending) => transfer_id.is_empty() || pending.transfer_id == transfer_id,
            None => false,
        };
        if matches {
            state.pending = None;
        }
    }

    /// Clears every pending slot pointing at `transfer_id`.
    pub async fn clear_by_transfer(&self, transfer_id: &str) -> usize {
        if transfer_id.is_empty() {
            return 0;
        }

        let mut devices = self.devices.write().await;
        let mut cleared = 0;
        for state in devices.values_mut() {
            if state
                .pending
                .as_ref()
                .is_some_and(|p| p.transfer_id == transfer_id)
            {
                state.pending = None;
                cleared += 1;
            }
        }

        if cleared > 0 {
            debug!(transfer_id, cleared, "pending transfers cleared");
        }
        cleared
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DeviceError::EmptyName);
    }
    Ok(name.chars().take(MAX_NAME_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_truncated() {
        assert_eq!(normalize_name("  Phone  ").unwrap(), "Phone");
        let long = "x".repeat(50);
        assert_eq!(normalize_name(&long).unwrap().len(), MAX_NAME_LEN);
        let accented = "é".repeat(45);
        assert_eq!(normalize_name(&accented).unwrap().chars().count(), MAX_NAME_LEN);
        assert!(matches!(normalize_name(" \t "), Err(DeviceError::EmptyName)));
    }
}

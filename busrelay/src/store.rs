//! Position Store - in-memory table of the latest position per vehicle.
//!
//! The store is the single source of truth the relay serves from. It is
//! created once per relay instance and handed to every session as an
//! `Arc<PositionStore>`; nothing about it is global.
//!
//! # Thread Safety
//!
//! Backed by a `DashMap`: inserts take a per-shard write lock and replace the
//! whole record, so a reader never sees half of an update. Snapshots walk the
//! shards one at a time, which means a snapshot may mix records written at
//! slightly different moments. Viewers only need per-vehicle consistency.
//!
//! Entries never expire: a vehicle that stops reporting stays visible at its
//! last position for the lifetime of the store.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{VehiclePosition, WindowBounds};

/// Shared handle to a [`PositionStore`].
pub type SharedPositionStore = Arc<PositionStore>;

/// Latest known position of every vehicle, keyed by vehicle identifier.
#[derive(Debug, Default)]
pub struct PositionStore {
    positions: DashMap<String, VehiclePosition>,
}

impl PositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped for sharing between sessions.
    pub fn shared() -> SharedPositionStore {
        Arc::new(Self::new())
    }

    /// Insert or fully replace the position of `position.bus_id`.
    ///
    /// Last write wins; there is no ordering between updates. Returns the
    /// previous record, if any.
    pub fn upsert(&self, position: VehiclePosition) -> Option<VehiclePosition> {
        self.positions.insert(position.bus_id.clone(), position)
    }

    /// Current position of one vehicle.
    pub fn get(&self, bus_id: &str) -> Option<VehiclePosition> {
        self.positions.get(bus_id).map(|entry| entry.value().clone())
    }

    /// Copy of every stored position, in no particular order.
    pub fn snapshot(&self) -> Vec<VehiclePosition> {
        self.positions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Copy of the positions inside `bounds`.
    pub fn snapshot_within(&self, bounds: &WindowBounds) -> Vec<VehiclePosition> {
        self.positions
            .iter()
            .filter(|entry| bounds.contains(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of vehicles seen so far.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

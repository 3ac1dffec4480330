//! Vehicle Simulator - synthetic position generation for one vehicle.
//!
//! The point a vehicle reports is derived from wall-clock time rather than an
//! internal counter:
//!
//! ```text
//! index = (phase_offset + floor(now / interval)) mod route_len
//! ```
//!
//! Vehicles sharing a route get phase offsets `start + n * PHASE_SPACING`, so
//! they sit at different points of the route (unless the spacing happens to
//! be a multiple of the route length).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::model::{Route, VehiclePosition};

/// Index into a route of `route_len` points at time `now` (since the epoch).
///
/// `interval` must be non-zero and `route_len` must be positive.
pub fn route_index(phase_offset: u64, now: Duration, interval: Duration, route_len: usize) -> usize {
    let ticks = now.as_nanos() / interval.as_nanos().max(1);
    let len = route_len.max(1) as u128;
    ((u128::from(phase_offset) + ticks) % len) as usize
}

/// Generates positions for one vehicle on a fixed cadence.
///
/// The simulator knows nothing about delivery: it only pushes onto the queue
/// it was given. A full queue makes it wait; a closed queue stops it.
#[derive(Debug, Clone)]
pub struct VehicleSimulator {
    bus_id: String,
    route: Route,
    phase_offset: u64,
    interval: Duration,
}

impl VehicleSimulator {
    pub fn new(bus_id: impl Into<String>, route: Route, phase_offset: u64, interval: Duration) -> Self {
        Self {
            bus_id: bus_id.into(),
            route,
            phase_offset,
            interval,
        }
    }

    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// Position at the given wall-clock time.
    pub fn position_at(&self, now: SystemTime) -> VehiclePosition {
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        let index = route_index(self.phase_offset, since_epoch, self.interval, self.route.len());
        let (lat, lng) = self.route.point(index);
        VehiclePosition::new(self.bus_id.clone(), self.route.name.clone(), lat, lng)
    }

    /// Emit a position every interval until cancelled or the queue closes.
    pub async fn run(self, queue: mpsc::Sender<VehiclePosition>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut emitted: u64 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let position = self.position_at(SystemTime::now());
            trace!(bus_id = %self.bus_id, lat = position.lat, lng = position.lng, "Send value to channel");

            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = queue.send(position) => {
                    if sent.is_err() {
                        debug!(bus_id = %self.bus_id, "Delivery queue closed, stopping simulator");
                        break;
                    }
                    emitted += 1;
                }
            }
        }

        debug!(bus_id = %self.bus_id, emitted, "Simulator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_point_route() -> Route {
        let points = (0..10).map(|i| (i as f64, i as f64 * 2.0)).collect();
        Route::new("R", points).unwrap()
    }

    #[test]
    fn test_route_index_formula() {
        let second = Duration::from_secs(1);
        assert_eq!(route_index(0, Duration::from_secs(0), second, 10), 0);
        assert_eq!(route_index(0, Duration::from_secs(7), second, 10), 7);
        assert_eq!(route_index(3, Duration::from_secs(7), second, 10), 0);
        assert_eq!(route_index(0, Duration::from_millis(7_999), second, 10), 7);
    }

    #[test]
    fn test_route_index_uses_interval() {
        let interval = Duration::from_secs(5);
        assert_eq!(route_index(0, Duration::from_secs(24), interval, 10), 4);
        assert_eq!(route_index(0, Duration::from_secs(25), interval, 10), 5);
    }

    #[test]
    fn test_phase_spacing_wraps_modulo_route_length() {
        let now = Duration::from_secs(1_700_000_123);
        let second = Duration::from_secs(1);

        // 100 mod 10 == 0: same point on a 10 point route
        assert_eq!(route_index(0, now, second, 10), route_index(100, now, second, 10));

        // 100 mod 7 == 2: different points on a 7 point route
        let a = route_index(0, now, second, 7);
        let b = route_index(100, now, second, 7);
        assert_ne!(a, b);
        assert_eq!(b, (a + 2) % 7);
    }

    #[test]
    fn test_position_at_reads_route_point() {
        let simulator = VehicleSimulator::new("emu-R-0", ten_point_route(), 2, Duration::from_secs(1));
        let now = UNIX_EPOCH + Duration::from_secs(1_000_003);

        let position = simulator.position_at(now);

        // (2 + 1_000_003) mod 10 == 5
        assert_eq!(position, VehiclePosition::new("emu-R-0", "R", 5.0, 10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_emits_on_cadence() {
        let simulator = VehicleSimulator::new("emu-R-0", ten_point_route(), 0, Duration::from_secs(1));
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(simulator.run(tx, cancel.clone()));

        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            let position = rx.recv().await.unwrap();
            assert_eq!(position.bus_id, "emu-R-0");
            assert_eq!(position.route, "R");
        }
        // First tick is immediate, then one per interval
        assert_eq!(start.elapsed(), Duration::from_secs(2));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_queue_closes() {
        let simulator = VehicleSimulator::new("emu-R-0", ten_point_route(), 0, Duration::from_secs(1));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let finished = tokio::time::timeout(
            Duration::from_secs(10),
            simulator.run(tx, CancellationToken::new()),
        )
        .await;
        assert!(finished.is_ok());
    }
}

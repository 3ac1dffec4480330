//! Emulator orchestration: routes in, simulators wired to pool slots.

use rand::Rng;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::{EmulatorConfig, MAX_START_OFFSET, PHASE_SPACING};
use super::connector::WsConnector;
use super::pool::{Connector, DeliveryPool};
use super::routes::{DirectoryRouteSource, RouteError, RouteSource};
use super::simulator::VehicleSimulator;
use crate::model::Route;

/// Bus identifier unique per emulator instance.
pub fn generate_bus_id(emulator_id: &str, route: &str, index: usize) -> String {
    format!("{}-{}-{}", emulator_id, route, index)
}

/// A full emulator run.
pub struct Emulator<S, C> {
    config: EmulatorConfig,
    routes: S,
    connector: C,
}

impl Emulator<DirectoryRouteSource, WsConnector> {
    /// Routes from `config.routes_dir`, delivery over WebSocket to `config.server_url`.
    pub fn from_config(config: EmulatorConfig) -> Self {
        let routes = DirectoryRouteSource::new(config.routes_dir.clone());
        let connector = WsConnector::new(config.server_url.clone());
        Self::new(config, routes, connector)
    }
}

impl<S: RouteSource, C: Connector> Emulator<S, C> {
    pub fn new(config: EmulatorConfig, routes: S, connector: C) -> Self {
        Self {
            config,
            routes,
            connector,
        }
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Run every simulator until `cancel` fires.
    ///
    /// Fails only if the route source cannot be opened at all; individual
    /// broken routes are logged and skipped.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), RouteError> {
        let routes = self.load_routes()?;
        let buses_per_route = self.config.buses_per_route;
        if routes.is_empty() || buses_per_route == 0 {
            warn!(routes = routes.len(), buses_per_route, "Nothing to emulate");
            return Ok(());
        }

        let pool = DeliveryPool::start(self.connector, &self.config.pool, cancel.clone());

        let simulators = {
            let mut rng = rand::rng();
            let delta_start = rng.random_range(0..=MAX_START_OFFSET);
            let mut planned = Vec::with_capacity(routes.len() * buses_per_route);
            for route in &routes {
                for index in 0..buses_per_route {
                    let bus_id = generate_bus_id(&self.config.emulator_id, &route.name, index);
                    let phase_offset = delta_start + index as u64 * PHASE_SPACING;
                    let slot = pool.assign(&mut rng);
                    let simulator = VehicleSimulator::new(
                        bus_id,
                        route.clone(),
                        phase_offset,
                        self.config.refresh_interval,
                    );
                    planned.push((simulator, slot));
                }
            }
            planned
        };

        info!(
            routes = routes.len(),
            buses = simulators.len(),
            slots = pool.len(),
            server = %self.config.server_url,
            "Emulator started"
        );

        let mut tasks = JoinSet::new();
        for (simulator, slot) in simulators {
            tasks.spawn(simulator.run(slot.queue, cancel.clone()));
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Simulator task failed");
            }
        }
        pool.join().await;

        info!("Emulator stopped");
        Ok(())
    }

    fn load_routes(&self) -> Result<Vec<Route>, RouteError> {
        let routes = self
            .routes
            .routes(self.config.routes_limit)?
            .filter_map(|route| match route {
                Ok(route) => Some(route),
                Err(e) => {
                    warn!(error = %e, "Skipping route");
                    None
                }
            })
            .collect();
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_position;
    use crate::emulator::config::PoolConfig;
    use crate::emulator::pool::ConnectionError;
    use crate::transport::{MessageSink, TransportError};
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingConnector {
        delivered: Arc<Mutex<Vec<String>>>,
    }

    struct RecordingSink {
        delivered: Arc<Mutex<Vec<String>>>,
    }

    impl MessageSink for RecordingSink {
        async fn send(&mut self, message: String) -> Result<(), TransportError> {
            self.delivered.lock().unwrap().push(message);
            Ok(())
        }
    }

    impl Connector for RecordingConnector {
        type Sink = RecordingSink;

        async fn connect(&self) -> Result<RecordingSink, ConnectionError> {
            Ok(RecordingSink {
                delivered: Arc::clone(&self.delivered),
            })
        }
    }

    fn config(buses_per_route: usize, routes_limit: usize) -> EmulatorConfig {
        EmulatorConfig {
            emulator_id: "emu".to_string(),
            buses_per_route,
            routes_limit,
            pool: PoolConfig {
                size: 2,
                ..PoolConfig::default()
            },
            ..EmulatorConfig::default()
        }
    }

    fn routes() -> Vec<Route> {
        vec![
            Route::new("A", (0..10).map(|i| (i as f64, 0.0)).collect()).unwrap(),
            Route::new("B", (0..7).map(|i| (0.0, i as f64)).collect()).unwrap(),
        ]
    }

    #[test]
    fn test_generate_bus_id() {
        assert_eq!(generate_bus_id("emu", "156", 3), "emu-156-3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_bus_reports() {
        let connector = RecordingConnector::default();
        let delivered = Arc::clone(&connector.delivered);
        let cancel = CancellationToken::new();
        let emulator = Emulator::new(config(2, 0), routes(), connector);
        let handle = tokio::spawn(emulator.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        cancel.cancel();
        handle.await.unwrap().unwrap();

        let positions: Vec<_> = delivered
            .lock()
            .unwrap()
            .iter()
            .map(|m| decode_position(m.as_bytes()).unwrap())
            .collect();
        let ids: BTreeSet<_> = positions.iter().map(|p| p.bus_id.as_str()).collect();
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["emu-A-0", "emu-A-1", "emu-B-0", "emu-B-1"]
        );
        assert!(positions
            .iter()
            .all(|p| p.bus_id.starts_with(&format!("emu-{}-", p.route))));
        // At least three ticks per bus in 3.5 seconds
        assert!(positions.len() >= 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_routes_limit_is_applied() {
        let connector = RecordingConnector::default();
        let delivered = Arc::clone(&connector.delivered);
        let cancel = CancellationToken::new();
        let emulator = Emulator::new(config(1, 1), routes(), connector);
        let handle = tokio::spawn(emulator.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        cancel.cancel();
        handle.await.unwrap().unwrap();

        let routes: BTreeSet<String> = delivered
            .lock()
            .unwrap()
            .iter()
            .map(|m| decode_position(m.as_bytes()).unwrap().route)
            .collect();
        assert_eq!(routes.into_iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_zero_buses_returns_immediately() {
        let emulator = Emulator::new(config(0, 0), routes(), RecordingConnector::default());
        emulator.run(CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_route_directory_fails() {
        let config = EmulatorConfig {
            routes_dir: "/definitely/not/here".into(),
            ..config(1, 0)
        };
        let emulator = Emulator::from_config(config);
        assert!(matches!(
            emulator.run(CancellationToken::new()).await,
            Err(RouteError::Directory { .. })
        ));
    }
}

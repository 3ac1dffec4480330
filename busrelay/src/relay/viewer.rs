//! Viewer session - one per viewer connection.
//!
//! A session runs two loops over the same connection:
//!
//! - **Bounds listener** reads `newBounds` messages and publishes each decoded
//!   [`WindowBounds`] as a whole new value on a `watch` channel.
//! - **Broadcaster** wakes every interval, reads the latest bounds, snapshots
//!   the store and sends the vehicles inside the window.
//!
//! Because bounds are swapped as a complete value, the broadcaster can never
//! observe a half-applied update. Whichever loop finishes first cancels the
//! other; the session returns only after both have stopped.

use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::codec::{decode_bounds_message, encode_buses, encode_errors};
use crate::model::WindowBounds;
use crate::store::PositionStore;
use crate::transport::{MessageSink, MessageSource, TransportError};

/// Serve one viewer until it disconnects or `cancel` fires.
///
/// Bounds start at the whole globe, so a viewer that never sends
/// `newBounds` receives every vehicle.
pub async fn run_viewer_session<R, W>(
    source: R,
    sink: W,
    store: &PositionStore,
    broadcast_interval: Duration,
    cancel: CancellationToken,
) -> Result<(), TransportError>
where
    R: MessageSource,
    W: MessageSink,
{
    let session = cancel.child_token();
    let (bounds_tx, bounds_rx) = watch::channel(WindowBounds::world());
    let sink = Mutex::new(sink);

    let (listened, broadcast) = tokio::join!(
        async {
            let result = listen_bounds(source, &sink, bounds_tx, &session).await;
            session.cancel();
            result
        },
        async {
            let result = broadcast_positions(&sink, store, bounds_rx, broadcast_interval, &session)
                .await;
            session.cancel();
            result
        },
    );

    listened.and(broadcast)
}

async fn listen_bounds<R, W>(
    mut source: R,
    sink: &Mutex<W>,
    bounds: watch::Sender<WindowBounds>,
    cancel: &CancellationToken,
) -> Result<(), TransportError>
where
    R: MessageSource,
    W: MessageSink,
{
    loop {
        let raw = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            received = source.recv() => match received? {
                Some(raw) => raw,
                None => {
                    debug!("Viewer closed the connection");
                    return Ok(());
                }
            },
        };

        match decode_bounds_message(&raw) {
            Ok(new_bounds) => {
                debug!(bounds = ?new_bounds, "Update window bounds");
                bounds.send_replace(new_bounds);
            }
            Err(error) => {
                let reply = encode_errors(&error)?;
                warn!(error = %error, reply = %reply, "Got wrong message from viewer");
                match sink.lock().await.send(reply).await {
                    Ok(()) => {}
                    Err(e) if e.is_closed() => return Ok(()),
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

async fn broadcast_positions<W>(
    sink: &Mutex<W>,
    store: &PositionStore,
    bounds: watch::Receiver<WindowBounds>,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<(), TransportError>
where
    W: MessageSink,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        let window = *bounds.borrow();
        let buses = store.snapshot_within(&window);
        debug!("{} buses in window from {}", buses.len(), store.len());

        let message = encode_buses(&buses)?;
        trace!(message = %message, "Send buses to viewer");

        let sent = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            sent = async { sink.lock().await.send(message).await } => sent,
        };
        match sent {
            Ok(()) => {}
            Err(e) if e.is_closed() => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehiclePosition;
    use crate::transport::memory;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const INTERVAL: Duration = Duration::from_secs(1);

    fn bounds_message(south: f64, north: f64, west: f64, east: f64) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "msgType": "newBounds",
            "data": {"south_lat": south, "north_lat": north, "west_lng": west, "east_lng": east}
        }))
        .unwrap()
    }

    async fn next_of_type(outbound: &mut mpsc::UnboundedReceiver<String>, msg_type: &str) -> Value {
        loop {
            let raw = outbound.recv().await.expect("session ended early");
            let value: Value = serde_json::from_str(&raw).unwrap();
            if value["msgType"] == msg_type {
                return value;
            }
        }
    }

    fn bus_ids(message: &Value) -> Vec<String> {
        let mut ids: Vec<String> = message["buses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["busId"].as_str().unwrap().to_string())
            .collect();
        ids.sort();
        ids
    }

    struct Session {
        inbound: mpsc::UnboundedSender<Vec<u8>>,
        outbound: mpsc::UnboundedReceiver<String>,
        handle: tokio::task::JoinHandle<Result<(), TransportError>>,
    }

    fn start(store: Arc<PositionStore>, cancel: CancellationToken) -> Session {
        let (inbound, source) = memory::source();
        let (sink, outbound) = memory::sink();
        let handle = tokio::spawn(async move {
            run_viewer_session(source, sink, &store, INTERVAL, cancel).await
        });
        Session {
            inbound,
            outbound,
            handle,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_bounds_broadcast_everything() {
        let store = PositionStore::shared();
        store.upsert(VehiclePosition::new("1", "A", 1.0, 2.0));
        let mut session = start(Arc::clone(&store), CancellationToken::new());

        let message = next_of_type(&mut session.outbound, "Buses").await;

        let buses = message["buses"].as_array().unwrap();
        assert_eq!(buses.len(), 1);
        let bus: VehiclePosition = serde_json::from_value(buses[0].clone()).unwrap();
        assert_eq!(bus, VehiclePosition::new("1", "A", 1.0, 2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_bounds_filter_following_broadcasts() {
        let store = PositionStore::shared();
        store.upsert(VehiclePosition::new("inside", "A", 1.5, 3.5));
        store.upsert(VehiclePosition::new("outside", "A", 0.9, 3.5));
        let mut session = start(Arc::clone(&store), CancellationToken::new());

        let first = next_of_type(&mut session.outbound, "Buses").await;
        assert_eq!(bus_ids(&first), vec!["inside", "outside"]);

        session.inbound.send(bounds_message(1.0, 2.0, 3.0, 4.0)).unwrap();

        let second = next_of_type(&mut session.outbound, "Buses").await;
        assert_eq!(bus_ids(&second), vec!["inside"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_sees_later_ingested_positions() {
        let store = PositionStore::shared();
        let mut session = start(Arc::clone(&store), CancellationToken::new());

        let first = next_of_type(&mut session.outbound, "Buses").await;
        assert!(bus_ids(&first).is_empty());

        store.upsert(VehiclePosition::new("late", "B", 10.0, 10.0));

        let second = next_of_type(&mut session.outbound, "Buses").await;
        assert_eq!(bus_ids(&second), vec!["late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_bounds_get_error_reply_and_keep_window() {
        let store = PositionStore::shared();
        store.upsert(VehiclePosition::new("1", "A", 1.5, 3.5));
        let mut session = start(Arc::clone(&store), CancellationToken::new());

        let invalid = serde_json::to_vec(&json!({
            "msgType": "wrong",
            "data": {"south_lat": -95, "north_lat": 107, "west_lng": -210, "east_lng": 415}
        }))
        .unwrap();
        session.inbound.send(invalid).unwrap();

        let errors = next_of_type(&mut session.outbound, "Errors").await;
        assert_eq!(errors["errors"].as_array().unwrap().len(), 5);

        // Window is still the whole world
        let buses = next_of_type(&mut session.outbound, "Buses").await;
        assert_eq!(bus_ids(&buses), vec!["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_json_gets_single_error_entry() {
        let store = PositionStore::shared();
        let mut session = start(store, CancellationToken::new());

        session.inbound.send(b"invalid json".to_vec()).unwrap();

        let errors = next_of_type(&mut session.outbound, "Errors").await;
        assert_eq!(errors["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewer_disconnect_stops_both_loops() {
        let store = PositionStore::shared();
        let mut session = start(store, CancellationToken::new());
        next_of_type(&mut session.outbound, "Buses").await;

        drop(session.inbound);

        let result = tokio::time::timeout(Duration::from_secs(5), session.handle)
            .await
            .expect("session should stop once the viewer disconnects")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_outbound_stops_both_loops() {
        let store = PositionStore::shared();
        let session = start(store, CancellationToken::new());

        drop(session.outbound);

        let result = tokio::time::timeout(Duration::from_secs(5), session.handle)
            .await
            .expect("session should stop once sends fail")
            .unwrap();
        assert!(result.is_ok());
        drop(session.inbound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_session() {
        let store = PositionStore::shared();
        let cancel = CancellationToken::new();
        let session = start(store, cancel.clone());

        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), session.handle)
            .await
            .expect("session should stop on cancel")
            .unwrap();
        assert!(result.is_ok());
    }
}

//! Ingestion session - one per inbound vehicle connection.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::codec::{decode_position, encode_errors};
use crate::store::PositionStore;
use crate::transport::{MessageSink, MessageSource, TransportError};

/// Receive position records and upsert them into the store.
///
/// Each valid record fully replaces the vehicle's previous entry. An invalid
/// record is answered with one `Errors` message on the same connection and the
/// loop carries on. The session ends when the peer closes the connection or
/// `cancel` fires; both are a normal `Ok(())`.
pub async fn run_ingestion_session<R, W>(
    mut source: R,
    mut sink: W,
    store: &PositionStore,
    cancel: CancellationToken,
) -> Result<(), TransportError>
where
    R: MessageSource,
    W: MessageSink,
{
    let mut accepted: u64 = 0;
    let mut rejected: u64 = 0;

    loop {
        let raw = tokio::select! {
            _ = cancel.cancelled() => break,
            received = source.recv() => match received? {
                Some(raw) => raw,
                None => break,
            },
        };

        match decode_position(&raw) {
            Ok(position) => {
                accepted += 1;
                debug!(
                    bus_id = %position.bus_id,
                    route = %position.route,
                    lat = position.lat,
                    lng = position.lng,
                    "Received bus position"
                );
                store.upsert(position);
            }
            Err(error) => {
                rejected += 1;
                let reply = encode_errors(&error)?;
                warn!(error = %error, reply = %reply, "Rejected message from bus");
                match sink.send(reply).await {
                    Ok(()) => {}
                    Err(e) if e.is_closed() => break,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    debug!(accepted, rejected, "Ingestion session finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehiclePosition;
    use crate::transport::memory;
    use serde_json::{json, Value};

    async fn ingest(messages: Vec<Vec<u8>>) -> (PositionStore, Vec<Value>) {
        let store = PositionStore::new();
        let (inbound, source) = memory::source();
        let (sink, mut outbound) = memory::sink();

        for message in messages {
            inbound.send(message).unwrap();
        }
        drop(inbound);

        run_ingestion_session(source, sink, &store, CancellationToken::new())
            .await
            .unwrap();

        let mut replies = Vec::new();
        while let Ok(reply) = outbound.try_recv() {
            replies.push(serde_json::from_str(&reply).unwrap());
        }
        (store, replies)
    }

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[tokio::test]
    async fn test_valid_position_is_stored_without_reply() {
        let (store, replies) =
            ingest(vec![bytes(json!({"busId": "1", "lat": 1, "lng": 2, "route": "A"}))]).await;

        assert!(replies.is_empty());
        assert_eq!(store.get("1"), Some(VehiclePosition::new("1", "A", 1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_invalid_json_gets_one_error_reply() {
        let (store, replies) = ingest(vec![b"invalid json".to_vec()]).await;

        assert!(store.is_empty());
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["msgType"], "Errors");
        assert_eq!(replies[0]["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_fields_are_batched_into_one_reply() {
        let (store, replies) = ingest(vec![bytes(
            json!({"busId": [], "lat": -100, "lng": 200, "route": []}),
        )])
        .await;

        assert!(store.is_empty());
        assert_eq!(replies.len(), 1);
        let errors = replies[0]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 4);
        for field in ["busId", "lat", "lng", "route"] {
            let count = errors
                .iter()
                .filter(|e| e["loc"].as_array().unwrap().contains(&json!(field)))
                .count();
            assert_eq!(count, 1, "{field}");
        }
    }

    #[tokio::test]
    async fn test_incomplete_record_names_missing_field() {
        let (_, replies) = ingest(vec![bytes(json!({"busId": "43", "lat": -17, "lng": 20}))]).await;

        let errors = replies[0]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["loc"], json!(["route"]));
    }

    #[tokio::test]
    async fn test_session_continues_after_bad_message() {
        let (store, replies) = ingest(vec![
            b"{".to_vec(),
            bytes(json!({"busId": "1", "lat": 1, "lng": 2, "route": "A"})),
            bytes(json!({"busId": "1", "lat": 3, "lng": 4, "route": "A"})),
        ])
        .await;

        assert_eq!(replies.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().lat, 3.0);
    }

    #[tokio::test]
    async fn test_cancel_ends_session() {
        let store = PositionStore::new();
        let (_inbound, source) = memory::source();
        let (sink, _outbound) = memory::sink();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_ingestion_session(source, sink, &store, cancel).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_closed_reply_channel_ends_session_cleanly() {
        let store = PositionStore::new();
        let (inbound, source) = memory::source();
        let (sink, outbound) = memory::sink();
        drop(outbound);
        inbound.send(b"nope".to_vec()).unwrap();

        let result = run_ingestion_session(source, sink, &store, CancellationToken::new()).await;
        assert!(result.is_ok());
    }
}

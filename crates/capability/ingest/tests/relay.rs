use domain::DeviceStatus;
use plc_ingest::{IotMessageHandler, MessageRelay, RelaySummary, StoreMessageHandler};
use plc_storage::{
    InMemoryMessageStore, InMemoryPlcStore, IotMessageRecord, MessageStore, PlcRecord, PlcStore,
};
use std::sync::Arc;
use std::time::Duration;

fn plc(plc_id: &str, status: DeviceStatus) -> PlcRecord {
    PlcRecord {
        plc_id: plc_id.to_string(),
        ip_address: "10.0.0.1".to_string(),
        port: 502,
        unit_id: 1,
        status,
        created_at_ms: 1_000,
    }
}

#[tokio::test]
async fn relay_upserts_latest_message_per_device() {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let message_store = Arc::new(InMemoryMessageStore::new());
    plc_store
        .create_plc(plc("PLC1", DeviceStatus::Active))
        .await
        .expect("seed");
    plc_store
        .create_plc(plc("PLC2", DeviceStatus::Inactive))
        .await
        .expect("seed");

    for (id, device_id, ts_ms, body) in [
        ("m1", "PLC1", 1_000, "boot"),
        ("m2", "PLC1", 3_000, "run"),
        ("m3", "PLC2", 2_000, "standby"),
    ] {
        message_store
            .insert_message(IotMessageRecord {
                message_id: id.to_string(),
                device_id: device_id.to_string(),
                message: body.to_string(),
                ts_ms,
            })
            .await
            .expect("seed message");
    }

    let relay = MessageRelay::new(
        plc_store,
        message_store.clone(),
        Duration::from_secs(5),
    );
    let summary = relay.run_once().await.expect("relay");
    // 中继不按设备状态过滤
    assert_eq!(
        summary,
        RelaySummary {
            relayed: 2,
            skipped: 0,
            failed: 0,
        }
    );

    let last = message_store
        .find_last_message("PLC1")
        .await
        .expect("query")
        .expect("present");
    assert_eq!(last.message, "run");
    let last = message_store
        .find_last_message("PLC2")
        .await
        .expect("query")
        .expect("present");
    assert_eq!(last.message, "standby");
}

#[tokio::test]
async fn devices_without_messages_are_skipped() {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let message_store = Arc::new(InMemoryMessageStore::new());
    plc_store
        .create_plc(plc("PLC1", DeviceStatus::Active))
        .await
        .expect("seed");

    let relay = MessageRelay::new(
        plc_store,
        message_store.clone(),
        Duration::from_secs(5),
    );
    let summary = relay.run_once().await.expect("relay");
    assert_eq!(
        summary,
        RelaySummary {
            relayed: 0,
            skipped: 1,
            failed: 0,
        }
    );
    assert!(message_store
        .find_last_message("PLC1")
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn repeated_relay_overwrites_last_message() {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let message_store = Arc::new(InMemoryMessageStore::new());
    plc_store
        .create_plc(plc("PLC1", DeviceStatus::Active))
        .await
        .expect("seed");
    message_store
        .insert_message(IotMessageRecord {
            message_id: "m1".to_string(),
            device_id: "PLC1".to_string(),
            message: "boot".to_string(),
            ts_ms: 1_000,
        })
        .await
        .expect("seed message");

    let relay = MessageRelay::new(
        plc_store,
        message_store.clone(),
        Duration::from_secs(5),
    );
    relay.run_once().await.expect("relay");

    message_store
        .insert_message(IotMessageRecord {
            message_id: "m2".to_string(),
            device_id: "PLC1".to_string(),
            message: "halt".to_string(),
            ts_ms: 2_000,
        })
        .await
        .expect("seed message");
    relay.run_once().await.expect("relay again");

    let last = message_store
        .find_last_message("PLC1")
        .await
        .expect("query")
        .expect("present");
    assert_eq!(last.message, "halt");
}

#[tokio::test]
async fn store_handler_appends_incoming_messages() {
    let message_store = Arc::new(InMemoryMessageStore::new());
    let handler = StoreMessageHandler::new(message_store.clone());

    handler
        .handle("PLC1", "temperature=21", 1_000)
        .await
        .expect("handle");
    handler
        .handle("PLC1", "temperature=22", 2_000)
        .await
        .expect("handle");

    let latest = message_store
        .find_latest_message("PLC1")
        .await
        .expect("query")
        .expect("present");
    assert_eq!(latest.message, "temperature=22");
    assert_eq!(latest.ts_ms, 2_000);
}

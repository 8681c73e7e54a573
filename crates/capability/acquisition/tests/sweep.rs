use domain::DeviceStatus;
use plc_acquisition::{AcquisitionConfig, AcquisitionService, SweepSummary};
use plc_protocol::{SimulatedConnector, SimulatedRegisterDevice};
use plc_storage::{
    InMemoryPlcStore, InMemoryReadingStore, PagedCollection, PlcRecord, PlcStore, ReadingFilter,
    ReadingRecord, ReadingStore, StorageError,
};
use std::sync::Arc;

fn plc(plc_id: &str, ip_address: &str, created_at_ms: i64, status: DeviceStatus) -> PlcRecord {
    PlcRecord {
        plc_id: plc_id.to_string(),
        ip_address: ip_address.to_string(),
        port: 502,
        unit_id: 1,
        status,
        created_at_ms,
    }
}

struct Fixture {
    plc_store: Arc<InMemoryPlcStore>,
    reading_store: Arc<InMemoryReadingStore>,
    connector: Arc<SimulatedConnector>,
    service: AcquisitionService,
}

/// 每台设备一个独立端点（10.0.0.{n}），寄存器初值 [n, n+100]。
async fn fixture(device_count: usize) -> Fixture {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let reading_store = Arc::new(InMemoryReadingStore::new());
    let connector = Arc::new(SimulatedConnector::new());
    for index in 0..device_count {
        let ip_address = format!("10.0.0.{}", index + 1);
        let record = plc(
            &format!("PLC{}", index + 1),
            &ip_address,
            1_000 + index as i64,
            DeviceStatus::Active,
        );
        connector.register_device(
            &record.endpoint(),
            SimulatedRegisterDevice::with_registers(vec![index as u16, index as u16 + 100]),
        );
        plc_store.create_plc(record).await.expect("seed plc");
    }
    let service = AcquisitionService::new(
        plc_store.clone(),
        reading_store.clone(),
        connector.clone(),
        AcquisitionConfig::default(),
    );
    Fixture {
        plc_store,
        reading_store,
        connector,
        service,
    }
}

async fn reading_count(store: &InMemoryReadingStore) -> u64 {
    store
        .count_items(&ReadingFilter::default())
        .await
        .expect("count")
}

#[tokio::test]
async fn sweep_over_empty_registry_returns_zero_summary() {
    let fixture = fixture(0).await;
    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary::default());
    assert_eq!(reading_count(&fixture.reading_store).await, 0);
}

#[tokio::test]
async fn sweep_persists_one_processed_reading_per_device() {
    let fixture = fixture(3).await;
    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 3, failed: 0 });

    let readings = fixture
        .reading_store
        .fetch_page(&ReadingFilter::default(), 0, 10)
        .await
        .expect("fetch");
    assert_eq!(readings.len(), 3);
    assert!(readings.iter().all(|reading| reading.processed));
    let first = readings
        .iter()
        .find(|reading| reading.plc_id == "PLC1")
        .expect("PLC1 reading");
    assert_eq!(first.values, vec![0, 100]);
}

#[tokio::test]
async fn every_failing_subset_is_isolated() {
    // 遍历 3 台设备的全部失败子集（含空集和全集）
    for mask in 0u32..8 {
        let fixture = fixture(3).await;
        let mut failing = 0;
        for index in 0..3 {
            if mask & (1 << index) != 0 {
                let endpoint = fixture
                    .plc_store
                    .find_plc(&format!("PLC{}", index + 1))
                    .await
                    .expect("query")
                    .expect("seeded")
                    .endpoint();
                fixture.connector.set_unreachable(&endpoint);
                failing += 1;
            }
        }

        let summary = fixture.service.run_sweep().await.expect("sweep");
        assert_eq!(
            summary,
            SweepSummary {
                succeeded: 3 - failing,
                failed: failing,
            },
            "mask {:03b}",
            mask
        );
        assert_eq!(
            reading_count(&fixture.reading_store).await,
            (3 - failing) as u64,
            "mask {:03b}",
            mask
        );
        // 失败与成功路径都不允许泄漏连接
        assert_eq!(fixture.connector.open_connections(), 0);
    }
}

#[tokio::test]
async fn unreachable_device_does_not_abort_sweep() {
    // 规格场景：PLC1 可达、PLC2 不可达 -> 汇总 {1, 1}，只落 PLC1 的读数
    let fixture = fixture(2).await;
    let endpoint = fixture
        .plc_store
        .find_plc("PLC2")
        .await
        .expect("query")
        .expect("seeded")
        .endpoint();
    fixture.connector.set_unreachable(&endpoint);

    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 1, failed: 1 });

    let readings = fixture
        .reading_store
        .fetch_page(&ReadingFilter::default(), 0, 10)
        .await
        .expect("fetch");
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].plc_id, "PLC1");
}

#[tokio::test]
async fn inactive_devices_are_not_polled() {
    let fixture = fixture(2).await;
    fixture
        .plc_store
        .update_plc(
            "PLC2",
            plc_storage::PlcUpdate {
                status: Some(DeviceStatus::Inactive),
                ..plc_storage::PlcUpdate::default()
            },
        )
        .await
        .expect("update");

    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 1, failed: 0 });
    assert_eq!(reading_count(&fixture.reading_store).await, 1);
}

#[tokio::test]
async fn next_sweep_retries_recovered_device() {
    let fixture = fixture(1).await;
    let endpoint = fixture
        .plc_store
        .find_plc("PLC1")
        .await
        .expect("query")
        .expect("seeded")
        .endpoint();

    fixture.connector.set_unreachable(&endpoint);
    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 0, failed: 1 });

    fixture.connector.set_reachable(&endpoint);
    let summary = fixture.service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 1, failed: 0 });
    assert_eq!(reading_count(&fixture.reading_store).await, 1);
}

#[tokio::test]
async fn single_worker_pool_still_covers_all_devices() {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let reading_store = Arc::new(InMemoryReadingStore::new());
    let connector = Arc::new(SimulatedConnector::new());
    for index in 0..5 {
        let record = plc(
            &format!("PLC{}", index + 1),
            &format!("10.0.1.{}", index + 1),
            1_000 + index as i64,
            DeviceStatus::Active,
        );
        connector.register_device(&record.endpoint(), SimulatedRegisterDevice::new(2));
        plc_store.create_plc(record).await.expect("seed plc");
    }
    let config = AcquisitionConfig {
        max_concurrent_polls: 1,
        ..AcquisitionConfig::default()
    };
    let service = AcquisitionService::new(plc_store, reading_store.clone(), connector, config);

    let summary = service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 5, failed: 0 });
    assert_eq!(reading_count(&reading_store).await, 5);
}

/// 落库永远失败的读数存储，用于验证存储故障也按设备隔离。
struct FailingReadingStore;

#[async_trait::async_trait]
impl ReadingStore for FailingReadingStore {
    async fn insert_reading(&self, _record: ReadingRecord) -> Result<(), StorageError> {
        Err(StorageError::backend("disk full"))
    }
}

#[async_trait::async_trait]
impl PagedCollection<ReadingFilter, ReadingRecord> for FailingReadingStore {
    async fn count_items(&self, _filter: &ReadingFilter) -> Result<u64, StorageError> {
        Err(StorageError::backend("disk full"))
    }

    async fn fetch_page(
        &self,
        _filter: &ReadingFilter,
        _skip: u64,
        _limit: u64,
    ) -> Result<Vec<ReadingRecord>, StorageError> {
        Err(StorageError::backend("disk full"))
    }
}

#[tokio::test]
async fn persist_failure_counts_as_failed_and_releases_connection() {
    let plc_store = Arc::new(InMemoryPlcStore::new());
    let connector = Arc::new(SimulatedConnector::new());
    let record = plc("PLC1", "10.0.0.1", 1_000, DeviceStatus::Active);
    connector.register_device(&record.endpoint(), SimulatedRegisterDevice::new(2));
    plc_store.create_plc(record).await.expect("seed plc");

    let service = AcquisitionService::new(
        plc_store,
        Arc::new(FailingReadingStore),
        connector.clone(),
        AcquisitionConfig::default(),
    );
    let summary = service.run_sweep().await.expect("sweep");
    assert_eq!(summary, SweepSummary { succeeded: 0, failed: 1 });
    assert_eq!(connector.open_connections(), 0);
}

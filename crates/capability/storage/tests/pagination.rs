use domain::DeviceStatus;
use plc_storage::{
    InMemoryPlcStore, Page, PagedCollection, Paginator, PlcFilter, PlcRecord, PlcStore,
};
use std::collections::HashSet;

async fn seeded_store(count: usize) -> InMemoryPlcStore {
    let store = InMemoryPlcStore::new();
    for index in 0..count {
        store
            .create_plc(PlcRecord {
                plc_id: format!("PLC{:03}", index),
                ip_address: "10.0.0.1".to_string(),
                port: 502,
                unit_id: 1,
                status: DeviceStatus::Active,
                created_at_ms: 1_000 + index as i64,
            })
            .await
            .expect("seed");
    }
    store
}

#[tokio::test]
async fn page_shape_matches_contract() {
    let store = seeded_store(23).await;
    let paginator = Paginator::new(&store, "/get-all-plcs");
    let filter = PlcFilter::default();

    let page: Page<PlcRecord> = paginator.paginate(&filter, 2, 10).await.expect("page");
    assert_eq!(page.total_items, 23);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 10);
    assert!(page.items.len() <= 10);
    // 创建时间倒序：第二页从第 11 新的记录开始
    assert_eq!(page.items[0].plc_id, "PLC012");
}

#[tokio::test]
async fn round_trip_covers_all_records_without_duplicates() {
    let store = seeded_store(47).await;
    let paginator = Paginator::new(&store, "/get-all-plcs");
    let filter = PlcFilter::default();
    let limit = 10;

    let first = paginator.paginate(&filter, 1, limit).await.expect("page 1");
    let mut seen: HashSet<String> = HashSet::new();
    let mut collected = 0;
    for page_number in 1..=first.total_pages {
        let page = paginator
            .paginate(&filter, page_number, limit)
            .await
            .expect("page");
        assert!(page.items.len() as u64 <= limit);
        for record in &page.items {
            assert!(seen.insert(record.plc_id.clone()), "duplicate across pages");
        }
        collected += page.items.len();
    }
    assert_eq!(collected, 47);
    assert_eq!(first.total_pages, 5);
}

#[tokio::test]
async fn page_urls_are_rebuilt_from_filter_snapshot() {
    let store = seeded_store(30).await;
    let filter = PlcFilter {
        search: Some("PLC".to_string()),
        ..PlcFilter::default()
    };
    let paginator =
        Paginator::new(&store, "/get-all-plcs").with_filter_params(filter.query_params());

    let page = paginator.paginate(&filter, 2, 10).await.expect("page");
    assert_eq!(
        page.next_page_url.as_deref(),
        Some("/get-all-plcs?search=PLC&page=3&limit=10")
    );
    assert_eq!(
        page.previous_page_url.as_deref(),
        Some("/get-all-plcs?search=PLC&page=1&limit=10")
    );
}

#[tokio::test]
async fn first_and_last_pages_omit_out_of_range_links() {
    let store = seeded_store(25).await;
    let paginator = Paginator::new(&store, "/get-all-plcs");
    let filter = PlcFilter::default();

    let first = paginator.paginate(&filter, 1, 10).await.expect("first");
    assert!(first.previous_page_url.is_none());
    assert!(first.next_page_url.is_some());

    let last = paginator.paginate(&filter, 3, 10).await.expect("last");
    assert!(last.next_page_url.is_none());
    assert!(last.previous_page_url.is_some());
    assert_eq!(last.items.len(), 5);
}

#[tokio::test]
async fn empty_collection_yields_zero_pages() {
    let store = InMemoryPlcStore::new();
    let paginator = Paginator::new(&store, "/get-all-plcs");
    let filter = PlcFilter::default();

    let page = paginator.paginate(&filter, 1, 10).await.expect("page");
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.next_page_url.is_none());
    assert!(page.previous_page_url.is_none());
}

#[tokio::test]
async fn filter_narrows_count_and_items_consistently() {
    let store = seeded_store(12).await;
    // 再放入一台不匹配检索串的设备
    store
        .create_plc(PlcRecord {
            plc_id: "GW-9".to_string(),
            ip_address: "10.0.0.2".to_string(),
            port: 502,
            unit_id: 2,
            status: DeviceStatus::Active,
            created_at_ms: 9_000,
        })
        .await
        .expect("seed");

    let filter = PlcFilter {
        search: Some("plc0".to_string()),
        ..PlcFilter::default()
    };
    assert_eq!(store.count_items(&filter).await.expect("count"), 12);

    let paginator = Paginator::new(&store, "/get-all-plcs");
    let page = paginator.paginate(&filter, 1, 100).await.expect("page");
    assert_eq!(page.items.len(), 12);
    assert!(page.items.iter().all(|record| record.plc_id.starts_with("PLC0")));
}

#[tokio::test]
async fn page_map_preserves_metadata() {
    let store = seeded_store(3).await;
    let paginator = Paginator::new(&store, "/get-all-plcs");
    let page = paginator
        .paginate(&PlcFilter::default(), 1, 2)
        .await
        .expect("page");
    let mapped = page.map(|record| record.plc_id);
    assert_eq!(mapped.total_items, 3);
    assert_eq!(mapped.total_pages, 2);
    assert_eq!(mapped.items, vec!["PLC002".to_string(), "PLC001".to_string()]);
}

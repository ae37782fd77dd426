//! Integration tests for range and page queries.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tempfile::tempdir;
use vigil::range::trim_to;
use vigil::{ErrorKind, Id, Order, Sample, Store};

/// 2023-11-14 10:00:00 UTC.
const TEN_AM: u64 = 1_699_956_000;

fn at(offset: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(TEN_AM + offset)
}

fn save_at(store: &Store, service: &str, offset: u64, status: i32) -> Sample {
    let mut sample = Sample::new(
        service,
        status,
        Duration::from_millis(offset + 1),
        Duration::from_millis(offset + 10),
    )
    .with_id(Id::with_time(at(offset)));
    store.save(&mut sample).unwrap();
    sample
}

#[test]
fn test_three_sample_scenario() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("scenario")).unwrap();

    save_at(&store, "svc-1", 0, 200);
    save_at(&store, "svc-1", 5, 500);
    save_at(&store, "svc-1", 10, 200);

    // The scan includes the first sample not before `to` and then halts.
    let range = store.range("svc-1", at(0), at(7)).unwrap();
    let statuses: Vec<i32> = range.iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![200, 500, 200]);
    assert_eq!(range[2].at(), at(10));

    // Within the window proper, only the first two records remain.
    let window = trim_to(range, at(7));
    let statuses: Vec<i32> = window.iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![200, 500]);
    assert_eq!(window[0].at(), at(0));
    assert_eq!(window[1].at(), at(5));

    let newest = store.page("svc-1", 1, Order::Descending).unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].at(), at(10));
    assert_eq!(newest[0].status, 200);

    assert_eq!(store.count("svc-1").unwrap(), 3);
}

#[test]
fn test_range_round_trips_payload() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("payload")).unwrap();

    let saved = save_at(&store, "api", 3, 418);
    let found = store.range("api", at(0), at(100)).unwrap();

    assert_eq!(found, vec![saved]);
    assert_eq!(found[0].server, Duration::from_millis(4));
    assert_eq!(found[0].total, Duration::from_millis(13));
    assert_eq!(found[0].service_id, "api");
}

#[test]
fn test_range_seeks_past_earlier_samples() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("seek")).unwrap();

    for offset in [0, 10, 20, 30, 40] {
        save_at(&store, "svc", offset, 200);
    }

    // `from` falls between samples: the seek lands on the next one.
    let found = store.range("svc", at(15), at(30)).unwrap();
    let times: Vec<SystemTime> = found.iter().map(Sample::at).collect();
    assert_eq!(times, vec![at(20), at(30)]);

    // Nothing at or after `from` is an empty success, not an error.
    let found = store.range("svc", at(41), at(50)).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_range_with_no_sample_reaching_to_runs_to_end() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("open_end")).unwrap();

    for offset in 0..5 {
        save_at(&store, "svc", offset, 200);
    }

    let found = store.range("svc", at(2), at(1_000)).unwrap();
    assert_eq!(found.len(), 3);
}

#[test]
fn test_range_same_second_samples_stay_in_mint_order() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("same_second")).unwrap();

    for status in 0..20 {
        save_at(&store, "svc", 1, status);
    }

    let found = store.range("svc", at(0), at(60)).unwrap();
    let statuses: Vec<i32> = found.iter().map(|s| s.status).collect();
    assert_eq!(statuses, (0..20).collect::<Vec<_>>());
}

#[test]
fn test_page_bounds_and_direction() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("pages")).unwrap();

    for offset in 0..10 {
        let status = i32::try_from(offset).unwrap();
        save_at(&store, "svc", offset, status);
    }

    let all = store.page("svc", 0, Order::Ascending).unwrap();
    assert_eq!(all.len(), 10);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id && w[0].at() <= w[1].at()));

    for n in [1usize, 3, 10, 25] {
        let ascending = store.page("svc", n, Order::Ascending).unwrap();
        let descending = store.page("svc", n, Order::Descending).unwrap();

        assert_eq!(ascending.len(), n.min(10));
        assert_eq!(descending.len(), n.min(10));
        assert_eq!(ascending[..], all[..n.min(10)]);
        assert_eq!(descending[0], all[9]);
        assert!(descending.windows(2).all(|w| w[0].id > w[1].id));
    }

    let reversed = store.page("svc", 0, Order::Descending).unwrap();
    let mut expected = all.clone();
    expected.reverse();
    assert_eq!(reversed, expected);
}

#[test]
fn test_page_does_not_cross_into_neighbouring_service() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("neighbours")).unwrap();

    save_at(&store, "a", 0, 1);
    save_at(&store, "b", 1, 2);
    save_at(&store, "c", 2, 3);

    let b = store.page("b", 0, Order::Descending).unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].status, 2);

    let b = store.range("b", at(0), at(100)).unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].service_id, "b");
}

#[test]
fn test_queries_on_unknown_service_fail_not_found() {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("unknown")).unwrap();

    assert_eq!(
        store.range("ghost", at(0), at(1)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store.page("ghost", 5, Order::Descending).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(store.count("ghost").unwrap_err().kind(), ErrorKind::NotFound);
}

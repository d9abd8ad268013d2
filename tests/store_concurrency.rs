use std::thread;

use chrono::NaiveDate;
use metrix_lib::{Reading, RecordStore, UserId};

fn reading(systolic: u32, comment: String) -> Reading {
    let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    Reading::new(ts, systolic, 70, Some(60), comment)
}

#[test]
fn concurrent_appends_to_one_user_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::open(dir.path()).unwrap();
    let user = UserId(11);

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    store
                        .append(user, &reading(100 + i, format!("w{worker}-{i}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let readings = store.read_all(user).unwrap();
    assert_eq!(readings.len(), 200);
    for worker in 0..8 {
        let own: Vec<_> = readings
            .iter()
            .filter(|r| r.comment.starts_with(&format!("w{worker}-")))
            .map(|r| r.systolic)
            .collect();
        assert_eq!(own, (100..125).collect::<Vec<u32>>(), "worker {worker} order");
    }
}

#[test]
fn interleaved_append_and_remove_never_duplicate_or_lose_tail() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::open(dir.path()).unwrap();
    let user = UserId(12);

    let appender = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 0..100 {
                store.append(user, &reading(110, format!("a{i}"))).unwrap();
            }
        })
    };
    let remover = {
        let store = store.clone();
        thread::spawn(move || {
            let mut removed = Vec::new();
            for _ in 0..60 {
                if let Some(reading) = store.remove_last(user).unwrap() {
                    removed.push(reading.comment);
                }
            }
            removed
        })
    };

    appender.join().unwrap();
    let removed = remover.join().unwrap();

    let mut seen: Vec<String> = store
        .read_all(user)
        .unwrap()
        .into_iter()
        .map(|r| r.comment)
        .chain(removed)
        .collect();
    assert_eq!(seen.len(), 100);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 100, "no reading may be lost or duplicated");
}

#[test]
fn different_users_do_not_interfere() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::open(dir.path()).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|id| {
            let store = store.clone();
            thread::spawn(move || {
                let user = UserId(id);
                for i in 0..10 {
                    store.append(user, &reading(120, format!("{i}"))).unwrap();
                }
                store.remove_last(user).unwrap();
                if id % 2 == 0 {
                    store.clear(user).unwrap();
                    store.clear(user).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    for id in 0..4 {
        let expected = if id % 2 == 0 { 0 } else { 9 };
        assert_eq!(store.count(UserId(id)).unwrap(), expected, "user {id}");
    }
}

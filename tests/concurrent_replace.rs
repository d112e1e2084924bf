//! Concurrency tests for tag replacement
//!
//! Runs against a file-backed database with a multi-connection pool, so
//! replaces and detail reads really overlap on separate SQLite connections.

use reshelve_core::auth::{self, Argon2Hasher, Requester};
use reshelve_core::storage::models::{NewBook, Role};
use reshelve_core::{catalog, shelf, Database};
use std::collections::BTreeSet;
use tempfile::TempDir;

const WANT_TO_READ: [i64; 2] = [1, 2];
const FINISHED: [i64; 2] = [3, 4];

async fn open() -> (TempDir, Database, Argon2Hasher) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("reshelve.db"))
        .await
        .expect("Failed to open database");
    let hasher = Argon2Hasher::with_params(8 * 1024, 1, 1).unwrap();
    (dir, db, hasher)
}

async fn user(db: &Database, hasher: &Argon2Hasher, name: &str) -> Requester {
    let email = format!("{}@example.com", name);
    let user = auth::register(db, hasher, &email, name, "pw").await.unwrap();
    Requester::from(user)
}

fn id_set(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_replaces_and_reads_see_whole_sets() {
    let (_dir, db, hasher) = open().await;
    let root = user(&db, &hasher, "root").await;
    let admin = Requester::from(auth::set_role(&db, root.id, Role::Admin).await.unwrap());
    let alice = user(&db, &hasher, "alice").await;

    let dune = catalog::create_book(&db, &admin, &NewBook::new("Dune", "Frank Herbert", "SF"))
        .await
        .unwrap();
    let entry = shelf::add_to_shelf(&db, &alice, dune.id).await.unwrap().id;

    let mut writers = Vec::new();
    let mut readers = Vec::new();
    for i in 0..20 {
        let (wdb, walice) = (db.clone(), alice.clone());
        let tags = if i % 2 == 0 { WANT_TO_READ } else { FINISHED };
        writers.push(tokio::spawn(async move {
            shelf::set_tags_for_entry(&wdb, &walice, entry, &tags).await
        }));

        let (db, alice) = (db.clone(), alice.clone());
        readers.push(tokio::spawn(async move {
            shelf::get_bookshelf_entry_detail(&db, &alice, entry).await
        }));
    }

    let allowed = [BTreeSet::new(), id_set(&WANT_TO_READ), id_set(&FINISHED)];

    for writer in writers {
        let assigned = writer.await.unwrap().expect("replace failed under contention");
        let ids: BTreeSet<i64> = assigned.iter().map(|t| t.id).collect();
        assert!(ids == id_set(&WANT_TO_READ) || ids == id_set(&FINISHED), "{:?}", ids);
    }

    for reader in readers {
        let detail = reader.await.unwrap().expect("detail read failed under contention");
        let ids: BTreeSet<i64> = detail.assigned_tags.iter().map(|t| t.id).collect();
        assert!(allowed.contains(&ids), "partial assignment set observed: {:?}", ids);
    }

    let last: BTreeSet<i64> = shelf::list_entry_tags(&db, &alice, entry)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert!(last == id_set(&WANT_TO_READ) || last == id_set(&FINISHED));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn users_replace_their_own_entries_at_once() {
    let (_dir, db, hasher) = open().await;
    let root = user(&db, &hasher, "root").await;
    let admin = Requester::from(auth::set_role(&db, root.id, Role::Admin).await.unwrap());
    let book = catalog::create_book(&db, &admin, &NewBook::new("Emma", "Jane Austen", "Classic"))
        .await
        .unwrap();

    let mut readers = Vec::new();
    for i in 0..10 {
        let reader = user(&db, &hasher, &format!("reader{}", i)).await;
        let entry = shelf::add_to_shelf(&db, &reader, book.id).await.unwrap().id;
        let private = shelf::create_tag(&db, &reader, "Book Club").await.unwrap();
        readers.push((reader, entry, private.id));
    }

    let mut tasks = Vec::new();
    for (reader, entry, private) in readers.clone() {
        let db = db.clone();
        tasks.push(tokio::spawn(async move {
            shelf::set_tags_for_entry(&db, &reader, entry, &[1, private]).await
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("replace failed under contention");
    }

    for (reader, entry, private) in &readers {
        let ids: BTreeSet<i64> = shelf::list_entry_tags(&db, reader, *entry)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, id_set(&[1, *private]));
    }
}

use std::fs;

use arena_rl::{
    Error,
    adapters::{CsvTableRepository, InMemoryRepository, MsgPackRepository},
    ports::TableRepository,
    q_learning::{LookupTable, StateActionKey, read_csv, write_csv},
    quantizer::{DimensionBounds, KeySpace},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tempfile::TempDir;

fn space() -> KeySpace {
    KeySpace::new(vec![
        DimensionBounds::new(-8, 8),
        DimensionBounds::new(-6, 6),
        DimensionBounds::new(0, 4),
    ])
}

fn random_table(seed: u64, entries: usize) -> LookupTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut table = LookupTable::new();
    while table.len() < entries {
        let key = StateActionKey::new(vec![
            rng.random_range(-8..=8),
            rng.random_range(-6..=6),
            rng.random_range(0..=4),
        ]);
        table.update(key, rng.random_range(-150.0..150.0));
    }
    table
}

#[test]
fn every_repository_round_trips_exactly() {
    let dir = TempDir::new().unwrap();
    let table = random_table(1, 300);
    let repositories: Vec<(Box<dyn TableRepository>, &str)> = vec![
        (Box::new(CsvTableRepository::new().with_key_space(space())), "q.csv"),
        (Box::new(MsgPackRepository::new().with_key_space(space())), "q.msgpack"),
        (Box::new(InMemoryRepository::new()), "q.mem"),
    ];

    for (repository, name) in repositories {
        let path = dir.path().join(name);
        repository.save(&table, &path).unwrap();
        let loaded = repository.load(&path).unwrap();
        assert_eq!(loaded, table, "{name} changed the table");
    }
}

#[test]
fn csv_resave_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let repository = CsvTableRepository::new();

    repository.save(&random_table(2, 120), &first).unwrap();
    let loaded = repository.load(&first).unwrap();
    repository.save(&loaded, &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn record_order_does_not_matter() {
    let forward = "0,0,1,2.5\n3,-1,0,-7\n-2,4,3,0.125\n";
    let shuffled = "-2,4,3,0.125\n0,0,1,2.5\n3,-1,0,-7\n";
    let a = read_csv(forward.as_bytes(), Some(&space())).unwrap();
    let b = read_csv(shuffled.as_bytes(), Some(&space())).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.value_of(&StateActionKey::new(vec![3, -1, 0])), -7.0);
}

#[test]
fn unwritten_keys_read_zero_after_reload() {
    let table = random_table(3, 10);
    let mut buffer = Vec::new();
    write_csv(&table, &mut buffer).unwrap();
    let loaded = read_csv(buffer.as_slice(), None).unwrap();

    let absent = (-8..=8)
        .map(|k| StateActionKey::new(vec![k, 6, 4]))
        .find(|key| !table.contains(key))
        .unwrap();
    assert_eq!(loaded.value_of(&absent), 0.0);
}

#[test]
fn malformed_record_aborts_the_load() {
    let text = "0,0,1,2.5\n0,0,nope,1.0\n1,1,1,1.0\n";
    let err = read_csv(text.as_bytes(), None).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "0,0,9,1.0\n").unwrap();
    let err = CsvTableRepository::new()
        .with_key_space(space())
        .load(&path)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 1, .. }));
}

#[test]
fn csv_and_msgpack_agree() {
    let dir = TempDir::new().unwrap();
    let table = random_table(4, 50);
    let csv_path = dir.path().join("q.csv");
    let msgpack_path = dir.path().join("q.msgpack");

    CsvTableRepository::new().save(&table, &csv_path).unwrap();
    let from_csv = CsvTableRepository::new().load(&csv_path).unwrap();
    MsgPackRepository::new().save(&from_csv, &msgpack_path).unwrap();
    let from_msgpack = MsgPackRepository::new().load(&msgpack_path).unwrap();

    assert_eq!(from_msgpack, table);
}

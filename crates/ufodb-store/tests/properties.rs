use std::collections::HashSet;

use proptest::prelude::*;
use ufodb_store::{Database, RecordId};

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Delete(u64),
    Update(u64, String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z0-9 ]{0,8}".prop_map(Op::Insert),
        (1u64..20).prop_map(Op::Delete),
        (1u64..20, "[a-z0-9 ]{0,8}").prop_map(|(id, v)| Op::Update(id, v)),
    ]
}

// Values never contain the field delimiter or line breaks; those do not round-trip.
fn cell() -> impl Strategy<Value = String> {
    "[^|\r\n]{0,12}"
}

proptest! {
    #[test]
    fn ids_stay_unique_and_below_next_id(ops in proptest::collection::vec(op(), 0..40)) {
        let mut db = Database::new();
        db.create_table("t", ["v"]).unwrap();

        let mut last_next_id = 1;
        for op in ops {
            match op {
                Op::Insert(v) => {
                    let id = db.insert("t", [("v", v)]).unwrap();
                    let next_id = db.table("t").unwrap().next_id();
                    prop_assert!(id.get() < next_id);
                }
                Op::Delete(id) => {
                    db.delete_record("t", RecordId::new(id));
                }
                Op::Update(id, v) => {
                    let _ = db.update("t", RecordId::new(id), [("v", v)]);
                }
            }
            let table = db.table("t").unwrap();
            prop_assert!(table.next_id() >= last_next_id);
            last_next_id = table.next_id();

            let mut seen = HashSet::new();
            for record in table.records() {
                let id: u64 = record.id().parse().unwrap();
                prop_assert!(id >= 1 && id < table.next_id());
                prop_assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
    }

    #[test]
    fn file_contents_round_trip(
        rows in proptest::collection::vec((cell(), cell()), 0..10),
        deletes in proptest::collection::vec(1u64..12, 0..4),
    ) {
        let mut db = Database::new();
        db.create_table("t", ["a", "b"]).unwrap();
        db.create_table("empty", ["x"]).unwrap();
        for (a, b) in rows {
            db.insert("t", [("a", a), ("b", b)]).unwrap();
        }
        for id in deletes {
            db.delete_record("t", RecordId::new(id));
        }

        let mut loaded = Database::new();
        loaded.replace_from_str(&db.to_file_contents()).unwrap();
        prop_assert_eq!(loaded.tables(), db.tables());
    }

    #[test]
    fn select_all_is_stable_without_mutation(rows in proptest::collection::vec(cell(), 0..10)) {
        let mut db = Database::new();
        db.create_table("t", ["a"]).unwrap();
        for a in rows {
            db.insert("t", [("a", a)]).unwrap();
        }
        let first = db.select_all("t").unwrap().to_vec();
        let second = db.select_all("t").unwrap().to_vec();
        prop_assert_eq!(first, second);
    }
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use ufodb_store::Database;

const MAX_INPUT_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];
    let text = String::from_utf8_lossy(data);

    let mut db = Database::new();
    if db.replace_from_str(&text).is_err() {
        assert!(db.tables().is_empty());
        return;
    }

    // Whatever loads must survive a save/load cycle with the same shape.
    let saved = db.to_file_contents();
    let mut reloaded = Database::new();
    if reloaded.replace_from_str(&saved).is_ok() {
        assert_eq!(
            db.table_names().collect::<Vec<_>>(),
            reloaded.table_names().collect::<Vec<_>>()
        );
    }
});

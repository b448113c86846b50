#![no_main]

use libfuzzer_sys::fuzz_target;
use ufodb_formula::{execute_command, parse_command, FormulaError};
use ufodb_store::Table;

const MAX_INPUT_BYTES: usize = 4_096;

fuzz_target!(|data: &[u8]| {
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];
    let input = String::from_utf8_lossy(data);

    // Error positions must point inside the input (or at its end).
    if let Err(FormulaError::InvalidCommandFormat { position, .. }) = parse_command(&input) {
        assert!(position <= input.len());
        assert!(input.is_char_boundary(position));
    }

    let Ok(mut table) = Table::new("fuzz", ["a", "b", "Total"]) else {
        return;
    };
    let _ = table.insert_record([("a", "3"), ("b", "0"), ("Total", "x")]);
    let _ = table.insert_record([("a", "-2.5"), ("b", "9223372036854775807"), ("Total", "")]);

    // Evaluation never panics, whatever the outcome.
    let _ = execute_command(&input, &table);
});

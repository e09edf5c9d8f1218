//! See [`sheaf::test::workload`] for documentation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sheaf::test::workload;

fuzz_target!(|data: &[u8]| {
    workload::run(data);
});

#![no_main]
use libfuzzer_sys::fuzz_target;

use llrb_multimap::model::{run_multimap_equivalence, MultiOp};

fuzz_target!(|ops: Vec<MultiOp>| { run_multimap_equivalence(ops) });

#![no_main]
use libfuzzer_sys::fuzz_target;

use llrb_multimap::model::{run_map_equivalence, MapOp};

fuzz_target!(|ops: Vec<MapOp>| { run_map_equivalence(ops) });

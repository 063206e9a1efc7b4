#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use literatura_core::store;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let base = Path::new("/fuzz");
    if let Ok(graph) = store::deserialize(&value, base) {
        let doc = store::serialize(&graph, base);
        assert_eq!(doc.refs.len(), graph.node_count());
    }
});

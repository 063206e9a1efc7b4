#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use literatura_core::{DirNode, ModuleGraph, Report};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(graph) = ModuleGraph::from_edge_list(text, Path::new("/fuzz")) else {
        return;
    };
    let refs: Vec<_> = graph.references().collect();
    let report = Report::build(&DirNode::build(&refs, '/'), '/');
    for section in &report.sections {
        assert!(section.children().count() > 1);
    }
});

use std::collections::HashMap;
use std::path::Path;

use literatura_core::diagram::draw_glyphs;
use literatura_core::order::Report;
use literatura_core::{DirNode, decompose, store};
use proptest::prelude::*;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn decompose_ignores_input_order((nodes, adjacency) in arb_adjacency()) {
        let lookup = |n: &str| adjacency.get(n).cloned().unwrap_or_default();
        let forward = decompose(&nodes, lookup);
        let reversed: Vec<&String> = nodes.iter().rev().collect();
        let backward = decompose(reversed, |n: &str| {
            let mut refs = lookup(n);
            refs.reverse();
            refs
        });
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn referrers_precede_referents((nodes, adjacency) in arb_adjacency()) {
        let components = decompose(&nodes, |n: &str| adjacency.get(n).cloned().unwrap_or_default());

        let mut position: HashMap<&str, (usize, usize)> = HashMap::new();
        for (ci, component) in components.iter().enumerate() {
            for (si, scc) in component.sccs.iter().enumerate() {
                for member in &scc.members {
                    prop_assert!(position.insert(member.as_str(), (ci, si)).is_none());
                }
            }
        }
        prop_assert_eq!(position.len(), nodes.len());

        for (tail, heads) in &adjacency {
            let Some(&(tc, ts)) = position.get(tail.as_str()) else { continue };
            for head in heads {
                let Some(&(hc, hs)) = position.get(head.as_str()) else { continue };
                prop_assert_eq!(tc, hc);
                prop_assert!(ts <= hs, "{} -> {} ordered {} > {}", tail, head, ts, hs);
            }
        }
    }

    #[test]
    fn cyclic_flag_matches_shape((nodes, adjacency) in arb_adjacency()) {
        let components = decompose(&nodes, |n: &str| adjacency.get(n).cloned().unwrap_or_default());
        for scc in components.iter().flat_map(|c| &c.sccs) {
            let self_loop = scc.members.iter().any(|m| {
                adjacency.get(m).is_some_and(|heads| heads.contains(m))
            });
            prop_assert_eq!(scc.cyclic, scc.len() > 1 || self_loop);
        }
    }

    #[test]
    fn every_divergent_reference_is_bucketed_once(refs in arb_references()) {
        let root = DirNode::build(&refs, '/');
        let mut stack = vec![&root];
        let mut stored = 0usize;
        while let Some(node) = stack.pop() {
            stored += node.dependencies.values().flat_map(|heads| heads.values()).map(Vec::len).sum::<usize>();
            stack.extend(node.subnodes.values());
        }
        let divergent = refs.iter().filter(|r| r.tail != r.head).count();
        prop_assert_eq!(stored, divergent);
    }

    #[test]
    fn children_sections_come_first(refs in arb_references()) {
        let report = Report::build(&DirNode::build(&refs, '/'), '/');
        for (i, section) in report.sections.iter().enumerate() {
            let prefix = format!("{}/", section.path);
            for later in &report.sections[i + 1..] {
                prop_assert!(!later.path.starts_with(&prefix), "{} after {}", later.path, section.path);
            }
        }
        let mut paths: Vec<&str> = report.sections.iter().map(|s| s.path.as_str()).collect();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();
        prop_assert_eq!(paths.len(), total);
    }

    #[test]
    fn store_round_trip(graph in arb_graph()) {
        let doc = store::serialize(&graph, Path::new("/r"));
        let value = serde_json::to_value(&doc).expect("serializable");
        let restored = store::deserialize(&value, Path::new("/r")).expect("valid store");
        prop_assert_eq!(restored, graph);
    }

    #[test]
    fn diagram_rows_are_rectangular((nodes, adjacency) in arb_adjacency()) {
        let rows = draw_glyphs(&nodes, |n: &str| adjacency.get(n).cloned().unwrap_or_default());
        prop_assert_eq!(rows.len(), nodes.len());
        let width = rows.first().map_or(0, Vec::len);
        prop_assert!(rows.iter().all(|row| row.len() == width));
    }
}

//! Old-port to new-elements resolution table.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::port::{OutputPortRef, PortElements};

/// Maps output ports of the source model onto the elements that produce the
/// equivalent values in the model under construction.
///
/// Within one pass every old port is mapped at most once; composing pass
/// maps with [`PortOutputsMap::concatenate`] keeps original-model ports
/// resolvable against the latest refinement generation.
#[derive(Debug, Clone, Default)]
pub struct PortOutputsMap {
    map: HashMap<OutputPortRef, PortElements>,
}

impl PortOutputsMap {
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn lookup(&self, port: OutputPortRef) -> Option<&PortElements> {
        self.map.get(&port)
    }

    /// Records a mapping. Re-recording the identical target is a no-op;
    /// recording a conflicting target means a node was rewritten twice in
    /// one pass, which is an engine or node-implementation bug, so it
    /// panics rather than let a malformed graph escape.
    pub fn insert(&mut self, old: OutputPortRef, new: PortElements) {
        if let Some(existing) = self.map.get(&old) {
            if *existing == new {
                return;
            }
            panic!("output port {old} already mapped to {existing}, refusing remap to {new}");
        }
        self.map.insert(old, new);
    }

    /// Resolves old-model elements into their new-model equivalents,
    /// re-slicing each range through the mapping of its source port. Fails
    /// when a referenced port was never mapped, which indicates the owning
    /// node was visited out of dependency order or skipped.
    pub fn resolve(&self, elements: &PortElements) -> Result<PortElements> {
        let mut resolved = PortElements::default();
        for range in elements.ranges() {
            let mapped = self.lookup(range.port).ok_or_else(|| {
                anyhow!("no mapping recorded for output port {}", range.port)
            })?;
            let slice = mapped.subrange(range.start, range.len).ok_or_else(|| {
                anyhow!(
                    "mapping for output port {} covers {} elements, cannot re-slice {}..{}",
                    range.port,
                    mapped.size(),
                    range.start,
                    range.end()
                )
            })?;
            resolved.append(slice);
        }
        Ok(resolved)
    }

    /// Composes `old_map` (original → intermediate) with `new_map`
    /// (intermediate → latest) into original → latest. Every intermediate
    /// port referenced by `old_map` must be mapped by `new_map`; a gap is
    /// an engine bug, not a recoverable condition.
    pub fn concatenate(old_map: &PortOutputsMap, new_map: &PortOutputsMap) -> Result<PortOutputsMap> {
        let mut composed = PortOutputsMap::default();
        for (port, elements) in &old_map.map {
            composed.map.insert(*port, new_map.resolve(elements)?);
        }
        Ok(composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{NodeId, PortRange};

    fn port(node: u32) -> OutputPortRef {
        OutputPortRef::new(NodeId(node), 0)
    }

    #[test]
    fn reinserting_the_same_target_is_a_no_op() {
        let mut map = PortOutputsMap::default();
        map.insert(port(0), PortElements::from_port(port(10), 4));
        map.insert(port(0), PortElements::from_port(port(10), 4));
        assert_eq!(map.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already mapped")]
    fn conflicting_remap_panics() {
        let mut map = PortOutputsMap::default();
        map.insert(port(0), PortElements::from_port(port(10), 4));
        map.insert(port(0), PortElements::from_port(port(11), 4));
    }

    #[test]
    fn resolve_reslices_through_the_mapping() {
        let mut map = PortOutputsMap::default();
        // Old port n0.0 (4 elements) now comes from two new ports.
        let mut split = PortElements::from_port(port(10), 2);
        split.push(PortRange::new(port(11), 0, 2));
        map.insert(port(0), split);

        let query = PortElements::from_range(PortRange::new(port(0), 1, 2));
        let resolved = map.resolve(&query).expect("port n0.0 is mapped");
        assert_eq!(
            resolved.ranges(),
            &[PortRange::new(port(10), 1, 1), PortRange::new(port(11), 0, 1)]
        );
    }

    #[test]
    fn resolve_fails_for_unmapped_ports() {
        let map = PortOutputsMap::default();
        let query = PortElements::from_port(port(7), 3);
        let err = map.resolve(&query).expect_err("nothing is mapped");
        assert!(err.to_string().contains("no mapping recorded"));
    }

    #[test]
    fn concatenate_composes_two_generations() {
        let mut first = PortOutputsMap::default();
        first.insert(port(0), PortElements::from_port(port(10), 4));
        let mut second = PortOutputsMap::default();
        second.insert(port(10), PortElements::from_port(port(20), 4));

        let composed =
            PortOutputsMap::concatenate(&first, &second).expect("generations line up");
        assert_eq!(
            composed.lookup(port(0)),
            Some(&PortElements::from_port(port(20), 4))
        );

        let broken = PortOutputsMap::default();
        assert!(PortOutputsMap::concatenate(&first, &broken).is_err());
    }
}

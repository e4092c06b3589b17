//! Aggregation of per-partition module labels
//!
//! The core partition defines the node universe and supplies rank, flow and
//! name. Each auxiliary partition contributes exactly one module label per
//! core node, appended in the order the partitions are absorbed.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::{DomainError, Header, NodeId, NodeRecord, Partition};

/// Aggregated node records across all partitions.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub header: Header,
    pub nodes: BTreeMap<NodeId, NodeRecord>,
    partitions: usize,
}

/// What absorbing one auxiliary partition did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsorbStats {
    /// Core nodes that received a label
    pub labelled: usize,
    /// Node ids present only in the auxiliary partition
    pub ignored: Vec<NodeId>,
}

impl Aggregate {
    /// Seed the aggregate from the core partition.
    pub fn from_core(core: Partition) -> Self {
        Self {
            header: core.header,
            nodes: core.nodes,
            partitions: 1,
        }
    }

    /// Append the module label of `partition` to every core node.
    ///
    /// Node ids missing from the core are ignored and reported in the
    /// returned stats. Nothing is modified when a core node is absent from
    /// `partition`.
    ///
    /// # Errors
    /// `DomainError::MissingNode` naming the first (lowest) absent node id
    /// and the partition file.
    pub fn absorb(&mut self, partition: &Partition) -> Result<AbsorbStats, DomainError> {
        if let Some(&node_id) = self
            .nodes
            .keys()
            .find(|id| !partition.nodes.contains_key(*id))
        {
            return Err(DomainError::MissingNode {
                node_id,
                path: partition.source.clone(),
            });
        }

        let mut stats = AbsorbStats::default();
        for (node_id, other) in &partition.nodes {
            match self.nodes.get_mut(node_id) {
                Some(node) => {
                    node.module_path.push(other.module().to_string());
                    stats.labelled += 1;
                }
                None => stats.ignored.push(*node_id),
            }
        }
        self.partitions += 1;

        Ok(stats)
    }

    /// Number of partitions folded into this aggregate, core included.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node_id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&node_id)
    }

    /// Render the aggregate file: `node_id label_1 ... label_n` per line,
    /// ascending by node id.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (node_id, node) in &self.nodes {
            out.push_str(&format!("{} {}\n", node_id, node.module_path.iter().join(" ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(name: &str, content: &str) -> Partition {
        Partition::parse(content, name, "#").unwrap()
    }

    #[test]
    fn given_core_and_auxiliary_when_absorbing_then_labels_follow_input_order() {
        let mut agg = Aggregate::from_core(partition("core", "# h\n1:2:3 0.5 NodeA 7\n1:1 0.5 NodeB 2\n"));
        agg.absorb(&partition("aux1", "4:5 0.3 NodeA 7\n9:1 0.7 NodeB 2\n"))
            .unwrap();
        agg.absorb(&partition("aux2", "6:1:1 0.3 NodeA 7\n8:1 0.7 NodeB 2\n"))
            .unwrap();

        assert_eq!(agg.partitions(), 3);
        let node = agg.get(7).unwrap();
        assert_eq!(node.module_path, vec!["1:2", "4", "6:1"]);
        assert_eq!(node.rank, "3");
        assert_eq!(node.flow.value(), 0.5);
        assert_eq!(node.name, "NodeA");
        assert_eq!(agg.get(2).unwrap().module_path, vec!["1", "9", "8"]);
        assert_eq!(agg.header.lines(), ["# h"]);
    }

    #[test]
    fn given_auxiliary_with_extra_node_when_absorbing_then_ignores_it() {
        let mut agg = Aggregate::from_core(partition("core", "1:1 0.5 A 1\n"));
        let stats = agg
            .absorb(&partition("aux", "2:1 0.5 A 1\n3:1 0.5 Z 99\n"))
            .unwrap();

        assert_eq!(stats.labelled, 1);
        assert_eq!(stats.ignored, vec![99]);
        assert!(agg.get(99).is_none());
    }

    #[test]
    fn given_auxiliary_missing_core_node_when_absorbing_then_fails_without_mutation() {
        let mut agg = Aggregate::from_core(partition("core", "1:1 0.5 A 1\n1:2 0.5 B 7\n"));
        let err = agg.absorb(&partition("aux.tree", "2:1 0.5 A 1\n")).unwrap_err();

        assert!(matches!(err, DomainError::MissingNode { node_id: 7, .. }));
        assert!(err.to_string().contains("aux.tree"));
        assert_eq!(agg.get(1).unwrap().module_path, vec!["1"]);
        assert_eq!(agg.partitions(), 1);
    }

    #[test]
    fn given_aggregate_when_rendering_then_sorted_by_node_id() {
        let mut agg = Aggregate::from_core(partition(
            "core",
            "1:1 0.1 C 30\n1:2:3 0.5 A 7\n2:1 0.4 B 12\n",
        ));
        agg.absorb(&partition("aux", "3:1 0.1 C 30\n4:5 0.3 A 7\n1:1 0.4 B 12\n"))
            .unwrap();

        assert_eq!(agg.render(), "7 1:2 4\n12 2 1\n30 1 3\n");
    }
}

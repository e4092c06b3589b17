//! Tree reconstruction from the validator's result file
//!
//! The validator emits `path node_id` lines where a trailing `;` marks an
//! insignificant branch. The marker is parsed into a flag here and only
//! turned back into text when the tree file is rendered.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use super::{Aggregate, DomainError, Flow, Header, NodeId};

/// Hierarchical path as written by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedPath {
    /// Path without the trailing marker
    pub path: String,
    pub insignificant: bool,
}

impl AnnotatedPath {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix(';') {
            Some(path) => Self {
                path: path.to_string(),
                insignificant: true,
            },
            None => Self {
                path: raw.to_string(),
                insignificant: false,
            },
        }
    }
}

impl fmt::Display for AnnotatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.insignificant {
            f.write_str(";")?;
        }
        Ok(())
    }
}

/// Final tree path with the node's rank attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    path: String,
    insignificant: bool,
}

impl TreePath {
    /// Attach `rank` below `annotated`.
    ///
    /// The rank follows the `;` directly on insignificant branches and a `:`
    /// otherwise. Any `;` left in the result marks the path insignificant at
    /// its new deepest level.
    pub fn attach(annotated: &AnnotatedPath, rank: &str) -> Self {
        let sep = if annotated.insignificant { ';' } else { ':' };
        let path = format!("{}{}{}", annotated.path, sep, rank);
        let insignificant = path.contains(';');
        Self {
            path,
            insignificant,
        }
    }

    pub fn is_insignificant(&self) -> bool {
        self.insignificant
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.insignificant {
            f.write_str(";")?;
        }
        Ok(())
    }
}

/// One line of the validator's result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub path: AnnotatedPath,
    pub node_id: NodeId,
}

/// Parse the validator's result file, keeping line order.
pub fn parse_result(content: &str, source: &Path) -> Result<Vec<ResultEntry>, DomainError> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[path, node_id] = fields.as_slice() else {
            return Err(DomainError::format(
                source,
                idx + 1,
                format!("expected 2 fields (path node_id), found {}", fields.len()),
            ));
        };
        let node_id = node_id.parse().map_err(|_| {
            DomainError::format(source, idx + 1, format!("node id is not an integer: {node_id:?}"))
        })?;
        entries.push(ResultEntry {
            path: AnnotatedPath::parse(path),
            node_id,
        });
    }

    Ok(entries)
}

/// One node line of the tree file.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    pub path: TreePath,
    pub flow: Flow,
    pub name: String,
    pub node_id: NodeId,
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.path, self.flow, self.name, self.node_id)
    }
}

/// Reconstructed tree: core header followed by node lines in result order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub header: Header,
    pub lines: Vec<TreeLine>,
}

impl Tree {
    /// Rebuild the tree from the aggregate and the validator's entries.
    ///
    /// # Errors
    /// * `DomainError::UnknownNode` if an entry names a node outside the core
    /// * `DomainError::MissingNode` if a core node has no entry in `source`
    pub fn reconstruct(
        aggregate: &Aggregate,
        entries: &[ResultEntry],
        source: &Path,
    ) -> Result<Self, DomainError> {
        let mut seen = BTreeSet::new();
        let mut lines = Vec::with_capacity(entries.len());

        for entry in entries {
            let node = aggregate
                .get(entry.node_id)
                .ok_or_else(|| DomainError::UnknownNode {
                    node_id: entry.node_id,
                    path: source.to_path_buf(),
                })?;
            seen.insert(entry.node_id);
            lines.push(TreeLine {
                path: TreePath::attach(&entry.path, &node.rank),
                flow: node.flow.clone(),
                name: node.name.clone(),
                node_id: entry.node_id,
            });
        }

        if let Some(&node_id) = aggregate.nodes.keys().find(|id| !seen.contains(*id)) {
            return Err(DomainError::MissingNode {
                node_id,
                path: source.to_path_buf(),
            });
        }

        Ok(Self {
            header: aggregate.header.clone(),
            lines,
        })
    }

    pub fn insignificant(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.path.is_insignificant())
            .count()
    }

    /// Render the tree file text, header first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.header.lines() {
            out.push_str(line);
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Partition;
    use rstest::rstest;

    #[rstest]
    #[case("0:1;", "3", "0:1;3;")]
    #[case("0:1", "3", "0:1:3")]
    #[case("0;1", "3", "0;1:3;")]
    #[case("2;", "1", "2;1;")]
    fn test_attach_rank(#[case] raw: &str, #[case] rank: &str, #[case] expected: &str) {
        let path = TreePath::attach(&AnnotatedPath::parse(raw), rank);
        assert_eq!(path.to_string(), expected);
    }

    #[test]
    fn given_insignificant_path_when_attaching_then_single_trailing_marker() {
        let path = TreePath::attach(&AnnotatedPath::parse("0:1;"), "3").to_string();

        assert!(path.ends_with("3;"));
        assert!(!path.ends_with(";;"));
    }

    #[test]
    fn given_annotated_path_when_displayed_then_restores_marker() {
        assert_eq!(AnnotatedPath::parse("0:1;").to_string(), "0:1;");
        assert_eq!(AnnotatedPath::parse("0:1").to_string(), "0:1");
    }

    #[test]
    fn given_result_lines_when_parsing_then_keeps_order() {
        let entries = parse_result("0:1; 7\n\n0:2 2\n", Path::new("out.txt")).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].node_id, 7);
        assert!(entries[0].path.insignificant);
        assert_eq!(entries[1].path.path, "0:2");
    }

    #[rstest]
    #[case("0:1;")]
    #[case("0:1; 7 extra")]
    #[case("0:1; seven")]
    fn given_malformed_result_line_when_parsing_then_fails(#[case] line: &str) {
        let err = parse_result(line, Path::new("out.txt")).unwrap_err();
        assert!(matches!(err, DomainError::Format { line: 1, .. }));
    }

    fn aggregate() -> Aggregate {
        let core = Partition::parse("# head\n1:2:3 0.5 NodeA 7\n1:1 0.25 NodeB 2\n", "core", "#").unwrap();
        Aggregate::from_core(core)
    }

    #[test]
    fn given_result_entries_when_reconstructing_then_renders_header_and_lines() {
        let entries = parse_result("0:1; 7\n0:2 2\n", Path::new("out")).unwrap();
        let tree = Tree::reconstruct(&aggregate(), &entries, Path::new("out")).unwrap();

        assert_eq!(tree.render(), "# head\n0:1;3; 0.5 NodeA 7\n0:2:1 0.25 NodeB 2\n");
        assert_eq!(tree.insignificant(), 1);
    }

    #[test]
    fn given_unknown_node_when_reconstructing_then_fails() {
        let entries = parse_result("0:1 7\n0:2 2\n0:3 99\n", Path::new("out")).unwrap();
        let err = Tree::reconstruct(&aggregate(), &entries, Path::new("out")).unwrap_err();

        assert!(matches!(err, DomainError::UnknownNode { node_id: 99, .. }));
    }

    #[test]
    fn given_result_missing_core_node_when_reconstructing_then_fails() {
        let entries = parse_result("0:1 7\n", Path::new("out")).unwrap();
        let err = Tree::reconstruct(&aggregate(), &entries, Path::new("out")).unwrap_err();

        assert!(matches!(err, DomainError::MissingNode { node_id: 2, .. }));
    }
}

//! Partition file parsing
//!
//! A partition file lists one node per line as `path flow name node_id`,
//! preceded by comment lines that form the header.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{split_path, DomainError, Flow, Header, NodeId, NodeRecord};

/// One parsed partition file.
#[derive(Debug, Clone)]
pub struct Partition {
    /// File the partition was read from
    pub source: PathBuf,
    /// Comment lines, only meaningful for the core partition
    pub header: Header,
    /// Node records keyed by node id
    pub nodes: BTreeMap<NodeId, NodeRecord>,
    /// Node ids that appeared more than once (the last line won)
    pub duplicates: Vec<NodeId>,
}

impl Partition {
    /// Parse partition content.
    ///
    /// # Arguments
    /// * `content` - File content to parse
    /// * `source` - Path of the file (used in error messages)
    /// * `comment_marker` - Prefix identifying header lines
    ///
    /// # Errors
    /// `DomainError::Format` when a data line does not have exactly four
    /// fields, the path has no module segment, or a number fails to parse.
    pub fn parse(
        content: &str,
        source: impl Into<PathBuf>,
        comment_marker: &str,
    ) -> Result<Self, DomainError> {
        let source = source.into();
        let mut header = Header::default();
        let mut nodes = BTreeMap::new();
        let mut duplicates = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(comment_marker) {
                header.push(line);
                continue;
            }

            let (node_id, record) = parse_line(line, &source, idx + 1)?;
            if nodes.insert(node_id, record).is_some() {
                duplicates.push(node_id);
            }
        }

        Ok(Self {
            source,
            header,
            nodes,
            duplicates,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_line(line: &str, source: &Path, line_no: usize) -> Result<(NodeId, NodeRecord), DomainError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[path, flow, name, node_id] = fields.as_slice() else {
        return Err(DomainError::format(
            source,
            line_no,
            format!("expected 4 fields (path flow name node_id), found {}", fields.len()),
        ));
    };

    let (module, rank) = split_path(path).ok_or_else(|| {
        DomainError::format(source, line_no, format!("path has no module segment: {path:?}"))
    })?;
    let flow: Flow = flow
        .parse()
        .map_err(|e: String| DomainError::format(source, line_no, e))?;
    let node_id: NodeId = node_id.parse().map_err(|_| {
        DomainError::format(source, line_no, format!("node id is not an integer: {node_id:?}"))
    })?;

    Ok((
        node_id,
        NodeRecord {
            module_path: vec![module.to_string()],
            rank: rank.to_string(),
            path: path.to_string(),
            flow,
            name: name.to_string(),
        },
    ))
}

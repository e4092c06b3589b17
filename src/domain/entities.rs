//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

/// Integer node identifier, unique within one network.
pub type NodeId = u64;

/// Flow of a node in the core partition.
///
/// Keeps the token it was parsed from so the tree file repeats the
/// partition's own notation (`1e-05` stays `1e-05`). Tools that print
/// the parsed float instead write `0.50` as `0.5` and `1` as `1.0`, so
/// their tree files can differ from ours in the flow column only.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    value: f64,
    text: String,
}

impl Flow {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .parse()
            .map_err(|_| format!("flow is not a number: {s:?}"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("flow must be a non-negative finite number: {s:?}"));
        }
        Ok(Self {
            value,
            text: s.to_string(),
        })
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split a hierarchical path at its final colon into `(module, rank)`.
///
/// `1:2:3` → `("1:2", "3")`. Returns `None` when the path has no colon,
/// i.e. no module segment.
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once(':')
}

/// Per-node record built from the core partition.
///
/// `module_path` holds one label per partition file, core first. Every
/// other field comes from the core partition only.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub module_path: Vec<String>,
    pub rank: String,
    pub path: String,
    pub flow: Flow,
    pub name: String,
}

impl NodeRecord {
    /// Label contributed by the partition this record was parsed from.
    pub fn module(&self) -> &str {
        self.module_path.first().map(String::as_str).unwrap_or_default()
    }
}

/// Verbatim comment lines of the core partition, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header(Vec<String>);

impl Header {
    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//! Aggregate per-layer partitions of a multiplex network into multi-level
//! labels, hand them to an external significance validator and rebuild an
//! annotated hierarchical tree from its answer.
//!
//! Layers, innermost first: [`domain`] (parsing and transformations, no
//! I/O), [`application`] (services and the pipeline), [`infrastructure`]
//! (filesystem and process boundaries), [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

//! Artifact dependency graph.
//!
//! Edges run from a dependency to its dependent. The graph is kept acyclic at
//! every insertion, so topological order and scheduling waves always exist.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::types::{Artifact, ArtifactId, GraphError};
use crate::util::hash::Hashable;

#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
  graph: DiGraph<Artifact, ()>,
  default: Option<ArtifactId>,
}

/// Serializable snapshot of a [`BuildGraph`], in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphManifest {
  pub artifacts: Vec<ManifestEntry>,
  pub default: Option<ArtifactId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
  pub id: ArtifactId,
  pub inputs: Vec<ArtifactId>,
  pub artifact: Artifact,
}

impl Hashable for GraphManifest {}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, artifact: Artifact) -> ArtifactId {
    ArtifactId(self.graph.add_node(artifact).index())
  }

  fn node(&self, id: ArtifactId) -> Result<NodeIndex, GraphError> {
    let idx = NodeIndex::new(id.0);
    if self.graph.node_weight(idx).is_some() {
      Ok(idx)
    } else {
      Err(GraphError::UnknownArtifact(id))
    }
  }

  /// Record that `dependent` consumes `dependency`.
  pub fn depend(&mut self, dependency: ArtifactId, dependent: ArtifactId) -> Result<(), GraphError> {
    let from = self.node(dependency)?;
    let to = self.node(dependent)?;

    if from == to || has_path_connecting(&self.graph, to, from, None) {
      return Err(GraphError::CycleDetected);
    }
    if !self.graph.contains_edge(from, to) {
      self.graph.add_edge(from, to, ());
    }
    Ok(())
  }

  pub fn artifact(&self, id: ArtifactId) -> Option<&Artifact> {
    self.graph.node_weight(NodeIndex::new(id.0))
  }

  /// All artifacts in declaration order.
  pub fn artifacts(&self) -> impl Iterator<Item = (ArtifactId, &Artifact)> + '_ {
    self
      .graph
      .node_indices()
      .map(|idx| (ArtifactId(idx.index()), &self.graph[idx]))
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  fn neighbors(&self, id: ArtifactId, direction: Direction) -> Vec<ArtifactId> {
    let Ok(idx) = self.node(id) else {
      return Vec::new();
    };

    let mut ids: Vec<ArtifactId> = self
      .graph
      .neighbors_directed(idx, direction)
      .map(|n| ArtifactId(n.index()))
      .collect();
    ids.sort();
    ids
  }

  /// Direct inputs of an artifact, in declaration order.
  pub fn inputs(&self, id: ArtifactId) -> Vec<ArtifactId> {
    self.neighbors(id, Direction::Incoming)
  }

  /// Artifacts that directly consume `id`.
  pub fn dependents(&self, id: ArtifactId) -> Vec<ArtifactId> {
    self.neighbors(id, Direction::Outgoing)
  }

  /// Whether `to` (transitively) depends on `from`.
  pub fn has_path(&self, from: ArtifactId, to: ArtifactId) -> bool {
    match (self.node(from), self.node(to)) {
      (Ok(a), Ok(b)) => has_path_connecting(&self.graph, a, b, None),
      _ => false,
    }
  }

  /// Dependencies before dependents.
  pub fn topological(&self) -> Result<Vec<ArtifactId>, GraphError> {
    let sorted = toposort(&self.graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(sorted.into_iter().map(|idx| ArtifactId(idx.index())).collect())
  }

  /// Group artifacts into levels whose members have every dependency in an
  /// earlier level. Members of one level may be produced in any order.
  pub fn waves(&self) -> Result<Vec<Vec<ArtifactId>>, GraphError> {
    let mut in_degree: HashMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();
    let mut remaining: HashSet<NodeIndex> = self.graph.node_indices().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
      let mut ready: Vec<NodeIndex> = remaining.iter().filter(|idx| in_degree[*idx] == 0).copied().collect();
      if ready.is_empty() {
        return Err(GraphError::CycleDetected);
      }
      ready.sort();

      for idx in &ready {
        remaining.remove(idx);
        for dependent in self.graph.neighbors_directed(*idx, Direction::Outgoing) {
          if let Some(deg) = in_degree.get_mut(&dependent) {
            *deg = deg.saturating_sub(1);
          }
        }
      }

      waves.push(ready.into_iter().map(|idx| ArtifactId(idx.index())).collect());
    }

    Ok(waves)
  }

  /// Register the artifact built when no target is named. Only one may be registered.
  pub fn set_default(&mut self, id: ArtifactId) -> Result<(), GraphError> {
    self.node(id)?;
    match self.default {
      Some(existing) => Err(GraphError::DefaultAlreadySet {
        existing,
        requested: id,
      }),
      None => {
        self.default = Some(id);
        Ok(())
      }
    }
  }

  pub fn default_target(&self) -> Option<ArtifactId> {
    self.default
  }

  pub fn to_manifest(&self) -> GraphManifest {
    GraphManifest {
      artifacts: self
        .artifacts()
        .map(|(id, artifact)| ManifestEntry {
          id,
          inputs: self.inputs(id),
          artifact: artifact.clone(),
        })
        .collect(),
      default: self.default,
    }
  }
}

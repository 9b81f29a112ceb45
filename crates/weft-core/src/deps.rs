//! DependencyResolver - staged creation order over prerequisite edges
//!
//! CREATE is the only operation with ordering semantics: a field may
//! declare that other fields must be created first. The declaration is
//! an explicit directed graph over leaf paths, validated acyclic at
//! model-compile time; `order()` then slices any requested field set
//! into stages. Fields in one stage have no prerequisite relationship
//! between them and are created in parallel; stages run strictly in
//! sequence.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{Result, WeftError};
use crate::path::FieldPath;
use crate::registry::SchemaRegistry;

/// One set of fields creatable in parallel
pub type Stage = BTreeSet<FieldPath>;

/// Compiled prerequisite graph
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    /// field → its direct prerequisites
    prereqs: BTreeMap<FieldPath, BTreeSet<FieldPath>>,
    /// field → fields that directly depend on it
    dependents: BTreeMap<FieldPath, BTreeSet<FieldPath>>,
}

impl DependencyResolver {
    /// Compile prerequisite edges against a model's leaves
    ///
    /// Duplicate prerequisite declarations are tolerated and
    /// deduplicated. Cycle detection happens here, at model-definition
    /// time; a live CREATE never discovers a cycle.
    ///
    /// # Errors
    ///
    /// - `InvalidPrerequisite` if an edge names a non-leaf path or a
    ///   field depends on itself
    /// - `DependencyCycle` naming the fields on the cycle
    pub fn compile(
        edges: &BTreeMap<FieldPath, Vec<FieldPath>>,
        registry: &SchemaRegistry,
    ) -> Result<Self> {
        let mut prereqs: BTreeMap<FieldPath, BTreeSet<FieldPath>> = BTreeMap::new();
        let mut dependents: BTreeMap<FieldPath, BTreeSet<FieldPath>> = BTreeMap::new();

        for (field, declared) in edges {
            if !registry.contains(field) {
                return Err(WeftError::InvalidPrerequisite {
                    path: field.clone(),
                    reason: "not a leaf of the model".to_string(),
                });
            }
            let entry = prereqs.entry(field.clone()).or_default();
            for prereq in declared {
                if prereq == field {
                    return Err(WeftError::InvalidPrerequisite {
                        path: field.clone(),
                        reason: "field depends on itself".to_string(),
                    });
                }
                if !registry.contains(prereq) {
                    return Err(WeftError::InvalidPrerequisite {
                        path: field.clone(),
                        reason: format!("prerequisite {} is not a leaf of the model", prereq),
                    });
                }
                entry.insert(prereq.clone());
                dependents
                    .entry(prereq.clone())
                    .or_default()
                    .insert(field.clone());
            }
        }

        let resolver = Self {
            prereqs,
            dependents,
        };
        resolver.check_acyclic()?;
        Ok(resolver)
    }

    /// Kahn's algorithm over the full graph; leftover nodes form the cycle
    fn check_acyclic(&self) -> Result<()> {
        let nodes: BTreeSet<&FieldPath> = self
            .prereqs
            .keys()
            .chain(self.dependents.keys())
            .collect();
        let mut unsatisfied: BTreeMap<&FieldPath, usize> = nodes
            .iter()
            .map(|&n| (n, self.prereqs.get(n).map_or(0, |p| p.len())))
            .collect();
        let mut ready: Vec<&FieldPath> = unsatisfied
            .iter()
            .filter(|entry| *entry.1 == 0)
            .map(|entry| *entry.0)
            .collect();

        let mut visited = 0usize;
        while let Some(node) = ready.pop() {
            visited += 1;
            if let Some(deps) = self.dependents.get(node) {
                for dep in deps {
                    if let Some(count) = unsatisfied.get_mut(dep) {
                        *count -= 1;
                        if *count == 0 {
                            ready.push(dep);
                        }
                    }
                }
            }
        }

        if visited == nodes.len() {
            Ok(())
        } else {
            let mut cycle: Vec<FieldPath> = unsatisfied
                .iter()
                .filter(|entry| *entry.1 > 0)
                .map(|entry| (*entry.0).clone())
                .collect();
            cycle.sort();
            Err(WeftError::DependencyCycle { paths: cycle })
        }
    }

    /// Direct prerequisites of one field
    pub fn prereqs_of(&self, field: &FieldPath) -> impl Iterator<Item = &FieldPath> {
        self.prereqs.get(field).into_iter().flatten()
    }

    /// Transitive dependents of one field
    ///
    /// Used on CREATE failure: everything returned here is skipped when
    /// `field` fails.
    pub fn transitive_dependents(&self, field: &FieldPath) -> BTreeSet<FieldPath> {
        let mut out = BTreeSet::new();
        let mut frontier = vec![field];
        while let Some(node) = frontier.pop() {
            if let Some(deps) = self.dependents.get(node) {
                for dep in deps {
                    if out.insert(dep.clone()) {
                        frontier.push(dep);
                    }
                }
            }
        }
        out
    }

    /// Close a field set over its transitive prerequisites
    pub fn with_prerequisites(&self, requested: &BTreeSet<FieldPath>) -> BTreeSet<FieldPath> {
        let mut closed = requested.clone();
        let mut frontier: Vec<FieldPath> = requested.iter().cloned().collect();
        while let Some(node) = frontier.pop() {
            for prereq in self.prereqs_of(&node) {
                if closed.insert(prereq.clone()) {
                    frontier.push(prereq.clone());
                }
            }
        }
        closed
    }

    /// Stage the requested fields plus their transitive prerequisites
    ///
    /// Every prerequisite of a field lands in a strictly earlier stage;
    /// fields with no prerequisite relationship may share one. Fields
    /// without declared prerequisites are stage 0. The graph is known
    /// acyclic from `compile`, so this always terminates with every
    /// field placed.
    pub fn order(&self, requested: &BTreeSet<FieldPath>) -> Vec<Stage> {
        let pending = self.with_prerequisites(requested);
        let mut placed: BTreeSet<FieldPath> = BTreeSet::new();
        let mut remaining = pending.clone();
        let mut stages = Vec::new();

        while !remaining.is_empty() {
            let stage: Stage = remaining
                .iter()
                .filter(|field| {
                    self.prereqs_of(field)
                        .all(|p| !pending.contains(p) || placed.contains(p))
                })
                .cloned()
                .collect();
            debug_assert!(!stage.is_empty(), "acyclic graph must always make progress");
            for field in &stage {
                remaining.remove(field);
                placed.insert(field.clone());
            }
            stages.push(stage);
        }
        stages
    }
}

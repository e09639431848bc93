// src/resolver/engine.rs

//! Changeset closure checking and job ordering
//!
//! The checker classifies every requirement touched by a changeset:
//! requirements of troves being added, and requirements of installed troves
//! that relied on something being removed. Each unmet requirement becomes
//! an ordering edge tagged with where its provider comes from (new or old).
//! Edges for the same requirement that point both ways cancel, since the
//! requirement holds whatever the order. What survives either becomes an
//! ordering edge between jobs or is reported as a problem.

use crate::dependencies::{ClassTag, Dependency, DependencySet};
use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::conflict::{DependencyFailure, UnresolvableDependency};
use super::graph::DirectedGraph;
use super::index::{DependencyIndex, MemoryIndex};
use super::job::{Changeset, TroveJob, TroveSpec};
use super::plan::CheckResult;

/// Where a requirement finds its provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKind {
    /// Added trove needs another added trove
    NewNeedsNew,
    /// Added trove is only satisfied by a trove being removed
    NewNeedsOld,
    /// Retained trove can switch to an added trove
    OldNeedsNew,
    /// Retained trove loses its provider
    OldNeedsOld,
}

impl EdgeKind {
    fn needs_new(self) -> bool {
        matches!(self, Self::NewNeedsNew | Self::OldNeedsNew)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Requirer {
    /// The trove added by this job
    Job(usize),
    /// An installed trove outside the changeset
    Installed(TroveSpec),
}

/// Candidate edges keyed by (requirer, requirement), pointing at provider jobs
#[derive(Debug, Default)]
struct EdgeSet {
    edges: IndexMap<(Requirer, ClassTag, Dependency), IndexSet<(EdgeKind, usize)>>,
}

impl EdgeSet {
    fn record(&mut self, requirer: Requirer, tag: ClassTag, dep: &Dependency, kind: EdgeKind, provider: usize) {
        self.edges
            .entry((requirer, tag, dep.clone()))
            .or_default()
            .insert((kind, provider));
    }

    fn len(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }
}

/// Temporary indexes over the troves a changeset adds and removes
#[derive(Debug, Default)]
struct BatchIndex {
    added: MemoryIndex,
    added_jobs: HashMap<TroveSpec, usize>,
    removed: MemoryIndex,
    removed_jobs: HashMap<TroveSpec, usize>,
}

impl BatchIndex {
    fn added_job_ids(&self, specs: Vec<TroveSpec>) -> Vec<usize> {
        specs
            .iter()
            .filter_map(|spec| self.added_jobs.get(spec).copied())
            .collect()
    }

    fn removed_job_ids(&self, specs: Vec<TroveSpec>) -> Vec<usize> {
        specs
            .iter()
            .filter_map(|spec| self.removed_jobs.get(spec).copied())
            .collect()
    }
}

/// Checks changesets against an index of the installed system
pub struct DependencyChecker<'a> {
    index: &'a dyn DependencyIndex,
}

impl<'a> DependencyChecker<'a> {
    /// Create a checker over the installed system
    pub fn new(index: &'a dyn DependencyIndex) -> Self {
        Self { index }
    }

    /// Check a changeset for closure, optionally ordering its jobs
    ///
    /// Ordering costs an extra pass over the job graph; skip it when only
    /// a yes/no answer is needed.
    pub fn check(&self, changeset: &Changeset, find_ordering: bool) -> Result<CheckResult> {
        let jobs = changeset.jobs();
        let batch = self.index_batch(changeset)?;
        debug!(
            "Indexed {} added and {} removed troves for {} jobs",
            batch.added.len(),
            batch.removed.len(),
            jobs.len()
        );

        let mut edges = EdgeSet::default();
        let mut erase_order = IndexSet::new();
        let failed = self.check_added(changeset, &batch, &mut edges)?;
        self.check_removed(&batch, &mut edges, &mut erase_order)?;
        debug!("Recorded {} candidate edges", edges.len());

        let mut graph: DirectedGraph<usize> = DirectedGraph::new();
        for job in 0..jobs.len() {
            graph.add_node(job);
        }
        for (from, to) in erase_order {
            graph.add_edge(from, to);
        }
        let unresolvable = resolve_edges(edges, &jobs, &mut graph);

        let ordering = if find_ordering {
            Some(order_jobs(&graph, &jobs)?)
        } else {
            None
        };

        let result = CheckResult {
            failed,
            unresolvable,
            ordering,
        };
        info!(
            "Checked {} jobs: {} unresolved, {} broken by removal",
            jobs.len(),
            result.failed.len(),
            result.unresolvable.len()
        );
        Ok(result)
    }

    fn index_batch(&self, changeset: &Changeset) -> Result<BatchIndex> {
        let mut batch = BatchIndex::default();

        for (job, add) in changeset.installs.iter().enumerate() {
            if let Some(spec) = add.spec() {
                batch
                    .added
                    .add(spec.clone(), add.requires.clone(), add.provides.clone())?;
                batch.added_jobs.insert(spec, job);
            }
            if let Some(old) = add.job.old_spec() {
                self.index_removal(old, job, &mut batch)?;
            }
        }

        let offset = changeset.installs.len();
        for (k, spec) in changeset.erases.iter().enumerate() {
            self.index_removal(spec.clone(), offset + k, &mut batch)?;
        }

        Ok(batch)
    }

    fn index_removal(&self, spec: TroveSpec, job: usize, batch: &mut BatchIndex) -> Result<()> {
        match self.index.trove_deps(&spec)? {
            Some(deps) => {
                batch.removed.add(spec.clone(), deps.requires, deps.provides)?;
                batch.removed_jobs.insert(spec, job);
            }
            None => warn!("{} is not installed, nothing to remove", spec),
        }
        Ok(())
    }

    /// True when something installed and not being removed provides `deps`
    fn remaining_provides(&self, deps: &DependencySet, batch: &BatchIndex) -> Result<bool> {
        Ok(self
            .index
            .providers_of(deps)?
            .iter()
            .any(|spec| !batch.removed_jobs.contains_key(spec)))
    }

    fn check_added(
        &self,
        changeset: &Changeset,
        batch: &BatchIndex,
        edges: &mut EdgeSet,
    ) -> Result<Vec<DependencyFailure>> {
        let mut failed: IndexMap<usize, DependencyFailure> = IndexMap::new();

        for (job, add) in changeset.installs.iter().enumerate() {
            let Some(spec) = add.spec() else {
                continue;
            };

            for (tag, dep) in add.requires.iter() {
                let single = DependencySet::single(tag, dep.clone())?;
                if self.remaining_provides(&single, batch)? {
                    continue;
                }

                let new_providers = batch.added_job_ids(batch.added.providers_of(&single)?);
                if new_providers.contains(&job) {
                    continue;
                }
                for provider in &new_providers {
                    edges.record(Requirer::Job(job), tag, dep, EdgeKind::NewNeedsNew, *provider);
                }
                for provider in batch.removed_job_ids(batch.removed.providers_of(&single)?) {
                    edges.record(Requirer::Job(job), tag, dep, EdgeKind::NewNeedsOld, provider);
                }

                // Removed providers order the jobs but are gone afterwards
                if new_providers.is_empty() {
                    debug!("{} requires {}: {} with no provider", spec, tag, dep);
                    failed
                        .entry(job)
                        .or_insert_with(|| DependencyFailure {
                            trove: spec.clone(),
                            missing: DependencySet::new(),
                        })
                        .missing
                        .add_dep(tag, dep.clone())?;
                }
            }
        }

        Ok(failed.into_values().collect())
    }

    fn check_removed(
        &self,
        batch: &BatchIndex,
        edges: &mut EdgeSet,
        erase_order: &mut IndexSet<(usize, usize)>,
    ) -> Result<()> {
        for (removed, deps) in batch.removed.troves() {
            let Some(&provider_job) = batch.removed_jobs.get(removed) else {
                continue;
            };

            for (requirer, matched) in self.index.requirers_of(&deps.provides)? {
                // Both going away: take the requirer off first
                if let Some(&requirer_job) = batch.removed_jobs.get(&requirer) {
                    if requirer_job != provider_job {
                        erase_order.insert((requirer_job, provider_job));
                    }
                    continue;
                }

                for (tag, dep) in matched.iter() {
                    let single = DependencySet::single(tag, dep.clone())?;
                    if self.remaining_provides(&single, batch)? {
                        continue;
                    }

                    let who = Requirer::Installed(requirer.clone());
                    edges.record(who.clone(), tag, dep, EdgeKind::OldNeedsOld, provider_job);
                    for provider in batch.added_job_ids(batch.added.providers_of(&single)?) {
                        edges.record(who.clone(), tag, dep, EdgeKind::OldNeedsNew, provider);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Cancel edges that point both ways, turn the rest into job ordering
/// edges, and report retained troves left without a provider
fn resolve_edges(
    edges: EdgeSet,
    jobs: &[TroveJob],
    graph: &mut DirectedGraph<usize>,
) -> Vec<UnresolvableDependency> {
    let mut unresolvable = Vec::new();
    let mut cancelled = 0;

    for ((requirer, tag, dep), targets) in edges.edges {
        let has_new = targets.iter().any(|(kind, _)| kind.needs_new());
        let has_old = targets.iter().any(|(kind, _)| !kind.needs_new());
        if has_new && has_old {
            cancelled += 1;
            continue;
        }

        match requirer {
            Requirer::Job(consumer) => {
                for (kind, provider) in targets {
                    if provider == consumer {
                        continue;
                    }
                    match kind {
                        EdgeKind::NewNeedsNew => graph.add_edge(provider, consumer),
                        EdgeKind::NewNeedsOld => graph.add_edge(consumer, provider),
                        EdgeKind::OldNeedsNew | EdgeKind::OldNeedsOld => {}
                    }
                }
            }
            Requirer::Installed(spec) => {
                let removed = targets
                    .iter()
                    .filter(|(kind, _)| *kind == EdgeKind::OldNeedsOld)
                    .filter_map(|(_, job)| jobs.get(*job).and_then(TroveJob::old_spec))
                    .collect();
                unresolvable.push(UnresolvableDependency {
                    requirer: spec,
                    missing: DependencySet::single_shared(tag, Arc::new(dep)),
                    removed,
                });
            }
        }
    }

    debug!(
        "Cancelled {} requirements, {} ordering edges remain",
        cancelled,
        graph.edge_count()
    );
    unresolvable
}

/// Collapse cycles into batches and order the batches
fn order_jobs(graph: &DirectedGraph<usize>, jobs: &[TroveJob]) -> Result<Vec<Vec<TroveJob>>> {
    let condensed = graph.strongly_connected_graph();
    let order = condensed.total_ordering_by(|a, b| a.cmp(b))?;
    debug!("Ordered {} jobs into {} batches", jobs.len(), order.len());

    Ok(order
        .into_iter()
        .map(|batch| {
            batch
                .into_iter()
                .filter_map(|job| jobs.get(job).cloned())
                .collect()
        })
        .collect())
}

/// Check `changeset` against `index` in one call
pub fn check_changeset(
    index: &dyn DependencyIndex,
    changeset: &Changeset,
    find_ordering: bool,
) -> Result<CheckResult> {
    DependencyChecker::new(index).check(changeset, find_ordering)
}

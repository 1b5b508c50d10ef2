//! Constraint-propagating expansion of a feature's dependency closure.
//!
//! Every root is walked depth first with an explicit work list. A branch
//! carries the singleton choices fixed so far; a dependency slot whose
//! singleton target tolerates sibling versions forks the branch once per
//! legal candidate. Branches that would select two members of one public
//! family are dropped whole, so only complete, consistent walks contribute
//! resolutions.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use super::constrained::ResolvedConstrainedFeature;
use super::policy::PreferredPolicy;
use super::singleton::{family_entry, Choices, SingletonChoice, SingletonSetId};
use crate::catalog::FeatureCatalog;
use crate::feature::{FamilyNaming, FeatureDescriptor, VersionSuffixNaming};

/// Expand `root` against `catalog` with the default naming and policy.
pub fn expand(root: &Arc<FeatureDescriptor>, catalog: &FeatureCatalog) -> BTreeSet<ResolvedConstrainedFeature> {
    Expander::new(catalog).expand(root)
}

/// Expand every catalog entry as a root and merge the results.
pub fn expand_all(catalog: &FeatureCatalog) -> BTreeSet<ResolvedConstrainedFeature> {
    Expander::new(catalog).expand_all()
}

pub fn expand_all_parallel(catalog: &FeatureCatalog) -> BTreeSet<ResolvedConstrainedFeature> {
    Expander::new(catalog).expand_all_parallel()
}

#[derive(Debug, Clone)]
enum Task {
    /// Enter a feature whose own singleton choice is already in the context
    Visit(Arc<FeatureDescriptor>),
    /// Resolve one dependency slot of a visited feature
    Slot {
        dependency: Arc<FeatureDescriptor>,
        tolerated: Vec<String>,
    },
    /// Record the resolution of a feature once its closure is walked
    Emit(Arc<FeatureDescriptor>),
    /// Reinstate a private choice overridden for an isolated subtree
    Restore(SingletonSetId, SingletonChoice),
}

/// One in-progress walk of a root's closure.
#[derive(Debug, Clone)]
struct Branch {
    context: Choices,
    tasks: Vec<Task>,
    visited: HashSet<(String, Choices)>,
    emitted: Vec<ResolvedConstrainedFeature>,
}

impl Branch {
    fn new(root: Arc<FeatureDescriptor>) -> Self {
        Self {
            context: Choices::new(),
            tasks: vec![Task::Visit(root)],
            visited: HashSet::new(),
            emitted: Vec::new(),
        }
    }
}

enum BranchOutcome {
    Completed,
    Pruned,
}

/// A dependency candidate together with the choice it would contribute.
struct Candidate {
    feature: Arc<FeatureDescriptor>,
    preferred: bool,
}

/// How a candidate's singleton choice relates to the current context.
enum Fit {
    /// Not a singleton, or its family is unset or set to this member
    Agrees,
    /// Its private family is set to another member
    Isolated,
    /// Its public family is set to another member
    Conflicts,
}

/// Expansion engine over a read-only catalog.
pub struct Expander<'a, N: FamilyNaming = VersionSuffixNaming> {
    catalog: &'a FeatureCatalog,
    naming: N,
    policy: PreferredPolicy,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a FeatureCatalog) -> Self {
        Self::with_naming(catalog, VersionSuffixNaming)
    }
}

impl<'a, N: FamilyNaming> Expander<'a, N> {
    pub fn with_naming(catalog: &'a FeatureCatalog, naming: N) -> Self {
        Self {
            catalog,
            naming,
            policy: PreferredPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PreferredPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Every resolution reachable from `root` under a consistent assignment.
    pub fn expand(&self, root: &Arc<FeatureDescriptor>) -> BTreeSet<ResolvedConstrainedFeature> {
        let mut resolved = BTreeSet::new();
        let mut pending = vec![Branch::new(root.clone())];
        let mut completed = 0usize;
        let mut pruned = 0usize;

        while let Some(mut branch) = pending.pop() {
            match self.run(&mut branch, &mut pending) {
                BranchOutcome::Completed => {
                    completed += 1;
                    resolved.extend(branch.emitted);
                }
                BranchOutcome::Pruned => pruned += 1,
            }
        }

        log::debug!(
            "Expanded {}: {} branches completed, {} pruned, {} resolutions",
            root.name, completed, pruned, resolved.len()
        );
        resolved
    }

    /// Expand every catalog entry as a root and merge the results.
    pub fn expand_all(&self) -> BTreeSet<ResolvedConstrainedFeature> {
        let start = Instant::now();
        let mut resolved = BTreeSet::new();
        for root in self.catalog.iter() {
            resolved.extend(self.expand(root));
        }
        log::info!(
            "Expanded {} features into {} resolutions in {:.3} seconds",
            self.catalog.len(),
            resolved.len(),
            start.elapsed().as_secs_f64()
        );
        resolved
    }

    /// Same result as [`Expander::expand_all`], with roots expanded on the
    /// rayon thread pool.
    pub fn expand_all_parallel(&self) -> BTreeSet<ResolvedConstrainedFeature> {
        let start = Instant::now();
        let roots: Vec<&Arc<FeatureDescriptor>> = self.catalog.iter().collect();
        let resolved = roots
            .into_par_iter()
            .map(|root| self.expand(root))
            .reduce(BTreeSet::new, |mut acc, part| {
                acc.extend(part);
                acc
            });
        log::info!(
            "Expanded {} features into {} resolutions in {:.3} seconds (parallel)",
            self.catalog.len(),
            resolved.len(),
            start.elapsed().as_secs_f64()
        );
        resolved
    }

    /// Drive one branch until it completes, is pruned, or hands its forks
    /// to `pending`.
    fn run(&self, branch: &mut Branch, pending: &mut Vec<Branch>) -> BranchOutcome {
        while let Some(task) = branch.tasks.pop() {
            match task {
                Task::Visit(feature) => {
                    if !self.visit(branch, feature) {
                        return BranchOutcome::Pruned;
                    }
                }
                Task::Slot { dependency, tolerated } if !dependency.singleton => {
                    // A plain slot walks every candidate in this branch
                    for feature in self.siblings(&dependency, &tolerated).into_iter().rev() {
                        branch.tasks.push(Task::Visit(feature));
                    }
                    branch.tasks.push(Task::Visit(dependency));
                }
                Task::Slot { dependency, tolerated } => {
                    let mut candidates = self.candidates(&branch.context, &dependency, &tolerated).into_iter();
                    let Some(first) = candidates.next() else {
                        log::trace!("No legal candidate for {}; pruning branch", dependency.name);
                        return BranchOutcome::Pruned;
                    };
                    for alternative in candidates {
                        let mut fork = branch.clone();
                        self.enter(&mut fork, alternative);
                        pending.push(fork);
                    }
                    self.enter(branch, first);
                }
                Task::Emit(feature) => {
                    branch
                        .emitted
                        .push(ResolvedConstrainedFeature::new(feature, branch.context.clone()));
                }
                Task::Restore(id, choice) => {
                    branch.context.insert(id, choice);
                }
            }
        }
        BranchOutcome::Completed
    }

    /// Fix the feature's own family, then schedule its emission and its
    /// dependency slots in declaration order. Returns false on conflict.
    fn visit(&self, branch: &mut Branch, feature: Arc<FeatureDescriptor>) -> bool {
        if feature.singleton {
            let own = SingletonChoice::preferred(feature.name.clone());
            match self.fit(&branch.context, &feature) {
                Fit::Agrees => self.fix(&mut branch.context, &feature, own),
                // Reached through a plain slot's tolerated sibling
                Fit::Isolated => {
                    if let Some(restore) = self.isolate(&mut branch.context, &feature, own) {
                        branch.tasks.push(restore);
                    }
                }
                Fit::Conflicts => {
                    log::trace!("{} conflicts with an earlier choice; pruning branch", feature.name);
                    return false;
                }
            }
        }

        if !branch.visited.insert((feature.name.clone(), branch.context.clone())) {
            return true;
        }

        branch.tasks.push(Task::Emit(feature.clone()));
        for (name, tolerated) in feature.content_features.iter().rev() {
            if *name == feature.name {
                continue;
            }
            match self.catalog.get(name) {
                Some(dependency) => branch.tasks.push(Task::Slot {
                    dependency: dependency.clone(),
                    tolerated: tolerated.clone(),
                }),
                None => log::trace!("{} depends on unknown feature {}; skipping", feature.name, name),
            }
        }
        true
    }

    /// Catalog entries for the tolerated versions of `dependency`, in
    /// declaration order and without repeats.
    fn siblings(&self, dependency: &FeatureDescriptor, tolerated: &[String]) -> Vec<Arc<FeatureDescriptor>> {
        let mut found: Vec<Arc<FeatureDescriptor>> = Vec::new();
        for version in tolerated {
            let sibling = self.naming.substitute(&dependency.name, version);
            if sibling == dependency.name || found.iter().any(|f| f.name == sibling) {
                continue;
            }
            match self.catalog.get(&sibling) {
                Some(feature) => found.push(feature.clone()),
                None => log::trace!(
                    "Tolerated version {} of {} is not in the catalog",
                    version, dependency.name
                ),
            }
        }
        found
    }

    /// Legal candidates of a singleton slot, default first.
    ///
    /// A candidate whose private family is already set to another member is
    /// kept only when no candidate fits the current context as is.
    fn candidates(&self, context: &Choices, dependency: &Arc<FeatureDescriptor>, tolerated: &[String]) -> Vec<Candidate> {
        let mut all = vec![Candidate {
            feature: dependency.clone(),
            preferred: true,
        }];
        all.extend(self.siblings(dependency, tolerated).into_iter().map(|feature| Candidate {
            feature,
            preferred: false,
        }));

        let mut agreeing = Vec::new();
        let mut isolated = Vec::new();
        for candidate in all {
            match self.fit(context, &candidate.feature) {
                Fit::Agrees => agreeing.push(candidate),
                Fit::Isolated => isolated.push(candidate),
                Fit::Conflicts => {}
            }
        }

        if agreeing.is_empty() {
            isolated
        } else {
            agreeing
        }
    }

    /// Apply a candidate's choice to the branch and schedule its visit.
    fn enter(&self, branch: &mut Branch, candidate: Candidate) {
        let Candidate { feature, preferred } = candidate;
        if feature.singleton {
            let choice = SingletonChoice::new(feature.name.clone(), preferred);
            match self.fit(&branch.context, &feature) {
                Fit::Isolated => {
                    if let Some(restore) = self.isolate(&mut branch.context, &feature, choice) {
                        let owner = branch.tasks.iter().rposition(|task| matches!(task, Task::Emit(_)));
                        match owner {
                            // A singleton owner of the same family keeps its own choice
                            Some(index) if self.shares_family(&branch.tasks[index], &feature) => {
                                branch.tasks.push(restore)
                            }
                            // Otherwise the owner keeps the override until it is emitted
                            Some(index) => branch.tasks.insert(index, restore),
                            None => branch.tasks.insert(0, restore),
                        }
                    }
                }
                // candidates() never yields conflicting candidates
                Fit::Agrees | Fit::Conflicts => self.fix(&mut branch.context, &feature, choice),
            }
        }
        branch.tasks.push(Task::Visit(feature));
    }

    fn shares_family(&self, owner: &Task, feature: &FeatureDescriptor) -> bool {
        match owner {
            Task::Emit(owner) => owner.singleton && self.naming.family(&owner.name) == self.naming.family(&feature.name),
            _ => false,
        }
    }

    fn fit(&self, context: &Choices, feature: &FeatureDescriptor) -> Fit {
        if !feature.singleton {
            return Fit::Agrees;
        }
        match family_entry(context, &self.naming.family(&feature.name)) {
            None => Fit::Agrees,
            Some((_, existing)) if existing.chosen_name == feature.name => Fit::Agrees,
            Some((id, _)) if id.is_private => Fit::Isolated,
            Some(_) => Fit::Conflicts,
        }
    }

    /// The id a feature's family is tracked under: the one already in the
    /// context if the family is anchored, otherwise derived from the
    /// feature's own visibility.
    fn singleton_id(&self, context: &Choices, feature: &FeatureDescriptor) -> SingletonSetId {
        let family = self.naming.family(&feature.name);
        match family_entry(context, &family) {
            Some((id, _)) => id.clone(),
            None => SingletonSetId::new(family, !feature.is_public()),
        }
    }

    fn fix(&self, context: &mut Choices, feature: &FeatureDescriptor, choice: SingletonChoice) {
        let id = self.singleton_id(context, feature);
        let merged = match context.get(&id) {
            Some(existing) => self.policy.merge(existing, &choice),
            None => choice,
        };
        context.insert(id, merged);
    }

    /// Override a private family for an isolated subtree, returning the task
    /// that reinstates the previous choice.
    fn isolate(&self, context: &mut Choices, feature: &FeatureDescriptor, choice: SingletonChoice) -> Option<Task> {
        let id = self.singleton_id(context, feature);
        let previous = context.insert(id.clone(), choice)?;
        log::trace!(
            "Private family {} isolated: {} replaces {} for this subtree",
            id.family, feature.name, previous.chosen_name
        );
        Some(Task::Restore(id, previous))
    }
}

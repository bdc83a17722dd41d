//! Scanner: selects layouts, collects leaves, checks them on a worker pool
//! and aggregates the results in path order.

use crate::error::ScanError;
use crate::grammar::GrammarRegistry;
use crate::layout::{standard_layouts, DatasetFamily, DatasetLayout};
use crate::policy::ReferencePolicy;
use crate::report::{ScanReport, Violation};
use crate::walker::{check_leaf, collect_leaves, Collected, WalkItem};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller sets to stop a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to scan and how.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Families to scan; empty means all.
    pub families: Vec<DatasetFamily>,
    /// Dataset codes to scan; empty means all.
    pub datasets: Vec<u16>,
    /// Worker threads for leaf checks.
    pub jobs: usize,
    /// Wall-clock limit for the whole scan.
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            families: Vec::new(),
            datasets: Vec::new(),
            jobs: std::thread::available_parallelism().map_or(1, |n| n.get()),
            timeout: None,
            cancel: CancelToken::new(),
        }
    }
}

impl ScanOptions {
    fn selects(&self, layout: &DatasetLayout) -> bool {
        (self.families.is_empty() || self.families.contains(&layout.family))
            && (self.datasets.is_empty() || self.datasets.contains(&layout.dataset))
    }
}

/// Runs full-tree scans against a grammar registry and reference policy.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    registry: &'a GrammarRegistry,
    policy: &'a ReferencePolicy,
    layouts: Vec<DatasetLayout>,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over the standard layouts.
    pub fn new(registry: &'a GrammarRegistry, policy: &'a ReferencePolicy) -> Self {
        Self {
            registry,
            policy,
            layouts: standard_layouts(),
        }
    }

    /// Replaces the layouts the scanner walks.
    pub fn with_layouts(mut self, layouts: Vec<DatasetLayout>) -> Self {
        self.layouts = layouts;
        self
    }

    pub fn layouts(&self) -> &[DatasetLayout] {
        &self.layouts
    }

    /// Scans `root` and returns every violation found, in path order.
    ///
    /// Only a missing or unreadable root and a failed pool build are errors.
    /// A cancelled or timed-out scan returns the violations of the leaves
    /// checked so far with an aborted status.
    pub fn scan(&self, root: &Path, options: &ScanOptions) -> Result<ScanReport, ScanError> {
        check_root(root)?;

        let layouts: Vec<DatasetLayout> = self
            .layouts
            .iter()
            .filter(|layout| options.selects(layout))
            .cloned()
            .collect();
        let jobs = options.jobs.max(1);
        let started = Instant::now();
        let deadline = options.timeout.map(|timeout| started + timeout);
        let should_stop = || {
            options.cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
        };

        tracing::info!(
            root = %root.display(),
            layouts = layouts.len(),
            jobs,
            "starting scan"
        );

        let collected = collect_leaves(root, &layouts, &should_stop);
        tracing::debug!(items = collected.items.len(), "collected leaves");

        let report = self.check_collected(&collected, options, jobs, &should_stop)?;

        tracing::info!(
            files_checked = report.files_checked,
            violations = report.violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );
        Ok(report)
    }

    /// Checks collected leaves on a pool of `jobs` workers.
    ///
    /// `should_stop` is polled before each leaf. Leaves not checked are
    /// dropped and the report is marked aborted, as it is when collection
    /// itself was interrupted.
    fn check_collected<S>(
        &self,
        collected: &Collected,
        options: &ScanOptions,
        jobs: usize,
        should_stop: &S,
    ) -> Result<ScanReport, ScanError>
    where
        S: Fn() -> bool + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        let results: Vec<Option<Vec<Violation>>> = pool.install(|| {
            collected
                .items
                .par_iter()
                .map(|item| match item {
                    WalkItem::Leaf(leaf) => {
                        if should_stop() {
                            None
                        } else {
                            Some(check_leaf(leaf, self.registry, self.policy))
                        }
                    }
                    WalkItem::Directory(violation) => Some(vec![violation.clone()]),
                })
                .collect()
        });

        let mut report = ScanReport::new();
        let mut skipped = 0usize;
        for (item, result) in collected.items.iter().zip(results) {
            match (item, result) {
                (WalkItem::Leaf(_), Some(violations)) => report.record_file(violations),
                (WalkItem::Directory(_), Some(violations)) => report.extend(violations),
                (_, None) => skipped += 1,
            }
        }

        if collected.interrupted || skipped > 0 {
            let reason = if options.cancel.is_cancelled() {
                "scan cancelled".to_string()
            } else {
                format!(
                    "scan timed out after {:.1}s",
                    options.timeout.unwrap_or_default().as_secs_f64()
                )
            };
            tracing::warn!(
                reason = %reason,
                files_checked = report.files_checked,
                skipped,
                "scan aborted"
            );
            report.abort(reason);
        }
        Ok(report)
    }
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = match std::fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound(root.to_path_buf()))
        }
        Err(source) => {
            return Err(ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_dir() {
        return Err(ScanError::RootNotADirectory(root.to_path_buf()));
    }
    std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

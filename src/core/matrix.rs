//! Expand the configured build matrix and run it on a bounded worker pool.

use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{self, BuildConfig};
use crate::engine::{CliEngine, ImageEngine};
use crate::error::{Error, Result};
use crate::job::{self, JobReport};
use crate::output::BulkResult;
use crate::spec::{BuildSpec, ImageTarget};
use crate::versions::{self, VersionMap};

/// Number of jobs that may run at the same time.
pub const WORKER_COUNT: usize = 3;

/// Suffix marking a PyTorch entry as "latest release of this line".
const LINE_WILDCARD: &str = ".x";

pub type MatrixResult = BulkResult<JobReport>;

/// Build one spec per Python version × resolvable PyTorch line × uv variant.
///
/// Entries without the `.x` suffix, and lines missing from `latest`, are
/// skipped without notice.
pub fn expand_matrix(config: &BuildConfig, latest: &VersionMap) -> Vec<BuildSpec> {
    let mut specs = Vec::new();

    for python_version in &config.python_versions {
        for entry in &config.pytorch_versions {
            let Some(line) = entry.strip_suffix(LINE_WILDCARD) else {
                continue;
            };
            let Some(pytorch_version) = latest.get(line) else {
                continue;
            };

            for use_uv in [true, false] {
                specs.push(BuildSpec::new(
                    python_version.as_str(),
                    pytorch_version.as_str(),
                    use_uv,
                ));
            }
        }
    }

    specs
}

/// Run every job on a pool of [`WORKER_COUNT`] threads and wait for all of them.
///
/// Results come back in spec order regardless of completion order.
pub fn run_jobs(
    specs: &[BuildSpec],
    target: &ImageTarget,
    engine: &dyn ImageEngine,
    dry_run: bool,
) -> Result<MatrixResult> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_COUNT)
        .thread_name(|i| format!("torchdock-worker-{}", i))
        .build()
        .map_err(|e| Error::internal_unexpected(format!("Failed to start worker pool: {}", e)))?;

    let outcomes = pool.install(|| {
        specs
            .par_iter()
            .map(|spec| job::run_job(spec, target, engine, dry_run))
            .collect::<Vec<_>>()
    });

    let result = BulkResult::new("build", outcomes);
    log_summary(&result);
    Ok(result)
}

/// Load the configuration, resolve versions and run the full matrix.
pub fn run(config_path: &Path, dry_run: bool) -> Result<MatrixResult> {
    let config = config::load(config_path)?;

    let latest = versions::fetch_latest_versions(&config.index_url)?;
    info!("Found latest PyTorch versions: {:?}", latest);

    let specs = expand_matrix(&config, &latest);
    let target = ImageTarget::new(config.dockername.as_str(), config.image_name.as_str());
    let engine = CliEngine::new(config.engine.as_str(), config.build_context.as_path());

    info!(
        "Running {} jobs with {} ({} workers{})",
        specs.len(),
        engine.program(),
        WORKER_COUNT,
        if dry_run { ", dry run" } else { "" }
    );

    run_jobs(&specs, &target, &engine, dry_run)
}

fn log_summary(result: &MatrixResult) {
    let summary = &result.summary;
    info!(
        "Finished {} jobs: {} succeeded, {} failed",
        summary.total, summary.succeeded, summary.failed
    );
    for tag in result.failed_ids() {
        warn!("Failed: {}", tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(python: &[&str], pytorch: &[&str]) -> BuildConfig {
        BuildConfig {
            dockername: "acme".to_string(),
            image_name: "ml-base".to_string(),
            python_versions: python.iter().map(|s| s.to_string()).collect(),
            pytorch_versions: pytorch.iter().map(|s| s.to_string()).collect(),
            index_url: config::DEFAULT_INDEX_URL.to_string(),
            engine: "docker".to_string(),
            build_context: PathBuf::from("."),
        }
    }

    fn latest(entries: &[(&str, &str)]) -> VersionMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unresolvable_line_is_dropped() {
        let specs = expand_matrix(
            &config(&["3.10"], &["2.5.x", "2.6.x"]),
            &latest(&[("2.5", "2.5.3")]),
        );

        assert_eq!(
            specs,
            vec![
                BuildSpec::new("3.10", "2.5.3", true),
                BuildSpec::new("3.10", "2.5.3", false),
            ]
        );
    }

    #[test]
    fn entries_without_wildcard_are_skipped() {
        let specs = expand_matrix(
            &config(&["3.11"], &["2.5.1", "2.5"]),
            &latest(&[("2.5", "2.5.3")]),
        );
        assert!(specs.is_empty());
    }

    #[test]
    fn matrix_covers_every_python_and_line() {
        let specs = expand_matrix(
            &config(&["3.10", "3.11", "3.12"], &["2.4.x", "2.5.x"]),
            &latest(&[("2.4", "2.4.1"), ("2.5", "2.5.3"), ("2.6", "2.6.0")]),
        );

        assert_eq!(specs.len(), 3 * 2 * 2);
        let tags: std::collections::HashSet<_> = specs.iter().map(BuildSpec::tag).collect();
        assert_eq!(tags.len(), specs.len());
        assert!(specs.iter().all(|s| s.pytorch_version != "2.6.0"));
    }

    #[test]
    fn at_most_three_jobs_run_at_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        #[derive(Default)]
        struct SlowEngine {
            in_flight: AtomicUsize,
            peak: AtomicUsize,
            builds: AtomicUsize,
        }

        impl ImageEngine for SlowEngine {
            fn build(&self, _: &Path, _: &str) -> Result<()> {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.builds.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn push(&self, _: &str) -> Result<()> {
                Ok(())
            }
        }

        let specs: Vec<_> = (0..12)
            .map(|i| BuildSpec::new(format!("3.{}", i), "2.5.3", i % 2 == 0))
            .collect();
        let engine = SlowEngine::default();

        let result = run_jobs(&specs, &ImageTarget::new("acme", "ml-base"), &engine, false).unwrap();

        assert_eq!(result.summary.succeeded, 12);
        assert_eq!(engine.builds.load(Ordering::SeqCst), 12);
        assert_eq!(engine.peak.load(Ordering::SeqCst), WORKER_COUNT);
        assert_eq!(WORKER_COUNT, 3);
    }

    #[test]
    fn empty_matrix_runs_no_jobs() {
        struct Unused;
        impl ImageEngine for Unused {
            fn build(&self, _: &Path, _: &str) -> Result<()> {
                panic!("build should not run");
            }
            fn push(&self, _: &str) -> Result<()> {
                panic!("push should not run");
            }
        }

        let result = run_jobs(&[], &ImageTarget::new("acme", "ml-base"), &Unused, false).unwrap();
        assert_eq!(result.summary.total, 0);
    }
}

//! Build and push of a single matrix cell.

use serde::Serialize;
use tracing::{error, info, info_span};

use crate::dockerfile;
use crate::engine::ImageEngine;
use crate::error::Error;
use crate::output::ItemOutcome;
use crate::spec::{BuildSpec, ImageTarget};
use crate::utils::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Dry run: nothing was executed.
    Planned,
    Pushed,
    PrepareFailed,
    BuildFailed,
    PushFailed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub status: JobStatus,
    pub python_version: String,
    pub pytorch_version: String,
    pub use_uv: bool,
    /// Rendered Dockerfile, only reported for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

/// Outcome of one job, keyed by its full image tag.
pub type JobOutcome = ItemOutcome<JobReport>;

/// Render, build and push one image.
///
/// Never fails: every error is logged and recorded in the returned outcome so
/// that sibling jobs are unaffected. The temporary Dockerfile is removed when
/// this returns, whichever path it takes.
pub fn run_job(
    spec: &BuildSpec,
    target: &ImageTarget,
    engine: &dyn ImageEngine,
    dry_run: bool,
) -> JobOutcome {
    let full_tag = target.full_tag(spec);
    let span = info_span!("job", tag = %full_tag);
    let _entered = span.enter();

    let content = dockerfile::render(spec);

    let dockerfile = match io::write_temp_file(&content, ".dockerfile", "write dockerfile") {
        Ok(file) => file,
        Err(err) => {
            let reason = failure_reason(&err);
            error!("Failed to prepare Dockerfile for {}: {}", full_tag, reason);
            return outcome(full_tag, spec, JobStatus::PrepareFailed, None, Some(reason));
        }
    };

    if dry_run {
        info!("[DRY RUN] Would build {} with Dockerfile:", full_tag);
        info!("\n{}", content);
        return outcome(full_tag, spec, JobStatus::Planned, Some(content), None);
    }

    info!("Building {}", full_tag);
    if let Err(err) = engine.build(dockerfile.path(), &full_tag) {
        let reason = failure_reason(&err);
        error!("Failed to build {}: {}", full_tag, reason);
        return outcome(full_tag, spec, JobStatus::BuildFailed, None, Some(reason));
    }

    info!("Pushing {}", full_tag);
    if let Err(err) = engine.push(&full_tag) {
        let reason = failure_reason(&err);
        error!("Failed to push {}: {}", full_tag, reason);
        return outcome(full_tag, spec, JobStatus::PushFailed, None, Some(reason));
    }

    info!("Successfully built and pushed {}", full_tag);
    outcome(full_tag, spec, JobStatus::Pushed, None, None)
}

fn outcome(
    full_tag: String,
    spec: &BuildSpec,
    status: JobStatus,
    dockerfile: Option<String>,
    error: Option<String>,
) -> JobOutcome {
    ItemOutcome {
        id: full_tag,
        result: Some(JobReport {
            status,
            python_version: spec.python_version.clone(),
            pytorch_version: spec.pytorch_version.clone(),
            use_uv: spec.use_uv,
            dockerfile,
        }),
        error,
    }
}

/// Error message plus whatever output the engine left behind.
fn failure_reason(err: &Error) -> String {
    let tail = err
        .details
        .get("outputTail")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim();

    if tail.is_empty() {
        err.message.clone()
    } else {
        format!("{}\n{}", err.message, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineCommandDetails, Result};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        fail_build: bool,
        fail_push: bool,
        calls: Mutex<Vec<String>>,
        dockerfiles: Mutex<Vec<PathBuf>>,
    }

    fn engine_error(tag: &str) -> EngineCommandDetails {
        EngineCommandDetails {
            tag: tag.to_string(),
            command: "fake".to_string(),
            exit_code: 1,
            output_tail: "boom".to_string(),
        }
    }

    impl ImageEngine for RecordingEngine {
        fn build(&self, dockerfile: &Path, tag: &str) -> Result<()> {
            assert!(dockerfile.exists());
            self.dockerfiles.lock().unwrap().push(dockerfile.to_path_buf());
            self.calls.lock().unwrap().push(format!("build {}", tag));
            if self.fail_build {
                return Err(Error::image_build_failed(engine_error(tag)));
            }
            Ok(())
        }

        fn push(&self, tag: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("push {}", tag));
            if self.fail_push {
                return Err(Error::image_push_failed(engine_error(tag)));
            }
            Ok(())
        }
    }

    fn acme() -> ImageTarget {
        ImageTarget::new("acme", "ml-base")
    }

    #[test]
    #[tracing_test::traced_test]
    fn dry_run_logs_tag_and_dockerfile() {
        let engine = RecordingEngine::default();
        let spec = BuildSpec::new("3.11", "2.5.0", true);

        run_job(&spec, &acme(), &engine, true);

        assert!(logs_contain(
            "[DRY RUN] Would build acme/ml-base:py3.11-torch2.5.0-uv with Dockerfile:"
        ));
        assert!(!logs_contain("Building acme/ml-base"));
    }

    #[test]
    fn dry_run_invokes_nothing_and_reports_tag() {
        let engine = RecordingEngine::default();
        let spec = BuildSpec::new("3.11", "2.5.0", true);

        let outcome = run_job(&spec, &acme(), &engine, true);

        assert!(engine.calls.lock().unwrap().is_empty());
        assert_eq!(outcome.id, "acme/ml-base:py3.11-torch2.5.0-uv");
        assert!(outcome.succeeded());
        let report = outcome.result.unwrap();
        assert_eq!(report.status, JobStatus::Planned);
        assert_eq!(report.dockerfile, Some(dockerfile::render(&spec)));
    }

    #[test]
    fn success_builds_then_pushes() {
        let engine = RecordingEngine::default();
        let spec = BuildSpec::new("3.10", "2.4.1", false);

        let outcome = run_job(&spec, &acme(), &engine, false);

        assert_eq!(
            *engine.calls.lock().unwrap(),
            vec![
                "build acme/ml-base:py3.10-torch2.4.1".to_string(),
                "push acme/ml-base:py3.10-torch2.4.1".to_string(),
            ]
        );
        assert!(outcome.succeeded());
        assert_eq!(outcome.result.unwrap().status, JobStatus::Pushed);
    }

    #[test]
    fn build_failure_skips_push() {
        let engine = RecordingEngine {
            fail_build: true,
            ..Default::default()
        };
        let spec = BuildSpec::new("3.10", "2.4.1", true);

        let outcome = run_job(&spec, &acme(), &engine, false);

        assert_eq!(engine.calls.lock().unwrap().len(), 1);
        assert_eq!(outcome.result.as_ref().unwrap().status, JobStatus::BuildFailed);
        let error = outcome.error.unwrap();
        assert!(error.contains("acme/ml-base:py3.10-torch2.4.1-uv"));
        assert!(error.contains("boom"));
    }

    #[test]
    fn push_failure_is_recorded() {
        let engine = RecordingEngine {
            fail_push: true,
            ..Default::default()
        };
        let spec = BuildSpec::new("3.12", "2.6.0", false);

        let outcome = run_job(&spec, &acme(), &engine, false);

        assert_eq!(engine.calls.lock().unwrap().len(), 2);
        assert_eq!(outcome.result.unwrap().status, JobStatus::PushFailed);
    }

    #[test]
    fn dockerfile_is_removed_after_job() {
        let engine = RecordingEngine::default();
        let spec = BuildSpec::new("3.11", "2.5.0", false);

        run_job(&spec, &acme(), &engine, false);

        let dockerfiles = engine.dockerfiles.lock().unwrap();
        assert_eq!(dockerfiles.len(), 1);
        assert!(!dockerfiles[0].exists());
    }
}

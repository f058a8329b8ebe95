use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::{debug, info, warn};

use crate::exporter::ModelExporter;
use crate::registry::{Fixture, Registry, RegistryError};

#[derive(Debug)]
pub enum Outcome {
    Written(PathBuf),
    Failed(RegistryError),
    /// Not started because the batch was cancelled.
    Cancelled,
}

impl Outcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Written(_))
    }
}

pub struct Runner<E> {
    exporter: E,
    out_dir: PathBuf,
    jobs: usize,
    cancel: Arc<AtomicBool>,
}

impl<E: ModelExporter + Sync> Runner<E> {
    pub fn new(exporter: E, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            exporter,
            out_dir: out_dir.into(),
            jobs: 1,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of worker threads used by [`Runner::run_all`].
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Setting the returned flag stops the current batch from starting new
    /// fixtures. The flag is sticky: later batches on this runner report every
    /// fixture as cancelled until the flag is cleared again.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run_one(&self, registry: &Registry, name: &str) -> Result<PathBuf, RegistryError> {
        let fixture = registry
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFixture(name.to_string()))?;
        let path = fixture.generate(&self.exporter, &self.out_dir)?;
        info!(fixture = name, path = %path.display(), "fixture generated");
        Ok(path)
    }

    /// Generates every fixture accepted by `filter`, collecting one outcome per
    /// fixture in registration order. Failures never stop the batch, and a
    /// fixture that panics is recorded as [`RegistryError::Panicked`].
    pub fn run_all(
        &self,
        registry: &Registry,
        filter: Option<&(dyn Fn(&str) -> bool + Sync)>,
    ) -> Vec<(String, Outcome)> {
        let selected: Vec<&Fixture> = registry
            .iter()
            .filter(|f| filter.map_or(true, |keep| keep(f.name())))
            .collect();

        info!(
            fixtures = selected.len(),
            jobs = self.jobs,
            out_dir = %self.out_dir.display(),
            "generating fixtures"
        );

        let results = if self.jobs <= 1 || selected.len() <= 1 {
            selected.iter().map(|f| self.attempt(f)).collect()
        } else {
            self.run_parallel(&selected)
        };

        let failed = results.iter().filter(|(_, o)| matches!(o, Outcome::Failed(_))).count();
        let cancelled = results.iter().filter(|(_, o)| matches!(o, Outcome::Cancelled)).count();
        info!(
            written = results.len() - failed - cancelled,
            failed,
            cancelled,
            "generation finished"
        );
        results
    }

    fn run_parallel(&self, selected: &[&Fixture]) -> Vec<(String, Outcome)> {
        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for worker in 0..self.jobs.min(selected.len()) {
                let tx = tx.clone();
                let cursor = &cursor;
                scope.spawn(move || {
                    debug!(worker, "fixture worker started");
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(fixture) = selected.get(i) else {
                            break;
                        };
                        if tx.send((i, self.attempt(fixture))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<(String, Outcome)>> = selected.iter().map(|_| None).collect();
        for (i, result) in rx {
            slots[i] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }

    fn attempt(&self, fixture: &Fixture) -> (String, Outcome) {
        let name = fixture.name().to_string();
        if self.cancel.load(Ordering::Relaxed) {
            return (name, Outcome::Cancelled);
        }
        let generated = catch_unwind(AssertUnwindSafe(|| {
            fixture.generate(&self.exporter, &self.out_dir)
        }))
        .unwrap_or_else(|payload| {
            Err(RegistryError::Panicked {
                name: name.clone(),
                message: panic_message(payload.as_ref()),
            })
        });
        let outcome = match generated {
            Ok(path) => {
                debug!(fixture = %name, path = %path.display(), "fixture generated");
                Outcome::Written(path)
            }
            Err(e) => {
                warn!(fixture = %name, error = %e, "fixture failed");
                Outcome::Failed(e)
            }
        };
        (name, outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::onnx_exporter::OnnxExporter;
    use crate::ir::{node, value_info, DataType, IrError, Tensor};
    use crate::registry::FixtureOutput;
    use tempfile::tempdir;

    fn relu_test() -> Result<FixtureOutput, IrError> {
        Ok(FixtureOutput::new(
            vec![node("Relu", &["x"], &["y"])],
            vec![value_info("x", DataType::F32, [4])],
            vec![value_info("y", DataType::F32, [4])],
        ))
    }

    fn abs_test() -> Result<FixtureOutput, IrError> {
        Ok(FixtureOutput::new(
            vec![node("Abs", &["x"], &["y"])],
            vec![value_info("x", DataType::F32, [4])],
            vec![value_info("y", DataType::F32, [4])],
        ))
    }

    fn broken_test() -> Result<FixtureOutput, IrError> {
        let k = Tensor::int64s("k", &[3], vec![1, 2])?;
        Ok(FixtureOutput::new(Vec::new(), Vec::new(), Vec::new()).with_initializers(vec![k]))
    }

    fn dangling_test() -> Result<FixtureOutput, IrError> {
        Ok(FixtureOutput::new(
            vec![node("Add", &["x", "w"], &["y"])],
            vec![value_info("x", DataType::F32, [4])],
            vec![value_info("y", DataType::F32, [4])],
        ))
    }

    fn out_of_range_test() -> Result<FixtureOutput, IrError> {
        let dims: Vec<usize> = Vec::new();
        let k = Tensor::floats("k", &[dims[0]], vec![1.0])?;
        Ok(FixtureOutput::new(Vec::new(), Vec::new(), Vec::new()).with_initializers(vec![k]))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("relu_test", relu_test).unwrap();
        registry.register("broken_test", broken_test).unwrap();
        registry.register("abs_test", abs_test).unwrap();
        registry.register("dangling_test", dangling_test).unwrap();
        registry
    }

    #[test]
    fn test_run_all_collects_failures() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(OnnxExporter::default(), dir.path());
        let results = runner.run_all(&registry(), None);

        let names: Vec<_> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["relu_test", "broken_test", "abs_test", "dangling_test"]);
        assert!(results[0].1.is_written());
        assert!(matches!(results[1].1, Outcome::Failed(RegistryError::FixtureExecution { .. })));
        assert!(results[2].1.is_written());
        assert!(matches!(results[3].1, Outcome::Failed(RegistryError::Export { .. })));
        assert!(dir.path().join("abs_test.onnx").exists());
    }

    #[test]
    fn test_run_all_parallel_matches_sequential() {
        let seq_dir = tempdir().unwrap();
        let par_dir = tempdir().unwrap();
        let registry = registry();

        let seq = Runner::new(OnnxExporter::default(), seq_dir.path()).run_all(&registry, None);
        let par = Runner::new(OnnxExporter::default(), par_dir.path())
            .with_jobs(3)
            .run_all(&registry, None);

        assert_eq!(seq.len(), par.len());
        for ((sn, so), (pn, po)) in seq.iter().zip(par.iter()) {
            assert_eq!(sn, pn);
            assert_eq!(so.is_written(), po.is_written());
        }
        let a = std::fs::read(seq_dir.path().join("relu_test.onnx")).unwrap();
        let b = std::fs::read(par_dir.path().join("relu_test.onnx")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_all_filter() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(OnnxExporter::default(), dir.path());
        let keep = |name: &str| name.starts_with("relu");
        let results = runner.run_all(&registry(), Some(&keep));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "relu_test");
        assert!(!dir.path().join("abs_test.onnx").exists());
    }

    #[test]
    fn test_cancelled_batch_starts_nothing() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(OnnxExporter::default(), dir.path()).with_jobs(2);
        runner.cancel_handle().store(true, Ordering::Relaxed);

        let results = runner.run_all(&registry(), None);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|(_, o)| matches!(o, Outcome::Cancelled)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_panicking_fixture_does_not_stop_batch() {
        for jobs in [1, 3] {
            let dir = tempdir().unwrap();
            let mut registry = registry();
            registry.register("out_of_range_test", out_of_range_test).unwrap();
            registry.register("last_test", relu_test).unwrap();

            let runner = Runner::new(OnnxExporter::default(), dir.path()).with_jobs(jobs);
            let results = runner.run_all(&registry, None);

            assert_eq!(results.len(), 6);
            assert_eq!(results[4].0, "out_of_range_test");
            assert!(matches!(
                results[4].1,
                Outcome::Failed(RegistryError::Panicked { ref name, .. })
                    if name == "out_of_range_test"
            ));
            assert!(results[5].1.is_written());
            assert!(dir.path().join("last_test.onnx").exists());
        }
    }

    #[test]
    fn test_cancellation_is_sticky() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(OnnxExporter::default(), dir.path());
        let cancel = runner.cancel_handle();
        cancel.store(true, Ordering::Relaxed);

        let registry = registry();
        assert!(matches!(runner.run_all(&registry, None)[0].1, Outcome::Cancelled));
        assert!(matches!(runner.run_all(&registry, None)[0].1, Outcome::Cancelled));

        cancel.store(false, Ordering::Relaxed);
        assert!(runner.run_all(&registry, None)[0].1.is_written());
    }

    #[test]
    fn test_run_one_propagates() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(OnnxExporter::default(), dir.path());
        let registry = registry();

        assert!(runner.run_one(&registry, "relu_test").is_ok());
        assert!(matches!(
            runner.run_one(&registry, "missing_test"),
            Err(RegistryError::UnknownFixture(_))
        ));
        assert!(matches!(
            runner.run_one(&registry, "broken_test"),
            Err(RegistryError::FixtureExecution { .. })
        ));
    }
}

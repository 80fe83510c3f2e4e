//! Step runner
//!
//! Flow: Config → Loading content → Loading pages → Building taxonomies
//!       → Rendering pages → Copying assets → Optimizing css/js/html
//!       → Writing completion marker
//!
//! Steps run strictly in order. The first failing step aborts the run and
//! its error is wrapped with the step name.

use crate::builder::{BuildError, Builder};
use crate::hooks::{AfterStep, BeforeStep};
use crate::step::{BuildOptions, BuildReport, Progress, Step, StepPayload, StepReport};
use std::time::Instant;

pub struct StepRunner {
    steps: Vec<Box<dyn Step>>,
}

impl StepRunner {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn run(
        &mut self,
        builder: &mut Builder,
        options: &BuildOptions,
    ) -> Result<BuildReport, BuildError> {
        // Hooks live on the builder but steps borrow it mutably
        let mut hooks = std::mem::take(&mut builder.hooks);
        let result = self.run_steps(builder, options, &mut hooks);
        builder.hooks = hooks;
        result
    }

    fn run_steps(
        &mut self,
        builder: &mut Builder,
        options: &BuildOptions,
        hooks: &mut crate::hooks::HookRegistry,
    ) -> Result<BuildReport, BuildError> {
        let total = self.steps.len();
        let mut report = BuildReport::default();

        for (idx, step) in self.steps.iter_mut().enumerate() {
            let name = step.name().to_string();
            let position = idx + 1;
            let started = Instant::now();

            hooks.run_before(&BeforeStep {
                step: &name,
                position,
                total,
            });

            let wrap = |source: BuildError| BuildError::Step {
                step: name.clone(),
                source: Box::new(source),
            };

            let can_process = step.init(builder, options).map_err(wrap)?;
            let (payload, messages) = if can_process {
                tracing::info!(step = %name, position, total, "Running step");
                let mut progress = Progress::new(&name);
                let payload = step.process(builder, &mut progress).map_err(wrap)?;
                let (done, of) = progress.position();
                tracing::debug!(step = %name, done, of, "Step processed");
                (payload, progress.into_messages())
            } else {
                tracing::debug!(step = %name, "Skipping step");
                (StepPayload::None, Vec::new())
            };

            let step_report = StepReport {
                name,
                skipped: !can_process,
                messages,
                payload,
                elapsed: started.elapsed(),
            };

            hooks.run_after(&AfterStep {
                step: &step_report.name,
                position,
                total,
                skipped: step_report.skipped,
                messages: &step_report.messages,
                payload: &step_report.payload,
                elapsed: step_report.elapsed,
            });

            report.steps.push(step_report);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::testing;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records its calls; fails in `process` when asked to
    struct Probe {
        name: &'static str,
        applies: bool,
        fail: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn new(name: &'static str, calls: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                applies: true,
                fail: false,
                calls: Rc::clone(calls),
            }
        }
    }

    impl Step for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self, _builder: &Builder, _options: &BuildOptions) -> Result<bool, BuildError> {
            self.calls.borrow_mut().push(format!("init {}", self.name));
            Ok(self.applies)
        }

        fn process(
            &mut self,
            _builder: &mut Builder,
            progress: &mut Progress,
        ) -> Result<StepPayload, BuildError> {
            self.calls.borrow_mut().push(format!("process {}", self.name));
            if self.fail {
                return Err(BuildError::EmptyExtensions("css".into()));
            }
            progress.message("Nothing to do");
            Ok(StepPayload::Content { files: 0 })
        }
    }

    #[test]
    fn test_steps_run_in_order_and_skip() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = testing::site(dir.path(), "");
        let calls = Rc::new(RefCell::new(Vec::new()));

        let mut skipped = Probe::new("two", &calls);
        skipped.applies = false;
        let mut runner = StepRunner::new(vec![
            Box::new(Probe::new("one", &calls)),
            Box::new(skipped),
            Box::new(Probe::new("three", &calls)),
        ]);

        let report = runner.run(&mut builder, &BuildOptions::default()).unwrap();
        assert_eq!(
            *calls.borrow(),
            vec!["init one", "process one", "init two", "init three", "process three"]
        );
        assert_eq!(report.steps.len(), 3);
        assert!(report.step("two").unwrap().skipped);
        assert_eq!(report.step("two").unwrap().payload, StepPayload::None);
        assert_eq!(report.step("three").unwrap().messages, vec!["Nothing to do"]);
    }

    #[test]
    fn test_failure_aborts_and_names_the_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = testing::site(dir.path(), "");
        let calls = Rc::new(RefCell::new(Vec::new()));

        let mut failing = Probe::new("Optimizing css", &calls);
        failing.fail = true;
        let mut runner = StepRunner::new(vec![
            Box::new(failing),
            Box::new(Probe::new("after", &calls)),
        ]);

        let err = runner.run(&mut builder, &BuildOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "step \"Optimizing css\" failed: The config key postprocess.css.ext is empty"
        );
        assert!(matches!(err.root(), BuildError::EmptyExtensions(_)));
        assert!(!calls.borrow().iter().any(|c| c.ends_with("after")));
    }

    #[test]
    fn test_hooks_see_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = testing::site(dir.path(), "");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        builder.hooks_mut().after_step(move |e| {
            log.borrow_mut()
                .push(format!("{}/{} {} skipped={}", e.position, e.total, e.step, e.skipped))
        });

        let mut skipped = Probe::new("b", &calls);
        skipped.applies = false;
        let mut runner = StepRunner::new(vec![Box::new(Probe::new("a", &calls)), Box::new(skipped)]);
        runner.run(&mut builder, &BuildOptions::default()).unwrap();

        assert_eq!(*seen.borrow(), vec!["1/2 a skipped=false", "2/2 b skipped=true"]);
        // Hooks are handed back to the builder after the run
        assert_eq!(builder.hooks_mut().len(), 1);
    }
}

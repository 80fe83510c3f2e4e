//! Step hooks: callbacks run around every pipeline step.

use crate::config::ConfigError;
use crate::step::StepPayload;
use std::time::Duration;

/// Passed to hooks before a step starts
#[derive(Debug, Clone, Copy)]
pub struct BeforeStep<'a> {
    pub step: &'a str,
    /// 1-based position in the pipeline
    pub position: usize,
    pub total: usize,
}

/// Passed to hooks once a step finished or was skipped
#[derive(Debug, Clone, Copy)]
pub struct AfterStep<'a> {
    pub step: &'a str,
    pub position: usize,
    pub total: usize,
    pub skipped: bool,
    pub messages: &'a [String],
    pub payload: &'a StepPayload,
    pub elapsed: Duration,
}

type BeforeHook = Box<dyn FnMut(&BeforeStep<'_>)>;
type AfterHook = Box<dyn FnMut(&AfterStep<'_>)>;

/// Hooks selectable by name from the `hooks` config list
pub static BUILTIN_HOOKS: &[(&str, fn(&mut HookRegistry))] =
    &[("timings", register_timings), ("summary", register_summary)];

#[derive(Default)]
pub struct HookRegistry {
    before: Vec<BeforeHook>,
    after: Vec<AfterHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the named built-in hooks
    pub fn from_names(names: &[String]) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for name in names {
            let (_, register) = BUILTIN_HOOKS
                .iter()
                .find(|(builtin, _)| *builtin == name.as_str())
                .ok_or_else(|| ConfigError::UnknownHook(name.clone()))?;
            register(&mut registry);
        }
        Ok(registry)
    }

    pub fn before_step<F>(&mut self, hook: F)
    where
        F: FnMut(&BeforeStep<'_>) + 'static,
    {
        self.before.push(Box::new(hook));
    }

    pub fn after_step<F>(&mut self, hook: F)
    where
        F: FnMut(&AfterStep<'_>) + 'static,
    {
        self.after.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn run_before(&mut self, event: &BeforeStep<'_>) {
        for hook in &mut self.before {
            hook(event);
        }
    }

    pub(crate) fn run_after(&mut self, event: &AfterStep<'_>) {
        for hook in &mut self.after {
            hook(event);
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

fn register_timings(registry: &mut HookRegistry) {
    registry.after_step(|event| {
        tracing::info!(
            step = event.step,
            skipped = event.skipped,
            elapsed_ms = event.elapsed.as_millis() as u64,
            "Step timing"
        );
    });
}

fn register_summary(registry: &mut HookRegistry) {
    registry.after_step(|event| {
        if !event.skipped {
            tracing::info!(step = event.step, payload = ?event.payload, "Step summary");
        }
    });
}

//! Step definitions.
//!
//! A [`Step`] is the scheduler's unit of sequencing. Steps are a closed
//! set of variants: instantaneous effects, tick delays, predicate delays,
//! parallel groups, deferred conditional splices, and wrapped timelines.
//!
//! Every step moves through the lifecycle `not-started → started → finished`;
//! `started` transitions exactly once, and starting a step twice is a
//! construction bug that panics.

use super::Timeline;

/// An instantaneous effect run when its step starts.
///
/// The context is always passed in explicitly; effects must not reach for
/// ambient state.
pub type StepEffect<C> = Box<dyn FnOnce(&mut C)>;

/// A pure predicate over the context. Must not mutate anything.
pub type StepPredicate<C> = Box<dyn Fn(&C) -> bool>;

/// A factory producing a fresh timeline at the moment it is needed.
pub type TimelineFactory<C> = Box<dyn FnOnce(&mut C) -> Timeline<C>>;

/// A single schedulable unit inside a [`Timeline`].
pub struct Step<C> {
    started: bool,
    kind: StepKind<C>,
}

enum StepKind<C> {
    /// Runs its effect on start, finishes immediately.
    Instant(Option<StepEffect<C>>),

    /// Suspends the timeline until the predicate reads true.
    DelayUntil(StepPredicate<C>),

    /// Suspends the timeline for a number of scheduler ticks.
    ///
    /// `fresh` absorbs the update that runs in the same tick the step was
    /// started, so a delay of N suspends across N tick boundaries.
    Delay { remaining: u32, fresh: bool },

    /// Advances all sub-steps together; finished when all are finished.
    /// Sub-steps that finish early are ended exactly once and dropped.
    Parallel(Vec<Step<C>>),

    /// Evaluates `condition` exactly once on start. If true, instantiates
    /// the factory's timeline and splices its steps (in original order)
    /// immediately after this marker.
    DeferredInclude {
        factory: Option<TimelineFactory<C>>,
        condition: StepPredicate<C>,
    },

    /// A whole timeline embedded as a single step.
    Wrapped(Timeline<C>),
}

impl<C> Step<C> {
    /// An instantaneous step running `effect` when reached.
    pub fn instant(effect: impl FnOnce(&mut C) + 'static) -> Self {
        Self::of(StepKind::Instant(Some(Box::new(effect))))
    }

    /// A step that blocks until `predicate` reads true.
    pub fn delay_until(predicate: impl Fn(&C) -> bool + 'static) -> Self {
        Self::of(StepKind::DelayUntil(Box::new(predicate)))
    }

    /// A step that blocks for `ticks` scheduler ticks.
    pub fn delay(ticks: u32) -> Self {
        Self::of(StepKind::Delay { remaining: ticks, fresh: true })
    }

    /// A group of steps advanced together.
    pub fn parallel(steps: Vec<Step<C>>) -> Self {
        Self::of(StepKind::Parallel(steps))
    }

    /// A deferred conditional splice: `condition` is evaluated once, at the
    /// moment the scheduler reaches this step; only then is the factory's
    /// timeline built and included.
    pub fn deferred(
        factory: impl FnOnce(&mut C) -> Timeline<C> + 'static,
        condition: impl Fn(&C) -> bool + 'static,
    ) -> Self {
        Self::of(StepKind::DeferredInclude {
            factory: Some(Box::new(factory)),
            condition: Box::new(condition),
        })
    }

    /// Wraps an un-started timeline as a single composable step.
    ///
    /// # Panics
    ///
    /// Panics if the timeline has already been started.
    pub fn wrap(timeline: Timeline<C>) -> Self {
        assert!(
            !timeline.has_been_started(),
            "a timeline cannot be made into a step after it has started"
        );
        Self::of(StepKind::Wrapped(timeline))
    }

    fn of(kind: StepKind<C>) -> Self {
        Self { started: false, kind }
    }

    /// True once the step has been started.
    #[must_use]
    pub fn has_been_started(&self) -> bool {
        self.started
    }

    /// Starts the step. `pending` receives any steps this step splices in
    /// front of the owning timeline's queue.
    ///
    /// # Panics
    ///
    /// Panics if the step was already started.
    pub(super) fn start(&mut self, ctx: &mut C, pending: &mut Vec<Step<C>>) {
        assert!(!self.started, "step started twice");
        self.started = true;
        match &mut self.kind {
            StepKind::Instant(effect) => {
                let effect = effect.take().expect("instant effect already consumed");
                effect(ctx);
            }
            StepKind::Parallel(steps) => {
                for step in steps.iter_mut() {
                    step.start(ctx, pending);
                }
            }
            StepKind::DeferredInclude { factory, condition } => {
                if condition(ctx) {
                    let factory = factory.take().expect("deferred factory already consumed");
                    let timeline = factory(ctx);
                    assert!(
                        !timeline.has_been_started(),
                        "cannot splice a timeline which was started already"
                    );
                    pending.extend(timeline.into_steps());
                }
            }
            StepKind::Wrapped(timeline) => timeline.start(ctx),
            StepKind::DelayUntil(_) | StepKind::Delay { .. } => {}
        }
    }

    /// Advances the step by one tick.
    pub(super) fn update(&mut self, ctx: &mut C, pending: &mut Vec<Step<C>>) {
        match &mut self.kind {
            StepKind::Delay { remaining, fresh } => {
                if *fresh {
                    *fresh = false;
                } else {
                    *remaining = remaining.saturating_sub(1);
                }
            }
            StepKind::Parallel(steps) => {
                // Advance everything still running, then end and drop the
                // newly finished sub-steps. Completion order is
                // unconstrained.
                for step in steps.iter_mut() {
                    step.update(ctx, pending);
                }
                steps.retain(|step| !step.probe_finished(ctx));
            }
            StepKind::Wrapped(timeline) => timeline.update(ctx),
            StepKind::Instant(_) | StepKind::DelayUntil(_) | StepKind::DeferredInclude { .. } => {}
        }
    }

    /// Checks whether the step has finished.
    pub(super) fn probe_finished(&self, ctx: &C) -> bool {
        match &self.kind {
            StepKind::Instant(_) | StepKind::DeferredInclude { .. } => true,
            StepKind::DelayUntil(predicate) => predicate(ctx),
            StepKind::Delay { remaining, .. } => *remaining == 0,
            StepKind::Parallel(steps) => steps.iter().all(|s| s.probe_finished(ctx)),
            StepKind::Wrapped(timeline) => timeline.is_finished(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            StepKind::Instant(_) => "Instant",
            StepKind::DelayUntil(_) => "DelayUntil",
            StepKind::Delay { .. } => "Delay",
            StepKind::Parallel(_) => "Parallel",
            StepKind::DeferredInclude { .. } => "DeferredInclude",
            StepKind::Wrapped(_) => "Wrapped",
        }
    }
}

impl<C> std::fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind_name())
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_runs_on_start() {
        let mut step: Step<i32> = Step::instant(|ctx| *ctx += 5);
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);

        assert_eq!(ctx, 5);
        assert!(step.probe_finished(&ctx));
    }

    #[test]
    #[should_panic(expected = "step started twice")]
    fn test_double_start_panics() {
        let mut step: Step<i32> = Step::delay(3);
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);
        step.start(&mut ctx, &mut pending);
    }

    #[test]
    fn test_delay_counts_ticks() {
        let mut step: Step<i32> = Step::delay(2);
        let mut ctx = 0;
        let mut pending = Vec::new();

        // Tick 1: start plus the same-tick update.
        step.start(&mut ctx, &mut pending);
        step.update(&mut ctx, &mut pending);
        assert!(!step.probe_finished(&ctx));

        // Tick 2.
        step.update(&mut ctx, &mut pending);
        assert!(!step.probe_finished(&ctx));

        // Tick 3.
        step.update(&mut ctx, &mut pending);
        assert!(step.probe_finished(&ctx));
    }

    #[test]
    fn test_zero_delay_finishes_instantly() {
        let mut step: Step<i32> = Step::delay(0);
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);
        step.update(&mut ctx, &mut pending);
        assert!(step.probe_finished(&ctx));
    }

    #[test]
    fn test_delay_until_reads_context() {
        let mut step: Step<i32> = Step::delay_until(|ctx| *ctx >= 10);
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);
        assert!(!step.probe_finished(&ctx));

        ctx = 10;
        assert!(step.probe_finished(&ctx));
    }

    #[test]
    fn test_deferred_false_is_noop() {
        let mut step: Step<i32> = Step::deferred(
            |_| Timeline::build(|b| b.action(|ctx| *ctx += 1)),
            |_| false,
        );
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);

        assert!(pending.is_empty());
        assert!(step.probe_finished(&ctx));
    }

    #[test]
    fn test_deferred_true_splices_steps() {
        let mut step: Step<i32> = Step::deferred(
            |_| {
                Timeline::build(|b| {
                    b.action(|ctx| *ctx += 1);
                    b.action(|ctx| *ctx += 2);
                })
            },
            |_| true,
        );
        let mut ctx = 0;
        let mut pending = Vec::new();

        step.start(&mut ctx, &mut pending);

        assert_eq!(pending.len(), 2);
        assert!(step.probe_finished(&ctx));
    }
}

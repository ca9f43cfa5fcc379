//! Cooperative action scheduler.
//!
//! A [`Timeline`] is an ordered, mutable queue of [`Step`]s driven by one
//! `update()` call per logical tick. Within a single call the timeline
//! drains every step that completes in zero time; only steps that genuinely
//! block (tick delays, predicate delays) suspend across calls. This is what
//! keeps rule resolution deterministic: nothing is dropped, nothing is
//! reordered, and a chain of instantaneous consequences always lands inside
//! one tick.
//!
//! ## Composition
//!
//! - [`Timeline::append`] adds to the back (same-level sequencing).
//! - [`Timeline::push`] inserts at the front, *after* the currently
//!   finishing step, via a buffer resolved at the end of the current drain
//!   iteration.
//! - [`Timeline::into_step`] wraps a whole un-started timeline as one
//!   composable step.
//! - [`Step::deferred`] splices a freshly built timeline in front of the
//!   queue, but only decides whether to do so at the moment the scheduler
//!   reaches it: the mechanism for "branch at execution time, not at
//!   construction time".
//!
//! The scheduler is generic over a context type `C` and knows nothing about
//! the game built on top of it. Context is passed into every effect,
//! predicate, and factory explicitly; closures must never capture ambient
//! mutable state.
//!
//! ## Failure semantics
//!
//! Starting a timeline or a step twice, or wrapping a started timeline as a
//! step, is a construction bug and panics. There is no recovery path.

mod step;

pub use step::{Step, StepEffect, StepPredicate, TimelineFactory};

use std::collections::VecDeque;

/// An ordered queue of steps driven cooperatively, one tick at a time.
pub struct Timeline<C> {
    steps: VecDeque<Step<C>>,
    /// Steps pushed while the current step runs; spliced to the front when
    /// that step finishes, preserving push order.
    push_buffer: Vec<Step<C>>,
    started: bool,
}

impl<C> Timeline<C> {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            push_buffer: Vec::new(),
            started: false,
        }
    }

    /// Builds a timeline through a [`TimelineBuilder`].
    #[must_use]
    pub fn build(f: impl FnOnce(&mut TimelineBuilder<C>)) -> Self {
        let mut builder = TimelineBuilder::new();
        f(&mut builder);
        builder.finish()
    }

    /// True when every step has run to completion (or none were queued).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// True once [`Timeline::start`] has been called.
    #[must_use]
    pub fn has_been_started(&self) -> bool {
        self.started
    }

    /// Number of steps still queued.
    #[must_use]
    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    /// Marks the timeline started and starts its first step (no-op when
    /// empty).
    ///
    /// # Panics
    ///
    /// Panics if the timeline was already started; a consumed or finished
    /// timeline must never be started again.
    pub fn start(&mut self, ctx: &mut C) {
        assert!(!self.started, "timeline started twice");
        self.started = true;
        if let Some(first) = self.steps.front_mut() {
            first.start(ctx, &mut self.push_buffer);
        }
    }

    /// Advances the timeline by one tick.
    ///
    /// Drains every step that finishes within this call: the current step is
    /// started if needed, advanced, and, if finished, retired, after which
    /// the loop continues with the next step. Only a genuinely blocking step
    /// suspends the timeline until the next tick.
    pub fn update(&mut self, ctx: &mut C) {
        if !self.started || self.is_finished() {
            return;
        }
        loop {
            let current = self
                .steps
                .front_mut()
                .expect("drain loop ran with an empty queue");
            if !current.has_been_started() {
                current.start(ctx, &mut self.push_buffer);
            }
            current.update(ctx, &mut self.push_buffer);
            if !current.probe_finished(ctx) {
                break;
            }
            self.steps.pop_front();
            for step in self.push_buffer.drain(..).rev() {
                self.steps.push_front(step);
            }
            if self.steps.is_empty() {
                break;
            }
        }
    }

    /// Appends a step to the end of the queue.
    pub fn append(&mut self, step: Step<C>) {
        self.steps.push_back(step);
    }

    /// Pushes a step to the very front of the queue, landing *after* the
    /// currently finishing step. Steps pushed during one drain iteration
    /// keep their push order.
    pub fn push(&mut self, step: Step<C>) {
        self.push_buffer.push(step);
    }

    /// Consumes the timeline, wrapping it as a single composable step.
    ///
    /// # Panics
    ///
    /// Panics if the timeline has already been started.
    #[must_use]
    pub fn into_step(self) -> Step<C> {
        Step::wrap(self)
    }

    pub(crate) fn into_steps(self) -> VecDeque<Step<C>> {
        assert!(
            !self.started,
            "cannot take the steps of a timeline which was started already"
        );
        self.steps
    }
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Timeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("steps", &self.steps)
            .field("started", &self.started)
            .finish()
    }
}

/// Builds timelines step by step.
///
/// The builder mirrors the composition vocabulary of the scheduler:
/// instantaneous actions, delays, inclusion of other timelines, deferred
/// conditional inclusion, and parallel groups.
pub struct TimelineBuilder<C> {
    steps: Vec<Step<C>>,
}

impl<C> TimelineBuilder<C> {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds an instantaneous action.
    pub fn action(&mut self, effect: impl FnOnce(&mut C) + 'static) {
        self.steps.push(Step::instant(effect));
    }

    /// Delays the timeline until `condition` reads true.
    pub fn delay_until(&mut self, condition: impl Fn(&C) -> bool + 'static) {
        self.steps.push(Step::delay_until(condition));
    }

    /// Delays the timeline for `ticks` scheduler ticks.
    pub fn delay(&mut self, ticks: u32) {
        self.steps.push(Step::delay(ticks));
    }

    /// Adds an already-built step.
    pub fn step(&mut self, step: Step<C>) {
        self.steps.push(step);
    }

    /// Includes the steps of another timeline at this position.
    ///
    /// # Panics
    ///
    /// Panics if `timeline` has already been started.
    pub fn include(&mut self, timeline: Timeline<C>) {
        self.steps.extend(timeline.into_steps());
    }

    /// Includes a timeline conditionally, deciding at execution time.
    ///
    /// `condition` is evaluated exactly once, when the scheduler reaches this
    /// position; only then is `factory` invoked and its timeline spliced in.
    /// Useful when the outcome of the condition is unknown while the outer
    /// timeline is being constructed.
    pub fn include_later(
        &mut self,
        factory: impl FnOnce(&mut C) -> Timeline<C> + 'static,
        condition: impl Fn(&C) -> bool + 'static,
    ) {
        self.steps.push(Step::deferred(factory, condition));
    }

    /// Like [`TimelineBuilder::include_later`], but splices a single step.
    pub fn step_later(&mut self, step: Step<C>, condition: impl Fn(&C) -> bool + 'static)
    where
        C: 'static,
    {
        let mut slot = Some(step);
        self.steps.push(Step::deferred(
            move |_| {
                let mut timeline = Timeline::new();
                timeline.append(slot.take().expect("deferred step already consumed"));
                timeline
            },
            condition,
        ));
    }

    /// Adds a group of steps advanced in parallel.
    pub fn parallel(&mut self, steps: Vec<Step<C>>) {
        self.steps.push(Step::parallel(steps));
    }

    fn finish(self) -> Timeline<C> {
        let mut timeline = Timeline::new();
        timeline.steps = self.steps.into();
        timeline
    }
}

/// Merges timelines into one that runs them in sequence.
///
/// None of the inputs may have been started.
#[must_use]
pub fn collect_timelines<C>(timelines: impl IntoIterator<Item = Timeline<C>>) -> Timeline<C> {
    let mut collected = Timeline::new();
    for timeline in timelines {
        for step in timeline.into_steps() {
            collected.append(step);
        }
    }
    collected
}

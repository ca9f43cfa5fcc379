//! Scheduler integration tests.
//!
//! These pin down the guarantees the rest of the engine is built on: the
//! zero-time drain, push-buffer ordering, parallel completion, deferred
//! conditional splicing, and the fatal misuse paths.

use proptest::prelude::*;

use sixshooter::timeline::{Step, Timeline};

type Ctx = Vec<u32>;

// =============================================================================
// Zero-time drain
// =============================================================================

/// Any timeline composed solely of instant steps finishes within a single
/// `start()` + `update()`, regardless of step count.
#[test]
fn test_instant_timeline_drains_in_one_update() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        for i in 0..100 {
            b.action(move |ctx: &mut Ctx| ctx.push(i));
        }
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);

    assert!(timeline.is_finished());
    assert_eq!(ctx.len(), 100);
    assert!(ctx.windows(2).all(|pair| pair[0] < pair[1]));
}

proptest! {
    /// The drain guarantee holds for every instant-step count.
    #[test]
    fn prop_instant_steps_always_drain(count in 0usize..200) {
        let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
            for i in 0..count {
                b.action(move |ctx: &mut Ctx| ctx.push(i as u32));
            }
        });
        let mut ctx = Vec::new();

        timeline.start(&mut ctx);
        timeline.update(&mut ctx);

        prop_assert!(timeline.is_finished());
        prop_assert_eq!(ctx.len(), count);
    }
}

// =============================================================================
// Parallel groups
// =============================================================================

/// A parallel group is finished iff all sub-steps are finished; early
/// finishers are retired exactly once while the group stays open.
#[test]
fn test_parallel_waits_for_slowest() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.parallel(vec![
            Step::instant(|ctx: &mut Ctx| ctx.push(1)),
            Step::delay(2),
        ]);
        b.action(|ctx: &mut Ctx| ctx.push(2));
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);
    assert_eq!(ctx, vec![1]);
    assert!(!timeline.is_finished());

    timeline.update(&mut ctx);
    assert!(!timeline.is_finished());

    timeline.update(&mut ctx);
    assert_eq!(ctx, vec![1, 2]);
    assert!(timeline.is_finished());
}

/// Completion order of parallel sub-steps is unconstrained; the group ends
/// when the last one does, whichever that is.
#[test]
fn test_parallel_mixed_durations() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.parallel(vec![Step::delay(3), Step::delay(1), Step::delay(2)]);
        b.action(|ctx: &mut Ctx| ctx.push(9));
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    for _ in 0..3 {
        timeline.update(&mut ctx);
        assert!(ctx.is_empty());
    }
    timeline.update(&mut ctx);
    assert_eq!(ctx, vec![9]);
}

// =============================================================================
// Deferred includes
// =============================================================================

/// A deferred include with a true condition splices the factory's steps in
/// their original order, before anything already queued after the marker.
#[test]
fn test_deferred_include_runs_before_queued_steps() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.include_later(
            |_| {
                Timeline::build(|b| {
                    b.action(|ctx: &mut Ctx| ctx.push(1));
                    b.action(|ctx: &mut Ctx| ctx.push(2));
                })
            },
            |_| true,
        );
        b.action(|ctx: &mut Ctx| ctx.push(3));
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);

    assert_eq!(ctx, vec![1, 2, 3]);
}

/// The condition is evaluated exactly once, at execution time, against the
/// state earlier steps produced.
#[test]
fn test_deferred_condition_sees_execution_time_state() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.action(|ctx: &mut Ctx| ctx.push(42));
        b.include_later(
            |_| Timeline::build(|b| b.action(|ctx: &mut Ctx| ctx.push(1))),
            |ctx: &Ctx| ctx.contains(&42),
        );
        b.include_later(
            |_| Timeline::build(|b| b.action(|ctx: &mut Ctx| ctx.push(2))),
            |ctx: &Ctx| ctx.contains(&999),
        );
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);

    assert_eq!(ctx, vec![42, 1]);
}

/// Nested deferred includes splice depth-first: the inner include's steps
/// run before anything queued after it.
#[test]
fn test_nested_deferred_includes() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.include_later(
            |_| {
                Timeline::build(|b| {
                    b.action(|ctx: &mut Ctx| ctx.push(1));
                    b.include_later(
                        |_| Timeline::build(|b| b.action(|ctx: &mut Ctx| ctx.push(2))),
                        |_| true,
                    );
                    b.action(|ctx: &mut Ctx| ctx.push(3));
                })
            },
            |_| true,
        );
        b.action(|ctx: &mut Ctx| ctx.push(4));
    });
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);

    assert_eq!(ctx, vec![1, 2, 3, 4]);
}

// =============================================================================
// Push buffer
// =============================================================================

/// Steps pushed while a step runs land immediately after it, before the
/// rest of the queue.
#[test]
fn test_push_from_within_a_step() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| {
        b.action(|ctx: &mut Ctx| ctx.push(1));
        b.delay_until(|ctx: &Ctx| ctx.contains(&1));
        b.action(|ctx: &mut Ctx| ctx.push(3));
    });
    timeline.push(Step::instant(|ctx: &mut Ctx| ctx.push(2)));
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.update(&mut ctx);

    assert_eq!(ctx, vec![1, 2, 3]);
}

// =============================================================================
// Wrapping
// =============================================================================

/// A timeline embedded via `into_step` is driven by the outer update and
/// reports finished only when its own queue drains.
#[test]
fn test_wrapped_timeline_suspends_outer() {
    let inner: Timeline<Ctx> = Timeline::build(|b| {
        b.delay_until(|ctx: &Ctx| ctx.contains(&7));
        b.action(|ctx: &mut Ctx| ctx.push(8));
    });
    let mut outer: Timeline<Ctx> = Timeline::new();
    outer.append(inner.into_step());
    outer.append(Step::instant(|ctx: &mut Ctx| ctx.push(9)));
    let mut ctx = Vec::new();

    outer.start(&mut ctx);
    outer.update(&mut ctx);
    assert!(!outer.is_finished());

    ctx.push(7);
    outer.update(&mut ctx);
    assert_eq!(ctx, vec![7, 8, 9]);
    assert!(outer.is_finished());
}

// =============================================================================
// Fatal misuse
// =============================================================================

#[test]
#[should_panic(expected = "timeline started twice")]
fn test_restarting_a_timeline_panics() {
    let mut timeline: Timeline<Ctx> = Timeline::new();
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    timeline.start(&mut ctx);
}

#[test]
#[should_panic(expected = "cannot be made into a step")]
fn test_wrapping_started_timeline_panics() {
    let mut timeline: Timeline<Ctx> = Timeline::build(|b| b.delay(1));
    let mut ctx = Vec::new();

    timeline.start(&mut ctx);
    let _ = timeline.into_step();
}

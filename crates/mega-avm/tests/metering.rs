//! Tests for energy charging, the stack watchdog and forced exits at execution time.

use std::thread;

use mega_avm::{
    test_utils::{blocks_with_costs, flat_schedule, replay_straight_line},
    AvmEngine, EngineConfig, FatalSignal, InternalErrorCode, MethodExit, Opcode, StatusKind,
    WatchdogConfig, WatchdogPolicy,
};

/// An engine where `NOP` costs 1 and control flow is free.
fn nop_engine(watchdog: WatchdogConfig) -> AvmEngine {
    AvmEngine::new(EngineConfig {
        watchdog,
        cost_schedule: Some(flat_schedule(&[
            (Opcode::NOP, 1),
            (Opcode::GOTO, 0),
            (Opcode::RETURN, 0),
        ])),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_exhaustion_stops_before_the_unaffordable_block() {
    let engine = nop_engine(WatchdogConfig::default());
    let instrumented = engine.instrument(&blocks_with_costs(&[40, 40, 40])).unwrap();
    let mut ctx = engine.new_execution(100);

    let replay = replay_straight_line(&mut ctx, &instrumented);
    assert_eq!(replay.charged, vec![40, 40]);
    assert_eq!(replay.signal, Some(FatalSignal::OutOfEnergy { cost: 40, remaining: 20 }));
    // Two blocks of 40 NOPs and their GOTOs ran; nothing of the third.
    assert_eq!(replay.executed, 2 * 41);
    assert_eq!(ctx.energy_used(), 100);
    assert_eq!(ctx.energy_remaining(), 0);

    let result = ctx.finish(MethodExit::Returned(None));
    assert_eq!(result.status.kind(), StatusKind::NonRevertedFailure);
    assert_eq!(result.status.code(), InternalErrorCode::FailedOutOfEnergy);
    assert_eq!(result.energy_used, 100);
}

#[test]
fn test_exact_budget_is_enough() {
    let engine = nop_engine(WatchdogConfig::default());
    let instrumented = engine.instrument(&blocks_with_costs(&[40, 40, 20])).unwrap();
    let mut ctx = engine.new_execution(100);
    let replay = replay_straight_line(&mut ctx, &instrumented);
    assert_eq!(replay.signal, None);
    let result = ctx.finish(MethodExit::Returned(None));
    assert!(result.status.is_success());
    assert_eq!(result.energy_used, 100);
}

#[test]
fn test_latched_signal_survives_local_handler() {
    let engine = nop_engine(WatchdogConfig::default());
    let mut ctx = engine.new_execution(10);
    let signal = ctx.charge(11).unwrap_err();

    // The sandboxed code catches the exception and carries on: every later boundary re-raises.
    ctx.enter_catch_block(1, 3);
    assert_eq!(ctx.charge(0), Err(signal));
    assert_eq!(ctx.enter_method(3), Err(signal));
    assert_eq!(ctx.exit_method(3), Err(signal));
    assert_eq!(ctx.forced_exit(), Some(signal));
}

#[test]
fn test_watchdog_depth_boundary() {
    let engine = nop_engine(WatchdogConfig {
        policy: WatchdogPolicy::CHECK_DEPTH,
        max_depth: 3,
        max_size: 0,
    });
    let mut ctx = engine.new_execution(1_000);
    for _ in 0..3 {
        ctx.enter_method(5).unwrap();
    }
    assert_eq!(ctx.watchdog().depth(), 3);
    let signal = ctx.enter_method(5).unwrap_err();
    assert!(matches!(signal, FatalSignal::OutOfStack { depth: 4, size: 20 }));

    for _ in 0..4 {
        assert_eq!(ctx.exit_method(5), Err(signal));
    }
    assert_eq!(ctx.watchdog().depth(), 0);
    assert_eq!(ctx.watchdog().size(), 0);

    let result = ctx.finish(MethodExit::UncaughtException);
    assert_eq!(result.status.code(), InternalErrorCode::FailedOutOfStack);
    assert_eq!(result.energy_used, 1_000);
}

#[test]
fn test_watchdog_size_uses_frame_size() {
    let engine = nop_engine(WatchdogConfig {
        policy: WatchdogPolicy::CHECK_SIZE,
        max_depth: 0,
        max_size: 10,
    });
    let body = blocks_with_costs(&[1]);
    let frame = engine.instrument(&body).unwrap().frame_size;
    assert_eq!(frame, body.frame_size());

    let mut ctx = engine.new_execution(1_000);
    let mut entered = 0;
    while ctx.enter_method(frame).is_ok() {
        entered += 1;
    }
    assert_eq!(entered, 10 / frame);
}

#[test]
fn test_abort_from_supervisor_thread() {
    let engine = nop_engine(WatchdogConfig::default());
    let mut ctx = engine.new_execution(1_000);
    let handle = ctx.abort_handle();
    ctx.charge(1).unwrap();

    thread::spawn(move || handle.abort()).join().unwrap();

    assert_eq!(ctx.charge(1), Err(FatalSignal::Aborted));
    let result = ctx.finish(MethodExit::Returned(None));
    assert_eq!(result.status.code(), InternalErrorCode::Aborted);
    assert_eq!(result.status.kind(), StatusKind::NonRevertedFailure);
    assert_eq!(result.energy_used, 1_000);
}

#[test]
fn test_replays_are_deterministic() {
    let engine = nop_engine(WatchdogConfig::default());
    let instrumented = engine.instrument(&blocks_with_costs(&[3, 9, 0, 27, 81])).unwrap();
    let runs: Vec<_> = (0..2)
        .map(|_| {
            let mut ctx = engine.new_execution(100);
            let replay = replay_straight_line(&mut ctx, &instrumented);
            (replay, ctx.energy_used())
        })
        .collect();
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].0.charged, vec![3, 9, 27]);
}

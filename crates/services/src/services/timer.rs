//! Task timer state machine. Pure logic over a task's timer sub-record plus
//! a caller-supplied wall-clock reading; this module is the single writer of
//! `total_seconds` and the session list, which keeps the cached sum and the
//! audit trail consistent.

use chrono::{DateTime, Utc};
use db::models::task::{TaskTimer, TimerSession};

/// Whole seconds between `started_at` and `now`, clamped at zero so clock
/// skew can never subtract time.
fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - started_at).num_seconds().max(0)
}

/// Starts the timer. Idempotent: a running timer is left untouched, no
/// duplicate session is opened.
pub fn start(timer: &mut TaskTimer, now: DateTime<Utc>) {
    if timer.is_running {
        return;
    }
    timer.is_running = true;
    timer.started_at = Some(now);
    timer.sessions.push(TimerSession {
        start_time: now,
        end_time: None,
        duration_seconds: 0,
    });
}

/// Stops the timer: closes the open session, adds its floored duration to
/// the running total and clears `started_at`. A stopped timer is left
/// untouched, so stop without a prior start is a no-op.
pub fn stop(timer: &mut TaskTimer, now: DateTime<Utc>) {
    if !timer.is_running {
        return;
    }
    let elapsed = timer
        .started_at
        .map(|started_at| elapsed_seconds(started_at, now))
        .unwrap_or(0);
    if let Some(session) = timer.sessions.last_mut() {
        if session.end_time.is_none() {
            session.end_time = Some(now);
            session.duration_seconds = elapsed;
        }
    }
    timer.total_seconds += elapsed;
    timer.is_running = false;
    timer.started_at = None;
}

/// Accumulated seconds including the live increment of a running timer.
/// Pure read, used for status polling.
pub fn current_duration(timer: &TaskTimer, now: DateTime<Utc>) -> i64 {
    match timer.started_at {
        Some(started_at) if timer.is_running => {
            timer.total_seconds + elapsed_seconds(started_at, now)
        }
        _ => timer.total_seconds,
    }
}

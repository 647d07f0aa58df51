//! State-machine and counter tests
//!
//! Exercises the atomic connection state and metrics primitives directly,
//! no socket involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use wirefeed::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

#[test]
fn state_walks_the_whole_lifecycle() {
    let state = AtomicConnectionState::new(ConnectionState::Closed);
    assert!(state.is_closed());

    state.set(ConnectionState::Connecting);
    assert!(state.is_connecting());
    assert!(!state.is_open());

    state.set(ConnectionState::Open);
    assert!(state.is_open());

    state.set(ConnectionState::Closed);
    assert!(state.is_closed());

    state.set(ConnectionState::ShuttingDown);
    assert!(state.is_shutting_down());
}

#[test]
fn reconnect_cycle_counts_each_attempt() {
    let state = AtomicConnectionState::new(ConnectionState::Open);
    let metrics = AtomicMetrics::new();

    // Closed -> Connecting -> Open, over and over, forever if need be
    for _ in 0..3 {
        state.set(ConnectionState::Closed);
        metrics.increment_reconnects();
        state.set(ConnectionState::Connecting);
        state.set(ConnectionState::Open);
        assert!(state.is_open());
    }

    assert_eq!(metrics.reconnect_count(), 3);
}

#[test]
fn state_and_counters_survive_contention() {
    let state = Arc::new(AtomicConnectionState::new(ConnectionState::Closed));
    let metrics = Arc::new(AtomicMetrics::new());
    let mut handles = vec![];

    for _ in 0..4 {
        let state = Arc::clone(&state);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                let _ = state.get();
                let _ = state.is_open();
            }
        }));
    }

    for _ in 0..4 {
        let state = Arc::clone(&state);
        handles.push(thread::spawn(move || {
            for _ in 0..250 {
                state.set(ConnectionState::Open);
                state.set(ConnectionState::Closed);
            }
        }));
    }

    for _ in 0..4 {
        let metrics = Arc::clone(&metrics);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                metrics.increment_received();
                metrics.increment_dropped();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(metrics.messages_received(), 4000);
    assert_eq!(metrics.messages_dropped(), 4000);
    // Writers always finish on Closed
    assert!(state.is_closed());
}

#[test]
fn compare_exchange_admits_a_single_winner() {
    let state = Arc::new(AtomicConnectionState::new(ConnectionState::Closed));
    let winners = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..10 {
        let state = Arc::clone(&state);
        let winners = Arc::clone(&winners);
        handles.push(thread::spawn(move || {
            let claimed = state
                .compare_exchange(ConnectionState::Closed, ConnectionState::Connecting)
                .is_ok();
            if claimed {
                winners.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::Relaxed), 1);
    assert!(state.is_connecting());
}

#[test]
fn counters_are_independent_of_state_changes() {
    let state = AtomicConnectionState::new(ConnectionState::Closed);
    let metrics = AtomicMetrics::new();

    state.set(ConnectionState::Open);
    for _ in 0..10 {
        metrics.increment_received();
    }
    metrics.increment_dropped();
    state.set(ConnectionState::Closed);

    assert_eq!(metrics.messages_received(), 10);
    assert_eq!(metrics.messages_dropped(), 1);
    assert_eq!(metrics.reconnect_count(), 0);

    metrics.increment_reconnects();
    state.set(ConnectionState::Open);
    assert_eq!(metrics.reconnect_count(), 1);
}

//! Cenários de ciclo de vida com contextos reais (threads do host).

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use std::vec::Vec;

use super::config::ThreadConfig;
use super::host::{self, HostManager, HostSubstrate};
use super::thread::{ProcessInfo, ThreadEntry, ThreadManager, ThreadState};
use crate::sys::error::{ThreadError, ThreadResult};
use crate::sys::types::{Pid, Tid};

const P1: Pid = Pid(10);
const P2: Pid = Pid(20);

/// Porta que segura uma task até o teste liberar.
#[derive(Default)]
struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }
}

/// Processo cuja thread principal é a própria thread do teste.
fn attach(pid: Pid) -> (Arc<HostManager>, HostSubstrate, Tid) {
    let (mgr, host) = host::manager();
    let ctx = host.enter_new_context();
    let main = mgr.attach_process(pid, ctx).unwrap();
    (mgr, host, main)
}

fn returning(value: i32) -> ThreadEntry {
    ThreadEntry::new(move |_, _| value, 0, 0)
}

fn gated(gate: &Arc<Gate>, value: i32) -> ThreadEntry {
    let gate = Arc::clone(gate);
    ThreadEntry::new(
        move |_, _| {
            gate.wait();
            value
        },
        0,
        0,
    )
}

/// Resultado de join achatado em i32 (erro vira código negativo).
fn encode(result: ThreadResult<i32>) -> i32 {
    match result {
        Ok(v) => v,
        Err(e) => e.as_isize() as i32,
    }
}

fn joiner(mgr: &Arc<HostManager>, target: Tid) -> ThreadEntry {
    let mgr = Arc::clone(mgr);
    ThreadEntry::new(move |_, _| encode(mgr.thread_join(target)), 0, 0)
}

/// Entry que se torna detached e sai com `value`.
fn self_detaching(mgr: &Arc<HostManager>, value: i32) -> ThreadEntry {
    let mgr = Arc::clone(mgr);
    ThreadEntry::new(
        move |_, _| {
            mgr.thread_detach(mgr.thread_self()).unwrap();
            mgr.thread_exit(value)
        },
        0,
        0,
    )
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(20);
    while !cond() {
        assert!(Instant::now() < deadline, "condição não foi atingida");
        thread::sleep(Duration::from_millis(2));
    }
}

// =============================================================================
// CREATE / JOIN
// =============================================================================

#[test]
fn join_returns_exit_value_and_reaps() {
    let (mgr, _host, main) = attach(P1);

    let a = mgr.create_thread(returning(7)).unwrap();
    assert!(a > main);
    assert_eq!(mgr.thread_join(a), Ok(7));

    assert_eq!(mgr.thread_state(P1, a), None);
    assert_eq!(mgr.thread_join(a), Err(ThreadError::UnknownTarget));
    assert_eq!(mgr.process_info(P1).unwrap().records, 1);
}

#[test]
fn concurrent_joiners_share_the_result() {
    let (mgr, _host, _main) = attach(P1);
    let gate = Gate::new();

    let a = mgr.create_thread(returning(7)).unwrap();
    let b = mgr.create_thread(gated(&gate, 9)).unwrap();
    let j1 = mgr.create_thread(joiner(&mgr, b)).unwrap();
    let j2 = mgr.create_thread(joiner(&mgr, b)).unwrap();

    wait_until(|| mgr.thread_waiters(P1, b) == Some(2));
    gate.open();

    assert_eq!(mgr.thread_join(a), Ok(7));
    assert_eq!(mgr.thread_join(j1), Ok(9));
    assert_eq!(mgr.thread_join(j2), Ok(9));
    // O último joiner já colheu o PTCB
    assert_eq!(mgr.thread_join(b), Err(ThreadError::UnknownTarget));
}

#[test]
fn join_on_already_exited_thread_does_not_block() {
    let (mgr, _host, _main) = attach(P1);
    let t = mgr.create_thread(returning(-3)).unwrap();

    wait_until(|| mgr.thread_state(P1, t) == Some(ThreadState::Exited));
    assert_eq!(mgr.thread_join(t), Ok(-3));
}

#[test]
fn self_join_fails_immediately() {
    let (mgr, _host, main) = attach(P1);
    assert_eq!(mgr.thread_join(main), Err(ThreadError::InvalidSelfJoin));

    let t = mgr
        .create_thread({
            let mgr = Arc::clone(&mgr);
            ThreadEntry::new(move |_, _| encode(mgr.thread_join(mgr.thread_self())), 0, 0)
        })
        .unwrap();
    assert_eq!(
        mgr.thread_join(t),
        Ok(ThreadError::InvalidSelfJoin.as_isize() as i32)
    );
}

#[test]
fn unknown_and_foreign_targets_are_rejected() {
    let (mgr, _host, _main) = attach(P1);

    assert_eq!(mgr.thread_join(Tid::new(9999)), Err(ThreadError::UnknownTarget));
    assert_eq!(mgr.thread_join(Tid::NONE), Err(ThreadError::UnknownTarget));

    // Thread de outro processo, mesmo gerenciador
    let (tx, rx) = mpsc::channel();
    let other = Arc::clone(&mgr);
    let gate = Gate::new();
    let held = Arc::clone(&gate);
    thread::spawn(move || {
        let ctx = other.substrate().enter_new_context();
        other.attach_process(P2, ctx).unwrap();
        tx.send(other.create_thread(gated(&held, 1)).unwrap()).unwrap();
    });
    let foreign = rx.recv().unwrap();

    assert!(mgr.thread_state(P2, foreign).is_some());
    assert_eq!(mgr.thread_join(foreign), Err(ThreadError::UnknownTarget));

    let local_gate = Gate::new();
    let local = mgr.create_thread(gated(&local_gate, 0)).unwrap();
    assert_eq!(mgr.thread_detach(foreign), Err(ThreadError::UnknownTarget));
    local_gate.open();
    assert_eq!(mgr.thread_join(local), Ok(0));
    gate.open();
}

#[test]
fn tids_are_never_reused() {
    let (mgr, _host, main) = attach(P1);

    let mut seen: Vec<Tid> = Vec::from([main]);
    for v in 0..5 {
        let t = mgr.create_thread(returning(v)).unwrap();
        assert!(t > *seen.last().unwrap());
        assert_eq!(mgr.thread_join(t), Ok(v));
        seen.push(t);
    }
    assert!(seen.iter().all(|t| !t.is_none()));
}

#[test]
fn entry_can_call_exit_directly() {
    let (mgr, _host, _main) = attach(P1);
    let m = Arc::clone(&mgr);
    let t = mgr
        .create_thread(ThreadEntry::new(move |_, _| -> i32 { m.thread_exit(13) }, 0, 0))
        .unwrap();
    assert_eq!(mgr.thread_join(t), Ok(13));
}

#[test]
fn entry_receives_its_arguments() {
    let (mgr, _host, _main) = attach(P1);
    let t = mgr
        .create_thread(ThreadEntry::from_task(|l, a| (l * 10 + a) as i32, 4, 2))
        .unwrap();
    assert_eq!(mgr.thread_join(t), Ok(42));
}

// =============================================================================
// SELF
// =============================================================================

#[test]
fn self_reports_the_calling_thread() {
    let (mgr, _host, main) = attach(P1);
    assert_eq!(mgr.thread_self(), main);

    let m = Arc::clone(&mgr);
    let t = mgr
        .create_thread(ThreadEntry::new(move |_, _| m.thread_self().as_u32() as i32, 0, 0))
        .unwrap();
    assert_eq!(mgr.thread_join(t), Ok(t.as_u32() as i32));

    let m = Arc::clone(&mgr);
    let outside = thread::spawn(move || m.thread_self()).join().unwrap();
    assert_eq!(outside, Tid::NONE);
}

#[test]
fn unmanaged_context_cannot_create_or_join() {
    let (mgr, _host) = host::manager();
    thread::spawn(move || {
        assert_eq!(
            mgr.create_thread(returning(0)),
            Err(ThreadError::NoCurrentThread)
        );
        assert_eq!(mgr.thread_join(Tid::new(2)), Err(ThreadError::NoCurrentThread));
        assert_eq!(mgr.thread_detach(Tid::new(2)), Err(ThreadError::NoCurrentThread));
    })
    .join()
    .unwrap();
}

// =============================================================================
// DETACH
// =============================================================================

#[test]
fn detached_thread_cannot_be_joined() {
    let (mgr, host, _main) = attach(P1);
    let gate = Gate::new();
    let t = mgr.create_thread(gated(&gate, 5)).unwrap();

    assert_eq!(mgr.thread_detach(t), Ok(()));
    assert_eq!(mgr.thread_state(P1, t), Some(ThreadState::Detached));
    assert_eq!(mgr.thread_join(t), Err(ThreadError::NotJoinable));

    gate.open();
    host.wait_parked(1);
    // PTCB colhido no exit, tid continua conhecido
    assert_eq!(mgr.thread_state(P1, t), Some(ThreadState::Exited));
    assert_eq!(mgr.thread_join(t), Err(ThreadError::NotJoinable));
    let info = mgr.process_info(P1).unwrap();
    assert_eq!(info.records, 1);
    assert_eq!(info.reaped_detached, 1);
}

#[test]
fn detach_releases_blocked_joiners() {
    let (mgr, _host, _main) = attach(P1);
    let gate = Gate::new();
    let t = mgr.create_thread(gated(&gate, 5)).unwrap();
    let j = mgr.create_thread(joiner(&mgr, t)).unwrap();

    wait_until(|| mgr.thread_waiters(P1, t) == Some(1));
    assert_eq!(mgr.thread_detach(t), Ok(()));

    assert_eq!(
        mgr.thread_join(j),
        Ok(ThreadError::NotJoinable.as_isize() as i32)
    );
    assert_eq!(mgr.thread_waiters(P1, t), Some(0));
    gate.open();
}

#[test]
fn self_detach_always_succeeds() {
    let (mgr, _host, main) = attach(P1);
    // Thread única: a regra das 2 threads ativas não vale para si mesma
    assert_eq!(mgr.thread_detach(main), Ok(()));
    assert_eq!(mgr.thread_state(P1, main), Some(ThreadState::Detached));
    assert_eq!(mgr.thread_detach(main), Ok(()));
}

#[test]
fn self_detached_thread_exits_unjoinable() {
    let (mgr, _host, _main) = attach(P1);
    let t = mgr.create_thread(self_detaching(&mgr, 3)).unwrap();

    wait_until(|| mgr.thread_state(P1, t) == Some(ThreadState::Exited));
    assert_eq!(mgr.thread_join(t), Err(ThreadError::NotJoinable));
    assert_eq!(mgr.thread_detach(t), Err(ThreadError::DetachIneligible));

    let info = mgr.process_info(P1).unwrap();
    assert_eq!(info.active_threads, 1);
    assert_eq!(info.records, 1);
}

#[test]
fn detached_exits_free_their_slots() {
    let host = HostSubstrate::new();
    let config = ThreadConfig::new().with_max_threads(4);
    let mgr = Arc::new(ThreadManager::with_config(host.clone(), config));
    let ctx = host.enter_new_context();
    mgr.attach_process(P1, ctx).unwrap();

    for round in 0..6 {
        let t = mgr.create_thread(self_detaching(&mgr, round)).unwrap();
        wait_until(|| {
            mgr.thread_state(P1, t) == Some(ThreadState::Exited)
                && mgr.process_info(P1).map(|i| i.records) == Some(1)
        });
    }

    let info = mgr.process_info(P1).unwrap();
    assert_eq!(info.reaped_detached, 6);
    assert_eq!(info.active_threads, 1);
    let t = mgr.create_thread(returning(9)).unwrap();
    assert_eq!(mgr.thread_join(t), Ok(9));
}

/// Estado observável do processo e de cada tid em `tids`.
fn snapshot(
    mgr: &HostManager,
    tids: &[Tid],
) -> (Option<ProcessInfo>, Vec<(Option<ThreadState>, Option<usize>)>) {
    let threads = tids
        .iter()
        .map(|&t| (mgr.thread_state(P1, t), mgr.thread_waiters(P1, t)))
        .collect();
    (mgr.process_info(P1), threads)
}

#[test]
fn failed_join_and_detach_change_nothing() {
    let (mgr, _host, main) = attach(P1);
    let gate = Gate::new();

    // Joinable vivo com um joiner preso
    let held = mgr.create_thread(gated(&gate, 5)).unwrap();
    let j = mgr.create_thread(joiner(&mgr, held)).unwrap();
    wait_until(|| mgr.thread_waiters(P1, held) == Some(1));

    // Detached vivo
    let detached = mgr.create_thread(gated(&gate, 6)).unwrap();
    assert_eq!(mgr.thread_detach(detached), Ok(()));

    // Joinable terminado
    let done = mgr.create_thread(returning(4)).unwrap();
    wait_until(|| mgr.thread_state(P1, done) == Some(ThreadState::Exited));

    // Detached terminado e colhido
    let reaped = mgr.create_thread(self_detaching(&mgr, 7)).unwrap();
    wait_until(|| mgr.process_info(P1).map(|i| i.reaped_detached) == Some(1));

    let unknown = Tid::new(9999);
    let tids = [main, held, j, detached, done, reaped, unknown];
    let before = snapshot(&mgr, &tids);

    assert_eq!(mgr.thread_join(unknown), Err(ThreadError::UnknownTarget));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_join(detached), Err(ThreadError::NotJoinable));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_join(reaped), Err(ThreadError::NotJoinable));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_join(main), Err(ThreadError::InvalidSelfJoin));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_detach(unknown), Err(ThreadError::UnknownTarget));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_detach(done), Err(ThreadError::DetachIneligible));
    assert_eq!(snapshot(&mgr, &tids), before);
    assert_eq!(mgr.thread_detach(reaped), Err(ThreadError::DetachIneligible));
    assert_eq!(snapshot(&mgr, &tids), before);

    gate.open();
    assert_eq!(mgr.thread_join(j), Ok(5));
    assert_eq!(mgr.thread_join(done), Ok(4));
}

#[test]
fn detach_of_other_thread_needs_two_active_threads() {
    let (mgr, host, _main) = attach(P1);
    assert_eq!(
        mgr.thread_detach(Tid::new(9999)),
        Err(ThreadError::DetachIneligible)
    );

    let gate = Gate::new();
    let done = mgr.create_thread(returning(1)).unwrap();
    let held = mgr.create_thread(gated(&gate, 2)).unwrap();
    host.wait_parked(1);

    assert_eq!(mgr.thread_detach(Tid::new(9999)), Err(ThreadError::UnknownTarget));
    // Alvo já terminou
    assert_eq!(mgr.thread_detach(done), Err(ThreadError::DetachIneligible));
    assert_eq!(mgr.thread_join(done), Ok(1));

    gate.open();
    assert_eq!(mgr.thread_join(held), Ok(2));
    assert_eq!(mgr.process_info(P1).unwrap().active_threads, 1);
}

// =============================================================================
// EXIT / PROCESSO
// =============================================================================

#[test]
fn last_thread_exit_terminates_process() {
    let (mgr, host) = host::manager();
    host::spawn_process(&mgr, P1, |m| {
        let t = m.create_thread(returning(5)).unwrap();
        assert_eq!(m.thread_join(t), Ok(5));
        42
    });

    assert_eq!(host.wait_exit(P1), 42);
    assert!(mgr.process_info(P1).is_none());
}

#[test]
fn process_status_comes_from_last_exiting_thread() {
    let (mgr, host) = host::manager();
    let gate = Gate::new();
    let held = Arc::clone(&gate);
    host::spawn_process(&mgr, P1, move |m| {
        m.create_thread(gated(&held, 77)).unwrap();
        1
    });

    // Principal saiu primeiro e estacionou
    host.wait_parked(1);
    assert_eq!(host.exit_status(P1), None);
    assert_eq!(mgr.process_info(P1).unwrap().active_threads, 1);

    gate.open();
    assert_eq!(host.wait_exit(P1), 77);
}

#[test]
fn process_termination_discards_detached_records() {
    let (mgr, host) = host::manager();
    host::spawn_process(&mgr, P1, |m| {
        let gate = Gate::new();
        let t = m.create_thread(gated(&gate, 3)).unwrap();
        assert_eq!(m.thread_detach(t), Ok(()));
        gate.open();
        // Principal precisa ser a última a sair
        wait_until(|| m.thread_state(P1, t) == Some(ThreadState::Exited));
        0
    });

    assert_eq!(host.wait_exit(P1), 0);
    assert!(mgr.process_info(P1).is_none());
    assert!(mgr.thread_state(P1, Tid::new(3)).is_none());
}

#[test]
fn attach_twice_is_rejected() {
    let (mgr, host, _main) = attach(P1);
    let ctx = host.enter_new_context();
    assert_eq!(mgr.attach_process(P1, ctx), Err(ThreadError::ProcessExists));
    assert!(!mgr.release_process(P2));
}

// =============================================================================
// FALHAS DE ALOCAÇÃO
// =============================================================================

#[test]
fn spawn_failure_leaves_no_trace() {
    let (mgr, host, _main) = attach(P1);
    host.refuse_spawns(true);

    assert_eq!(
        mgr.create_thread(returning(0)),
        Err(ThreadError::AllocationFailure)
    );
    let info = mgr.process_info(P1).unwrap();
    assert_eq!(info.records, 1);
    assert_eq!(info.active_threads, 1);

    host.refuse_spawns(false);
    let t = mgr.create_thread(returning(6)).unwrap();
    assert_eq!(mgr.thread_join(t), Ok(6));
}

#[test]
fn thread_limit_is_allocation_failure() {
    let host = HostSubstrate::new();
    let config = ThreadConfig::new().with_max_threads(2);
    let mgr = Arc::new(ThreadManager::with_config(host.clone(), config));
    let ctx = host.enter_new_context();
    mgr.attach_process(P1, ctx).unwrap();

    let gate = Gate::new();
    let t = mgr.create_thread(gated(&gate, 0)).unwrap();
    assert_eq!(
        mgr.create_thread(returning(0)),
        Err(ThreadError::AllocationFailure)
    );

    gate.open();
    assert_eq!(mgr.thread_join(t), Ok(0));
    // Slot foi devolvido
    let t = mgr.create_thread(returning(8)).unwrap();
    assert_eq!(mgr.thread_join(t), Ok(8));
}

#[test]
fn tid_exhaustion_fails_instead_of_wrapping() {
    let host = HostSubstrate::new();
    let config = ThreadConfig::new().with_first_tid(u32::MAX - 1);
    let mgr = Arc::new(ThreadManager::with_config(host.clone(), config));
    let ctx = host.enter_new_context();
    let main = mgr.attach_process(P1, ctx).unwrap();
    assert_eq!(main, Tid::new(u32::MAX - 1));

    let last = mgr.create_thread(returning(0)).unwrap();
    assert_eq!(last, Tid::new(u32::MAX));
    assert_eq!(
        mgr.create_thread(returning(0)),
        Err(ThreadError::AllocationFailure)
    );
    assert_eq!(mgr.thread_join(last), Ok(0));
}

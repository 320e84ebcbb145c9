use disguise_core::{
    ActivationManager, ComponentState, IdentitySet, LauncherIdentity, MemoryComponentRegistry,
    SweepOrder,
};
use std::sync::{Arc, Barrier};
use std::thread;

const ROUNDS_PER_THREAD: usize = 25;

fn run_concurrent_sweeps(order: SweepOrder) {
    let set = IdentitySet::builtin().expect("builtin set");
    let registry = MemoryComponentRegistry::installed(&set);
    let manager = Arc::new(ActivationManager::new(set, registry).with_sweep_order(order));
    let barrier = Arc::new(Barrier::new(LauncherIdentity::ALL.len()));

    let handles = LauncherIdentity::ALL
        .into_iter()
        .map(|target| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS_PER_THREAD {
                    let outcome = manager
                        .activate(Some(target.id()))
                        .expect("activation succeeds");
                    assert_eq!(outcome.identity, target);
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let identities = manager.identities();
    let sweep_len = identities.len() + usize::from(order == SweepOrder::DisableAllThenEnable);
    let journal = manager.registry().journal();
    assert_eq!(
        journal.len(),
        sweep_len * LauncherIdentity::ALL.len() * ROUNDS_PER_THREAD
    );

    // Each sweep occupies one contiguous block with exactly one enable.
    let mut last_target = None;
    for sweep in journal.chunks(sweep_len) {
        let enables = sweep
            .iter()
            .filter(|command| command.state == ComponentState::Enabled)
            .collect::<Vec<_>>();
        assert_eq!(enables.len(), 1, "interleaved sweep: {sweep:?}");
        let target = &enables[0].component;
        let disabled = sweep
            .iter()
            .filter(|command| command.state == ComponentState::Disabled)
            .count();
        let expected_disabled = match order {
            SweepOrder::DisableAllThenEnable => identities.len(),
            SweepOrder::EnableThenDisableOthers => identities.len() - 1,
        };
        assert_eq!(disabled, expected_disabled);
        assert!(sweep
            .iter()
            .filter(|command| command.state == ComponentState::Disabled)
            .all(|command| order == SweepOrder::DisableAllThenEnable
                || command.component != *target));
        last_target = Some(target.clone());
    }

    let snapshot = manager.snapshot().expect("snapshot");
    let active = snapshot.active().expect("exactly one identity enabled");
    let active_component = &identities.get(active).expect("active entry").component;
    assert_eq!(Some(active_component), last_target.as_ref());
}

#[test]
fn concurrent_disable_all_sweeps_never_interleave() {
    run_concurrent_sweeps(SweepOrder::DisableAllThenEnable);
}

#[test]
fn concurrent_enable_first_sweeps_never_interleave() {
    run_concurrent_sweeps(SweepOrder::EnableThenDisableOthers);
}

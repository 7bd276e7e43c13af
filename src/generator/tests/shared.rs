use super::{SandIdGenerator, SharedGenerator, SEED};

/// Generates no duplicate IDs under multithreading
#[test]
fn generates_no_duplicate_ids_under_multithreading() {
    use std::{collections::HashSet, thread};

    let g = &SharedGenerator::new(SandIdGenerator::new(SEED));
    let per_thread: Vec<Vec<_>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || (0..10_000).map(|_| g.generate()).collect::<Vec<_>>()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for samples in &per_thread {
        for i in 1..samples.len() {
            assert!(samples[i - 1] < samples[i]);
        }
    }

    let s: HashSet<_> = per_thread.iter().flatten().collect();
    assert_eq!(s.len(), 4 * 10_000);
}

/// Hands back the inner generator state
#[test]
fn hands_back_the_inner_generator_state() {
    let g = SharedGenerator::from(SandIdGenerator::for_testing());
    let last = g.generate();

    let mut inner = g.into_inner();
    assert!(inner.generate() > last);
}

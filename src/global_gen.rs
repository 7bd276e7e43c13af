//! Process-wide default generator and entry point functions.

#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use crate::{InitError, SandId, SandIdGenerator};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Returns the lock handle of the process-wide global generator slot.
fn lock_global_gen() -> MutexGuard<'static, Option<GlobalGenInner>> {
    static G: Mutex<Option<GlobalGenInner>> = Mutex::new(None);
    // a failed initialization leaves the slot empty, so a poisoned lock is still consistent
    G.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initializes the process-wide global generator.
///
/// Call this function once at process startup, before any call to [`new()`] or
/// [`new_string()`], to surface a failure of the operating system's random number generator as an
/// error. Subsequent calls are no-ops. If this function is never called, the global generator is
/// initialized on first use and a failure aborts the calling thread with a panic.
///
/// # Errors
///
/// Returns an error if the operating system's random number generator is unavailable. The
/// process cannot safely generate identifiers in that case.
///
/// # Examples
///
/// ```rust
/// fn main() -> Result<(), sandid::InitError> {
///     sandid::init()?;
///     println!("{}", sandid::new());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<(), InitError> {
    let mut g = lock_global_gen();
    if g.is_none() {
        *g = Some(GlobalGenInner::try_new()?);
    }
    Ok(())
}

/// Generates a new SandID object using the global generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently without
/// breaking the monotonic order of generated IDs. On Unix, this function reseeds the generator
/// when the process ID changes (i.e., upon forks) to avoid collisions across processes.
///
/// # Panics
///
/// Panics if the global generator has not been initialized by [`init()`] and the initialization
/// on first use fails.
pub fn new() -> SandId {
    lock_global_gen()
        .get_or_insert_with(|| {
            GlobalGenInner::try_new().unwrap_or_else(|err| {
                panic!("sandid: could not initialize global generator: {}", err)
            })
        })
        .generate()
}

/// Generates a new SandID encoded in the 22-character canonical string representation using the
/// global generator.
///
/// Use this to quickly get a new SandID as a string.
///
/// # Panics
///
/// Panics under the same condition as [`new()`].
///
/// # Examples
///
/// ```rust
/// let x = sandid::new_string(); // e.g., "Ae-1zOA-YhYB2mvEXsvJ3g"
///
/// assert!(regex::Regex::new(r"^[A-Za-z0-9_-]{22}$").unwrap().is_match(&x));
/// ```
pub fn new_string() -> String {
    new().into()
}

/// A thin wrapper to reseed the generator when the process ID changes (i.e., upon Unix forks).
#[derive(Debug)]
struct GlobalGenInner {
    #[cfg(unix)]
    pid: u32,
    generator: SandIdGenerator,
}

impl GlobalGenInner {
    fn try_new() -> Result<Self, InitError> {
        let generator = SandIdGenerator::try_new()?;
        #[cfg(feature = "log")]
        log::debug!(
            "sandid: initialized global generator with node tag {:012x}",
            generator.seed().node()
        );
        Ok(Self {
            #[cfg(unix)]
            pid: std::process::id(),
            generator,
        })
    }

    fn generate(&mut self) -> SandId {
        #[cfg(unix)]
        if self.pid != std::process::id() {
            #[cfg(feature = "log")]
            log::warn!("sandid: process ID changed; reseeding global generator");
            *self = Self::try_new()
                .unwrap_or_else(|err| panic!("sandid: could not reseed global generator: {}", err));
        }
        self.generator.generate()
    }
}

#[cfg(test)]
mod tests {
    use super::{init, new, new_string};
    use crate::SandId;

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| new_string()).collect());

    /// Initializes idempotently
    #[test]
    fn initializes_idempotently() {
        init().unwrap();
        let x = new();
        init().unwrap();
        assert!(new() > x);
    }

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let re = regex::Regex::new(r"^[A-Za-z0-9_-]{21}[AQgw]$").unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Generates sortable binary representation by creation time
    #[test]
    fn generates_sortable_binary_representation_by_creation_time() {
        SAMPLES.with(|samples| {
            let ids: Vec<SandId> = samples.iter().map(|e| e.parse().unwrap()).collect();
            for i in 1..N_SAMPLES {
                assert!(ids[i - 1].as_bytes() < ids[i].as_bytes());
                assert!(!ids[i].is_zero());
            }
        });
    }

    /// Shares node tag and salt across identifiers
    #[test]
    fn shares_node_tag_and_salt_across_identifiers() {
        let first = new();
        for _ in 0..1_000 {
            let e = new();
            assert_eq!(e.node(), first.node());
            assert_eq!(e.salt(), first.salt());
        }
    }

    /// Generates no IDs sharing same timestamp and sequence under multithreading
    #[test]
    fn generates_no_ids_sharing_same_timestamp_and_sequence_under_multithreading(
    ) -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..10_000 {
                        tx.send(new()).unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert((e.timestamp(), e.sequence()));
        }

        assert_eq!(s.len(), 4 * 10_000);
        Ok(())
    }
}

//! SandID generator and related types.

#[cfg(not(feature = "std"))]
use core as std;

use crate::{SandId, Seed, MAX_TIMESTAMP};

/// A trait that defines the minimum system clock interface for [`SandIdGenerator`].
///
/// Any `FnMut() -> u64` closure implements this trait, which is convenient for injecting a fixed
/// or simulated clock.
pub trait TimeSource {
    /// Returns the current time as the number of 100-nanosecond ticks elapsed since the Gregorian
    /// epoch (1582-10-15T00:00:00Z).
    fn ticks(&mut self) -> u64;
}

impl<F: FnMut() -> u64> TimeSource for F {
    fn ticks(&mut self) -> u64 {
        self()
    }
}

/// The default [`TimeSource`] that reads the system real-time clock.
///
/// The time source implementation is only available with the `std` feature.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl TimeSource for StdSystemTime {
    fn ticks(&mut self) -> u64 {
        use crate::GREGORIAN_OFFSET;
        use std::time::{SystemTime, UNIX_EPOCH};

        let ticks = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => GREGORIAN_OFFSET + (elapsed.as_nanos() / 100) as u64,
            Err(err) => GREGORIAN_OFFSET.saturating_sub((err.duration().as_nanos() / 100) as u64),
        };
        ticks.min(MAX_TIMESTAMP)
    }
}

/// Represents a SandID generator that encapsulates the last timestamp and the sequence counter
/// and guarantees the monotonic order of identifiers it generates.
///
/// The generator holds no lock by itself and requires `&mut self` to generate an identifier.
/// Wrap it in a [`SharedGenerator`] to share one instance between threads, or use the
/// process-wide [`crate::new()`] function.
///
/// # Clock rollback and sequence overflow
///
/// The generator never goes back in time: if the time source returns a timestamp equal to or
/// smaller than the last one, the last timestamp is reused and the `sequence` counter is
/// incremented instead. Should the 16-bit counter wrap around to zero within such a
/// non-advancing timestamp, the timestamp is advanced by one tick ahead of the time source. As a
/// result, a generator keeps producing increasing identifiers no matter how far the clock moves
/// backwards, at the cost of drifting from the real-time clock until it catches up.
///
/// # Examples
///
/// ```rust
/// use sandid::{SandIdGenerator, Seed};
///
/// let mut ticks = 0x01f0_0000_0000_0000u64;
/// let mut g = SandIdGenerator::with_time_source(Seed::new(0x0123_4567_89ab, 0, 0), move || {
///     ticks -= 1; // clock going backwards
///     ticks
/// });
///
/// let x = g.generate();
/// let y = g.generate();
/// assert!(x < y);
/// assert_eq!(x.timestamp(), y.timestamp());
/// assert_eq!(y.sequence(), x.sequence() + 1);
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SandIdGenerator<T = StdSystemTime> {
    timestamp: u64,
    sequence: u16,
    seed: Seed,

    /// The system clock used by the generator.
    time_source: T,
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl SandIdGenerator {
    /// Creates a generator object with the default system clock.
    pub const fn new(seed: Seed) -> Self {
        Self::with_time_source(seed, StdSystemTime)
    }

    /// Creates a generator object seeded from the operating system's random number generator and
    /// the host's hardware address.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system's random number generator is unavailable.
    #[cfg(feature = "os_seed")]
    #[cfg_attr(docsrs, doc(cfg(feature = "os_seed")))]
    pub fn try_new() -> Result<Self, crate::InitError> {
        Seed::try_from_os().map(Self::new)
    }
}

impl<T> SandIdGenerator<T> {
    /// Creates a generator object with a specified time source.
    pub const fn with_time_source(seed: Seed, time_source: T) -> Self {
        Self {
            timestamp: 0,
            sequence: seed.sequence(),
            seed,
            time_source,
        }
    }

    /// Returns the seed this generator was created with.
    pub const fn seed(&self) -> Seed {
        self.seed
    }
}

impl<T: TimeSource> SandIdGenerator<T> {
    /// Generates a new SandID object from the current timestamp.
    ///
    /// See the [`SandIdGenerator`] type documentation for the description.
    pub fn generate(&mut self) -> SandId {
        let timestamp = self.time_source.ticks();
        self.generate_core(timestamp)
    }

    /// Generates a new SandID object from the `timestamp` passed.
    ///
    /// See the [`SandIdGenerator`] type documentation for the description.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is not a 60-bit unsigned integer.
    pub fn generate_core(&mut self, timestamp: u64) -> SandId {
        assert!(
            timestamp <= MAX_TIMESTAMP,
            "`timestamp` must be a 60-bit unsigned integer"
        );

        if timestamp > self.timestamp {
            self.timestamp = timestamp;
        } else {
            self.sequence = self.sequence.wrapping_add(1);
            if self.sequence == 0 {
                if self.timestamp < MAX_TIMESTAMP {
                    // move ahead of the clock at sequence overflow
                    self.timestamp += 1;
                } else {
                    #[cfg(feature = "log")]
                    log::warn!("sandid: sequence wrapped around at the maximum timestamp");
                }
            }
        }

        SandId::from_fields(
            self.timestamp,
            self.seed.salt(),
            self.sequence,
            self.seed.node(),
        )
    }
}

/// Supports operations as an infinite iterator that produces a new SandID object for each call
/// of `next()`.
///
/// # Examples
///
/// ```rust
/// use sandid::{SandIdGenerator, Seed};
///
/// SandIdGenerator::new(Seed::new(0x0123_4567_89ab, 0, 0))
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<T: TimeSource> Iterator for SandIdGenerator<T> {
    type Item = SandId;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: TimeSource> std::iter::FusedIterator for SandIdGenerator<T> {}

#[cfg(feature = "std")]
pub use shared::SharedGenerator;

#[cfg(feature = "std")]
mod shared {
    use super::{SandIdGenerator, StdSystemTime, TimeSource};
    use crate::SandId;
    use std::sync::{Mutex, PoisonError};

    /// A [`SandIdGenerator`] guarded by a lock so that it can be shared by reference among
    /// threads.
    ///
    /// The read of the time source, the update of the last timestamp and sequence counter, and
    /// the packing of the result happen in one critical section.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::{SandIdGenerator, Seed, SharedGenerator};
    /// use std::thread;
    ///
    /// let g = SharedGenerator::new(SandIdGenerator::new(Seed::new(0x0123_4567_89ab, 0, 0)));
    /// thread::scope(|s| {
    ///     for i in 0..4 {
    ///         let g = &g;
    ///         s.spawn(move || {
    ///             for _ in 0..8 {
    ///                 println!("{} by thread {}", g.generate(), i);
    ///             }
    ///         });
    ///     }
    /// });
    /// ```
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    #[derive(Debug)]
    pub struct SharedGenerator<T = StdSystemTime> {
        inner: Mutex<SandIdGenerator<T>>,
    }

    impl<T> SharedGenerator<T> {
        /// Wraps a generator object.
        pub const fn new(generator: SandIdGenerator<T>) -> Self {
            Self {
                inner: Mutex::new(generator),
            }
        }

        /// Consumes the wrapper and returns the inner generator object.
        pub fn into_inner(self) -> SandIdGenerator<T> {
            self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<T: TimeSource> SharedGenerator<T> {
        /// Generates a new SandID object from the current timestamp.
        pub fn generate(&self) -> SandId {
            // a panic inside the critical section happens before any state is modified
            self.inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .generate()
        }
    }

    impl<T> From<SandIdGenerator<T>> for SharedGenerator<T> {
        fn from(generator: SandIdGenerator<T>) -> Self {
            Self::new(generator)
        }
    }
}

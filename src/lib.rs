//! SandID: sortable, time-ordered 128-bit unique identifiers
//!
//! ```rust
//! # #[cfg(feature = "global_gen")]
//! # {
//! // generate a new identifier object
//! let x = sandid::new();
//! println!("{}", x); // e.g., "Ae-1zOA-YhYB2mvEXsvJ3g"
//! println!("{:?}", x.as_bytes()); // as 16-byte big-endian array
//!
//! // generate a textual representation directly
//! println!("{}", sandid::new_string()); // e.g., "Ae-1zOA-YhYVUnm8zzUcZw"
//! # }
//! ```
//!
//! SandID is a 128-bit identifier that has the following features:
//!
//! - 22-character compact textual representation over the URL-safe base64 alphabet
//! - Sortable by generation time within a process (as a 16-byte big-endian array)
//! - Unique across processes thanks to a per-host node tag
//! - All-zero value reserved as the "absent" sentinel
//!
//! # Field and bit layout
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     timestamp                         |  salt |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            sequence           |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             node                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! - The 60-bit `timestamp` counts 100-nanosecond ticks since the Gregorian epoch
//!   (1582-10-15T00:00:00Z).
//! - The 4-bit `salt` is a random nibble fixed for the lifetime of a generator.
//! - The 16-bit `sequence` is incremented whenever the clock does not move forward between two
//!   generations. When it wraps around within a single tick, the generator advances the
//!   `timestamp` by one tick, so the `timestamp` may run slightly ahead of the real-time clock.
//! - The 48-bit `node` holds a hardware network address of the host if one is found, or a random
//!   number with the multicast bit (`0x01` of the first octet) set otherwise.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `std` enables, among others, the default timestamp source for [`SandIdGenerator`] using
//!   [`std::time`].
//! - `global_gen` (implies `std` and `os_seed`) provides the process-wide default generator and
//!   enables the [`new()`] and [`new_string()`] functions.
//! - `log` emits diagnostic records through the [`log`](https://docs.rs/log) facade.
//!
//! Optional features:
//!
//! - `os_seed` (implies `std`) enables [`Seed::try_from_os()`], which reads the operating system's
//!   random number generator and the host's hardware address.
//! - `serde` enables serialization/deserialization of [`SandId`] via serde.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{compare, equal, ParseError, SandId};

pub mod generator;
pub use generator::{SandIdGenerator, StdSystemTime, TimeSource};

#[cfg(feature = "std")]
pub use generator::SharedGenerator;

mod seed;
pub use seed::{InitError, Seed};

pub mod sql;
pub use sql::{NullSandId, ScanError, SqlValue};

#[cfg(feature = "global_gen")]
mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{init, new, new_string};

/// The maximum value of the 60-bit `timestamp` field.
pub const MAX_TIMESTAMP: u64 = (1 << 60) - 1;

/// The maximum value of the 4-bit `salt` field.
pub const MAX_SALT: u8 = 0xf;

/// The maximum value of the 16-bit `sequence` field.
pub const MAX_SEQUENCE: u16 = u16::MAX;

/// The maximum value of the 48-bit `node` field.
pub const MAX_NODE: u64 = (1 << 48) - 1;

/// The number of 100-nanosecond ticks between the Gregorian epoch and the Unix epoch.
pub const GREGORIAN_OFFSET: u64 = 122_192_928_000_000_000;

/// The length of the binary representation in bytes.
pub const BINARY_LEN: usize = 16;

/// The length of the textual representation in characters.
pub const TEXT_LEN: usize = 22;

#[cfg(not(feature = "std"))]
use core as std;

use crate::{MAX_NODE, MAX_SALT};
use rand::TryRngCore;
use std::fmt;

/// The multicast bit of the first octet, set on random node tags so that they never collide with
/// a globally assigned hardware address.
const NODE_MARKER: u64 = 0x01 << 40;

/// Process-wide constants that a [`SandIdGenerator`](crate::SandIdGenerator) is initialized with.
///
/// A seed fixes the 48-bit `node` tag and the 4-bit `salt` embedded in every identifier, and
/// provides the initial value of the 16-bit `sequence` counter.
///
/// # Examples
///
/// ```rust
/// use sandid::{SandIdGenerator, Seed};
///
/// let seed = Seed::new(0x0123_4567_89ab, 0x5, 0x0042);
/// let mut g = SandIdGenerator::with_time_source(seed, || 0x0f00_0000_0000_0001);
///
/// let x = g.generate();
/// assert_eq!(x.node(), 0x0123_4567_89ab);
/// assert_eq!(x.salt(), 0x5);
/// assert_eq!(x.sequence(), 0x0042);
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Seed {
    node: u64,
    salt: u8,
    sequence: u16,
}

impl Seed {
    /// Creates a seed from explicit values.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a 48-bit or `salt` is not a 4-bit unsigned integer.
    pub const fn new(node: u64, salt: u8, sequence: u16) -> Self {
        if node > MAX_NODE || salt > MAX_SALT {
            panic!("invalid seed value");
        }
        Self {
            node,
            salt,
            sequence,
        }
    }

    /// Creates a seed from a random number generator.
    ///
    /// The node tag is filled with random bits and marked with the multicast bit. The random
    /// number generator should be cryptographically strong and securely seeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the random number generator fails to provide bytes.
    pub fn try_from_rng<R: TryRngCore + ?Sized>(rng: &mut R) -> Result<Self, InitError> {
        let mut bytes = [0u8; 9];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|err| InitError::from_display(&err))?;

        let mut node = 0u64;
        for e in &bytes[3..] {
            node = (node << 8) | *e as u64;
        }

        Ok(Self {
            node: node | NODE_MARKER,
            salt: bytes[0] & MAX_SALT,
            sequence: u16::from_be_bytes([bytes[1], bytes[2]]),
        })
    }

    /// Returns the 48-bit `node` tag.
    pub const fn node(&self) -> u64 {
        self.node
    }

    /// Returns the 4-bit `salt`.
    pub const fn salt(&self) -> u8 {
        self.salt
    }

    /// Returns the initial 16-bit `sequence` counter value.
    pub const fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Returns a copy of this seed whose node tag is replaced with a 6-octet hardware address.
    pub const fn with_hardware_address(self, octets: [u8; 6]) -> Self {
        let mut node = 0u64;
        let mut i = 0;
        while i < octets.len() {
            node = (node << 8) | octets[i] as u64;
            i += 1;
        }
        Self { node, ..self }
    }
}

#[cfg(feature = "os_seed")]
mod with_os {
    use super::{InitError, Seed};
    use rand::rngs::OsRng;

    impl Seed {
        /// Creates a seed from the operating system's random number generator and the host's
        /// hardware network address.
        ///
        /// The first hardware address found is used verbatim as the node tag. If none is
        /// available, the node tag is a marked random number as in [`Seed::try_from_rng`].
        ///
        /// # Errors
        ///
        /// Returns an error if the operating system's random number generator is unavailable.
        /// Failing to read a hardware address is not an error.
        #[cfg_attr(docsrs, doc(cfg(feature = "os_seed")))]
        pub fn try_from_os() -> Result<Self, InitError> {
            let seed = Self::try_from_rng(&mut OsRng)?;
            match mac_address::get_mac_address() {
                Ok(Some(addr)) => {
                    #[cfg(feature = "log")]
                    log::debug!("sandid: using hardware address {} as node tag", addr);
                    Ok(seed.with_hardware_address(addr.bytes()))
                }
                Ok(None) => {
                    #[cfg(feature = "log")]
                    log::debug!("sandid: no hardware address found; using random node tag");
                    Ok(seed)
                }
                Err(_err) => {
                    #[cfg(feature = "log")]
                    log::debug!("sandid: could not read hardware address: {}", _err);
                    Ok(seed)
                }
            }
        }
    }
}

/// An error initializing a [`Seed`] because the random number generator failed.
///
/// The process cannot safely produce identifiers without a seed, so callers should treat this as
/// fatal at startup.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct InitError {
    #[cfg(feature = "std")]
    reason: String,
}

impl InitError {
    #[cfg(feature = "std")]
    fn from_display(err: &impl fmt::Display) -> Self {
        Self {
            reason: err.to_string(),
        }
    }

    #[cfg(not(feature = "std"))]
    fn from_display(_err: &impl fmt::Display) -> Self {
        Self {}
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not initialize SandID seed: random source failed")?;
        #[cfg(feature = "std")]
        write!(f, ": {}", self.reason)?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InitError {}

#[cfg(test)]
mod tests {
    use super::{InitError, Seed, NODE_MARKER};
    use crate::MAX_NODE;
    use rand::{rngs::StdRng, SeedableRng as _, TryRngCore};

    struct FailingRng;

    impl TryRngCore for FailingRng {
        type Error = core::fmt::Error;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Err(core::fmt::Error)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Err(core::fmt::Error)
        }

        fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> Result<(), Self::Error> {
            Err(core::fmt::Error)
        }
    }

    /// Sets the marker bit on random node tags
    #[test]
    fn sets_the_marker_bit_on_random_node_tags() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let seed = Seed::try_from_rng(&mut rng).unwrap();
            assert_ne!(seed.node() & NODE_MARKER, 0);
            assert!(seed.node() <= MAX_NODE);
            assert!(seed.salt() <= 0xf);
        }
    }

    /// Draws different values from different random states
    #[test]
    fn draws_different_values_from_different_random_states() {
        let a = Seed::try_from_rng(&mut StdRng::seed_from_u64(1)).unwrap();
        let b = Seed::try_from_rng(&mut StdRng::seed_from_u64(2)).unwrap();
        assert_ne!(a, b);
    }

    /// Returns error if the random source fails
    #[test]
    fn returns_error_if_the_random_source_fails() {
        let result = Seed::try_from_rng(&mut FailingRng);
        assert!(result.is_err());
        let err: InitError = result.unwrap_err();
        assert!(err.to_string().starts_with("could not initialize SandID seed"));
    }

    /// Uses hardware address octets verbatim
    #[test]
    fn uses_hardware_address_octets_verbatim() {
        let seed = Seed::new(0xffff_ffff_ffff, 0x3, 0x1234)
            .with_hardware_address([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
        assert_eq!(seed.node(), 0x001b_6384_45e6);
        assert_eq!(seed.salt(), 0x3);
        assert_eq!(seed.sequence(), 0x1234);
    }

    /// Rejects out-of-range values
    #[test]
    #[should_panic(expected = "invalid seed value")]
    fn rejects_out_of_range_values() {
        Seed::new(MAX_NODE + 1, 0, 0);
    }

    /// Initializes from the operating system
    #[cfg(feature = "os_seed")]
    #[test]
    fn initializes_from_the_operating_system() {
        let seed = Seed::try_from_os().unwrap();
        assert!(seed.node() <= MAX_NODE);
        assert!(seed.salt() <= 0xf);
    }
}

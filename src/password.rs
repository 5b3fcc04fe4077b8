use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use std::sync::{Mutex, PoisonError};

use crate::util::Sensitive;

/// Characters passwords and reset codes are drawn from. Look-alike
/// characters (`I`, `O`, `l`, `o`, `0`, `1`) are left out.
pub const PASSWORD_CHARS: &str = "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

const SEED_LENGTH: usize = 32;
const SEED_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates short passwords and reset codes.
///
/// Salted output is HMAC-SHA256 keyed by a secret seed that is
/// derived on first use and cached until [`clear_seed`] is called,
/// so the same length and salt keep yielding the same string for
/// as long as the seed lives.
///
/// [`clear_seed`]: PasswordGenerator::clear_seed
#[derive(Default)]
pub struct PasswordGenerator {
    seed: Mutex<Option<Sensitive<String>>>,
}

impl PasswordGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known seed instead of a random one.
    #[must_use]
    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: Mutex::new(Some(Sensitive::new(seed.into()))),
        }
    }

    /// Returns a string of exactly `length` characters drawn from
    /// [`PASSWORD_CHARS`], random when `salt` is absent.
    #[must_use]
    pub fn generate(&self, length: usize, salt: Option<&str>) -> Sensitive<String> {
        match salt {
            Some(salt) => self.derive(length, salt),
            None => Sensitive::new(random_string::generate(length, PASSWORD_CHARS)),
        }
    }

    /// The cached seed, `None` until a salted string was generated.
    #[must_use]
    pub fn cached_seed(&self) -> Option<Sensitive<String>> {
        self.seed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets the cached seed. Salted output generated afterwards
    /// differs from the output generated before.
    pub fn clear_seed(&self) {
        *self.seed.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn seed(&self) -> Sensitive<String> {
        self.seed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(|| {
                tracing::debug!("deriving password generator seed");
                Sensitive::new(random_string::generate(SEED_LENGTH, SEED_CHARS))
            })
            .clone()
    }

    fn derive(&self, length: usize, salt: &str) -> Sensitive<String> {
        let alphabet = PASSWORD_CHARS.as_bytes();
        // largest multiple of the alphabet size that fits in a byte,
        // bytes above it are skipped to keep the mapping unbiased
        let zone = 256 - (256 % alphabet.len());

        // a SHA-512 digest is exactly one SHA-256 block, the key size
        // the infallible constructor takes
        let key = Sha512::digest(self.seed().as_str().as_bytes());
        let mut output = String::with_capacity(length);
        let mut block: u64 = 0;

        while output.len() < length {
            let mut mac = <Hmac<Sha256> as Mac>::new(&key);
            mac.update(&(length as u64).to_be_bytes());
            mac.update(&block.to_be_bytes());
            mac.update(salt.as_bytes());

            for byte in mac.finalize().into_bytes() {
                if output.len() == length {
                    break;
                }
                if usize::from(byte) < zone {
                    output.push(char::from(alphabet[usize::from(byte) % alphabet.len()]));
                }
            }
            block += 1;
        }

        Sensitive::new(output)
    }
}

impl std::fmt::Debug for PasswordGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGenerator")
            .field("seeded", &self.cached_seed().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_from_alphabet(value: &str) -> bool {
        value.chars().all(|c| PASSWORD_CHARS.contains(c))
    }

    #[test]
    fn random_passwords() {
        let generator = PasswordGenerator::new();
        let password = generator.generate(6, None);
        assert_eq!(password.len(), 6);
        assert!(is_from_alphabet(password.as_str()));

        // unsalted output never touches the seed
        assert!(generator.cached_seed().is_none());
    }

    #[test]
    fn deterministic_passwords() {
        let generator = PasswordGenerator::new();
        let password = generator.generate(6, Some("foo"));
        assert_eq!(password.len(), 6);
        assert!(is_from_alphabet(password.as_str()));

        assert_eq!(password, generator.generate(6, Some("foo")));
        assert_eq!(password, generator.generate(6, Some("foo")));

        assert_ne!(password, generator.generate(7, Some("foo")));
        assert_ne!(password, generator.generate(6, Some("foox")));
        assert_ne!(password, generator.generate(6, Some("bar")));
    }

    #[test]
    fn longer_output_is_not_a_prefix_extension() {
        let generator = PasswordGenerator::with_seed("fixed");
        let short = generator.generate(6, Some("foo"));
        let long = generator.generate(7, Some("foo"));
        assert_ne!(&long.as_str()[..6], short.as_str());
    }

    #[test]
    fn long_output_spans_several_blocks() {
        let generator = PasswordGenerator::with_seed("fixed");
        let code = generator.generate(100, Some("foo"));
        assert_eq!(code.len(), 100);
        assert!(is_from_alphabet(code.as_str()));
    }

    #[test]
    fn seeds_are_cached_and_cleared() {
        let generator = PasswordGenerator::new();
        assert!(generator.cached_seed().is_none());

        let before = generator.generate(6, Some("foo"));
        let seed = generator.cached_seed();
        assert!(seed.is_some());
        assert_eq!(seed, generator.cached_seed());

        generator.clear_seed();
        assert!(generator.cached_seed().is_none());

        // a fresh seed gives different salted output
        assert_ne!(before, generator.generate(6, Some("foo")));
        assert!(generator.cached_seed().is_some());
    }

    #[test]
    fn same_seed_same_output() {
        let a = PasswordGenerator::with_seed("shared");
        let b = PasswordGenerator::with_seed("shared");
        assert_eq!(a.generate(20, Some("member")), b.generate(20, Some("member")));
        assert!(format!("{a:?}").contains("seeded: true"));
    }
}

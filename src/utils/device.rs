//! Device id generation
//!
//! Some session backends fingerprint the requesting device. They receive a
//! fresh random id per request; ids are never persisted.

use rand::{Rng, distributions::Alphanumeric};

/// Length of a generated device id
pub const DEVICE_ID_LEN: usize = 32;

/// Generate a device id from the thread-local RNG
pub fn generate_device_id() -> String {
    generate_device_id_with(&mut rand::thread_rng())
}

/// Generate a device id of [`DEVICE_ID_LEN`] characters drawn uniformly from
/// `[A-Za-z0-9]`
pub fn generate_device_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..DEVICE_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_device_id_shape() {
        let id = generate_device_id();
        assert_eq!(id.len(), DEVICE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_device_ids_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = generate_device_id_with(&mut rng);
        let second = generate_device_id_with(&mut rng);
        assert_ne!(first, second);
    }
}

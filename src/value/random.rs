//! Shared, reseedable random source for structure templates.
//!
//! A structure template owns exactly one [`RandomSource`]. Every random
//! expression node and random material picker inside it holds a weak
//! [`RandomHandle`] to that source, so reseeding the template replays the
//! whole structure as long as the instruction order is unchanged.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Owning side of the shared generator.
pub struct RandomSource {
    rng: Rc<RefCell<ChaCha8Rng>>,
    seed: u64,
}

impl RandomSource {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rc::new(RefCell::new(ChaCha8Rng::seed_from_u64(seed))),
            seed,
        }
    }

    /// Reset the generator state in place. Existing handles stay valid.
    pub fn reseed(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha8Rng::seed_from_u64(seed);
        self.seed = seed;
    }

    /// Seed the generator was last (re)seeded with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Non-owning handle for nodes that sample from this source.
    pub fn handle(&self) -> RandomHandle {
        RandomHandle {
            rng: Some(Rc::downgrade(&self.rng)),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSource").field("seed", &self.seed).finish()
    }
}

/// Weak reference to a [`RandomSource`]. Unset until a source is wired in.
#[derive(Clone, Default)]
pub struct RandomHandle {
    rng: Option<Weak<RefCell<ChaCha8Rng>>>,
}

impl RandomHandle {
    /// True if the handle points at a live source.
    pub fn is_set(&self) -> bool {
        self.rng.as_ref().is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Run `f` against the generator. `None` if no live source is attached.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> Option<T> {
        let rng = self.rng.as_ref()?.upgrade()?;
        let mut rng = rng.borrow_mut();
        Some(f(&mut rng))
    }

    /// Uniform double in `[min, max)`. `min == max` returns `min` without sampling.
    pub fn uniform(&self, min: f64, max: f64) -> Option<f64> {
        if min == max {
            return Some(min);
        }
        self.with_rng(|rng| rng.gen_range(min..max))
    }

    /// Uniform integer in `[min, max]`.
    pub fn int_inclusive(&self, min: i64, max: i64) -> Option<i64> {
        self.with_rng(|rng| rng.gen_range(min..=max))
    }

    /// Integer roll in `[0, 100)`, compared against percent odds.
    pub fn percent(&self) -> Option<u8> {
        self.with_rng(|rng| rng.gen_range(0..100u8))
    }
}

impl fmt::Debug for RandomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomHandle").field("set", &self.is_set()).finish()
    }
}

/// Implemented by everything that samples from a shared random source.
///
/// Containers forward the source to their children; leaves store a handle.
pub trait RandomAware {
    /// Attach `source` to this node and every random node below it.
    fn set_random_source(&mut self, source: &RandomSource);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_handle_yields_none() {
        let handle = RandomHandle::default();
        assert!(!handle.is_set());
        assert_eq!(handle.uniform(0.0, 1.0), None);
        assert_eq!(handle.percent(), None);
    }

    #[test]
    fn test_reseed_replays_sequence() {
        let mut source = RandomSource::new(7);
        let handle = source.handle();
        let first: Vec<i64> = (0..16).filter_map(|_| handle.int_inclusive(0, 1000)).collect();

        source.reseed(7);
        let second: Vec<i64> = (0..16).filter_map(|_| handle.int_inclusive(0, 1000)).collect();

        assert_eq!(first.len(), 16);
        assert_eq!(first, second);
    }

    #[test]
    fn test_handle_dies_with_source() {
        let source = RandomSource::new(1);
        let handle = source.handle();
        assert!(handle.is_set());
        drop(source);
        assert!(!handle.is_set());
        assert_eq!(handle.int_inclusive(0, 3), None);
    }

    #[test]
    fn test_uniform_degenerate_range() {
        let source = RandomSource::new(3);
        let handle = source.handle();
        assert_eq!(handle.uniform(2.5, 2.5), Some(2.5));
    }

    #[test]
    fn test_uniform_in_range() {
        let source = RandomSource::new(99);
        let handle = source.handle();
        for _ in 0..200 {
            let v = handle.uniform(-3.0, 4.0).unwrap();
            assert!((-3.0..4.0).contains(&v));
        }
    }
}

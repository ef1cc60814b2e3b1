//! Spaces used to declare market actions and observations.

pub mod space;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

pub use space::Space;

/// A discrete space of integers in [0, n).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Discrete {
    n: u32,
}

impl Discrete {
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "Discrete space requires n > 0");
        Self { n }
    }

    pub fn n(&self) -> u32 { self.n }
}

impl Space for Discrete {
    type Element = u32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        if self.n == 1 { return 0; }
        let dist = Uniform::from(0..self.n);
        dist.sample(rng)
    }

    fn contains(&self, elem: &Self::Element) -> bool { *elem < self.n }
}

/// A tuple of discrete spaces with per-dimension sizes nvec[i] (values in [0, nvec[i])).
/// Circular markets price (refurbished, new[, rebuy]) through one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiDiscrete {
    nvec: Vec<u32>,
}

impl MultiDiscrete {
    pub fn new<I: Into<Vec<u32>>>(nvec: I) -> Self {
        let nvec = nvec.into();
        assert!(!nvec.is_empty(), "MultiDiscrete requires at least one dimension");
        for (i, &n) in nvec.iter().enumerate() {
            assert!(n > 0, "MultiDiscrete nvec[{i}] must be > 0");
        }
        Self { nvec }
    }

    pub fn nvec(&self) -> &[u32] { &self.nvec }
    pub fn ndim(&self) -> usize { self.nvec.len() }

    /// Number of distinct elements, i.e. the product of all dimension sizes.
    pub fn cardinality(&self) -> u64 {
        self.nvec.iter().map(|&n| n as u64).product()
    }
}

impl Space for MultiDiscrete {
    type Element = Vec<u32>;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        self.nvec
            .iter()
            .map(|&n| if n == 1 { 0 } else { Uniform::from(0..n).sample(rng) })
            .collect()
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        if elem.len() != self.nvec.len() { return false; }
        elem.iter().zip(self.nvec.iter()).all(|(&v, &n)| v < n)
    }
}

/// A box of `f32` values with per-dimension inclusive bounds.
/// The length is only known at runtime because it grows with the number of vendors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpace {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert_eq!(low.len(), high.len(), "low and high must have the same length");
        for i in 0..low.len() {
            assert!(low[i] <= high[i], "low[{i}] > high[{i}]");
        }
        Self { low, high }
    }

    /// A box of `len` dimensions sharing the same bounds.
    pub fn uniform(len: usize, low: f32, high: f32) -> Self {
        Self::new(vec![low; len], vec![high; len])
    }

    pub fn low(&self) -> &[f32] { &self.low }
    pub fn high(&self) -> &[f32] { &self.high }

    /// Number of dimensions.
    pub fn shape(&self) -> usize { self.low.len() }

    /// Clamp every component into the box. Lengths must already match.
    pub fn clip(&self, elem: &[f32]) -> Vec<f32> {
        elem.iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
            .collect()
    }

    pub fn contains_slice(&self, elem: &[f32]) -> bool {
        elem.len() == self.low.len()
            && (0..elem.len()).all(|i| self.low[i] <= elem[i] && elem[i] <= self.high[i])
    }
}

impl Space for BoxSpace {
    type Element = Vec<f32>;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        // Sample each dimension independently from Uniform[low, high]
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(&lo, &hi)| Uniform::new_inclusive(lo, hi).sample(rng))
            .collect()
    }

    fn contains(&self, elem: &Self::Element) -> bool { self.contains_slice(elem) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn discrete_and_multi_discrete_contain_their_samples() {
        let mut rng = StdRng::seed_from_u64(42);
        let d = Discrete::new(10);
        let md = MultiDiscrete::new(vec![10, 10, 10]);
        for _ in 0..100 {
            assert!(d.contains(&d.sample(&mut rng)));
            assert!(md.contains(&md.sample(&mut rng)));
        }
        assert!(!d.contains(&10));
        assert!(!md.contains(&vec![0, 10, 0]));
        assert!(!md.contains(&vec![0, 0]));
        assert_eq!(md.cardinality(), 1000);
    }

    #[test]
    fn box_space_bounds_and_clip() {
        let mut rng = StdRng::seed_from_u64(7);
        let b = BoxSpace::uniform(3, 0.0, 10.0);
        for _ in 0..100 {
            assert!(b.contains(&b.sample(&mut rng)));
        }
        assert!(!b.contains(&vec![0.0, 11.0, 0.0]));
        assert!(!b.contains(&vec![0.0, f32::NAN, 0.0]));
        assert!(!b.contains(&vec![0.0, 1.0]));
        assert_eq!(b.clip(&[-1.0, 5.0, 12.5]), vec![0.0, 5.0, 10.0]);
        assert_eq!(b.shape(), 3);
    }

    #[test]
    #[should_panic]
    fn box_space_rejects_inverted_bounds() {
        let _ = BoxSpace::new(vec![1.0], vec![0.0]);
    }
}

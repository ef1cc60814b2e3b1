pub mod rng;
pub mod stats;

pub use rng::{RngStream, SeedSequence, rng_from_entropy, rng_from_seed, split_n};
pub use stats::{multinomial, softmax, SOFTMAX_CLAMP};

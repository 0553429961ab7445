use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;

/// Source of fresh identifiers for hoisted lambdas.
pub trait IdentGenerator {
	/// Produce a new identifier starting with `prefix`.
	fn generate(&mut self, prefix: &str) -> String;

	/// Mark an identifier as already in use so it is never generated.
	fn reserve(&mut self, _ident: &str) {}
}

/// Random `<prefix>_<8 hex chars>` identifiers, unique within one generator.
#[derive(Debug)]
pub struct RandomIdents {
	rng: StdRng,
	taken: HashSet<String>,
}

impl RandomIdents {
	/// Seeded from OS entropy.
	pub fn new() -> Self {
		Self::from_rng(StdRng::from_entropy())
	}

	/// Deterministic sequence for reproducible output.
	pub fn with_seed(seed: u64) -> Self {
		Self::from_rng(StdRng::seed_from_u64(seed))
	}

	fn from_rng(rng: StdRng) -> Self {
		RandomIdents {
			rng,
			taken: HashSet::new(),
		}
	}
}

impl Default for RandomIdents {
	fn default() -> Self {
		Self::new()
	}
}

impl IdentGenerator for RandomIdents {
	fn generate(&mut self, prefix: &str) -> String {
		loop {
			let candidate = format!("{}_{:08x}", prefix, self.rng.next_u32());
			if self.taken.insert(candidate.clone()) {
				return candidate;
			}
		}
	}

	fn reserve(&mut self, ident: &str) {
		self.taken.insert(ident.to_string());
	}
}

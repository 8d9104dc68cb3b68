/// Park–Miller minimal standard generator. Deterministic so that generated
/// files are identical across runs.
#[derive(Clone, Debug)]
pub struct ParkMiller {
    seed: u64,
}

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

impl ParkMiller {
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(seed: u64) -> Self {
        let seed = seed % MODULUS;
        Self {
            seed: if seed == 0 { 1 } else { seed },
        }
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.seed = self.seed * MULTIPLIER % MODULUS;
        (self.seed - 1) as f64 / (MODULUS - 1) as f64
    }
}

impl Default for ParkMiller {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        let mut rng = ParkMiller::default();
        // 42 * 16807 = 705894
        assert_eq!(rng.next_f64(), 705_893.0 / 2_147_483_646.0);
        let mut again = ParkMiller::default();
        again.next_f64();
        assert_eq!(rng.next_f64(), again.next_f64());
    }

    #[test]
    fn test_range() {
        let mut rng = ParkMiller::new(7);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }
}

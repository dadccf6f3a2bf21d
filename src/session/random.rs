use rand::Rng;

/// Source of uniform random values for board generation and maturation.
///
/// Every `rand::Rng` is a source, so drivers normally pass a seeded
/// `ChaCha8Rng`. Tests can script exact draws by implementing the trait
/// on their own type.
pub trait UniformSource {
    /// A uniform integer in `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: usize) -> usize;

    /// A uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn below(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

use rand::Rng;

/// Produces randomized completion times, one per car.
///
/// Times are drawn independently from `[min_secs, max_secs]` and rounded
/// to two decimals, so that equal times compare equal.
#[derive(Clone, Copy, Debug)]
pub struct DurationGenerator {
    min_secs: f64,
    max_secs: f64,
}

impl DurationGenerator {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        debug_assert!(min_secs > 0.0 && min_secs <= max_secs);
        DurationGenerator { min_secs, max_secs }
    }

    pub fn generate(&self, roster_size: usize) -> Vec<f64> {
        self.generate_with(&mut rand::thread_rng(), roster_size)
    }

    pub fn generate_with<R>(&self, rng: &mut R, roster_size: usize) -> Vec<f64>
    where
        R: Rng,
    {
        (0..roster_size)
            .map(|_| round_centis(rng.gen_range(self.min_secs..=self.max_secs)))
            .collect()
    }
}

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

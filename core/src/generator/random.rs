use super::*;

/// Purely random placement: one independent Bernoulli trial per cell at the
/// configured probability, drawn from a seeded generator so the same seed and
/// config always reproduce the same layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BernoulliLayoutGenerator {
    seed: u64,
}

impl BernoulliLayoutGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for BernoulliLayoutGenerator {
    fn generate(self, config: BoardConfig) -> BombLayout {
        use rand::prelude::*;

        let probability = config.bomb_probability;
        let probability = if (0.0..=1.0).contains(&probability) {
            probability
        } else {
            log::warn!("Bomb probability {probability} out of range, generated anyway with clamp");
            if probability > 1.0 { 1.0 } else { 0.0 }
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut bomb_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        {
            let cells = bomb_mask.as_slice_mut().expect("layout should be standard");
            for cell in cells {
                *cell = rng.random_bool(probability);
            }
        }

        let layout = BombLayout::from_bomb_mask(bomb_mask);
        log::debug!(
            "Generated {}x{} layout, {} bombs at density {}",
            config.width,
            config.height,
            layout.bomb_count(),
            probability
        );
        layout
    }
}

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::order::PackageSize;

pub const MIN_WEIGHT_KG: f64 = 0.5;
pub const MAX_WEIGHT_KG: f64 = 25.0;

const NAME_POOL: [&str; 16] = [
    "Maria Santos",
    "Juan Dela Cruz",
    "Ana Reyes",
    "Jose Garcia",
    "Liza Mendoza",
    "Mark Villanueva",
    "Grace Tan",
    "Paolo Cruz",
    "Carla Ramos",
    "Miguel Torres",
    "Sofia Navarro",
    "Rafael Bautista",
    "Isabel Flores",
    "Daniel Aquino",
    "Patricia Lim",
    "Carlo Fernandez",
];

/// Presentation-only fields attached to imported and checkout orders.
pub trait DisplayFiller: Send + Sync {
    fn sender_name(&self) -> String;
    fn recipient_name(&self) -> String;
    fn package_size(&self) -> PackageSize;
    /// Kilograms within `[MIN_WEIGHT_KG, MAX_WEIGHT_KG]`.
    fn weight(&self) -> f64;
}

/// Draws filler values from the name pool and bounded ranges.
pub struct RandomFiller {
    rng: Mutex<StdRng>,
}

impl RandomFiller {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence, for demos and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard)
    }

    fn pick_name(&self) -> String {
        self.with_rng(|rng| NAME_POOL.choose(rng).copied().unwrap_or(NAME_POOL[0]))
            .to_string()
    }
}

impl Default for RandomFiller {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayFiller for RandomFiller {
    fn sender_name(&self) -> String {
        self.pick_name()
    }

    fn recipient_name(&self) -> String {
        self.pick_name()
    }

    fn package_size(&self) -> PackageSize {
        self.with_rng(|rng| {
            PackageSize::ALL
                .choose(rng)
                .copied()
                .unwrap_or(PackageSize::Medium)
        })
    }

    fn weight(&self) -> f64 {
        let raw = self.with_rng(|rng| rng.gen_range(MIN_WEIGHT_KG..=MAX_WEIGHT_KG));
        ((raw * 100.0).round() / 100.0).clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG)
    }
}

/// Returns the same values every time.
#[derive(Debug, Clone)]
pub struct FixedFiller {
    pub sender: String,
    pub recipient: String,
    pub size: PackageSize,
    pub weight: f64,
}

impl Default for FixedFiller {
    fn default() -> Self {
        Self {
            sender: "Test Sender".to_string(),
            recipient: "Test Recipient".to_string(),
            size: PackageSize::Medium,
            weight: 2.5,
        }
    }
}

impl DisplayFiller for FixedFiller {
    fn sender_name(&self) -> String {
        self.sender.clone()
    }

    fn recipient_name(&self) -> String {
        self.recipient.clone()
    }

    fn package_size(&self) -> PackageSize {
        self.size
    }

    fn weight(&self) -> f64 {
        self.weight.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG)
    }
}

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("invalid draw pool {min}..={max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("every number in {min}..={max} has been drawn")]
    Exhausted { min: i32, max: i32 },
}

/// Picks one value of `min..=max` that is not in `used`, uniformly at random.
///
/// The candidate list is built up front, so the cost is bounded by the size of
/// the range and a fully drawn pool returns `Exhausted` instead of spinning.
pub fn select_unused<R: Rng + ?Sized>(
    min: i32,
    max: i32,
    used: &HashSet<i32>,
    rng: &mut R,
) -> Result<i32, PoolError> {
    if min > max {
        return Err(PoolError::InvalidRange { min, max });
    }

    let remaining: Vec<i32> = (min..=max).filter(|n| !used.contains(n)).collect();

    remaining
        .choose(rng)
        .copied()
        .ok_or(PoolError::Exhausted { min, max })
}

/// The inclusive range numbers are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberPool {
    min: i32,
    max: i32,
}

impl NumberPool {
    pub fn new(min: i32, max: i32) -> Result<Self, PoolError> {
        if min > max {
            return Err(PoolError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, n: i32) -> bool {
        (self.min..=self.max).contains(&n)
    }

    pub fn select_unused<R: Rng + ?Sized>(
        &self,
        used: &HashSet<i32>,
        rng: &mut R,
    ) -> Result<i32, PoolError> {
        select_unused(self.min, self.max, used, rng)
    }
}

impl Default for NumberPool {
    fn default() -> Self {
        Self { min: 1, max: 40 }
    }
}

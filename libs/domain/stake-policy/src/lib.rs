// [libs/domain/stake-policy/src/lib.rs]
//! Pure lookup tables governing stake minimums and bounty payouts per
//! evidence category, lifted from the original Python service's
//! `MIN_STAKE_MICROALGOS` / `BOUNTY_REWARDS` constants (spec.md §4.1,
//! §4.10).

use thiserror::Error;
use whistlechain_domain_models::Category;

/// Global ceiling applied regardless of category, guarding against a
/// submitter accidentally staking their entire wallet.
pub const GLOBAL_MAX_STAKE_MICRO: u64 = 500_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakePolicyError {
    #[error("stake {offered} below minimum {minimum} for category {category}")]
    BelowMinimum {
        offered: u64,
        minimum: u64,
        category: Category,
    },
    #[error("stake {offered} exceeds global maximum {max}")]
    AboveMaximum { offered: u64, max: u64 },
}

/// Minimum stake, in microalgos-equivalent units, required to submit
/// evidence in `category`. A stake of exactly zero is always permitted
/// as the free-tier carve-out (spec.md §4.1) and bypasses this minimum.
pub fn minimum_stake_micro(category: Category) -> u64 {
    match category {
        Category::Financial => 25_000_000,
        Category::Construction => 50_000_000,
        Category::Food => 25_000_000,
        Category::Academic => 15_000_000,
    }
}

/// Full bounty pool micro-amount paid out on a `VERIFIED` verdict.
pub fn bounty_pool_micro(category: Category) -> u64 {
    match category {
        Category::Financial => 200_000_000,
        Category::Construction => 300_000_000,
        Category::Food => 150_000_000,
        Category::Academic => 100_000_000,
    }
}

/// Validates an offered stake against the category minimum (unless the
/// free-tier zero-stake carve-out applies) and the global maximum.
pub fn validate_stake(category: Category, offered_micro: u64) -> Result<(), StakePolicyError> {
    if offered_micro > GLOBAL_MAX_STAKE_MICRO {
        return Err(StakePolicyError::AboveMaximum {
            offered: offered_micro,
            max: GLOBAL_MAX_STAKE_MICRO,
        });
    }
    if offered_micro == 0 {
        return Ok(());
    }
    let minimum = minimum_stake_micro(category);
    if offered_micro < minimum {
        return Err(StakePolicyError::BelowMinimum {
            offered: offered_micro,
            minimum,
            category,
        });
    }
    Ok(())
}

/// Weighted-consensus threshold used by the verification engine's tally.
pub const CONSENSUS_THRESHOLD: f64 = 0.67;

/// Minimum panel size drawn for a verification session.
pub const MIN_INSPECTORS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stake_bypasses_minimum() {
        assert!(validate_stake(Category::Construction, 0).is_ok());
    }

    #[test]
    fn below_minimum_is_rejected() {
        let err = validate_stake(Category::Academic, 1).unwrap_err();
        assert_eq!(
            err,
            StakePolicyError::BelowMinimum {
                offered: 1,
                minimum: 15_000_000,
                category: Category::Academic,
            }
        );
    }

    #[test]
    fn exactly_minimum_is_accepted() {
        assert!(validate_stake(Category::Academic, 15_000_000).is_ok());
    }

    #[test]
    fn above_global_max_is_rejected() {
        assert!(validate_stake(Category::Financial, GLOBAL_MAX_STAKE_MICRO + 1).is_err());
    }
}

// [apps/coordinator/src/handlers/stake.rs]
//! `GET /stake/info/{category}` (spec.md §6) — a read-only projection
//! over the stake-policy tables in `whistlechain-stake-policy`.

use axum::extract::Path;
use axum::Json;
use serde::Serialize;
use whistlechain_domain_models::Category;
use whistlechain_stake_policy::{bounty_pool_micro, minimum_stake_micro, GLOBAL_MAX_STAKE_MICRO};

use crate::error::CoordinatorError;

#[derive(Serialize)]
pub struct StakeInfo {
    pub category: String,
    pub min_stake_micro: u64,
    pub max_stake_micro: u64,
    pub bounty_micro: u64,
}

pub async fn stake_info(Path(category): Path<String>) -> Result<Json<StakeInfo>, CoordinatorError> {
    let category = Category::parse(&category)
        .ok_or_else(|| CoordinatorError::Validation(format!("unknown category {category}")))?;
    Ok(Json(StakeInfo {
        category: category.to_string(),
        min_stake_micro: minimum_stake_micro(category),
        max_stake_micro: GLOBAL_MAX_STAKE_MICRO,
        bounty_micro: bounty_pool_micro(category),
    }))
}

// [apps/coordinator/src/handlers/wallet.rs]
//! `POST /wallet/create` (spec.md §6) — a convenience for callers who
//! don't want to run the wallet service locally. The private key never
//! leaves this response; the coordinator does not persist it.

use axum::Json;
use serde::Serialize;
use whistlechain_core_wallet::Wallet;

#[derive(Serialize)]
pub struct WalletCreated {
    pub address: String,
    pub mnemonic: String,
}

pub async fn create_wallet() -> Json<WalletCreated> {
    let wallet = Wallet::generate();
    Json(WalletCreated {
        address: wallet.address().to_string(),
        mnemonic: wallet.mnemonic_phrase(),
    })
}

//! Transaction submission engine.
//!
//! Every state-changing call goes through [`execute`]: estimate gas, pad it,
//! fall back to a fixed limit when estimation reverts, send, then wait for
//! one confirmation. The confirmed receipt is the source of truth; nothing
//! re-polls afterwards.

use ethers::contract::{ContractError, EthLogDecode, FunctionCall};
use ethers::core::abi::Detokenize;
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256};
use std::borrow::Borrow;

use crate::constants::{APPROVE_FALLBACK_GAS, GAS_MULTIPLIER_PCT, TX_CONFIRMATIONS};
use crate::error::{AppError, Result};
use crate::models::TxOutcome;
use crate::session::ContractBindings;

/// Pad a gas estimate by a whole-number percentage (150 = +50%).
pub fn padded_gas(estimate: U256, multiplier_pct: u64) -> U256 {
    estimate * U256::from(multiplier_pct) / U256::from(100)
}

/// Submit a contract call and wait for its confirmed receipt.
///
/// `fallback_gas` is used when estimation itself reverts, which happens for
/// calls the node refuses to simulate. A dropped transaction (no receipt
/// after confirmation) and an on-chain revert are both hard errors.
pub async fn execute<B, M, D>(
    call: FunctionCall<B, M, D>,
    fallback_gas: u64,
    multiplier_pct: u64,
) -> Result<TransactionReceipt>
where
    B: Borrow<M>,
    M: Middleware + 'static,
    D: Detokenize,
{
    let gas_limit = match call.estimate_gas().await {
        Ok(estimate) => padded_gas(estimate, multiplier_pct),
        Err(e) => {
            tracing::debug!(
                fallback_gas,
                "Gas estimation failed, using fallback limit: {}",
                e
            );
            U256::from(fallback_gas)
        }
    };

    let call = call.gas(gas_limit);
    let pending = call.send().await.map_err(map_contract_error)?;
    let tx_hash = pending.tx_hash();

    let receipt = pending
        .confirmations(TX_CONFIRMATIONS)
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed awaiting confirmation: {}", e)))?
        .ok_or_else(|| AppError::BlockchainRPC("Transaction dropped from mempool".to_string()))?;

    if receipt.status != Some(1.into()) {
        tracing::warn!(tx_hash = %format!("{:?}", tx_hash), "Transaction reverted on chain");
        return Err(AppError::ContractRevert(
            "Transaction reverted on chain".to_string(),
        ));
    }

    tracing::info!(
        tx_hash = %format!("{:?}", tx_hash),
        block = receipt.block_number.map(|b| b.as_u64()),
        gas_used = receipt.gas_used.map(|g| g.as_u64()),
        "Transaction confirmed"
    );

    Ok(receipt)
}

pub fn outcome(receipt: &TransactionReceipt) -> TxOutcome {
    TxOutcome {
        tx_hash: format!("{:?}", receipt.transaction_hash),
        block_number: receipt.block_number.map(|b| b.as_u64()),
        gas_used: receipt.gas_used.map(|g| g.to_string()),
    }
}

/// Best-effort extraction of a named event from a receipt. Contracts differ
/// across deployments, so a missing event is not an error.
pub fn find_event<E: EthLogDecode>(receipt: &TransactionReceipt) -> Option<E> {
    receipt
        .logs
        .iter()
        .find_map(|log| ethers::contract::parse_log::<E>(log.clone()).ok())
}

/// Approve a WAR spend for `spender` when the current allowance is below
/// `amount`. No-op when the allowance already covers it.
pub async fn ensure_war_allowance(
    b: &ContractBindings,
    spender: Address,
    amount: U256,
) -> Result<()> {
    let allowance = b
        .war_token
        .allowance(b.account, spender)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to read WAR allowance: {}", e)))?;
    if allowance >= amount {
        return Ok(());
    }

    tracing::info!(
        spender = %format!("{:?}", spender),
        amount = %amount,
        "Approving WAR spend"
    );
    execute(
        b.war_token.approve(spender, amount),
        APPROVE_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(())
}

fn map_contract_error<M: Middleware>(e: ContractError<M>) -> AppError {
    if let Some(reason) = e.decode_revert::<String>() {
        return AppError::ContractRevert(friendly_revert_message(&reason));
    }
    let msg = e.to_string();
    if msg.contains("revert") {
        AppError::ContractRevert(friendly_revert_message(&msg))
    } else {
        AppError::BlockchainRPC(msg)
    }
}

/// Translate known contract revert strings into player-facing messages.
pub fn friendly_revert_message(reason: &str) -> String {
    if reason.contains("Battle cooldown active") {
        "Your warrior is still on battle cooldown. Wait a moment and try again.".to_string()
    } else if reason.contains("Not enough stamina") {
        "Your warrior does not have enough stamina for this battle.".to_string()
    } else if reason.contains("Weapon not usable") {
        "That weapon is broken or out of durability. Repair it first.".to_string()
    } else {
        reason.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_gas_applies_percentage() {
        assert_eq!(padded_gas(U256::from(100_000), 150), U256::from(150_000));
        assert_eq!(padded_gas(U256::from(100_000), 120), U256::from(120_000));
        assert_eq!(padded_gas(U256::zero(), 150), U256::zero());
    }

    #[test]
    fn known_reverts_get_friendly_messages() {
        assert!(friendly_revert_message("execution reverted: Battle cooldown active")
            .contains("cooldown"));
        assert!(friendly_revert_message("Not enough stamina").contains("stamina"));
        assert!(friendly_revert_message("Weapon not usable").contains("Repair"));
    }

    #[test]
    fn unknown_reverts_pass_through() {
        assert_eq!(
            friendly_revert_message("Not the token owner"),
            "Not the token owner"
        );
    }
}

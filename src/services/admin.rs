//! Admin console: parameter tuning, feature switches, treasury and roles.
//!
//! Every entry point is gated on the session account holding GAME_ADMIN or
//! the default admin role on the GameManager.

use ethers::types::U256;
use serde::Serialize;

use crate::constants::{ADMIN_FALLBACK_GAS, GAS_MULTIPLIER_PCT};
use crate::error::{AppError, Result};
use crate::models::TxOutcome;
use crate::services::tx;
use crate::session::ContractBindings;
use crate::utils::{format_war, parse_war};

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub treasury_balance: String,
    pub total_warriors: String,
    pub next_weapon_id: String,
    pub next_battle_id: String,
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameParamsView {
    pub warrior_mint_price: String,
    pub weapon_mint_price: String,
    pub base_battle_reward: String,
    pub battle_cooldown_secs: String,
    pub stamina_cost: String,
    pub max_stamina: String,
    pub stamina_recovery_secs: String,
    pub base_experience: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureStatus {
    pub minting_enabled: bool,
    pub battle_enabled: bool,
    pub marketplace_enabled: bool,
}

pub async fn require_admin(b: &ContractBindings) -> Result<()> {
    let game_admin_call = b.game_manager.game_admin();
    let default_admin_call = b.game_manager.default_admin_role();
    let (game_admin, default_admin) =
        tokio::try_join!(game_admin_call.call(), default_admin_call.call())
            .map_err(|e| AppError::BlockchainRPC(format!("Failed to read role ids: {}", e)))?;

    let has_game_admin_call = b.game_manager.has_role(game_admin, b.account);
    let has_default_admin_call = b.game_manager.has_role(default_admin, b.account);
    let (has_game_admin, has_default_admin) =
        tokio::try_join!(has_game_admin_call.call(), has_default_admin_call.call())
            .map_err(|e| AppError::BlockchainRPC(format!("Failed to check roles: {}", e)))?;

    if has_game_admin || has_default_admin {
        Ok(())
    } else {
        Err(AppError::AuthError(
            "Session account does not hold an admin role".to_string(),
        ))
    }
}

pub async fn overview(b: &ContractBindings) -> Result<AdminOverview> {
    let treasury_balance_call = b.treasury.get_treasury_balance();
    let warrior_stats_call = b.warrior_nft.get_contract_stats();
    let next_weapon_id_call = b.weapon_nft.next_token_id();
    let next_battle_id_call = b.battle_system.next_battle_id();
    let paused_call = b.game_manager.paused();
    let (treasury_balance, warrior_stats, next_weapon_id, next_battle_id, paused) = tokio::try_join!(
        treasury_balance_call.call(),
        warrior_stats_call.call(),
        next_weapon_id_call.call(),
        next_battle_id_call.call(),
        paused_call.call(),
    )
    .map_err(|e| AppError::BlockchainRPC(format!("Overview read failed: {}", e)))?;

    Ok(AdminOverview {
        treasury_balance: format_war(treasury_balance),
        total_warriors: warrior_stats.0.to_string(),
        next_weapon_id: next_weapon_id.to_string(),
        next_battle_id: next_battle_id.to_string(),
        paused,
    })
}

/// Mint prices come from the GameManager; battle tuning comes live from the
/// BattleSystem so edits show up immediately.
pub async fn game_params(b: &ContractBindings) -> Result<GameParamsView> {
    let params_call = b.game_manager.get_game_parameters();
    let battle_config_call = b.battle_system.get_contract_config();
    let (params, battle_config) = tokio::try_join!(params_call.call(), battle_config_call.call())
        .map_err(|e| AppError::BlockchainRPC(format!("Parameter read failed: {}", e)))?;

    // GameParams tuple: (warriorMintPrice, weaponMintPrice, baseBattleReward,
    // battleCooldown, staminaCost, maxStamina, staminaRecoveryTime)
    let (reward, cooldown, stamina_cost, experience) = battle_config;
    Ok(GameParamsView {
        warrior_mint_price: format_war(params.0),
        weapon_mint_price: format_war(params.1),
        base_battle_reward: format_war(reward),
        battle_cooldown_secs: cooldown.to_string(),
        stamina_cost: stamina_cost.to_string(),
        max_stamina: params.5.to_string(),
        stamina_recovery_secs: params.6.to_string(),
        base_experience: format_war(experience),
    })
}

pub async fn feature_status(b: &ContractBindings) -> Result<FeatureStatus> {
    let (minting_enabled, battle_enabled, marketplace_enabled) = b
        .game_manager
        .get_feature_status()
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getFeatureStatus failed: {}", e)))?;
    Ok(FeatureStatus {
        minting_enabled,
        battle_enabled,
        marketplace_enabled,
    })
}

pub async fn set_minting_enabled(b: &ContractBindings, enabled: bool) -> Result<TxOutcome> {
    admin_tx(b.game_manager.set_minting_enabled(enabled)).await
}

pub async fn set_battle_enabled(b: &ContractBindings, enabled: bool) -> Result<TxOutcome> {
    admin_tx(b.game_manager.set_battle_enabled(enabled)).await
}

pub async fn set_marketplace_enabled(b: &ContractBindings, enabled: bool) -> Result<TxOutcome> {
    admin_tx(b.game_manager.set_marketplace_enabled(enabled)).await
}

pub async fn set_warrior_mint_price(b: &ContractBindings, price: &str) -> Result<TxOutcome> {
    let wei = parse_war(price)?;
    admin_tx(b.game_manager.set_warrior_mint_price(wei)).await
}

pub async fn set_weapon_mint_price(b: &ContractBindings, price: &str) -> Result<TxOutcome> {
    let wei = parse_war(price)?;
    admin_tx(b.game_manager.set_weapon_mint_price(wei)).await
}

pub async fn set_stamina_params(
    b: &ContractBindings,
    max_stamina: u64,
    recovery_secs: u64,
) -> Result<TxOutcome> {
    let call = b
        .game_manager
        .set_stamina_params(U256::from(max_stamina), U256::from(recovery_secs));
    admin_tx(call).await
}

/// Battle tuning writes directly to the BattleSystem. Reward and experience
/// are 18-decimal amounts on chain.
pub async fn set_battle_params(
    b: &ContractBindings,
    base_reward: Option<&str>,
    cooldown_secs: Option<u64>,
    stamina_cost: Option<u64>,
    base_experience: Option<&str>,
) -> Result<Vec<TxOutcome>> {
    let mut outcomes = Vec::new();
    if let Some(reward) = base_reward {
        let wei = parse_war(reward)?;
        outcomes.push(admin_tx(b.battle_system.set_base_reward(wei)).await?);
    }
    if let Some(cooldown) = cooldown_secs {
        outcomes.push(admin_tx(b.battle_system.set_battle_cooldown(U256::from(cooldown))).await?);
    }
    if let Some(cost) = stamina_cost {
        outcomes.push(admin_tx(b.battle_system.set_stamina_cost(U256::from(cost))).await?);
    }
    if let Some(experience) = base_experience {
        let wei = parse_war(experience)?;
        outcomes.push(admin_tx(b.battle_system.set_base_experience(wei)).await?);
    }
    if outcomes.is_empty() {
        return Err(AppError::BadRequest(
            "No battle parameter supplied".to_string(),
        ));
    }
    Ok(outcomes)
}

/// Fee rate is stored in basis points; callers supply whole percent.
pub async fn set_marketplace_fee_percent(b: &ContractBindings, percent: u64) -> Result<TxOutcome> {
    if percent > 100 {
        return Err(AppError::BadRequest(
            "Fee percent cannot exceed 100".to_string(),
        ));
    }
    let call = b
        .game_manager
        .set_marketplace_fee_rate(U256::from(percent) * U256::from(100u64));
    admin_tx(call).await
}

pub async fn set_paused(b: &ContractBindings, paused: bool) -> Result<TxOutcome> {
    if paused {
        admin_tx(b.game_manager.pause()).await
    } else {
        admin_tx(b.game_manager.unpause()).await
    }
}

pub async fn treasury_deposit(b: &ContractBindings, amount: &str) -> Result<TxOutcome> {
    let wei = parse_war(amount)?;
    tx::ensure_war_allowance(b, b.registry.treasury, wei).await?;
    admin_tx(b.treasury.deposit(wei)).await
}

pub async fn treasury_withdraw(b: &ContractBindings, amount: &str) -> Result<TxOutcome> {
    let wei = parse_war(amount)?;
    admin_tx(b.treasury.withdraw(wei)).await
}

pub async fn treasury_emergency_withdraw(b: &ContractBindings) -> Result<TxOutcome> {
    admin_tx(b.treasury.emergency_withdraw()).await
}

/// Grant GAME_ADMIN on the GameManager to another account.
pub async fn grant_game_admin(b: &ContractBindings, account: &str) -> Result<TxOutcome> {
    let account = parse_account(account)?;
    let role = b
        .game_manager
        .game_admin()
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to read role id: {}", e)))?;
    admin_tx(b.game_manager.grant_role(role, account)).await
}

/// Grant REWARD_DISTRIBUTOR_ROLE on the Treasury; used to authorize the
/// battle system to pay rewards.
pub async fn grant_reward_distributor(b: &ContractBindings, account: &str) -> Result<TxOutcome> {
    let account = parse_account(account)?;
    let role = b
        .treasury
        .reward_distributor_role()
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to read role id: {}", e)))?;
    admin_tx(b.treasury.grant_role(role, account)).await
}

fn parse_account(value: &str) -> Result<ethers::types::Address> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid account address: {}", value)))
}

async fn admin_tx<D>(
    call: ethers::contract::ContractCall<crate::session::GameClient, D>,
) -> Result<TxOutcome>
where
    D: ethers::core::abi::Detokenize,
{
    let receipt = tx::execute(call, ADMIN_FALLBACK_GAS, GAS_MULTIPLIER_PCT).await?;
    Ok(tx::outcome(&receipt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_parsing_rejects_malformed_input() {
        assert!(parse_account("0xc39Ecfd52984D25f554BA28cE5560FB692B47943").is_ok());
        assert!(parse_account("deadbeef").is_err());
        assert!(parse_account("").is_err());
    }
}

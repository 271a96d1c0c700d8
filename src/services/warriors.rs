//! Warrior roster reads and minting.

use ethers::types::U256;

use crate::constants::{
    DEFAULT_WARRIOR_MINT_PRICE_WAR, GAS_MULTIPLIER_PCT, WARRIOR_MINT_FALLBACK_GAS,
};
use crate::contracts::WarriorMintedFilter;
use crate::error::{AppError, Result};
use crate::models::{Element, TxOutcome, WarriorView};
use crate::services::tx;
use crate::session::ContractBindings;
use crate::utils::format_whole_tokens;

/// All warriors owned by the session account. Id 0 is a placeholder slot in
/// the owner index and is skipped; individual read failures drop that
/// warrior rather than failing the roster.
pub async fn list_warriors(b: &ContractBindings) -> Result<Vec<WarriorView>> {
    let ids = b
        .warrior_nft
        .get_warriors_by_owner(b.account)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to list warriors: {}", e)))?;

    let mut warriors = Vec::with_capacity(ids.len());
    for id in ids {
        if id.is_zero() {
            continue;
        }
        match load_warrior(b, id).await {
            Ok(Some(warrior)) => warriors.push(warrior),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(warrior_id = %id, "Skipping unreadable warrior: {}", e);
            }
        }
    }
    Ok(warriors)
}

/// Single warrior, re-verifying ownership. The owner index can lag a
/// transfer, so a warrior no longer held by the account yields None.
async fn load_warrior(b: &ContractBindings, id: U256) -> Result<Option<WarriorView>> {
    let owner = b
        .warrior_nft
        .owner_of(id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("ownerOf({}) failed: {}", id, e)))?;
    if owner != b.account {
        return Ok(None);
    }

    let (level, power, experience, info_stamina, element_name, won, lost, required_exp, progress) =
        b.warrior_nft
            .get_warrior_info(id)
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getWarriorInfo({}) failed: {}", id, e)))?;

    // Live stamina comes from the battle system; the NFT snapshot is the
    // fallback when that read fails.
    let stamina = b
        .battle_system
        .get_current_stamina(id)
        .call()
        .await
        .unwrap_or(info_stamina);

    let element = Element::from_name(&element_name);
    Ok(Some(WarriorView {
        id: id.to_string(),
        level: level.to_string(),
        power: power.to_string(),
        experience: format_whole_tokens(experience),
        required_exp: format_whole_tokens(required_exp),
        stamina: stamina.to_string(),
        element: element.index(),
        element_name: element.name().to_string(),
        battles_won: won.to_string(),
        battles_lost: lost.to_string(),
        progress_percentage: progress.to_string(),
    }))
}

/// Current warrior mint price, falling back to the documented default when
/// the read fails.
pub async fn mint_price(b: &ContractBindings) -> U256 {
    match b.warrior_nft.get_mint_price().call().await {
        Ok(price) => price,
        Err(e) => {
            tracing::debug!("getMintPrice failed, using default: {}", e);
            U256::from(DEFAULT_WARRIOR_MINT_PRICE_WAR) * U256::exp10(18)
        }
    }
}

/// Mint a warrior: approve the WAR spend if the allowance is short, then
/// mint and pull the new token id out of the WarriorMinted event. Older
/// deployments do not emit the event, so the id may be absent.
pub async fn mint_warrior(b: &ContractBindings) -> Result<(TxOutcome, Option<U256>)> {
    let price = mint_price(b).await;
    tx::ensure_war_allowance(b, b.registry.warrior_nft, price).await?;

    let receipt = tx::execute(
        b.warrior_nft.mint_warrior(),
        WARRIOR_MINT_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;

    let minted = tx::find_event::<WarriorMintedFilter>(&receipt).map(|ev| ev.token_id);
    if minted.is_none() {
        tracing::debug!("Mint receipt carried no WarriorMinted event");
    }
    Ok((tx::outcome(&receipt), minted))
}

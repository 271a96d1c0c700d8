//! Weapon armory: enumeration, filtering, and the forge operations.

use ethers::types::U256;
use rand::Rng;
use serde::Deserialize;

use crate::constants::{
    BURN_FALLBACK_GAS, DEFAULT_WEAPON_MINT_PRICE_WAR, DUST_POWER_FIVE, DUST_POWER_FOUR,
    DUST_POWER_LOW, DUST_REFORGE_FALLBACK_GAS, EQUIP_FALLBACK_GAS, GAS_MULTIPLIER_PCT,
    RECENT_WEAPON_SCAN_WINDOW, REFORGE_FALLBACK_GAS, REFORGE_MIN_TARGET_STARS,
    REPAIR_COST_PER_POINT, REPAIR_FALLBACK_GAS, UNEQUIP_FALLBACK_GAS,
    WEAPON_BATCH_MINT_FALLBACK_GAS,
};
use crate::contracts::{BurnedFilter, WeaponsBatchMintedFilter};
use crate::error::{AppError, Result};
use crate::models::{DustBalance, Element, TxOutcome, WeaponCollectionView, WeaponStats, WeaponView};
use crate::services::tx;
use crate::session::{ContractBindings, WalletSession, WeaponDiscovery};
use crate::utils::parse_war;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponStatusFilter {
    Equipped,
    Unequipped,
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponSort {
    Stars,
    Power,
    Durability,
    Id,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WeaponFilter {
    pub stars: Option<u8>,
    pub element: Option<u8>,
    pub status: Option<WeaponStatusFilter>,
    pub sort: Option<WeaponSort>,
}

/// The full armory view: filtered and sorted weapons, collection stats over
/// the unfiltered set, and dust balances.
pub async fn weapon_collection(
    session: &WalletSession,
    b: &ContractBindings,
    filter: WeaponFilter,
) -> Result<WeaponCollectionView> {
    let ids = discover_weapon_ids(session, b).await?;

    let mut weapons = Vec::with_capacity(ids.len());
    for id in ids {
        match load_weapon(b, id).await {
            Ok(weapon) => weapons.push(weapon),
            Err(e) => {
                tracing::debug!(weapon_id = %id, "Skipping unreadable weapon: {}", e);
            }
        }
    }

    let stats = collection_stats(&weapons);
    let dust = dust_balance(b).await;

    let mut shown = apply_filter(weapons, &filter);
    sort_weapons(&mut shown, effective_sort(&filter));

    Ok(WeaponCollectionView {
        weapons: shown,
        stats,
        dust,
    })
}

pub async fn dust_balance(b: &ContractBindings) -> DustBalance {
    match b.weapon_nft.get_dust_supplies(b.account).call().await {
        Ok((low, four, five)) => DustBalance { low, four, five },
        Err(e) => {
            tracing::debug!("getDustSupplies failed, reporting zero dust: {}", e);
            DustBalance::default()
        }
    }
}

/// Enumerate owned weapon ids. Prefers the owner index; deployments that
/// lack it fall back to scanning the most recent mints for a positive
/// balance. The working path is cached on the session.
async fn discover_weapon_ids(
    session: &WalletSession,
    b: &ContractBindings,
) -> Result<Vec<U256>> {
    match session.weapon_discovery().await {
        Some(WeaponDiscovery::OwnerIndex) => owner_index_ids(b).await,
        Some(WeaponDiscovery::ReverseScan) => reverse_scan_ids(b).await,
        None => match owner_index_ids(b).await {
            Ok(ids) => {
                session.set_weapon_discovery(WeaponDiscovery::OwnerIndex).await;
                Ok(ids)
            }
            Err(e) => {
                tracing::debug!("getWeaponsByOwner unavailable, falling back to scan: {}", e);
                session.set_weapon_discovery(WeaponDiscovery::ReverseScan).await;
                reverse_scan_ids(b).await
            }
        },
    }
}

async fn owner_index_ids(b: &ContractBindings) -> Result<Vec<U256>> {
    b.weapon_nft
        .get_weapons_by_owner(b.account)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to list weapons: {}", e)))
}

async fn reverse_scan_ids(b: &ContractBindings) -> Result<Vec<U256>> {
    let next = b
        .weapon_nft
        .next_token_id()
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("nextTokenId failed: {}", e)))?;
    if next.is_zero() {
        return Ok(Vec::new());
    }

    let newest = next.as_u64().saturating_sub(1);
    let oldest = newest.saturating_sub(RECENT_WEAPON_SCAN_WINDOW.saturating_sub(1)).max(1);

    let mut owned = Vec::new();
    for id in (oldest..=newest).rev() {
        let id = U256::from(id);
        match b.weapon_nft.balance_of(b.account, id).call().await {
            Ok(balance) if !balance.is_zero() => owned.push(id),
            Ok(_) => {}
            Err(e) => {
                tracing::trace!(weapon_id = %id, "Scan probe failed: {}", e);
            }
        }
    }
    Ok(owned)
}

async fn load_weapon(b: &ContractBindings, id: U256) -> Result<WeaponView> {
    let (
        name,
        element_name,
        stars,
        stat1,
        stat2,
        stat3,
        level,
        base_power,
        equipped_by,
        weapon_type,
        current_durability,
        max_durability,
        broken,
    ) = b
        .weapon_nft
        .get_weapon_info(id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getWeaponInfo({}) failed: {}", id, e)))?;

    let element = Element::from_name(&element_name);
    Ok(WeaponView {
        id: id.to_string(),
        name,
        element: element.index(),
        element_name: element.name().to_string(),
        stars,
        stat1,
        stat2,
        stat3,
        level,
        base_power: base_power.to_string(),
        equipped_by: equipped_by.to_string(),
        weapon_type,
        current_durability,
        max_durability,
        broken,
    })
}

fn collection_stats(weapons: &[WeaponView]) -> WeaponStats {
    WeaponStats {
        total: weapons.len(),
        equipped: weapons.iter().filter(|w| w.is_equipped()).count(),
        broken: weapons.iter().filter(|w| w.broken).count(),
        high_star: weapons.iter().filter(|w| w.stars >= 2).count(),
        total_power: weapons
            .iter()
            .map(|w| w.base_power.parse::<u64>().unwrap_or(0))
            .sum(),
    }
}

fn apply_filter(weapons: Vec<WeaponView>, filter: &WeaponFilter) -> Vec<WeaponView> {
    weapons
        .into_iter()
        .filter(|w| filter.stars.map_or(true, |s| w.stars == s))
        .filter(|w| filter.element.map_or(true, |e| w.element == e))
        .filter(|w| match filter.status {
            None => true,
            Some(WeaponStatusFilter::Equipped) => w.is_equipped(),
            Some(WeaponStatusFilter::Unequipped) => !w.is_equipped() && !w.broken,
            Some(WeaponStatusFilter::Broken) => w.broken,
        })
        .collect()
}

fn effective_sort(filter: &WeaponFilter) -> WeaponSort {
    filter.sort.unwrap_or(WeaponSort::Stars)
}

fn sort_weapons(weapons: &mut [WeaponView], sort: WeaponSort) {
    let numeric = |s: &str| s.parse::<u64>().unwrap_or(0);
    match sort {
        WeaponSort::Stars => weapons.sort_by(|a, b| b.stars.cmp(&a.stars)),
        WeaponSort::Power => {
            weapons.sort_by(|a, b| numeric(&b.base_power).cmp(&numeric(&a.base_power)))
        }
        WeaponSort::Durability => {
            weapons.sort_by(|a, b| b.current_durability.cmp(&a.current_durability))
        }
        WeaponSort::Id => weapons.sort_by(|a, b| numeric(&b.id).cmp(&numeric(&a.id))),
    }
}

/// Weapon mint price, defaulting when the read fails.
pub async fn mint_price(b: &ContractBindings) -> U256 {
    match b.weapon_nft.get_mint_price().call().await {
        Ok(price) => price,
        Err(e) => {
            tracing::debug!("Weapon getMintPrice failed, using default: {}", e);
            U256::from(DEFAULT_WEAPON_MINT_PRICE_WAR) * U256::exp10(18)
        }
    }
}

/// Mint a batch of weapons through the batch minter with a random seed.
pub async fn mint_weapons(
    b: &ContractBindings,
    count: u64,
) -> Result<(TxOutcome, Option<u64>)> {
    if count == 0 {
        return Err(AppError::BadRequest("count must be at least 1".to_string()));
    }
    let minter = b.weapon_batch_minter.as_ref().ok_or_else(|| {
        AppError::BadRequest("Weapon batch minting is not configured".to_string())
    })?;

    let total = mint_price(b).await * U256::from(count);
    let minter_address = b
        .registry
        .weapon_batch_minter
        .ok_or_else(|| AppError::Internal("Batch minter address missing".to_string()))?;
    tx::ensure_war_allowance(b, minter_address, total).await?;

    let seed_bytes: [u8; 32] = rand::rng().random();
    let seed = U256::from_big_endian(&seed_bytes);

    let receipt = tx::execute(
        minter.mint_weapons_batch(U256::from(count), seed),
        WEAPON_BATCH_MINT_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;

    let minted = tx::find_event::<WeaponsBatchMintedFilter>(&receipt).map(|ev| ev.count.as_u64());
    Ok((tx::outcome(&receipt), minted))
}

pub async fn equip(b: &ContractBindings, weapon_id: U256, warrior_id: U256) -> Result<TxOutcome> {
    let receipt = tx::execute(
        b.weapon_nft.equip_weapon(weapon_id, warrior_id),
        EQUIP_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

pub async fn unequip(b: &ContractBindings, weapon_id: U256) -> Result<TxOutcome> {
    let receipt = tx::execute(
        b.weapon_nft.unequip_weapon(weapon_id),
        UNEQUIP_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

/// Repair a weapon. The payable value covers one fixed fee per missing
/// durability point.
pub async fn repair(b: &ContractBindings, weapon_id: U256) -> Result<(TxOutcome, String)> {
    let weapon = load_weapon(b, weapon_id).await?;
    let missing = weapon.max_durability.saturating_sub(weapon.current_durability);
    if missing == 0 {
        return Err(AppError::BadRequest(
            "Weapon is already at full durability".to_string(),
        ));
    }

    let cost = repair_cost(missing)?;
    let receipt = tx::execute(
        b.weapon_nft.repair_weapon(weapon_id).value(cost),
        REPAIR_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok((tx::outcome(&receipt), ethers::utils::format_ether(cost)))
}

fn repair_cost(missing_points: u8) -> Result<U256> {
    let per_point = parse_war(REPAIR_COST_PER_POINT)?;
    Ok(per_point * U256::from(missing_points))
}

/// Burn a weapon for dust. The dust yield comes from the Burned event when
/// the deployment emits one.
pub async fn burn(b: &ContractBindings, weapon_id: U256) -> Result<(TxOutcome, Option<U256>)> {
    let receipt = tx::execute(
        b.weapon_nft.burn(weapon_id),
        BURN_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    let dust = tx::find_event::<BurnedFilter>(&receipt).map(|ev| ev.dust_gained);
    Ok((tx::outcome(&receipt), dust))
}

/// Sacrifice one weapon to strengthen another. The target must be worth
/// strengthening: at least two stars and not currently equipped.
pub async fn reforge(b: &ContractBindings, burn_id: U256, target_id: U256) -> Result<TxOutcome> {
    if burn_id == target_id {
        return Err(AppError::BadRequest(
            "Cannot reforge a weapon into itself".to_string(),
        ));
    }
    let target = load_weapon(b, target_id).await?;
    validate_reforge_target(&target)?;

    let receipt = tx::execute(
        b.weapon_nft.reforge(burn_id, target_id),
        REFORGE_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

fn validate_reforge_target(target: &WeaponView) -> Result<()> {
    if target.stars < REFORGE_MIN_TARGET_STARS {
        return Err(AppError::BadRequest(format!(
            "Reforge target must have at least {} stars",
            REFORGE_MIN_TARGET_STARS
        )));
    }
    if target.is_equipped() {
        return Err(AppError::BadRequest(
            "Unequip the target weapon before reforging it".to_string(),
        ));
    }
    Ok(())
}

/// Power gained by spending the given dust amounts.
pub fn dust_power_gain(low: u32, four: u32, five: u32) -> u64 {
    u64::from(low) * DUST_POWER_LOW
        + u64::from(four) * DUST_POWER_FOUR
        + u64::from(five) * DUST_POWER_FIVE
}

/// Validate a dust spend against the current balances before submitting.
pub fn validate_dust_spend(balance: &DustBalance, low: u32, four: u32, five: u32) -> Result<()> {
    if low == 0 && four == 0 && five == 0 {
        return Err(AppError::BadRequest(
            "Select at least one dust point to spend".to_string(),
        ));
    }
    if low > balance.low || four > balance.four || five > balance.five {
        return Err(AppError::BadRequest(format!(
            "Insufficient dust: have {}/{}/{}, requested {}/{}/{}",
            balance.low, balance.four, balance.five, low, four, five
        )));
    }
    Ok(())
}

/// Spend dust to raise a weapon's power. Returns the power gained alongside
/// the receipt.
pub async fn reforge_with_dust(
    b: &ContractBindings,
    weapon_id: U256,
    low: u32,
    four: u32,
    five: u32,
) -> Result<(TxOutcome, u64)> {
    let balance = dust_balance(b).await;
    validate_dust_spend(&balance, low, four, five)?;

    let receipt = tx::execute(
        b.weapon_nft.reforge_with_dust(weapon_id, low, four, five),
        DUST_REFORGE_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok((tx::outcome(&receipt), dust_power_gain(low, four, five)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(id: u64, stars: u8, power: u64, durability: u8, equipped_by: &str, broken: bool) -> WeaponView {
        WeaponView {
            id: id.to_string(),
            name: format!("Weapon #{}", id),
            element: 1,
            element_name: "Fire".into(),
            stars,
            stat1: 0,
            stat2: 0,
            stat3: 0,
            level: 1,
            base_power: power.to_string(),
            equipped_by: equipped_by.into(),
            weapon_type: "Sword".into(),
            current_durability: durability,
            max_durability: 20,
            broken,
        }
    }

    #[test]
    fn stats_count_over_full_collection() {
        let weapons = vec![
            weapon(1, 3, 500, 20, "7", false),
            weapon(2, 1, 100, 0, "0", true),
            weapon(3, 2, 250, 10, "0", false),
        ];
        let stats = collection_stats(&weapons);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.equipped, 1);
        assert_eq!(stats.broken, 1);
        assert_eq!(stats.high_star, 2);
        assert_eq!(stats.total_power, 850);
    }

    #[test]
    fn status_filter_separates_broken_from_unequipped() {
        let weapons = vec![
            weapon(1, 1, 100, 20, "7", false),
            weapon(2, 1, 100, 0, "0", true),
            weapon(3, 1, 100, 10, "0", false),
        ];
        let filter = WeaponFilter {
            status: Some(WeaponStatusFilter::Unequipped),
            ..Default::default()
        };
        let shown = apply_filter(weapons, &filter);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "3");
    }

    #[test]
    fn default_sort_is_best_stars_first() {
        let filter = WeaponFilter::default();
        assert_eq!(effective_sort(&filter), WeaponSort::Stars);

        let mut weapons = vec![
            weapon(3, 1, 100, 5, "0", false),
            weapon(11, 4, 100, 5, "0", false),
            weapon(7, 2, 100, 5, "0", false),
        ];
        sort_weapons(&mut weapons, effective_sort(&filter));
        let stars: Vec<_> = weapons.iter().map(|w| w.stars).collect();
        assert_eq!(stars, vec![4, 2, 1]);
    }

    #[test]
    fn id_sort_is_newest_first() {
        let mut weapons = vec![
            weapon(3, 1, 100, 5, "0", false),
            weapon(11, 1, 100, 5, "0", false),
            weapon(7, 1, 100, 5, "0", false),
        ];
        sort_weapons(&mut weapons, WeaponSort::Id);
        let ids: Vec<_> = weapons.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "7", "3"]);
    }

    #[test]
    fn reforge_target_must_be_high_star_and_unequipped() {
        let low_star = weapon(1, 1, 100, 20, "0", false);
        assert!(validate_reforge_target(&low_star).is_err());

        let equipped = weapon(2, 3, 400, 20, "7", false);
        assert!(validate_reforge_target(&equipped).is_err());

        let eligible = weapon(3, 2, 250, 20, "0", false);
        assert!(validate_reforge_target(&eligible).is_ok());
    }

    #[test]
    fn dust_power_gain_weights_tiers() {
        assert_eq!(dust_power_gain(3, 2, 1), 3 + 20 + 100);
        assert_eq!(dust_power_gain(0, 0, 0), 0);
    }

    #[test]
    fn dust_spend_validation() {
        let balance = DustBalance {
            low: 5,
            four: 1,
            five: 0,
        };
        assert!(validate_dust_spend(&balance, 0, 0, 0).is_err());
        assert!(validate_dust_spend(&balance, 6, 0, 0).is_err());
        assert!(validate_dust_spend(&balance, 0, 0, 1).is_err());
        assert!(validate_dust_spend(&balance, 5, 1, 0).is_ok());
    }

    #[test]
    fn repair_cost_scales_with_missing_points() {
        let cost = repair_cost(7).unwrap();
        assert_eq!(cost, parse_war("0.007").unwrap());
    }
}

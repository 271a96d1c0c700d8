//! Marketplace browsing and trading.

use ethers::types::{Address, U256};
use serde::Deserialize;

use crate::constants::{
    APPROVE_FALLBACK_GAS, GAS_MULTIPLIER_PCT, MARKET_BUY_APPROVAL_WAR, MARKET_ELEMENT_ANY,
    MARKET_FALLBACK_GAS, MARKET_LEVEL_ANY, MARKET_PAGE_SIZE, MARKET_RARITY_ANY,
};
use crate::error::{AppError, Result};
use crate::models::{Element, ListingCategory, MarketListingView, MarketStatsView, TxOutcome};
use crate::services::tx;
use crate::session::ContractBindings;
use crate::utils::{format_war, parse_war};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowseCategory {
    Warrior,
    Weapon,
    All,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<BrowseCategory>,
    pub page: Option<u64>,
    pub element: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub rarity: Option<u8>,
}

/// Browse filters with wildcards filled in. The contract's "match anything"
/// values differ per filter: 255 for element, 0 for level bounds and rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedBrowse {
    category: BrowseCategory,
    page: u64,
    element: u8,
    min_level: u8,
    max_level: u8,
    rarity: u8,
}

impl BrowseQuery {
    fn resolved(&self) -> ResolvedBrowse {
        ResolvedBrowse {
            category: self.category.unwrap_or(BrowseCategory::All),
            page: self.page.unwrap_or(0),
            element: self.element.unwrap_or(MARKET_ELEMENT_ANY),
            min_level: self.min_level.unwrap_or(MARKET_LEVEL_ANY),
            max_level: self.max_level.unwrap_or(MARKET_LEVEL_ANY),
            rarity: self.rarity.unwrap_or(MARKET_RARITY_ANY),
        }
    }
}

pub struct MarketPage {
    pub listings: Vec<MarketListingView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u8,
}

/// One page of live listings. The "all" category issues both paged queries,
/// so a page may carry up to twice the page size.
pub async fn browse(b: &ContractBindings, query: BrowseQuery) -> Result<MarketPage> {
    let ResolvedBrowse {
        category,
        page,
        element,
        min_level,
        max_level,
        rarity,
    } = query.resolved();

    let mut listings = Vec::new();
    let mut total = 0u64;

    if matches!(category, BrowseCategory::Warrior | BrowseCategory::All) {
        let ids = b
            .marketplace
            .get_character_listings_page(
                MARKET_PAGE_SIZE,
                U256::from(page),
                element,
                min_level,
                max_level,
            )
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getCharacterListingsPage failed: {}", e)))?;
        total += b
            .marketplace
            .get_character_listings_count(element, min_level, max_level)
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getCharacterListingsCount failed: {}", e)))?
            .as_u64();
        collect_listings(b, ListingCategory::Warrior, &ids, &mut listings).await;
    }

    if matches!(category, BrowseCategory::Weapon | BrowseCategory::All) {
        let ids = b
            .marketplace
            .get_weapon_listings_page(MARKET_PAGE_SIZE, U256::from(page), element, rarity)
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getWeaponListingsPage failed: {}", e)))?;
        total += b
            .marketplace
            .get_weapon_listings_count(element, rarity)
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getWeaponListingsCount failed: {}", e)))?
            .as_u64();
        collect_listings(b, ListingCategory::Weapon, &ids, &mut listings).await;
    }

    Ok(MarketPage {
        listings,
        total,
        page,
        page_size: MARKET_PAGE_SIZE,
    })
}

/// Listings placed by the session account, across both collections.
pub async fn my_listings(b: &ContractBindings) -> Result<Vec<MarketListingView>> {
    let mut listings = Vec::new();
    for category in [ListingCategory::Warrior, ListingCategory::Weapon] {
        let ids = b
            .marketplace
            .get_listing_ids_by_seller(nft_address(b, category), b.account)
            .call()
            .await
            .map_err(|e| AppError::BlockchainRPC(format!("getListingIdsBySeller failed: {}", e)))?;
        collect_listings(b, category, &ids, &mut listings).await;
    }
    Ok(listings)
}

async fn collect_listings(
    b: &ContractBindings,
    category: ListingCategory,
    ids: &[U256],
    out: &mut Vec<MarketListingView>,
) {
    for &id in ids {
        match load_listing(b, category, id).await {
            Ok(Some(listing)) => out.push(listing),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(token_id = %id, "Skipping unreadable listing: {}", e);
            }
        }
    }
}

/// A listing with its seller, pricing, and the underlying NFT's metadata.
/// Settled or cancelled slots come back with a zero seller and are dropped.
async fn load_listing(
    b: &ContractBindings,
    category: ListingCategory,
    id: U256,
) -> Result<Option<MarketListingView>> {
    let token = nft_address(b, category);
    let seller_call = b.marketplace.get_seller_of_nft_id(token, id);
    let price_call = b.marketplace.get_seller_price(token, id);
    let tax_call = b.marketplace.get_tax_on_listing(token, id);
    let final_price_call = b.marketplace.get_final_price(token, id);
    let (seller, price, tax, final_price) = tokio::try_join!(
        seller_call.call(),
        price_call.call(),
        tax_call.call(),
        final_price_call.call(),
    )
    .map_err(|e| AppError::BlockchainRPC(format!("Listing read failed for {}: {}", id, e)))?;

    if !listing_is_live(&seller) {
        return Ok(None);
    }

    let (name, element, power, level, stars) = match category {
        ListingCategory::Warrior => {
            let (level, power, _, _, element_name, ..) = b
                .warrior_nft
                .get_warrior_info(id)
                .call()
                .await
                .map_err(|e| AppError::BlockchainRPC(format!("getWarriorInfo failed: {}", e)))?;
            (
                format!("Warrior #{}", id),
                Element::from_name(&element_name),
                power,
                Some(level.to_string()),
                0u8,
            )
        }
        ListingCategory::Weapon => {
            let (name, element_name, stars, _, _, _, _, base_power, ..) = b
                .weapon_nft
                .get_weapon_info(id)
                .call()
                .await
                .map_err(|e| AppError::BlockchainRPC(format!("getWeaponInfo failed: {}", e)))?;
            (name, Element::from_name(&element_name), base_power, None, stars)
        }
    };

    Ok(Some(MarketListingView {
        id: listing_id(category, id),
        category,
        token_id: id.to_string(),
        seller: format!("{:?}", seller),
        price: format_war(price),
        tax: format_war(tax),
        final_price: format_war(final_price),
        name,
        element: element.index(),
        power: power.to_string(),
        level,
        stars,
    }))
}

fn listing_id(category: ListingCategory, id: U256) -> String {
    match category {
        ListingCategory::Warrior => format!("warrior-{}", id),
        ListingCategory::Weapon => format!("weapon-{}", id),
    }
}

fn listing_is_live(seller: &Address) -> bool {
    *seller != Address::zero()
}

fn nft_address(b: &ContractBindings, category: ListingCategory) -> Address {
    match category {
        ListingCategory::Warrior => b.registry.warrior_nft,
        ListingCategory::Weapon => b.registry.weapon_nft,
    }
}

/// List an NFT for sale. Grants the marketplace transfer approval first
/// when it does not already hold one.
pub async fn list(
    b: &ContractBindings,
    category: ListingCategory,
    token_id: U256,
    price: &str,
) -> Result<TxOutcome> {
    let price_wei = parse_war(price)?;
    if price_wei.is_zero() {
        return Err(AppError::BadRequest("Price must be positive".to_string()));
    }

    ensure_transfer_approval(b, category, token_id).await?;

    let receipt = tx::execute(
        b.marketplace
            .add_listing(nft_address(b, category), token_id, price_wei, U256::one()),
        MARKET_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

async fn ensure_transfer_approval(
    b: &ContractBindings,
    category: ListingCategory,
    token_id: U256,
) -> Result<()> {
    match category {
        ListingCategory::Warrior => {
            let approved = b
                .warrior_nft
                .get_approved(token_id)
                .call()
                .await
                .map_err(|e| AppError::BlockchainRPC(format!("getApproved failed: {}", e)))?;
            if approved != b.registry.marketplace {
                tx::execute(
                    b.warrior_nft.approve(b.registry.marketplace, token_id),
                    APPROVE_FALLBACK_GAS,
                    GAS_MULTIPLIER_PCT,
                )
                .await?;
            }
        }
        ListingCategory::Weapon => {
            let approved = b
                .weapon_nft
                .is_approved_for_all(b.account, b.registry.marketplace)
                .call()
                .await
                .map_err(|e| AppError::BlockchainRPC(format!("isApprovedForAll failed: {}", e)))?;
            if !approved {
                tx::execute(
                    b.weapon_nft
                        .set_approval_for_all(b.registry.marketplace, true),
                    APPROVE_FALLBACK_GAS,
                    GAS_MULTIPLIER_PCT,
                )
                .await?;
            }
        }
    }
    Ok(())
}

/// Buy a listing at its current final price. Buying your own listing is
/// rejected; the WAR approval is topped up with a large allowance so
/// repeat purchases skip the extra transaction.
pub async fn buy(
    b: &ContractBindings,
    category: ListingCategory,
    token_id: U256,
) -> Result<(TxOutcome, String)> {
    let token = nft_address(b, category);
    let seller = b
        .marketplace
        .get_seller_of_nft_id(token, token_id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getSellerOfNftId failed: {}", e)))?;
    if !listing_is_live(&seller) {
        return Err(AppError::NotFound("Listing no longer exists".to_string()));
    }
    if seller == b.account {
        return Err(AppError::BadRequest(
            "Cannot buy your own listing".to_string(),
        ));
    }

    let final_price = b
        .marketplace
        .get_final_price(token, token_id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getFinalPrice failed: {}", e)))?;

    let allowance = b
        .war_token
        .allowance(b.account, b.registry.marketplace)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to read WAR allowance: {}", e)))?;
    if allowance < final_price {
        tx::execute(
            b.war_token.approve(
                b.registry.marketplace,
                U256::from(MARKET_BUY_APPROVAL_WAR) * U256::exp10(18),
            ),
            APPROVE_FALLBACK_GAS,
            GAS_MULTIPLIER_PCT,
        )
        .await?;
    }

    let receipt = tx::execute(
        b.marketplace.purchase_listing(token, token_id, final_price),
        MARKET_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok((tx::outcome(&receipt), format_war(final_price)))
}

pub async fn cancel(
    b: &ContractBindings,
    category: ListingCategory,
    token_id: U256,
) -> Result<TxOutcome> {
    let receipt = tx::execute(
        b.marketplace
            .cancel_listing(nft_address(b, category), token_id),
        MARKET_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

pub async fn change_price(
    b: &ContractBindings,
    category: ListingCategory,
    token_id: U256,
    new_price: &str,
) -> Result<TxOutcome> {
    let price_wei = parse_war(new_price)?;
    if price_wei.is_zero() {
        return Err(AppError::BadRequest("Price must be positive".to_string()));
    }
    let receipt = tx::execute(
        b.marketplace
            .change_listing_price(nft_address(b, category), token_id, price_wei),
        MARKET_FALLBACK_GAS,
        GAS_MULTIPLIER_PCT,
    )
    .await?;
    Ok(tx::outcome(&receipt))
}

pub async fn stats(b: &ContractBindings) -> Result<MarketStatsView> {
    let tax_percent_call = b.marketplace.default_tax_percent();
    let warrior_count_call = b.marketplace.get_character_listings_count(
        MARKET_ELEMENT_ANY,
        MARKET_LEVEL_ANY,
        MARKET_LEVEL_ANY,
    );
    let weapon_count_call = b
        .marketplace
        .get_weapon_listings_count(MARKET_ELEMENT_ANY, MARKET_RARITY_ANY);
    let warrior_allowed_call = b.marketplace.is_token_allowed(b.registry.warrior_nft);
    let weapon_allowed_call = b.marketplace.is_token_allowed(b.registry.weapon_nft);
    let (tax_percent, warrior_count, weapon_count, warrior_allowed, weapon_allowed) = tokio::try_join!(
        tax_percent_call.call(),
        warrior_count_call.call(),
        weapon_count_call.call(),
        warrior_allowed_call.call(),
        weapon_allowed_call.call(),
    )
    .map_err(|e| AppError::BlockchainRPC(format!("Market stats read failed: {}", e)))?;

    Ok(MarketStatsView {
        tax_percent: tax_percent.to_string(),
        total_listings: (warrior_count + weapon_count).as_u64(),
        warrior_trading_allowed: warrior_allowed,
        weapon_trading_allowed: weapon_allowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seller_marks_dead_listing() {
        assert!(!listing_is_live(&Address::zero()));
        let seller: Address = "0xc39Ecfd52984D25f554BA28cE5560FB692B47943"
            .parse()
            .unwrap();
        assert!(listing_is_live(&seller));
    }

    #[test]
    fn wildcard_defaults_match_contract_convention() {
        let query = BrowseQuery {
            category: None,
            page: None,
            element: None,
            min_level: None,
            max_level: None,
            rarity: None,
        };
        let resolved = query.resolved();
        assert_eq!(resolved.category, BrowseCategory::All);
        assert_eq!(resolved.page, 0);
        assert_eq!(resolved.element, 255);
        assert_eq!(resolved.min_level, 0);
        assert_eq!(resolved.max_level, 0);
        // Rarity 0 means unfiltered; weapons only have stars 0-4, so any
        // other wildcard would match nothing.
        assert_eq!(resolved.rarity, 0);
    }

    #[test]
    fn explicit_filters_pass_through_unchanged() {
        let query = BrowseQuery {
            category: Some(BrowseCategory::Weapon),
            page: Some(2),
            element: Some(3),
            min_level: Some(5),
            max_level: Some(10),
            rarity: Some(4),
        };
        let resolved = query.resolved();
        assert_eq!(resolved.category, BrowseCategory::Weapon);
        assert_eq!(resolved.page, 2);
        assert_eq!(resolved.element, 3);
        assert_eq!(resolved.min_level, 5);
        assert_eq!(resolved.max_level, 10);
        assert_eq!(resolved.rarity, 4);
    }

    #[test]
    fn listing_ids_carry_category_prefix() {
        assert_eq!(
            listing_id(ListingCategory::Warrior, U256::from(9)),
            "warrior-9"
        );
        assert_eq!(
            listing_id(ListingCategory::Weapon, U256::from(31)),
            "weapon-31"
        );
    }
}

//! Typed bindings and the address registry for the game contracts.
//!
//! The ABI fragments cover exactly the calls and events the gateway uses;
//! the contracts themselves are externally owned and deployed separately.

use ethers::contract::abigen;
use ethers::types::Address;

use crate::config::Config;
use crate::error::{AppError, Result};

abigen!(
    WarToken,
    r#"[
        function name() view returns (string)
        function balanceOf(address account) view returns (uint256)
        function allowance(address owner, address spender) view returns (uint256)
        function approve(address spender, uint256 amount) returns (bool)
    ]"#;

    WarriorNft,
    r#"[
        function mintWarrior() returns (uint256)
        function getMintPrice() view returns (uint256)
        function ownerOf(uint256 tokenId) view returns (address)
        function getApproved(uint256 tokenId) view returns (address)
        function approve(address to, uint256 tokenId)
        function getWarriorInfo(uint256 tokenId) view returns (uint256 level, uint256 power, uint256 experience, uint256 stamina, string elementName, uint256 battlesWon, uint256 battlesLost, uint256 requiredExp, uint256 progressPercentage)
        function getWarriorsByOwner(address owner) view returns (uint256[])
        function getContractStats() view returns (uint256 totalMinted, uint256 currentPrice)
        event WarriorMinted(uint256 indexed tokenId, address indexed owner, uint8 element)
    ]"#;

    WeaponNft,
    r#"[
        function balanceOf(address account, uint256 id) view returns (uint256)
        function setApprovalForAll(address operator, bool approved)
        function isApprovedForAll(address account, address operator) view returns (bool)
        function getMintPrice() view returns (uint256)
        function getWeaponInfo(uint256 weaponId) view returns (string name, string elementName, uint8 stars, uint16 stat1, uint16 stat2, uint16 stat3, uint8 level, uint256 basePower, uint256 equippedBy, string weaponType, uint8 currentDurability, uint8 maxDurability, bool broken)
        function getWeaponsByOwner(address owner) view returns (uint256[])
        function getDustSupplies(address user) view returns (uint32 low, uint32 four, uint32 five)
        function nextTokenId() view returns (uint256)
        function equipWeapon(uint256 weaponId, uint256 warriorId)
        function unequipWeapon(uint256 weaponId)
        function repairWeapon(uint256 weaponId) payable
        function burn(uint256 weaponId)
        function reforge(uint256 burnId, uint256 targetId)
        function reforgeWithDust(uint256 weaponId, uint32 lowDust, uint32 fourDust, uint32 fiveDust)
        event Burned(address indexed owner, uint256 indexed weaponId, uint256 dustGained, uint32 lowPoints, uint32 fourPoints, uint32 fivePoints)
    ]"#;

    WeaponBatchMinter,
    r#"[
        function mintWeaponsBatch(uint256 count, uint256 seed) returns (uint256[])
        event WeaponsBatchMinted(address indexed user, uint256 count, uint256[] weaponIds, uint256 totalCost)
    ]"#;

    BattleSystem,
    r#"[
        struct BattleRecord { address player; uint256 warriorId; uint256 weaponId; uint256 enemyId; bool victory; uint256 playerPower; uint256 enemyPower; uint256 elementMultiplier; uint256 reward; uint256 experienceGained; uint256 timestamp; uint256 winProbability; string elementRelation; uint256 randomSeed; }
        function startBattle(uint256 warriorId, uint256 weaponId, uint256 enemyId) returns (uint256 battleId)
        function getBattlePreview(uint256 warriorId, uint256 weaponId, uint256 enemyId) view returns (uint256 playerPower, uint256 enemyPower, uint256 winProbability, uint256 potentialReward, uint256 potentialExperience, string elementRelation, string adjustmentReason)
        function getCurrentStamina(uint256 warriorId) view returns (uint256)
        function getBattleStatistics(address player) view returns (uint256 totalBattles, uint256 wins, uint256 losses, uint256 totalRewards, uint256 totalExperience)
        function getRecommendedEnemies(uint256 warriorId) view returns (uint256[])
        function getPlayerBattleHistory(address player) view returns (BattleRecord[])
        function nextBattleId() view returns (uint256)
        function getContractConfig() view returns (uint256 reward, uint256 cooldown, uint256 stamina, uint256 experience)
        function setBaseExperience(uint256 newBaseExperience)
        function setBaseReward(uint256 newReward)
        function setStaminaCost(uint256 newCost)
        function setBattleCooldown(uint256 newCooldown)
        event BattleCompleted(uint256 indexed battleId, address indexed player, bool victory, uint256 playerPower, uint256 enemyPower, uint256 reward, uint256 experienceGained, uint256 randomSeed)
    ]"#;

    EnemyLibrary,
    r#"[
        struct EnemyTemplate { uint256 id; uint8 difficulty; uint8 element; uint256 basePower; uint256 rewardMultiplier; uint256 experienceReward; bool active; }
        function getEnemyDetails(uint256 enemyId) view returns (EnemyTemplate)
        function calculateEnemyPower(uint256 enemyId, uint256 playerTotalPower) view returns (uint256)
        function getEnemyCount() view returns (uint256)
    ]"#;

    GameManager,
    r#"[
        struct GameParams { uint256 warriorMintPrice; uint256 weaponMintPrice; uint256 baseBattleReward; uint256 battleCooldown; uint256 staminaCost; uint256 maxStamina; uint256 staminaRecoveryTime; }
        function GAME_ADMIN() view returns (bytes32)
        function DEFAULT_ADMIN_ROLE() view returns (bytes32)
        function hasRole(bytes32 role, address account) view returns (bool)
        function grantRole(bytes32 role, address account)
        function getGameParameters() view returns (GameParams)
        function setWarriorMintPrice(uint256 newPrice)
        function setWeaponMintPrice(uint256 newPrice)
        function setStaminaParams(uint256 _maxStamina, uint256 _recoveryTime)
        function setMintingEnabled(bool enabled)
        function setBattleEnabled(bool enabled)
        function setMarketplaceEnabled(bool enabled)
        function getFeatureStatus() view returns (bool _mintingEnabled, bool _battleEnabled, bool _marketplaceEnabled)
        function setMarketplaceFeeRate(uint256 newFeeRate)
        function pause()
        function unpause()
        function paused() view returns (bool)
    ]"#;

    Treasury,
    r#"[
        function deposit(uint256 amount) returns (bool)
        function withdraw(uint256 amount) returns (bool)
        function emergencyWithdraw()
        function getTreasuryBalance() view returns (uint256)
        function grantRole(bytes32 role, address account)
        function REWARD_DISTRIBUTOR_ROLE() view returns (bytes32)
    ]"#;

    Marketplace,
    r#"[
        function addListing(address _tokenAddress, uint256 _id, uint256 _price, uint256 _quantity)
        function cancelListing(address _tokenAddress, uint256 _id)
        function purchaseListing(address _tokenAddress, uint256 _id, uint256 _maxPrice)
        function changeListingPrice(address _tokenAddress, uint256 _id, uint256 _newPrice)
        function getSellerPrice(address _tokenAddress, uint256 _id) view returns (uint256)
        function getFinalPrice(address _tokenAddress, uint256 _id) view returns (uint256)
        function getTaxOnListing(address _tokenAddress, uint256 _id) view returns (uint256)
        function getSellerOfNftId(address _tokenAddress, uint256 _tokenId) view returns (address)
        function isTokenAllowed(address _tokenAddress) view returns (bool)
        function getNumberOfListingsForToken(address _tokenAddress) view returns (uint256)
        function getListingIdsBySeller(address _tokenAddress, address _seller) view returns (uint256[])
        function getCharacterListingsPage(uint8 _limit, uint256 _pageNumber, uint8 _element, uint8 _minLevel, uint8 _maxLevel) view returns (uint256[])
        function getWeaponListingsPage(uint8 _limit, uint256 _pageNumber, uint8 _element, uint8 _rarity) view returns (uint256[])
        function getCharacterListingsCount(uint8 _element, uint8 _minLevel, uint8 _maxLevel) view returns (uint256)
        function getWeaponListingsCount(uint8 _element, uint8 _rarity) view returns (uint256)
        function defaultTaxPercent() view returns (uint256)
    ]"#;
);

/// Checksummed addresses of every game contract, parsed once from config.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    pub war_token: Address,
    pub warrior_nft: Address,
    pub weapon_nft: Address,
    pub battle_system: Address,
    pub enemy_library: Address,
    pub game_manager: Address,
    pub treasury: Address,
    pub marketplace: Address,
    pub weapon_batch_minter: Option<Address>,
}

impl ContractRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            war_token: parse_address("WAR_TOKEN_ADDRESS", &config.war_token_address)?,
            warrior_nft: parse_address("WARRIOR_NFT_ADDRESS", &config.warrior_nft_address)?,
            weapon_nft: parse_address("WEAPON_NFT_ADDRESS", &config.weapon_nft_address)?,
            battle_system: parse_address("BATTLE_SYSTEM_ADDRESS", &config.battle_system_address)?,
            enemy_library: parse_address("ENEMY_LIBRARY_ADDRESS", &config.enemy_library_address)?,
            game_manager: parse_address("GAME_MANAGER_ADDRESS", &config.game_manager_address)?,
            treasury: parse_address("TREASURY_ADDRESS", &config.treasury_address)?,
            marketplace: parse_address("MARKETPLACE_ADDRESS", &config.marketplace_address)?,
            weapon_batch_minter: config
                .weapon_batch_minter_address
                .as_deref()
                .map(|addr| parse_address("WEAPON_BATCH_MINTER_ADDRESS", addr))
                .transpose()?,
        })
    }
}

fn parse_address(name: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Internal(format!("{} is not a valid address: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_accepts_hex() {
        let addr = parse_address("TEST", "0xc39Ecfd52984D25f554BA28cE5560FB692B47943").unwrap();
        assert_ne!(addr, Address::zero());
    }

    #[test]
    fn parse_address_rejects_garbage() {
        assert!(parse_address("TEST", "not-an-address").is_err());
        assert!(parse_address("TEST", "0x123").is_err());
    }
}

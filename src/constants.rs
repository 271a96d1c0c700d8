/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Chain
pub const REQUIRED_CHAIN_ID: u64 = 97; // BSC Testnet
pub const CHAIN_WATCH_INTERVAL_SECS: u64 = 15;
pub const RPC_TIMEOUT_SECS: u64 = 10;

// Gas configuration: estimates are padded by a percentage, and each
// operation carries a fixed fallback limit used when estimation reverts.
pub const GAS_MULTIPLIER_PCT: u64 = 150;
pub const BATTLE_GAS_MULTIPLIER_PCT: u64 = 120;
pub const TX_CONFIRMATIONS: usize = 1;

pub const WARRIOR_MINT_FALLBACK_GAS: u64 = 500_000;
pub const WEAPON_BATCH_MINT_FALLBACK_GAS: u64 = 5_000_000;
pub const EQUIP_FALLBACK_GAS: u64 = 300_000;
pub const UNEQUIP_FALLBACK_GAS: u64 = 200_000;
pub const REPAIR_FALLBACK_GAS: u64 = 300_000;
pub const BURN_FALLBACK_GAS: u64 = 300_000;
pub const REFORGE_FALLBACK_GAS: u64 = 400_000;
pub const DUST_REFORGE_FALLBACK_GAS: u64 = 500_000;
pub const BATTLE_FALLBACK_GAS: u64 = 2_000_000;
pub const APPROVE_FALLBACK_GAS: u64 = 100_000;

// Mint prices (whole WAR), used when the on-chain price read fails
pub const DEFAULT_WARRIOR_MINT_PRICE_WAR: u64 = 50;
pub const DEFAULT_WEAPON_MINT_PRICE_WAR: u64 = 10;

// Weapons
pub const RECENT_WEAPON_SCAN_WINDOW: u64 = 50;
pub const REPAIR_COST_PER_POINT: &str = "0.001"; // native token per missing point
pub const REFORGE_MIN_TARGET_STARS: u8 = 2;

// Dust reforge power gain per point
pub const DUST_POWER_LOW: u64 = 1;
pub const DUST_POWER_FOUR: u64 = 10;
pub const DUST_POWER_FIVE: u64 = 100;

// Marketplace. The element wildcard is 255; level and rarity wildcards
// are 0 (the contract treats 0 as "no filter" for those).
pub const MARKET_PAGE_SIZE: u8 = 12;
pub const MARKET_ELEMENT_ANY: u8 = 255;
pub const MARKET_RARITY_ANY: u8 = 0;
pub const MARKET_LEVEL_ANY: u8 = 0;
pub const MARKET_BUY_APPROVAL_WAR: u64 = 1_000_000;
pub const MARKET_FALLBACK_GAS: u64 = 500_000;

// Admin
pub const ADMIN_FALLBACK_GAS: u64 = 300_000;

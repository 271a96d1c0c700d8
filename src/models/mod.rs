// src/models/mod.rs
pub mod game;

pub use game::{
    ApiResponse,
    BattleOutcome,
    BattlePreviewView,
    BattleRecordView,
    BattleStatsView,
    Difficulty,
    DustBalance,
    Element,
    EnemyView,
    ListingCategory,
    MarketListingView,
    MarketStatsView,
    SessionState,
    SessionStatus,
    TxOutcome,
    WarriorView,
    WeaponCollectionView,
    WeaponStats,
    WeaponView,
};

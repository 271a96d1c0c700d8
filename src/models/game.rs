use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// The five elements, indexed the way the contracts report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// Contracts hand back element names as strings; anything unrecognized
    /// falls back to Wood, matching index 0.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Fire" => Element::Fire,
            "Earth" => Element::Earth,
            "Metal" => Element::Metal,
            "Water" => Element::Water,
            _ => Element::Wood,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Element::Fire,
            2 => Element::Earth,
            3 => Element::Metal,
            4 => Element::Water,
            _ => Element::Wood,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Element::Wood => 0,
            Element::Fire => 1,
            Element::Earth => 2,
            Element::Metal => 3,
            Element::Water => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Medium,
    Hard,
    Boss,
}

impl Difficulty {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Normal,
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            _ => Difficulty::Boss,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Boss => "Boss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub account: Option<String>,
    pub chain_id: Option<u64>,
    pub required_chain_id: u64,
}

/// Numeric warrior fields pass through as strings exactly as read; nothing
/// is clamped, so experience may exceed required_exp and the progress
/// percentage may exceed 100.
#[derive(Debug, Clone, Serialize)]
pub struct WarriorView {
    pub id: String,
    pub level: String,
    pub power: String,
    pub experience: String,
    pub required_exp: String,
    pub stamina: String,
    pub element: u8,
    pub element_name: String,
    pub battles_won: String,
    pub battles_lost: String,
    pub progress_percentage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponView {
    pub id: String,
    pub name: String,
    pub element: u8,
    pub element_name: String,
    pub stars: u8,
    pub stat1: u16,
    pub stat2: u16,
    pub stat3: u16,
    pub level: u8,
    pub base_power: String,
    pub equipped_by: String,
    pub weapon_type: String,
    pub current_durability: u8,
    pub max_durability: u8,
    pub broken: bool,
}

impl WeaponView {
    /// equipped_by holds the wearer's warrior id; "0" is the unequipped
    /// sentinel, never a real warrior.
    pub fn is_equipped(&self) -> bool {
        self.equipped_by != "0"
    }

    pub fn is_usable(&self) -> bool {
        !self.broken && self.current_durability > 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DustBalance {
    pub low: u32,
    pub four: u32,
    pub five: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponStats {
    pub total: usize,
    pub equipped: usize,
    pub broken: usize,
    pub high_star: usize,
    pub total_power: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponCollectionView {
    pub weapons: Vec<WeaponView>,
    pub stats: WeaponStats,
    pub dust: DustBalance,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    pub difficulty_name: String,
    pub element: u8,
    pub element_name: String,
    pub base_power: String,
    pub reward_multiplier: String,
    pub experience_reward: String,
    pub active: bool,
    pub calculated_power: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattlePreviewView {
    pub player_power: String,
    pub enemy_power: String,
    pub win_probability: String,
    pub potential_reward: String,
    pub potential_experience: String,
    pub element_relation: String,
    pub adjustment_reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleStatsView {
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: u32,
    pub total_rewards: String,
    pub total_experience: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleRecordView {
    pub warrior_id: String,
    pub weapon_id: String,
    pub enemy_id: String,
    pub victory: bool,
    pub player_power: String,
    pub enemy_power: String,
    pub win_probability: String,
    pub element_relation: String,
    pub reward: String,
    pub experience_gained: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleOutcome {
    pub victory: bool,
    pub reward: String,
    pub experience_gained: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Warrior,
    Weapon,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketListingView {
    pub id: String,
    pub category: ListingCategory,
    pub token_id: String,
    pub seller: String,
    pub price: String,
    pub tax: String,
    pub final_price: String,
    pub name: String,
    pub element: u8,
    pub power: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub stars: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketStatsView {
    pub tax_percent: String,
    pub total_listings: u64,
    pub warrior_trading_allowed: bool,
    pub weapon_trading_allowed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_name_round_trips() {
        for name in ["Wood", "Fire", "Earth", "Metal", "Water"] {
            assert_eq!(Element::from_name(name).name(), name);
        }
    }

    #[test]
    fn unknown_element_defaults_to_wood() {
        assert_eq!(Element::from_name("Aether"), Element::Wood);
        assert_eq!(Element::from_name(""), Element::Wood);
        assert_eq!(Element::from_index(9), Element::Wood);
    }

    #[test]
    fn equipped_sentinel_is_zero_string() {
        let mut weapon = WeaponView {
            id: "7".into(),
            name: "Iron Sword".into(),
            element: 3,
            element_name: "Metal".into(),
            stars: 1,
            stat1: 10,
            stat2: 20,
            stat3: 30,
            level: 1,
            base_power: "120".into(),
            equipped_by: "0".into(),
            weapon_type: "Sword".into(),
            current_durability: 20,
            max_durability: 20,
            broken: false,
        };
        assert!(!weapon.is_equipped());
        weapon.equipped_by = "3".into();
        assert!(weapon.is_equipped());
    }

    #[test]
    fn broken_or_drained_weapon_is_unusable() {
        let mut weapon = WeaponView {
            id: "1".into(),
            name: "Cracked Axe".into(),
            element: 0,
            element_name: "Wood".into(),
            stars: 0,
            stat1: 1,
            stat2: 1,
            stat3: 1,
            level: 1,
            base_power: "50".into(),
            equipped_by: "0".into(),
            weapon_type: "Axe".into(),
            current_durability: 0,
            max_durability: 20,
            broken: false,
        };
        assert!(!weapon.is_usable());
        weapon.current_durability = 5;
        assert!(weapon.is_usable());
        weapon.broken = true;
        assert!(!weapon.is_usable());
    }

    #[test]
    fn api_response_success_sets_flag() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
    }
}

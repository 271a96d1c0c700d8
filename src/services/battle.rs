//! Battle reads and execution.

use ethers::types::U256;

use crate::constants::{BATTLE_FALLBACK_GAS, BATTLE_GAS_MULTIPLIER_PCT};
use crate::contracts::BattleCompletedFilter;
use crate::error::{AppError, Result};
use crate::models::{
    BattleOutcome, BattlePreviewView, BattleRecordView, BattleStatsView, Difficulty, Element,
    EnemyView, TxOutcome,
};
use crate::services::tx;
use crate::session::ContractBindings;
use crate::utils::{format_war, format_whole_tokens};

/// Recommended enemies for a warrior, with power scaled to the warrior where
/// the library supports it. Inactive or unreadable enemies are dropped.
pub async fn recommended_enemies(b: &ContractBindings, warrior_id: U256) -> Result<Vec<EnemyView>> {
    let (_, warrior_power, ..) = b
        .warrior_nft
        .get_warrior_info(warrior_id)
        .call()
        .await
        .map_err(|e| {
            AppError::BlockchainRPC(format!("getWarriorInfo({}) failed: {}", warrior_id, e))
        })?;

    let enemy_ids = b
        .battle_system
        .get_recommended_enemies(warrior_id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getRecommendedEnemies failed: {}", e)))?;

    let mut enemies = Vec::with_capacity(enemy_ids.len());
    for enemy_id in enemy_ids {
        match load_enemy(b, enemy_id, warrior_power).await {
            Ok(enemy) => enemies.push(enemy),
            Err(e) => {
                tracing::debug!(enemy_id = %enemy_id, "Skipping unreadable enemy: {}", e);
            }
        }
    }
    Ok(enemies)
}

async fn load_enemy(b: &ContractBindings, enemy_id: U256, warrior_power: U256) -> Result<EnemyView> {
    let template = b
        .enemy_library
        .get_enemy_details(enemy_id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getEnemyDetails({}) failed: {}", enemy_id, e)))?;

    // Power scaling is optional in the library; the template base power is
    // the fallback.
    // EnemyTemplate tuple: (id, difficulty, element, basePower,
    // rewardMultiplier, experienceReward, active)
    let calculated_power = b
        .enemy_library
        .calculate_enemy_power(enemy_id, warrior_power)
        .call()
        .await
        .unwrap_or(template.3);

    let element = Element::from_index(template.2);
    let difficulty = Difficulty::from_index(template.1);
    Ok(EnemyView {
        id: enemy_id.to_string(),
        name: format!("{} {} #{}", element.name(), difficulty.name(), enemy_id),
        description: format!(
            "A {} enemy with {} element.",
            difficulty.name(),
            element.name()
        ),
        difficulty: template.1,
        difficulty_name: difficulty.name().to_string(),
        element: element.index(),
        element_name: element.name().to_string(),
        base_power: template.3.to_string(),
        reward_multiplier: template.4.to_string(),
        experience_reward: format_whole_tokens(template.5),
        active: template.6,
        calculated_power: calculated_power.to_string(),
    })
}

pub async fn preview(
    b: &ContractBindings,
    warrior_id: U256,
    weapon_id: U256,
    enemy_id: U256,
) -> Result<BattlePreviewView> {
    let (player_power, enemy_power, win_probability, reward, experience, relation, reason) = b
        .battle_system
        .get_battle_preview(warrior_id, weapon_id, enemy_id)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getBattlePreview failed: {}", e)))?;

    Ok(BattlePreviewView {
        player_power: player_power.to_string(),
        enemy_power: enemy_power.to_string(),
        win_probability: win_probability.to_string(),
        potential_reward: format_war(reward),
        potential_experience: format_whole_tokens(experience),
        element_relation: relation,
        adjustment_reason: reason,
    })
}

/// Run a battle. The outcome comes from the BattleCompleted event; the
/// confirmed receipt is final, so no follow-up polling happens.
pub async fn execute_battle(
    b: &ContractBindings,
    warrior_id: U256,
    weapon_id: U256,
    enemy_id: U256,
) -> Result<(TxOutcome, Option<BattleOutcome>)> {
    let receipt = tx::execute(
        b.battle_system.start_battle(warrior_id, weapon_id, enemy_id),
        BATTLE_FALLBACK_GAS,
        BATTLE_GAS_MULTIPLIER_PCT,
    )
    .await?;

    let outcome = tx::find_event::<BattleCompletedFilter>(&receipt).map(|ev| BattleOutcome {
        victory: ev.victory,
        reward: format_war(ev.reward),
        experience_gained: format_whole_tokens(ev.experience_gained),
    });
    if outcome.is_none() {
        tracing::debug!("Battle receipt carried no BattleCompleted event");
    }
    Ok((tx::outcome(&receipt), outcome))
}

pub async fn stats(b: &ContractBindings) -> Result<BattleStatsView> {
    let (total, wins, losses, rewards, experience) = b
        .battle_system
        .get_battle_statistics(b.account)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getBattleStatistics failed: {}", e)))?;

    Ok(BattleStatsView {
        total: total.as_u64(),
        wins: wins.as_u64(),
        losses: losses.as_u64(),
        win_rate: win_rate(wins.as_u64(), total.as_u64()),
        total_rewards: format_war(rewards),
        total_experience: format_whole_tokens(experience),
    })
}

/// Win percentage rounded to the nearest whole point; zero battles is 0%.
fn win_rate(wins: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((wins as f64 / total as f64) * 100.0).round() as u32
}

/// Battle history, newest first.
pub async fn history(b: &ContractBindings) -> Result<Vec<BattleRecordView>> {
    let mut records = b
        .battle_system
        .get_player_battle_history(b.account)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("getPlayerBattleHistory failed: {}", e)))?;
    records.reverse();

    Ok(records
        .into_iter()
        // BattleRecord tuple: (player, warriorId, weaponId, enemyId, victory,
        // playerPower, enemyPower, elementMultiplier, reward,
        // experienceGained, timestamp, winProbability, elementRelation,
        // randomSeed)
        .map(|r| BattleRecordView {
            warrior_id: r.1.to_string(),
            weapon_id: r.2.to_string(),
            enemy_id: r.3.to_string(),
            victory: r.4,
            player_power: r.5.to_string(),
            enemy_power: r.6.to_string(),
            win_probability: r.11.to_string(),
            element_relation: r.12,
            reward: format_war(r.8),
            experience_gained: format_whole_tokens(r.9),
            timestamp: r.10.as_u64(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_rounds_to_nearest_point() {
        assert_eq!(win_rate(0, 0), 0);
        assert_eq!(win_rate(1, 3), 33);
        assert_eq!(win_rate(2, 3), 67);
        assert_eq!(win_rate(5, 5), 100);
    }
}

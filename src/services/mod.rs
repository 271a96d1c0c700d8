// All service modules
pub mod admin;
pub mod battle;
pub mod market;
pub mod tx;
pub mod warriors;
pub mod weapons;

use std::sync::Arc;
use std::time::Duration;

use ethers::providers::Middleware;

use crate::constants::CHAIN_WATCH_INTERVAL_SECS;
use crate::session::WalletSession;

// Internal helper that checks conditions for `is_env_flag_enabled`.
fn is_env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

/// Start all background services
pub async fn start_background_services(session: Arc<WalletSession>) {
    tracing::info!("Starting background services...");

    let enable_chain_watcher = if std::env::var("ENABLE_CHAIN_WATCHER").is_ok() {
        is_env_flag_enabled("ENABLE_CHAIN_WATCHER")
    } else {
        true
    };
    if enable_chain_watcher {
        tokio::spawn(chain_watcher(session));
    } else {
        tracing::warn!("Chain watcher disabled via ENABLE_CHAIN_WATCHER");
    }

    tracing::info!("All background services started successfully");
}

/// Polls the chain id behind the active session and force-disconnects if the
/// node no longer serves the required chain. Transient RPC failures are not
/// treated as a network switch.
async fn chain_watcher(session: Arc<WalletSession>) {
    let mut interval = tokio::time::interval(Duration::from_secs(CHAIN_WATCH_INTERVAL_SECS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let bindings = match session.bindings().await {
            Ok(b) => b,
            Err(_) => continue,
        };

        match bindings.client.get_chainid().await {
            Ok(chain_id) => {
                let chain_id = chain_id.as_u64();
                let required = session.config().required_chain_id;
                if chain_id != required {
                    tracing::warn!(
                        chain_id,
                        required,
                        "Chain id changed under the session, disconnecting"
                    );
                    session.disconnect().await;
                }
            }
            Err(e) => {
                tracing::debug!("Chain watcher poll failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_flag_parses_common_truthy_values() {
        std::env::set_var("FEB_TEST_FLAG_ON", " Yes ");
        std::env::set_var("FEB_TEST_FLAG_OFF", "0");
        assert!(is_env_flag_enabled("FEB_TEST_FLAG_ON"));
        assert!(!is_env_flag_enabled("FEB_TEST_FLAG_OFF"));
        assert!(!is_env_flag_enabled("FEB_TEST_FLAG_MISSING"));
    }
}

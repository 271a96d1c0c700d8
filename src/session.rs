//! Wallet session manager.
//!
//! Owns the signer, the provider and the typed contract handles. Contract
//! handles exist only while the session is connected; a wrong network is
//! rejected before any handle is created.

use std::sync::Arc;
use std::time::Duration;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::constants::RPC_TIMEOUT_SECS;
use crate::contracts::{
    BattleSystem, ContractRegistry, EnemyLibrary, GameManager, Marketplace, Treasury, WarToken,
    WarriorNft, WeaponBatchMinter, WeaponNft,
};
use crate::error::{AppError, Result};
use crate::models::{SessionState, SessionStatus};

pub type GameClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Which weapon enumeration path the deployed WeaponNFT supports.
/// Probed once per session, cleared on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponDiscovery {
    OwnerIndex,
    ReverseScan,
}

pub struct ContractBindings {
    pub account: Address,
    pub chain_id: u64,
    pub client: Arc<GameClient>,
    pub registry: ContractRegistry,
    pub war_token: WarToken<GameClient>,
    pub warrior_nft: WarriorNft<GameClient>,
    pub weapon_nft: WeaponNft<GameClient>,
    pub battle_system: BattleSystem<GameClient>,
    pub enemy_library: EnemyLibrary<GameClient>,
    pub game_manager: GameManager<GameClient>,
    pub treasury: Treasury<GameClient>,
    pub marketplace: Marketplace<GameClient>,
    pub weapon_batch_minter: Option<WeaponBatchMinter<GameClient>>,
}

enum Inner {
    Uninitialized,
    Connecting,
    Connected(Arc<ContractBindings>),
    Disconnected,
}

pub struct WalletSession {
    config: Config,
    state: RwLock<Inner>,
    weapon_discovery: RwLock<Option<WeaponDiscovery>>,
}

impl WalletSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RwLock::new(Inner::Uninitialized),
            weapon_discovery: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Establish the session: requires a configured key, verifies the chain
    /// id against the required one, then binds every contract handle.
    pub async fn connect(&self) -> Result<SessionStatus> {
        let key = self
            .config
            .wallet_private_key
            .clone()
            .ok_or(AppError::WalletUnavailable)?;

        *self.state.write().await = Inner::Connecting;

        match self.establish(&key).await {
            Ok(bindings) => {
                let status = SessionStatus {
                    state: SessionState::Connected,
                    account: Some(format!("{:?}", bindings.account)),
                    chain_id: Some(bindings.chain_id),
                    required_chain_id: self.config.required_chain_id,
                };
                *self.weapon_discovery.write().await = None;
                *self.state.write().await = Inner::Connected(bindings);
                Ok(status)
            }
            Err(e) => {
                *self.state.write().await = Inner::Disconnected;
                Err(e)
            }
        }
    }

    async fn establish(&self, key: &str) -> Result<Arc<ContractBindings>> {
        let provider = Provider::<Http>::try_from(self.config.rpc_url.as_str())
            .map_err(|e| AppError::BlockchainRPC(format!("Invalid RPC URL: {}", e)))?;

        let chain_id = tokio::time::timeout(
            Duration::from_secs(RPC_TIMEOUT_SECS),
            provider.get_chainid(),
        )
        .await
        .map_err(|_| AppError::BlockchainRPC("Timed out querying chain id".to_string()))?
        .map_err(|e| AppError::BlockchainRPC(format!("Failed to query chain id: {}", e)))?
        .as_u64();

        if chain_id != self.config.required_chain_id {
            return Err(AppError::WrongNetwork {
                expected: self.config.required_chain_id,
                actual: chain_id,
            });
        }

        let wallet: LocalWallet = key
            .parse()
            .map_err(|e| AppError::Internal(format!("WALLET_PRIVATE_KEY is invalid: {}", e)))?;
        let wallet = wallet.with_chain_id(chain_id);
        let account = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let registry = ContractRegistry::from_config(&self.config)?;

        let bindings = ContractBindings {
            account,
            chain_id,
            client: client.clone(),
            war_token: WarToken::new(registry.war_token, client.clone()),
            warrior_nft: WarriorNft::new(registry.warrior_nft, client.clone()),
            weapon_nft: WeaponNft::new(registry.weapon_nft, client.clone()),
            battle_system: BattleSystem::new(registry.battle_system, client.clone()),
            enemy_library: EnemyLibrary::new(registry.enemy_library, client.clone()),
            game_manager: GameManager::new(registry.game_manager, client.clone()),
            treasury: Treasury::new(registry.treasury, client.clone()),
            marketplace: Marketplace::new(registry.marketplace, client.clone()),
            weapon_batch_minter: registry
                .weapon_batch_minter
                .map(|addr| WeaponBatchMinter::new(addr, client.clone())),
            registry,
        };

        tracing::info!(
            account = %format!("{:?}", account),
            chain_id,
            "Wallet session connected"
        );

        Ok(Arc::new(bindings))
    }

    pub async fn disconnect(&self) {
        *self.state.write().await = Inner::Disconnected;
        *self.weapon_discovery.write().await = None;
        tracing::info!("Wallet session disconnected");
    }

    /// Contract handles for the current session; fails when not connected.
    pub async fn bindings(&self) -> Result<Arc<ContractBindings>> {
        match &*self.state.read().await {
            Inner::Connected(bindings) => Ok(bindings.clone()),
            _ => Err(AppError::NotConnected),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let (state, account, chain_id) = match &*self.state.read().await {
            Inner::Uninitialized => (SessionState::Uninitialized, None, None),
            Inner::Connecting => (SessionState::Connecting, None, None),
            Inner::Connected(b) => (
                SessionState::Connected,
                Some(format!("{:?}", b.account)),
                Some(b.chain_id),
            ),
            Inner::Disconnected => (SessionState::Disconnected, None, None),
        };
        SessionStatus {
            state,
            account,
            chain_id,
            required_chain_id: self.config.required_chain_id,
        }
    }

    pub async fn weapon_discovery(&self) -> Option<WeaponDiscovery> {
        *self.weapon_discovery.read().await
    }

    pub async fn set_weapon_discovery(&self, mode: WeaponDiscovery) {
        *self.weapon_discovery.write().await = Some(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(key: Option<&str>) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            required_chain_id: 97,
            wallet_private_key: key.map(|k| k.to_string()),
            war_token_address: "0xc39Ecfd52984D25f554BA28cE5560FB692B47943".to_string(),
            warrior_nft_address: "0x843f09f889A6eaA39B7f3c8d77B11FcDCD665324".to_string(),
            weapon_nft_address: "0xE8f314919a09d7F612231a6FDd5CeAE509145944".to_string(),
            battle_system_address: "0x28ce9fec4E72C9e0De31c572c087c33eb78999ff".to_string(),
            enemy_library_address: "0x72F9A41f0398B0ebBE91e1bf56905cF732E9a74D".to_string(),
            game_manager_address: "0xf69f91E1784574aDDCaCaf91b208428E5Be948f5".to_string(),
            treasury_address: "0x76564BCe24bAA0b4882F4cBeD7f32Ae5BaA5526E".to_string(),
            marketplace_address: "0xf9D2067aD9A20a38683f7975C325EA932539974F".to_string(),
            weapon_batch_minter_address: None,
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[tokio::test]
    async fn fresh_session_is_uninitialized_and_unbound() {
        let session = WalletSession::new(test_config(None));
        let status = session.status().await;
        assert_eq!(status.state, SessionState::Uninitialized);
        assert!(status.account.is_none());
        assert!(matches!(
            session.bindings().await,
            Err(AppError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_without_key_fails_and_leaves_no_bindings() {
        let session = WalletSession::new(test_config(None));
        assert!(matches!(
            session.connect().await,
            Err(AppError::WalletUnavailable)
        ));
        assert!(matches!(
            session.bindings().await,
            Err(AppError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn disconnect_clears_discovery_cache() {
        let session = WalletSession::new(test_config(None));
        session
            .set_weapon_discovery(WeaponDiscovery::OwnerIndex)
            .await;
        assert_eq!(
            session.weapon_discovery().await,
            Some(WeaponDiscovery::OwnerIndex)
        );
        session.disconnect().await;
        assert!(session.weapon_discovery().await.is_none());
        assert_eq!(session.status().await.state, SessionState::Disconnected);
    }
}

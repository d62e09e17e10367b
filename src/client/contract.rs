use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Wei per ether
const ETHER_DECIMALS: usize = 18;

/// On-chain record of one wagered game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub creator: String,
    pub joiner: Option<String>,
    pub bet_amount_wei: u128,
    pub is_active: bool,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("contract write not ready")]
    ContractWriteNotReady,

    #[error("game {0} not found")]
    GameNotFound(String),

    #[error("invalid ether amount {0:?}")]
    InvalidAmount(String),

    #[error("contract call rejected: {0}")]
    Rejected(String),
}

/// The wager contract as seen from a client. Implementations talk to a
/// wallet or node; the relay itself never touches it.
pub trait GameContract: Send + Sync + 'static {
    fn create_game(
        &self,
        game_id: &str,
        value_wei: u128,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;

    fn join_game(
        &self,
        game_id: &str,
        value_wei: u128,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;

    fn end_game(
        &self,
        game_id: &str,
        winner: &str,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;

    fn get_game(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<Option<GameRecord>, ContractError>> + Send;
}

/// Game-flow helpers over an optional contract writer. The wallet counts as
/// connected exactly when a writer is present; without one every write fails
/// straight away with [`ContractError::ContractWriteNotReady`].
pub struct ContractHooks<C> {
    contract: Option<Arc<C>>,
}

impl<C: GameContract> ContractHooks<C> {
    pub fn new(contract: Option<Arc<C>>) -> Self {
        Self { contract }
    }

    pub fn disconnected() -> Self {
        Self { contract: None }
    }

    pub fn is_wallet_connected(&self) -> bool {
        self.contract.is_some()
    }

    pub async fn create_new_game(&self, game_id: &str, bet_amount: f64) -> Result<(), ContractError> {
        let contract = self.writer()?;
        let value = parse_ether(&bet_amount.to_string())?;
        contract.create_game(game_id, value).await?;
        info!(game_id, value_wei = %value, "Created game on chain");
        Ok(())
    }

    /// Join a game the creator already registered on chain
    pub async fn join_existing_game(&self, game_id: &str, bet_amount: f64) -> Result<(), ContractError> {
        let contract = self.writer()?;
        if contract.get_game(game_id).await?.is_none() {
            return Err(ContractError::GameNotFound(game_id.to_string()));
        }
        let value = parse_ether(&bet_amount.to_string())?;
        contract.join_game(game_id, value).await?;
        info!(game_id, value_wei = %value, "Joined game on chain");
        Ok(())
    }

    pub async fn end_current_game(&self, game_id: &str, winner: &str) -> Result<(), ContractError> {
        let contract = self.writer()?;
        contract.end_game(game_id, winner).await?;
        info!(game_id, winner, "Ended game on chain");
        Ok(())
    }

    /// Settle the game in the background. The outcome is only logged; the
    /// board has already moved on by the time the write lands.
    pub fn spawn_end_game(
        &self,
        game_id: String,
        winner: String,
    ) -> Result<JoinHandle<()>, ContractError> {
        let contract = self.writer()?.clone();
        Ok(tokio::spawn(async move {
            match contract.end_game(&game_id, &winner).await {
                Ok(()) => info!(game_id, winner, "Ended game on chain"),
                Err(e) => warn!(game_id, winner, error = %e, "Failed to end game on chain"),
            }
        }))
    }

    fn writer(&self) -> Result<&Arc<C>, ContractError> {
        self.contract
            .as_ref()
            .ok_or(ContractError::ContractWriteNotReady)
    }
}

/// Convert a decimal ether amount such as `"0.01"` to wei without going
/// through floating point
pub fn parse_ether(amount: &str) -> Result<u128, ContractError> {
    let invalid = || ContractError::InvalidAmount(amount.to_string());
    let trimmed = amount.trim();

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
        || frac.len() > ETHER_DECIMALS
    {
        return Err(invalid());
    }

    let scale = 10u128.pow(ETHER_DECIMALS as u32);
    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(invalid)?
    };
    let frac_wei = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = ETHER_DECIMALS);
        padded.parse::<u128>().map_err(|_| invalid())?
    };

    whole_wei.checked_add(frac_wei).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeContract {
        games: Mutex<HashMap<String, GameRecord>>,
        ended: Mutex<Vec<(String, String)>>,
    }

    impl GameContract for FakeContract {
        async fn create_game(&self, game_id: &str, value_wei: u128) -> Result<(), ContractError> {
            self.games.lock().unwrap().insert(
                game_id.to_string(),
                GameRecord {
                    creator: "0xcreator".to_string(),
                    joiner: None,
                    bet_amount_wei: value_wei,
                    is_active: true,
                    winner: None,
                },
            );
            Ok(())
        }

        async fn join_game(&self, game_id: &str, value_wei: u128) -> Result<(), ContractError> {
            let mut games = self.games.lock().unwrap();
            let record = games
                .get_mut(game_id)
                .ok_or_else(|| ContractError::GameNotFound(game_id.to_string()))?;
            if record.bet_amount_wei != value_wei {
                return Err(ContractError::Rejected("bet mismatch".to_string()));
            }
            record.joiner = Some("0xjoiner".to_string());
            Ok(())
        }

        async fn end_game(&self, game_id: &str, winner: &str) -> Result<(), ContractError> {
            self.ended
                .lock()
                .unwrap()
                .push((game_id.to_string(), winner.to_string()));
            Ok(())
        }

        async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, ContractError> {
            Ok(self.games.lock().unwrap().get(game_id).cloned())
        }
    }

    fn connected() -> (Arc<FakeContract>, ContractHooks<FakeContract>) {
        let contract = Arc::new(FakeContract::default());
        (contract.clone(), ContractHooks::new(Some(contract)))
    }

    #[test]
    fn parse_ether_is_exact() {
        assert_eq!(parse_ether("1").unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_ether("0.01").unwrap(), 10_000_000_000_000_000);
        assert_eq!(parse_ether(".5").unwrap(), 500_000_000_000_000_000);
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn parse_ether_rejects_garbage() {
        for bad in ["", ".", "-1", "1e3", "abc", "0.0000000000000000001"] {
            assert!(
                matches!(parse_ether(bad), Err(ContractError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn writes_fail_without_a_wallet() {
        let hooks = ContractHooks::<FakeContract>::disconnected();

        assert!(!hooks.is_wallet_connected());
        assert_eq!(
            hooks.create_new_game("ab12", 0.01).await,
            Err(ContractError::ContractWriteNotReady)
        );
        assert_eq!(
            hooks.end_current_game("ab12", "0xwinner").await,
            Err(ContractError::ContractWriteNotReady)
        );
        assert!(matches!(
            hooks.spawn_end_game("ab12".to_string(), "0xwinner".to_string()),
            Err(ContractError::ContractWriteNotReady)
        ));
    }

    #[tokio::test]
    async fn join_requires_an_existing_game() {
        let (_, hooks) = connected();
        assert!(hooks.is_wallet_connected());

        assert_eq!(
            hooks.join_existing_game("nope", 0.01).await,
            Err(ContractError::GameNotFound("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn create_then_join_with_matching_bet() {
        let (contract, hooks) = connected();

        hooks.create_new_game("ab12", 0.01).await.unwrap();
        hooks.join_existing_game("ab12", 0.01).await.unwrap();

        let record = contract.get_game("ab12").await.unwrap().unwrap();
        assert_eq!(record.bet_amount_wei, 10_000_000_000_000_000);
        assert_eq!(record.joiner.as_deref(), Some("0xjoiner"));
    }

    #[tokio::test]
    async fn spawned_end_game_reaches_the_contract() {
        let (contract, hooks) = connected();

        hooks
            .spawn_end_game("ab12".to_string(), "0xwinner".to_string())
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            *contract.ended.lock().unwrap(),
            vec![("ab12".to_string(), "0xwinner".to_string())]
        );
    }
}

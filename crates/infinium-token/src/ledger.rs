use crate::types::Amount;
use anyhow::{bail, Result};
use infinium_crypto::Address;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

struct LedgerState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

/// The INF balance ledger. All mutations run one at a time behind a single
/// write lock, so every operation is atomic: it either applies in full or
/// returns an error having changed nothing.
pub struct TokenLedger {
    state: RwLock<LedgerState>,
}

impl TokenLedger {
    /// Mints the entire fixed supply to one genesis holder.
    pub fn with_genesis(holder: Address, supply: Amount) -> Result<Self> {
        if supply > Amount::MAX_SUPPLY {
            bail!("genesis supply {} exceeds max supply", supply);
        }
        let mut balances = HashMap::new();
        balances.insert(holder, supply);
        info!(holder = %holder, supply = %supply, "🪙 Genesis supply minted");
        Ok(Self {
            state: RwLock::new(LedgerState {
                balances,
                allowances: HashMap::new(),
                total_supply: supply,
            }),
        })
    }

    pub async fn total_supply(&self) -> Amount {
        self.state.read().await.total_supply
    }

    pub async fn balance_of(&self, account: Address) -> Amount {
        self.state
            .read()
            .await
            .balances
            .get(&account)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.state
            .read()
            .await
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Moves `amount` from `from` to `to`.
    pub async fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<()> {
        if amount == Amount::ZERO {
            return Ok(());
        }
        if from == to {
            bail!("cannot transfer to the same address");
        }

        let mut state = self.state.write().await;
        Self::move_balance(&mut state, from, to, amount)?;

        info!(from = %from, to = %to, amount = %amount, "💸 Transfer");
        Ok(())
    }

    /// Grants `spender` the right to pull up to `amount` from `owner`.
    pub async fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<()> {
        if owner == spender {
            bail!("cannot approve self");
        }
        let mut state = self.state.write().await;
        state.allowances.insert((owner, spender), amount);
        debug!(owner = %owner, spender = %spender, amount = %amount, "Allowance set");
        Ok(())
    }

    /// Spender-initiated transfer out of `from`, consuming allowance.
    pub async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        if amount == Amount::ZERO {
            return Ok(());
        }
        if from == to {
            bail!("cannot transfer to the same address");
        }

        let mut state = self.state.write().await;
        let allowed = state
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or(Amount::ZERO);
        let remaining = allowed.checked_sub(amount).ok_or_else(|| {
            anyhow::anyhow!(
                "insufficient allowance for {}: allowed {}, needs {}",
                spender,
                allowed,
                amount
            )
        })?;

        Self::move_balance(&mut state, from, to, amount)?;
        state.allowances.insert((from, spender), remaining);

        info!(spender = %spender, from = %from, to = %to, amount = %amount, "💸 TransferFrom");
        Ok(())
    }

    fn move_balance(
        state: &mut LedgerState,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let from_balance = state.balances.get(&from).copied().unwrap_or(Amount::ZERO);
        let new_from = from_balance.checked_sub(amount).ok_or_else(|| {
            anyhow::anyhow!(
                "insufficient balance for {}: has {}, needs {}",
                from,
                from_balance,
                amount
            )
        })?;
        let to_balance = state.balances.get(&to).copied().unwrap_or(Amount::ZERO);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("balance overflow for {}", to))?;

        state.balances.insert(from, new_from);
        state.balances.insert(to, new_to);
        Ok(())
    }
}

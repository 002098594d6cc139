//! Shared context the handler set runs against.

use std::sync::Arc;

use pegbridge_db::TrackerDatabase;
use pegbridge_ledger_types::{BalanceLedger, Coin, Currency, CurrencyRegistry, LedgerAmount, LedgerError};
use pegbridge_params::{ChainParams, FeeParams};
use pegbridge_primitives::prelude::*;
use pegbridge_tracker_types::ParticipantEntry;
use pegbridge_txs::TxError;

/// Supplies the current ordered validator set.
///
/// Handlers capture a snapshot of this set when a process starts; the live
/// set is never consulted again for that process instance.
pub trait ValidatorSetProvider: Send + Sync + 'static {
    fn current_set(&self) -> Vec<ParticipantEntry>;
}

/// Everything a handler needs: the shared stores, collaborator interfaces and
/// runtime parameters. Built once at startup and passed by reference into the
/// handler set.
#[derive(Clone)]
pub struct HandlerContext {
    trackers: Arc<dyn TrackerDatabase>,
    balances: Arc<dyn BalanceLedger>,
    currencies: Arc<CurrencyRegistry>,
    validators: Arc<dyn ValidatorSetProvider>,
    fee_params: FeeParams,
    chain_params: ChainParams,

    /// Ledger account mirroring the total minted pegged supply.
    supply_account: AccountAddress,
}

impl HandlerContext {
    pub fn new(
        trackers: Arc<dyn TrackerDatabase>,
        balances: Arc<dyn BalanceLedger>,
        currencies: Arc<CurrencyRegistry>,
        validators: Arc<dyn ValidatorSetProvider>,
        fee_params: FeeParams,
        chain_params: ChainParams,
        supply_account: AccountAddress,
    ) -> Self {
        Self {
            trackers,
            balances,
            currencies,
            validators,
            fee_params,
            chain_params,
            supply_account,
        }
    }

    pub fn trackers(&self) -> &Arc<dyn TrackerDatabase> {
        &self.trackers
    }

    pub fn balances(&self) -> &Arc<dyn BalanceLedger> {
        &self.balances
    }

    pub fn validators(&self) -> &Arc<dyn ValidatorSetProvider> {
        &self.validators
    }

    pub fn fee_params(&self) -> &FeeParams {
        &self.fee_params
    }

    pub fn supply_account(&self) -> &AccountAddress {
        &self.supply_account
    }

    /// Resolves the pegged asset's currency record.
    pub fn asset_currency(&self) -> Result<&Currency, TxError> {
        self.currencies
            .by_name(&self.chain_params.asset)
            .ok_or_else(|| {
                TxError::Ledger(LedgerError::UnknownCurrency(self.chain_params.asset.clone()))
            })
    }

    /// The minimum acceptable fee under the configured policy.
    pub fn min_fee(&self) -> Result<Coin, TxError> {
        let currency = self
            .currencies
            .by_name(&self.fee_params.fee_currency)
            .ok_or_else(|| {
                TxError::Ledger(LedgerError::UnknownCurrency(
                    self.fee_params.fee_currency.clone(),
                ))
            })?;
        let units = self.fee_params.min_fee_units(currency.decimals());
        Ok(Coin::new(currency.name(), LedgerAmount::new(units)))
    }
}

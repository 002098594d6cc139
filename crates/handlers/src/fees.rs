//! Size-proportional fee processing.

use pegbridge_ledger_types::{Coin, LedgerAmount, LedgerError};
use pegbridge_primitives::prelude::*;
use pegbridge_txs::{Response, SignedTx, TxError};

use crate::context::HandlerContext;

/// Deducts a fee proportional to payload size with a per-type multiplier.
///
/// Gas used is `size * multiplier`, bounded by the envelope's gas offer; the
/// charge is the offered price per gas times the gas used, debited from the
/// first envelope signer.
pub fn basic_fee_handling(
    ctx: &HandlerContext,
    stx: &SignedTx,
    size: u64,
    multiplier: u64,
) -> Result<Response, TxError> {
    let fee = &stx.raw.fee;
    let gas_used = size.saturating_mul(multiplier);
    if gas_used > fee.gas {
        return Err(TxError::InsufficientFee(format!(
            "gas offer {} below required {gas_used}",
            fee.gas
        )));
    }

    let payer = stx
        .signatures
        .first()
        .map(|s| AccountAddress::from_pubkey(&s.pubkey))
        .ok_or_else(|| TxError::MissingData("no fee payer signature".to_owned()))?;

    let charge_units = fee
        .price
        .amount()
        .to_u128()
        .checked_mul(gas_used as u128)
        .ok_or(TxError::Ledger(LedgerError::Overflow))?;
    let charge = Coin::new(fee.price.currency(), LedgerAmount::new(charge_units));
    ctx.balances().sub_from_address(&payer, &charge)?;

    Ok(Response {
        log: format!("fee deducted: {charge}"),
        gas_wanted: fee.gas,
        gas_used,
        ..Default::default()
    })
}

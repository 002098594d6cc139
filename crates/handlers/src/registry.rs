//! The four-operation handler contract and the dispatch registry.

use std::collections::BTreeMap;

use pegbridge_txs::{KvPair, RawTx, Response, SignedTx, TxError, TxType};
use tracing::warn;

use crate::{
    broadcast_success::BroadcastSuccessHandler, context::HandlerContext, finality::FinalityHandler,
    lock::LockHandler, redeem::RedeemHandler,
};

/// The uniform contract every bridge transaction kind implements.
pub trait TxHandler: Send + Sync {
    fn tx_type(&self) -> TxType;

    /// Stateless structural checks; must not mutate any store.
    fn validate(&self, ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError>;

    /// Speculative application for pre-acceptance filtering; never commits.
    fn process_check(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError>;

    /// Authoritative application; the single commit point.
    fn process_deliver(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError>;

    /// Deducts a fee proportional to payload size.
    fn process_fee(&self, ctx: &HandlerContext, stx: &SignedTx, size: u64)
        -> Result<Response, TxError>;
}

/// Boolean-success outcome reported to the surrounding pipeline.
#[derive(Clone, Debug)]
pub struct TxOutcome {
    pub success: bool,
    pub response: Response,
}

/// Explicit process-wide handler registry, built once at startup.
///
/// Dispatches by the type tag carried in the envelope and converts handler
/// errors into non-fatal boolean-false outcomes with a descriptive log; the
/// outer pipeline rejects the one transaction, it does not abort the block.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<TxType, Box<dyn TxHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the standard bridge transaction set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LockHandler));
        registry.register(Box::new(RedeemHandler));
        registry.register(Box::new(FinalityHandler));
        registry.register(Box::new(BroadcastSuccessHandler));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn TxHandler>) {
        self.handlers.insert(handler.tx_type(), handler);
    }

    fn handler_for(&self, ty: TxType) -> Result<&dyn TxHandler, TxError> {
        self.handlers
            .get(&ty)
            .map(|h| h.as_ref())
            .ok_or_else(|| TxError::WrongTxType(format!("no handler registered for {ty}")))
    }

    /// Runs the stateless validation stage.
    pub fn validate_tx(&self, ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError> {
        self.handler_for(stx.raw.tx_type)?.validate(ctx, stx)
    }

    /// Runs the speculative check stage.
    pub fn check_tx(&self, ctx: &HandlerContext, tx: &RawTx) -> TxOutcome {
        let result = self
            .handler_for(tx.tx_type)
            .and_then(|h| h.process_check(ctx, tx));
        Self::into_outcome(tx.tx_type, result)
    }

    /// Runs the authoritative deliver stage.
    pub fn deliver_tx(&self, ctx: &HandlerContext, tx: &RawTx) -> TxOutcome {
        let result = self
            .handler_for(tx.tx_type)
            .and_then(|h| h.process_deliver(ctx, tx));
        Self::into_outcome(tx.tx_type, result)
    }

    /// Runs the fee stage.
    pub fn fee_tx(&self, ctx: &HandlerContext, stx: &SignedTx, size: u64) -> TxOutcome {
        let result = self
            .handler_for(stx.raw.tx_type)
            .and_then(|h| h.process_fee(ctx, stx, size));
        Self::into_outcome(stx.raw.tx_type, result)
    }

    fn into_outcome(ty: TxType, result: Result<Response, TxError>) -> TxOutcome {
        let mut outcome = match result {
            Ok(response) => TxOutcome {
                success: true,
                response,
            },
            Err(e) => {
                warn!(tx_type = %ty, err = %e, "bridge tx rejected");
                TxOutcome {
                    success: false,
                    response: Response::with_log(e.to_string()),
                }
            }
        };
        // Part of the observable contract: a `tx.type` tag on every response.
        if !outcome.response.has_tag("tx.type") {
            outcome
                .response
                .tags
                .push(KvPair::new("tx.type", ty.as_str()));
        }
        outcome
    }
}

// Re-exports from elsewhere in the crate.

pub use crate::{
    address::{AccountAddress, ScriptAddress},
    amount::SatAmount,
    buf::{Buf20, Buf32, Buf33, Buf64},
    chain::{ExternalTxid, OutputRef, RawExternalTx},
    errors::{CryptoError, ParseError},
};

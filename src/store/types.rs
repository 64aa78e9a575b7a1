// Domain types for the Accounts containment model

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A payment instrument owned by an account, either as the single
/// `PayoutPI` or as a member of the `PayinPIs` collection.
///
/// Wire names follow the OData model (`PaymentInstrumentID`,
/// `FriendlyName`). Inbound payloads may omit the key; the store assigns
/// it on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    #[serde(rename = "PaymentInstrumentID", default)]
    pub payment_instrument_id: i32,
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,
}

/// An account owning zero-or-one payout instrument and a keyed collection
/// of payin instruments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "AccountID")]
    pub account_id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PayoutPI")]
    pub payout_pi: Option<PaymentInstrument>,
    #[serde(rename = "PayinPIs")]
    pub payin_pis: Vec<PaymentInstrument>,
}

/// Store operation failures.
///
/// The not-found variants are missing-record lookups; everything else is
/// a broken invariant the caller had no way to provoke legitimately.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("account {0} not found")]
    AccountNotFound(i32),
    #[error("payment instrument {instrument} not found on account {account}")]
    InstrumentNotFound { account: i32, instrument: i32 },
    #[error("multiple accounts share key {0}")]
    AmbiguousAccount(i32),
    #[error("multiple payin instruments on account {account} share key {instrument}")]
    AmbiguousInstrument { account: i32, instrument: i32 },
    #[error("account {0} has no payin instruments to derive the next key from")]
    EmptyPayinPis(i32),
    #[error("failed to remove payin instrument {instrument} from account {account}")]
    RemovalFailed { account: i32, instrument: i32 },
}

impl StoreError {
    /// Whether this failure means a keyed lookup matched nothing.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::InstrumentNotFound { .. }
        )
    }
}

//! In-memory account table.
//!
//! The table is volatile: seeded at construction, mutated in place by the
//! handlers, and re-seeded on demand. Every logical operation takes the
//! store mutex for one critical section (lookup + mutate), so concurrent
//! adds cannot mint duplicate keys.

use tokio::sync::Mutex;

use super::types::{Account, PaymentInstrument, StoreError};

/// Shared mutable account table.
///
/// Constructed explicitly and handed to the handler layer via `AppState`;
/// there is no hidden process-wide singleton.
pub struct AccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(seed_accounts()),
        }
    }

    /// Reinitialize the table to the single seed account.
    pub async fn reset(&self) {
        *self.accounts.lock().await = seed_accounts();
    }

    /// All accounts, in table order.
    pub async fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().await.clone()
    }

    /// The payin instruments of one account, in table order.
    pub async fn payin_pis(&self, account_id: i32) -> Result<Vec<PaymentInstrument>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(single_account(&accounts, account_id)?.payin_pis.clone())
    }

    /// One payin instrument addressed by account and instrument key.
    pub async fn payin_pi(
        &self,
        account_id: i32,
        instrument_id: i32,
    ) -> Result<PaymentInstrument, StoreError> {
        let accounts = self.accounts.lock().await;
        let account = single_account(&accounts, account_id)?;
        let index = single_instrument_index(account, instrument_id)?;
        Ok(account.payin_pis[index].clone())
    }

    /// The payout instrument of one account, if set.
    pub async fn payout_pi(
        &self,
        account_id: i32,
    ) -> Result<Option<PaymentInstrument>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(single_account(&accounts, account_id)?.payout_pi.clone())
    }

    /// Append a new payin instrument, assigning key = current max + 1.
    ///
    /// Fails with `EmptyPayinPis` when the collection is empty: the max+1
    /// scheme has no base key to start from, and the fixture keeps that
    /// a fault rather than inventing one.
    pub async fn add_payin_pi(
        &self,
        account_id: i32,
        mut instrument: PaymentInstrument,
    ) -> Result<PaymentInstrument, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = single_account_mut(&mut accounts, account_id)?;
        let max_key = account
            .payin_pis
            .iter()
            .map(|p| p.payment_instrument_id)
            .max()
            .ok_or(StoreError::EmptyPayinPis(account_id))?;
        instrument.payment_instrument_id = max_key + 1;
        account.payin_pis.push(instrument.clone());
        Ok(instrument)
    }

    /// Overwrite the payout instrument wholesale.
    pub async fn replace_payout_pi(
        &self,
        account_id: i32,
        instrument: PaymentInstrument,
    ) -> Result<PaymentInstrument, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = single_account_mut(&mut accounts, account_id)?;
        account.payout_pi = Some(instrument.clone());
        Ok(instrument)
    }

    /// Overwrite only the friendly name of an existing payin instrument.
    ///
    /// Returns the input payload (not the stored record), matching the
    /// original handler's contract; the stored key is left untouched.
    pub async fn rename_payin_pi(
        &self,
        account_id: i32,
        instrument_id: i32,
        payload: PaymentInstrument,
    ) -> Result<PaymentInstrument, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = single_account_mut(&mut accounts, account_id)?;
        let index = single_instrument_index(account, instrument_id)?;
        account.payin_pis[index].friendly_name = payload.friendly_name.clone();
        Ok(payload)
    }

    /// Remove one payin instrument.
    ///
    /// The lookup must succeed first; if the removal then takes nothing
    /// out of the collection, that is `RemovalFailed`.
    pub async fn remove_payin_pi(
        &self,
        account_id: i32,
        instrument_id: i32,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = single_account_mut(&mut accounts, account_id)?;
        single_instrument_index(account, instrument_id)?;
        let before = account.payin_pis.len();
        account
            .payin_pis
            .retain(|p| p.payment_instrument_id != instrument_id);
        if account.payin_pis.len() == before {
            return Err(StoreError::RemovalFailed {
                account: account_id,
                instrument: instrument_id,
            });
        }
        Ok(())
    }

    /// Clear the payout instrument, discarding the previous value.
    pub async fn clear_payout_pi(&self, account_id: i32) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = single_account_mut(&mut accounts, account_id)?;
        account.payout_pi = None;
        Ok(())
    }

    /// Count payin instruments whose friendly name contains `name_contains`
    /// (case-sensitive literal substring).
    pub async fn count_payin_pis(
        &self,
        account_id: i32,
        name_contains: &str,
    ) -> Result<usize, StoreError> {
        let accounts = self.accounts.lock().await;
        let account = single_account(&accounts, account_id)?;
        Ok(account
            .payin_pis
            .iter()
            .filter(|p| p.friendly_name.contains(name_contains))
            .count())
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate exactly one account by key.
///
/// Zero matches is not-found; more than one (impossible while the
/// uniqueness invariant holds) is an ambiguity fault.
fn single_account(accounts: &[Account], account_id: i32) -> Result<&Account, StoreError> {
    let index = single_account_index(accounts, account_id)?;
    Ok(&accounts[index])
}

fn single_account_mut(
    accounts: &mut [Account],
    account_id: i32,
) -> Result<&mut Account, StoreError> {
    let index = single_account_index(accounts, account_id)?;
    Ok(&mut accounts[index])
}

fn single_account_index(accounts: &[Account], account_id: i32) -> Result<usize, StoreError> {
    let mut matches = accounts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.account_id == account_id)
        .map(|(i, _)| i);
    let index = matches
        .next()
        .ok_or(StoreError::AccountNotFound(account_id))?;
    if matches.next().is_some() {
        return Err(StoreError::AmbiguousAccount(account_id));
    }
    Ok(index)
}

fn single_instrument_index(account: &Account, instrument_id: i32) -> Result<usize, StoreError> {
    let mut matches = account
        .payin_pis
        .iter()
        .enumerate()
        .filter(|(_, p)| p.payment_instrument_id == instrument_id)
        .map(|(i, _)| i);
    let index = matches.next().ok_or(StoreError::InstrumentNotFound {
        account: account.account_id,
        instrument: instrument_id,
    })?;
    if matches.next().is_some() {
        return Err(StoreError::AmbiguousInstrument {
            account: account.account_id,
            instrument: instrument_id,
        });
    }
    Ok(index)
}

/// The single seed record: account 100 with a Paypal payout instrument
/// and two payin instruments.
fn seed_accounts() -> Vec<Account> {
    vec![Account {
        account_id: 100,
        name: "Name100".to_string(),
        payout_pi: Some(PaymentInstrument {
            payment_instrument_id: 100,
            friendly_name: "Payout PI: Paypal".to_string(),
        }),
        payin_pis: vec![
            PaymentInstrument {
                payment_instrument_id: 101,
                friendly_name: "101 first PI".to_string(),
            },
            PaymentInstrument {
                payment_instrument_id: 102,
                friendly_name: "102 second PI".to_string(),
            },
        ],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unnamed_instrument(name: &str) -> PaymentInstrument {
        PaymentInstrument {
            payment_instrument_id: 0,
            friendly_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_shape() {
        let store = AccountStore::new();
        let accounts = store.accounts().await;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, 100);
        assert_eq!(accounts[0].name, "Name100");
        assert_eq!(
            accounts[0].payout_pi.as_ref().map(|p| p.friendly_name.as_str()),
            Some("Payout PI: Paypal")
        );
        let keys: Vec<i32> = accounts[0]
            .payin_pis
            .iter()
            .map(|p| p.payment_instrument_id)
            .collect();
        assert_eq!(keys, vec![101, 102]);
    }

    #[tokio::test]
    async fn test_payin_pis_in_table_order() {
        let store = AccountStore::new();
        let pis = store.payin_pis(100).await.unwrap();
        let names: Vec<&str> = pis.iter().map(|p| p.friendly_name.as_str()).collect();
        assert_eq!(names, vec!["101 first PI", "102 second PI"]);
    }

    #[tokio::test]
    async fn test_payin_pis_unknown_account() {
        let store = AccountStore::new();
        assert_eq!(
            store.payin_pis(999).await,
            Err(StoreError::AccountNotFound(999))
        );
    }

    #[tokio::test]
    async fn test_single_payin_pi() {
        let store = AccountStore::new();
        let pi = store.payin_pi(100, 102).await.unwrap();
        assert_eq!(pi.friendly_name, "102 second PI");
        assert_eq!(
            store.payin_pi(100, 999).await,
            Err(StoreError::InstrumentNotFound {
                account: 100,
                instrument: 999
            })
        );
    }

    #[tokio::test]
    async fn test_add_assigns_max_plus_one() {
        let store = AccountStore::new();
        let created = store
            .add_payin_pi(100, unnamed_instrument("103 third PI"))
            .await
            .unwrap();
        assert_eq!(created.payment_instrument_id, 103);
        let pis = store.payin_pis(100).await.unwrap();
        assert_eq!(pis.len(), 3);
        assert_eq!(pis[2], created);
    }

    #[tokio::test]
    async fn test_add_ignores_caller_supplied_key() {
        let store = AccountStore::new();
        let created = store
            .add_payin_pi(
                100,
                PaymentInstrument {
                    payment_instrument_id: 7,
                    friendly_name: "ignored key".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.payment_instrument_id, 103);
    }

    #[tokio::test]
    async fn test_add_to_empty_collection_faults() {
        let store = AccountStore::new();
        store.remove_payin_pi(100, 101).await.unwrap();
        store.remove_payin_pi(100, 102).await.unwrap();
        assert_eq!(
            store.add_payin_pi(100, unnamed_instrument("no base key")).await,
            Err(StoreError::EmptyPayinPis(100))
        );
    }

    #[tokio::test]
    async fn test_delete_then_redelete() {
        let store = AccountStore::new();
        store.remove_payin_pi(100, 101).await.unwrap();
        let pis = store.payin_pis(100).await.unwrap();
        assert_eq!(pis.len(), 1);
        assert_eq!(pis[0].payment_instrument_id, 102);
        assert_eq!(
            store.remove_payin_pi(100, 101).await,
            Err(StoreError::InstrumentNotFound {
                account: 100,
                instrument: 101
            })
        );
    }

    #[tokio::test]
    async fn test_payout_set_then_clear() {
        let store = AccountStore::new();
        let replaced = store
            .replace_payout_pi(
                100,
                PaymentInstrument {
                    payment_instrument_id: 200,
                    friendly_name: "Payout PI: Bank".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(store.payout_pi(100).await.unwrap(), Some(replaced));
        store.clear_payout_pi(100).await.unwrap();
        assert_eq!(store.payout_pi(100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rename_keeps_key() {
        let store = AccountStore::new();
        let payload = PaymentInstrument {
            payment_instrument_id: 101,
            friendly_name: "renamed".to_string(),
        };
        let returned = store.rename_payin_pi(100, 101, payload.clone()).await.unwrap();
        assert_eq!(returned, payload);
        let stored = store.payin_pi(100, 101).await.unwrap();
        assert_eq!(stored.payment_instrument_id, 101);
        assert_eq!(stored.friendly_name, "renamed");
        // the sibling is untouched
        assert_eq!(
            store.payin_pi(100, 102).await.unwrap().friendly_name,
            "102 second PI"
        );
    }

    #[tokio::test]
    async fn test_count_is_case_sensitive_substring() {
        let store = AccountStore::new();
        assert_eq!(store.count_payin_pis(100, "PI").await.unwrap(), 2);
        assert_eq!(store.count_payin_pis(100, "first").await.unwrap(), 1);
        assert_eq!(store.count_payin_pis(100, "pi").await.unwrap(), 0);
        assert_eq!(store.count_payin_pis(100, "zzz").await.unwrap(), 0);
        assert_eq!(
            store.count_payin_pis(999, "PI").await,
            Err(StoreError::AccountNotFound(999))
        );
    }

    #[tokio::test]
    async fn test_reset_restores_seed() {
        let store = AccountStore::new();
        store.remove_payin_pi(100, 101).await.unwrap();
        store.clear_payout_pi(100).await.unwrap();
        store
            .add_payin_pi(100, unnamed_instrument("extra"))
            .await
            .unwrap();
        store.reset().await;

        let accounts = store.accounts().await;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, 100);
        assert_eq!(
            accounts[0].payout_pi.as_ref().map(|p| p.friendly_name.as_str()),
            Some("Payout PI: Paypal")
        );
        let pairs: Vec<(i32, &str)> = accounts[0]
            .payin_pis
            .iter()
            .map(|p| (p.payment_instrument_id, p.friendly_name.as_str()))
            .collect();
        assert_eq!(pairs, vec![(101, "101 first PI"), (102, "102 second PI")]);
    }
}

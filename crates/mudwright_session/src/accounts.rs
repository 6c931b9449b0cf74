//! The account store: usernames, password hashes, and the objects they
//! control.
//!
//! Password hashing itself is an external collaborator; the store works
//! through the [`PasswordHasher`] seam and only ever sees hashes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use mudwright_foundation::{Error, ObjectId, Result};

/// Hashes and verifies passwords. Implemented outside the core.
pub trait PasswordHasher {
    /// Hashes a cleartext password for storage.
    fn hash(&self, password: &str) -> String;
    /// Verifies a cleartext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// A hasher that stores passwords as-is. For tests and local development
/// only; production deployments must supply a real implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaintextHasher;

impl PasswordHasher for PlaintextHasher {
    fn hash(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        password == hash
    }
}

/// One registered account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name, unique within the store.
    pub username: String,
    /// Hashed password.
    pub password_hash: String,
    /// The object this account controls.
    pub object: ObjectId,
    /// Whether the account holds elevated privilege.
    pub staff: bool,
}

/// Store of accounts, addressable by username or by controlled object.
pub struct AccountStore {
    hasher: Box<dyn PasswordHasher>,
    accounts: BTreeMap<String, Account>,
    by_object: BTreeMap<ObjectId, String>,
}

impl fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStore")
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

impl AccountStore {
    /// Creates an empty store over the given hasher.
    #[must_use]
    pub fn new(hasher: Box<dyn PasswordHasher>) -> Self {
        Self {
            hasher,
            accounts: BTreeMap::new(),
            by_object: BTreeMap::new(),
        }
    }

    /// Registers an account, hashing the cleartext password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUsername`] if the name is taken and
    /// [`Error::DuplicateObject`] if the object already has an account.
    pub fn add_account(
        &mut self,
        username: &str,
        password: &str,
        object: ObjectId,
        staff: bool,
    ) -> Result<()> {
        if self.accounts.contains_key(username) {
            return Err(Error::DuplicateUsername(username.to_string()));
        }
        if self.by_object.contains_key(&object) {
            return Err(Error::DuplicateObject(object));
        }
        let account = Account {
            username: username.to_string(),
            password_hash: self.hasher.hash(password),
            object,
            staff,
        };
        self.insert(account);
        Ok(())
    }

    fn insert(&mut self, account: Account) {
        self.by_object
            .insert(account.object, account.username.clone());
        self.accounts.insert(account.username.clone(), account);
    }

    /// Removes the account controlling the given object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAccount`] if none exists.
    pub fn remove_account(&mut self, object: ObjectId) -> Result<Account> {
        let username = self
            .by_object
            .remove(&object)
            .ok_or(Error::NoSuchAccount(object))?;
        self.accounts
            .remove(&username)
            .ok_or(Error::NoSuchAccount(object))
    }

    /// Authenticates a username/password pair, returning the controlled
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUsername`] or [`Error::BadPassword`].
    pub fn authenticate(&self, username: &str, password: &str) -> Result<ObjectId> {
        let account = self
            .accounts
            .get(username)
            .ok_or_else(|| Error::UnknownUsername(username.to_string()))?;
        if self.hasher.verify(password, &account.password_hash) {
            Ok(account.object)
        } else {
            Err(Error::BadPassword)
        }
    }

    /// Returns the account controlling the given object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAccount`] if none exists.
    pub fn account_for(&self, object: ObjectId) -> Result<&Account> {
        self.by_object
            .get(&object)
            .and_then(|username| self.accounts.get(username))
            .ok_or(Error::NoSuchAccount(object))
    }

    /// Returns true if the object's account holds elevated privilege.
    #[must_use]
    pub fn is_staff(&self, object: ObjectId) -> bool {
        self.account_for(object).map(|a| a.staff).unwrap_or(false)
    }

    /// Returns true if a username is registered.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// Returns the number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if no accounts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Exports every account for serialization, in username order.
    #[must_use]
    pub fn export(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    /// Imports previously exported accounts (hashes untouched).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonEmptyAccounts`] if the store already holds
    /// accounts, or [`Error::DuplicateUsername`]/[`Error::DuplicateObject`]
    /// for conflicts within the imported data.
    pub fn import(&mut self, accounts: Vec<Account>) -> Result<()> {
        if !self.accounts.is_empty() {
            return Err(Error::NonEmptyAccounts);
        }
        for account in accounts {
            if self.accounts.contains_key(&account.username) {
                return Err(Error::DuplicateUsername(account.username));
            }
            if self.by_object.contains_key(&account.object) {
                return Err(Error::DuplicateObject(account.object));
            }
            self.insert(account);
        }
        Ok(())
    }
}

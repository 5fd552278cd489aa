use gitdash_core::credentials::{Credential, CredentialStore};
use gitdash_core::error::CredentialError;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SERVICE: &str = "gitdash";
pub const ACCOUNT: &str = "origin";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct StoredCredential {
    username: String,
    secret: String,
}

/// Origin credential kept in the OS secret store.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_account(SERVICE, ACCOUNT)
    }

    pub fn with_account(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, CredentialError> {
        Entry::new(&self.service, &self.account)
            .map_err(|err| CredentialError::Unavailable(format!("open keyring entry: {err}")))
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn read(&self) -> Result<Option<Credential>, CredentialError> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(payload) => decode(&payload).map(Some),
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, account = %self.account, "No keyring entry");
                Ok(None)
            }
            Err(err) => Err(CredentialError::Unavailable(format!(
                "read credential from keyring: {err}"
            ))),
        }
    }

    fn write(&self, credential: &Credential) -> Result<(), CredentialError> {
        let payload = encode(credential)?;
        self.entry()?
            .set_password(&payload)
            .map_err(|err| CredentialError::Unavailable(format!("write credential to keyring: {err}")))
    }
}

fn encode(credential: &Credential) -> Result<String, CredentialError> {
    let stored = StoredCredential {
        username: credential.username.clone(),
        secret: credential.secret.clone(),
    };
    serde_json::to_string(&stored).map_err(|err| CredentialError::Malformed(err.to_string()))
}

fn decode(payload: &str) -> Result<Credential, CredentialError> {
    let stored: StoredCredential =
        serde_json::from_str(payload).map_err(|err| CredentialError::Malformed(err.to_string()))?;
    Ok(Credential::new(stored.username, stored.secret))
}

//! Local persistence for the access/refresh token pair.
//!
//! The credential file holds a single JSON object and is overwritten
//! wholesale on every save. There is no locking: the tool is single-user and
//! single-process, and concurrent runs racing on the file are unsupported.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// Both fields non-empty. The default pair (both empty) means the user
    /// has not authenticated yet.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> TokenStore {
        TokenStore { path }
    }

    /// Read the stored pair. A missing file is not an error: it means the
    /// user has never authenticated, so the empty pair is returned after a
    /// diagnostic.
    pub fn load(&self) -> Result<TokenPair> {
        if !self.path.exists() {
            eprintln!(
                "credential file {} does not exist, treating as not authenticated",
                self.path.display()
            );
            return Ok(TokenPair::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Overwrite the credential file with the given pair. The file must
    /// already exist; the tool never creates it, so a missing file turns the
    /// save into a surfaced no-op the caller logs and continues from.
    pub fn save(&self, pair: &TokenPair) -> Result<()> {
        if !self.path.exists() {
            return Err(Error::MissingCredentialFile(self.path.clone()));
        }

        fs::write(&self.path, serde_json::to_string(pair)?)?;
        Ok(())
    }
}

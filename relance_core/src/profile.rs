//! Client profiles and the read-only store that owns them.
//!
//! Profiles are loaded once at startup and never change afterwards, so the
//! store hands out `Arc<ClientProfile>` and sessions can run on any thread
//! without locking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Voice of a client, resolved once from the configured tone string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Professional,
    Collaborative,
    /// Unknown or missing tone; speaks like `Professional`.
    Default,
}

impl Tone {
    /// Resolve a configured tone string. Anything unrecognised maps to `Default`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "formal" => Self::Formal,
            "professional" => Self::Professional,
            "collaborative" => Self::Collaborative,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Professional => "professional",
            Self::Collaborative => "collaborative",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice and policy parameters for one business client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: String,
    pub client_name: String,
    pub tone: Tone,
    pub formality_level: String,
    pub phrasing: String,
    pub payment_label: String,
    pub closing_line: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("duplicate client identifier: {0}")]
    DuplicateClient(String),

    #[error("client '{id}' not found. Available: {available}")]
    UnknownClient { id: String, available: String },
}

/// In-memory mapping of client identifiers to profiles.
///
/// Iteration order is the sorted order of identifiers, which keeps harness
/// enumeration deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Arc<ClientProfile>>,
}

impl ProfileStore {
    pub fn new(profiles: impl IntoIterator<Item = ClientProfile>) -> Result<Self, ProfileError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            let id = profile.id.clone();
            if map.insert(id.clone(), Arc::new(profile)).is_some() {
                return Err(ProfileError::DuplicateClient(id));
            }
        }
        debug!("Loaded {} client profiles", map.len());
        Ok(Self { profiles: map })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ClientProfile>> {
        self.profiles.get(id).cloned()
    }

    /// Like [`get`](Self::get), but names the available clients on a miss.
    pub fn require(&self, id: &str) -> Result<Arc<ClientProfile>, ProfileError> {
        self.get(id).ok_or_else(|| ProfileError::UnknownClient {
            id: id.to_string(),
            available: self.ids().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClientProfile>> {
        self.profiles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn profile(id: &str, tone: Tone) -> ClientProfile {
        ClientProfile {
            id: id.to_string(),
            client_name: format!("{id} Corp"),
            tone,
            formality_level: "medium".to_string(),
            phrasing: "direct".to_string(),
            payment_label: "card payment".to_string(),
            closing_line: format!("Thank you for your time, {id} Corp wishes you a good day."),
        }
    }

    #[test]
    fn tone_parsing_falls_back_to_default() {
        assert_eq!(Tone::parse("Formal"), Tone::Formal);
        assert_eq!(Tone::parse(" collaborative "), Tone::Collaborative);
        assert_eq!(Tone::parse("professional"), Tone::Professional);
        assert_eq!(Tone::parse("cheerful"), Tone::Default);
        assert_eq!(Tone::parse(""), Tone::Default);
    }

    #[test]
    fn store_is_sorted_and_rejects_duplicates() {
        let store = ProfileStore::new(vec![
            profile("orange", Tone::Formal),
            profile("amazon", Tone::Professional),
        ])
        .unwrap();
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["amazon", "orange"]);
        assert_eq!(store.len(), 2);

        let dup = ProfileStore::new(vec![
            profile("dell", Tone::Formal),
            profile("dell", Tone::Formal),
        ]);
        assert_eq!(
            dup.unwrap_err(),
            ProfileError::DuplicateClient("dell".to_string())
        );
    }

    #[test]
    fn require_lists_available_clients() {
        let store = ProfileStore::new(vec![profile("dell", Tone::Formal)]).unwrap();
        assert!(store.require("dell").is_ok());
        let err = store.require("hp").unwrap_err();
        assert_eq!(err.to_string(), "client 'hp' not found. Available: dell");
    }
}

//! Organization membership roster.
//!
//! The roster is an externally hosted YAML document with a `members` list.
//! [`MembershipCache`] fetches it at most once per validation run.

use crate::parse::normalize_login;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while fetching or reading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The request could not be performed.
    #[error("failed to fetch roster from {url}: {message}")]
    Request {
        /// The roster URL.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("roster request to {url} returned HTTP {status}")]
    Status {
        /// The roster URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The document is not a valid roster.
    #[error("failed to parse roster for org {org}: {source}")]
    Parse {
        /// The organization.
        org: String,
        /// The YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// A source of verified organization members.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Returns the normalized logins of the organization's members.
    async fn fetch_members(&self, org: &str) -> Result<BTreeSet<String>, RosterError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrgRoster {
    members: Option<Vec<String>>,
}

/// Parses a roster document into normalized member logins.
pub fn parse_roster(org: &str, content: &[u8]) -> Result<BTreeSet<String>, RosterError> {
    let roster: OrgRoster = serde_yaml::from_slice(content).map_err(|source| RosterError::Parse {
        org: org.to_string(),
        source,
    })?;
    Ok(roster
        .members
        .unwrap_or_default()
        .iter()
        .map(|member| normalize_login(member))
        .filter(|member| !member.is_empty())
        .collect())
}

/// Fetches rosters over HTTP from a URL template.
///
/// Every `{org}` in the template is replaced by the organization name.
#[derive(Clone)]
pub struct HttpRoster {
    client: reqwest::Client,
    url_template: String,
}

impl HttpRoster {
    /// Creates a roster source for the given URL template.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url_template)
    }

    /// Creates a roster source that reuses an existing HTTP client.
    pub fn with_client(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    /// Returns the roster URL for an organization.
    pub fn url_for(&self, org: &str) -> String {
        self.url_template.replace("{org}", org)
    }
}

impl fmt::Debug for HttpRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRoster")
            .field("url_template", &self.url_template)
            .finish()
    }
}

#[async_trait]
impl RosterSource for HttpRoster {
    async fn fetch_members(&self, org: &str) -> Result<BTreeSet<String>, RosterError> {
        let url = self.url_for(org);
        debug!("Fetching membership roster from {}", url);

        let request_error = |e: reqwest::Error| RosterError::Request {
            url: url.clone(),
            message: e.to_string(),
        };
        let response = self.client.get(&url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(request_error)?;

        let members = parse_roster(org, &body)?;
        info!("Fetched {} member(s) for org {}", members.len(), org);
        Ok(members)
    }
}

/// Lazily fetched roster, scoped to a single validation run.
pub struct MembershipCache<'a> {
    source: &'a dyn RosterSource,
    org: String,
    members: Option<BTreeSet<String>>,
}

impl<'a> MembershipCache<'a> {
    /// Creates an empty cache for an organization.
    pub fn new(source: &'a dyn RosterSource, org: impl Into<String>) -> Self {
        Self {
            source,
            org: org.into(),
            members: None,
        }
    }

    /// Returns the members, fetching them on first use.
    pub async fn members(&mut self) -> Result<&BTreeSet<String>, RosterError> {
        if self.members.is_none() {
            let fetched = self.source.fetch_members(&self.org).await?;
            self.members = Some(fetched);
        }
        let members: &BTreeSet<String> = self.members.get_or_insert_with(BTreeSet::new);
        Ok(members)
    }

    /// Returns the logins of `users` that are not members.
    pub async fn non_members(
        &mut self,
        users: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, RosterError> {
        if users.is_empty() {
            return Ok(BTreeSet::new());
        }
        let members = self.members().await?;
        Ok(users.difference(members).cloned().collect())
    }

    /// Returns true once the roster has been fetched.
    pub fn is_loaded(&self) -> bool {
        self.members.is_some()
    }
}

impl fmt::Debug for MembershipCache<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipCache")
            .field("org", &self.org)
            .field("loaded", &self.is_loaded())
            .field("source", &"<dyn RosterSource>")
            .finish()
    }
}

//! Admin Directory HTTP client.

use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::Span;

use gcfsync_core::{DirectoryConfig, GroupId, Identity, MembershipMapping, SyncError};
use gcfsync_sync::IdentitySource;

use crate::auth::{fetch_access_token, sign_assertion, ServiceAccountKey};
use crate::error::{decode_err, request_err};

const PAGE_SIZE: &str = "200";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersPage {
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupsPage {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Group {
    email: String,
}

/// Blocking client for the Admin Directory groups API.
pub struct DirectoryClient {
    agent: ureq::Agent,
    base_url: String,
    domain: String,
    bearer: String,
    span: Span,
}

impl DirectoryClient {
    /// Authenticate as the service account in `config`, impersonating
    /// `impersonate`.
    pub fn connect(
        config: &DirectoryConfig,
        impersonate: &str,
        span: Span,
    ) -> Result<Self, SyncError> {
        let agent = build_agent();
        let token = {
            let _enter = span.enter();
            let key = ServiceAccountKey::from_json(&config.credentials_json)?;
            let assertion = sign_assertion(&key, impersonate, &config.token_url, Utc::now())?;
            let token = fetch_access_token(&agent, &config.token_url, &assertion)?;
            tracing::debug!(
                service_account = %key.client_email,
                subject = impersonate,
                "obtained directory access token"
            );
            token
        };
        Ok(Self::from_parts(
            agent,
            &config.base_url,
            &config.domain,
            &token.access_token,
            span,
        ))
    }

    /// Build a client around an already issued access token.
    pub fn with_token(base_url: &str, domain: &str, access_token: &str, span: Span) -> Self {
        Self::from_parts(build_agent(), base_url, domain, access_token, span)
    }

    fn from_parts(
        agent: ureq::Agent,
        base_url: &str,
        domain: &str,
        access_token: &str,
        span: Span,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            domain: domain.to_string(),
            bearer: format!("Bearer {access_token}"),
            span,
        }
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page_token: Option<&str>,
        resource: &str,
    ) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.agent.get(&url).set("Authorization", &self.bearer);
        for (k, v) in query {
            request = request.query(k, v);
        }
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }
        let response = request.call().map_err(|e| request_err(e, resource))?;
        response.into_json::<T>().map_err(decode_err)
    }
}

impl IdentitySource for DirectoryClient {
    fn group_members(&self, group: &GroupId) -> Result<MembershipMapping, SyncError> {
        let _enter = self.span.enter();
        let path = format!("/groups/{}/members", urlencoding::encode(group.as_str()));
        let resource = format!("group {group}");

        let mut members = MembershipMapping::new();
        let mut page_token: Option<String> = None;
        loop {
            let page: MembersPage = self
                .get_page(
                    &path,
                    &[("maxResults", PAGE_SIZE)],
                    page_token.as_deref(),
                    &resource,
                )
                .map_err(|err| match (&page_token, err) {
                    // The group answered page one, so a later 404 is not a missing group.
                    (Some(_), SyncError::NotFound { backend, resource }) => SyncError::Api {
                        backend,
                        status: 404,
                        message: format!("{resource} disappeared while paging members"),
                    },
                    (_, err) => err,
                })?;
            for member in page.members {
                match member.email {
                    Some(email) => {
                        tracing::debug!(email = %email, role = %member.role, "[GOOGLE] member");
                        members.insert(Identity::from(email), member.role);
                    }
                    None => tracing::debug!(group = %group, "skipping member without email"),
                }
            }
            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }
        Ok(members)
    }

    fn groups_matching(&self, pattern: &str) -> Result<Vec<GroupId>, SyncError> {
        let _enter = self.span.enter();
        let resource = format!("groups in domain {}", self.domain);

        let mut groups = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page: GroupsPage = self.get_page(
                "/groups",
                &[
                    ("domain", self.domain.as_str()),
                    ("query", pattern),
                    ("maxResults", PAGE_SIZE),
                ],
                page_token.as_deref(),
                &resource,
            )?;
            groups.extend(page.groups.into_iter().map(|g| GroupId::from(g.email)));
            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }
        tracing::debug!(pattern, count = groups.len(), "listed matching groups");
        Ok(groups)
    }
}

fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build()
}

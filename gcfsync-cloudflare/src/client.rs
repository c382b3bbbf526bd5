//! Cloudflare v4 HTTP client for Gateway lists and Access seats.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Span;

use gcfsync_core::{GatewayConfig, Identity, ListId, MembershipMapping, SyncError};
use gcfsync_sync::AllowList;

use crate::error::{decode_err, request_err, unsuccessful};
use crate::model::{
    AccessUser, CreateTeamsList, Envelope, PatchTeamsList, ResultInfo, SeatUpdate, TeamsList,
    TeamsListItem,
};

const PAGE_SIZE: u32 = 100;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const LIST_TYPE_EMAIL: &str = "EMAIL";

/// Blocking client bound to one Cloudflare account.
pub struct GatewayClient {
    agent: ureq::Agent,
    base_url: String,
    account_id: String,
    api_email: String,
    api_key: String,
    span: Span,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig, span: Span) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_email: config.api_email.clone(),
            api_key: config.api_key.clone(),
            span,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/accounts/{}{}", self.base_url, self.account_id, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &self.url(path))
            .set("X-Auth-Email", &self.api_email)
            .set("X-Auth-Key", &self.api_key)
    }

    /// Unwrap an envelope, turning `success: false` into an error.
    fn open<T: DeserializeOwned>(
        response: ureq::Response,
    ) -> Result<(Option<T>, Option<ResultInfo>), SyncError> {
        let status = response.status();
        let envelope: Envelope<T> = response.into_json().map_err(decode_err)?;
        if !envelope.success {
            return Err(unsuccessful(status, &envelope.errors));
        }
        Ok((envelope.result, envelope.result_info))
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        resource: &str,
    ) -> Result<(Vec<T>, Option<ResultInfo>), SyncError> {
        let response = self
            .request("GET", path)
            .query("page", &page.to_string())
            .query("per_page", &PAGE_SIZE.to_string())
            .call()
            .map_err(|e| request_err(e, resource))?;
        let (result, info) = Self::open::<Vec<T>>(response)?;
        Ok((result.unwrap_or_default(), info))
    }

    /// Fetch every page of a paginated collection.
    fn get_all<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<Vec<T>, SyncError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let (items, info) = self.get_page::<T>(path, page, resource)?;
            let fetched = items.len();
            all.extend(items);
            if is_last_page(page, fetched, all.len(), info.as_ref()) {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<Option<T>, SyncError> {
        let response = self
            .request(method, path)
            .send_json(body)
            .map_err(|e| request_err(e, resource))?;
        Self::open::<T>(response).map(|(result, _)| result)
    }

    /// `/gateway/lists` is not paginated: one request returns every list.
    fn lists(&self) -> Result<Vec<TeamsList>, SyncError> {
        let response = self
            .request("GET", "/gateway/lists")
            .call()
            .map_err(|e| request_err(e, "gateway lists"))?;
        let (lists, _) = Self::open::<Vec<TeamsList>>(response)?;
        let lists = lists.unwrap_or_default();
        for list in &lists {
            tracing::debug!(name = %list.name, id = %list.id, kind = %list.kind, "gateway list");
        }
        Ok(lists)
    }
}

/// Stop when `result_info` says so, or on a short page when it is absent.
///
/// `seen` counts items across all pages so far; reaching a non-zero
/// `total_count` ends the walk even if the server ignores `page`.
fn is_last_page(page: u32, fetched: usize, seen: usize, info: Option<&ResultInfo>) -> bool {
    if fetched == 0 {
        return true;
    }
    if let Some(info) = info {
        if info.total_count > 0 && seen >= info.total_count as usize {
            return true;
        }
        if let Some(total_pages) = info.total_pages {
            return page >= total_pages;
        }
    }
    fetched < PAGE_SIZE as usize
}

impl AllowList for GatewayClient {
    fn find_list(&self, name: &str) -> Result<Option<ListId>, SyncError> {
        let _enter = self.span.enter();
        Ok(self
            .lists()?
            .into_iter()
            .find(|list| list.name == name)
            .map(|list| ListId::from(list.id)))
    }

    fn ensure_list(&self, name: &str) -> Result<ListId, SyncError> {
        let _enter = self.span.enter();
        if let Some(existing) = self.lists()?.into_iter().find(|list| list.name == name) {
            tracing::debug!(list = name, id = %existing.id, "Team List already exists");
            return Ok(ListId::from(existing.id));
        }

        let body = CreateTeamsList {
            name,
            kind: LIST_TYPE_EMAIL,
        };
        let created: TeamsList = self
            .send("POST", "/gateway/lists", &body, &format!("list {name}"))?
            .ok_or_else(|| SyncError::Decode {
                backend: gcfsync_core::Backend::Gateway,
                message: "create list returned no result".to_string(),
            })?;
        tracing::info!(list = %created.name, id = %created.id, "Created Team List");
        Ok(ListId::from(created.id))
    }

    fn list_members(&self, list: &ListId) -> Result<MembershipMapping, SyncError> {
        let _enter = self.span.enter();
        let items = self.get_all::<TeamsListItem>(
            &format!("/gateway/lists/{list}/items"),
            &format!("list {list}"),
        )?;
        Ok(items
            .into_iter()
            .map(|item| {
                tracing::debug!(email = %item.value, "[CF] list member");
                (Identity::from(item.value), list.0.clone())
            })
            .collect())
    }

    fn seat_holders(&self) -> Result<MembershipMapping, SyncError> {
        let _enter = self.span.enter();
        let users = self.get_all::<AccessUser>("/access/users", "access users")?;
        Ok(users
            .into_iter()
            .filter(AccessUser::holds_seat)
            .map(|user| {
                tracing::debug!(
                    email = %user.email,
                    access = user.access_seat.unwrap_or(false),
                    gateway = user.gateway_seat.unwrap_or(false),
                    "[CF] active user"
                );
                (Identity::from(user.email), user.id)
            })
            .collect())
    }

    fn patch(
        &self,
        list: &ListId,
        to_add: &MembershipMapping,
        to_remove: &MembershipMapping,
    ) -> Result<(), SyncError> {
        let _enter = self.span.enter();
        let body = PatchTeamsList {
            append: to_add
                .keys()
                .map(|identity| TeamsListItem {
                    value: identity.0.clone(),
                })
                .collect(),
            remove: to_remove.keys().map(|identity| identity.0.clone()).collect(),
        };
        tracing::debug!(
            list = %list,
            append = body.append.len(),
            remove = body.remove.len(),
            "patching list"
        );
        self.send::<_, serde_json::Value>(
            "PATCH",
            &format!("/gateway/lists/{list}"),
            &body,
            &format!("list {list}"),
        )?;
        Ok(())
    }

    fn revoke_seats(&self, identity: &Identity) -> Result<bool, SyncError> {
        let _enter = self.span.enter();
        let mut page = 1;
        let mut seen = 0;
        loop {
            let (users, info) = self.get_page::<AccessUser>("/access/users", page, "access users")?;
            let fetched = users.len();
            seen += fetched;
            if let Some(user) = users.into_iter().find(|u| u.email == identity.0) {
                let Some(seat_uid) = user.seat_uid.as_deref() else {
                    tracing::warn!(identity = %identity, id = %user.id, "user has no seat uid");
                    return Ok(false);
                };
                tracing::debug!(identity = %identity, id = %user.id, "Found user");
                let update = [SeatUpdate {
                    seat_uid,
                    access_seat: false,
                    gateway_seat: false,
                }];
                self.send::<_, serde_json::Value>(
                    "PATCH",
                    "/access/seats",
                    &update,
                    &format!("seat of {identity}"),
                )?;
                tracing::info!(identity = %identity, "Revoked seats");
                return Ok(true);
            }
            if is_last_page(page, fetched, seen, info.as_ref()) {
                return Ok(false);
            }
            page += 1;
        }
    }
}

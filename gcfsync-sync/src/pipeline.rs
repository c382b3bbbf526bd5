//! Reconciliation driver shared by every run mode.
//!
//! A run is strictly fetch-all → diff → apply-all. Every backend error other
//! than a missing directory group is returned to the caller untouched; work
//! already applied (an earlier list in a discovered run) stays applied.

use serde::Serialize;
use tracing::Span;

use gcfsync_core::{GroupId, Identity, ListId, MembershipMapping, SyncError};

use crate::diff::{diff, union_into};
use crate::mode::RunMode;
use crate::ports::{AllowList, IdentitySource};
use crate::purge::PurgePolicy;

/// What happened to one target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOutcome {
    pub list_name: String,
    /// `None` only in dry-run when the list does not exist yet.
    pub list_id: Option<ListId>,
    pub added: Vec<Identity>,
    pub removed: Vec<Identity>,
    /// Whether a patch was sent to the gateway.
    pub patched: bool,
}

/// What happened during a seat purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeOutcome {
    pub stale: Vec<Identity>,
    pub revoked: Vec<Identity>,
    /// Stale identities that had disappeared by the time we revoked them.
    pub not_found: Vec<Identity>,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub lists: Vec<ListOutcome>,
    pub purge: Option<PurgeOutcome>,
    /// Groups the directory reported as not found; they contributed no members.
    pub missing_groups: Vec<GroupId>,
}

/// Drives one run against a directory and a gateway.
pub struct Reconciler<'a, S: ?Sized, A: ?Sized> {
    source: &'a S,
    allow_list: &'a A,
    span: Span,
    purge_policy: PurgePolicy,
    dry_run: bool,
}

impl<'a, S, A> Reconciler<'a, S, A>
where
    S: IdentitySource + ?Sized,
    A: AllowList + ?Sized,
{
    /// `span` scopes every log line the driver emits.
    pub fn new(source: &'a S, allow_list: &'a A, span: Span) -> Self {
        Self {
            source,
            allow_list,
            span,
            purge_policy: PurgePolicy::default(),
            dry_run: false,
        }
    }

    /// Compute and log changes without mutating the gateway.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn purge_policy(mut self, policy: PurgePolicy) -> Self {
        self.purge_policy = policy;
        self
    }

    pub fn run(&self, mode: &RunMode) -> Result<RunReport, SyncError> {
        let _enter = self.span.enter();
        tracing::info!(mode = mode.label(), dry_run = self.dry_run, "starting run");

        let mut report = RunReport {
            dry_run: self.dry_run,
            ..RunReport::default()
        };
        match mode {
            RunMode::PurgeStale { groups } => {
                let outcome = self.purge_stale(groups, &mut report)?;
                report.purge = Some(outcome);
            }
            RunMode::Discovered { pattern } => self.sync_discovered(pattern, &mut report)?,
            RunMode::Explicit { groups, list_name } => {
                // Members first: a directory failure must not leave a new empty list.
                let source = self.collect_members(groups, &mut report)?;
                let list_id = self.resolve_list(list_name)?;
                let outcome = self.sync_list(list_name, list_id, &source)?;
                report.lists.push(outcome);
            }
        }

        tracing::info!("Done");
        Ok(report)
    }

    /// Union the members of `groups` in order; later groups overwrite tokens
    /// of identities seen earlier. Missing groups are logged and skipped.
    pub fn collect_members(
        &self,
        groups: &[GroupId],
        report: &mut RunReport,
    ) -> Result<MembershipMapping, SyncError> {
        let mut members = MembershipMapping::new();
        for group in groups {
            match self.source.group_members(group) {
                Ok(found) => {
                    tracing::debug!(group = %group, count = found.len(), "fetched group members");
                    union_into(&mut members, found);
                }
                Err(err) if err.is_not_found() => {
                    tracing::error!(group = %group, error = %err, "Group not found");
                    report.missing_groups.push(group.clone());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(members)
    }

    fn sync_discovered(&self, pattern: &str, report: &mut RunReport) -> Result<(), SyncError> {
        let groups = match self.source.groups_matching(pattern) {
            Ok(groups) => groups,
            Err(err) if err.is_not_found() => {
                tracing::error!(pattern, error = %err, "group search found nothing");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        let names: Vec<&str> = groups.iter().map(GroupId::as_str).collect();
        tracing::info!(pattern, groups = ?names, "Found groups");

        for group in &groups {
            let span = tracing::info_span!("group", group = %group);
            let _enter = span.enter();
            tracing::info!("Processing group");
            let list_id = self.resolve_list(group.as_str())?;
            let source = self.collect_members(std::slice::from_ref(group), report)?;
            let outcome = self.sync_list(group.as_str(), list_id, &source)?;
            report.lists.push(outcome);
        }
        Ok(())
    }

    /// Diff `source` against the list and patch it. `list_id` is `None` only
    /// for a dry-run against a list that does not exist yet.
    fn sync_list(
        &self,
        list_name: &str,
        list_id: Option<ListId>,
        source: &MembershipMapping,
    ) -> Result<ListOutcome, SyncError> {
        tracing::debug!(count = source.len(), "source members");

        let target = match &list_id {
            Some(id) => self.allow_list.list_members(id)?,
            None => MembershipMapping::new(),
        };
        tracing::debug!(list = list_name, count = target.len(), "list members");

        let changes = diff(source, &target);
        for identity in changes.to_remove.keys() {
            tracing::info!(identity = %identity, list = list_name, "User not found in directory, removing");
        }
        for identity in changes.to_add.keys() {
            tracing::info!(identity = %identity, list = list_name, "User not found in list, adding");
        }

        let mut patched = false;
        match &list_id {
            _ if changes.is_empty() => {
                tracing::info!(list = list_name, "list already in sync");
            }
            Some(id) if !self.dry_run => {
                self.allow_list.patch(id, &changes.to_add, &changes.to_remove)?;
                patched = true;
            }
            _ => {
                tracing::info!(
                    list = list_name,
                    add = changes.to_add.len(),
                    remove = changes.to_remove.len(),
                    "[dry-run] would patch list"
                );
            }
        }

        Ok(ListOutcome {
            list_name: list_name.to_string(),
            list_id,
            added: changes.to_add.into_keys().collect(),
            removed: changes.to_remove.into_keys().collect(),
            patched,
        })
    }

    fn resolve_list(&self, list_name: &str) -> Result<Option<ListId>, SyncError> {
        if self.dry_run {
            let found = self.allow_list.find_list(list_name)?;
            if found.is_none() {
                tracing::info!(list = list_name, "[dry-run] would create list");
            }
            return Ok(found);
        }
        self.allow_list.ensure_list(list_name).map(Some)
    }

    fn purge_stale(
        &self,
        groups: &[GroupId],
        report: &mut RunReport,
    ) -> Result<PurgeOutcome, SyncError> {
        tracing::info!("Deleting stale users");
        let source = self.collect_members(groups, report)?;
        let holders = self.allow_list.seat_holders()?;
        tracing::debug!(
            source = source.len(),
            seat_holders = holders.len(),
            "fetched purge inputs"
        );

        let stale = self.purge_policy.stale(&source, &holders);
        let mut outcome = PurgeOutcome {
            stale: stale.keys().cloned().collect(),
            ..PurgeOutcome::default()
        };

        for identity in stale.keys() {
            tracing::info!(identity = %identity, "User not found in directory");
            if self.dry_run {
                tracing::info!(identity = %identity, "[dry-run] would revoke seats");
                continue;
            }
            if self.allow_list.revoke_seats(identity)? {
                outcome.revoked.push(identity.clone());
            } else {
                tracing::debug!(identity = %identity, "seat holder vanished before revocation");
                outcome.not_found.push(identity.clone());
            }
        }
        Ok(outcome)
    }
}

//! Set difference between a source and a target membership mapping.
//!
//! Only keys are compared. Values are opaque backend tokens carried along so
//! that callers can log or forward them; they never influence the result.

use gcfsync_core::MembershipMapping;

/// What has to change for the target to hold exactly the source's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Source keys absent from target, with the source's tokens.
    pub to_add: MembershipMapping,
    /// Target keys absent from source, with the target's tokens.
    pub to_remove: MembershipMapping,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// The mapping `target` becomes once this diff is applied to it.
    pub fn apply_to(&self, target: &MembershipMapping) -> MembershipMapping {
        let mut next: MembershipMapping = target
            .iter()
            .filter(|(identity, _)| !self.to_remove.contains_key(*identity))
            .map(|(identity, token)| (identity.clone(), token.clone()))
            .collect();
        next.extend(
            self.to_add
                .iter()
                .map(|(identity, token)| (identity.clone(), token.clone())),
        );
        next
    }
}

/// Compute `to_add = keys(source) - keys(target)` and
/// `to_remove = keys(target) - keys(source)`.
pub fn diff(source: &MembershipMapping, target: &MembershipMapping) -> DiffResult {
    let to_add = source
        .iter()
        .filter(|(identity, _)| !target.contains_key(*identity))
        .map(|(identity, token)| (identity.clone(), token.clone()))
        .collect();
    let to_remove = target
        .iter()
        .filter(|(identity, _)| !source.contains_key(*identity))
        .map(|(identity, token)| (identity.clone(), token.clone()))
        .collect();
    DiffResult { to_add, to_remove }
}

/// Merge one group's members into an accumulated mapping.
///
/// Duplicate identities take the value from `group` (last write wins).
pub fn union_into(acc: &mut MembershipMapping, group: MembershipMapping) {
    acc.extend(group);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gcfsync_core::Identity;
    use rstest::rstest;

    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> MembershipMapping {
        pairs
            .iter()
            .map(|(k, v)| (Identity::from(*k), v.to_string()))
            .collect()
    }

    fn keys(m: &MembershipMapping) -> BTreeSet<String> {
        m.keys().map(|k| k.0.clone()).collect()
    }

    #[test]
    fn add_and_remove_scenario() {
        let source = mapping(&[("a@x.com", "MEMBER"), ("b@x.com", "MEMBER")]);
        let target = mapping(&[("b@x.com", "id1"), ("c@x.com", "id2")]);

        let d = diff(&source, &target);
        assert_eq!(keys(&d.to_add), BTreeSet::from(["a@x.com".to_string()]));
        assert_eq!(keys(&d.to_remove), BTreeSet::from(["c@x.com".to_string()]));
        assert_eq!(d.to_remove.get(&Identity::from("c@x.com")).map(String::as_str), Some("id2"));

        let patched = d.apply_to(&target);
        assert_eq!(keys(&patched), keys(&source));
    }

    #[rstest]
    #[case::both_empty(&[], &[])]
    #[case::source_only(&[("a@x.com", "OWNER")], &[])]
    #[case::target_only(&[], &[("a@x.com", "id")])]
    #[case::identical_keys_different_tokens(&[("a@x.com", "OWNER")], &[("a@x.com", "id")])]
    #[case::disjoint(&[("a@x.com", "MEMBER"), ("b@x.com", "MEMBER")], &[("c@x.com", "id"), ("d@x.com", "id")])]
    #[case::case_sensitive(&[("A@x.com", "MEMBER")], &[("a@x.com", "id")])]
    fn diff_properties_hold(#[case] s: &[(&str, &str)], #[case] t: &[(&str, &str)]) {
        let source = mapping(s);
        let target = mapping(t);
        let d = diff(&source, &target);

        let expected_add: BTreeSet<_> = keys(&source).difference(&keys(&target)).cloned().collect();
        let expected_remove: BTreeSet<_> =
            keys(&target).difference(&keys(&source)).cloned().collect();
        assert_eq!(keys(&d.to_add), expected_add);
        assert_eq!(keys(&d.to_remove), expected_remove);
        assert!(keys(&d.to_add).is_disjoint(&keys(&d.to_remove)));

        let intersection: BTreeSet<_> =
            keys(&source).intersection(&keys(&target)).cloned().collect();
        assert!(keys(&d.to_add).is_disjoint(&intersection));
        assert!(keys(&d.to_remove).is_disjoint(&intersection));

        // Idempotence: once applied, there is nothing left to do.
        let patched = d.apply_to(&target);
        assert_eq!(keys(&patched), keys(&source));
        assert!(diff(&source, &patched).is_empty());
    }

    #[test]
    fn tokens_are_not_compared() {
        let source = mapping(&[("a@x.com", "OWNER")]);
        let target = mapping(&[("a@x.com", "list-123")]);
        assert!(diff(&source, &target).is_empty());
    }

    #[test]
    fn union_is_commutative_on_keys_and_last_write_wins_on_values() {
        let a = mapping(&[("a@x.com", "MEMBER"), ("shared@x.com", "MEMBER")]);
        let b = mapping(&[("b@x.com", "MEMBER"), ("shared@x.com", "OWNER")]);

        let mut ab = MembershipMapping::new();
        union_into(&mut ab, a.clone());
        union_into(&mut ab, b.clone());

        let mut ba = MembershipMapping::new();
        union_into(&mut ba, b);
        union_into(&mut ba, a);

        assert_eq!(keys(&ab), keys(&ba));
        assert_eq!(ab.get(&Identity::from("shared@x.com")).map(String::as_str), Some("OWNER"));
        assert_eq!(ba.get(&Identity::from("shared@x.com")).map(String::as_str), Some("MEMBER"));
    }
}

//! Permission resolver tests: the full role x status table, the plain-admin
//! fallback, and fail-closed handling of unknown statuses.

use vetdesk::vetting::{normalize, resolve, RoleFlags, VettingMode};

const STATUSES: [&str; 6] = ["open", "pending_approval", "pending", "approved", "archived", ""];

#[test]
fn test_committee_edits_only_while_open() {
    let flags = RoleFlags::new(true, false);
    for status in STATUSES {
        let expected = status == "open";
        assert_eq!(resolve(flags, &normalize(Some(status))), Some(expected), "committee / {status:?}");
    }
}

#[test]
fn test_approver_edits_only_while_pending() {
    let flags = RoleFlags::new(false, true);
    for status in STATUSES {
        let expected = status == "pending_approval" || status == "pending";
        assert_eq!(resolve(flags, &normalize(Some(status))), Some(expected), "approver / {status:?}");
    }
}

#[test]
fn test_plain_admin_defers_to_external_flag() {
    for status in STATUSES {
        assert_eq!(resolve(RoleFlags::default(), &normalize(Some(status))), None);
        for fallback in [true, false] {
            let mode = VettingMode::new(RoleFlags::default(), normalize(Some(status)), fallback);
            assert_eq!(mode.can_edit(), fallback, "admin / {status:?} / {fallback}");
        }
    }
}

#[test]
fn test_missing_status_fails_closed() {
    let mode = VettingMode::new(RoleFlags::new(true, true), normalize(None), true);
    assert!(!mode.can_edit());
    assert!(!mode.can_edit_as_vetter());
}

#[test]
fn test_flags_from_backend_role_names() {
    let flags = RoleFlags::from_role_names(["event_admin", "Vetting_Approver"]);
    let mode = VettingMode::new(flags, normalize(Some("pending_approval")), false);
    assert!(mode.is_approver());
    assert!(!mode.is_committee());
    assert!(mode.can_edit());
    assert!(mode.suppress_emails());
}

/*!
 * Tests for advisory validation of locked translations
 */

use seedloc::app_config::ValidationConfig;
use seedloc::placeholder::PlaceholderLocker;
use seedloc::profile::DomainProfile;
use seedloc::validation::service::is_unchanged;
use seedloc::validation::{IssueKind, ValidationEntry, Validator};

fn generic_locker() -> PlaceholderLocker {
    PlaceholderLocker::from_profile(&DomainProfile::builtin("generic").unwrap()).unwrap()
}

#[test]
fn test_validate_withPreservedLockTokens_shouldReportNothing() {
    let locked = generic_locker().lock("Hello {{name}}, welcome");
    let target_locked = locked.text.replace("Hello", "Bonjour").replace("welcome", "bienvenue");
    let source = locked.unlock_self();
    let target = locked.unlock(&target_locked);

    let validator = Validator::new(&ValidationConfig::default());
    let entry = ValidationEntry {
        occurrence: "users:1:greeting:",
        source_locked: &locked.text,
        target_locked: &target_locked,
        source: &source,
        target: &target,
    };

    assert!(validator.validate_entry(&entry, "fr_FR").is_empty());
}

#[test]
fn test_validate_withDroppedLockToken_shouldReportParityWithOccurrence() {
    let locked = generic_locker().lock("Hello {{name}}");
    let validator = Validator::new(&ValidationConfig::default());
    let entry = ValidationEntry {
        occurrence: "users:1:greeting:",
        source_locked: &locked.text,
        target_locked: "Bonjour toi",
        source: "Hello {{name}}",
        target: "Bonjour toi",
    };

    let issues = validator.validate_entry(&entry, "fr_FR");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::PlaceholderParity);
    assert_eq!(issues[0].occurrence.as_deref(), Some("users:1:greeting:"));
}

#[test]
fn test_validate_withCustomRatioBounds_shouldUseThem() {
    let strict = Validator::new(&ValidationConfig {
        length_ratio_min: 0.9,
        length_ratio_max: 1.1,
    });
    let entry = ValidationEntry {
        occurrence: "items:1:title:",
        source_locked: "Shoes",
        target_locked: "Chaussures",
        source: "Shoes",
        target: "Chaussures",
    };

    let report = strict.validate_all(&[entry], "fr_FR");

    assert_eq!(report.checked, 1);
    assert_eq!(report.count(IssueKind::LengthRatio), 1);
    assert_eq!(report.count(IssueKind::PlaceholderParity), 0);
}

#[test]
fn test_validateAll_withEmptySource_shouldNotFlagLength() {
    let validator = Validator::new(&ValidationConfig::default());
    let entry = ValidationEntry {
        occurrence: "items:1:title:",
        source_locked: "",
        target_locked: "x",
        source: "",
        target: "x",
    };

    assert_eq!(validator.validate_all(&[entry], "de_DE").count(IssueKind::LengthRatio), 0);
}

#[test]
fn test_report_shouldSerializeIssueKinds() {
    let validator = Validator::new(&ValidationConfig::default());
    let entry = ValidationEntry {
        occurrence: "items:1:title:",
        source_locked: "__PH0__ Shoes",
        target_locked: "Chaussures",
        source: "x Shoes",
        target: "Chaussures",
    };
    let report = validator.validate_all(&[entry], "fr_FR");

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["locale"], "fr_FR");
    assert_eq!(json["issues"][0]["kind"], "placeholder_parity");
}

#[test]
fn test_isUnchanged_withCaseAndSpacingDifferences_shouldMatch() {
    assert!(is_unchanged("Wireless Mouse", "wireless   mouse"));
    assert!(!is_unchanged("Wireless Mouse", "Souris sans fil"));
}

use super::*;

#[test]
fn fail_on_fatal_only_trips_on_fatal() {
    let mut d = Diagnostics::new();
    d.warning(ErrorCode::CplStructure, "w");
    d.non_fatal(ErrorCode::CoreConstraints, "nf");
    let d = d.fail_on_fatal().unwrap();
    assert_eq!(d.len(), 2);
    assert!(d.has_errors());

    let mut d = d;
    d.fatal(ErrorCode::Internal, "boom");
    let err = d.fail_on_fatal().unwrap_err();
    assert_eq!(err.diagnostics().unwrap().count(Severity::Fatal), 1);
}

#[test]
fn merge_preserves_order() {
    let mut a = Diagnostics::new();
    a.non_fatal(ErrorCode::CplStructure, "first");
    let mut b = Diagnostics::new();
    b.fatal(ErrorCode::EssenceComponent, "second");
    a.merge(b);
    let messages: Vec<_> = a.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, ["first", "second"]);
}

#[test]
fn warnings_alone_are_not_errors() {
    let mut d = Diagnostics::new();
    d.warning(ErrorCode::CplStructure, "w");
    assert!(!d.has_errors());
    assert!(!d.has_fatal());
}

#[test]
fn display_joins_lines() {
    let d: Diagnostics = [
        Diagnostic::fatal(ErrorCode::CplStructure, "a"),
        Diagnostic::non_fatal(ErrorCode::ApplicationProfile, "b"),
    ]
    .into_iter()
    .collect();
    let text = d.to_string();
    assert_eq!(text.lines().count(), 2);
    assert!(text.starts_with("IMF_CPL_ERROR-FATAL-a"));
}

// SPDX-License-Identifier: MIT
use super::*;
use crate::definition::MachineDefinition;

#[test]
fn unknown_initial_state_is_rejected() {
    let yaml = r#"
name: m
initial_state: nope
states: [a]
events: []
transitions: []
"#;
    let err = MachineDefinition::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownInitialState { .. }));
}

#[test]
fn unknown_from_state_is_rejected() {
    let yaml = r#"
name: m
initial_state: a
states: [a]
events: [go]
transitions:
  - from: ghost
    to: a
    event: go
"#;
    let err = MachineDefinition::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownFromState { .. }));
}

#[test]
fn wildcard_from_state_is_allowed() {
    let yaml = r#"
name: m
initial_state: a
states: [a, b]
events: [shutdown]
transitions:
  - from: "*"
    to: b
    event: shutdown
"#;
    assert!(MachineDefinition::from_yaml_str(yaml).is_ok());
}

#[test]
fn unknown_event_is_rejected_unless_timeout_form() {
    let yaml = r#"
name: m
initial_state: a
states: [a, b]
events: []
transitions:
  - from: a
    to: b
    event: timeout(5)
"#;
    assert!(MachineDefinition::from_yaml_str(yaml).is_ok());

    let yaml_bad = r#"
name: m
initial_state: a
states: [a, b]
events: []
transitions:
  - from: a
    to: b
    event: undeclared
"#;
    let err = MachineDefinition::from_yaml_str(yaml_bad).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownEvent { .. }));
}

mod common;

use std::sync::atomic::Ordering;

use common::{Harness, scratch_dir};
use polacode::coordinator::selection::{Position, TextSelection};
use polacode::protocol::SyncMessage;
use polacode::settings::ConfigurationChange;
use polacode::storage::{BG_COLOR_KEY, StateStore};
use polacode::{PanelLifecycle, SavedPanelState, TransferError};
use serde_json::json;

fn non_empty_selection() -> TextSelection {
    TextSelection {
        anchor: Position { line: 0, character: 0 },
        active: Position { line: 3, character: 7 },
    }
}

#[test]
fn activation_sends_init_then_settings() {
    let harness = Harness::new(scratch_dir("activate").join("code.png"));
    harness.settings.set("editor", "fontFamily", json!("Fira Code"));
    harness.settings.set("editor", "fontLigatures", json!(true));
    harness.settings.set("polacode", "shadow", json!("none"));
    harness.state.update(BG_COLOR_KEY, json!("#101010")).expect("seed color");

    harness.coordinator.activate().expect("activate");

    assert_eq!(harness.coordinator.lifecycle().expect("state"), PanelLifecycle::Active);
    assert_eq!(
        harness.channel.take(),
        vec![
            SyncMessage::Init {
                font_family: Some(json!("Fira Code")),
                bg_color: "#101010".to_string(),
            },
            SyncMessage::UpdateSettings {
                shadow: Some(json!("none")),
                transparent_background: None,
                background_color: None,
                target: None,
                ligature_enabled: Some(json!(true)),
            },
        ]
    );
}

#[test]
fn restore_sends_saved_markup_with_persisted_color() {
    let harness = Harness::new(scratch_dir("restore").join("code.png"));

    harness
        .coordinator
        .restore(SavedPanelState {
            inner_html: Some("<span>fn main() {}</span>".to_string()),
        })
        .expect("restore");

    assert_eq!(
        harness.channel.take(),
        vec![SyncMessage::Restore {
            inner_html: Some("<span>fn main() {}</span>".to_string()),
            bg_color: "#2e3440".to_string(),
        }]
    );
}

#[test]
fn second_activation_is_rejected() {
    let harness = Harness::active(scratch_dir("double").join("code.png"));

    let result = harness.coordinator.activate();
    assert!(matches!(result, Err(TransferError::Lifecycle(_))));

    harness.coordinator.dispose().expect("dispose");
    let result = harness.coordinator.restore(SavedPanelState::default());
    assert!(matches!(result, Err(TransferError::Lifecycle(_))));
}

#[test]
fn selection_triggers_update_only_while_active() {
    let harness = Harness::new(scratch_dir("selection").join("code.png"));

    // 激活前没有监听器
    assert!(!harness.coordinator.on_selection_changed(&[non_empty_selection()]).expect("event"));

    harness.coordinator.activate().expect("activate");
    harness.channel.take();

    assert!(harness.coordinator.on_selection_changed(&[non_empty_selection()]).expect("event"));
    assert_eq!(harness.channel.take(), vec![SyncMessage::RequestUpdate]);
    assert_eq!(harness.editor.copies.load(Ordering::SeqCst), 1);

    harness.coordinator.dispose().expect("dispose");
    assert_eq!(harness.coordinator.lifecycle().expect("state"), PanelLifecycle::Disposed);

    assert!(!harness.coordinator.on_selection_changed(&[non_empty_selection()]).expect("event"));
    assert!(harness.channel.take().is_empty());
    assert_eq!(harness.editor.copies.load(Ordering::SeqCst), 1);
}

#[test]
fn dispose_is_idempotent() {
    let harness = Harness::active(scratch_dir("dispose").join("code.png"));
    harness.coordinator.dispose().expect("first dispose");
    harness.coordinator.dispose().expect("second dispose");
    assert_eq!(harness.coordinator.lifecycle().expect("state"), PanelLifecycle::Disposed);
}

#[tokio::test]
async fn messages_outside_active_state_are_dropped() {
    let harness = Harness::new(scratch_dir("inactive").join("code.png"));
    let update = json!({ "type": "updateBgColor", "data": { "bgColor": "#abcdef" } });

    harness.coordinator.handle_message(update.clone()).await.expect("dropped");
    assert!(harness.state.get(BG_COLOR_KEY).expect("read").is_none());

    harness.coordinator.activate().expect("activate");
    harness.coordinator.dispose().expect("dispose");
    harness.channel.take();

    harness.coordinator.handle_message(update).await.expect("dropped");
    harness
        .coordinator
        .handle_message(json!({ "type": "getAndUpdateCacheAndSettings" }))
        .await
        .expect("dropped");

    assert!(harness.state.get(BG_COLOR_KEY).expect("read").is_none());
    assert!(harness.channel.take().is_empty());
}

#[tokio::test]
async fn malformed_messages_after_dispose_are_dropped() {
    let harness = Harness::active(scratch_dir("malformed-disposed").join("code.png"));
    harness.coordinator.dispose().expect("dispose");

    // 已知类型但缺少负载，激活状态下会是 Format 错误
    harness
        .coordinator
        .handle_message(json!({ "type": "shoot" }))
        .await
        .expect("dropped before parsing");
    harness
        .coordinator
        .handle_message(json!({ "type": "shootToClipboard", "data": { "pixels": "nope" } }))
        .await
        .expect("dropped before parsing");

    assert!(harness.dialog.defaults.lock().expect("lock").is_empty());
    assert!(harness.notifier.errors.lock().expect("lock").is_empty());
}

#[test]
fn relevant_configuration_change_pushes_settings() {
    let harness = Harness::active(scratch_dir("config").join("code.png"));
    harness.settings.set("polacode", "transparentBackground", json!(true));

    let pushed = harness
        .coordinator
        .on_configuration_changed(&ConfigurationChange::new(["polacode.transparentBackground"]))
        .expect("change");
    assert!(pushed);
    assert_eq!(
        harness.channel.take(),
        vec![SyncMessage::UpdateSettings {
            shadow: None,
            transparent_background: Some(json!(true)),
            background_color: None,
            target: None,
            ligature_enabled: None,
        }]
    );

    let pushed = harness
        .coordinator
        .on_configuration_changed(&ConfigurationChange::new(["editor.tabSize"]))
        .expect("change");
    assert!(!pushed);
    assert!(harness.channel.take().is_empty());
}

#[test]
fn configuration_change_after_dispose_is_ignored() {
    let harness = Harness::active(scratch_dir("config-disposed").join("code.png"));
    harness.coordinator.dispose().expect("dispose");

    let pushed = harness
        .coordinator
        .on_configuration_changed(&ConfigurationChange::new(["polacode"]))
        .expect("change");

    assert!(!pushed);
    assert!(harness.channel.take().is_empty());
}

#[test]
fn settings_are_read_fresh_on_every_sync() {
    let harness = Harness::active(scratch_dir("fresh").join("code.png"));

    harness.settings.set("polacode", "target", json!("container"));
    harness.coordinator.sync_settings().expect("sync");
    harness.settings.set("polacode", "target", json!("snippet"));
    harness.coordinator.sync_settings().expect("sync");

    let targets: Vec<_> = harness
        .channel
        .take()
        .into_iter()
        .map(|message| match message {
            SyncMessage::UpdateSettings { target, .. } => target,
            other => panic!("unexpected message {:?}", other),
        })
        .collect();
    assert_eq!(targets, vec![Some(json!("container")), Some(json!("snippet"))]);
}

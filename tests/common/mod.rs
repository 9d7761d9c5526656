// Recording doubles for the host collaborators
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use polacode::codec::{Dimensions, PackedPixelBuffer};
use polacode::error::TransferError;
use polacode::host::{EditorBridge, HostServices, Notifier, PendingPath, SaveDialog, SurfaceChannel};
use polacode::protocol::SyncMessage;
use polacode::settings::SettingsSource;
use polacode::sink::clipboard::ClipboardSink;
use polacode::storage::MemoryStateStore;
use polacode::TransferCoordinator;
use polacode::session::SessionState;
use serde_json::Value;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct RecordingChannel {
    pub messages: Mutex<Vec<SyncMessage>>,
}

impl RecordingChannel {
    pub fn take(&self) -> Vec<SyncMessage> {
        std::mem::take(&mut *self.messages.lock().expect("lock"))
    }
}

impl SurfaceChannel for RecordingChannel {
    fn post(&self, message: SyncMessage) -> Result<(), TransferError> {
        self.messages.lock().expect("lock").push(message);
        Ok(())
    }
}

/// Hands out queued answers in prompt order; an empty queue means "cancel".
#[derive(Default)]
pub struct ScriptedDialog {
    pub answers: Mutex<VecDeque<oneshot::Receiver<Option<PathBuf>>>>,
    pub defaults: Mutex<Vec<PathBuf>>,
}

impl ScriptedDialog {
    pub fn answer_with(&self, path: Option<PathBuf>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(path);
        self.answers.lock().expect("lock").push_back(rx);
    }

    pub fn answer_later(&self) -> oneshot::Sender<Option<PathBuf>> {
        let (tx, rx) = oneshot::channel();
        self.answers.lock().expect("lock").push_back(rx);
        tx
    }
}

impl SaveDialog for ScriptedDialog {
    fn prompt(&self, default_path: &Path) -> PendingPath {
        self.defaults.lock().expect("lock").push(default_path.to_path_buf());
        let next = self.answers.lock().expect("lock").pop_front();
        Box::pin(async move {
            match next {
                Some(rx) => rx.await.ok().flatten(),
                None => None,
            }
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn info(&self, text: &str) {
        self.infos.lock().expect("lock").push(text.to_string());
    }

    fn error(&self, text: &str) {
        self.errors.lock().expect("lock").push(text.to_string());
    }
}

#[derive(Default)]
pub struct CountingEditor {
    pub copies: AtomicUsize,
}

impl EditorBridge for CountingEditor {
    fn copy_selection_as_rich_text(&self) {
        self.copies.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FixedSettings {
    pub values: Mutex<HashMap<(String, String), Value>>,
}

impl FixedSettings {
    pub fn set(&self, section: &str, key: &str, value: Value) {
        self.values
            .lock()
            .expect("lock")
            .insert((section.to_string(), key.to_string()), value);
    }
}

impl SettingsSource for FixedSettings {
    fn get(&self, section: &str, key: &str) -> Option<Value> {
        self.values
            .lock()
            .expect("lock")
            .get(&(section.to_string(), key.to_string()))
            .cloned()
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub writes: Mutex<Vec<(Vec<u32>, Dimensions)>>,
    pub fail: AtomicBool,
}

impl ClipboardSink for RecordingClipboard {
    fn write_image(&self, pixels: &PackedPixelBuffer, dimensions: Dimensions) -> Result<(), TransferError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransferError::Clipboard("platform not supported".to_string()));
        }
        self.writes
            .lock()
            .expect("lock")
            .push((pixels.as_words().to_vec(), dimensions));
        Ok(())
    }
}

pub struct Harness {
    pub channel: Arc<RecordingChannel>,
    pub dialog: Arc<ScriptedDialog>,
    pub notifier: Arc<RecordingNotifier>,
    pub editor: Arc<CountingEditor>,
    pub settings: Arc<FixedSettings>,
    pub state: Arc<MemoryStateStore>,
    pub clipboard: Arc<RecordingClipboard>,
    pub coordinator: TransferCoordinator,
}

impl Harness {
    pub fn new(default_path: PathBuf) -> Self {
        let channel = Arc::new(RecordingChannel::default());
        let dialog = Arc::new(ScriptedDialog::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let editor = Arc::new(CountingEditor::default());
        let settings = Arc::new(FixedSettings::default());
        let state = Arc::new(MemoryStateStore::new());
        let clipboard = Arc::new(RecordingClipboard::default());

        let services = HostServices {
            channel: channel.clone(),
            dialog: dialog.clone(),
            notifier: notifier.clone(),
            editor: editor.clone(),
            settings: settings.clone(),
            state: state.clone(),
            clipboard: clipboard.clone(),
        };

        Self {
            coordinator: TransferCoordinator::new(services, SessionState::new(default_path)),
            channel,
            dialog,
            notifier,
            editor,
            settings,
            state,
            clipboard,
        }
    }

    /// Activated panel with the activation messages already drained.
    pub fn active(default_path: PathBuf) -> Self {
        let harness = Self::new(default_path);
        harness.coordinator.activate().expect("activate");
        harness.channel.take();
        harness
    }
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("polacode-it-{}-{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

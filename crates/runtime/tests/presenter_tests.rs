use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pixel_novel::{
    rgb, story, Bitmap, Caption, EditCommand, KeyValueStore, ManualClock, MemoryStore, Mode,
    OverridePersistence, Placement, PnError, PnResult, Session, OVERRIDES_KEY,
};
use pixel_novel_runtime::{
    Audio, AsyncImageLoader, DisplayInfo, ImageHandle, Input, InputAction, MemoryImageSource,
    PresenterApp, PresenterConfig, SceneImages, Tone,
};

#[derive(Default)]
struct NullInput;

impl Input for NullInput {
    fn handle_window_event(&mut self, _event: &winit::event::WindowEvent) -> InputAction {
        InputAction::None
    }
}

#[derive(Clone, Default)]
struct RecordingAudio {
    tones: Rc<RefCell<Vec<Tone>>>,
}

impl Audio for RecordingAudio {
    fn play_tone(&mut self, tone: Tone) {
        self.tones.borrow_mut().push(tone);
    }
}

/// Storage that refuses every write.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> PnResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, key: &str, _value: &str) -> PnResult<()> {
        Err(PnError::Storage {
            key: key.to_string(),
            message: "read-only".to_string(),
        })
    }

    fn remove(&mut self, key: &str) -> PnResult<()> {
        self.set(key, "")
    }
}

type TestApp<K = MemoryStore> = PresenterApp<NullInput, RecordingAudio, Rc<ManualClock>, K>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn app_with<K: KeyValueStore>(
    storage: K,
    images: SceneImages,
) -> (TestApp<K>, Rc<ManualClock>, RecordingAudio) {
    let store = story::default_store().expect("story");
    let clock = Rc::new(ManualClock::new());
    let audio = RecordingAudio::default();
    let app = PresenterApp::new(
        store,
        Session::new(),
        OverridePersistence::new(storage),
        NullInput,
        audio.clone(),
        clock.clone(),
        pixel_novel::LayoutMode::Overlay,
        images,
    );
    (app, clock, audio)
}

fn unloaded_app() -> (TestApp, Rc<ManualClock>, RecordingAudio) {
    let store = story::default_store().expect("story");
    app_with(MemoryStore::default(), SceneImages::unloaded(&store))
}

#[test]
fn tap_plays_cue_once_and_advances_after_delay() {
    let (mut app, clock, audio) = unloaded_app();

    assert!(app.handle_action(InputAction::Tap));
    clock.advance(ms(200));
    app.handle_action(InputAction::Tap);
    assert_eq!(audio.tones.borrow().as_slice(), &[Tone::ADVANCE_CUE]);

    clock.advance(ms(299));
    app.update();
    assert_eq!(app.session().index(), 0);
    clock.advance(ms(1));
    app.update();
    assert_eq!(app.session().index(), 1);
}

#[test]
fn taps_while_editing_are_silent() {
    let (mut app, clock, audio) = unloaded_app();
    app.handle_action(InputAction::ToggleEditor);
    assert_eq!(app.session().mode(), Mode::Editing);
    app.handle_action(InputAction::Tap);
    clock.advance(ms(600));
    app.update();
    assert!(audio.tones.borrow().is_empty());
    assert_eq!(app.session().index(), 0);
}

#[test]
fn persisted_edits_are_saved_immediately() {
    let (mut app, _clock, _audio) = unloaded_app();
    app.handle_action(InputAction::ToggleEditor);
    app.handle_action(InputAction::Edit(EditCommand::ToggleGrid));
    assert_eq!(
        app.persistence().storage().get(OVERRIDES_KEY).expect("get"),
        None
    );

    app.handle_action(InputAction::Edit(EditCommand::ToggleCaption));
    let blob = app
        .persistence()
        .storage()
        .get(OVERRIDES_KEY)
        .expect("get")
        .expect("saved after caption toggle");
    assert!(blob.starts_with(r#"[{"spriteX":60,"spriteY":90,"caption":"off"}"#));
}

#[test]
fn moves_wait_for_the_sprite_image() {
    let (mut app, _clock, _audio) = unloaded_app();
    app.handle_action(InputAction::ToggleEditor);
    app.handle_action(InputAction::Edit(EditCommand::Move { dx: 5, dy: 0 }));
    assert_eq!(app.store().scenes()[0].sprite_x, Some(60));
    assert_eq!(
        app.persistence().storage().get(OVERRIDES_KEY).expect("get"),
        None
    );
}

#[test]
fn stored_overrides_apply_before_the_first_frame() {
    let store = story::default_store().expect("story");
    let storage = MemoryStore::with_entry(OVERRIDES_KEY, r#"[{"caption":"off"}]"#);
    let (mut app, _clock, _audio) = app_with(storage, SceneImages::unloaded(&store));
    assert_eq!(app.store().scenes()[0].caption, Some(Caption::Off));
    assert!(!app.draw().caption);
}

#[test]
fn draws_loaded_images() {
    let store = story::default_store().expect("story");
    let mut images = SceneImages::unloaded(&store);
    images.backgrounds[0] = ImageHandle::ready("background1.png", Bitmap::solid(160, 144, rgb(1, 2, 3)));
    images.sprite = ImageHandle::ready(story::SPRITE_PATH, Bitmap::solid(16, 24, rgb(9, 9, 9)));
    let (mut app, _clock, _audio) = app_with(MemoryStore::default(), images);

    let summary = app.draw();
    assert!(summary.background);
    assert_eq!(
        summary.sprite,
        Some(Placement {
            x: 60,
            y: 88,
            width: 16,
            height: 24
        })
    );
    assert_eq!(app.frame().pixel(0, 0), Some(rgb(1, 2, 3)));
}

#[test]
fn frame_gate_paces_the_loop() {
    let (mut app, clock, _audio) = unloaded_app();
    assert!(!app.update(), "first callback only primes");
    assert_eq!(app.next_wakeup(), Duration::from_secs(1) / 12);
    clock.advance(ms(50));
    assert!(!app.update());
    clock.advance(ms(34));
    assert!(app.update());

    app.handle_action(InputAction::Tap);
    assert!(app.next_wakeup() <= Duration::from_secs(1) / 12);
}

#[test]
fn quit_stops_the_loop() {
    let (mut app, _clock, _audio) = unloaded_app();
    assert!(!app.handle_action(InputAction::Quit));
}

#[test]
fn loader_publishes_ready_handles() {
    let source = MemoryImageSource::default()
        .with_image("background1.png", Bitmap::solid(160, 144, rgb(5, 5, 5)));
    let loader = AsyncImageLoader::new(source);
    let ready = loader.request("background1.png");
    let missing = loader.request("background2.png");

    let deadline = Instant::now() + Duration::from_secs(5);
    while loader.is_loading() && Instant::now() < deadline {
        std::thread::sleep(ms(5));
    }
    assert!(ready.is_ready());
    assert_eq!(ready.dimensions(), Some((160, 144)));
    assert!(!missing.is_ready());
    assert_eq!(missing.dimensions(), None);
}

#[test]
fn config_resolves_scale_and_layout() {
    let config =
        PresenterConfig::from_toml_str("layout = \"reserved_band\"\nscale = 3\n").expect("toml");
    let resolved = config.resolve(None);
    assert_eq!(resolved.window_size, (480, 552));
    assert_eq!(resolved.advance_delay, ms(500));

    let resolved = PresenterConfig::default().resolve(Some(DisplayInfo {
        width: 1920,
        height: 1080,
    }));
    assert_eq!(resolved.scale, 7);
    assert_eq!(resolved.window_size, (1120, 1008));

    let tiny = PresenterConfig::default().resolve(Some(DisplayInfo {
        width: 100,
        height: 100,
    }));
    assert_eq!(tiny.scale, 1);
}

#[test]
fn config_rejects_unknown_layouts() {
    assert!(PresenterConfig::from_toml_str("layout = \"sideways\"").is_err());
}

#[test]
fn failed_saves_keep_the_edit_and_the_session() {
    let store = story::default_store().expect("story");
    let (mut app, clock, audio) = app_with(ReadOnlyStore, SceneImages::unloaded(&store));

    assert!(app.handle_action(InputAction::ToggleEditor));
    assert!(app.handle_action(InputAction::Edit(EditCommand::ToggleCaption)));
    assert_eq!(app.store().scenes()[0].caption, Some(Caption::Off));

    assert!(app.handle_action(InputAction::ToggleEditor));
    assert!(app.handle_action(InputAction::Tap));
    clock.advance(ms(500));
    app.update();
    assert_eq!(app.session().index(), 1);
    assert_eq!(audio.tones.borrow().len(), 1);
}

#![allow(dead_code)]

use std::time::Duration;

use pixel_novel::{rgb, story, Bitmap, Mode, SceneStore, Session, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

pub const PLAYFIELD: (u32, u32) = (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
/// Native size of the shipped sprite.
pub const SPRITE: (u32, u32) = (16, 24);
pub const SPRITE_COLOR: [u8; 4] = rgb(200, 40, 60);

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn shipped_store() -> SceneStore {
    story::default_store().expect("shipped story is never empty")
}

pub fn editing_at(index: usize, store: &mut SceneStore) -> Session {
    let mut session = Session::new().with_mode(Mode::Editing);
    for _ in 0..index {
        session.apply(pixel_novel::EditCommand::NextScene, store, PLAYFIELD, None);
    }
    session
}

pub fn sprite_bitmap() -> Bitmap {
    Bitmap::solid(SPRITE.0, SPRITE.1, SPRITE_COLOR)
}

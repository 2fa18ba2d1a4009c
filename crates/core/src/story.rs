//! The shipped story: a princess in the valley of light.

use crate::error::PnResult;
use crate::scene::{Scene, SceneStore};

/// Sprite shared by every scene (16x24 in the shipped assets).
pub const SPRITE_PATH: &str = "princess.png";

pub fn background_path(index: usize) -> String {
    format!("background{}.png", index + 1)
}

/// Literal scene data, in story order.
pub fn valley_of_light() -> Vec<Scene> {
    let lines: [(&str, bool, i32, i32); 10] = [
        ("In a quiet valley,", true, 0, -2),
        ("morning light gathered.", true, 1, -1),
        ("The princess listened", true, 0, 0),
        ("to rivers of silver wind.", false, 0, 0),
        ("Mountains breathed slow.", false, 0, 0),
        ("Flowers woke like lanterns.", true, 1, 0),
        ("A path opened softly.", true, 0, 0),
        ("She stepped without hurry.", true, -1, 0),
        ("Light welcomed her home.", true, 0, -1),
        ("And the valley glowed.", false, 0, 0),
    ];

    let mut scenes: Vec<Scene> = lines
        .iter()
        .enumerate()
        .map(|(index, &(text, shown, px, py))| {
            Scene::new(text, background_path(index))
                .with_sprite(shown)
                .nudged(px, py)
        })
        .collect();

    scenes[0] = scenes[0].clone().with_sprite_x(60).with_sprite_y(90);
    // left side, then right side
    scenes[6] = scenes[6].clone().with_sprite_x(20);
    scenes[7] = scenes[7].clone().with_sprite_x(110);
    scenes
}

pub fn default_store() -> PnResult<SceneStore> {
    SceneStore::new(valley_of_light())
}

/// Every image the presenter needs, backgrounds first. Used to pre-warm the
/// offline cache and by the CLI manifest check.
pub fn asset_manifest(scene_count: usize) -> Vec<String> {
    let mut paths: Vec<String> = (0..scene_count).map(background_path).collect();
    paths.push(SPRITE_PATH.to_string());
    paths
}

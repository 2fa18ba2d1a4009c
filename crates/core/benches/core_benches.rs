use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use pixel_novel::{
    compose_frame, decode_overrides, encode_overrides, rgb, story, Bitmap, Canvas, EditCommand,
    FrameAssets, LayoutMode, Mode, Session,
};

fn checker(width: u32, height: u32) -> Bitmap {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let shade = if (x / 4 + y / 4) % 2 == 0 { 200 } else { 60 };
            pixels.extend_from_slice(&[shade, shade / 2, 90, 255]);
        }
    }
    Bitmap::from_rgba(width, height, pixels).expect("checker")
}

fn bench_compose_frame(c: &mut Criterion) {
    let store = story::default_store().expect("store");
    let background = checker(160, 144);
    let sprite = Bitmap::solid(16, 32, rgb(220, 120, 160));
    let mut group = c.benchmark_group("compose_frame");
    for layout in [LayoutMode::Overlay, LayoutMode::ReservedBand] {
        let (width, height) = layout.canvas_size();
        let mut canvas = Canvas::new(width, height);
        let assets = FrameAssets {
            background: Some(&background),
            sprite: Some(&sprite),
        };
        group.bench_function(format!("{layout:?}"), |b| {
            let session = Session::new();
            b.iter(|| compose_frame(&mut canvas, &store, &session, layout, assets))
        });
    }
    group.finish();
}

fn bench_editor_frame(c: &mut Criterion) {
    let store = story::default_store().expect("store");
    let background = checker(160, 144);
    let mut canvas = Canvas::new(160, 144);
    let mut session = Session::new().with_mode(Mode::Editing);
    let mut scratch = store.clone();
    session.apply(EditCommand::ToggleGrid, &mut scratch, (160, 144), None);
    c.bench_function("compose_frame_editing", |b| {
        let assets = FrameAssets {
            background: Some(&background),
            sprite: None,
        };
        b.iter(|| compose_frame(&mut canvas, &scratch, &session, LayoutMode::Overlay, assets))
    });
}

fn bench_override_codec(c: &mut Criterion) {
    let mut store = story::default_store().expect("store");
    let mut session = Session::new().with_mode(Mode::Editing);
    for _ in 0..store.len() {
        session.apply(
            EditCommand::Move { dx: 3, dy: -2 },
            &mut store,
            (160, 144),
            Some((16, 32)),
        );
        session.apply(EditCommand::ScaleUp, &mut store, (160, 144), Some((16, 32)));
        session.apply(EditCommand::NextScene, &mut store, (160, 144), Some((16, 32)));
    }
    let encoded = encode_overrides(&store).expect("encode");
    c.bench_function("encode_overrides", |b| {
        b.iter(|| encode_overrides(&store).expect("encode"))
    });
    c.bench_function("decode_and_apply_overrides", |b| {
        b.iter_batched(
            || story::default_store().expect("store"),
            |mut fresh| {
                let overrides = decode_overrides(&encoded).expect("decode");
                fresh.apply_overrides(&overrides)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    core_benches,
    bench_compose_frame,
    bench_editor_frame,
    bench_override_codec
);
criterion_main!(core_benches);

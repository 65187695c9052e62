//! Integration tests for Facecard

use std::sync::{Arc, Mutex};

use facecard::editor::{self, EditorWarning};
use facecard::error::ExportError;
use facecard::export::{
    export_filename, CardCapture, ExportFormat, ExportJob, ExportMode, ExportPipeline,
    ExportSettings,
};
use facecard::model::{AttributeKind, Attributes, CardPatch, CardSlot, Layout, ViewMode};
use facecard::platform::{
    CanvasProvider, DirectorySink, FileSink, JsonFileStorage, MemorySink, RasterCanvas,
    SourceDecoder, StateStorage, TextStyle,
};
use facecard::preview::{self, PreviewSize};
use facecard::render::fonts::Fonts;
use facecard::render::raster::{encode_png, RasterOptions};
use facecard::render::svg::render_svg;
use facecard::render::{RenderedCard, ResolvedImages};
use facecard::seed;
use facecard::store::{Cards, EditorStore, StoreState, STORAGE_KEY};
use image::RgbaImage;

/// Blank bitmap of the requested output size; no fonts needed.
struct BlankCapture;

impl CardCapture for BlankCapture {
    fn capture_png(
        &self,
        card: &RenderedCard,
        options: &RasterOptions,
        _: &ResolvedImages,
    ) -> Result<Vec<u8>, ExportError> {
        let (w, h) = options.output_size(card);
        encode_png(&RgbaImage::new(w, h))
    }

    fn capture_svg(&self, card: &RenderedCard) -> Result<String, ExportError> {
        Ok(render_svg(card))
    }
}

struct BrokenCapture;

impl CardCapture for BrokenCapture {
    fn capture_png(
        &self,
        _: &RenderedCard,
        _: &RasterOptions,
        _: &ResolvedImages,
    ) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Rasterize("no surface".into()))
    }

    fn capture_svg(&self, _: &RenderedCard) -> Result<String, ExportError> {
        Err(ExportError::Rasterize("no surface".into()))
    }
}

/// Remembers every canvas size it hands out. Captions are ignored.
#[derive(Default)]
struct SizedCanvases {
    sizes: Arc<Mutex<Vec<(u32, u32)>>>,
}

struct BlankCanvas(u32, u32);

impl RasterCanvas for BlankCanvas {
    fn size(&self) -> (u32, u32) {
        (self.0, self.1)
    }

    fn draw_image(&mut self, _: &RgbaImage, _: i64, _: i64) {}

    fn fill_text_centered(&mut self, _: &str, _: f32, _: f32, _: &TextStyle) -> Result<(), ExportError> {
        Ok(())
    }

    fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        encode_png(&RgbaImage::new(self.0, self.1))
    }
}

impl CanvasProvider for SizedCanvases {
    fn create_canvas(&self, width: u32, height: u32) -> Result<Box<dyn RasterCanvas>, ExportError> {
        self.sizes.lock().unwrap().push((width, height));
        Ok(Box::new(BlankCanvas(width, height)))
    }
}

fn pipeline(capture: Arc<dyn CardCapture>, canvases: Arc<SizedCanvases>, sink: Arc<dyn FileSink>) -> ExportPipeline {
    ExportPipeline::new(
        ExportSettings::default(),
        capture,
        Arc::new(SourceDecoder),
        canvases,
        sink,
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

mod store_tests {
    use super::*;

    #[test]
    fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let mut store = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Dual));
        store.update(CardSlot::After, CardPatch::score(9.4)).unwrap();
        store.set_mode(ViewMode::CompareSide);
        store.persist(&storage).unwrap();

        let restored = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Dual));
        assert_eq!(restored.mode(), ViewMode::CompareSide);
        assert_eq!(restored.card(CardSlot::After).unwrap().score, 9.4);
        assert_eq!(
            restored.card(CardSlot::Before).unwrap(),
            &seed::facecard_before()
        );
    }

    #[test]
    fn test_snapshot_format() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        let store = EditorStore::new(seed::initial_state(Layout::Single));
        store.persist(&storage).unwrap();

        let raw = storage.read(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 0);
        assert!(value["state"].is_object());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        storage.write(STORAGE_KEY, "{ not json").unwrap();

        let store = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Dual));
        assert_eq!(*store.state(), seed::initial_state(Layout::Dual));
    }

    #[test]
    fn test_other_layout_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        EditorStore::new(seed::initial_state(Layout::Single))
            .persist(&storage)
            .unwrap();

        let store = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Dual));
        assert_eq!(store.layout(), Layout::Dual);
    }

    #[test]
    fn test_snapshot_with_repeated_stat_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let mut card = seed::stat_card();
        if let Attributes::Stats(stats) = &mut card.attributes {
            let first = stats[0].clone();
            stats.push(first);
        }
        let state = StoreState {
            mode: ViewMode::After,
            cards: Cards::Single { card },
        };
        EditorStore::new(state).persist(&storage).unwrap();

        let store = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Single));
        assert_eq!(*store.state(), seed::initial_state(Layout::Single));
        assert_eq!(store.card(CardSlot::Card).unwrap().attributes.len(), 6);
    }

    #[test]
    fn test_snapshot_with_duplicate_trait_ids_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let mut state = seed::initial_state(Layout::Dual);
        if let Cards::Dual { before, .. } = &mut state.cards {
            if let Attributes::Traits(traits) = &mut before.attributes {
                let first_id = traits[0].id.clone();
                traits[1].id = first_id;
            }
        }
        EditorStore::new(state).persist(&storage).unwrap();

        let store = EditorStore::rehydrate(&storage, seed::initial_state(Layout::Dual));
        assert_eq!(
            store.card(CardSlot::Before).unwrap(),
            &seed::facecard_before()
        );
    }

    #[test]
    fn test_reset_restores_one_slot_only() {
        let mut store = EditorStore::new(seed::initial_state(Layout::Dual));
        store.update(CardSlot::Before, CardPatch::score(1.0)).unwrap();
        store.update(CardSlot::After, CardPatch::score(2.0)).unwrap();

        store.reset(CardSlot::Before).unwrap();
        assert_eq!(store.card(CardSlot::Before).unwrap(), &seed::facecard_before());
        assert_eq!(store.card(CardSlot::After).unwrap().score, 2.0);
    }
}

mod editor_tests {
    use super::*;

    #[test]
    fn test_values_are_clamped() {
        let mut store = EditorStore::new(seed::initial_state(Layout::Single));
        let card = store.card(CardSlot::Card).unwrap().clone();
        let id = card.attributes.entries()[0].id.to_string();

        store
            .update(CardSlot::Card, editor::adjust_value(&card, &id, 500.0))
            .unwrap();
        store.update(CardSlot::Card, CardPatch::score(-3.0)).unwrap();

        let card = store.card(CardSlot::Card).unwrap();
        assert_eq!(card.attributes.entries()[0].value, 100.0);
        assert_eq!(card.score, 0.0);
    }

    #[test]
    fn test_stat_count_is_fixed() {
        let card = seed::stat_card();
        let id = card.attributes.entries()[0].id.to_string();
        assert_eq!(
            editor::remove_entry(&card, &id),
            Err(EditorWarning::BelowMinimum(AttributeKind::Stats))
        );
        assert_eq!(
            editor::add_entry(&card),
            Err(EditorWarning::AboveMaximum(AttributeKind::Stats))
        );
    }

    #[test]
    fn test_traits_grow_to_eight() {
        let mut card = seed::facecard_after();
        while card.attributes.len() < 8 {
            card = card.merged(editor::add_entry(&card).unwrap());
        }
        let refused = editor::add_entry(&card).unwrap_err();
        assert_eq!(refused.to_string(), "Maximum 8 traits allowed");
    }
}

mod export_tests {
    use super::*;

    #[test]
    fn test_before_export_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(DirectorySink::new(dir.path()));
        let pipeline = pipeline(Arc::new(BlankCapture), Arc::default(), sink);

        let mut state = seed::initial_state(Layout::Dual);
        state.mode = ViewMode::Before;
        let job = ExportJob::from_mounted(&preview::mount(&state), ExportMode::Before, ExportFormat::Png);

        let outcome = runtime().block_on(pipeline.run(job)).unwrap();
        assert_eq!(outcome.filename, "facecard-before.png");

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("facecard-before.png")]);

        let image = image::open(dir.path().join("facecard-before.png")).unwrap();
        let expected = RasterOptions::new(3.0)
            .with_padding(100.0, 120.0)
            .output_size(preview::mount(&state).before.as_ref().unwrap());
        assert_eq!((image.width(), image.height()), expected);
    }

    #[test]
    fn test_two_up_canvas_size() {
        let sink = Arc::new(MemorySink::default());
        let canvases = Arc::new(SizedCanvases::default());
        let pipeline = pipeline(Arc::new(BlankCapture), Arc::clone(&canvases), sink.clone());

        let mut state = seed::initial_state(Layout::Dual);
        state.mode = ViewMode::CompareSlider;
        let mounted = preview::mount(&state);
        let job = ExportJob::from_mounted(&mounted, ExportMode::Comparison, ExportFormat::Svg);

        runtime().block_on(pipeline.run(job)).unwrap();

        let (w, h) = RasterOptions::new(2.0).output_size(mounted.before.as_ref().unwrap());
        assert_eq!(*canvases.sizes.lock().unwrap(), vec![(w * 2 + 40, h + 60)]);

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].filename, "facecard-comparison.png");
        assert_eq!(deliveries[0].mime, "image/png");
    }

    #[test]
    fn test_two_up_with_built_in_backends() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = ExportPipeline::with_backends(
            ExportSettings::default(),
            Some(Fonts::embedded().unwrap()),
            sink.clone(),
        );

        let mut state = seed::initial_state(Layout::Dual);
        state.mode = ViewMode::CompareSide;
        let mounted = preview::mount(&state);
        let job = ExportJob::from_mounted(&mounted, ExportMode::Comparison, ExportFormat::Png);
        runtime().block_on(pipeline.run(job)).unwrap();

        let (w, h) = RasterOptions::new(2.0).output_size(mounted.before.as_ref().unwrap());
        let delivered = &sink.deliveries()[0];
        let image = image::load_from_memory(&delivered.bytes).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (w * 2 + 40, h + 60));

        // Both cards are painted and the gutter between them stays clear.
        assert_eq!(image.get_pixel(w / 2, h / 2).0[3], 255);
        assert_eq!(image.get_pixel(w + 40 + w / 2, h / 2).0[3], 255);
        assert_eq!(image.get_pixel(w + 20, h / 2).0[3], 0);

        // Captions land in the strip under each card.
        let inked = |x0: u32, x1: u32| {
            (h..h + 60).any(|y| (x0..x1).any(|x| image.get_pixel(x, y).0[3] > 0))
        };
        assert!(inked(0, w));
        assert!(inked(w + 40, w * 2 + 40));
    }

    #[test]
    fn test_png_export_with_built_in_backends() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ExportPipeline::with_backends(
            ExportSettings::default(),
            Some(Fonts::embedded().unwrap()),
            Arc::new(DirectorySink::new(dir.path())),
        );

        let state = seed::initial_state(Layout::Single);
        let mounted = preview::mount(&state);
        let job = ExportJob::from_mounted(&mounted, ExportMode::Single, ExportFormat::Png);
        let outcome = runtime().block_on(pipeline.run(job)).unwrap();

        let image = image::open(&outcome.path).unwrap().to_rgba8();
        let expected = RasterOptions::new(3.0)
            .with_padding(100.0, 120.0)
            .output_size(mounted.card.as_ref().unwrap());
        assert_eq!(image.dimensions(), expected);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(expected.0 / 2, expected.1 / 2).0[3], 255);
    }

    #[test]
    fn test_svg_export_is_vector() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = pipeline(Arc::new(BlankCapture), Arc::default(), sink.clone());

        let state = seed::initial_state(Layout::Single);
        let job = ExportJob::from_mounted(&preview::mount(&state), ExportMode::Single, ExportFormat::Svg);
        runtime().block_on(pipeline.run(job)).unwrap();

        let delivered = &sink.deliveries()[0];
        assert_eq!(delivered.filename, "facecard.svg");
        let svg = String::from_utf8(delivered.bytes.clone()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(&state.card(CardSlot::Card).unwrap().brand_text));
    }

    #[test]
    fn test_failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(DirectorySink::new(dir.path()));
        let pipeline = pipeline(Arc::new(BrokenCapture), Arc::default(), sink);

        let state = seed::initial_state(Layout::Dual);
        let job = ExportJob::from_mounted(&preview::mount(&state), ExportMode::After, ExportFormat::Png);
        assert!(runtime().block_on(pipeline.run(job)).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = pipeline(Arc::new(BlankCapture), Arc::default(), sink.clone());

        // After mode mounts only the after card.
        let state = seed::initial_state(Layout::Dual);
        let job = ExportJob::from_mounted(&preview::mount(&state), ExportMode::Before, ExportFormat::Png);
        let err = runtime().block_on(pipeline.run(job)).unwrap_err();
        assert!(matches!(err, ExportError::MissingNode(ExportMode::Before)));
        assert!(sink.deliveries().is_empty());
    }

    #[test]
    fn test_filenames() {
        let names: Vec<String> = [
            (ExportMode::Single, ExportFormat::Png),
            (ExportMode::Single, ExportFormat::Svg),
            (ExportMode::Before, ExportFormat::Png),
            (ExportMode::After, ExportFormat::Svg),
            (ExportMode::Comparison, ExportFormat::Png),
        ]
        .into_iter()
        .map(|(mode, format)| export_filename(mode, format))
        .collect();

        insta::assert_snapshot!(names.join("\n"), @r###"
        facecard.png
        facecard.svg
        facecard-before.png
        facecard-after.svg
        facecard-comparison.png
        "###);
    }
}

mod preview_tests {
    use super::*;

    #[test]
    fn test_thumbnail_keeps_content() {
        let card = seed::facecard_after();
        let phone = preview::render(&card, PreviewSize::Phone);
        let thumb = preview::render(&card, PreviewSize::Thumbnail);
        assert_eq!(phone.elements.len(), thumb.elements.len());
        assert!(thumb.width < phone.width);
    }

    #[test]
    fn test_mount_follows_mode() {
        let mut state = seed::initial_state(Layout::Dual);
        for (mode, before, after) in [
            (ViewMode::Before, true, false),
            (ViewMode::After, false, true),
            (ViewMode::CompareSide, true, true),
            (ViewMode::CompareSlider, true, true),
        ] {
            state.mode = mode;
            let mounted = preview::mount(&state);
            assert_eq!(mounted.before.is_some(), before, "{mode:?}");
            assert_eq!(mounted.after.is_some(), after, "{mode:?}");
            assert!(mounted.card.is_none());
        }
    }
}

use std::sync::{Arc, Mutex};

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use thumbforge::config::setup_logging;
use thumbforge::design::DesignIntent;
use thumbforge::thumbnail::Composer;
use thumbforge::thumbnail::background::PhotoSource;
use thumbforge::thumbnail::text::FontStack;

/// Hands out a flat gray photo and remembers what it was asked for.
#[derive(Default)]
struct RecordingPhotos {
    queries: Mutex<Vec<String>>,
}

impl PhotoSource for RecordingPhotos {
    fn fetch_background(&self, query: &str) -> Option<DynamicImage> {
        self.queries
            .lock()
            .expect("lock")
            .push(query.to_string());
        Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            640,
            360,
            Rgb([120, 120, 120]),
        )))
    }
}

#[test]
fn photo_backgrounds_follow_the_video_topic() {
    let _ = setup_logging(true);

    let photos = Arc::new(RecordingPhotos::default());
    let composer = Composer::new(photos.clone(), FontStack::builtin());
    let design = DesignIntent::from_value(&json!({
        "main_text": "pizza gecesi",
        "text_position": "top",
        "colors": {"overlay_opacity": 0.5},
    }));

    let rendered = composer
        .compose(&design, "Yemek", "Ev yapımı pizza", "")
        .expect("compose");
    let decoded = image::load_from_memory_with_format(&rendered.jpeg, ImageFormat::Jpeg)
        .expect("valid jpeg");
    assert_eq!(decoded.dimensions(), (1280, 720));

    let queries = photos.queries.lock().expect("lock");
    assert_eq!(queries.len(), 1);
    assert!(queries[0].starts_with("pizza,"), "{}", queries[0]);
    assert!(queries[0].ends_with("high contrast"), "{}", queries[0]);
}

#[test]
fn unusable_font_files_fall_back_to_the_builtin_face() {
    let _ = setup_logging(true);

    let dir = tempfile::tempdir().expect("tempdir");
    let garbage = dir.path().join("broken.ttf");
    std::fs::write(&garbage, b"definitely not a font").expect("write");

    let composer = Composer::new(
        Arc::new(thumbforge::thumbnail::background::NoPhotos),
        FontStack::from_paths([garbage, dir.path().join("missing.ttf")]),
    )
    .with_seed(Some(42));
    let design = DesignIntent::from_value(&json!({"main_text": "YEDEK", "sub_text": "font"}));

    let canvas = composer.render(&design, "Diğer", "", "");
    assert_eq!(canvas.dimensions(), (1280, 720));
    // White title ink lands somewhere along the centre row.
    let bright = (0..1280)
        .map(|x| canvas.get_pixel(x, 360))
        .any(|Rgb(pixel)| pixel.iter().all(|channel| *channel > 200));
    assert!(bright, "expected title ink across the centre row");
}

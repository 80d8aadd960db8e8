//! Asset Loading Tests
//!
//! Tests for:
//! - Locator classification (path, URL, data URI)
//! - Decoding from bytes, files and base64 data URIs
//! - ImageLoader completion tracking and the ready latch
//! - Fail and Skip load policies

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use plunge::assets::{
    ImageLoader, ImageSource, LoadPolicy, decode_data_uri, decode_image, load_images,
};
use plunge::{AssetError, Error, Image};

const TIMEOUT: Duration = Duration::from_secs(5);

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
    let path = std::env::temp_dir().join(format!("plunge-{}-{name}.png", std::process::id()));
    std::fs::write(&path, png_bytes(width, height, [1, 2, 3, 255])).expect("write temp png");
    path
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn locators_are_classified() {
    assert!(matches!(ImageSource::parse("photos/a.jpg"), ImageSource::Path(_)));
    assert!(matches!(ImageSource::parse("https://x.org/a.png"), ImageSource::Url(_)));
    assert!(matches!(ImageSource::parse("HTTP://x.org/a.png"), ImageSource::Url(_)));
    assert!(matches!(
        ImageSource::parse("data:image/png;base64,AAAA"),
        ImageSource::DataUri(_)
    ));
}

#[test]
fn only_urls_are_remote() {
    assert!(ImageSource::parse("https://x.org/a.png").is_remote());
    assert!(!ImageSource::parse("data:image/png;base64,AAAA").is_remote());
    assert!(!ImageSource::parse("./a.png").is_remote());
    assert!(!ImageSource::from(Image::solid("s", 1, 1, [0; 4])).is_remote());
}

#[test]
fn sources_deserialize_from_strings() {
    let sources: Vec<ImageSource> =
        serde_json::from_str(r#"["a.png", "https://x.org/b.png"]"#).unwrap();
    assert!(matches!(sources[0], ImageSource::Path(_)));
    assert!(sources[1].is_remote());
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn decode_png_bytes() {
    let image = decode_image("mem", &png_bytes(7, 5, [9, 8, 7, 255])).unwrap();
    assert_eq!((image.width(), image.height()), (7, 5));
    assert_eq!(image.label(), "mem");
    assert_eq!(image.pixels().get_pixel(3, 2).0, [9, 8, 7, 255]);
}

#[test]
fn decode_garbage_is_an_error() {
    let err = decode_image("junk", b"not an image").unwrap_err();
    assert!(matches!(err, AssetError::Decode { ref source_name, .. } if source_name == "junk"));
}

#[test]
fn data_uri_round_trips_through_base64() {
    let bytes = png_bytes(3, 4, [0, 0, 255, 255]);
    let uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );
    assert_eq!(decode_data_uri(&uri).unwrap(), bytes);

    let image = ImageSource::parse(&uri).load().unwrap();
    assert_eq!((image.width(), image.height()), (3, 4));
}

#[test]
fn data_uri_requires_base64() {
    let err = decode_data_uri("data:text/plain,hello").unwrap_err();
    assert!(matches!(err, AssetError::DataUri(_)));
}

#[test]
fn path_source_reads_file() {
    let path = temp_png("path-source", 6, 2);
    let image = ImageSource::from(path.clone()).load().unwrap();
    assert_eq!((image.width(), image.height()), (6, 2));
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_is_io_error() {
    let err = ImageSource::parse("/no/such/dir/img.png").load().unwrap_err();
    assert!(matches!(err, AssetError::Io { .. }));
}

#[cfg(not(feature = "http"))]
#[test]
fn url_without_http_feature_is_reported() {
    let err = ImageSource::parse("https://x.org/a.png").load().unwrap_err();
    assert!(matches!(err, AssetError::FeatureNotEnabled(_)));
}

// ============================================================================
// Loader
// ============================================================================

#[test]
fn loader_opens_latch_after_all_loads() {
    let sources = vec![
        ImageSource::Bytes {
            name: "one".into(),
            bytes: png_bytes(2, 2, [1, 1, 1, 255]),
        },
        ImageSource::from(temp_png("loader", 3, 3)),
        Image::solid("three", 4, 4, [3, 3, 3, 255]).into(),
    ];

    let mut loader = ImageLoader::spawn(&sources);
    assert_eq!(loader.total(), 3);
    loader.wait(TIMEOUT);
    assert!(loader.is_ready());
    assert_eq!(loader.pending(), 0);

    let mut order = loader.completion_order().to_vec();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2]);

    let images = loader.finish(LoadPolicy::Fail).unwrap();
    let sizes: Vec<_> = images.iter().map(|i| i.width()).collect();
    assert_eq!(sizes, vec![2, 3, 4], "results come back in source order");
}

#[test]
fn empty_loader_is_ready_immediately() {
    let mut loader = ImageLoader::spawn(&[]);
    assert!(loader.is_ready());
    assert!(!loader.poll());
    loader.wait(Duration::ZERO);
    assert!(loader.finish(LoadPolicy::Fail).unwrap().is_empty());
}

#[test]
fn poll_reports_opening_once() {
    let sources = vec![ImageSource::from(Image::solid("only", 1, 1, [0; 4]))];
    let mut loader = ImageLoader::spawn(&sources);

    let mut openings = 0;
    for _ in 0..1000 {
        if loader.poll() {
            openings += 1;
        }
        if loader.is_ready() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(!loader.poll());
    assert_eq!(openings, 1);
}

#[test]
fn fail_policy_aborts_on_first_error() {
    let sources = vec![
        Image::solid("ok", 1, 1, [0; 4]).into(),
        ImageSource::parse("/no/such/file.png"),
    ];
    let result = load_images(&sources, LoadPolicy::Fail, TIMEOUT);
    assert!(matches!(result, Err(Error::Asset(AssetError::Io { .. }))));
}

#[test]
fn skip_policy_keeps_good_images() {
    let sources = vec![
        ImageSource::parse("/no/such/file.png"),
        Image::solid("ok", 5, 5, [0; 4]).into(),
        ImageSource::Bytes {
            name: "bad".into(),
            bytes: vec![0, 1, 2],
        },
    ];
    let images = load_images(&sources, LoadPolicy::Skip, TIMEOUT).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].label(), "ok");
}

#[test]
fn skip_policy_still_fails_when_nothing_loads() {
    let sources = vec![ImageSource::parse("/no/such/file.png")];
    assert!(load_images(&sources, LoadPolicy::Skip, TIMEOUT).is_err());
}

#[test]
fn load_images_requires_sources() {
    assert!(matches!(
        load_images(&[], LoadPolicy::Fail, TIMEOUT),
        Err(Error::NoImages)
    ));
}

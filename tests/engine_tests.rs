//! Engine Lifecycle Tests
//!
//! Tests for:
//! - EngineBuilder validation (missing surface, empty image list)
//! - fill_to_window viewport sizing
//! - Launcher ready callbacks (once, in order, after loading)
//! - Load policies over mixed good and broken sources
//! - pulse / run driven by manual and system clocks

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use plunge::app::{EngineBuilder, EngineConfig, ObjectOverrides};
use plunge::render::Canvas;
use plunge::{AssetError, Color, Error, Image, ImageSource, LoadPolicy, ManualClock, Surface};

fn images() -> Vec<ImageSource> {
    vec![
        Image::solid("A", 16, 16, [255, 0, 0, 255]).into(),
        Image::solid("B", 16, 16, [0, 255, 0, 255]).into(),
    ]
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::new(images());
    config.rng_seed = Some(7);
    config
}

// ============================================================================
// Builder Validation
// ============================================================================

#[test]
fn build_without_surface_fails() {
    let result = EngineBuilder::<Canvas>::new(config()).build();
    assert!(matches!(result, Err(Error::MissingSurface)));
}

#[test]
fn build_without_images_fails() {
    let result = EngineBuilder::new(EngineConfig::default())
        .surface(Canvas::new(10, 10))
        .build();
    assert!(matches!(result, Err(Error::NoImages)));
}

#[test]
fn build_rejects_zero_interval() {
    let mut config = config();
    config.spawn_interval_ms = 0;
    let result = EngineBuilder::new(config).surface(Canvas::new(10, 10)).build();
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn fill_to_window_resizes_to_viewport() -> anyhow::Result<()> {
    let mut config = config();
    config.fill_to_window = true;
    let engine = EngineBuilder::new(config)
        .surface(Canvas::new(10, 10))
        .viewport(320, 240)
        .build()?
        .load()?;
    assert_eq!((engine.surface().width(), engine.surface().height()), (320, 240));
    Ok(())
}

#[test]
fn viewport_ignored_without_fill_to_window() -> anyhow::Result<()> {
    let engine = EngineBuilder::new(config())
        .surface(Canvas::new(10, 10))
        .viewport(320, 240)
        .build()?
        .load()?;
    assert_eq!(engine.surface().width(), 10);
    Ok(())
}

// ============================================================================
// Ready Callbacks
// ============================================================================

#[test]
fn ready_callbacks_fire_once_in_order() -> anyhow::Result<()> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let first = calls.clone();
    let second = calls.clone();

    let engine = EngineBuilder::new(config())
        .surface(Canvas::new(64, 64))
        .build()?
        .on_ready(move |engine| {
            first
                .borrow_mut()
                .push(format!("first:{}", engine.director().images().len()));
        })
        .on_ready(move |engine| {
            engine.start();
            second.borrow_mut().push("second".to_string());
        })
        .load()?;

    assert_eq!(*calls.borrow(), vec!["first:2", "second"]);
    assert!(engine.is_started());
    Ok(())
}

#[test]
fn ready_callbacks_skipped_when_loading_fails() {
    let mut config = config();
    config.images.push(ImageSource::parse("/definitely/not/here.png"));

    let fired = Rc::new(RefCell::new(false));
    let flag = fired.clone();
    let result = EngineBuilder::new(config)
        .surface(Canvas::new(10, 10))
        .build()
        .and_then(|launcher| launcher.on_ready(move |_| *flag.borrow_mut() = true).load());

    assert!(matches!(result, Err(Error::Asset(AssetError::Io { .. }))));
    assert!(!*fired.borrow());
}

#[test]
fn skip_policy_drops_broken_sources() -> anyhow::Result<()> {
    let mut config = config();
    config.load_policy = LoadPolicy::Skip;
    config.images.push(ImageSource::parse("/definitely/not/here.png"));

    let engine = EngineBuilder::new(config)
        .surface(Canvas::new(10, 10))
        .build()?
        .load()?;
    assert_eq!(engine.director().images().len(), 2);
    Ok(())
}

// ============================================================================
// Ticking
// ============================================================================

#[test]
fn start_fills_background() -> anyhow::Result<()> {
    let mut config = config();
    config.background_color = Color::rgb(10, 20, 30);
    let mut engine = EngineBuilder::new(config)
        .surface(Canvas::new(8, 8))
        .build()?
        .load()?;

    assert_eq!(engine.surface().pixel(3, 3), Some([0, 0, 0, 0]));
    engine.start();
    assert_eq!(engine.surface().pixel(3, 3), Some([10, 20, 30, 255]));
    Ok(())
}

#[test]
fn pulse_before_start_does_nothing() -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let mut engine = EngineBuilder::new(config())
        .surface(Canvas::new(8, 8))
        .clock(clock.clone())
        .build()?
        .load()?;

    clock.set_millis(60_000);
    let stats = engine.pulse();
    assert!(!stats.spawned);
    assert_eq!(engine.frame_count(), 0);
    Ok(())
}

#[test]
fn manual_clock_drives_spawning_and_landing() -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let mut config = config();
    config.spawn_interval_ms = 1000;
    config.fall_duration_ms = 500;

    let mut engine = EngineBuilder::new(config)
        .surface(Canvas::new(200, 200))
        .clock(clock.clone())
        .build()?
        .on_ready(|engine| engine.start())
        .load()?;

    assert!(!engine.pulse().spawned);

    clock.set_millis(1001);
    assert!(engine.pulse().spawned);
    assert_eq!(engine.registry().moving().len(), 1);

    clock.set_millis(1501);
    let stats = engine.pulse();
    assert_eq!(stats.landings, 1);
    assert_eq!(engine.registry().stopped().len(), 1);

    clock.set_millis(1551);
    assert!(engine.pulse().snapshot_captured);
    assert_eq!(engine.frame_count(), 4);
    Ok(())
}

#[test]
fn add_object_uses_engine_clock() -> anyhow::Result<()> {
    let clock = ManualClock::new();
    clock.set_millis(250);
    let mut engine = EngineBuilder::new(config())
        .surface(Canvas::new(100, 100))
        .clock(clock.clone())
        .build()?
        .load()?;

    let key = engine.add_object(ObjectOverrides::default())?;
    let object = engine.registry().get(key).expect("object registered");
    assert_eq!(object.started_at(), Some(Duration::from_millis(250)));
    Ok(())
}

#[test]
fn run_renders_requested_frames() -> anyhow::Result<()> {
    let mut config = config();
    config.tick_interval_ms = 1;
    let mut engine = EngineBuilder::new(config)
        .surface(Canvas::new(32, 32))
        .build()?
        .load()?;

    let mut frames = Vec::new();
    engine.run(Some(3), |surface, frame| {
        assert_eq!(surface.width(), 32);
        frames.push(frame.frame);
    });

    assert!(engine.is_started());
    assert_eq!(frames, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn resize_repaints_background() -> anyhow::Result<()> {
    let mut engine = EngineBuilder::new(config())
        .surface(Canvas::new(16, 16))
        .build()?
        .on_ready(|engine| engine.start())
        .load()?;

    engine.resize(24, 12);
    assert_eq!((engine.surface().width(), engine.surface().height()), (24, 12));
    assert_eq!(engine.surface().pixel(23, 11), Some([0, 0, 0, 255]));
    Ok(())
}

//! Falling Object
//!
//! A [`FallingObject`] is one image dropping onto the surface. Over its fall
//! duration it shrinks by `scale_fraction`, rotates from 0 to `end_rotation`
//! and fades from half to full opacity, then comes to rest.
//!
//! # State Machine
//!
//! ```text
//! Idle ──start()──▶ Falling ──update(now ≥ start + duration)──▶ Landed
//! ```
//!
//! Landing is detected by [`FallingObject::update`], never by drawing, so the
//! state machine runs headless. [`FallingObject::draw`] is a pure read: it
//! renders the pose for `now` (clamped to the resting pose) whatever the
//! state flags say.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use plunge_core::{Color, Image, Signal, SubscriptionId, Surface, with_saved_state};

pub const DEFAULT_FALL_DURATION: Duration = Duration::from_millis(3000);
pub const DEFAULT_SCALE_FRACTION: f32 = 0.5;
pub const DEFAULT_BORDER_WIDTH: f32 = 15.0;
pub const DEFAULT_BORDER_COLOR: Color = Color::WHITE;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a falling object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Emitted exactly once, when an object comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandedEvent {
    pub id: ObjectId,
    /// Clock time at which the landing was detected.
    pub landed_at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallState {
    Idle,
    Falling { started_at: Duration },
    Landed { started_at: Duration, landed_at: Duration },
}

/// Frame drawn around an image as four separate filled strips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub color: Color,
    pub width: f32,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            color: DEFAULT_BORDER_COLOR,
            width: DEFAULT_BORDER_WIDTH,
        }
    }
}

/// An axis-aligned rectangle `(x, y, width, height)` in object-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Border {
    /// The four strips `[left, right, top, bottom]` framing an image of
    /// `image_width × image_height` whose top-left corner is the origin.
    ///
    /// Left and right strips span the full framed height; top and bottom only
    /// span the image width, so no pixel is covered twice.
    #[must_use]
    pub fn strips(&self, image_width: f32, image_height: f32) -> [Strip; 4] {
        let bw = self.width;
        let full_height = image_height + 2.0 * bw;
        [
            Strip { x: -bw, y: -bw, width: bw, height: full_height },
            Strip { x: image_width, y: -bw, width: bw, height: full_height },
            Strip { x: 0.0, y: -bw, width: image_width, height: bw },
            Strip { x: 0.0, y: image_height, width: image_width, height: bw },
        ]
    }
}

/// The visual transform of an object at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallPose {
    /// Progress through the fall, in `[0, 1]`.
    pub fraction: f32,
    pub scale: f32,
    pub width: f32,
    pub height: f32,
    /// Radians, interpolated linearly from 0.
    pub rotation: f32,
    pub alpha: f32,
}

/// `clamp(elapsed / duration, 0, 1)`. A zero duration is already complete.
#[must_use]
pub fn fall_fraction(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}

pub struct FallingObject {
    id: ObjectId,
    image: Image,

    pub start_width: f32,
    pub start_height: f32,
    /// Center point, in surface pixels.
    pub x_pos: f32,
    pub y_pos: f32,
    pub end_rotation: f32,
    scale_fraction: f32,
    fall_duration: Duration,
    pub border: Option<Border>,

    state: FallState,
    on_landed: Signal<LandedEvent>,
}

impl FallingObject {
    #[must_use]
    pub fn builder(image: Image) -> FallingObjectBuilder {
        FallingObjectBuilder::new(image)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn image(&self) -> &Image {
        &self.image
    }

    #[inline]
    #[must_use]
    pub fn scale_fraction(&self) -> f32 {
        self.scale_fraction
    }

    #[inline]
    #[must_use]
    pub fn fall_duration(&self) -> Duration {
        self.fall_duration
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> FallState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        !matches!(self.state, FallState::Idle)
    }

    #[inline]
    #[must_use]
    pub fn is_landed(&self) -> bool {
        matches!(self.state, FallState::Landed { .. })
    }

    /// `started ∧ ¬landed`.
    #[inline]
    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self.state, FallState::Falling { .. })
    }

    #[must_use]
    pub fn started_at(&self) -> Option<Duration> {
        match self.state {
            FallState::Idle => None,
            FallState::Falling { started_at } | FallState::Landed { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    /// Arms the object. Has no effect once started.
    pub fn start(&mut self, now: Duration) {
        if let FallState::Idle = self.state {
            self.state = FallState::Falling { started_at: now };
        }
    }

    /// Registers a callback for this object's landing.
    pub fn on_landed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LandedEvent) + 'static,
    {
        self.on_landed.subscribe(callback)
    }

    /// Progress at `now`, or `None` while idle.
    #[must_use]
    pub fn fraction(&self, now: Duration) -> Option<f32> {
        let started_at = self.started_at()?;
        Some(fall_fraction(now.saturating_sub(started_at), self.fall_duration))
    }

    /// The transform at `now`, or `None` while idle.
    #[must_use]
    pub fn pose(&self, now: Duration) -> Option<FallPose> {
        let fraction = self.fraction(now)?;
        let scale = 1.0 - self.scale_fraction * fraction;
        Some(FallPose {
            fraction,
            scale,
            width: self.start_width * scale,
            height: self.start_height * scale,
            rotation: self.end_rotation * fraction,
            alpha: 0.5 + 0.5 * fraction,
        })
    }

    /// Detects the `Falling → Landed` transition.
    ///
    /// The first call at or after `started_at + fall_duration` lands the
    /// object, runs its landing callbacks in registration order and returns
    /// the event. Every other call returns `None`.
    pub fn update(&mut self, now: Duration) -> Option<LandedEvent> {
        let FallState::Falling { started_at } = self.state else {
            return None;
        };
        if now.saturating_sub(started_at) < self.fall_duration {
            return None;
        }

        self.state = FallState::Landed {
            started_at,
            landed_at: now,
        };
        let event = LandedEvent {
            id: self.id,
            landed_at: now,
        };
        log::debug!(
            "Object {} landed at ({:.0}, {:.0}) after {:?}",
            self.id,
            self.x_pos,
            self.y_pos,
            now.saturating_sub(started_at)
        );
        self.on_landed.emit(&event);
        Some(event)
    }

    /// Draws the object at its pose for `now`. Nothing is drawn while idle.
    ///
    /// All transform and alpha changes are scoped; the surface state is the
    /// same after the call as before it.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, now: Duration) {
        let Some(pose) = self.pose(now) else {
            return;
        };

        with_saved_state(surface, |s| {
            s.set_global_alpha(pose.alpha);
            s.translate(self.x_pos, self.y_pos);
            s.rotate(pose.rotation);
            s.translate(-pose.width / 2.0, -pose.height / 2.0);
            s.scale(pose.scale, pose.scale);

            if let Some(border) = self.border {
                for strip in border.strips(self.start_width, self.start_height) {
                    s.fill_rect(strip.x, strip.y, strip.width, strip.height, border.color);
                }
            }

            s.draw_image(&self.image, 0.0, 0.0);
        });
    }
}

impl std::fmt::Debug for FallingObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallingObject")
            .field("id", &self.id)
            .field("image", &self.image.label())
            .field("position", &(self.x_pos, self.y_pos))
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FallingObject`]. Unset sizes default to the image's natural size.
#[derive(Debug, Clone)]
pub struct FallingObjectBuilder {
    image: Image,
    start_width: Option<f32>,
    start_height: Option<f32>,
    x_pos: f32,
    y_pos: f32,
    end_rotation: f32,
    scale_fraction: f32,
    fall_duration: Duration,
    border: Option<Border>,
    auto_start: bool,
}

impl FallingObjectBuilder {
    #[must_use]
    pub fn new(image: Image) -> Self {
        Self {
            image,
            start_width: None,
            start_height: None,
            x_pos: 0.0,
            y_pos: 0.0,
            end_rotation: 0.0,
            scale_fraction: DEFAULT_SCALE_FRACTION,
            fall_duration: DEFAULT_FALL_DURATION,
            border: Some(Border::default()),
            auto_start: true,
        }
    }

    #[must_use]
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x_pos = x;
        self.y_pos = y;
        self
    }

    #[must_use]
    pub fn start_size(mut self, width: f32, height: f32) -> Self {
        self.start_width = Some(width);
        self.start_height = Some(height);
        self
    }

    #[must_use]
    pub fn start_width(mut self, width: f32) -> Self {
        self.start_width = Some(width);
        self
    }

    #[must_use]
    pub fn start_height(mut self, height: f32) -> Self {
        self.start_height = Some(height);
        self
    }

    #[must_use]
    pub fn end_rotation(mut self, radians: f32) -> Self {
        self.end_rotation = radians;
        self
    }

    /// Clamped to `[0, 1]`.
    #[must_use]
    pub fn scale_fraction(mut self, fraction: f32) -> Self {
        self.scale_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn fall_duration(mut self, duration: Duration) -> Self {
        self.fall_duration = duration;
        self
    }

    #[must_use]
    pub fn border(mut self, border: Option<Border>) -> Self {
        self.border = border;
        self
    }

    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Builds the object, arming it at `now` when `auto_start` is set.
    #[must_use]
    pub fn build(self, now: Duration) -> FallingObject {
        let start_width = self.start_width.unwrap_or(self.image.width() as f32);
        let start_height = self.start_height.unwrap_or(self.image.height() as f32);
        let mut object = FallingObject {
            id: ObjectId::next(),
            image: self.image,
            start_width,
            start_height,
            x_pos: self.x_pos,
            y_pos: self.y_pos,
            end_rotation: self.end_rotation,
            scale_fraction: self.scale_fraction,
            fall_duration: self.fall_duration,
            border: self.border,
            state: FallState::Idle,
            on_landed: Signal::new(),
        };
        if self.auto_start {
            object.start(now);
        }
        object
    }
}

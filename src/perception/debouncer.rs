use super::landing_state::LandingClassification;
use std::collections::VecDeque;

/// Hysteresis filter turning the noisy per-frame landing classification into
/// a stable control signal.
///
/// The filter keeps the last [`LandingDebouncer::WINDOW_SIZE`] raw values and
/// the currently emitted value:
/// - a `CanLand` input switches the output to `CanLand` once at least
///   [`LandingDebouncer::ENTER_THRESH`] of the window agrees, otherwise the
///   previous output is kept;
/// - any other input keeps an emitted `CanLand` as long as at least
///   [`LandingDebouncer::HOLD_THRESH`] of the window is `CanLand`, otherwise
///   the raw input is passed through.
///
/// The output can therefore only become `CanLand` on a `CanLand` input.
#[derive(Debug, Clone)]
pub struct LandingDebouncer {
    window: VecDeque<LandingClassification>,
    emitted: LandingClassification,
}

impl LandingDebouncer {
    pub const WINDOW_SIZE: usize = 20;
    pub const ENTER_THRESH: f32 = 0.1;
    pub const HOLD_THRESH: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(Self::WINDOW_SIZE),
            emitted: LandingClassification::Unknown,
        }
    }

    pub fn emitted(&self) -> LandingClassification { self.emitted }

    pub fn window_len(&self) -> usize { self.window.len() }

    /// Fraction of `CanLand` entries among the values currently in the window.
    #[allow(clippy::cast_precision_loss)]
    pub fn can_land_fraction(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        let can_land =
            self.window.iter().filter(|s| **s == LandingClassification::CanLand).count();
        can_land as f32 / self.window.len() as f32
    }

    /// Feeds one raw classification and returns the new emitted value.
    pub fn push(&mut self, raw: LandingClassification) -> LandingClassification {
        if self.window.len() == Self::WINDOW_SIZE {
            self.window.pop_front();
        }
        self.window.push_back(raw);
        let fraction = self.can_land_fraction();

        self.emitted = if raw == LandingClassification::CanLand {
            if fraction >= Self::ENTER_THRESH { LandingClassification::CanLand } else { self.emitted }
        } else if self.emitted == LandingClassification::CanLand && fraction >= Self::HOLD_THRESH {
            LandingClassification::CanLand
        } else {
            raw
        };
        self.emitted
    }
}

impl Default for LandingDebouncer {
    fn default() -> Self { Self::new() }
}

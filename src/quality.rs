//! Quality scale shared with the benchmark harness, and per-call settings.

/// Distinguished quality value meaning lossless. Handled as a separate
/// encoding mode, not as a point on the lossy scale.
pub const QUALITY_LOSSLESS: i32 = 100;

/// Default effort level, matching the `cjxl` default (7, "squirrel").
pub const DEFAULT_EFFORT: i32 = 7;

/// The discrete lossy quality levels, ascending.
///
/// `[0, 99]` — [`QUALITY_LOSSLESS`] is excluded because 100 selects the
/// lossless mode instead.
pub fn lossy_qualities() -> Vec<i32> {
    (0..QUALITY_LOSSLESS).collect()
}

/// Settings for one encode call. Immutable once passed in.
///
/// # Example
///
/// ```
/// use jxl_bridge::EncodeSettings;
///
/// let settings = EncodeSettings::new(85).with_effort(5);
/// assert!(!settings.is_lossless());
/// assert!(EncodeSettings::lossless().is_lossless());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSettings {
    /// Quality on the harness scale: `0..=99` lossy, 100 lossless.
    pub quality: i32,
    /// Encoder speed/compression trade-off, independent of quality.
    pub effort: i32,
}

impl EncodeSettings {
    /// Lossy or lossless settings for the given quality, default effort.
    pub fn new(quality: i32) -> Self {
        Self {
            quality,
            effort: DEFAULT_EFFORT,
        }
    }

    /// Lossless settings with default effort.
    pub fn lossless() -> Self {
        Self::new(QUALITY_LOSSLESS)
    }

    /// Override the effort level.
    pub fn with_effort(mut self, effort: i32) -> Self {
        self.effort = effort;
        self
    }

    /// Whether these settings select the lossless mode.
    pub fn is_lossless(&self) -> bool {
        self.quality == QUALITY_LOSSLESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_ascending_levels_without_the_sentinel() {
        let qualities = lossy_qualities();
        assert_eq!(qualities.len(), 100);
        assert!(qualities.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(qualities.first(), Some(&0));
        assert_eq!(qualities.last(), Some(&99));
        assert!(!qualities.contains(&QUALITY_LOSSLESS));
    }

    #[test]
    fn sentinel_selects_lossless_mode() {
        assert!(EncodeSettings::new(QUALITY_LOSSLESS).is_lossless());
        assert!(!EncodeSettings::new(99).is_lossless());
    }

    #[test]
    fn effort_is_independent_of_quality() {
        let settings = EncodeSettings::lossless().with_effort(9);
        assert_eq!(settings.effort, 9);
        assert_eq!(settings.quality, QUALITY_LOSSLESS);
    }
}

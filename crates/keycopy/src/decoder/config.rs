use crate::error::Error;

/// Decoder tunables.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Lowest accepted numeric value of a decoded code.
    pub key_code_min: u64,
    /// Highest accepted numeric value of a decoded code.
    pub key_code_max: u64,
    /// Inset of the key-colour band from the background side, in packed
    /// colour units.
    pub background_color_threshold: f64,
    /// Scale on the noise-check window relative to the key's share of the
    /// image width.
    pub noise_scale: f64,
    /// Minimum number of columns in the key-colour sampling grid.
    pub min_col_sample_count: u32,
    /// Fraction of image columns sampled when estimating the key's share.
    pub sample_amount: f64,
}

impl DecoderConfig {
    pub const DEFAULT_KEY_CODE_MIN: u64 = 11_111;
    pub const DEFAULT_KEY_CODE_MAX: u64 = 99_999;
    pub const DEFAULT_BACKGROUND_COLOR_THRESHOLD: f64 = 1_000_000.0;
    pub const DEFAULT_NOISE_SCALE: f64 = 0.5;
    pub const DEFAULT_MIN_COL_SAMPLE_COUNT: u32 = 20;
    pub const DEFAULT_SAMPLE_AMOUNT: f64 = 0.1;

    pub fn validate(&self) -> Result<(), Error> {
        if self.key_code_min > self.key_code_max {
            return Err(Error::validation(
                "decoder.key_code_min",
                "must be <= key_code_max",
            ));
        }
        if !self.background_color_threshold.is_finite() || self.background_color_threshold < 0.0 {
            return Err(Error::validation(
                "decoder.background_color_threshold",
                "must be finite and >= 0",
            ));
        }
        if !self.noise_scale.is_finite() || self.noise_scale < 0.0 {
            return Err(Error::validation(
                "decoder.noise_scale",
                "must be finite and >= 0",
            ));
        }
        if self.min_col_sample_count == 0 {
            return Err(Error::validation(
                "decoder.min_col_sample_count",
                "must be >= 1",
            ));
        }
        if !(self.sample_amount > 0.0 && self.sample_amount <= 1.0) {
            return Err(Error::validation(
                "decoder.sample_amount",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            key_code_min: Self::DEFAULT_KEY_CODE_MIN,
            key_code_max: Self::DEFAULT_KEY_CODE_MAX,
            background_color_threshold: Self::DEFAULT_BACKGROUND_COLOR_THRESHOLD,
            noise_scale: Self::DEFAULT_NOISE_SCALE,
            min_col_sample_count: Self::DEFAULT_MIN_COL_SAMPLE_COUNT,
            sample_amount: Self::DEFAULT_SAMPLE_AMOUNT,
        }
    }
}

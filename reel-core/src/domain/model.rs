//! Model catalog
//!
//! Models offered by the video service, with their per-second pricing and
//! the output sizes each one accepts.

/// Clip durations the service accepts, in seconds
pub const ALLOWED_SECONDS: [u32; 3] = [4, 8, 12];

/// Duration used when the caller does not pick one
pub const DEFAULT_SECONDS: u32 = 4;

/// An output size offered by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Human readable label, e.g. "Portrait (720x1280)"
    pub label: &'static str,
    /// Wire value, "WxH"
    pub value: &'static str,
}

/// A generation model and its pricing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOption {
    pub name: &'static str,
    /// Price in USD per generated second
    pub rate_per_second: f64,
    pub resolutions: &'static [Resolution],
}

const STANDARD_RESOLUTIONS: &[Resolution] = &[
    Resolution {
        label: "Portrait (720x1280)",
        value: "720x1280",
    },
    Resolution {
        label: "Landscape (1280x720)",
        value: "1280x720",
    },
];

const PRO_RESOLUTIONS: &[Resolution] = &[
    Resolution {
        label: "Portrait (720x1280)",
        value: "720x1280",
    },
    Resolution {
        label: "Landscape (1280x720)",
        value: "1280x720",
    },
    Resolution {
        label: "Portrait (1024x1792)",
        value: "1024x1792",
    },
    Resolution {
        label: "Landscape (1792x1024)",
        value: "1792x1024",
    },
];

/// All models, the first one being the default
pub const MODELS: &[ModelOption] = &[
    ModelOption {
        name: "sora-2",
        rate_per_second: 0.10,
        resolutions: STANDARD_RESOLUTIONS,
    },
    ModelOption {
        name: "sora-2-pro",
        rate_per_second: 0.30,
        resolutions: PRO_RESOLUTIONS,
    },
];

impl ModelOption {
    /// Look up a model by name, ignoring case
    pub fn find(name: &str) -> Option<&'static ModelOption> {
        MODELS.iter().find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Estimated price in USD for a clip of the given length
    pub fn estimate_cost(&self, seconds: u32) -> f64 {
        self.rate_per_second * f64::from(seconds)
    }

    /// Find one of this model's resolutions by wire value or label
    pub fn resolution(&self, input: &str) -> Option<&'static Resolution> {
        let input = input.trim();
        self.resolutions
            .iter()
            .find(|r| r.value.eq_ignore_ascii_case(input) || r.label.eq_ignore_ascii_case(input))
    }

    pub fn supports_size(&self, size: &str) -> bool {
        self.resolutions.iter().any(|r| r.value == size)
    }
}

/// Whether the service accepts a clip of this many seconds
pub fn is_allowed_seconds(seconds: u32) -> bool {
    ALLOWED_SECONDS.contains(&seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_model() {
        assert_eq!(ModelOption::find("SORA-2").map(|m| m.name), Some("sora-2"));
        assert_eq!(
            ModelOption::find("sora-2-pro").map(|m| m.name),
            Some("sora-2-pro")
        );
        assert!(ModelOption::find("sora-3").is_none());
    }

    #[test]
    fn test_estimate_cost() {
        let pro = ModelOption::find("sora-2-pro").unwrap();
        assert!((pro.estimate_cost(8) - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_lookup() {
        let standard = ModelOption::find("sora-2").unwrap();
        assert_eq!(
            standard.resolution("1280x720").map(|r| r.label),
            Some("Landscape (1280x720)")
        );
        assert!(standard.resolution("1792x1024").is_none());
        assert!(standard.supports_size("720x1280"));
    }

    #[test]
    fn test_allowed_seconds() {
        assert!(is_allowed_seconds(DEFAULT_SECONDS));
        assert!(is_allowed_seconds(12));
        assert!(!is_allowed_seconds(5));
    }
}

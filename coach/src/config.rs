//! Coach configuration — every tunable threshold in one place.
//!
//! Loaded from an s-expression plist file.  Unknown keys are ignored and
//! missing keys keep their defaults, so a config only names what it
//! changes:
//!
//! ```text
//! (:contact-threshold 0.12
//!  :stable-frames 10
//!  :target-ms 30000
//!  :contact-pairs ((0 0) (5 5) (9 9)))
//! ```

use std::path::Path;

use anyhow::{bail, Context};
use lexpr::Value;
use tracing::debug;

use crate::criteria::{ConfidenceConfig, ContactConfig, MotionConfig, OrientationConfig};
use crate::hand::{ValidatorConfig, LANDMARK_COUNT};
use crate::session::SessionConfig;
use crate::sexp::{as_number, get_float, get_int, get_value, list_items};
use crate::stabilizer::StabilizerConfig;

/// Aggregated configuration for all coach components.
#[derive(Debug, Clone, Default)]
pub struct CoachConfig {
    pub validator: ValidatorConfig,
    pub contact: ContactConfig,
    pub motion: MotionConfig,
    pub orientation: OrientationConfig,
    pub confidence: ConfidenceConfig,
    pub stabilizer: StabilizerConfig,
    pub session: SessionConfig,
}

impl CoachConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a config plist.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let value = lexpr::from_str(text).context("malformed s-expression")?;
        Self::from_sexp(&value)
    }

    /// Apply every recognised key of `value` over the defaults.
    pub fn from_sexp(value: &Value) -> anyhow::Result<Self> {
        let mut c = Self::default();

        if let Some(v) = get_ms(value, "occlusion-timeout-ms")? {
            c.validator.occlusion_timeout_ms = v;
        }

        if let Some(v) = get_positive(value, "contact-threshold")? {
            c.contact.distance_threshold = v;
        }
        if let Some(v) = get_count(value, "contact-min")? {
            c.contact.min_contacts = v as u32;
        }
        if let Some(pairs) = get_value(value, "contact-pairs") {
            c.contact.pairs = parse_pairs(pairs)?;
        }

        if let Some(v) = get_ms(value, "motion-window-ms")? {
            c.motion.window_ms = v;
        }
        if let Some(v) = get_count(value, "motion-min-samples")? {
            c.motion.min_samples = v as usize;
        }
        if let Some(v) = get_positive(value, "motion-min-angle")? {
            c.motion.min_angle_change = v;
        }
        if let Some(v) = get_positive(value, "motion-min-displacement")? {
            c.motion.min_displacement = v;
        }
        if let Some(v) = get_count(value, "motion-min-changes")? {
            c.motion.min_direction_changes = v as usize;
        }

        if let Some(v) = get_float(value, "orientation-max-dot") {
            if !(-1.0..=1.0).contains(&v) {
                bail!(":orientation-max-dot must be within [-1, 1], got {}", v);
            }
            c.orientation.max_facing_dot = v as f32;
        }

        if let Some(v) = get_count(value, "weight-contact")? {
            c.confidence.contact_weight = v as u32;
        }
        if let Some(v) = get_count(value, "weight-motion")? {
            c.confidence.motion_weight = v as u32;
        }
        if let Some(v) = get_count(value, "weight-orientation")? {
            c.confidence.orientation_weight = v as u32;
        }
        let total = c.confidence.contact_weight as u64
            + c.confidence.motion_weight as u64
            + c.confidence.orientation_weight as u64;
        if total > 100 {
            bail!("confidence weights must not sum past 100, got {}", total);
        }

        if let Some(v) = get_count(value, "stable-frames")? {
            c.stabilizer.stable_frames = v as u32;
        }

        if let Some(v) = get_ms(value, "target-ms")? {
            if v == 0 {
                bail!(":target-ms must be positive");
            }
            c.session.target_ms = v;
        }
        if let Some(v) = get_ms(value, "completion-display-ms")? {
            c.session.completion_display_ms = v;
        }
        if let Some(v) = get_ms(value, "arming-grace-ms")? {
            c.session.arming_grace_ms = v;
        }

        debug!("Loaded config: {}", c.to_sexp());
        Ok(c)
    }

    /// Render the active config as a plist that `from_sexp` accepts.
    pub fn to_sexp(&self) -> String {
        let pairs: Vec<String> = self
            .contact
            .pairs
            .iter()
            .map(|(a, b)| format!("({} {})", a, b))
            .collect();
        format!(
            "(:occlusion-timeout-ms {} :contact-threshold {:.3} :contact-min {} :contact-pairs ({}) :motion-window-ms {} :motion-min-samples {} :motion-min-angle {:.4} :motion-min-displacement {:.4} :motion-min-changes {} :orientation-max-dot {:.3} :weight-contact {} :weight-motion {} :weight-orientation {} :stable-frames {} :target-ms {} :completion-display-ms {} :arming-grace-ms {})",
            self.validator.occlusion_timeout_ms,
            self.contact.distance_threshold,
            self.contact.min_contacts,
            pairs.join(" "),
            self.motion.window_ms,
            self.motion.min_samples,
            self.motion.min_angle_change,
            self.motion.min_displacement,
            self.motion.min_direction_changes,
            self.orientation.max_facing_dot,
            self.confidence.contact_weight,
            self.confidence.motion_weight,
            self.confidence.orientation_weight,
            self.stabilizer.stable_frames,
            self.session.target_ms,
            self.session.completion_display_ms,
            self.session.arming_grace_ms,
        )
    }
}

fn get_ms(value: &Value, key: &str) -> anyhow::Result<Option<u64>> {
    match get_int(value, key) {
        Some(v) if v < 0 => bail!(":{} must not be negative, got {}", key, v),
        Some(v) => Ok(Some(v as u64)),
        None if get_value(value, key).is_some() => bail!(":{} must be an integer", key),
        None => Ok(None),
    }
}

fn get_count(value: &Value, key: &str) -> anyhow::Result<Option<u64>> {
    match get_ms(value, key)? {
        Some(v) if v > u32::MAX as u64 => bail!(":{} is out of range: {}", key, v),
        other => Ok(other),
    }
}

fn get_positive(value: &Value, key: &str) -> anyhow::Result<Option<f32>> {
    match get_float(value, key) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(Some(v as f32)),
        Some(v) => bail!(":{} must be a positive number, got {}", key, v),
        None if get_value(value, key).is_some() => bail!(":{} must be a number", key),
        None => Ok(None),
    }
}

/// Parse `((a b) ...)` landmark index pairs.
fn parse_pairs(value: &Value) -> anyhow::Result<Vec<(usize, usize)>> {
    let items = list_items(value).context(":contact-pairs must be a list")?;
    let mut pairs = Vec::with_capacity(items.len());
    for item in items {
        let idx: Vec<f64> = list_items(item)
            .unwrap_or_default()
            .into_iter()
            .filter_map(as_number)
            .collect();
        let &[a, b] = idx.as_slice() else {
            bail!("contact pair must be two landmark indices: {}", item);
        };
        let in_range = |i: f64| i >= 0.0 && i.fract() == 0.0 && (i as usize) < LANDMARK_COUNT;
        if !in_range(a) || !in_range(b) {
            bail!("contact pair index out of range 0-{}: {}", LANDMARK_COUNT - 1, item);
        }
        pairs.push((a as usize, b as usize));
    }
    Ok(pairs)
}

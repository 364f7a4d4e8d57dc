//! Observation script replay.
//!
//! One observation per line, as a plist:
//!
//! ```text
//! ; two hands, 21 (x y z) points each
//! (:t 0 :hands (((0.49 0.6 0.0) ...) ((0.51 0.6 0.0) ...)))
//! (:t 66 :hands ())
//! ```
//!
//! Blank lines and `;` comments are skipped.  Timestamps must not go
//! backwards.  A hand without exactly 21 finite points is dropped at
//! ingestion, the same as a degenerate detector result.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{bail, Context};
use lexpr::Value;
use tracing::info;

use super::ObservationSource;
use crate::hand::{Landmark, Observation};
use crate::sexp::{as_number, get_int, get_value, list_items};

/// Recorded observations replayed one per tick.
#[derive(Debug, Default)]
pub struct ScriptSource {
    observations: VecDeque<Observation>,
}

impl ScriptSource {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let source =
            Self::parse(&text).with_context(|| format!("parsing script {}", path.display()))?;
        info!(
            "Loaded {} observation(s) from {}",
            source.len(),
            path.display()
        );
        Ok(source)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut observations = VecDeque::new();
        let mut last_t = 0;
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let obs = parse_line(line).with_context(|| format!("line {}", i + 1))?;
            if obs.timestamp_ms < last_t {
                bail!(
                    "line {}: timestamp {} goes backwards from {}",
                    i + 1,
                    obs.timestamp_ms,
                    last_t
                );
            }
            last_t = obs.timestamp_ms;
            observations.push_back(obs);
        }
        Ok(Self { observations })
    }

    /// Observations not yet replayed.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl ObservationSource for ScriptSource {
    fn next_observation(&mut self, _now_ms: u64) -> Option<Observation> {
        self.observations.pop_front()
    }

    fn name(&self) -> &'static str {
        "script"
    }
}

/// Parse one `(:t N :hands (...))` line.
pub fn parse_line(line: &str) -> anyhow::Result<Observation> {
    let value = lexpr::from_str(line).context("malformed s-expression")?;
    let t = match get_int(&value, "t") {
        Some(t) if t >= 0 => t as u64,
        Some(t) => bail!(":t must not be negative, got {}", t),
        None if get_value(&value, "t").is_some() => bail!(":t must be an integer"),
        None => bail!("missing :t timestamp"),
    };

    let raw_hands = match get_value(&value, "hands") {
        Some(hands) => {
            let hands = list_items(hands).context(":hands must be a list")?;
            hands
                .into_iter()
                .map(parse_hand)
                .collect::<anyhow::Result<Vec<_>>>()?
        }
        None => Vec::new(),
    };

    Ok(Observation::from_raw(t, &raw_hands))
}

fn parse_hand(hand: &Value) -> anyhow::Result<Vec<Landmark>> {
    let points = list_items(hand).with_context(|| format!("hand is not a list: {}", hand))?;
    points.into_iter().map(parse_point).collect()
}

fn parse_point(point: &Value) -> anyhow::Result<Landmark> {
    let coords: Option<Vec<f64>> =
        list_items(point).and_then(|items| items.into_iter().map(as_number).collect());
    match coords.as_deref() {
        Some(&[x, y, z]) => Ok(Landmark::new(x as f32, y as f32, z as f32)),
        _ => bail!("landmark must be (x y z): {}", point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::synthetic::palms_together;
    use crate::hand::HandFrame;

    fn hand_sexp(hand: &HandFrame) -> String {
        let points: Vec<String> = hand
            .landmarks()
            .iter()
            .map(|p| format!("({} {} {})", p.x, p.y, p.z))
            .collect();
        format!("({})", points.join(" "))
    }

    fn two_hand_line(t: u64) -> String {
        let (a, b) = palms_together(0.5, 0.5);
        format!("(:t {} :hands ({} {}))", t, hand_sexp(&a), hand_sexp(&b))
    }

    #[test]
    fn test_parse_two_hands() {
        let obs = parse_line(&two_hand_line(66)).unwrap();
        assert_eq!(obs.timestamp_ms, 66);
        assert_eq!(obs.hand_count(), 2);
        let (a, _) = palms_together(0.5, 0.5);
        assert!(obs.hands()[0].landmarks()[0].distance(&a.landmarks()[0]) < 1e-5);
    }

    #[test]
    fn test_parse_no_hands() {
        assert_eq!(parse_line("(:t 10 :hands ())").unwrap().hand_count(), 0);
        assert_eq!(parse_line("(:t 10)").unwrap().hand_count(), 0);
    }

    #[test]
    fn test_short_hand_dropped() {
        let (a, _) = palms_together(0.5, 0.5);
        let line = format!(
            "(:t 0 :hands ({} ((0.1 0.2 0.0) (0.3 0.4 0.0))))",
            hand_sexp(&a)
        );
        assert_eq!(parse_line(&line).unwrap().hand_count(), 1);
    }

    #[test]
    fn test_bad_lines_rejected() {
        assert!(parse_line("(:hands ())").is_err());
        assert!(parse_line("(:t -1)").is_err());
        assert!(parse_line("(:t 0 :hands (((0.1 0.2))))").is_err());
        assert!(parse_line("(:t 0 :hands 5)").is_err());
        assert!(parse_line("(:t 0").is_err());
    }

    #[test]
    fn test_timestamp_errors_are_specific() {
        let err = parse_line("(:t 1.5 :hands ())").unwrap_err();
        assert_eq!(err.to_string(), ":t must be an integer");
        let err = parse_line("(:hands ())").unwrap_err();
        assert_eq!(err.to_string(), "missing :t timestamp");
    }

    #[test]
    fn test_script_skips_comments_and_replays_in_order() {
        let text = format!(
            "; recorded session\n\n{}\n(:t 66 :hands ())\n{}\n",
            two_hand_line(0),
            two_hand_line(132)
        );
        let mut source = ScriptSource::parse(&text).unwrap();
        assert_eq!(source.len(), 3);
        let times: Vec<u64> = std::iter::from_fn(|| source.next_observation(0))
            .map(|o| o.timestamp_ms)
            .collect();
        assert_eq!(times, vec![0, 66, 132]);
        assert!(source.is_empty());
    }

    #[test]
    fn test_backwards_timestamp_rejected() {
        let text = "(:t 100)\n(:t 50)\n";
        let err = ScriptSource::parse(text).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_error_names_line() {
        let text = "(:t 0)\n(:t 66 :hands (((1 2))))\n";
        let err = ScriptSource::parse(text).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}

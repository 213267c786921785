use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::core::Rgb;
use crate::error::{ColorSpecError, ConfigError};

/// Ordered category values with their colours plus the fallback colour.
///
/// Declaration order matters: the majority policy breaks ties in favour of
/// the value declared later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpec {
    entries: Vec<(String, Rgb)>,
    index: HashMap<String, usize>,
    fallback: Rgb,
}

impl ColorSpec {
    /// Pair `values` with `colors` positionally.
    pub fn new(values: Vec<String>, colors: Vec<Rgb>, fallback: Rgb) -> Result<Self, ColorSpecError> {
        if values.len() != colors.len() {
            return Err(ColorSpecError::LengthMismatch {
                values: values.len(),
                colors: colors.len(),
            });
        }
        Self::from_pairs(values.into_iter().zip(colors), fallback)
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, Rgb)>,
        fallback: Rgb,
    ) -> Result<Self, ColorSpecError> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for (value, color) in pairs {
            if index.insert(value.clone(), entries.len()).is_some() {
                return Err(ColorSpecError::DuplicateValue(value));
            }
            entries.push((value, color));
        }
        Ok(Self {
            entries,
            index,
            fallback,
        })
    }

    /// Parse the host form fields: `values` like `F,M` and `colors` like
    /// `(255,0,0),(0,0,255)`. `#rrggbb` entries are accepted as well.
    pub fn parse(values: &str, colors: &str, fallback: Rgb) -> Result<Self, ColorSpecError> {
        let values: Vec<String> = split_values(values);
        let colors = split_colors(colors)?;
        Self::new(values, colors, fallback)
    }

    /// Spec with no known values: every run resolves to `fallback`.
    pub fn fallback_only(fallback: Rgb) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            fallback,
        }
    }

    pub fn fallback(&self) -> Rgb {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.entries.iter().map(|(value, color)| (value.as_str(), *color))
    }

    pub fn color_of(&self, value: &str) -> Option<Rgb> {
        self.position(value).map(|idx| self.entries[idx].1)
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Count occurrences of each known value; unknown and absent categories
    /// are skipped.
    fn tally<'a>(&self, categories: impl IntoIterator<Item = Option<&'a str>>) -> Vec<u64> {
        let mut counts = vec![0u64; self.entries.len()];
        for idx in categories.into_iter().flatten().filter_map(|c| self.position(c)) {
            counts[idx] += 1;
        }
        counts
    }
}

fn split_values(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(|v| v.trim().to_string()).collect()
}

fn split_colors(text: &str) -> Result<Vec<Rgb>, ColorSpecError> {
    let mut colors = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        if rest.starts_with('(') {
            let close = rest
                .find(')')
                .ok_or_else(|| ColorSpecError::InvalidColor(rest.to_string()))?;
            colors.push(Rgb::from_tuple(&rest[..=close])?);
            rest = &rest[close + 1..];
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            colors.push(Rgb::from_hex(&rest[..end])?);
            rest = &rest[end..];
        }
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after.trim_start();
        }
    }
    Ok(colors)
}

/// How a run's categories collapse into one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorPolicy {
    /// Colour of the most frequent known value.
    Majority,
    /// Per-channel average of known colours weighted by their counts.
    #[default]
    WeightedBlend,
}

impl ColorPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Majority => "majority",
            Self::WeightedBlend => "weighted-blend",
        }
    }

    /// Resolve the colour for one run given its members' categories.
    pub fn resolve<'a>(
        self,
        spec: &ColorSpec,
        categories: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Rgb {
        let counts = spec.tally(categories);
        match self {
            Self::Majority => majority(spec, &counts),
            Self::WeightedBlend => weighted_blend(spec, &counts),
        }
    }
}

impl FromStr for ColorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "majority" => Ok(Self::Majority),
            "weighted-blend" => Ok(Self::WeightedBlend),
            _ => Err(ConfigError::UnknownPolicy(s.trim().to_string())),
        }
    }
}

fn majority(spec: &ColorSpec, counts: &[u64]) -> Rgb {
    let mut winner: Option<(usize, u64)> = None;
    for (idx, &count) in counts.iter().enumerate() {
        // `>=` lets a later-declared value take a tie.
        if count > 0 && winner.is_none_or(|(_, best)| count >= best) {
            winner = Some((idx, count));
        }
    }
    winner.map_or(spec.fallback, |(idx, _)| spec.entries[idx].1)
}

fn weighted_blend(spec: &ColorSpec, counts: &[u64]) -> Rgb {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return spec.fallback;
    }

    let mut sums = [0u64; 3];
    for ((_, color), &count) in spec.entries.iter().zip(counts) {
        for (sum, channel) in sums.iter_mut().zip(color.channels()) {
            *sum += count * u64::from(channel);
        }
    }

    // Round half up: floor(sum / total + 1/2) in integers.
    Rgb::from_channels(sums.map(|sum| ((2 * sum + total) / (2 * total)) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn spec() -> ColorSpec {
        ColorSpec::new(vec!["F".into(), "M".into()], vec![RED, BLUE], Rgb::NEUTRAL).unwrap()
    }

    #[test]
    fn blend_of_two_to_one() {
        let color = ColorPolicy::WeightedBlend.resolve(&spec(), [Some("F"), Some("F"), Some("M")]);
        assert_eq!(color, Rgb::new(170, 0, 85));
    }

    #[test]
    fn blend_rounds_half_up() {
        let spec = ColorSpec::new(
            vec!["a".into(), "b".into()],
            vec![Rgb::new(0, 0, 0), Rgb::new(1, 3, 255)],
            Rgb::NEUTRAL,
        )
        .unwrap();
        let color = ColorPolicy::WeightedBlend.resolve(&spec, [Some("a"), Some("b")]);
        assert_eq!(color, Rgb::new(1, 2, 128));
    }

    #[test]
    fn pure_run_keeps_exact_colour() {
        let odd = Rgb::new(13, 201, 77);
        let spec = ColorSpec::new(vec!["x".into(), "y".into()], vec![odd, RED], Rgb::NEUTRAL).unwrap();
        let color = ColorPolicy::WeightedBlend.resolve(&spec, vec![Some("x"); 7]);
        assert_eq!(color, odd);
    }

    #[test]
    fn unmatched_categories_are_ignored() {
        let color = ColorPolicy::WeightedBlend.resolve(&spec(), [Some("F"), Some("X"), None]);
        assert_eq!(color, RED);
    }

    #[test]
    fn zero_matches_fall_back_under_both_policies() {
        for policy in [ColorPolicy::Majority, ColorPolicy::WeightedBlend] {
            assert_eq!(policy.resolve(&spec(), [Some("X"), None]), Rgb::NEUTRAL);
            assert_eq!(policy.resolve(&spec(), std::iter::empty()), Rgb::NEUTRAL);
        }
    }

    #[test]
    fn majority_prefers_later_value_on_tie() {
        let color = ColorPolicy::Majority.resolve(&spec(), [Some("F"), Some("M")]);
        assert_eq!(color, BLUE);
        let color = ColorPolicy::Majority.resolve(&spec(), [Some("F"), Some("M"), Some("F")]);
        assert_eq!(color, RED);
    }

    #[test]
    fn mismatched_lengths_fail_at_construction() {
        let err = ColorSpec::new(vec!["F".into()], vec![RED, BLUE], Rgb::NEUTRAL).unwrap_err();
        assert_eq!(err, ColorSpecError::LengthMismatch { values: 1, colors: 2 });
        let err = ColorSpec::parse("F,M,X", "(255,0,0),(0,0,255)", Rgb::NEUTRAL).unwrap_err();
        assert_eq!(err, ColorSpecError::LengthMismatch { values: 3, colors: 2 });
    }

    #[test]
    fn duplicate_values_are_rejected() {
        let err = ColorSpec::parse("F,F", "(1,1,1),(2,2,2)", Rgb::NEUTRAL).unwrap_err();
        assert_eq!(err, ColorSpecError::DuplicateValue("F".into()));
    }

    #[test]
    fn parse_host_fields() {
        let parsed = ColorSpec::parse(" F , M ", "(255, 0, 0), #0000ff", Rgb::NEUTRAL).unwrap();
        assert_eq!(parsed, spec());
        let declared: Vec<_> = parsed.entries().collect();
        assert_eq!(declared, vec![("F", RED), ("M", BLUE)]);
        assert_eq!(parsed.color_of("M"), Some(BLUE));
        assert_eq!(parsed.color_of("X"), None);
        assert!(ColorSpec::parse("", "", Rgb::NEUTRAL).unwrap().is_empty());
        assert!(ColorSpec::parse("F", "(255,0", Rgb::NEUTRAL).is_err());
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!("majority".parse::<ColorPolicy>(), Ok(ColorPolicy::Majority));
        assert_eq!("Weighted-Blend".parse::<ColorPolicy>(), Ok(ColorPolicy::WeightedBlend));
        assert_eq!(
            "blend".parse::<ColorPolicy>(),
            Err(ConfigError::UnknownPolicy("blend".to_string()))
        );
        assert_eq!(
            " mode ".parse::<ColorPolicy>(),
            Err(ConfigError::UnknownPolicy("mode".to_string()))
        );
        assert_eq!(ColorPolicy::default(), ColorPolicy::WeightedBlend);
        let decoded: ColorPolicy = serde_json::from_str("\"majority\"").unwrap();
        assert_eq!(decoded, ColorPolicy::Majority);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Insurance premium band, lowest risk first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PremiumTier {
    #[serde(rename = "Very Low")]
    VeryLow,
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Low-Medium")]
    LowMedium,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    #[serde(rename = "High")]
    High,
    #[serde(rename = "High-Risk")]
    HighRisk,
    #[serde(rename = "Very High")]
    VeryHigh,
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "Extremely Critical")]
    ExtremelyCritical,
}

impl PremiumTier {
    pub const ALL: [PremiumTier; 10] = [
        PremiumTier::VeryLow,
        PremiumTier::Low,
        PremiumTier::LowMedium,
        PremiumTier::Medium,
        PremiumTier::MediumHigh,
        PremiumTier::High,
        PremiumTier::HighRisk,
        PremiumTier::VeryHigh,
        PremiumTier::Critical,
        PremiumTier::ExtremelyCritical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PremiumTier::VeryLow => "Very Low",
            PremiumTier::Low => "Low",
            PremiumTier::LowMedium => "Low-Medium",
            PremiumTier::Medium => "Medium",
            PremiumTier::MediumHigh => "Medium-High",
            PremiumTier::High => "High",
            PremiumTier::HighRisk => "High-Risk",
            PremiumTier::VeryHigh => "Very High",
            PremiumTier::Critical => "Critical",
            PremiumTier::ExtremelyCritical => "Extremely Critical",
        }
    }

    /// Annual premium range in INR.
    pub fn premium_range(&self) -> (u32, u32) {
        match self {
            PremiumTier::VeryLow => (2000, 3000),
            PremiumTier::Low => (3000, 5000),
            PremiumTier::LowMedium => (5000, 8000),
            PremiumTier::Medium => (8000, 12000),
            PremiumTier::MediumHigh => (12000, 17000),
            PremiumTier::High => (17000, 22000),
            PremiumTier::HighRisk => (22000, 28000),
            PremiumTier::VeryHigh => (28000, 35000),
            PremiumTier::Critical => (35000, 43000),
            PremiumTier::ExtremelyCritical => (43000, 53000),
        }
    }

    /// Inclusive upper bound of the band, in whole percent.
    pub fn upper_percent(&self) -> u32 {
        (self.band() as u32) * 10
    }

    /// 1-based band number.
    pub fn band(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).map_or(1, |i| i + 1)
    }

    /// Band for a whole-percent risk. Values above 100 land in the last band.
    pub fn for_percent(percent: u32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|tier| percent <= tier.upper_percent())
            .unwrap_or(PremiumTier::ExtremelyCritical)
    }

    /// Band for a risk probability.
    pub fn for_risk(risk: f64) -> Self {
        Self::for_percent(risk_percent(risk))
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk as a whole percentage, rounded half away from zero. Negative and
/// NaN map to 0; values above 1 saturate at 100.
pub fn risk_percent(risk: f64) -> u32 {
    if risk.is_nan() || risk <= 0.0 {
        return 0;
    }
    (risk.min(1.0) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub tier: PremiumTier,
    pub min_premium: u32,
    pub max_premium: u32,
    pub risk_percent: u32,
}

/// Map a composite risk to its premium tier and INR range.
pub fn resolve_premium(risk: f64) -> PremiumQuote {
    let percent = risk_percent(risk);
    let tier = PremiumTier::for_percent(percent);
    let (min_premium, max_premium) = tier.premium_range();
    PremiumQuote {
        tier,
        min_premium,
        max_premium,
        risk_percent: percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        let cases = [
            (0.10, PremiumTier::VeryLow, 2000, 3000),
            (0.105, PremiumTier::Low, 3000, 5000),
            (0.50, PremiumTier::MediumHigh, 12000, 17000),
            (0.901, PremiumTier::Critical, 35000, 43000),
            (1.00, PremiumTier::ExtremelyCritical, 43000, 53000),
        ];
        for (risk, tier, min, max) in cases {
            let quote = resolve_premium(risk);
            assert_eq!(quote.tier, tier, "risk {}", risk);
            assert_eq!((quote.min_premium, quote.max_premium), (min, max));
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(PremiumTier::for_percent(0), PremiumTier::VeryLow);
        assert_eq!(PremiumTier::for_percent(10), PremiumTier::VeryLow);
        assert_eq!(PremiumTier::for_percent(11), PremiumTier::Low);
        assert_eq!(PremiumTier::for_percent(90), PremiumTier::Critical);
        assert_eq!(PremiumTier::for_percent(91), PremiumTier::ExtremelyCritical);
        assert_eq!(PremiumTier::for_percent(250), PremiumTier::ExtremelyCritical);
    }

    #[test]
    fn test_out_of_range_risk() {
        assert_eq!(resolve_premium(f64::NAN).tier, PremiumTier::VeryLow);
        assert_eq!(resolve_premium(-0.3).tier, PremiumTier::VeryLow);
        assert_eq!(resolve_premium(7.0).tier, PremiumTier::ExtremelyCritical);
        assert_eq!(resolve_premium(f64::INFINITY).risk_percent, 100);
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let ranges: Vec<(u32, u32)> = PremiumTier::ALL.iter().map(|t| t.premium_range()).collect();
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_monotone_in_risk() {
        let mut previous = PremiumTier::VeryLow;
        for i in 0..=1000 {
            let tier = PremiumTier::for_risk(i as f64 / 1000.0);
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn test_labels_serialize() {
        let json = serde_json::to_string(&PremiumTier::ExtremelyCritical).unwrap();
        assert_eq!(json, "\"Extremely Critical\"");
        assert_eq!(PremiumTier::HighRisk.to_string(), "High-Risk");
        assert_eq!(PremiumTier::Critical.upper_percent(), 90);
        assert_eq!(PremiumTier::VeryLow.band(), 1);
    }
}

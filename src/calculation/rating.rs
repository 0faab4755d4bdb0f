//! Score-to-rating and probation mapping.

use rust_decimal::Decimal;

use crate::config::{ProbationRules, RatingScale};
use crate::models::ProbationStatus;

/// Maps a score to its rating label.
///
/// Bands are evaluated from the highest `min_score` down, so their order in
/// the configuration does not matter. Scores below every band get the
/// scale's floor label.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::rate_score;
/// use settlement_engine::config::RatingScale;
/// use rust_decimal::Decimal;
///
/// let scale = RatingScale::default();
/// assert_eq!(rate_score(Decimal::new(92, 0), &scale), "EXCELLENT");
/// assert_eq!(rate_score(Decimal::new(75, 0), &scale), "VERY GOOD");
/// assert_eq!(rate_score(Decimal::new(12, 0), &scale), "POOR");
/// ```
pub fn rate_score(score: Decimal, scale: &RatingScale) -> String {
    scale
        .bands
        .iter()
        .filter(|band| score >= band.min_score)
        .max_by(|a, b| a.min_score.cmp(&b.min_score))
        .map(|band| band.label.clone())
        .unwrap_or_else(|| scale.floor_label.clone())
}

/// Maps a score to a probation outcome.
pub fn probation_status(score: Decimal, rules: &ProbationRules) -> ProbationStatus {
    if score >= rules.pass_score {
        ProbationStatus::Pass
    } else if score >= rules.extend_score {
        ProbationStatus::Extend
    } else {
        ProbationStatus::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingBand;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_band_boundaries() {
        let scale = RatingScale::default();
        assert_eq!(rate_score(dec("90"), &scale), "EXCELLENT");
        assert_eq!(rate_score(dec("89.99"), &scale), "VERY GOOD");
        assert_eq!(rate_score(dec("60"), &scale), "GOOD");
        assert_eq!(rate_score(dec("40"), &scale), "AVERAGE");
        assert_eq!(rate_score(dec("39.99"), &scale), "POOR");
        assert_eq!(rate_score(dec("150"), &scale), "EXCELLENT");
    }

    #[test]
    fn test_band_order_irrelevant() {
        let scale = RatingScale {
            bands: vec![
                RatingBand { min_score: dec("50"), label: "MEETS".to_string() },
                RatingBand { min_score: dec("80"), label: "EXCEEDS".to_string() },
            ],
            floor_label: "BELOW".to_string(),
        };
        assert_eq!(rate_score(dec("85"), &scale), "EXCEEDS");
        assert_eq!(rate_score(dec("55"), &scale), "MEETS");
        assert_eq!(rate_score(dec("10"), &scale), "BELOW");
    }

    #[test]
    fn test_probation_status() {
        let rules = ProbationRules::default();
        assert_eq!(probation_status(dec("70"), &rules), ProbationStatus::Pass);
        assert_eq!(probation_status(dec("69.99"), &rules), ProbationStatus::Extend);
        assert_eq!(probation_status(dec("50"), &rules), ProbationStatus::Extend);
        assert_eq!(probation_status(dec("49"), &rules), ProbationStatus::Fail);
    }
}

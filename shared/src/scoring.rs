use std::fmt;

use chrono::{DateTime, Utc};

use crate::content::ContentItem;
use crate::sitemap::ChangeFreq;

/// Tunables for the interaction score and tier thresholds.
///
/// Passed explicitly to [`interaction_score`] and [`categorize`]; there is no
/// process-wide mutable copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    pub like_weight: f64,
    pub comment_weight: f64,
    pub collect_weight: f64,
    /// Bonus points per UTF-16 unit of body text.
    pub length_bonus_per_unit: f64,
    pub length_bonus_cap: f64,
    /// Score at which an item is evergreen regardless of age.
    pub evergreen_threshold: f64,
    pub hot_threshold: f64,
    pub hot_max_age_days: f64,
    /// Tuned on its own; not derived from `hot_threshold`.
    pub trending_threshold: f64,
    pub trending_max_age_days: f64,
    /// Anything scoring below this is left out of every sitemap.
    pub min_index_score: f64,
}

pub const DEFAULT_SCORE_CONFIG: ScoreConfig = ScoreConfig {
    like_weight: 1.5,
    comment_weight: 3.0,
    collect_weight: 5.0,
    length_bonus_per_unit: 0.02,
    length_bonus_cap: 20.0,
    evergreen_threshold: 100.0,
    hot_threshold: 50.0,
    hot_max_age_days: 30.0,
    trending_threshold: 10.0,
    trending_max_age_days: 7.0,
    min_index_score: 5.0,
};

impl Default for ScoreConfig {
    fn default() -> Self {
        DEFAULT_SCORE_CONFIG
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreConfigError {
    #[error("`{name}` must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("`{higher}` ({higher_value}) must not be below `{lower}` ({lower_value})")]
    ThresholdOrder {
        higher: &'static str,
        higher_value: f64,
        lower: &'static str,
        lower_value: f64,
    },
}

impl ScoreConfig {
    /// Checks weights are usable and thresholds run
    /// evergreen >= hot >= trending >= minimum.
    ///
    /// [`categorize`] does not rely on this ordering to terminate, but tiers
    /// stop meaning anything without it.
    pub fn validate(&self) -> Result<(), ScoreConfigError> {
        let non_negative = [
            ("like_weight", self.like_weight),
            ("comment_weight", self.comment_weight),
            ("collect_weight", self.collect_weight),
            ("length_bonus_per_unit", self.length_bonus_per_unit),
            ("length_bonus_cap", self.length_bonus_cap),
            ("hot_max_age_days", self.hot_max_age_days),
            ("trending_max_age_days", self.trending_max_age_days),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoreConfigError::InvalidWeight { name, value });
            }
        }

        let ordered = [
            ("evergreen_threshold", self.evergreen_threshold),
            ("hot_threshold", self.hot_threshold),
            ("trending_threshold", self.trending_threshold),
            ("min_index_score", self.min_index_score),
        ];
        for pair in ordered.windows(2) {
            let (higher, higher_value) = pair[0];
            let (lower, lower_value) = pair[1];
            if higher_value.is_nan() || lower_value.is_nan() || higher_value < lower_value {
                return Err(ScoreConfigError::ThresholdOrder {
                    higher,
                    higher_value,
                    lower,
                    lower_value,
                });
            }
        }

        Ok(())
    }
}

/// Sitemap bucket for a content item. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Evergreen,
    Hot,
    Trending,
    Standard,
    Excluded,
}

/// Sitemap metadata attached to every URL in a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSeo {
    pub priority: f64,
    pub changefreq: ChangeFreq,
}

impl Tier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Evergreen => "evergreen",
            Tier::Hot => "hot",
            Tier::Trending => "trending",
            Tier::Standard => "standard",
            Tier::Excluded => "excluded",
        }
    }

    pub const fn is_indexed(self) -> bool {
        !matches!(self, Tier::Excluded)
    }

    pub const fn seo(self) -> TierSeo {
        let (priority, changefreq) = match self {
            Tier::Evergreen => (1.0, ChangeFreq::Monthly),
            Tier::Hot => (0.9, ChangeFreq::Daily),
            Tier::Trending => (0.8, ChangeFreq::Daily),
            Tier::Standard => (0.6, ChangeFreq::Weekly),
            // Excluded items are filtered before rendering; this is only a fallback.
            Tier::Excluded => (0.5, ChangeFreq::Weekly),
        };
        TierSeo {
            priority,
            changefreq,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted engagement plus a capped body-length bonus.
pub fn interaction_score(item: &ContentItem, config: &ScoreConfig) -> f64 {
    let engagement = item.likes as f64 * config.like_weight
        + item.comments as f64 * config.comment_weight
        + item.collects as f64 * config.collect_weight;
    let length_bonus =
        (item.content_len() as f64 * config.length_bonus_per_unit).min(config.length_bonus_cap);
    engagement + length_bonus
}

/// Buckets an item relative to `now`.
pub fn categorize(item: &ContentItem, config: &ScoreConfig, now: DateTime<Utc>) -> Tier {
    classify(interaction_score(item, config), item.age_days(now), config)
}

/// First matching rule wins; the score ranges overlap, so order matters.
///
/// An unknown age never satisfies the age-gated rules.
pub fn classify(score: f64, age_days: Option<f64>, config: &ScoreConfig) -> Tier {
    let younger_than = |limit: f64| age_days.is_some_and(|age| age < limit);

    if score >= config.evergreen_threshold {
        Tier::Evergreen
    } else if score >= config.hot_threshold && younger_than(config.hot_max_age_days) {
        Tier::Hot
    } else if score >= config.trending_threshold && younger_than(config.trending_max_age_days) {
        Tier::Trending
    } else if score >= config.min_index_score {
        Tier::Standard
    } else {
        Tier::Excluded
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::{
        DEFAULT_SCORE_CONFIG, ScoreConfig, ScoreConfigError, Tier, categorize, classify,
        interaction_score,
    };
    use crate::content::{ContentItem, Timestamp};
    use crate::sitemap::ChangeFreq;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn item_with(likes: u64, comments: u64, collects: u64, content_len: usize) -> ContentItem {
        let mut item = ContentItem::new("1");
        item.likes = likes;
        item.comments = comments;
        item.collects = collects;
        item.content = "x".repeat(content_len);
        item
    }

    #[test]
    fn empty_item_scores_zero() {
        assert_close(interaction_score(&item_with(0, 0, 0, 0), &DEFAULT_SCORE_CONFIG), 0.0);
    }

    #[test]
    fn score_is_weighted_sum_plus_length_bonus() {
        // 2*1.5 + 3*3 + 1*5 + 100*0.02
        assert_close(
            interaction_score(&item_with(2, 3, 1, 100), &DEFAULT_SCORE_CONFIG),
            19.0,
        );
    }

    #[test]
    fn length_bonus_saturates_at_one_thousand_units() {
        let config = DEFAULT_SCORE_CONFIG;
        assert_close(interaction_score(&item_with(0, 0, 0, 999), &config), 19.98);
        assert_close(interaction_score(&item_with(0, 0, 0, 1000), &config), 20.0);
        assert_close(interaction_score(&item_with(0, 0, 0, 25_000), &config), 20.0);
    }

    #[test]
    fn score_never_decreases_when_one_signal_grows() {
        let config = DEFAULT_SCORE_CONFIG;
        let base = item_with(3, 3, 3, 300);
        let base_score = interaction_score(&base, &config);

        for step in [1_u64, 10, 1000] {
            let grow = step as usize;
            let candidates = [
                item_with(3 + step, 3, 3, 300),
                item_with(3, 3 + step, 3, 300),
                item_with(3, 3, 3 + step, 300),
                item_with(3, 3, 3, 300 + grow),
            ];
            for candidate in candidates {
                assert!(interaction_score(&candidate, &config) >= base_score);
            }
        }
    }

    #[test]
    fn tier_examples_follow_rule_order() {
        let config = DEFAULT_SCORE_CONFIG;
        assert_eq!(classify(150.0, Some(500.0), &config), Tier::Evergreen);
        assert_eq!(classify(60.0, Some(10.0), &config), Tier::Hot);
        assert_eq!(classify(12.0, Some(3.0), &config), Tier::Trending);
        assert_eq!(classify(12.0, Some(10.0), &config), Tier::Standard);
        assert_eq!(classify(3.0, Some(1.0), &config), Tier::Excluded);
    }

    #[test]
    fn hot_scores_past_the_window_fall_back_to_standard() {
        let config = DEFAULT_SCORE_CONFIG;
        assert_eq!(classify(60.0, Some(30.0), &config), Tier::Standard);
        assert_eq!(classify(60.0, Some(29.99), &config), Tier::Hot);
        // Hot-level score inside the trending window is still hot.
        assert_eq!(classify(60.0, Some(1.0), &config), Tier::Hot);
    }

    #[test]
    fn unknown_age_only_reaches_age_independent_tiers() {
        let config = DEFAULT_SCORE_CONFIG;
        assert_eq!(classify(100.0, None, &config), Tier::Evergreen);
        assert_eq!(classify(60.0, None, &config), Tier::Standard);
        assert_eq!(classify(12.0, None, &config), Tier::Standard);
        assert_eq!(classify(4.0, None, &config), Tier::Excluded);
    }

    #[test]
    fn every_score_and_age_lands_in_exactly_one_tier() {
        let config = DEFAULT_SCORE_CONFIG;
        let scores = [0.0, 4.99, 5.0, 9.99, 10.0, 49.99, 50.0, 99.99, 100.0, 1e6];
        let ages = [None, Some(-1.0), Some(0.0), Some(6.99), Some(7.0), Some(29.99), Some(30.0), Some(3650.0)];
        for score in scores {
            for age in ages {
                let tier = classify(score, age, &config);
                let expected = if score >= 100.0 {
                    Tier::Evergreen
                } else if score >= 50.0 && age.is_some_and(|a| a < 30.0) {
                    Tier::Hot
                } else if score >= 10.0 && age.is_some_and(|a| a < 7.0) {
                    Tier::Trending
                } else if score >= 5.0 {
                    Tier::Standard
                } else {
                    Tier::Excluded
                };
                assert_eq!(tier, expected, "score {score}, age {age:?}");
            }
        }
    }

    #[test]
    fn trending_threshold_is_tuned_independently_of_hot() {
        assert_close(DEFAULT_SCORE_CONFIG.trending_threshold, 10.0);

        let raised_hot = ScoreConfig {
            hot_threshold: 80.0,
            ..DEFAULT_SCORE_CONFIG
        };
        assert_eq!(classify(12.0, Some(3.0), &raised_hot), Tier::Trending);

        let raised_trending = ScoreConfig {
            trending_threshold: 20.0,
            ..DEFAULT_SCORE_CONFIG
        };
        assert_eq!(classify(12.0, Some(3.0), &raised_trending), Tier::Standard);
        assert_eq!(classify(60.0, Some(3.0), &raised_trending), Tier::Hot);
    }

    #[test]
    fn categorize_uses_the_injected_clock() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let mut item = item_with(8, 0, 0, 0); // score 12
        item.created_at = (now - TimeDelta::days(3)).into();
        assert_eq!(categorize(&item, &DEFAULT_SCORE_CONFIG, now), Tier::Trending);

        let later = now + TimeDelta::days(7);
        assert_eq!(categorize(&item, &DEFAULT_SCORE_CONFIG, later), Tier::Standard);

        item.updated_at = (later - TimeDelta::hours(1)).into();
        assert_eq!(categorize(&item, &DEFAULT_SCORE_CONFIG, later), Tier::Trending);
    }

    #[test]
    fn unparseable_update_time_blocks_age_gated_tiers() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let mut item = item_with(8, 0, 0, 0); // score 12
        item.created_at = (now - TimeDelta::days(2)).into();
        item.updated_at = Timestamp::Invalid;
        assert_eq!(item.age_days(now), None);
        assert_eq!(categorize(&item, &DEFAULT_SCORE_CONFIG, now), Tier::Standard);

        let mut hot = item_with(40, 0, 0, 0); // score 60
        hot.created_at = (now - TimeDelta::days(2)).into();
        hot.updated_at = Timestamp::Invalid;
        assert_eq!(categorize(&hot, &DEFAULT_SCORE_CONFIG, now), Tier::Standard);
    }

    #[test]
    fn default_config_is_valid_and_ordered() {
        let config = DEFAULT_SCORE_CONFIG;
        assert_eq!(config.validate(), Ok(()));
        assert!(config.evergreen_threshold >= config.hot_threshold);
        assert!(config.hot_threshold >= config.trending_threshold);
        assert!(config.trending_threshold >= config.min_index_score);
        assert!(config.trending_max_age_days <= config.hot_max_age_days);
    }

    #[test]
    fn validate_rejects_negative_weights_and_misordered_thresholds() {
        let negative = ScoreConfig {
            collect_weight: -1.0,
            ..DEFAULT_SCORE_CONFIG
        };
        assert_eq!(
            negative.validate(),
            Err(ScoreConfigError::InvalidWeight {
                name: "collect_weight",
                value: -1.0
            })
        );

        let misordered = ScoreConfig {
            hot_threshold: 120.0,
            ..DEFAULT_SCORE_CONFIG
        };
        assert!(matches!(
            misordered.validate(),
            Err(ScoreConfigError::ThresholdOrder {
                higher: "evergreen_threshold",
                lower: "hot_threshold",
                ..
            })
        ));
    }

    #[test]
    fn tier_seo_mapping_matches_sitemap_weights() {
        let expect = [
            (Tier::Evergreen, 1.0, ChangeFreq::Monthly),
            (Tier::Hot, 0.9, ChangeFreq::Daily),
            (Tier::Trending, 0.8, ChangeFreq::Daily),
            (Tier::Standard, 0.6, ChangeFreq::Weekly),
            (Tier::Excluded, 0.5, ChangeFreq::Weekly),
        ];
        for (tier, priority, changefreq) in expect {
            let seo = tier.seo();
            assert_close(seo.priority, priority);
            assert_eq!(seo.changefreq, changefreq);
        }
        assert!(!Tier::Excluded.is_indexed());
        assert!(Tier::Standard.is_indexed());
    }
}

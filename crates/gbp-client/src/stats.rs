//! Day-level review statistics.
//!
//! Aggregates the complete review set of a location (replied and unreplied
//! alike) into per-day buckets keyed on the date portion of `createTime`.
//! The fixed-width `YYYY-MM-DD` prefix makes lexicographic ordering the
//! same as chronological ordering, so sorting stays string-based.

use crate::models::{ReviewRecord, StarRating};
use serde::Serialize;
use std::collections::BTreeMap;

/// Review count per star rating bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    /// 1-star reviews.
    #[serde(rename = "ONE")]
    pub one: u32,

    /// 2-star reviews.
    #[serde(rename = "TWO")]
    pub two: u32,

    /// 3-star reviews.
    #[serde(rename = "THREE")]
    pub three: u32,

    /// 4-star reviews.
    #[serde(rename = "FOUR")]
    pub four: u32,

    /// 5-star reviews.
    #[serde(rename = "FIVE")]
    pub five: u32,
}

impl RatingDistribution {
    fn record(&mut self, rating: StarRating) {
        match rating {
            StarRating::One => self.one += 1,
            StarRating::Two => self.two += 1,
            StarRating::Three => self.three += 1,
            StarRating::Four => self.four += 1,
            StarRating::Five => self.five += 1,
        }
    }
}

/// Aggregated review metrics for a single calendar date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStat {
    /// Date in `YYYY-MM-DD` form.
    pub date: String,

    /// Number of reviews created that day.
    pub count: u32,

    /// Mean star rating, rounded to one decimal.
    pub average_rating: f64,

    /// Histogram over the five rating buckets.
    pub distribution: RatingDistribution,

    /// Non-empty comment texts from that day.
    pub comments: Vec<String>,
}

/// Group reviews by creation date, most recent day first.
///
/// Zero reviews yield an empty list, not an error.
pub fn aggregate_by_day(reviews: &[ReviewRecord]) -> Vec<DayStat> {
    struct DayAccumulator {
        count: u32,
        rating_sum: u32,
        distribution: RatingDistribution,
        comments: Vec<String>,
    }

    let mut days: BTreeMap<String, DayAccumulator> = BTreeMap::new();

    for review in reviews {
        let date = review
            .create_time
            .get(..10)
            .unwrap_or(review.create_time.as_str())
            .to_string();

        let day = days.entry(date).or_insert_with(|| DayAccumulator {
            count: 0,
            rating_sum: 0,
            distribution: RatingDistribution::default(),
            comments: Vec::new(),
        });

        day.count += 1;
        day.rating_sum += u32::from(review.star_rating.value());
        day.distribution.record(review.star_rating);
        if let Some(comment) = review.comment.as_deref() {
            if !comment.is_empty() {
                day.comments.push(comment.to_string());
            }
        }
    }

    // BTreeMap iterates ascending; reverse for most-recent-first.
    days.into_iter()
        .rev()
        .map(|(date, day)| DayStat {
            date,
            count: day.count,
            average_rating: round_one_decimal(f64::from(day.rating_sum) / f64::from(day.count)),
            distribution: day.distribution,
            comments: day.comments,
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

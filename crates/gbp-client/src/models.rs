//! Data model for the Business Profile API.
//!
//! The upstream API is duck-typed JSON; every entity here has exactly one
//! mapping function that absorbs the optional fields and defaulting, so no
//! call site ever pokes at raw JSON shapes. Timestamps stay as the ISO-8601
//! strings upstream sends them as.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// Star rating of a review.
///
/// Ordinal, never coerced to an unspecified value: a review whose rating
/// is missing or unknown fails mapping instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StarRating {
    /// 1 star
    One,
    /// 2 stars
    Two,
    /// 3 stars
    Three,
    /// 4 stars
    Four,
    /// 5 stars
    Five,
}

impl StarRating {
    /// All ratings in ascending order.
    pub const ALL: [StarRating; 5] = [
        StarRating::One,
        StarRating::Two,
        StarRating::Three,
        StarRating::Four,
        StarRating::Five,
    ];

    /// Numeric value, 1 through 5.
    pub fn value(self) -> u8 {
        match self {
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
            StarRating::Four => 4,
            StarRating::Five => 5,
        }
    }

    /// Upstream wire name ("ONE" through "FIVE").
    pub fn as_str(self) -> &'static str {
        match self {
            StarRating::One => "ONE",
            StarRating::Two => "TWO",
            StarRating::Three => "THREE",
            StarRating::Four => "FOUR",
            StarRating::Five => "FIVE",
        }
    }
}

/// The author of a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    /// Display name as shown on the review.
    pub display_name: String,

    /// Profile photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,

    /// Whether the reviewer chose to stay anonymous.
    #[serde(default)]
    pub is_anonymous: bool,
}

/// A posted reply to a review.
///
/// Presence of this value on a review is the sole "already replied"
/// signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReply {
    /// Reply text.
    pub comment: String,

    /// When the reply was last updated (ISO-8601).
    pub update_time: String,
}

/// A customer review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Review identifier.
    pub review_id: String,

    /// Review author.
    pub reviewer: Reviewer,

    /// Star rating.
    pub star_rating: StarRating,

    /// Review text, absent for rating-only reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Creation timestamp (ISO-8601).
    pub create_time: String,

    /// Last update timestamp (ISO-8601).
    pub update_time: String,

    /// The posted reply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_reply: Option<ReviewReply>,
}

/// Raw review shape as upstream sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
    review_id: Option<String>,
    name: Option<String>,
    reviewer: Option<RawReviewer>,
    star_rating: Option<StarRating>,
    comment: Option<String>,
    create_time: Option<String>,
    update_time: Option<String>,
    review_reply: Option<ReviewReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReviewer {
    display_name: Option<String>,
    profile_photo_url: Option<String>,
    #[serde(default)]
    is_anonymous: bool,
}

impl ReviewRecord {
    /// Map a raw upstream review into a record.
    ///
    /// The review id falls back to the trailing segment of the opaque
    /// `name` resource when not provided separately. A missing or unknown
    /// star rating fails the mapping of that review.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, ApiError> {
        let raw: RawReview = serde_json::from_value(raw)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed review: {}", e)))?;

        let review_id = raw
            .review_id
            .or_else(|| {
                raw.name
                    .as_deref()
                    .and_then(|name| name.rsplit('/').next())
                    .map(String::from)
            })
            .ok_or_else(|| {
                ApiError::InvalidResponse("review has neither reviewId nor name".to_string())
            })?;

        let star_rating = raw
            .star_rating
            .ok_or_else(|| ApiError::InvalidResponse("review has no star rating".to_string()))?;

        let reviewer = raw.reviewer.map_or_else(
            || Reviewer {
                display_name: "Anonymous".to_string(),
                profile_photo_url: None,
                is_anonymous: true,
            },
            |r| Reviewer {
                display_name: r.display_name.unwrap_or_else(|| "Anonymous".to_string()),
                profile_photo_url: r.profile_photo_url,
                is_anonymous: r.is_anonymous,
            },
        );

        Ok(Self {
            review_id,
            reviewer,
            star_rating,
            comment: raw.comment,
            create_time: raw.create_time.unwrap_or_default(),
            update_time: raw.update_time.unwrap_or_default(),
            review_reply: raw.review_reply,
        })
    }

    /// Whether a reply has been posted.
    pub fn is_replied(&self) -> bool {
        self.review_reply.is_some()
    }
}

/// Postal address of a location storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    /// Street address lines.
    #[serde(default)]
    pub address_lines: Vec<String>,

    /// City or town.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,

    /// State or province.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,

    /// Postal code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// CLDR region code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
}

/// Phone numbers of a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumbers {
    /// Primary phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
}

/// A business location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Resource name (`locations/{id}` or `accounts/{a}/locations/{id}`).
    pub name: String,

    /// Business title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Phone numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<PhoneNumbers>,

    /// Website URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,

    /// Storefront address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront_address: Option<PostalAddress>,
}

impl Location {
    /// Map a raw upstream location into a model.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, ApiError> {
        serde_json::from_value(raw)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed location: {}", e)))
    }
}

/// A Business Profile account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Resource name (`accounts/{id}`).
    pub name: String,

    /// Human-readable account name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

/// One page of raw reviews from upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReviewsPage {
    /// Raw review entries; mapped one at a time.
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,

    /// Opaque continuation cursor, passed through unchanged.
    pub next_page_token: Option<String>,

    /// Total number of reviews for the location.
    pub total_review_count: Option<u32>,
}

/// One page of accounts from upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountsPage {
    /// Accounts on this page.
    #[serde(default)]
    pub accounts: Vec<Account>,

    /// Opaque continuation cursor.
    pub next_page_token: Option<String>,
}

/// One page of locations from upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocationsPage {
    /// Raw location entries.
    #[serde(default)]
    pub locations: Vec<serde_json::Value>,

    /// Opaque continuation cursor.
    pub next_page_token: Option<String>,
}

use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::error::{HarvestError, Result};
pub use crate::tools::identity::{EventId, ExternalId};

/// Text written in place of a value no strategy could extract.
pub const MISSING: &str = "N/A";

/// Corpus partition key, e.g. `best_seller` or `most_wished_for`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    /// Canonicalize free text to a stable key: lowercase, words joined by `_`.
    pub fn from_raw(name: &str) -> Self {
        let key = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        Category(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key is already in `from_raw` form, i.e. safe as a file stem.
    pub fn is_canonical(&self) -> bool {
        !self.0.is_empty() && Category::from_raw(&self.0) == *self
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which ranked listing a run walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    BestSeller,
    MostWishedFor,
}

impl Listing {
    pub fn category(self) -> Category {
        match self {
            Listing::BestSeller => Category::from_raw("best seller"),
            Listing::MostWishedFor => Category::from_raw("most wished for"),
        }
    }
}

/// A resolved field: extracted text, or the explicit missing sentinel.
///
/// Serializes as a plain string; `Missing` is written as [`MISSING`] so a
/// record never carries `null`. The string form cannot tell page text that
/// reads `N/A` from a miss, so resolution never produces
/// `Found("N/A")` and reading one back always yields `Missing`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldValue {
    Found(String),
    #[default]
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            FieldValue::Found(s) => Some(s),
            FieldValue::Missing => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        if s == MISSING {
            FieldValue::Missing
        } else {
            FieldValue::Found(s)
        }
    }
}

impl From<FieldValue> for String {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Found(s) => s,
            FieldValue::Missing => MISSING.to_string(),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        v.map(FieldValue::Found).unwrap_or(FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_deref().unwrap_or(MISSING))
    }
}

/// Logical fields read from a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Price,
    Brand,
    Voucher,
    DiscountText,
    RatingSummary,
    RatingCount,
    ReviewTopics,
    TopReviewExcerpt,
    ImageUrl,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Title,
        Field::Price,
        Field::Brand,
        Field::Voucher,
        Field::DiscountText,
        Field::RatingSummary,
        Field::RatingCount,
        Field::ReviewTopics,
        Field::TopReviewExcerpt,
        Field::ImageUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Price => "price",
            Field::Brand => "brand",
            Field::Voucher => "voucher",
            Field::DiscountText => "discountText",
            Field::RatingSummary => "ratingSummary",
            Field::RatingCount => "ratingCount",
            Field::ReviewTopics => "reviewTopics",
            Field::TopReviewExcerpt => "topReviewExcerpt",
            Field::ImageUrl => "imageUrl",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every extractable field of one detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub title: FieldValue,
    pub price: FieldValue,
    pub brand: FieldValue,
    pub voucher: FieldValue,
    pub discount_text: FieldValue,
    pub rating_summary: FieldValue,
    pub rating_count: FieldValue,
    pub review_topics: FieldValue,
    pub top_review_excerpt: FieldValue,
    pub image_url: FieldValue,
}

impl ProductFields {
    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::Title => &self.title,
            Field::Price => &self.price,
            Field::Brand => &self.brand,
            Field::Voucher => &self.voucher,
            Field::DiscountText => &self.discount_text,
            Field::RatingSummary => &self.rating_summary,
            Field::RatingCount => &self.rating_count,
            Field::ReviewTopics => &self.review_topics,
            Field::TopReviewExcerpt => &self.top_review_excerpt,
            Field::ImageUrl => &self.image_url,
        }
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Price => &mut self.price,
            Field::Brand => &mut self.brand,
            Field::Voucher => &mut self.voucher,
            Field::DiscountText => &mut self.discount_text,
            Field::RatingSummary => &mut self.rating_summary,
            Field::RatingCount => &mut self.rating_count,
            Field::ReviewTopics => &mut self.review_topics,
            Field::TopReviewExcerpt => &mut self.top_review_excerpt,
            Field::ImageUrl => &mut self.image_url,
        };
        *slot = value;
    }
}

/// One scraped product observation. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub external_id: ExternalId,
    pub event_id: EventId,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub source_url: String,
}

impl ProductRecord {
    pub fn new(source_url: &str, external_id: ExternalId, fields: ProductFields) -> Self {
        Self {
            external_id,
            event_id: EventId::generate(),
            fields,
            source_url: source_url.to_string(),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.fields.image_url.as_deref()
    }
}

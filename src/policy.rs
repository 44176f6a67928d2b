use crate::tools::dedup::DedupMode;
use crate::tools::identity::IdentityScheme;
use crate::tools::page::FetchConfig;
use crate::tools::paginate::PaginationConfig;
use crate::tools::resolve::{FieldSpec, FieldTable, Strategy, Transform};
use crate::{error::*, types::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const POLICY_VERSION: u32 = 1;

const BEST_SELLER_URL: &str =
    "https://www.amazon.co.uk/Best-Sellers-Computers-Accessories/zgbs/computers/ref=zg_bs_nav_0";
const MOST_WISHED_FOR_URL: &str =
    "https://www.amazon.co.uk/gp/most-wished-for/computers/ref=zg_mw_nav_0";

/// Everything one run needs to know about a site and a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestPolicy {
    #[serde(default = "default_version")]
    pub version: u32,
    pub category: Category,
    pub start_url: String,
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub identity: IdentityScheme,
    pub fields: FieldTable,
    #[serde(default)]
    pub dedup_mode: DedupMode,
    /// Visit at most this many candidates per run; `None` visits all.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Cookie/consent control dismissed before the listing is read.
    #[serde(default)]
    pub consent: Option<String>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_version() -> u32 {
    POLICY_VERSION
}

impl HarvestPolicy {
    pub fn with_mode(mut self, mode: DedupMode) -> Self {
        self.dedup_mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let p: HarvestPolicy = serde_json::from_str(text)?;
        validate_policy(&p)?;
        Ok(p)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

pub fn default_pagination() -> PaginationConfig {
    PaginationConfig {
        container: "div.p13n-gridRow".into(),
        item: "div[id='gridItemRoot']".into(),
        link: "a[href]".into(),
        next: "li.a-last".into(),
        page_budget: 2,
        wait_ms: 2_000,
        scroll_retries: 2,
    }
}

/// Detail-page strategies, most specific template first.
pub fn default_field_table() -> FieldTable {
    let newline_to_dot = || Transform::ReplaceNewlines(".".into());
    FieldTable(vec![
        FieldSpec::new(Field::Title, vec![Strategy::text("span#productTitle")]),
        FieldSpec::new(
            Field::Price,
            vec![
                Strategy::text("span.a-price.a-text-price.header-price.a-size-base.a-text-normal"),
                Strategy::text("span.a-size-medium.a-color-price.priceBlockBuyingPriceString")
                    .then(newline_to_dot()),
                Strategy::text("span.a-price.aok-align-center.reinventPricePriceToPayMargin.priceToPay")
                    .then(newline_to_dot()),
                Strategy::text("td.a-span12"),
                Strategy::text("span[data-maple-math='cost']"),
            ],
        ),
        FieldSpec::new(
            Field::Brand,
            vec![Strategy::text("tr.a-spacing-small.po-brand")
                .then(Transform::ReplaceNewlines(" ".into()))
                .then(Transform::Word(1))],
        ),
        FieldSpec::new(
            Field::Voucher,
            vec![
                Strategy::text("span.promoPriceBlockMessage").then(Transform::Line(1)),
                Strategy::text("div[data-csa-c-slot-id='promo-cxcw-0-0']"),
            ],
        ),
        FieldSpec::new(
            Field::DiscountText,
            vec![
                Strategy::text("span.savingPriceOverride.savingsPercentage"),
                Strategy::text("td.priceBlockSavingsString"),
                Strategy::text("td.a-span12.a-color-price.a-size-base"),
            ],
        ),
        FieldSpec::new(
            Field::RatingSummary,
            vec![Strategy::text("span.a-size-medium.a-color-base")],
        ),
        FieldSpec::new(
            Field::RatingCount,
            vec![Strategy::text("div[data-hook='total-review-count']")],
        ),
        FieldSpec::new(
            Field::ReviewTopics,
            vec![Strategy::text("div.cr-lighthouse-terms").then(Transform::ReplaceNewlines(", ".into()))],
        ),
        FieldSpec::new(
            Field::TopReviewExcerpt,
            vec![Strategy::scoped(
                "div#cm-cr-dp-review-list",
                "div[data-hook='review']",
                "span[data-hook='review-body']",
            )
            .then(Transform::CollapseWhitespace)],
        ),
        FieldSpec::new(
            Field::ImageUrl,
            vec![
                Strategy::attribute("div.imgTagWrapper img", "src"),
                Strategy::attribute("img#landingImage", "src"),
            ],
        ),
    ])
}

pub fn default_policy(listing: Listing) -> HarvestPolicy {
    let start_url = match listing {
        Listing::BestSeller => BEST_SELLER_URL,
        Listing::MostWishedFor => MOST_WISHED_FOR_URL,
    };
    HarvestPolicy {
        version: POLICY_VERSION,
        category: listing.category(),
        start_url: start_url.into(),
        pagination: default_pagination(),
        identity: IdentityScheme::default(),
        fields: default_field_table(),
        dedup_mode: DedupMode::Incremental,
        limit: None,
        consent: Some("input#sp-cc-accept".into()),
        fetch: FetchConfig::default(),
    }
}

pub fn validate_policy(p: &HarvestPolicy) -> Result<()> {
    if !p.category.is_canonical() {
        return Err(HarvestError::Config(format!(
            "category {:?} must be a lowercase key like {:?}",
            p.category.0,
            Category::from_raw(&p.category.0).0
        )));
    }
    url::Url::parse(&p.start_url).map_err(|_| HarvestError::InvalidUrl(p.start_url.clone()))?;
    if p.pagination.page_budget == 0 {
        return Err(HarvestError::Config("page budget must be at least 1".into()));
    }
    if p.identity.marker.is_empty() || p.identity.token_len == 0 {
        return Err(HarvestError::Config("identity scheme needs a marker and a token width".into()));
    }

    let pg = &p.pagination;
    let mut selectors = vec![
        pg.container.as_str(),
        pg.item.as_str(),
        pg.link.as_str(),
        pg.next.as_str(),
    ];
    if let Some(consent) = &p.consent {
        selectors.push(consent.as_str());
    }

    let mut seen = HashSet::new();
    for spec in &p.fields.0 {
        if !seen.insert(spec.field) {
            return Err(HarvestError::Config(format!("field {} listed twice", spec.field)));
        }
        if spec.strategies.is_empty() {
            return Err(HarvestError::Config(format!("field {} has no strategies", spec.field)));
        }
        for s in &spec.strategies {
            selectors.extend(s.selectors());
        }
    }

    for sel in selectors {
        scraper::Selector::parse(sel).map_err(|_| HarvestError::InvalidSelector(sel.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_validate() {
        for listing in [Listing::BestSeller, Listing::MostWishedFor] {
            let p = default_policy(listing);
            validate_policy(&p).unwrap();
            assert_eq!(p.fields.0.len(), Field::ALL.len());
        }
        assert_eq!(default_policy(Listing::MostWishedFor).category.as_str(), "most_wished_for");
    }

    #[test]
    fn test_default_price_has_five_fallbacks() {
        let table = default_field_table();
        assert_eq!(table.spec(Field::Price).unwrap().strategies.len(), 5);
    }

    #[test]
    fn test_policy_json_round_trip() {
        let p = default_policy(Listing::BestSeller).with_limit(4);
        let json = serde_json::to_string_pretty(&p).unwrap();
        let back = HarvestPolicy::from_json(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut p = default_policy(Listing::BestSeller);
        p.pagination.next = "li[".into();
        assert!(matches!(validate_policy(&p), Err(HarvestError::InvalidSelector(_))));
    }

    #[test]
    fn test_rejects_empty_strategy_list_and_duplicates() {
        let mut p = default_policy(Listing::BestSeller);
        p.fields.0[0].strategies.clear();
        assert!(matches!(validate_policy(&p), Err(HarvestError::Config(_))));

        let mut p = default_policy(Listing::BestSeller);
        let dup = p.fields.0[0].clone();
        p.fields.0.push(dup);
        assert!(matches!(validate_policy(&p), Err(HarvestError::Config(_))));
    }

    #[test]
    fn test_rejects_non_canonical_category() {
        for raw in ["../x", "Best Seller", ""] {
            let mut p = default_policy(Listing::BestSeller);
            p.category = Category(raw.into());
            assert!(matches!(validate_policy(&p), Err(HarvestError::Config(_))), "{raw}");
        }
    }

    #[test]
    fn test_rejects_zero_budget() {
        let mut p = default_policy(Listing::BestSeller);
        p.pagination.page_budget = 0;
        assert!(validate_policy(&p).is_err());
    }
}

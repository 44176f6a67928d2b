#[cfg(test)]
mod tests {
    use crate::tools::identity::*;
    use std::collections::HashSet;

    const BASE: &str = "https://www.amazon.co.uk/Logitech-Wireless-Mouse/dp/B07XJ8C8F5";

    #[test]
    fn test_external_id_reads_query_token() {
        let url = format!("{BASE}/ref=zg_bs_computers_1/262-0?pd_rd_w=abc&pd_rd_i=B07XJ8C8F5&psc=1");
        let id = external_id(&url, &IdentityScheme::default());
        assert_eq!(id, ExternalId::Valid("B07XJ8C8F5".to_string()));
    }

    #[test]
    fn test_external_id_is_campaign_invariant() {
        let scheme = IdentityScheme::default();
        let a = format!("{BASE}/ref=zg_bs_1?pd_rd_r=111&pd_rd_i=B07XJ8C8F5&psc=1");
        let b = format!("{BASE}/ref=zg_mw_9?pd_rd_i=B07XJ8C8F5&pd_rd_w=zzz&th=1&psc=1");
        assert_eq!(external_id(&a, &scheme), external_id(&b, &scheme));
    }

    #[test]
    fn test_external_id_reads_token_inside_encoded_redirect() {
        let url = "https://www.amazon.co.uk/sspa/click?ie=UTF8&url=%2Fdp%2FB07XJ8C8F5%3Fpd_rd_i%3DB07XJ8C8F5%26psc%3D1";
        let id = external_id(url, &IdentityScheme::default());
        assert_eq!(id.as_str(), "B07XJ8C8F5");
    }

    #[test]
    fn test_external_id_without_marker_is_malformed() {
        let id = external_id(BASE, &IdentityScheme::default());
        assert!(id.is_malformed());
        assert_eq!(id.as_str(), INVALID_EXTERNAL_ID);
    }

    #[test]
    fn test_external_id_wrong_width_is_malformed() {
        let scheme = IdentityScheme::default();
        let nine = format!("{BASE}?pd_rd_i=B07XJ8C8F&psc=1");
        let eleven = format!("{BASE}?pd_rd_i=B07XJ8C8F55&psc=1");
        assert!(external_id(&nine, &scheme).is_malformed());
        assert!(external_id(&eleven, &scheme).is_malformed());

        let nine_wide = IdentityScheme {
            token_len: 9,
            ..IdentityScheme::default()
        };
        assert_eq!(external_id(&nine, &nine_wide).as_str(), "B07XJ8C8F");
    }

    #[test]
    fn test_external_id_garbage_input_does_not_panic() {
        let scheme = IdentityScheme::default();
        for input in ["", "not a url", "pd_rd_i=", "?pd_rd_i=&psc=1", "pd_rd_i"] {
            assert!(external_id(input, &scheme).is_malformed(), "input: {input:?}");
        }
    }

    #[test]
    fn test_external_id_sentinel_round_trips_through_json() {
        let json = serde_json::to_string(&ExternalId::Malformed).unwrap();
        assert_eq!(json, format!("\"{INVALID_EXTERNAL_ID}\""));
        let back: ExternalId = serde_json::from_str(&json).unwrap();
        assert!(back.is_malformed());
    }

    #[test]
    fn test_event_id_canonical_form() {
        let id = event_id().to_string();
        assert_eq!(id.len(), 36);
        for (i, c) in id.chars().enumerate() {
            if matches!(i, 8 | 13 | 18 | 23) {
                assert_eq!(c, '-');
            } else {
                assert!(c.is_ascii_hexdigit() && !c.is_ascii_uppercase(), "{id}");
            }
        }
        // version nibble
        assert_eq!(id.chars().nth(14), Some('4'));
    }

    #[test]
    fn test_event_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| event_id().to_string()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_event_id_serializes_as_string() {
        let id = event_id();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}

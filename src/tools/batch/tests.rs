#[cfg(test)]
mod tests {
    use crate::tools::batch::*;
    use crate::tools::identity::ExternalId;
    use crate::types::{FieldValue, ProductFields, ProductRecord, MISSING};

    fn record(token: &str, image: Option<&str>) -> ProductRecord {
        let fields = ProductFields {
            title: FieldValue::Found(format!("Product {token}")),
            image_url: image.map(String::from).into(),
            ..ProductFields::default()
        };
        ProductRecord::new(
            &format!("https://shop.example/dp/{token}?pd_rd_i={token}&psc=1"),
            ExternalId::Valid(token.to_string()),
            fields,
        )
    }

    #[test]
    fn test_batch_keeps_visit_order_and_duplicates() {
        let mut batch = RecordBatch::new();
        batch.push(record("A000000001", None));
        batch.push(record("C000000003", None));
        batch.push(record("A000000001", None));

        let ids: Vec<&str> = batch.records().iter().map(|r| r.external_id.as_str()).collect();
        assert_eq!(ids, vec!["A000000001", "C000000003", "A000000001"]);
        // each observation still gets its own event id
        assert_ne!(batch.records()[0].event_id, batch.records()[2].event_id);
    }

    #[test]
    fn test_image_manifest_numbers_after_existing_files() {
        let batch: RecordBatch = vec![
            record("A000000001", Some("https://img.example/a.jpg")),
            record("B000000002", None),
            record("C000000003", Some("https://img.example/c.jpg")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            batch.image_urls(),
            vec!["https://img.example/a.jpg", "https://img.example/c.jpg"]
        );
        let jobs = batch.image_manifest(7);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].file_name, "7.jpg");
        assert_eq!(jobs[1].file_name, "8.jpg");
        assert_eq!(jobs[1].external_id.as_str(), "C000000003");
    }

    #[test]
    fn test_json_shape_has_every_field_and_no_nulls() {
        let batch: RecordBatch = vec![record("A000000001", None)].into_iter().collect();
        let json = batch.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value[0].as_object().unwrap();

        for key in [
            "externalId",
            "eventId",
            "title",
            "price",
            "brand",
            "voucher",
            "discountText",
            "ratingSummary",
            "ratingCount",
            "reviewTopics",
            "topReviewExcerpt",
            "imageUrl",
            "sourceUrl",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
            assert!(!obj[key].is_null(), "null value for {key}");
        }
        assert_eq!(obj["price"], MISSING);
        assert_eq!(obj["eventId"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_json_round_trip_preserves_missing_sentinel() {
        let batch: RecordBatch = vec![record("A000000001", None)].into_iter().collect();
        let back: Vec<ProductRecord> = serde_json::from_str(&batch.to_json().unwrap()).unwrap();
        assert_eq!(back, batch.into_records());
    }

    #[test]
    fn test_write_json_creates_file() {
        let dir = std::env::temp_dir().join(format!("harvest-batch-{}", uuid::Uuid::new_v4()));
        let path = dir.join("data.json");
        let batch: RecordBatch = vec![record("A000000001", None)].into_iter().collect();
        batch.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("A000000001"));
        let _ = std::fs::remove_dir_all(dir);
    }
}

//! Pending Quote Repository Tests

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{FormValues, KeyValueStore, QuoteId};
use domain_party::ActorRole;
use domain_quote::{
    InsuranceType, PendingQuote, PendingQuoteRepository, PendingWriteLocks, PremiumCalculator,
    QuoteError, QuoteStatus, PENDING_QUOTES_KEY,
};
use infra_db::InMemoryKeyValueStore;

fn quote(title: &str) -> PendingQuote {
    PendingQuote {
        id: QuoteId::new(),
        title: title.to_string(),
        insurance_type: InsuranceType::Marine,
        status: QuoteStatus::Pending,
        created_date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        quote_details: FormValues::from_pairs([("sum_insured", "500000")]),
        premium: Some(
            PremiumCalculator::default()
                .quote(dec!(500000), "All Risks", ActorRole::Individual)
                .unwrap(),
        ),
    }
}

mod repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_replaces_or_appends() {
        let repository = PendingQuoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let first = quote("First");
        repository.upsert(first.clone()).await.unwrap();
        repository.upsert(quote("Second")).await.unwrap();

        let mut renamed = first.clone();
        renamed.title = "First (edited)".to_string();
        let replaced = repository.upsert(renamed).await.unwrap();

        let quotes = repository.list().await.unwrap();
        assert!(replaced);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].title, "First (edited)");

        let appended = repository.upsert(quote("Third")).await.unwrap();
        assert!(!appended);
        assert_eq!(repository.list().await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_are_all_kept() {
        let repository = PendingQuoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.upsert(quote(&format!("Quote {}", i))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repository.list().await.unwrap().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repositories_sharing_a_scope_lock_keep_every_insert() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
        let locks = PendingWriteLocks::new();

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let repository =
                    PendingQuoteRepository::with_write_lock(store.clone(), locks.for_scope("users/jane"));
                tokio::spawn(async move { repository.insert(quote(&format!("Quote {}", i))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let repository = PendingQuoteRepository::new(store);
        assert_eq!(repository.list().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let repository = PendingQuoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let pending = quote("Only");
        repository.insert(pending.clone()).await.unwrap();

        let result = repository.insert(pending.clone()).await;
        assert!(matches!(result, Err(QuoteError::DuplicateQuote(id)) if id == pending.id));
    }

    #[tokio::test]
    async fn test_remove_deletes_exactly_one() {
        let repository = PendingQuoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let keep = quote("Keep");
        let gone = quote("Drop");
        repository.insert(keep.clone()).await.unwrap();
        repository.insert(gone.clone()).await.unwrap();

        assert!(repository.remove(gone.id).await.unwrap());
        assert!(!repository.remove(gone.id).await.unwrap());

        let quotes = repository.list().await.unwrap();
        assert_eq!(quotes, vec![keep.clone()]);
        assert!(matches!(
            repository.require(gone.id).await,
            Err(QuoteError::QuoteNotFound(_))
        ));
        assert_eq!(repository.get(keep.id).await.unwrap(), Some(keep));
    }

    #[tokio::test]
    async fn test_malformed_list_reads_as_empty() {
        let store = Arc::new(InMemoryKeyValueStore::with_entries([(PENDING_QUOTES_KEY, "[{\"id\": 42")]));
        let repository = PendingQuoteRepository::new(store.clone());

        assert!(repository.list().await.unwrap().is_empty());

        repository.upsert(quote("Fresh")).await.unwrap();
        assert_eq!(repository.list().await.unwrap().len(), 1);
        assert!(store.get(PENDING_QUOTES_KEY).await.unwrap().unwrap().starts_with('['));
    }
}

mod wire_format_tests {
    use super::*;

    #[test]
    fn test_dashboard_shape() {
        let pending = quote("Marine Cargo - Containerized (import)");
        let json = serde_json::to_value(&pending).unwrap();

        assert_eq!(json["type"], "marine");
        assert_eq!(json["status"], "pending");
        assert!(json["createdDate"].as_str().unwrap().starts_with("2026-10-18T09:00:00"));
        assert_eq!(json["quoteDetails"]["sum_insured"], "500000");
        assert!(json["premium"]["totalPayable"].is_string());
        assert_eq!(json["id"], pending.id.as_uuid().to_string());
    }

    #[test]
    fn test_travel_quote_omits_premium() {
        let mut pending = quote("Travel - Dubai");
        pending.insurance_type = InsuranceType::Travel;
        pending.premium = None;

        let json = serde_json::to_value(&pending).unwrap();
        assert!(json.get("premium").is_none());

        let back: PendingQuote = serde_json::from_value(json).unwrap();
        assert_eq!(back, pending);
    }
}

//! Runs the court store contract against PostgreSQL in a disposable container.

#[cfg(test)]
mod tests {
    use courtdir::models::{
        Cost, Court, CourtId, CourtStatus, CourtType, CreateCourt, CreateUser, CursorPosition,
        Page, PaginationOpts, UpdateCourt,
    };
    use courtdir::store::{CourtQuery, CourtStore, SearchQuery, StoreError};
    use courtdir::test_utils::{new_court, PostgresTestContext};

    fn search(text: &str) -> CourtQuery {
        CourtQuery::Search(SearchQuery {
            text: text.to_string(),
            status: None,
            court_type: None,
            cost: None,
        })
    }

    #[tokio::test]
    async fn test_postgres_insert_get_patch_delete() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        let id = store
            .insert_court(
                CreateCourt {
                    cost_notes: Some("Members only".to_string()),
                    ..new_court("Riverside Courts")
                },
                1_000,
            )
            .await
            .unwrap();

        let court = store.get_court(id).await.unwrap().unwrap();
        assert_eq!(court.name, "Riverside Courts");
        assert_eq!(court.cost_notes.as_deref(), Some("Members only"));
        assert_eq!(court.created_at, 1_000);
        assert_eq!(court.updated_at, 1_000);
        assert_eq!(court.last_verified_at, 1_000);

        let patched = store
            .patch_court(
                id,
                &UpdateCourt {
                    num_courts: Some(6),
                    court_type: Some(CourtType::Indoor),
                    ..Default::default()
                },
                2_000,
            )
            .await
            .unwrap();
        assert!(patched);

        let after = store.get_court(id).await.unwrap().unwrap();
        assert_eq!(after.num_courts, 6);
        assert_eq!(after.court_type, CourtType::Indoor);
        assert_eq!(after.updated_at, 2_000);
        assert_eq!(after.created_at, 1_000);
        assert_eq!(after.name, court.name);

        assert!(store.delete_court(id).await.unwrap());
        assert!(store.get_court(id).await.unwrap().is_none());
        assert!(!store.delete_court(id).await.unwrap());
        assert!(!store
            .patch_court(CourtId::new(), &UpdateCourt::default(), 3_000)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_postgres_keyset_pagination_by_status() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        let mut expected = Vec::new();
        for i in 0..5 {
            let status = if i == 2 {
                CourtStatus::Rejected
            } else {
                CourtStatus::Approved
            };
            let id = store
                .insert_court(
                    CreateCourt {
                        status,
                        ..new_court(&format!("Court {}", i))
                    },
                    i,
                )
                .await
                .unwrap();
            if status == CourtStatus::Approved {
                expected.push(id);
            }
        }

        let query = CourtQuery::ByStatus(CourtStatus::Approved);
        let first = store
            .paginate_courts(&query, &PaginationOpts::first(2))
            .await
            .unwrap();
        assert!(!first.is_done);

        let second = store
            .paginate_courts(&query, &PaginationOpts::after(2, first.continue_cursor.clone()))
            .await
            .unwrap();
        assert!(second.is_done);

        let seen: Vec<CourtId> = first
            .page
            .iter()
            .chain(second.page.iter())
            .map(|c| c.id)
            .collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_postgres_location_and_court_type_reads() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        for (name, state, city, court_type) in [
            ("A", "OR", "Portland", CourtType::Indoor),
            ("B", "ME", "Portland", CourtType::Outdoor),
            ("C", "OR", "Salem", CourtType::Indoor),
        ] {
            store
                .insert_court(
                    CreateCourt {
                        address_state: state.to_string(),
                        address_city: city.to_string(),
                        court_type,
                        ..new_court(name)
                    },
                    1,
                )
                .await
                .unwrap();
        }

        let opts = PaginationOpts::first(10);
        let names = |page: &Page<Court>| {
            page.page.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
        };

        let portland = store
            .paginate_courts(
                &CourtQuery::ByLocation {
                    state: None,
                    city: Some("Portland".to_string()),
                },
                &opts,
            )
            .await
            .unwrap();
        assert_eq!(names(&portland), vec!["A", "B"]);

        let oregon = store
            .paginate_courts(
                &CourtQuery::ByLocation {
                    state: Some("OR".to_string()),
                    city: None,
                },
                &opts,
            )
            .await
            .unwrap();
        assert_eq!(names(&oregon), vec!["A", "C"]);

        let indoor = store
            .paginate_courts(&CourtQuery::ByCourtType(CourtType::Indoor), &opts)
            .await
            .unwrap();
        assert_eq!(names(&indoor), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_postgres_search_matches_terms_and_prefixes() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        store
            .insert_court(new_court("Central Park Courts"), 1)
            .await
            .unwrap();
        store
            .insert_court(
                CreateCourt {
                    status: CourtStatus::Pending,
                    cost: Cost::Paid,
                    ..new_court("Central Library Courts")
                },
                2,
            )
            .await
            .unwrap();
        store
            .insert_court(new_court("Westside Courts"), 3)
            .await
            .unwrap();

        let opts = PaginationOpts::first(10);

        let prefix = store.paginate_courts(&search("cent"), &opts).await.unwrap();
        assert_eq!(prefix.page.len(), 2);
        assert!(prefix.is_done);

        let approved = store
            .paginate_courts(
                &CourtQuery::Search(SearchQuery {
                    text: "Central".to_string(),
                    status: Some(CourtStatus::Approved),
                    court_type: None,
                    cost: None,
                }),
                &opts,
            )
            .await
            .unwrap();
        assert_eq!(approved.page.len(), 1);
        assert_eq!(approved.page[0].name, "Central Park Courts");

        let repeated = store
            .paginate_courts(&search("cent cent"), &opts)
            .await
            .unwrap();
        assert_eq!(repeated.page.len(), 2);

        let nothing = store.paginate_courts(&search("!!"), &opts).await.unwrap();
        assert!(nothing.page.is_empty());
        assert!(nothing.is_done);

        // Repeated words in a name do not raise its rank.
        store
            .insert_court(new_court("Park Park Courts"), 4)
            .await
            .unwrap();
        let names = |page: &Page<Court>| {
            page.page.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
        };

        let park = store.paginate_courts(&search("park"), &opts).await.unwrap();
        assert_eq!(names(&park), vec!["Central Park Courts", "Park Park Courts"]);

        let ranked = store
            .paginate_courts(&search("park cent"), &opts)
            .await
            .unwrap();
        assert_eq!(
            names(&ranked),
            vec![
                "Central Park Courts",
                "Central Library Courts",
                "Park Park Courts"
            ]
        );
    }

    #[tokio::test]
    async fn test_postgres_rejects_foreign_cursor_kinds() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        let keyset = CursorPosition::After { seq: 1 }.encode();
        let err = store
            .paginate_courts(&search("central"), &PaginationOpts::after(5, keyset))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor(_)));

        let offset = CursorPosition::Offset { skip: 5 }.encode();
        let err = store
            .paginate_courts(&CourtQuery::FullScan, &PaginationOpts::after(5, offset))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn test_postgres_check_constraints_reject_bad_literals() {
        let ctx = PostgresTestContext::new().await;

        let result = sqlx::query(
            r#"
            INSERT INTO courts (id, name, address_street, address_city, address_state, address_zip,
                                num_courts, court_type, cost, status,
                                last_verified_at, created_at, updated_at)
            VALUES ($1, 'Grass Courts', '1 Lawn St', 'Wimbledon', 'LDN', 'SW19', 6,
                    'grass', 'paid', 'approved', 0, 0, 0)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .execute(ctx.db.get_pool())
        .await;

        let err: StoreError = result.unwrap_err().into();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_postgres_users_round_trip() {
        let ctx = PostgresTestContext::new().await;
        let store = &ctx.db;

        let id = store
            .insert_user(CreateUser {
                email: "admin@example.com".to_string(),
                is_admin: Some(true),
            })
            .await
            .unwrap();
        let user = store.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.is_admin, Some(true));

        let court_id = store
            .insert_court(
                CreateCourt {
                    submitted_by: Some(id),
                    ..new_court("Submitted Courts")
                },
                1,
            )
            .await
            .unwrap();
        let court = store.get_court(court_id).await.unwrap().unwrap();
        assert_eq!(court.submitted_by, Some(id));
    }
}

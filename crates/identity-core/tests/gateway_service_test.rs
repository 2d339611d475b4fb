//! Gateway service tests against a mocked session repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use url::Url;
use uuid::Uuid;

use identity_core::domain::{NewSession, Session};
use identity_core::error::DomainError;
use identity_core::repositories::SessionRepository;
use identity_core::services::{GatewayService, LoginOutcome};
use identity_shared::{AuthorId, SessionId};

mock! {
    pub SessionRepo {}

    #[async_trait]
    impl SessionRepository for SessionRepo {
        async fn find_by_author_and_domain(
            &self,
            author_id: AuthorId,
            domain: &str,
        ) -> Result<Option<Session>, DomainError>;

        async fn upsert(&self, session: &NewSession) -> Result<Session, DomainError>;

        async fn update_token(
            &self,
            id: &SessionId,
            token: &str,
            expires_at: DateTime<Utc>,
        ) -> Result<Session, DomainError>;

        async fn delete_all_by_author(
            &self,
            author_id: AuthorId,
        ) -> Result<Vec<Session>, DomainError>;
    }
}

fn session(author_id: AuthorId, domain: &str, token: &str) -> Session {
    Session {
        id: Uuid::new_v4(),
        author_id,
        domain: domain.into(),
        token: token.into(),
        expires_at: Utc::now() + Duration::hours(24),
        created_at: Utc::now(),
    }
}

fn callback() -> Url {
    Url::parse("https://blog.example.com/admin").unwrap()
}

#[tokio::test]
async fn login_creates_session_when_none_exists() {
    let mut repo = MockSessionRepo::new();
    let expires_at = Utc::now() + Duration::hours(24);

    repo.expect_find_by_author_and_domain()
        .withf(|author_id, domain| *author_id == 7 && domain == "https://blog.example.com")
        .times(1)
        .returning(|_, _| Ok(None));
    repo.expect_upsert()
        .withf(|new| {
            new.author_id == 7
                && new.domain == "https://blog.example.com"
                && new.token == "cookie-token"
        })
        .times(1)
        .returning(|new| {
            Ok(Session {
                id: Uuid::new_v4(),
                author_id: new.author_id,
                domain: new.domain.clone(),
                token: new.token.clone(),
                expires_at: new.expires_at,
                created_at: Utc::now(),
            })
        });

    let service = GatewayService::new(Arc::new(repo));
    let outcome = service
        .login(7, expires_at, &callback(), "cookie-token")
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::Created(_)));
    assert_eq!(outcome.session().domain, "https://blog.example.com");
}

#[tokio::test]
async fn login_with_unchanged_token_writes_nothing() {
    let mut repo = MockSessionRepo::new();

    repo.expect_find_by_author_and_domain()
        .times(1)
        .returning(|_, _| Ok(Some(session(7, "https://blog.example.com", "cookie-token"))));
    // No upsert/update expectations: any write would panic the mock.

    let service = GatewayService::new(Arc::new(repo));
    let outcome = service
        .login(7, Utc::now() + Duration::hours(24), &callback(), "cookie-token")
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::Unchanged(_)));
}

#[tokio::test]
async fn login_with_changed_token_rotates_in_place() {
    let mut repo = MockSessionRepo::new();
    let existing = session(7, "https://blog.example.com", "old-token");
    let existing_id = existing.id;
    let expires_at = Utc::now() + Duration::hours(24);

    repo.expect_find_by_author_and_domain()
        .times(1)
        .returning(move |_, _| Ok(Some(existing.clone())));
    repo.expect_update_token()
        .withf(move |id, token, _| *id == existing_id && token == "new-token")
        .times(1)
        .returning(move |id, token, expires_at| {
            let mut updated = session(7, "https://blog.example.com", token);
            updated.id = *id;
            updated.expires_at = expires_at;
            Ok(updated)
        });

    let service = GatewayService::new(Arc::new(repo));
    let outcome = service
        .login(7, expires_at, &callback(), "new-token")
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::Refreshed(_)));
    assert_eq!(outcome.session().token, "new-token");
    assert_eq!(outcome.session().id, existing_id);
}

#[tokio::test]
async fn login_store_failure_propagates() {
    let mut repo = MockSessionRepo::new();
    repo.expect_find_by_author_and_domain()
        .times(1)
        .returning(|_, _| Err(DomainError::DatabaseError("connection reset".into())));

    let service = GatewayService::new(Arc::new(repo));
    let result = service
        .login(7, Utc::now(), &callback(), "cookie-token")
        .await;

    assert!(matches!(result, Err(DomainError::DatabaseError(_))));
}

#[tokio::test]
async fn logout_chains_one_leg_per_deleted_domain() {
    let mut repo = MockSessionRepo::new();
    repo.expect_delete_all_by_author()
        .withf(|author_id| *author_id == 7)
        .times(1)
        .returning(|_| {
            Ok(vec![
                session(7, "https://a.example.com", "t1"),
                session(7, "https://b.example.com", "t2"),
                session(7, "https://c.example.com", "t3"),
            ])
        });

    let service = GatewayService::new(Arc::new(repo));
    let chain = service.logout(7, &callback(), &[]).await.unwrap();

    // First leg is domain A's logout endpoint carrying the original callback.
    assert_eq!(chain.origin().ascii_serialization(), "https://a.example.com");
    assert_eq!(chain.path(), "/api/identity/logout");
    let origin_param = chain
        .query_pairs()
        .find(|(k, _)| k == "origin")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(origin_param, "https://blog.example.com/admin");

    // Remaining legs ride along as repeated `next=` parameters.
    let next_legs: Vec<String> = chain
        .query_pairs()
        .filter(|(k, _)| k == "next")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(next_legs.len(), 2);
    for (leg, host) in next_legs.iter().zip(["b.example.com", "c.example.com"]) {
        let leg = Url::parse(leg).unwrap();
        assert_eq!(leg.host_str(), Some(host));
        assert_eq!(leg.path(), "/api/identity/logout");
        assert!(leg
            .query_pairs()
            .any(|(k, v)| k == "origin" && v == "https://blog.example.com/admin"));
    }
}

#[tokio::test]
async fn logout_with_no_sessions_redirects_straight_back() {
    let mut repo = MockSessionRepo::new();
    repo.expect_delete_all_by_author()
        .times(1)
        .returning(|_| Ok(vec![]));

    let service = GatewayService::new(Arc::new(repo));
    let chain = service.logout(7, &callback(), &[]).await.unwrap();

    assert_eq!(chain, callback());
}

#[tokio::test]
async fn logout_chain_is_capped_but_deletes_everything() {
    let mut repo = MockSessionRepo::new();
    repo.expect_delete_all_by_author()
        .times(1)
        .returning(|_| {
            Ok((0..5)
                .map(|i| session(7, &format!("https://site{i}.example.com"), "t"))
                .collect())
        });

    let service = GatewayService::new(Arc::new(repo)).with_chain_cap(2);
    let chain = service.logout(7, &callback(), &[]).await.unwrap();

    let next_count = chain.query_pairs().filter(|(k, _)| k == "next").count();
    // Two legs total: the chain head plus one `next`.
    assert_eq!(next_count, 1);
    assert_eq!(chain.host_str(), Some("site0.example.com"));
}

#[tokio::test]
async fn logout_hop_forwards_carried_next_legs() {
    let mut repo = MockSessionRepo::new();
    repo.expect_delete_all_by_author()
        .times(1)
        .returning(|_| Ok(vec![]));

    let carried = vec![
        "https://b.example.com/api/identity/logout?origin=https%3A%2F%2Fblog.example.com%2Fadmin"
            .to_string(),
        "https://c.example.com/api/identity/logout?origin=https%3A%2F%2Fblog.example.com%2Fadmin"
            .to_string(),
    ];

    let service = GatewayService::new(Arc::new(repo));
    let chain = service.logout(7, &callback(), &carried).await.unwrap();

    assert_eq!(chain.host_str(), Some("b.example.com"));
    let next_legs: Vec<String> = chain
        .query_pairs()
        .filter(|(k, _)| k == "next")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(next_legs, vec![carried[1].clone()]);
}

#[tokio::test]
async fn logout_skips_unparseable_stored_domains() {
    let mut repo = MockSessionRepo::new();
    repo.expect_delete_all_by_author()
        .times(1)
        .returning(|_| {
            Ok(vec![
                session(7, "not a url", "t1"),
                session(7, "https://b.example.com", "t2"),
            ])
        });

    let service = GatewayService::new(Arc::new(repo));
    let chain = service.logout(7, &callback(), &[]).await.unwrap();

    assert_eq!(chain.host_str(), Some("b.example.com"));
    assert_eq!(chain.query_pairs().filter(|(k, _)| k == "next").count(), 0);
}

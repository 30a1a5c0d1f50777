//! Session gate
//!
//! Decides whether a customer browsing session may proceed and drives the
//! party-size prompt. The party-size gate is enforced both on entry (the
//! stored value is returned with the menu so the client can prompt) and at
//! submit time (an order without a party size on file is blocked).

use crate::db::repository::OrderRepository;
use crate::session::TokenService;
use crate::utils::{AppError, AppResult, now_millis};
use shared::{TableSession, TokenRejection};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Party size bounds: tables above 20 guests go through the staff
pub const MIN_PARTY_SIZE: i32 = 1;
pub const MAX_PARTY_SIZE: i32 = 20;

/// Customer session gate
#[derive(Clone)]
pub struct SessionGate {
    tokens: TokenService,
    orders: OrderRepository,
}

impl SessionGate {
    pub fn new(db: Surreal<Db>, tokens: TokenService) -> Self {
        Self {
            tokens,
            orders: OrderRepository::new(db),
        }
    }

    /// Validate the session a customer page claims
    ///
    /// A missing token is rejected immediately, without touching storage.
    pub async fn validate_entry(
        &self,
        restaurant_id: &str,
        table_id: &str,
        token: Option<&str>,
    ) -> AppResult<TableSession> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenInvalid(TokenRejection::Missing))?;
        self.tokens.validate(token, restaurant_id, table_id).await
    }

    /// Record the party size for a session
    ///
    /// Accepts integers in `[1, 20]`; the two out-of-range cases carry
    /// distinct messages. Valid values are persisted on the token row so a
    /// returning scan pre-fills them.
    pub async fn set_party_size(
        &self,
        session: &TableSession,
        candidate: i32,
    ) -> AppResult<i32> {
        if candidate < MIN_PARTY_SIZE {
            return Err(AppError::validation(
                "Enter a valid number of guests (minimum 1).",
            ));
        }
        if candidate > MAX_PARTY_SIZE {
            return Err(AppError::validation(
                "Please contact the staff for tables with more than 20 guests.",
            ));
        }
        self.tokens
            .set_guest_count(&session.token_id, candidate)
            .await?;
        Ok(candidate)
    }

    /// Resolve the party size for an order submission
    ///
    /// A candidate supplied with the order is validated and persisted;
    /// otherwise the value stored on the session is used. With neither, the
    /// submission is blocked and the client re-opens the prompt.
    pub async fn ensure_party_size(
        &self,
        session: &TableSession,
        candidate: Option<i32>,
    ) -> AppResult<i32> {
        match candidate {
            Some(value) => self.set_party_size(session, value).await,
            None => session.guest_count.filter(|n| *n > 0).ok_or_else(|| {
                AppError::validation(
                    "Please tell us how many guests are at the table before sending the order.",
                )
            }),
        }
    }

    /// Enforce the restaurant's order-cooldown window, when enabled
    pub async fn check_order_cooldown(
        &self,
        restaurant: &crate::db::models::Restaurant,
        restaurant_id: &str,
        table_id: &str,
    ) -> AppResult<()> {
        let Some(minutes) = restaurant.cooldown_minutes() else {
            return Ok(());
        };
        let Some(last) = self
            .orders
            .latest_order_millis_for_table(restaurant_id, table_id)
            .await?
        else {
            return Ok(());
        };

        let window = minutes * 60 * 1000;
        let elapsed = now_millis() - last;
        if elapsed < window {
            // `window - elapsed` is strictly positive here (guarded by
            // `elapsed < window`), so ceiling division is the stable
            // `(a + b - 1) / b`. Avoids the still-unstable signed
            // `int_roundings::div_ceil` (rust-lang/rust#88581).
            let remaining_minutes = (window - elapsed + 60 * 1000 - 1) / (60 * 1000);
            return Err(AppError::business_rule(format!(
                "Please wait {} more minute(s) before sending another order.",
                remaining_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{DiningTableCreate, RestaurantCreate};
    use crate::db::repository::{DiningTableRepository, RestaurantRepository};
    use crate::realtime::ChangeFeed;

    async fn setup() -> (SessionGate, TokenService, String, String) {
        let db = DbService::open_memory().await.unwrap();
        let restaurant = RestaurantRepository::new(db.db.clone())
            .create(RestaurantCreate {
                name: "Osteria Due".to_string(),
                address: None,
                phone: None,
            })
            .await
            .unwrap();
        let rid = restaurant.id.unwrap().to_string();
        let table = DiningTableRepository::new(db.db.clone())
            .create(&rid, DiningTableCreate {
                name: "T1".to_string(),
            })
            .await
            .unwrap();
        let tid = table.id.unwrap().to_string();
        let tokens = TokenService::new(db.db.clone(), ChangeFeed::new());
        let gate = SessionGate::new(db.db, tokens.clone());
        (gate, tokens, rid, tid)
    }

    #[tokio::test]
    async fn missing_token_is_rejected_without_lookup() {
        let (gate, _tokens, rid, tid) = setup().await;
        let err = gate.validate_entry(&rid, &tid, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::Missing)
        ));
        let err = gate.validate_entry(&rid, &tid, Some("")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::Missing)
        ));
    }

    #[tokio::test]
    async fn party_size_bounds_carry_distinct_messages() {
        let (gate, tokens, rid, tid) = setup().await;
        let issued = tokens.issue(&rid, &tid, "http://localhost").await.unwrap();
        let session = gate
            .validate_entry(&rid, &tid, Some(&issued.token))
            .await
            .unwrap();

        let too_small = gate.set_party_size(&session, 0).await.unwrap_err();
        assert!(too_small.to_string().contains("minimum 1"));

        let too_large = gate.set_party_size(&session, 21).await.unwrap_err();
        assert!(too_large.to_string().contains("more than 20"));

        assert_eq!(gate.set_party_size(&session, 3).await.unwrap(), 3);

        // The value sticks to the session and satisfies the submit gate
        let session = gate
            .validate_entry(&rid, &tid, Some(&issued.token))
            .await
            .unwrap();
        assert_eq!(session.guest_count, Some(3));
        assert_eq!(gate.ensure_party_size(&session, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn party_size_survives_a_rescan_but_not_a_table_close() {
        let (gate, tokens, rid, tid) = setup().await;
        let first = tokens.issue(&rid, &tid, "http://localhost").await.unwrap();
        let session = gate
            .validate_entry(&rid, &tid, Some(&first.token))
            .await
            .unwrap();
        gate.set_party_size(&session, 4).await.unwrap();

        // Re-scan during the same seating: the new token inherits the value
        let second = tokens.issue(&rid, &tid, "http://localhost").await.unwrap();
        let session = gate
            .validate_entry(&rid, &tid, Some(&second.token))
            .await
            .unwrap();
        assert_eq!(session.guest_count, Some(4));

        // Bill settled: every token revoked, the next seating starts clean
        tokens.revoke_all_for_table(&rid, &tid).await.unwrap();
        let third = tokens.issue(&rid, &tid, "http://localhost").await.unwrap();
        let session = gate
            .validate_entry(&rid, &tid, Some(&third.token))
            .await
            .unwrap();
        assert_eq!(session.guest_count, None);
    }

    #[tokio::test]
    async fn submission_without_party_size_is_blocked() {
        let (gate, tokens, rid, tid) = setup().await;
        let issued = tokens.issue(&rid, &tid, "http://localhost").await.unwrap();
        let session = gate
            .validate_entry(&rid, &tid, Some(&issued.token))
            .await
            .unwrap();

        let err = gate.ensure_party_size(&session, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Supplying it with the submission both validates and persists it
        assert_eq!(gate.ensure_party_size(&session, Some(2)).await.unwrap(), 2);
    }
}

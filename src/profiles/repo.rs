use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::profiles::repo_types::{Direction, Profile, SwipeDecision};
use crate::store::InteractionStore;

const PROFILE_COLUMNS: &str =
    "id, display_name, username, avatar_url, bio, date_of_birth, gender, location";

/// `InteractionStore` backed by the `profiles` and `swipes` tables.
#[derive(Clone)]
pub struct PgInteractionStore {
    db: PgPool,
}

impl PgInteractionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn direction_names(directions: &[Direction]) -> Vec<String> {
    directions.iter().map(|d| d.as_str().to_string()).collect()
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn list_profiles(
        &self,
        excluding: &HashSet<Uuid>,
        viewer: Uuid,
        limit: i64,
    ) -> Result<Vec<Profile>, StoreError> {
        let excluded: Vec<Uuid> = excluding.iter().copied().collect();
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
              FROM profiles
             WHERE id <> $1
               AND NOT (id = ANY($2))
             ORDER BY created_at DESC
             LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(viewer)
            .bind(excluded)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_decisions(&self, actor: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT target_user_id
              FROM swipes
             WHERE user_id = $1
            "#,
        )
        .bind(actor)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn record_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        direction: Direction,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO swipes (user_id, target_user_id, direction)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(actor)
        .bind(target)
        .bind(direction)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_reciprocal_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        directions: &[Direction],
    ) -> Result<Option<SwipeDecision>, StoreError> {
        let row = sqlx::query_as::<_, SwipeDecision>(
            r#"
            SELECT user_id, target_user_id, direction, created_at
              FROM swipes
             WHERE user_id = $1
               AND target_user_id = $2
               AND direction::text = ANY($3)
             ORDER BY created_at DESC
             LIMIT 1
            "#,
        )
        .bind(actor)
        .bind(target)
        .bind(direction_names(directions))
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_matches(&self, user: Uuid) -> Result<Vec<Profile>, StoreError> {
        let positive = direction_names(&Direction::POSITIVE);
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
              FROM profiles
             WHERE id IN (
                   SELECT mine.target_user_id
                     FROM swipes mine
                     JOIN swipes theirs
                       ON theirs.user_id = mine.target_user_id
                      AND theirs.target_user_id = mine.user_id
                    WHERE mine.user_id = $1
                      AND mine.direction::text = ANY($2)
                      AND theirs.direction::text = ANY($2)
             )
             ORDER BY display_name ASC
            "#
        );
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(user)
            .bind(positive)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_direction_names_match_enum_labels() {
        assert_eq!(direction_names(&Direction::POSITIVE), vec!["right", "super"]);
        assert!(direction_names(&[]).is_empty());
    }
}

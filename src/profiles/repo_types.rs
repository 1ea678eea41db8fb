use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// A discoverable user, read-only from this service's point of view.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Date,
    pub gender: Option<String>,
    pub location: Option<String>,
}

impl Profile {
    /// Completed years between `date_of_birth` and `today`.
    pub fn age_on(&self, today: Date) -> u32 {
        let mut years = today.year() - self.date_of_birth.year();
        let birthday_pending = (u8::from(today.month()), today.day())
            < (u8::from(self.date_of_birth.month()), self.date_of_birth.day());
        if birthday_pending {
            years -= 1;
        }
        years.max(0) as u32
    }
}

/// The viewer's verdict on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "swipe_direction", rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Super,
}

impl Direction {
    /// Directions that count as interest when checking for a match.
    pub const POSITIVE: [Direction; 2] = [Direction::Right, Direction::Super];

    pub fn is_positive(self) -> bool {
        Self::POSITIVE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Super => "super",
        }
    }
}

/// Row in `swipes`. Never updated or deleted.
#[derive(Debug, Clone, FromRow)]
pub struct SwipeDecision {
    #[sqlx(rename = "user_id")]
    pub actor: Uuid,
    #[sqlx(rename = "target_user_id")]
    pub target: Uuid,
    pub direction: Direction,
    pub created_at: OffsetDateTime,
}

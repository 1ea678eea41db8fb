use serde::Serialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::Profile;

/// Public view of a profile; the birth date is reduced to an age.
#[derive(Debug, Serialize)]
pub struct ProfileCard {
    pub id: Uuid,
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub age: u32,
    pub gender: Option<String>,
    pub location: Option<String>,
}

impl ProfileCard {
    pub fn from_profile(p: &Profile, today: Date) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name.clone(),
            username: p.username.clone(),
            avatar_url: p.avatar_url.clone(),
            bio: p.bio.clone(),
            age: p.age_on(today),
            gender: p.gender.clone(),
            location: p.location.clone(),
        }
    }
}

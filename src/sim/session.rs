/// The logged-in player: name, live profile, and where it is saved.
///
/// Loaded once per run; every mutating event calls `persist()`.

use tracing::info;

use crate::domain::achievements::{self, AchievementDef};
use crate::domain::profile::PlayerProfile;
use crate::error::GameError;
use crate::sim::save::ProfileStore;

pub struct PlayerSession {
    pub username: String,
    pub profile: PlayerProfile,
    store: ProfileStore,
}

impl PlayerSession {
    /// Load (or create) `username` and catch up on achievements whose
    /// predicates already hold, e.g. after new ones were added to the table.
    pub fn open(store: ProfileStore, username: &str) -> Result<(Self, Vec<&'static AchievementDef>), GameError> {
        let profile = store.get_or_create(username)?;
        let mut session = PlayerSession { username: username.to_string(), profile, store };
        let caught_up = achievements::evaluate(&mut session.profile);
        if !caught_up.is_empty() {
            session.persist()?;
        }
        info!(user = %session.username, points = session.profile.points, "session opened");
        Ok((session, caught_up))
    }

    pub fn persist(&self) -> Result<(), GameError> {
        self.store.save(&self.username, &self.profile)
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::save::tests::scratch_dir;

    pub(crate) fn session_in(tag: &str) -> PlayerSession {
        let store = ProfileStore::in_dir(&scratch_dir(tag));
        PlayerSession::open(store, "tester").unwrap().0
    }

    #[test]
    fn open_catches_up_missed_unlocks() {
        let dir = scratch_dir("session-catchup");
        std::fs::write(
            dir.join(crate::sim::save::PROFILE_FILE),
            r#"{ "lina": { "wins": 2, "points": 40 } }"#,
        )
        .unwrap();
        let (session, fresh) = PlayerSession::open(ProfileStore::in_dir(&dir), "lina").unwrap();
        assert_eq!(fresh.iter().map(|a| a.id).collect::<Vec<_>>(), vec!["first_win"]);

        let stored = session.store().load_all();
        assert!(stored["lina"].unlocked_achievements.contains("first_win"));

        let (_, again) = PlayerSession::open(ProfileStore::in_dir(&dir), "lina").unwrap();
        assert!(again.is_empty());
    }
}

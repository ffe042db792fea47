//! Fitness profiles, at most one per user

use chrono::Utc;
use fjall::Partition;
use fitrack_core::*;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{decode, storage_err, StorageEngine};

const PARTITION: &str = "profiles";

#[derive(Clone)]
pub struct ProfileStore {
    partition: Partition,
    engine: StorageEngine,
    write_lock: Arc<Mutex<()>>,
}

impl ProfileStore {
    pub(crate) fn new(engine: StorageEngine) -> Result<Self> {
        Ok(ProfileStore {
            partition: engine.partition(PARTITION)?,
            engine,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create the profile for `user_id`, failing if one already exists
    pub fn create(&self, user_id: &UserId, profile: NewProfile) -> Result<FitnessProfile> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let key = profile_key(user_id);
        if self.partition.get(&key).map_err(storage_err)?.is_some() {
            return Err(FitrackError::ProfileExists {
                user_id: user_id.to_string(),
            });
        }

        let profile = profile.into_profile(*user_id, Utc::now());
        self.write(&key, &profile)?;

        debug!(user_id = %user_id, "profile created");
        Ok(profile)
    }

    pub fn get(&self, user_id: &UserId) -> Result<Option<FitnessProfile>> {
        match self.partition.get(profile_key(user_id)).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update and return the stored result
    pub fn update(&self, user_id: &UserId, update: ProfileUpdate) -> Result<FitnessProfile> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut profile = self
            .get(user_id)?
            .ok_or_else(|| FitrackError::ProfileNotFound {
                user_id: user_id.to_string(),
            })?;
        profile.apply(update, Utc::now())?;
        self.write(&profile_key(user_id), &profile)?;

        debug!(user_id = %user_id, "profile updated");
        Ok(profile)
    }

    fn write(&self, key: &str, profile: &FitnessProfile) -> Result<()> {
        let json = serde_json::to_vec(profile)?;
        self.partition.insert(key, json).map_err(storage_err)?;
        self.engine.persist()
    }
}

fn profile_key(user_id: &UserId) -> String {
    format!("profile:{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (ProfileStore, tempfile::TempDir) {
        let (engine, temp) = StorageEngine::temp().unwrap();
        (ProfileStore::new(engine).unwrap(), temp)
    }

    fn draft() -> ProfileDraft {
        ProfileDraft {
            gender: Some("female".to_string()),
            date_of_birth: Some("1990-04-12".to_string()),
            height_cm: Some(168.0),
            weight_kg: Some(61.5),
            fitness_goal: Some("endurance".to_string()),
            activity_level: Some("moderate".to_string()),
            experience_level: Some("intermediate".to_string()),
            diet_type: Some("vegetarian".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_get() {
        let (profiles, _temp) = store();
        let user_id = UserId::new();

        let created = profiles.create(&user_id, draft().validate().unwrap()).unwrap();
        let loaded = profiles.get(&user_id).unwrap().unwrap();

        assert_eq!(created, loaded);
        assert_eq!(loaded.user_id, user_id);
        assert_eq!(loaded.diet_type.as_deref(), Some("vegetarian"));
    }

    #[test]
    fn test_second_create_rejected() {
        let (profiles, _temp) = store();
        let user_id = UserId::new();
        profiles.create(&user_id, draft().validate().unwrap()).unwrap();

        let again = profiles.create(&user_id, draft().validate().unwrap());
        assert!(matches!(again, Err(FitrackError::ProfileExists { .. })));
    }

    #[test]
    fn test_update_missing_profile() {
        let (profiles, _temp) = store();
        let result = profiles.update(&UserId::new(), ProfileUpdate::default());
        assert!(matches!(result, Err(FitrackError::ProfileNotFound { .. })));
    }

    #[test]
    fn test_update_is_partial_and_persisted() {
        let (profiles, _temp) = store();
        let user_id = UserId::new();
        let created = profiles.create(&user_id, draft().validate().unwrap()).unwrap();

        let update = ProfileUpdate {
            weight_kg: Some(59.0),
            diet_type: Some(None),
            ..Default::default()
        };
        let updated = profiles.update(&user_id, update).unwrap();

        assert_eq!(updated.weight_kg, 59.0);
        assert_eq!(updated.height_cm, created.height_cm);
        assert_eq!(updated.diet_type, None);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(profiles.get(&user_id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_rejected_update_leaves_profile_alone() {
        let (profiles, _temp) = store();
        let user_id = UserId::new();
        let created = profiles.create(&user_id, draft().validate().unwrap()).unwrap();

        let update = ProfileUpdate {
            gender: Some("male".to_string()),
            height_cm: Some(-3.0),
            ..Default::default()
        };
        assert!(profiles.update(&user_id, update).is_err());
        assert_eq!(profiles.get(&user_id).unwrap().unwrap(), created);
    }
}

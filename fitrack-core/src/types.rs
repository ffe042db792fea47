//! Core data types for fitrack

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{FitrackError, Result};

/// Unique user identifier, a ULID so ids sort by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(ulid::Ulid);

impl UserId {
    /// Generate a new user id with the current timestamp
    pub fn new() -> Self {
        UserId(ulid::Ulid::new())
    }

    /// Parse a user id from its canonical string form
    pub fn parse(s: &str) -> Result<Self> {
        ulid::Ulid::from_string(s)
            .map(UserId)
            .map_err(|e| FitrackError::InvalidUserId(format!("'{}': {}", s, e)))
    }

    /// Get the underlying ULID
    pub fn as_ulid(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized email address, the login handle of a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation; surrounding whitespace is trimmed
    /// and the address is lowercased
    pub fn new(raw: &str) -> Result<Self> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            return Err(FitrackError::InvalidEmail("empty address".to_string()));
        }

        if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(FitrackError::InvalidEmail(format!(
                "invalid characters in '{}'",
                email
            )));
        }

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Email(email))
            }
            _ => Err(FitrackError::InvalidEmail(format!(
                "'{}' is not of the form local@domain",
                email
            ))),
        }
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account. `credential` is the encoded salted hash produced by
/// [`crate::auth::CredentialHasher::hash`]; the plaintext password is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub credential: String,
    pub created_at: DateTime<Utc>,
}

/// Fitness profile, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessProfile {
    pub user_id: UserId,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub fitness_goal: String,
    pub activity_level: String,
    pub experience_level: String,
    pub medical_conditions: Option<String>,
    pub diet_type: Option<String>,
    pub preferred_workout_time: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a profile
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub fitness_goal: String,
    pub activity_level: String,
    pub experience_level: String,
    pub medical_conditions: Option<String>,
    pub diet_type: Option<String>,
    pub preferred_workout_time: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl NewProfile {
    /// Materialize the profile for `user_id` at time `now`
    pub fn into_profile(self, user_id: UserId, now: DateTime<Utc>) -> FitnessProfile {
        FitnessProfile {
            user_id,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            fitness_goal: self.fitness_goal,
            activity_level: self.activity_level,
            experience_level: self.experience_level,
            medical_conditions: self.medical_conditions,
            diet_type: self.diet_type,
            preferred_workout_time: self.preferred_workout_time,
            profile_picture_url: self.profile_picture_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw profile body as sent by clients; every field may be absent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub fitness_goal: Option<String>,
    pub activity_level: Option<String>,
    pub experience_level: Option<String>,
    pub medical_conditions: Option<String>,
    pub diet_type: Option<String>,
    pub preferred_workout_time: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl ProfileDraft {
    /// Names of required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let text = [
            ("gender", &self.gender),
            ("dateOfBirth", &self.date_of_birth),
            ("fitnessGoal", &self.fitness_goal),
            ("activityLevel", &self.activity_level),
            ("experienceLevel", &self.experience_level),
        ];
        for (name, value) in text {
            if non_blank(value.as_deref()).is_none() {
                missing.push(name);
            }
        }
        if self.height_cm.is_none() {
            missing.push("heightCm");
        }
        if self.weight_kg.is_none() {
            missing.push("weightKg");
        }
        missing
    }

    /// Validate the draft into a [`NewProfile`]
    pub fn validate(self) -> Result<NewProfile> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FitrackError::InvalidField(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let required = |name: &str, value: Option<String>| {
            non_blank(value.as_deref())
                .map(str::to_string)
                .ok_or_else(|| FitrackError::InvalidField(name.to_string()))
        };

        Ok(NewProfile {
            gender: required("gender", self.gender)?,
            date_of_birth: parse_date_of_birth(
                self.date_of_birth.as_deref().unwrap_or_default(),
            )?,
            height_cm: positive("heightCm", self.height_cm.unwrap_or_default())?,
            weight_kg: positive("weightKg", self.weight_kg.unwrap_or_default())?,
            fitness_goal: required("fitnessGoal", self.fitness_goal)?,
            activity_level: required("activityLevel", self.activity_level)?,
            experience_level: required("experienceLevel", self.experience_level)?,
            medical_conditions: self.medical_conditions.filter(|s| !s.is_empty()),
            diet_type: self.diet_type.filter(|s| !s.is_empty()),
            preferred_workout_time: self.preferred_workout_time.filter(|s| !s.is_empty()),
            profile_picture_url: self.profile_picture_url.filter(|s| !s.is_empty()),
        })
    }
}

/// Partial profile update.
///
/// Required-class fields are applied only when present and non-empty. Optional
/// fields distinguish "absent" (`None`, left alone) from an explicit JSON `null`
/// (`Some(None)`, cleared).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub fitness_goal: Option<String>,
    pub activity_level: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub medical_conditions: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub diet_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub preferred_workout_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub profile_picture_url: Option<Option<String>>,
}

impl FitnessProfile {
    /// Apply a partial update, stamping `updated_at` with `now`.
    ///
    /// Validation happens before any field is touched, so a rejected update
    /// leaves the profile unchanged.
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) -> Result<()> {
        let date_of_birth = match non_blank(update.date_of_birth.as_deref()) {
            Some(raw) => Some(parse_date_of_birth(raw)?),
            None => None,
        };
        let height_cm = update
            .height_cm
            .map(|v| positive("heightCm", v))
            .transpose()?;
        let weight_kg = update
            .weight_kg
            .map(|v| positive("weightKg", v))
            .transpose()?;

        let assign = |slot: &mut String, value: Option<String>| {
            if let Some(v) = non_blank(value.as_deref()) {
                *slot = v.to_string();
            }
        };
        assign(&mut self.gender, update.gender);
        assign(&mut self.fitness_goal, update.fitness_goal);
        assign(&mut self.activity_level, update.activity_level);
        assign(&mut self.experience_level, update.experience_level);

        if let Some(v) = date_of_birth {
            self.date_of_birth = v;
        }
        if let Some(v) = height_cm {
            self.height_cm = v;
        }
        if let Some(v) = weight_kg {
            self.weight_kg = v;
        }

        if let Some(v) = update.medical_conditions {
            self.medical_conditions = v;
        }
        if let Some(v) = update.diet_type {
            self.diet_type = v;
        }
        if let Some(v) = update.preferred_workout_time {
            self.preferred_workout_time = v;
        }
        if let Some(v) = update.profile_picture_url {
            self.profile_picture_url = v;
        }

        self.updated_at = now;
        Ok(())
    }
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FitrackError::InvalidField(format!(
            "{} must be a positive number",
            name
        )))
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
fn parse_date_of_birth(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| FitrackError::InvalidField(format!("dateOfBirth '{}' is not a date", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> ProfileDraft {
        ProfileDraft {
            gender: Some("female".to_string()),
            date_of_birth: Some("1990-04-12".to_string()),
            height_cm: Some(170.0),
            weight_kg: Some(62.5),
            fitness_goal: Some("build strength".to_string()),
            activity_level: Some("moderate".to_string()),
            experience_level: Some("beginner".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_validates() {
        let profile = complete_draft().validate().unwrap();
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
        assert_eq!(profile.diet_type, None);
    }

    #[test]
    fn test_draft_reports_missing_fields() {
        let draft = ProfileDraft {
            gender: Some("   ".to_string()),
            weight_kg: None,
            ..complete_draft()
        };
        assert_eq!(draft.missing_fields(), vec!["gender", "weightKg"]);
        assert!(matches!(draft.validate(), Err(FitrackError::InvalidField(_))));
    }

    #[test]
    fn test_draft_rejects_bad_values() {
        let bad_date = ProfileDraft {
            date_of_birth: Some("twelfth of april".to_string()),
            ..complete_draft()
        };
        assert!(bad_date.validate().is_err());

        let bad_height = ProfileDraft {
            height_cm: Some(-3.0),
            ..complete_draft()
        };
        assert!(bad_height.validate().is_err());

        let rfc3339 = ProfileDraft {
            date_of_birth: Some("1990-04-12T00:00:00Z".to_string()),
            ..complete_draft()
        };
        assert!(rfc3339.validate().is_ok());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let now = Utc::now();
        let mut profile = complete_draft()
            .validate()
            .unwrap()
            .into_profile(UserId::new(), now);
        profile.diet_type = Some("vegan".to_string());
        profile.medical_conditions = Some("asthma".to_string());

        let update: ProfileUpdate = serde_json::from_str(
            r#"{"weightKg": 60.0, "gender": "", "dietType": null}"#,
        )
        .unwrap();
        profile.apply(update, now).unwrap();

        assert_eq!(profile.weight_kg, 60.0);
        assert_eq!(profile.gender, "female");
        assert_eq!(profile.diet_type, None);
        assert_eq!(profile.medical_conditions.as_deref(), Some("asthma"));
    }

    #[test]
    fn test_rejected_update_leaves_profile_untouched() {
        let now = Utc::now();
        let mut profile = complete_draft()
            .validate()
            .unwrap()
            .into_profile(UserId::new(), now);
        let before = profile.clone();

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"gender": "male", "heightCm": 0}"#).unwrap();
        assert!(profile.apply(update, now).is_err());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = complete_draft()
            .validate()
            .unwrap()
            .into_profile(UserId::new(), Utc::now());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["dateOfBirth"], "1990-04-12");
        assert_eq!(json["heightCm"], 170.0);
        assert!(json.get("userId").is_some());
    }
}

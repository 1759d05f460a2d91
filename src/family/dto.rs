use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    Allergy, DietaryRestriction, Family, FamilyMember, FamilyPreferences, HealthCondition,
    MemberPreferences, NewFamily,
};

pub const MAX_MEMBERS: usize = 8;
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 100;

/// One member as entered during onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub health_conditions: Vec<HealthCondition>,
    pub preferences: MemberPreferences,
}

/// Body of `POST /family` and `PUT /family`.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyRequest {
    pub name: String,
    pub members: Vec<MemberInput>,
    pub preferences: FamilyPreferences,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FamilyValidationError {
    #[error("family name is required")]
    MissingName,
    #[error("a family needs between 1 and 8 members, got {0}")]
    MemberCount(usize),
    #[error("member {index} needs a name")]
    MissingMemberName { index: usize },
    #[error("member {index} age must be between 1 and 100, got {age}")]
    Age { index: usize, age: i64 },
}

impl FamilyRequest {
    fn validated_members(self) -> Result<(String, Vec<FamilyMember>, FamilyPreferences), FamilyValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(FamilyValidationError::MissingName);
        }
        if self.members.is_empty() || self.members.len() > MAX_MEMBERS {
            return Err(FamilyValidationError::MemberCount(self.members.len()));
        }

        let mut members = Vec::with_capacity(self.members.len());
        for (index, m) in self.members.into_iter().enumerate() {
            let member_name = m.name.trim().to_string();
            if member_name.is_empty() {
                return Err(FamilyValidationError::MissingMemberName { index });
            }
            if !(MIN_AGE..=MAX_AGE).contains(&m.age) {
                return Err(FamilyValidationError::Age { index, age: m.age });
            }
            members.push(FamilyMember {
                id: m.id.unwrap_or_else(Uuid::new_v4),
                name: member_name,
                age: m.age as u8,
                dietary_restrictions: m.dietary_restrictions,
                allergies: m.allergies,
                health_conditions: m.health_conditions,
                preferences: m.preferences,
            });
        }
        Ok((name, members, self.preferences))
    }

    pub fn into_new_family(self) -> Result<NewFamily, FamilyValidationError> {
        let (name, members, preferences) = self.validated_members()?;
        Ok(NewFamily {
            name,
            members,
            preferences,
        })
    }

    /// Applies the request on top of an existing family, keeping its id
    /// and creation time.
    pub fn apply_to(self, existing: &Family) -> Result<Family, FamilyValidationError> {
        let (name, members, preferences) = self.validated_members()?;
        Ok(Family {
            id: existing.id,
            name,
            members,
            preferences,
            created_at: existing.created_at,
            updated_at: time::OffsetDateTime::now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(members: serde_json::Value) -> FamilyRequest {
        serde_json::from_value(json!({
            "name": "  The Wongs ",
            "members": members,
            "preferences": {
                "cooking_skill_level": "beginner",
                "budget_range": "low"
            }
        }))
        .unwrap()
    }

    fn member(name: &str, age: i64) -> serde_json::Value {
        json!({
            "name": name,
            "age": age,
            "allergies": ["eggs"],
            "preferences": { "spice_level": "mild", "favorite_cuisines": ["thai"] }
        })
    }

    #[test]
    fn valid_request_gets_member_ids_and_defaults() {
        let family = request(json!([member("Ka Ming", 40), member("Mei", 9)]))
            .into_new_family()
            .unwrap();
        assert_eq!(family.name, "The Wongs");
        assert_eq!(family.members.len(), 2);
        assert_ne!(family.members[0].id, family.members[1].id);
        assert_eq!(family.preferences.meal_times.dinner, "19:00");
        assert_eq!(family.members[1].allergies, vec![Allergy::Eggs]);
    }

    #[test]
    fn member_count_bounds() {
        let err = request(json!([])).into_new_family().unwrap_err();
        assert_eq!(err, FamilyValidationError::MemberCount(0));

        let nine: Vec<_> = (0..9).map(|i| member(&format!("m{}", i), 30)).collect();
        let err = request(json!(nine)).into_new_family().unwrap_err();
        assert_eq!(err, FamilyValidationError::MemberCount(9));

        let eight: Vec<_> = (0..8).map(|i| member(&format!("m{}", i), 30)).collect();
        assert!(request(json!(eight)).into_new_family().is_ok());
    }

    #[test]
    fn age_bounds() {
        for bad in [0, 101, -3] {
            let err = request(json!([member("X", bad)])).into_new_family().unwrap_err();
            assert_eq!(err, FamilyValidationError::Age { index: 0, age: bad });
        }
        assert!(request(json!([member("Baby", 1)])).into_new_family().is_ok());
        assert!(request(json!([member("Elder", 100)])).into_new_family().is_ok());
    }

    #[test]
    fn blank_names_rejected() {
        let mut req = request(json!([member("A", 20)]));
        req.name = "   ".into();
        assert_eq!(req.into_new_family().unwrap_err(), FamilyValidationError::MissingName);

        let err = request(json!([member("A", 20), member(" ", 20)]))
            .into_new_family()
            .unwrap_err();
        assert_eq!(err, FamilyValidationError::MissingMemberName { index: 1 });
    }
}

//! Profile records, request filters, and an in-memory record store.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PlannerError, Result};
use crate::traits::ProfileStore;

pub type ProfileId = i64;

/// A geolocated record as supplied by the record store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: ProfileId,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub nbhood: Option<String>,
    pub score_vote: Option<i32>,
    pub preferred_language: Option<String>,
    pub origin: Option<String>,
    pub political_lean: Option<String>,
    pub personality: Option<String>,
    pub political_scale: Option<String>,
    pub ideal_process: Option<String>,
    pub strategic_profile: Option<String>,
    pub suggested_arguments: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Profile {
    pub fn new(id: ProfileId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lon);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// (lat, lon) when both coordinates are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Marker attributes of a found record. Empty fields stay `null`.
    pub fn stop_attributes(&self) -> StopAttributes {
        StopAttributes {
            name: text_or_null(&self.name),
            arguments: text_or_null(&self.suggested_arguments),
            age: self.age.map_or(Value::Null, Value::from),
            nbhood: text_or_null(&self.nbhood),
            preferred_language: text_or_null(&self.preferred_language),
            origin: text_or_null(&self.origin),
            political_scale: text_or_null(&self.political_scale),
            ideal_process: text_or_null(&self.ideal_process),
            strategic_profile: text_or_null(&self.strategic_profile),
            personality: text_or_null(&self.personality),
        }
    }
}

const UNKNOWN_NAME: &str = "Unknown";
const NONE_TEXT: &str = "None";

fn none_value() -> Value {
    Value::String(NONE_TEXT.to_string())
}

fn text_or_null(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::String)
}

/// Display attributes attached to a map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopAttributes {
    pub name: Value,
    pub arguments: Value,
    pub age: Value,
    pub nbhood: Value,
    pub preferred_language: Value,
    pub origin: Value,
    pub political_scale: Value,
    pub ideal_process: Value,
    pub strategic_profile: Value,
    pub personality: Value,
}

impl StopAttributes {
    /// Placeholder for a stop whose record could not be found.
    pub fn unknown() -> Self {
        Self {
            name: Value::String(UNKNOWN_NAME.to_string()),
            arguments: none_value(),
            age: none_value(),
            nbhood: none_value(),
            preferred_language: none_value(),
            origin: none_value(),
            political_scale: none_value(),
            ideal_process: none_value(),
            strategic_profile: none_value(),
            personality: none_value(),
        }
    }
}

/// Filter keys accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Origin,
    PoliticalLean,
    Nbhood,
    PreferredLanguage,
    MinScoreVote,
    MaxScoreVote,
    Name,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Origin,
        FilterField::PoliticalLean,
        FilterField::Nbhood,
        FilterField::PreferredLanguage,
        FilterField::MinScoreVote,
        FilterField::MaxScoreVote,
        FilterField::Name,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FilterField::Origin => "origin",
            FilterField::PoliticalLean => "political_lean",
            FilterField::Nbhood => "nbhood",
            FilterField::PreferredLanguage => "preferred_language",
            FilterField::MinScoreVote => "min_score_vote",
            FilterField::MaxScoreVote => "max_score_vote",
            FilterField::Name => "name",
        }
    }

    fn text(self, profile: &Profile) -> Option<&str> {
        match self {
            FilterField::Origin => profile.origin.as_deref(),
            FilterField::PoliticalLean => profile.political_lean.as_deref(),
            FilterField::Nbhood => profile.nbhood.as_deref(),
            FilterField::PreferredLanguage => profile.preferred_language.as_deref(),
            FilterField::Name => profile.name.as_deref(),
            FilterField::MinScoreVote | FilterField::MaxScoreVote => None,
        }
    }
}

impl FromStr for FilterField {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            // legacy request keys
            "ethnicity" => Ok(FilterField::Origin),
            "political_alignment" => Ok(FilterField::PoliticalLean),
            _ => FilterField::ALL
                .into_iter()
                .find(|field| field.key() == s)
                .ok_or_else(|| PlannerError::UnknownFilter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals(FilterField, String),
    ScoreAtLeast(i32),
    ScoreAtMost(i32),
    Contains(FilterField, String),
}

impl Predicate {
    fn matches(&self, profile: &Profile) -> bool {
        match self {
            Predicate::Equals(field, expected) => field.text(profile) == Some(expected.as_str()),
            Predicate::ScoreAtLeast(min) => profile.score_vote.is_some_and(|score| score >= *min),
            Predicate::ScoreAtMost(max) => profile.score_vote.is_some_and(|score| score <= *max),
            Predicate::Contains(field, needle) => field
                .text(profile)
                .is_some_and(|text| text.to_lowercase().contains(needle)),
        }
    }
}

/// A conjunction of validated predicates over profiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFilter {
    predicates: Vec<Predicate>,
}

impl ProfileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate for `field`. Null and empty-string values add nothing.
    pub fn with(mut self, field: FilterField, value: &Value) -> Result<Self> {
        if value.is_null() || value.as_str().is_some_and(|s| s.trim().is_empty()) {
            return Ok(self);
        }

        let predicate = match field {
            FilterField::Origin
            | FilterField::PoliticalLean
            | FilterField::Nbhood
            | FilterField::PreferredLanguage => Predicate::Equals(field, expect_text(field, value)?),
            FilterField::Name => Predicate::Contains(field, expect_text(field, value)?.to_lowercase()),
            FilterField::MinScoreVote => Predicate::ScoreAtLeast(expect_int(field, value)?),
            FilterField::MaxScoreVote => Predicate::ScoreAtMost(expect_int(field, value)?),
        };
        self.predicates.push(predicate);
        Ok(self)
    }

    /// Builds a filter from a JSON object of `key: value` pairs.
    pub fn from_json(filters: &Map<String, Value>) -> Result<Self> {
        filters.iter().try_fold(Self::new(), |filter, (key, value)| {
            filter.with(key.parse()?, value)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(profile))
    }
}

fn expect_text(field: FilterField, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(PlannerError::invalid_filter_value(
            field.key(),
            format!("expected a string, got {other}"),
        )),
    }
}

fn expect_int(field: FilterField, value: &Value) -> Result<i32> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| PlannerError::invalid_filter_value(field.key(), format!("expected an integer, got {value}")))
}

/// Record store backed by a vector, kept sorted by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Vec<Profile>,
}

impl InMemoryProfileStore {
    pub fn new(mut profiles: Vec<Profile>) -> Self {
        profiles.sort_by_key(|profile| profile.id);
        Self { profiles }
    }

    /// Loads a JSON array of profiles.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let profiles: Vec<Profile> = serde_json::from_str(&contents)?;
        Ok(Self::new(profiles))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn query(&self, filter: &ProfileFilter) -> Result<Vec<Profile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|profile| filter.matches(profile))
            .cloned()
            .collect())
    }

    fn profiles_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>> {
        let wanted: HashSet<ProfileId> = ids.iter().copied().collect();
        Ok(self
            .profiles
            .iter()
            .filter(|profile| wanted.contains(&profile.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_profiles() -> Vec<Profile> {
        let mut a = Profile::new(3).named("Marie Tremblay").at(45.48, -73.63);
        a.origin = Some("Canadienne".to_string());
        a.score_vote = Some(7);
        a.nbhood = Some("Loyola".to_string());

        let mut b = Profile::new(1).named("Jean Roy").at(45.49, -73.64);
        b.origin = Some("Française".to_string());
        b.score_vote = Some(4);

        let mut c = Profile::new(2).named("Ana Silva");
        c.origin = Some("Canadienne".to_string());
        c.score_vote = Some(9);

        vec![a, b, c]
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let filters = json!({ "favorite_color": "blue" });
        let err = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, PlannerError::UnknownFilter(ref key) if key == "favorite_color"));
    }

    #[test]
    fn test_wrong_value_type_is_rejected() {
        let filters = json!({ "min_score_vote": "high" });
        let err = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidFilterValue { .. }));

        let filters = json!({ "origin": 12 });
        assert!(ProfileFilter::from_json(filters.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_null_and_empty_values_are_ignored() {
        let filters = json!({ "origin": null, "nbhood": "", "min_score_vote": null });
        let filter = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_equality_and_range() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let filters = json!({ "origin": "Canadienne", "min_score_vote": 8 });
        let filter = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap();
        let ids: Vec<_> = store.query(&filter).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_legacy_keys_map_to_fields() {
        assert_eq!("ethnicity".parse::<FilterField>().unwrap(), FilterField::Origin);
        assert_eq!("political_alignment".parse::<FilterField>().unwrap(), FilterField::PoliticalLean);
    }

    #[test]
    fn test_fuzzy_name() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let filters = json!({ "name": "TREMB" });
        let filter = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap();
        let ids: Vec<_> = store.query(&filter).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_scores_accept_numeric_strings() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let filters = json!({ "min_score_vote": "4", "max_score_vote": 7 });
        let filter = ProfileFilter::from_json(filters.as_object().unwrap()).unwrap();
        let ids: Vec<_> = store.query(&filter).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let filter = ProfileFilter::new().with(FilterField::Origin, &json!("Suisse")).unwrap();
        assert!(store.query(&filter).unwrap().is_empty());
    }

    #[test]
    fn test_store_sorted_by_id() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let ids: Vec<_> = store.query(&ProfileFilter::new()).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_profiles_by_ids() {
        let store = InMemoryProfileStore::new(sample_profiles());
        let found: Vec<_> = store.profiles_by_ids(&[3, 99]).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(found, vec![3]);
    }

    #[test]
    fn test_found_record_keeps_empty_fields_null() {
        let mut profile = Profile::new(5);
        profile.age = Some(41);
        let attributes = profile.stop_attributes();
        assert_eq!(attributes.name, Value::Null);
        assert_eq!(attributes.age, json!(41));
        assert_eq!(attributes.origin, Value::Null);
    }

    #[test]
    fn test_missing_record_placeholder() {
        let attributes = StopAttributes::unknown();
        assert_eq!(attributes.name, json!("Unknown"));
        assert_eq!(attributes.arguments, json!("None"));
        assert_eq!(attributes.age, json!("None"));
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let profile: Profile = serde_json::from_str(r#"{"id": 7, "latitude": 45.5}"#).unwrap();
        assert_eq!(profile.id, 7);
        assert_eq!(profile.coordinates(), None);
    }
}

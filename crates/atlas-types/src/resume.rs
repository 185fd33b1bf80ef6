//! Resume models. Keyed by a generated UUID; created once, never edited.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::key::{Partition, SortKey};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub company: String,
    pub role: String,
    pub started: String,
    pub ended: String,
    pub logo_url: String,
}

impl Entity for Job {
    const PARTITION: Partition = Partition::JOB;
    const NAME: &'static str = "Job";
    const KEY_FIELDS: &'static [&'static str] = &["id"];

    fn sort_key(&self) -> SortKey {
        SortKey::new(&self.id)
    }

    fn label(&self) -> String {
        format!("{} at {}", self.role, self.company)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub school: String,
    pub level: String,
    pub year: String,
    pub major: String,
    pub gpa: Decimal,
    pub logo_url: String,
}

impl Entity for Education {
    const PARTITION: Partition = Partition::EDUCATION;
    const NAME: &'static str = "Education";
    const KEY_FIELDS: &'static [&'static str] = &["id"];

    fn sort_key(&self) -> SortKey {
        SortKey::new(&self.id)
    }

    fn label(&self) -> String {
        format!("{} {}, {}", self.level, self.major, self.school)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub logo_url: String,
}

impl Entity for Skill {
    const PARTITION: Partition = Partition::SKILL;
    const NAME: &'static str = "Skill";
    const KEY_FIELDS: &'static [&'static str] = &["id"];

    fn sort_key(&self) -> SortKey {
        SortKey::new(&self.id)
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// The resume record kinds, with the fields each one is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeKind {
    Job,
    Education,
    Skill,
}

impl ResumeKind {
    /// Field to hold the generated id.
    pub const ID_FIELD: &'static str = "id";

    /// Field that holds the uploaded logo's URL.
    pub const LOGO_FIELD: &'static str = "logoUrl";

    pub fn partition(self) -> Partition {
        match self {
            Self::Job => Job::PARTITION,
            Self::Education => Education::PARTITION,
            Self::Skill => Skill::PARTITION,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Job => Job::NAME,
            Self::Education => Education::NAME,
            Self::Skill => Skill::NAME,
        }
    }

    /// Serialized field names in prompt order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Job => &["id", "company", "role", "started", "ended", "logoUrl"],
            Self::Education => &["id", "school", "level", "year", "major", "gpa", "logoUrl"],
            Self::Skill => &["id", "name", "logoUrl"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lists_match_serialized_shape() {
        let job = Job {
            id: "1".into(),
            company: "Acme".into(),
            role: "Engineer".into(),
            started: "2019".into(),
            ended: "2021".into(),
            logo_url: "u".into(),
        };
        let json = serde_json::to_value(&job).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), ResumeKind::Job.fields().len());
        for field in ResumeKind::Job.fields() {
            assert!(obj.contains_key(*field), "missing {field}");
        }
    }

    #[test]
    fn education_gpa_accepts_string_decimal() {
        let json = serde_json::json!({
            "id": "e1",
            "school": "State",
            "level": "BSc",
            "year": "2015",
            "major": "Physics",
            "gpa": "3.70",
            "logoUrl": "u",
        });
        let edu: Education = serde_json::from_value(json).unwrap();
        assert_eq!(edu.gpa.to_string(), "3.70");
        assert_eq!(edu.sort_key().as_str(), "e1");
    }

    #[test]
    fn kinds_map_to_resume_partitions() {
        assert_eq!(ResumeKind::Job.partition().key(), "RESUME#JOB");
        assert_eq!(ResumeKind::Education.partition().key(), "RESUME#EDUCATION");
        assert_eq!(ResumeKind::Skill.partition().key(), "RESUME#SKILL");
        assert_eq!(ResumeKind::Skill.fields(), &["id", "name", "logoUrl"]);
    }
}

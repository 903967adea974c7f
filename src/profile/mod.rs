//! Profile aggregate.
//!
//! A profile belongs to exactly one user and owns two ordered
//! sub-collections, `experience` and `education`. Entries are kept newest
//! first.
mod repository;
mod service;

pub use repository::ProfileRepository;
pub use service::ProfileService;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::{UserId, UserSummary};

/// Links to the fixed set of supported social platforms.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl Social {
    /// Overwrite links present in `other`, keep the rest.
    pub fn merge(&mut self, other: Social) {
        let Social {
            youtube,
            twitter,
            facebook,
            linkedin,
            instagram,
        } = other;

        self.youtube = youtube.or(self.youtube.take());
        self.twitter = twitter.or(self.twitter.take());
        self.facebook = facebook.or(self.facebook.take());
        self.linkedin = linkedin.or(self.linkedin.take());
        self.instagram = instagram.or(self.instagram.take());
    }
}

/// Work experience entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Education entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Experience entry as submitted, before an identifier is minted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl NewExperience {
    /// Mint an identifier for this entry.
    pub fn mint(self) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: self.title,
            company: self.company,
            location: self.location,
            from: self.from,
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}

/// Education entry as submitted, before an identifier is minted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl NewEducation {
    /// Mint an identifier for this entry.
    pub fn mint(self) -> Education {
        Education {
            id: Uuid::new_v4(),
            school: self.school,
            degree: self.degree,
            field_of_study: self.field_of_study,
            from: self.from,
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}

/// Record of an ordered sub-collection.
pub trait Entry {
    /// Identifier minted when the entry was inserted.
    fn id(&self) -> Uuid;
}

impl Entry for Experience {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entry for Education {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Insert `entry` at the head of `entries`.
fn push_front<T: Entry>(entries: &mut Vec<T>, entry: T) {
    entries.insert(0, entry);
}

/// Remove the entry whose identifier equals `id`, keeping the order of the
/// others. Unknown identifiers leave `entries` untouched.
fn remove_by_id<T: Entry>(entries: &mut Vec<T>, id: Uuid) -> Option<T> {
    let index = entries.iter().position(|entry| entry.id() == id)?;
    Some(entries.remove(index))
}

/// Fields supplied on profile creation or update.
///
/// `None` means "not supplied": the stored value is kept on update.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
}

/// Split a comma-separated list and trim every element.
///
/// Elements that are blank once trimmed are dropped.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Stored profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(skip)]
    pub user: UserId,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new [`Profile`] owned by `user`.
    pub fn new(user: UserId, fields: ProfileFields) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user,
            company: fields.company,
            website: fields.website,
            location: fields.location,
            bio: fields.bio,
            status: fields.status,
            github_username: fields.github_username,
            skills: fields.skills,
            social: fields.social,
            experience: Vec::new(),
            education: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge supplied fields into the profile.
    pub fn merge(&mut self, fields: ProfileFields) {
        let ProfileFields {
            company,
            website,
            location,
            bio,
            status,
            github_username,
            skills,
            social,
        } = fields;

        self.company = company.or(self.company.take());
        self.website = website.or(self.website.take());
        self.location = location.or(self.location.take());
        self.bio = bio.or(self.bio.take());
        self.github_username = github_username.or(self.github_username.take());
        self.status = status;
        self.skills = skills;
        self.social.merge(social);
        self.updated_at = Utc::now();
    }

    /// Add an experience entry at the head of the list.
    pub fn add_experience(&mut self, entry: Experience) {
        push_front(&mut self.experience, entry);
        self.updated_at = Utc::now();
    }

    /// Remove an experience entry. Returns `false` if `id` is unknown.
    pub fn remove_experience(&mut self, id: Uuid) -> bool {
        let removed = remove_by_id(&mut self.experience, id).is_some();
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Add an education entry at the head of the list.
    pub fn add_education(&mut self, entry: Education) {
        push_front(&mut self.education, entry);
        self.updated_at = Utc::now();
    }

    /// Remove an education entry. Returns `false` if `id` is unknown.
    pub fn remove_education(&mut self, id: Uuid) -> bool {
        let removed = remove_by_id(&mut self.education, id).is_some();
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

/// Profile joined with its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(title: &str) -> Experience {
        NewExperience {
            title: title.into(),
            company: "Acme".into(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        }
        .mint()
    }

    fn profile() -> Profile {
        Profile::new(
            UserId::parse("alice").unwrap(),
            ProfileFields {
                status: "Developer".into(),
                skills: vec!["rust".into()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_parse_skills() {
        assert_eq!(parse_skills("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_skills("  rust  "), vec!["rust"]);
        assert_eq!(parse_skills("go,, ,sql"), vec!["go", "sql"]);
        assert!(parse_skills(" , ").is_empty());
        assert_eq!(parse_skills(&parse_skills("a, b").join(",")), vec!["a", "b"]);
    }

    #[test]
    fn test_add_experience_at_head() {
        let mut profile = profile();
        let first = experience("first");
        let second = experience("second");

        profile.add_experience(first.clone());
        profile.add_experience(second.clone());

        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0], second);
        assert_eq!(profile.experience[1], first);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut profile = profile();
        profile.add_experience(experience("a"));
        profile.add_experience(experience("b"));
        let before = profile.experience.clone();

        assert!(!profile.remove_experience(Uuid::new_v4()));
        assert_eq!(profile.experience, before);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut profile = profile();
        let (a, b, c) = (experience("a"), experience("b"), experience("c"));
        profile.add_experience(a.clone());
        profile.add_experience(b.clone());
        profile.add_experience(c.clone());

        assert!(profile.remove_experience(b.id));
        assert_eq!(profile.experience, vec![c, a]);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut profile = profile();
        profile.merge(ProfileFields {
            company: Some("Acme".into()),
            bio: Some("hello".into()),
            status: "Developer".into(),
            skills: vec!["rust".into()],
            social: Social {
                twitter: Some("https://twitter.com/alice".into()),
                ..Default::default()
            },
            ..Default::default()
        });
        profile.merge(ProfileFields {
            company: Some("Initech".into()),
            status: "Senior developer".into(),
            skills: vec!["rust".into(), "sql".into()],
            social: Social {
                youtube: Some("https://youtube.com/alice".into()),
                ..Default::default()
            },
            ..Default::default()
        });

        assert_eq!(profile.company.as_deref(), Some("Initech"));
        assert_eq!(profile.bio.as_deref(), Some("hello"));
        assert_eq!(profile.status, "Senior developer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        assert!(profile.social.twitter.is_some());
        assert!(profile.social.youtube.is_some());
    }

    #[test]
    fn test_view_flattens_owner() {
        let profile = profile();
        let view = ProfileView {
            user: UserSummary::detached(profile.user.clone()),
            profile,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"]["id"], "alice");
        assert_eq!(json["status"], "Developer");
        assert!(json["experience"].as_array().unwrap().is_empty());
    }
}

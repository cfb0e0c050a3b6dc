//! Profile entities — read-only inputs owned by the persistence collaborator.
//!
//! The pipeline never mutates these in place; every transformation produces
//! new copies. No stage may introduce a highlight, project, technology,
//! metric, or date not present in the original entity — only wording and
//! ordering may change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
}

/// A project nested inside a work experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub projects: Vec<Project>,
    pub start_date: Option<NaiveDate>,
    /// `None` means a current position.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: String,
}

/// The candidate's master profile — the single source of truth for every fact
/// the pipeline is allowed to state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub personal: PersonalInfo,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
}

impl Experience {
    /// All text carried by this experience and its nested projects, joined for
    /// keyword scoring. Company and position are included because JD keyword
    /// overlap with role titles is a relevance signal.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.position, &self.company, &self.description];
        for project in &self.projects {
            parts.push(&project.name);
            parts.push(&project.description);
            for highlight in &project.highlights {
                parts.push(highlight);
            }
        }
        parts.join(" ")
    }

    /// Technologies of the experience plus all nested projects.
    pub fn all_technologies(&self) -> Vec<&str> {
        let mut techs: Vec<&str> = self.technologies.iter().map(String::as_str).collect();
        for project in &self.projects {
            techs.extend(project.technologies.iter().map(String::as_str));
        }
        techs
    }
}

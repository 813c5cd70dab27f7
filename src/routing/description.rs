//! Task-description synthesis
//!
//! Builds the human-readable sentence denormalized into a task at creation
//! time. Every segment degrades to empty when its source field is missing;
//! the builder never fails on a sparse profile.

use chrono::{Datelike, Utc};

use crate::models::{Gender, StudyPreference};

/// Everything the builder reads from a subject. Assembled by
/// `LeadRepository::profile_for_lead` / `profile_for_application`.
#[derive(Debug, Clone)]
pub struct SubjectProfile {
    pub name: String,
    pub gender: Option<Gender>,
    pub birth_year: Option<i32>,
    pub marital_status: Option<String>,
    pub city: Option<String>,
    pub study: Option<StudyPreference>,
}

/// Build a description against the current year.
pub fn build_description(profile: &SubjectProfile) -> String {
    build_description_at(profile, Utc::now().year())
}

/// Build a description against an explicit year (deterministic in tests).
///
/// Shape: `"<salutation> <name> (<age>), <marital>, from <city>, <study>"`
/// with each segment dropped when its data is absent. The trailing study
/// segment keeps its separator even when empty, matching the stored task
/// text the rest of the system expects.
pub fn build_description_at(profile: &SubjectProfile, current_year: i32) -> String {
    let mut out = String::new();

    if let Some(gender) = profile.gender {
        out.push_str(gender.salutation());
        out.push(' ');
    }
    out.push_str(&profile.name);

    if let Some(age) = age_at(profile.birth_year, current_year) {
        out.push_str(&format!(" ({age})"));
    }

    if let Some(marital) = non_empty(profile.marital_status.as_deref()) {
        out.push_str(&format!(", {marital}"));
    }

    if let Some(city) = non_empty(profile.city.as_deref()) {
        out.push_str(&format!(", from {city}"));
    }

    out.push_str(", ");
    if let Some(study) = &profile.study {
        out.push_str(&study_text(study));
    }

    out
}

/// Task title: `"<subject display name> - <locality code(s)>"`.
pub fn build_title(subject_name: &str, country_codes: &[String]) -> String {
    if country_codes.is_empty() {
        subject_name.to_string()
    } else {
        format!("{} - {}", subject_name, country_codes.join(","))
    }
}

/// Age in whole years, or `None` when the birth year is missing or does
/// not produce a sane number.
fn age_at(birth_year: Option<i32>, current_year: i32) -> Option<i32> {
    let birth_year = birth_year?;
    if birth_year <= 1900 || birth_year > current_year {
        return None;
    }
    Some(current_year - birth_year)
}

fn study_text(study: &StudyPreference) -> String {
    let mut text = String::new();

    if let Some(course) = non_empty(study.course_name.as_deref()) {
        text.push_str(&format!("interested in {course}"));
    }
    if let Some(university) = non_empty(study.university_name.as_deref()) {
        if text.is_empty() {
            text.push_str(&format!("interested in {university}"));
        } else {
            text.push_str(&format!(" at {university}"));
        }
    }
    if let Some(intake) = study.intake_year {
        if !text.is_empty() {
            text.push_str(&format!(" ({intake} intake)"));
        }
    }

    text
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SubjectProfile {
        SubjectProfile {
            name: "Asha Rao".to_string(),
            gender: Some(Gender::Female),
            birth_year: Some(2000),
            marital_status: Some("Single".to_string()),
            city: Some("Pune".to_string()),
            study: None,
        }
    }

    #[test]
    fn sparse_profile_keeps_trailing_segment() {
        let desc = build_description_at(&profile(), 2024);
        assert_eq!(desc, "Ms. Asha Rao (24), Single, from Pune, ");
    }

    #[test]
    fn full_profile_includes_study_preference() {
        let mut p = profile();
        p.study = Some(StudyPreference {
            course_name: Some("Computer Science".to_string()),
            university_name: Some("University of Toronto".to_string()),
            intake_year: Some(2025),
        });
        let desc = build_description_at(&p, 2024);
        assert_eq!(
            desc,
            "Ms. Asha Rao (24), Single, from Pune, \
             interested in Computer Science at University of Toronto (2025 intake)"
        );
    }

    #[test]
    fn name_only_profile_still_produces_text() {
        let p = SubjectProfile {
            name: "Lone Lead".to_string(),
            gender: None,
            birth_year: None,
            marital_status: None,
            city: None,
            study: None,
        };
        let desc = build_description_at(&p, 2024);
        assert_eq!(desc, "Lone Lead, ");
        assert!(desc.contains("Lone Lead"));
    }

    #[test]
    fn implausible_birth_year_drops_the_age_segment() {
        let mut p = profile();
        p.birth_year = Some(2999);
        let desc = build_description_at(&p, 2024);
        assert!(!desc.contains("("));

        p.birth_year = Some(1700);
        let desc = build_description_at(&p, 2024);
        assert!(!desc.contains("("));
    }

    #[test]
    fn study_text_degrades_course_and_university_independently() {
        let course_only = StudyPreference {
            course_name: Some("MBA".to_string()),
            university_name: None,
            intake_year: None,
        };
        assert_eq!(study_text(&course_only), "interested in MBA");

        let university_only = StudyPreference {
            course_name: None,
            university_name: Some("Monash".to_string()),
            intake_year: Some(2026),
        };
        assert_eq!(study_text(&university_only), "interested in Monash (2026 intake)");

        let empty = StudyPreference {
            course_name: None,
            university_name: None,
            intake_year: Some(2026),
        };
        assert_eq!(study_text(&empty), "");
    }

    #[test]
    fn title_joins_country_codes() {
        let codes = vec!["IN".to_string(), "UK".to_string()];
        assert_eq!(build_title("John Doe", &codes), "John Doe - IN,UK");
        assert_eq!(build_title("John Doe", &[]), "John Doe");
    }
}

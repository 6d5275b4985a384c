use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A game project: status, jam metadata and the three GDD sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub concept: ConceptSection,
    pub narrative: NarrativeSection,
    pub gameplay: GameplaySection,
    pub status: ProjectStatus,
    pub kind: Option<ProjectKind>,
    pub jam_deadline: Option<DateTime<Utc>>,
}

/// GDD section 1: what the game is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptSection {
    pub title: String,
    pub premise: String,
    pub differentiator: String,
    pub genres: Vec<String>,
    pub inspiration: String,
    pub target_audience: String,
    pub platforms: Vec<String>,
}

/// GDD section 2: story and characters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeSection {
    pub setting: String,
    pub main_story: String,
    pub side_stories: String,
    pub protagonist: String,
    pub key_characters: String,
    pub tone: String,
    pub storytelling: String,
}

/// GDD section 3: how the game plays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySection {
    pub main_objective: String,
    pub core_mechanics: String,
    pub controls: String,
    pub camera: String,
    pub progression: String,
    pub world_and_levels: String,
    pub ai: String,
    pub economy: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Personal,
    Jam,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Jam => "jam",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(Self::Personal),
            "jam" => Some(Self::Jam),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProjectInput {
    pub concept: ConceptSection,
    pub narrative: NarrativeSection,
    pub gameplay: GameplaySection,
    pub status: Option<ProjectStatus>,
    pub kind: Option<ProjectKind>,
    pub jam_deadline: Option<DateTime<Utc>>,
}

/// Partial update: only present fields are applied. Sections replace as a
/// whole, the way the editor submits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProjectInput {
    pub concept: Option<ConceptSection>,
    pub narrative: Option<NarrativeSection>,
    pub gameplay: Option<GameplaySection>,
    pub status: Option<ProjectStatus>,
    pub kind: Option<ProjectKind>,
    pub jam_deadline: Option<DateTime<Utc>>,
}

/// Condensed view for the dashboard project list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub title: String,
    pub premise: String,
    pub main_genre: Option<String>,
    pub status: ProjectStatus,
    pub updated_at: DateTime<Utc>,
    /// Percentage of GDD fields with content, 0-100.
    pub progress: u8,
}

impl Project {
    pub fn is_jam(&self) -> bool {
        self.kind == Some(ProjectKind::Jam)
    }

    /// How much of the GDD has been filled in, as a 0-100 percentage.
    pub fn progress(&self) -> u8 {
        let c = &self.concept;
        let n = &self.narrative;
        let g = &self.gameplay;
        let texts = [
            &c.title,
            &c.premise,
            &c.differentiator,
            &c.inspiration,
            &c.target_audience,
            &n.setting,
            &n.main_story,
            &n.side_stories,
            &n.protagonist,
            &n.key_characters,
            &n.tone,
            &n.storytelling,
            &g.main_objective,
            &g.core_mechanics,
            &g.controls,
            &g.camera,
            &g.progression,
            &g.world_and_levels,
            &g.ai,
            &g.economy,
        ];
        let lists = [&c.genres, &c.platforms];

        let total = texts.len() + lists.len();
        let filled = texts.iter().filter(|s| !s.trim().is_empty()).count()
            + lists.iter().filter(|l| !l.is_empty()).count();

        ((filled * 100) / total) as u8
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            title: self.concept.title.clone(),
            premise: self.concept.premise.clone(),
            main_genre: self.concept.genres.first().cloned(),
            status: self.status,
            updated_at: self.updated_at,
            progress: self.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_zero_for_an_empty_gdd() {
        let input = CreateProjectInput::default();
        let project = Project {
            id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            concept: input.concept,
            narrative: input.narrative,
            gameplay: input.gameplay,
            status: ProjectStatus::Draft,
            kind: None,
            jam_deadline: None,
        };
        assert_eq!(project.progress(), 0);
    }

    #[test]
    fn progress_counts_text_and_list_fields() {
        let mut project = Project {
            id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            concept: ConceptSection::default(),
            narrative: NarrativeSection::default(),
            gameplay: GameplaySection::default(),
            status: ProjectStatus::Draft,
            kind: None,
            jam_deadline: None,
        };
        project.concept.title = "Moss Runner".into();
        project.concept.genres = vec!["platformer".into()];
        // 2 of 22 fields -> 9%
        assert_eq!(project.progress(), 9);

        // Whitespace does not count as content
        project.narrative.setting = "   ".into();
        assert_eq!(project.progress(), 9);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
        ] {
            assert_eq!(ProjectStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::from_str("archived"), None);
    }

    #[test]
    fn summary_takes_the_first_genre() {
        let mut input = CreateProjectInput::default();
        input.concept.title = "Deep Delve".into();
        input.concept.genres = vec!["roguelike".into(), "deckbuilder".into()];
        let project = Project {
            id: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            concept: input.concept,
            narrative: input.narrative,
            gameplay: input.gameplay,
            status: ProjectStatus::InProgress,
            kind: Some(ProjectKind::Jam),
            jam_deadline: None,
        };
        let summary = project.summary();
        assert_eq!(summary.title, "Deep Delve");
        assert_eq!(summary.main_genre.as_deref(), Some("roguelike"));
        assert_eq!(summary.status, ProjectStatus::InProgress);
    }
}

//! Application-level configuration loading: lobby defaults, the award seed
//! set for prediction lobbies, and the deterministic fallback question set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::{Difficulty, LobbyConfigEntity};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_NIGHT_BACK_CONFIG_PATH";

/// An award race seeded into every prediction-mode lobby.
#[derive(Debug, Clone)]
pub struct AwardCategory {
    /// Award name, e.g. "Best Picture".
    pub name: String,
    /// Candidate list.
    pub nominees: Vec<AwardNominee>,
}

/// One candidate in an award race.
#[derive(Debug, Clone)]
pub struct AwardNominee {
    /// Nominee name (person or film).
    pub name: String,
    /// Film the nominee is attached to, when distinct from the name.
    pub movie: Option<String>,
}

/// A canned trivia question used when no LLM is configured or the call fails.
#[derive(Debug, Clone)]
pub struct FallbackQuestion {
    /// Question text.
    pub question: String,
    /// Exactly four options.
    pub options: Vec<String>,
    /// The correct option, matching one of `options`.
    pub correct_answer: String,
    /// Short justification shown after answering.
    pub explanation: Option<String>,
    /// Difficulty tier, which fixes the base points.
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    lobby_defaults: LobbyConfigEntity,
    award_categories: Vec<AwardCategory>,
    fallback_questions: Vec<FallbackQuestion>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        categories = config.award_categories.len(),
                        fallback_questions = config.fallback_questions.len(),
                        "loaded game configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Gameplay settings applied to freshly created lobbies.
    pub fn lobby_defaults(&self) -> LobbyConfigEntity {
        self.lobby_defaults
    }

    /// Award races seeded into prediction-mode lobbies.
    pub fn award_categories(&self) -> &[AwardCategory] {
        &self.award_categories
    }

    /// Deterministic question set used when generation cannot reach an LLM.
    pub fn fallback_questions(&self) -> &[FallbackQuestion] {
        &self.fallback_questions
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lobby_defaults: LobbyConfigEntity {
                question_count: 10,
                answer_seconds: 20,
            },
            award_categories: default_award_categories(),
            fallback_questions: default_fallback_questions(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    #[serde(default)]
    lobby: Option<RawLobbyDefaults>,
    #[serde(default)]
    award_categories: Vec<RawAwardCategory>,
    #[serde(default)]
    fallback_questions: Vec<RawFallbackQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawLobbyDefaults {
    question_count: u32,
    answer_seconds: u32,
}

#[derive(Debug, Deserialize)]
struct RawAwardCategory {
    name: String,
    nominees: Vec<RawAwardNominee>,
}

#[derive(Debug, Deserialize)]
struct RawAwardNominee {
    name: String,
    #[serde(default)]
    movie: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFallbackQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
    difficulty: Difficulty,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let lobby_defaults = value
            .lobby
            .map(|raw| LobbyConfigEntity {
                question_count: raw.question_count,
                answer_seconds: raw.answer_seconds,
            })
            .unwrap_or(defaults.lobby_defaults);

        let award_categories = if value.award_categories.is_empty() {
            defaults.award_categories
        } else {
            value
                .award_categories
                .into_iter()
                .map(|raw| AwardCategory {
                    name: raw.name,
                    nominees: raw
                        .nominees
                        .into_iter()
                        .map(|n| AwardNominee {
                            name: n.name,
                            movie: n.movie,
                        })
                        .collect(),
                })
                .collect()
        };

        let fallback_questions = if value.fallback_questions.is_empty() {
            defaults.fallback_questions
        } else {
            value
                .fallback_questions
                .into_iter()
                .map(|raw| FallbackQuestion {
                    question: raw.question,
                    options: raw.options,
                    correct_answer: raw.correct_answer,
                    explanation: raw.explanation,
                    difficulty: raw.difficulty,
                })
                .collect()
        };

        Self {
            lobby_defaults,
            award_categories,
            fallback_questions,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in award set shipped with the binary.
fn default_award_categories() -> Vec<AwardCategory> {
    let nominee = |name: &str, movie: Option<&str>| AwardNominee {
        name: name.to_string(),
        movie: movie.map(str::to_string),
    };

    vec![
        AwardCategory {
            name: "Best Picture".into(),
            nominees: vec![
                nominee("Parasite", None),
                nominee("1917", None),
                nominee("Joker", None),
                nominee("Once Upon a Time in Hollywood", None),
            ],
        },
        AwardCategory {
            name: "Directing".into(),
            nominees: vec![
                nominee("Bong Joon-ho", Some("Parasite")),
                nominee("Sam Mendes", Some("1917")),
                nominee("Todd Phillips", Some("Joker")),
                nominee("Quentin Tarantino", Some("Once Upon a Time in Hollywood")),
            ],
        },
        AwardCategory {
            name: "Actor in a Leading Role".into(),
            nominees: vec![
                nominee("Joaquin Phoenix", Some("Joker")),
                nominee("Adam Driver", Some("Marriage Story")),
                nominee("Leonardo DiCaprio", Some("Once Upon a Time in Hollywood")),
                nominee("Antonio Banderas", Some("Pain and Glory")),
            ],
        },
        AwardCategory {
            name: "Actress in a Leading Role".into(),
            nominees: vec![
                nominee("Renée Zellweger", Some("Judy")),
                nominee("Scarlett Johansson", Some("Marriage Story")),
                nominee("Saoirse Ronan", Some("Little Women")),
                nominee("Charlize Theron", Some("Bombshell")),
            ],
        },
        AwardCategory {
            name: "Animated Feature Film".into(),
            nominees: vec![
                nominee("Toy Story 4", None),
                nominee("Klaus", None),
                nominee("How to Train Your Dragon: The Hidden World", None),
                nominee("Missing Link", None),
            ],
        },
    ]
}

/// Built-in fallback trivia shipped with the binary.
fn default_fallback_questions() -> Vec<FallbackQuestion> {
    let question = |text: &str,
                    options: [&str; 4],
                    correct: &str,
                    explanation: &str,
                    difficulty: Difficulty| FallbackQuestion {
        question: text.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer: correct.to_string(),
        explanation: Some(explanation.to_string()),
        difficulty,
    };

    vec![
        question(
            "Which film won the Academy Award for Best Picture in 2020?",
            ["1917", "Joker", "Parasite", "Once Upon a Time in Hollywood"],
            "Parasite",
            "Parasite was the first non-English language film to win Best Picture.",
            Difficulty::Medium,
        ),
        question(
            "Who directed the 1994 film \"Pulp Fiction\"?",
            [
                "Martin Scorsese",
                "Quentin Tarantino",
                "Steven Spielberg",
                "Francis Ford Coppola",
            ],
            "Quentin Tarantino",
            "Pulp Fiction won the Palme d'Or at Cannes in 1994.",
            Difficulty::Easy,
        ),
        question(
            "Which actor has received the most Oscar nominations in history?",
            [
                "Jack Nicholson",
                "Meryl Streep",
                "Katharine Hepburn",
                "Daniel Day-Lewis",
            ],
            "Meryl Streep",
            "Meryl Streep has received over twenty Academy Award nominations.",
            Difficulty::Hard,
        ),
        question(
            "Which of these films was NOT directed by Christopher Nolan?",
            ["Inception", "Interstellar", "The Revenant", "Dunkirk"],
            "The Revenant",
            "The Revenant was directed by Alejandro González Iñárritu.",
            Difficulty::Medium,
        ),
        question(
            "What was the highest-grossing film of all time before \"Avengers: Endgame\"?",
            [
                "Titanic",
                "Star Wars: The Force Awakens",
                "Avatar",
                "Jurassic World",
            ],
            "Avatar",
            "Avatar held the record until Avengers: Endgame surpassed it in 2019.",
            Difficulty::Easy,
        ),
        question(
            "Which actor played Tony Stark in the Marvel Cinematic Universe?",
            [
                "Chris Evans",
                "Chris Hemsworth",
                "Mark Ruffalo",
                "Robert Downey Jr.",
            ],
            "Robert Downey Jr.",
            "Robert Downey Jr. played Tony Stark from Iron Man through Avengers: Endgame.",
            Difficulty::Easy,
        ),
        question(
            "Which film features the character Hannibal Lecter?",
            ["The Shining", "Silence of the Lambs", "Seven", "Psycho"],
            "Silence of the Lambs",
            "Anthony Hopkins played Hannibal Lecter in The Silence of the Lambs.",
            Difficulty::Medium,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fallback_questions_are_well_formed() {
        let config = AppConfig::default();
        let questions = config.fallback_questions();
        assert!(!questions.is_empty());

        for question in questions {
            assert_eq!(question.options.len(), 4, "{}", question.question);
            assert!(
                question.options.contains(&question.correct_answer),
                "correct answer must be one of the options: {}",
                question.question
            );
        }
    }

    #[test]
    fn default_award_set_has_candidates() {
        let config = AppConfig::default();
        assert!(!config.award_categories().is_empty());
        for category in config.award_categories() {
            assert!(
                category.nominees.len() >= 2,
                "category {} needs at least two nominees",
                category.name
            );
        }
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_sections() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"lobby": {"question_count": 5, "answer_seconds": 30}}"#)
                .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.lobby_defaults().question_count, 5);
        assert_eq!(config.lobby_defaults().answer_seconds, 30);
        assert!(!config.fallback_questions().is_empty());
        assert!(!config.award_categories().is_empty());
    }
}

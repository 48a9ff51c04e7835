//! Deterministic fallback content. These are the strings users see whenever
//! no LLM provider is configured or a call fails, so the generation flow
//! always completes.

/// Context available when writing a roast for one wrong answer.
#[derive(Debug, Clone)]
pub struct RoastContext<'a> {
    /// Display name of the roasted player.
    pub player_name: &'a str,
    /// The option they picked.
    pub wrong_answer: &'a str,
    /// The option they should have picked.
    pub correct_answer: &'a str,
    /// Wrong answers before this one.
    pub mistake_count: u32,
    /// One of their favorite movies, when known.
    pub favorite_movie: Option<&'a str>,
}

/// Context available when writing the end-of-game burn.
#[derive(Debug, Clone)]
pub struct BurnContext<'a> {
    /// The lowest-scoring player.
    pub worst_name: &'a str,
    /// Their final score.
    pub worst_score: i32,
    /// How many questions they got wrong.
    pub wrong_answers: u32,
    /// Total players in the lobby.
    pub player_count: usize,
    /// One of their favorite movies, when known.
    pub favorite_movie: Option<&'a str>,
    /// The winner's display name.
    pub best_name: &'a str,
    /// The winner's final score.
    pub best_score: i32,
}

/// Templated roast for a wrong answer. The template rotates with the
/// player's mistake count, so the same context always yields the same text.
pub fn fallback_roast(ctx: &RoastContext<'_>) -> String {
    let templates: Vec<String> = vec![
        format!(
            "Oh {}, I've seen better movie knowledge from someone who thinks \
             \"The Godfather\" is about gardening. The answer was \"{}\", not \"{}\".",
            ctx.player_name, ctx.correct_answer, ctx.wrong_answer
        ),
        format!(
            "{}, you claim to love movies but just whiffed a softball. \
             Hand over your streaming passwords immediately.",
            ctx.player_name
        ),
        format!(
            "Wow {}, even my grandmother who thinks all movies are \"too loud \
             these days\" would have known it was \"{}\".",
            ctx.player_name, ctx.correct_answer
        ),
        format!(
            "{}, your movie knowledge is like a big-budget sequel: all flash, \
             no substance.",
            ctx.player_name
        ),
        format!(
            "That's {} wrong answers now, {}. Maybe try books instead?",
            ctx.mistake_count + 1,
            ctx.player_name
        ),
        match ctx.favorite_movie {
            Some(favorite) => format!(
                "You listed \"{}\" as a favorite but can't answer this? \
                 Starting to think you only watched the trailer.",
                favorite
            ),
            None => format!(
                "{}, I'm beginning to think your idea of \"watching movies\" \
                 is scrolling through thumbnails.",
                ctx.player_name
            ),
        },
        format!(
            "Oh no {}! The correct answer was \"{}\". Maybe stick to coloring books?",
            ctx.player_name, ctx.correct_answer
        ),
    ];

    let index = ctx.mistake_count as usize % templates.len();
    templates.into_iter().nth(index).unwrap_or_default()
}

/// Templated end-of-game burn targeting the lowest-scoring player.
pub fn fallback_final_burn(ctx: &BurnContext<'_>) -> String {
    let favorite_jab = match ctx.favorite_movie {
        Some(favorite) => format!(" despite listing \"{}\" as a favorite movie", favorite),
        None => String::new(),
    };

    format!(
        "Ladies and gentlemen, we've witnessed a historic failure tonight. {worst} \
         managed to score {worst_score} points, placing dead last out of {count} \
         players. {worst} claims to be a movie fan, but missed {wrong} \
         question(s){favorite_jab}. Meanwhile, {best} dominated with {best_score} \
         points, a lead of {gap}. Better luck next time, {worst}: maybe read the \
         plot summaries before claiming to have watched them.",
        worst = ctx.worst_name,
        worst_score = ctx.worst_score,
        count = ctx.player_count,
        wrong = ctx.wrong_answers,
        favorite_jab = favorite_jab,
        best = ctx.best_name,
        best_score = ctx.best_score,
        gap = ctx.best_score - ctx.worst_score,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roast_context() -> RoastContext<'static> {
        RoastContext {
            player_name: "Bob",
            wrong_answer: "Titanic",
            correct_answer: "Avatar",
            mistake_count: 0,
            favorite_movie: None,
        }
    }

    #[test]
    fn roast_is_deterministic_for_the_same_context() {
        let ctx = roast_context();
        assert_eq!(fallback_roast(&ctx), fallback_roast(&ctx));
    }

    #[test]
    fn roast_mentions_the_player_or_their_mistake() {
        for mistakes in 0..10 {
            let ctx = RoastContext {
                mistake_count: mistakes,
                ..roast_context()
            };
            let roast = fallback_roast(&ctx);
            assert!(
                roast.contains("Bob") || roast.contains("Avatar") || roast.contains("thumbnails"),
                "roast should reference the context: {roast}"
            );
            assert!(!roast.is_empty());
        }
    }

    #[test]
    fn burn_names_both_ends_of_the_scoreboard() {
        let burn = fallback_final_burn(&BurnContext {
            worst_name: "Bob",
            worst_score: 100,
            wrong_answers: 7,
            player_count: 4,
            favorite_movie: Some("Heat"),
            best_name: "Alice",
            best_score: 900,
        });

        assert!(burn.contains("Bob"));
        assert!(burn.contains("Alice"));
        assert!(burn.contains("800"));
        assert!(burn.contains("Heat"));
    }
}

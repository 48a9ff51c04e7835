use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Movie Night Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::lobby_stream,
        crate::routes::game::create_game,
        crate::routes::game::join_game,
        crate::routes::lobby::get_lobby,
        crate::routes::lobby::list_players,
        crate::routes::lobby::start_game,
        crate::routes::lobby::get_results,
        crate::routes::lobby::post_chat_message,
        crate::routes::trivia::generate_questions,
        crate::routes::trivia::generate_roast,
        crate::routes::trivia::generate_final_burn,
        crate::routes::trivia::submit_favorites,
        crate::routes::trivia::list_questions,
        crate::routes::trivia::answer_question,
        crate::routes::oscars::list_categories,
        crate::routes::oscars::submit_prediction,
        crate::routes::oscars::lock_category,
        crate::routes::oscars::set_winner,
        crate::routes::oscars::update_scores,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::common::GameModeDto,
            crate::dto::common::GameStageDto,
            crate::dto::common::RevealStateDto,
            crate::dto::common::DifficultyDto,
            crate::dto::lobby::CreateGameRequest,
            crate::dto::lobby::JoinGameRequest,
            crate::dto::lobby::GameEntryResponse,
            crate::dto::lobby::LobbySummary,
            crate::dto::lobby::PlayerSummary,
            crate::dto::lobby::HostActionRequest,
            crate::dto::lobby::StartGameResponse,
            crate::dto::trivia::SubmitFavoritesRequest,
            crate::dto::trivia::SubmitFavoritesResponse,
            crate::dto::trivia::GenerateQuestionsRequest,
            crate::dto::trivia::GenerateQuestionsResponse,
            crate::dto::trivia::QuestionSummary,
            crate::dto::trivia::AnswerRequest,
            crate::dto::trivia::AnswerOutcome,
            crate::dto::trivia::RoastGenerateRequest,
            crate::dto::trivia::RoastSummary,
            crate::dto::trivia::FinalBurnGenerateRequest,
            crate::dto::trivia::FinalBurnSummary,
            crate::dto::trivia::ShameMovieSummary,
            crate::dto::trivia::FavoriteMovieSummary,
            crate::dto::trivia::ResultsResponse,
            crate::dto::oscars::CategorySummary,
            crate::dto::oscars::NomineeSummary,
            crate::dto::oscars::CategoryWithNominees,
            crate::dto::oscars::PredictionRequest,
            crate::dto::oscars::SetWinnerRequest,
            crate::dto::oscars::SetWinnerResponse,
            crate::dto::oscars::UpdateScoresRequest,
            crate::dto::oscars::ScoreUpdateResponse,
            crate::dto::chat::ChatMessageRequest,
            crate::dto::chat::ChatMessageSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent change-feed streams"),
        (name = "game", description = "Game entry (create & join)"),
        (name = "lobby", description = "Lobby lifecycle and chat"),
        (name = "trivia", description = "Trivia gameplay and generation"),
        (name = "oscars", description = "Prediction-mode gameplay"),
    )
)]
pub struct ApiDoc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{bout, bracket, ranking, shared::AppState};

/// Full HTTP surface of the judge console and scoreboard
pub fn build_router(state: AppState) -> Router {
    let bouts = Router::new()
        .route("/bouts", post(bout::open_bout))
        .route("/bouts/:id", get(bout::get_bout))
        .route("/bouts/:id/points", post(bout::add_point))
        .route("/bouts/:id/points/undo", post(bout::subtract_point))
        .route("/bouts/:id/penalties", post(bout::set_penalty))
        .route("/bouts/:id/clock/start", post(bout::start_clock))
        .route("/bouts/:id/clock/pause", post(bout::pause_clock))
        .route("/bouts/:id/clock/toggle", post(bout::toggle_clock))
        .route("/bouts/:id/clock/reset", post(bout::reset_clock))
        .route("/bouts/:id/category", post(bout::set_category))
        .route("/bouts/:id/resolve", post(bout::resolve))
        .route("/bouts/:id/hantei/ballots", post(bout::cast_ballot))
        .route("/bouts/:id/hantei/override", post(bout::set_hantei_override))
        .route("/bouts/:id/hantei/confirm", post(bout::confirm_hantei))
        .route("/bouts/:id/winner", post(bout::declare_winner))
        .route("/bouts/:id/finalize", post(bout::finalize))
        .route("/bouts/:id/withdraw", post(bout::withdraw));

    let brackets = Router::new()
        .route(
            "/brackets/:competition",
            get(bracket::get_bracket).post(bracket::open_bracket),
        )
        .route("/brackets/:competition/assign", post(bracket::assign_competitor))
        .route("/brackets/:competition/judge", post(bracket::assign_judge))
        .route("/brackets/:competition/draw", post(bracket::draw))
        .route("/brackets/:competition/matches", post(bracket::create_match))
        .route("/brackets/:competition/refresh", post(bracket::refresh))
        .route("/brackets/:competition/reset", post(bracket::reset));

    Router::new()
        .route("/", get(|| async { "Kumite board" }))
        .route("/rankings", get(ranking::list_rankings))
        .merge(bouts)
        .merge(brackets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

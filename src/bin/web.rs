//! Single binary web server: the game-server bridge posts lifecycle events and roster updates,
//! operators post commands, and the bridge drains queued directives from the outbox.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT (see config.rs for the
//! TMIT_* sequence settings).

use actix_web::{
    get, post, put,
    web::{Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use tmit_match_sequencer::{
    results_csv, Command, MatchController, MatchError, MatchEvent, OnlinePlayer, OutboxHost,
    SequencerConfig, ServerConfig,
};
use tokio::sync::Mutex;

/// The one match context. The mutex is held for a whole event so events never interleave.
type AppState = Data<Mutex<MatchController<OutboxHost>>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Either a command name/alias (`"balance"`, `"b"`) or a raw chat line (`"//tmit b"`).
#[derive(Deserialize)]
struct CommandBody {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    line: Option<String>,
    /// Login of the operator who issued it; replies are whispered to them.
    #[serde(default)]
    operator: Option<String>,
}

impl CommandBody {
    fn parse(&self) -> Result<Command, MatchError> {
        match (&self.command, &self.line) {
            (Some(name), _) => name.parse(),
            (None, Some(line)) => Command::parse_chat(line),
            (None, None) => Err(MatchError::UnknownCommand(String::new())),
        }
    }
}

#[derive(Deserialize)]
struct MapBody {
    author_time: u32,
}

#[derive(serde::Serialize)]
struct CommandResponse<'a> {
    phase: tmit_match_sequencer::Phase,
    replies: &'a [String],
}

fn error_response(e: &MatchError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        MatchError::NotReady { .. } => HttpResponse::Conflict().json(body),
        MatchError::Export(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tmit-match-sequencer",
    })
}

/// Current match context: phase, ranking, teams.
#[get("/api/match")]
async fn api_get_match(state: AppState) -> HttpResponse {
    let controller = state.lock().await;
    HttpResponse::Ok().json(controller.context())
}

/// Deliver a lifecycle event from the game server.
#[post("/api/events")]
async fn api_post_event(state: AppState, body: Json<MatchEvent>) -> HttpResponse {
    let mut controller = state.lock().await;
    controller.handle_event(body.into_inner()).await;
    HttpResponse::Ok().json(controller.context())
}

/// Run an operator command.
#[post("/api/commands")]
async fn api_post_command(state: AppState, body: Json<CommandBody>) -> HttpResponse {
    let command = match body.parse() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut controller = state.lock().await;
    match controller.run_command(command, body.operator.as_deref()).await {
        Ok(replies) => HttpResponse::Ok().json(CommandResponse {
            phase: controller.phase(),
            replies: &replies,
        }),
        Err(e) => error_response(&e),
    }
}

/// Both rosters as display names (teams phase only).
#[get("/api/teams")]
async fn api_get_teams(state: AppState) -> HttpResponse {
    let controller = state.lock().await;
    match controller.team_rosters() {
        Ok(rosters) => HttpResponse::Ok().json(rosters),
        Err(e) => error_response(&e),
    }
}

/// Replace the online roster snapshot.
#[put("/api/roster")]
async fn api_put_roster(state: AppState, body: Json<Vec<OnlinePlayer>>) -> HttpResponse {
    let mut controller = state.lock().await;
    controller.host_mut().set_roster(body.into_inner());
    HttpResponse::Ok().json(controller.host().roster())
}

/// Set the author time of the map currently loaded.
#[put("/api/map")]
async fn api_put_map(state: AppState, body: Json<MapBody>) -> HttpResponse {
    let mut controller = state.lock().await;
    controller.host_mut().set_author_time(body.author_time);
    HttpResponse::NoContent().finish()
}

/// Take every directive queued for the game server.
#[get("/api/outbox")]
async fn api_drain_outbox(state: AppState) -> HttpResponse {
    let mut controller = state.lock().await;
    HttpResponse::Ok().json(controller.host_mut().drain())
}

/// Qualification ranking as CSV.
#[get("/api/results.csv")]
async fn api_results_csv(state: AppState) -> HttpResponse {
    let controller = state.lock().await;
    let context = controller.context();
    match results_csv(&context.ranked, &context.teams) {
        Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server = ServerConfig::from_env();
    let sequence = SequencerConfig::from_env();
    log::info!(
        "Time attack script {}, teams script {}",
        sequence.time_attack_script,
        sequence.teams_script
    );

    let host = OutboxHost::new().with_replay_module(server.replay_module);
    let state = Data::new(Mutex::new(MatchController::new(host, sequence)));

    let bind = (server.host.as_str(), server.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_match)
            .service(api_post_event)
            .service(api_post_command)
            .service(api_get_teams)
            .service(api_put_roster)
            .service(api_put_map)
            .service(api_drain_outbox)
            .service(api_results_csv)
    })
    .bind(bind)?
    .run()
    .await
}

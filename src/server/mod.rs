pub mod page;
pub mod session;

use actix_web::{
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web, App, HttpRequest, HttpResponse, HttpServer,
};

use crate::{
    catalog::{COLOR_TONES, STYLES, VIEWPOINTS},
    error::ArtboxError,
    models::{dedup_moods, SelectionParams},
    studio::{error_message, RenderedResult, Studio, ViewState},
};

pub use session::{SessionStore, SESSION_COOKIE};

pub struct AppState {
    pub studio: Studio,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(studio: Studio) -> Self {
        Self {
            studio,
            sessions: SessionStore::new(),
        }
    }
}

/// Submitted form fields. `mood` may repeat, so the body is decoded as
/// key/value pairs rather than into a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub params: SelectionParams,
    pub auto_suggest: bool,
}

impl FormInput {
    pub fn from_body(body: &[u8]) -> Result<Self, ArtboxError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ArtboxError::Serialization(format!("invalid form body: {}", e)))?;

        let field = |name: &str, fallback: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_else(|| fallback.to_string())
        };
        let moods = dedup_moods(
            pairs
                .iter()
                .filter(|(key, _)| key == "mood")
                .map(|(_, value)| value.as_str()),
        );

        Ok(Self {
            params: SelectionParams {
                theme: field("theme", ""),
                style: field("style", STYLES[0]),
                elements: field("elements", ""),
                color_tone: field("color_tone", COLOR_TONES[0]),
                moods,
                viewpoint: field("viewpoint", VIEWPOINTS[0]),
            },
            auto_suggest: pairs
                .iter()
                .any(|(key, value)| key == "auto_suggest" && value == "on"),
        })
    }
}

fn redirect_home(session: &str, minted: bool) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, "/"));
    if minted {
        response.cookie(session::session_cookie(session));
    }
    response.finish()
}

/// Decodes the form or records the decoding failure on the session.
fn read_form(state: &mut ViewState, body: &[u8]) -> Option<FormInput> {
    match FormInput::from_body(body) {
        Ok(input) => Some(input),
        Err(e) => {
            log::warn!("Rejected form submission: {}", e);
            state.error = Some(error_message(&e));
            None
        }
    }
}

/// Renders the session's state. Sessions that never stored anything are
/// rendered from an empty state and stay out of the store.
async fn render_session(data: &AppState, id: &str) -> (ViewState, RenderedResult) {
    let Some(slot) = data.sessions.get(id) else {
        return data.studio.render(ViewState::default()).await;
    };
    let mut state = slot.lock().await;
    let (next, rendered) = data.studio.render(state.clone()).await;
    *state = next.clone();
    (next, rendered)
}

async fn index(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let (id, minted) = session::session_id(&req);
    let (state, rendered) = render_session(&data, &id).await;
    let html = page::render_page(state.params.as_ref(), &rendered, data.studio.flow());

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if minted {
        response.cookie(session::session_cookie(&id));
    }
    response.body(html)
}

async fn suggest(req: HttpRequest, body: web::Bytes, data: web::Data<AppState>) -> HttpResponse {
    let (id, minted) = session::session_id(&req);
    let slot = data.sessions.slot(&id);
    let mut state = slot.lock().await;
    if let Some(input) = read_form(&mut state, &body) {
        *state = data.studio.suggest(state.clone(), input.params).await;
    }
    redirect_home(&id, minted)
}

async fn prompt(req: HttpRequest, body: web::Bytes, data: web::Data<AppState>) -> HttpResponse {
    let (id, minted) = session::session_id(&req);
    let slot = data.sessions.slot(&id);
    let mut state = slot.lock().await;
    if let Some(input) = read_form(&mut state, &body) {
        log::info!("Form submitted for theme '{}'", input.params.theme);
        *state = data
            .studio
            .submit(state.clone(), input.params, input.auto_suggest)
            .await;
    }
    redirect_home(&id, minted)
}

async fn image(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let (id, minted) = session::session_id(&req);
    let slot = data.sessions.slot(&id);
    let mut state = slot.lock().await;
    *state = data.studio.generate_image(state.clone()).await;
    redirect_home(&id, minted)
}

async fn download(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let (id, _) = session::session_id(&req);
    let (_, rendered) = render_session(&data, &id).await;

    match rendered.download {
        Some(payload) => HttpResponse::Ok()
            .content_type(payload.mime)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(payload.file_name.to_string())],
            })
            .body(payload.bytes),
        None => HttpResponse::NotFound().body(
            rendered
                .download_error
                .unwrap_or_else(|| "no image has been generated yet".to_string()),
        ),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/suggest", web::post().to(suggest))
        .route("/prompt", web::post().to(prompt))
        .route("/image", web::post().to(image))
        .route("/download", web::get().to(download));
}

pub async fn run(studio: Studio, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(AppState::new(studio));

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

use crate::page::{DocumentState, PageDocument, PagePart};
use crate::ports::ViewPorts;
use crate::query::{self, SEARCH_PARAM};
use crate::render::{
    CourseCard, CourseDetail, DetailContent, ListContent, NO_COURSES_MESSAGE, NOT_FOUND_MESSAGE,
    QuickLink,
};
use crate::theme::{LIGHT_THEME_CLASS, PreferenceError, PreferenceStore, ThemeController};
use crate::{Catalog, Course, PageController};
use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use crate::cookies::{cookie_pairs, preference_cookie};
use cookie::Cookie;
use include_dir::{Dir, include_dir};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type SharedState = Arc<AppState>;

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const PAGE_TITLE: &str = "Catálogo de Cursos";
const PAGE_SUBTITLE: &str = "Explora los cursos disponibles y abre el detalle de cada uno.";
const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub base_url: String,
    /// Adds the wasm bootstrap to rendered pages.
    pub load_wasm: bool,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub base_url: String,
    /// JSON catalog to serve instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Directory holding a `wasm-bindgen` bundle, served under `/pkg`.
    pub wasm_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://127.0.0.1:8080".to_string(),
            catalog_path: None,
            wasm_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

/// Installs the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let catalog = Catalog::load_or_unavailable(config.catalog_path.as_deref());
    let state = Arc::new(AppState {
        catalog,
        base_url: config.base_url.clone(),
        load_wasm: config.wasm_dir.is_some(),
    });
    info!(
        %config.addr,
        base = %config.base_url,
        courses = state.catalog.len(),
        catalog_available = state.catalog.is_available(),
        wasm = ?config.wasm_dir,
        "Binding HTTP listener"
    );
    let router = build_router(state, config.wasm_dir);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState, wasm_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/theme", post(toggle_theme))
        .route("/api/courses", get(api_courses))
        .route("/api/course", get(api_course))
        .route("/assets/*path", get(asset))
        .route("/healthz", get(health));
    if let Some(dir) = wasm_dir {
        router = router.nest_service("/pkg", ServeDir::new(dir));
    }
    router
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn index(
    State(state): State<SharedState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let store = CookiePreferenceStore::from_headers(&headers);
    let (html, store) = render_page(&state, raw_query.as_deref().unwrap_or_default(), store);
    with_cookies(Html(html).into_response(), &store)
}

async fn toggle_theme(headers: HeaderMap) -> Response {
    let store = CookiePreferenceStore::from_headers(&headers);
    let mut ports = ViewPorts::default();
    let mut controller = ThemeController::init(store, &mut ports);
    let theme = controller.toggle(&mut ports);
    info!(%theme, "theme toggled");
    let store = controller.into_store();
    let target = back_target(&headers);
    with_cookies(Redirect::to(&target).into_response(), &store)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "course-catalog-web" }))
}

async fn api_courses(
    State(state): State<SharedState>,
    Query(params): Query<CoursesParams>,
) -> Result<Json<CoursesPayload>, ApiError> {
    let query = params.q.unwrap_or_default();
    let courses = state
        .catalog
        .filter(&query)
        .ok_or_else(|| ApiError::unavailable(NO_COURSES_MESSAGE))?;
    Ok(Json(CoursesPayload {
        count: courses.len(),
        courses: courses.into_iter().cloned().collect(),
        query,
    }))
}

async fn api_course(
    State(state): State<SharedState>,
    Query(params): Query<CourseParams>,
) -> Result<Json<Course>, ApiError> {
    let id = params
        .id
        .as_deref()
        .and_then(query::parse_leading_int)
        .ok_or_else(|| ApiError::bad_request("Provide a numeric `id` parameter."))?;
    u32::try_from(id)
        .ok()
        .and_then(|id| state.catalog.get(id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND_MESSAGE))
}

async fn asset(Path(path): Path<String>) -> Response {
    match ASSETS.get_file(&path) {
        Some(file) => (
            [(header::CONTENT_TYPE, content_type(&path))],
            file.contents(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct CoursesParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CourseParams {
    id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CoursesPayload {
    query: String,
    count: usize,
    courses: Vec<Course>,
}

/// Theme preference carried in the request's cookies.
///
/// Writes are collected as `Set-Cookie` values for the response. Writing the
/// value the browser already sent produces no cookie.
#[derive(Debug, Default)]
pub struct CookiePreferenceStore {
    incoming: HashMap<String, String>,
    outgoing: Vec<Cookie<'static>>,
}

impl CookiePreferenceStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut incoming = HashMap::new();
        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for (name, value) in cookie_pairs(raw) {
                incoming.entry(name).or_insert(value);
            }
        }
        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// `Set-Cookie` header values for every changed preference.
    pub fn set_cookie_values(&self) -> Vec<String> {
        self.outgoing.iter().map(ToString::to_string).collect()
    }
}

impl PreferenceStore for CookiePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.incoming.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.incoming.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let cookie = preference_cookie(key, value);
        self.outgoing.retain(|existing| existing.name() != key);
        self.outgoing.push(cookie);
        self.incoming.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn with_cookies(mut response: Response, store: &CookiePreferenceStore) -> Response {
    for value in store.set_cookie_values() {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(err) => debug!(%err, "dropping unencodable cookie"),
        }
    }
    response
}

/// Path of the page that submitted the toggle. Only the path and query are
/// kept, so the redirect never leaves this site.
fn back_target(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(referer_path)
        .unwrap_or_else(|| "/".to_string())
}

fn referer_path(referer: &str) -> Option<String> {
    let path = if referer.starts_with('/') {
        referer
    } else {
        let (_, rest) = referer.split_once("://")?;
        rest.find('/').map_or("/", |start| &rest[start..])
    };
    // `//host` and `/\host` are read by browsers as another origin.
    if path.starts_with("//") || path.starts_with("/\\") {
        return None;
    }
    Some(path.to_string())
}

fn content_type(path: &str) -> String {
    let mime = match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("svg") => mime::IMAGE_SVG,
        Some("png") => mime::IMAGE_PNG,
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    mime.to_string()
}

/// Runs the page controller for one request and renders the resulting
/// document. Returns the store so its cookie writes reach the response.
fn render_page(
    state: &AppState,
    raw_query: &str,
    store: CookiePreferenceStore,
) -> (String, CookiePreferenceStore) {
    let search = query::query_param(raw_query, SEARCH_PARAM).unwrap_or_default();
    let document = PageDocument::new().with_search_value(&search);
    let controller =
        PageController::init(state.catalog.clone(), document.ports(), store, raw_query);
    let canonical_url = match controller.state().selected_id {
        Some(id) => format!(
            "{}/{}?{}={id}",
            state.base_url,
            query::PAGE_PATH,
            query::ID_PARAM
        ),
        None => format!("{}/", state.base_url),
    };
    let store = controller.into_store();
    let snapshot = document.snapshot();
    let template = PageTemplate::new(&snapshot, canonical_url, state.load_wasm);
    let html = template
        .render()
        .unwrap_or_else(|err| render_error_page(err.to_string()));
    (html, store)
}

fn render_error_page(message: String) -> String {
    ErrorTemplate {
        title: PAGE_TITLE,
        message,
    }
    .render()
    .unwrap_or_else(|_| "Internal error".to_string())
}

impl<'a> PageTemplate<'a> {
    fn new(snapshot: &'a DocumentState, canonical_url: String, load_wasm: bool) -> Self {
        Self {
            title: PAGE_TITLE,
            subtitle: PAGE_SUBTITLE,
            canonical_url,
            light_theme: snapshot.root_classes.contains(LIGHT_THEME_CLASS),
            toggle_label: snapshot.toggle_label.as_deref().unwrap_or_default(),
            toggle_pressed: snapshot.toggle_pressed.unwrap_or_default(),
            heading_hidden: snapshot.is_hidden(PagePart::Heading),
            subtitle_hidden: snapshot.is_hidden(PagePart::Subtitle),
            toolbar_hidden: snapshot.is_hidden(PagePart::Toolbar),
            links_hidden: snapshot.is_hidden(PagePart::LinksSection),
            list_hidden: snapshot.is_hidden(PagePart::List),
            detail_hidden: snapshot.is_hidden(PagePart::DetailSection),
            search_value: &snapshot.search_value,
            list_message: snapshot.list.as_ref().and_then(ListContent::message),
            cards: snapshot
                .list
                .as_ref()
                .map(ListContent::cards)
                .unwrap_or_default(),
            results_count: snapshot.results_count.as_deref().unwrap_or_default(),
            quick_links: snapshot.quick_links.as_deref().unwrap_or_default(),
            detail: snapshot.detail.as_ref().and_then(DetailContent::course),
            detail_message: snapshot.detail.as_ref().and_then(DetailContent::message),
            load_wasm,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="es">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>
    <link rel="canonical" href="{{ canonical_url }}">
    <link rel="stylesheet" href="/assets/style.css">
  </head>
  <body class="{% if light_theme %}light-theme{% endif %}">
    <main class="container">
      <h1 class="{% if heading_hidden %}hidden{% endif %}">{{ title }}</h1>
      <p class="subtitle{% if subtitle_hidden %} hidden{% endif %}">{{ subtitle }}</p>

      <div class="toolbar{% if toolbar_hidden %} hidden{% endif %}">
        <form method="get" action="index.html" role="search">
          <input id="search-input" type="search" name="q" value="{{ search_value }}" placeholder="Buscar por título…" aria-label="Buscar cursos" autocomplete="off">
        </form>
        <form method="post" action="/theme">
          <button id="theme-toggle" type="submit" class="btn btn-outline" aria-pressed="{{ toggle_pressed }}">{{ toggle_label }}</button>
        </form>
        <span id="results-count" aria-live="polite">{{ results_count }}</span>
      </div>

      <section id="courses-list" class="courses-grid{% if list_hidden %} hidden{% endif %}">
        {% if list_message.is_some() %}
        <p>{{ list_message.unwrap() }}</p>
        {% endif %}
        {% for card in cards %}
        <article class="course-card fade-in" tabindex="0" role="button" data-detail-href="{{ card.detail_href }}">
          <h2>{{ card.title }}</h2>
          <p class="course-desc">{{ card.description }}</p>
          <div class="course-actions">
            <a class="btn" href="{{ card.detail_href }}">{{ card.details_label }}</a>
            <a class="btn btn-outline" href="{{ card.external.href }}" target="{{ card.external.target }}" rel="{{ card.external.rel }}">{{ card.external.label }}</a>
          </div>
        </article>
        {% endfor %}
      </section>

      <section id="courses-links" class="{% if links_hidden %}hidden{% endif %}">
        <h2>Enlaces rápidos</h2>
        <ul id="links-list">
          {% for link in quick_links %}
          <li><a href="{{ link.href }}">{{ link.title }}</a></li>
          {% endfor %}
        </ul>
      </section>

      <section id="course-detail" class="{% if detail_hidden %}hidden{% endif %}">
        <a class="btn btn-outline" href="index.html">← Volver al catálogo</a>
        <div id="course-detail-content">
          {% match detail %}
          {% when Some with (course) %}
          <h1>{{ course.title }}</h1>
          <p class="course-desc">{{ course.description }}</p>
          <p><strong>Enlace:</strong> <a href="{{ course.external.href }}" target="{{ course.external.target }}" rel="{{ course.external.rel }}">{{ course.external.label }}</a></p>
          {% when None %}
          {% if detail_message.is_some() %}
          <p>{{ detail_message.unwrap() }}</p>
          {% endif %}
          {% endmatch %}
        </div>
      </section>
    </main>
    {% if load_wasm %}
    <script type="module">import init from "/pkg/course_catalog.js"; init();</script>
    {% endif %}
  </body>
</html>"#,
    ext = "html"
)]
struct PageTemplate<'a> {
    title: &'static str,
    subtitle: &'static str,
    canonical_url: String,
    light_theme: bool,
    toggle_label: &'a str,
    toggle_pressed: bool,
    heading_hidden: bool,
    subtitle_hidden: bool,
    toolbar_hidden: bool,
    links_hidden: bool,
    list_hidden: bool,
    detail_hidden: bool,
    search_value: &'a str,
    list_message: Option<&'static str>,
    cards: &'a [CourseCard],
    results_count: &'a str,
    quick_links: &'a [QuickLink],
    detail: Option<&'a CourseDetail>,
    detail_message: Option<&'static str>,
    load_wasm: bool,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="es">
  <head>
    <meta charset="utf-8" />
    <title>{{ title }}</title>
    <link rel="stylesheet" href="/assets/style.css">
  </head>
  <body>
    <main class="container">
      <h1>{{ title }}</h1>
      <p>{{ message }}</p>
      <a class="btn" href="index.html">Volver al catálogo</a>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ErrorTemplate {
    title: &'static str,
    message: String,
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use axum::{body, body::Body, http::Request};
    use tower::ServiceExt;

    fn state_with(catalog: Catalog) -> SharedState {
        Arc::new(AppState {
            catalog,
            base_url: "http://127.0.0.1:8080".to_string(),
            load_wasm: false,
        })
    }

    fn test_router() -> Router {
        build_router(state_with(Catalog::builtin()), None)
    }

    async fn get_html(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn list_page_renders_every_course() {
        let (status, _, html) = get_html(test_router(), get("/")).await;
        assert!(status.is_success());
        assert_eq!(html.matches("class=\"course-card fade-in\"").count(), 8);
        assert!(html.contains("8 cursos encontrados"));
        assert!(html.contains("<section id=\"course-detail\" class=\"hidden\">"));
        assert!(html.contains("<section id=\"courses-list\" class=\"courses-grid\">"));
        assert!(html.contains("role=\"button\""));
        assert!(html.contains("tabindex=\"0\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
        assert!(html.contains("href=\"index.html?id=1\""));
    }

    #[tokio::test]
    async fn detail_page_hides_the_list() {
        let (status, _, html) = get_html(test_router(), get("/index.html?id=3")).await;
        assert!(status.is_success());
        assert!(html.contains("<h1>Algoritmos y Complejidad</h1>"));
        assert!(html.contains("Abrir curso externo"));
        assert!(html.contains("<section id=\"course-detail\" class=\"\">"));
        assert!(html.contains("courses-grid hidden"));
        assert!(html.contains("toolbar hidden"));
        assert!(html.contains("subtitle hidden"));
        assert!(html.contains("<section id=\"courses-links\" class=\"hidden\">"));
        assert!(!html.contains("class=\"course-card"));
        assert!(html.contains("http://127.0.0.1:8080/index.html?id=3"));
    }

    #[tokio::test]
    async fn unknown_id_shows_not_found() {
        let (status, _, html) = get_html(test_router(), get("/?id=99")).await;
        assert!(status.is_success());
        assert!(html.contains("<p>Curso no encontrado.</p>"));
    }

    #[tokio::test]
    async fn search_query_filters_the_list() {
        let (_, _, html) = get_html(test_router(), get("/?q=datos")).await;
        assert_eq!(html.matches("class=\"course-card fade-in\"").count(), 2);
        assert!(html.contains("2 cursos encontrados"));
        assert!(html.contains("value=\"datos\""));

        let (_, _, html) = get_html(test_router(), get("/?q=cocina")).await;
        assert!(html.contains("No se encontraron cursos que coincidan con tu búsqueda."));
        assert!(html.contains("0 cursos encontrados"));
    }

    #[tokio::test]
    async fn unavailable_catalog_shows_fallback() {
        let router = build_router(state_with(Catalog::unavailable()), None);
        let (status, _, html) = get_html(router, get("/")).await;
        assert!(status.is_success());
        assert!(html.contains("No hay cursos disponibles."));
    }

    #[tokio::test]
    async fn course_text_is_escaped() {
        let catalog = Catalog::new(vec![Course {
            id: 1,
            title: "<script>alert(1)</script>".to_string(),
            description: "a & b".to_string(),
            url: "https://example.com/\"x".to_string(),
        }])
        .unwrap();
        let router = build_router(state_with(catalog), None);
        let (_, _, html) = get_html(router, get("/")).await;
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[tokio::test]
    async fn first_visit_stores_dark_theme() {
        let (_, headers, html) = get_html(test_router(), get("/")).await;
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("theme=dark"));
        assert!(html.contains("<body class=\"\">"));
        assert!(html.contains("aria-pressed=\"false\">Modo claro</button>"));
    }

    #[tokio::test]
    async fn light_cookie_applies_light_theme() {
        let request = Request::get("/")
            .header(header::COOKIE, "other=1; theme=light")
            .body(Body::empty())
            .unwrap();
        let (_, headers, html) = get_html(test_router(), request).await;
        assert!(headers.get(header::SET_COOKIE).is_none());
        assert!(html.contains("<body class=\"light-theme\">"));
        assert!(html.contains("aria-pressed=\"true\">Modo oscuro</button>"));
    }

    #[tokio::test]
    async fn theme_toggle_flips_cookie_and_redirects_back() {
        let request = Request::post("/theme")
            .header(header::COOKIE, "theme=dark")
            .header(header::REFERER, "http://127.0.0.1:8080/index.html?q=web")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/index.html?q=web"
        );
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("theme=light"));
    }

    #[tokio::test]
    async fn api_courses_filters_by_title() {
        let (status, _, body) = get_html(test_router(), get("/api/courses?q=WEB")).await;
        assert!(status.is_success());
        let payload: CoursesPayload = serde_json::from_str(&body).unwrap();
        assert_eq!(payload.count, 1);
        assert_eq!(payload.courses[0].id, 4);
        assert_eq!(payload.query, "WEB");
    }

    #[tokio::test]
    async fn api_course_reports_missing_and_invalid_ids() {
        let (status, _, body) = get_html(test_router(), get("/api/course?id=2")).await;
        assert!(status.is_success());
        let course: Course = serde_json::from_str(&body).unwrap();
        assert_eq!(course.title, "Estructuras de Datos");

        let (status, _, _) = get_html(test_router(), get("/api/course?id=99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = get_html(test_router(), get("/api/course?id=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stylesheet_is_served() {
        let (status, headers, body) = get_html(test_router(), get("/assets/style.css")).await;
        assert!(status.is_success());
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert!(body.contains(".hidden"));

        let (status, _, _) = get_html(test_router(), get("/assets/missing.css")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn theme_toggle_never_redirects_off_site() {
        let request = Request::post("/theme")
            .header(header::REFERER, "http://127.0.0.1:8080//evil.example/x")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[test]
    fn referer_is_reduced_to_a_local_path() {
        assert_eq!(
            referer_path("https://evil.example/index.html?id=2").as_deref(),
            Some("/index.html?id=2")
        );
        assert_eq!(referer_path("http://host").as_deref(), Some("/"));
        assert_eq!(referer_path("/?q=web").as_deref(), Some("/?q=web"));
        assert_eq!(referer_path("//evil.example/"), None);
        assert_eq!(referer_path("http://127.0.0.1:8080//evil.example/x"), None);
        assert_eq!(referer_path("http://127.0.0.1:8080/\\evil.example/x"), None);
        assert_eq!(referer_path("/\\evil.example/x"), None);
    }
}

//! REST API for the load planning service.
//!
//! Wraps the packing engine and the combination optimizer in JSON
//! endpoints. Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use load_it_now::combination::{
    Budget, CombinationCandidate, CombinationResult, FillMode, SeedFloor,
    optimize_combination_with_config,
};
use load_it_now::config::{ApiConfig, OptimizerConfig};
use load_it_now::error::ValidationError;
use load_it_now::model::{Container, ContainerShape, Dimension, Item, PlacedItem};
use load_it_now::optimizer::{
    PackingConfig, PackingResult, Termination, pack_with_config, pack_with_progress,
};
use load_it_now::orientation::Rotation;
use load_it_now::spatial::PlacementStrategy;
use load_it_now::units::{normalize_length, normalize_weight};

#[derive(Clone)]
struct ApiState {
    optimizer_config: OptimizerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>load-it-now API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// A candidate container. Either `dims` (rectangular) or `shape` must be
/// given; `shape` wins when both are present. `unit` applies to both.
#[derive(Deserialize, Clone, ToSchema)]
pub struct ContainerRequest {
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<[f64; 3]>, example = json!([50.0, 30.0, 40.0]))]
    pub dims: Option<(f64, f64, f64)>,
    #[serde(default)]
    pub shape: Option<ContainerShape>,
    #[serde(default)]
    #[schema(example = "cm")]
    pub unit: Option<String>,
}

impl ContainerRequest {
    fn into_container(self) -> Result<Container, ValidationError> {
        let unit = self.unit.as_deref().unwrap_or("cm");
        let shape = match (self.shape, self.dims) {
            (Some(shape), _) => shape.scaled(normalize_length(1.0, unit)),
            (None, Some(dims)) => return Ok(Container::from_units(dims, unit)?.with_label(self.name)),
            (None, None) => {
                return Err(ValidationError::InvalidDimension(
                    "container needs either dims or shape".to_string(),
                ));
            }
        };
        Ok(Container::new(shape)?.with_label(self.name))
    }
}

#[derive(Deserialize, Clone, ToSchema)]
pub struct ItemRequest {
    #[serde(default)]
    pub id: Option<usize>,
    #[schema(value_type = [f64; 3], example = json!([10.0, 10.0, 5.0]))]
    pub dims: (f64, f64, f64),
    #[serde(default)]
    #[schema(example = "cm")]
    pub unit: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    #[schema(example = "kg")]
    pub weight_unit: Option<String>,
}

impl ItemRequest {
    fn into_item(self) -> Result<Item, ValidationError> {
        let dims = Dimension::from_units(self.dims, self.unit.as_deref().unwrap_or("cm"))?;
        let item = Item::new(self.id.unwrap_or(0), dims);
        match self.weight {
            Some(weight) => item.with_weight(normalize_weight(
                weight,
                self.weight_unit.as_deref().unwrap_or("kg"),
            )),
            None => Ok(item),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "containers": [
            { "name": "Carton A", "dims": [50.0, 30.0, 40.0], "unit": "cm" },
            { "name": "Drum", "shape": { "kind": "cylindrical", "radius": 30.0, "height": 60.0 } }
        ],
        "item": { "dims": [10.0, 10.0, 5.0], "unit": "cm" },
        "allow_rotations": true,
        "strategy": "guillotine"
    })
)]
pub struct PackRequest {
    pub containers: Vec<ContainerRequest>,
    pub item: ItemRequest,
    #[serde(default)]
    #[schema(nullable = true)]
    pub allow_rotations: Option<bool>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub strategy: Option<PlacementStrategy>,
}

#[derive(Debug)]
struct ValidatedPackRequest {
    containers: Vec<Container>,
    item: Item,
    allow_rotations: Option<bool>,
    strategy: Option<PlacementStrategy>,
}

impl ValidatedPackRequest {
    fn packing_config(&self, base: PackingConfig) -> PackingConfig {
        let mut config = base;
        if let Some(allow_rotations) = self.allow_rotations {
            config.allow_item_rotation = allow_rotations;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        config
    }
}

#[derive(Debug)]
enum PackRequestValidationError {
    MissingContainers,
    InvalidContainer(usize, ValidationError),
    InvalidItem(ValidationError),
}

impl PackRequest {
    fn into_validated(self) -> Result<ValidatedPackRequest, PackRequestValidationError> {
        if self.containers.is_empty() {
            return Err(PackRequestValidationError::MissingContainers);
        }

        let containers = self
            .containers
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| {
                spec.into_container()
                    .map_err(|err| PackRequestValidationError::InvalidContainer(idx, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let item = self
            .item
            .into_item()
            .map_err(PackRequestValidationError::InvalidItem)?;

        Ok(ValidatedPackRequest {
            containers,
            item,
            allow_rotations: self.allow_rotations,
            strategy: self.strategy,
        })
    }
}

/// Per-container results in request order.
#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    pub results: Vec<ContainerResult>,
    /// Index of the container holding the most items (first on ties),
    /// absent when no container holds any.
    pub best_container: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct ContainerResult {
    pub index: usize,
    pub label: Option<String>,
    pub shape: ContainerShape,
    /// Axis-aligned box items were packed into, in cm.
    #[schema(value_type = [f64; 3], example = json!([50.0, 30.0, 40.0]))]
    pub loading_box: (f64, f64, f64),
    pub placed_count: usize,
    /// Total weight of the placed items in kg, when the item has a weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_weight: Option<f64>,
    pub theoretical_max: usize,
    pub utilization: f64,
    pub iterations: usize,
    pub termination: Termination,
    pub strategy: PlacementStrategy,
    pub placed: Vec<PlacedObject>,
}

/// One placement, in commit order.
#[derive(Serialize, ToSchema)]
pub struct PlacedObject {
    pub sequence: usize,
    pub item_id: usize,
    /// Minimum corner (x = length, y = width, z = height).
    #[schema(value_type = [f64; 3], example = json!([0.0, 0.0, 0.0]))]
    pub pos: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([10.0, 10.0, 5.0]))]
    pub dims: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([5.0, 5.0, 2.5]))]
    pub center: (f64, f64, f64),
    pub rotated: bool,
    pub rotation: Rotation,
}

impl From<&PlacedItem> for PlacedObject {
    fn from(placed: &PlacedItem) -> Self {
        Self {
            sequence: placed.sequence,
            item_id: placed.item_id,
            pos: placed.position,
            dims: placed.dims(),
            center: placed.center(),
            rotated: placed.rotated(),
            rotation: placed.orientation.rotation,
        }
    }
}

impl ContainerResult {
    fn new(index: usize, container: &Container, item: &Item, result: PackingResult) -> Self {
        Self {
            index,
            label: container.label.clone(),
            shape: container.shape,
            loading_box: container.loading_box().as_tuple(),
            placed_count: result.placed_count(),
            loaded_weight: item.loaded_weight(result.placed_count()),
            theoretical_max: result.theoretical_max,
            utilization: result.utilization,
            iterations: result.iterations,
            termination: result.termination,
            strategy: result.strategy,
            placed: result.placements.iter().map(PlacedObject::from).collect(),
        }
    }
}

impl PackResponse {
    fn from_results(results: Vec<ContainerResult>) -> Self {
        let mut best: Option<&ContainerResult> = None;
        for result in &results {
            if result.placed_count > 0
                && best.is_none_or(|current| result.placed_count > current.placed_count)
            {
                best = Some(result);
            }
        }
        let best_container = best.map(|result| result.index);
        Self {
            results,
            best_container,
        }
    }
}

#[derive(Deserialize, Clone, ToSchema)]
pub struct CandidateRequest {
    pub name: String,
    /// "LxWxH" string; alternative to `unit_volume`.
    #[serde(default)]
    #[schema(example = "10x10x5")]
    pub dims: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Unit volume in cm³; used when `dims` is absent.
    #[serde(default)]
    pub unit_volume: Option<f64>,
    pub unit_weight: f64,
    #[serde(default)]
    pub weight_unit: Option<String>,
}

impl CandidateRequest {
    fn into_candidate(self) -> Result<CombinationCandidate, ValidationError> {
        let weight = normalize_weight(self.unit_weight, self.weight_unit.as_deref().unwrap_or("kg"));
        match (self.dims.as_deref(), self.unit_volume) {
            (Some(raw), _) => {
                let parsed: Dimension = raw.parse()?;
                let dims =
                    Dimension::from_units(parsed.as_tuple(), self.unit.as_deref().unwrap_or("cm"))?;
                CombinationCandidate::from_dimension(self.name, &dims, weight)
            }
            (None, Some(volume)) => CombinationCandidate::new(self.name, weight, volume),
            (None, None) => Err(ValidationError::InvalidDimension(format!(
                "candidate '{}' needs either dims or unit_volume",
                self.name
            ))),
        }
    }
}

/// Volume ceiling from `max_volume` (cm³) or from `container`.
#[derive(Deserialize, Clone, ToSchema)]
pub struct BudgetRequest {
    #[serde(default)]
    pub max_volume: Option<f64>,
    #[serde(default)]
    pub container: Option<ContainerRequest>,
    pub max_weight: f64,
    #[serde(default)]
    pub weight_unit: Option<String>,
}

impl BudgetRequest {
    fn into_budget(self) -> Result<Budget, ValidationError> {
        let max_weight =
            normalize_weight(self.max_weight, self.weight_unit.as_deref().unwrap_or("kg"));
        match (self.container, self.max_volume) {
            (Some(container), _) => Budget::from_container(&container.into_container()?, max_weight),
            (None, Some(volume)) => Budget::new(volume, max_weight),
            (None, None) => Err(ValidationError::InvalidDimension(
                "budget needs either max_volume or container".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "candidates": [
            { "name": "A", "unit_weight": 5.0, "unit_volume": 2.0 },
            { "name": "B", "unit_weight": 3.0, "dims": "1x1x1" }
        ],
        "budget": { "max_volume": 10.0, "max_weight": 20.0 },
        "fill_mode": "round_robin"
    })
)]
pub struct CombinationRequest {
    pub candidates: Vec<CandidateRequest>,
    pub budget: BudgetRequest,
    #[serde(default)]
    #[schema(nullable = true)]
    pub fill_mode: Option<FillMode>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub seed: Option<SeedFloor>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn container_config_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid container configuration",
        details,
    )
}

fn parse_pack_request(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<ValidatedPackRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    match payload.into_validated() {
        Ok(validated) => Ok(validated),
        Err(PackRequestValidationError::MissingContainers) => Err(validation_error(
            "At least one container must be specified",
        )),
        Err(PackRequestValidationError::InvalidContainer(idx, err)) => Err(
            container_config_error(format!("container {}: {}", idx, err)),
        ),
        Err(PackRequestValidationError::InvalidItem(err)) => Err(validation_error(err.to_string())),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack, handle_pack_stream, handle_combination),
    components(
        schemas(
            PackRequest,
            ContainerRequest,
            ItemRequest,
            PackResponse,
            ContainerResult,
            PlacedObject,
            CombinationRequest,
            CandidateRequest,
            BudgetRequest,
            CombinationResult,
            CombinationCandidate,
            ErrorResponse,
            ContainerShape,
            PlacementStrategy,
            Termination,
            Rotation,
            FillMode,
            SeedFloor
        )
    ),
    tags(
        (name = "packing", description = "Single-type container loading"),
        (name = "combination", description = "Multi-type allocation under a budget")
    )
)]
struct ApiDoc;

fn router(optimizer_config: OptimizerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { optimizer_config };

    Router::new()
        .route("/pack", post(handle_pack))
        .route("/pack_stream", post(handle_pack_stream))
        .route("/combination", post(handle_combination))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until the server terminates.
pub async fn start_api_server(
    config: ApiConfig,
    optimizer_config: OptimizerConfig,
) -> std::io::Result<()> {
    let app = router(optimizer_config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        host = config.display_host(),
        port = config.port(),
        "server listening on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        tracing::info!("local access: http://localhost:{}", config.port());
    }
    tracing::info!("endpoints: POST /pack, POST /pack_stream, POST /combination, GET /docs");

    axum::serve(listener, app).await
}

/// Handler for POST /pack.
///
/// Runs one independent packing run per requested container.
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Packing results per container", body = PackResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request or container configuration",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.packing_config(state.optimizer_config.packing_config());
    tracing::info!(
        containers = request.containers.len(),
        item = ?request.item.dims.as_tuple(),
        strategy = %config.strategy,
        "pack request"
    );

    let mut results = Vec::with_capacity(request.containers.len());
    for (index, container) in request.containers.iter().enumerate() {
        match pack_with_config(container, &request.item, config) {
            Ok(result) => {
                results.push(ContainerResult::new(index, container, &request.item, result))
            }
            Err(err) => {
                return container_config_error(format!("container {}: {}", index, err));
            }
        }
    }

    let response = PackResponse::from_results(results);
    tracing::info!(best_container = ?response.best_container, "pack request finished");
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /pack_stream (SSE).
///
/// Streams `PackEvent`s for the first container as Server-Sent Events so a
/// client can animate placements as they are committed.
#[utoipa::path(
    post,
    path = "/pack_stream",
    request_body = PackRequest,
    responses(
        (
            status = 200,
            description = "Streams pack events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request or container configuration",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.packing_config(state.optimizer_config.packing_config());
    if let Err(err) = config.validate() {
        return validation_error(err.to_string());
    }
    let ValidatedPackRequest {
        mut containers,
        item,
        ..
    } = request;
    let container = containers.swap_remove(0);

    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let outcome = pack_with_progress(&container, &item, config, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver means the client went away.
                let _ = tx.blocking_send(json);
            }
        });
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "streamed packing run rejected");
            let payload = serde_json::json!({ "type": "Error", "details": err.to_string() });
            let _ = tx.blocking_send(payload.to_string());
        }
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for POST /combination.
#[utoipa::path(
    post,
    path = "/combination",
    request_body = CombinationRequest,
    responses(
        (status = 200, description = "Quantities per item type", body = CombinationResult),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid candidates or budget", body = ErrorResponse)
    ),
    tag = "combination"
)]
async fn handle_combination(
    State(state): State<ApiState>,
    payload: Result<Json<CombinationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let candidates = match request
        .candidates
        .into_iter()
        .map(CandidateRequest::into_candidate)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(candidates) => candidates,
        Err(err) => return validation_error(err.to_string()),
    };
    if candidates.is_empty() {
        return validation_error("At least one candidate must be specified");
    }
    let budget = match request.budget.into_budget() {
        Ok(budget) => budget,
        Err(err) => return validation_error(err.to_string()),
    };

    let mut config = state.optimizer_config.combination_config();
    if let Some(mode) = request.fill_mode {
        config.fill_mode = mode;
    }
    if let Some(seed) = request.seed {
        config.seed = seed;
    }

    tracing::info!(
        candidates = candidates.len(),
        max_volume = budget.max_volume,
        max_weight = budget.max_weight,
        fill_mode = %config.fill_mode,
        "combination request"
    );
    match optimize_combination_with_config(candidates, budget, config) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => validation_error(err.to_string()),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

use crate::application::{DataSourceService, SelectionService};
use crate::domain::datasource::{DataSourceKind, NewDataSource};
use crate::domain::error::{AppError, Result};
use crate::domain::table::TablePatch;
use actix_cors::Cors;
use actix_web::{dev::Server, get, patch, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use validator::Validate;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub datasources: Arc<DataSourceService>,
    pub selections: Arc<SelectionService>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDataSourceRequest {
    pub kind: DataSourceKind,
    #[serde(default)]
    #[validate(url)]
    pub url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub analyzed_data_url: Option<String>,
    #[validate(length(min = 1))]
    pub data_file: String,
    #[validate(length(min = 1))]
    pub analyzed_file: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSelectionRequest {
    #[validate(length(min = 1, message = "at least one table is required"))]
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSelectionRequest {
    #[validate(length(min = 1))]
    pub headings_type: String,
}

fn lock_logs(logs: &Mutex<Vec<LogEntry>>) -> MutexGuard<'_, Vec<LogEntry>> {
    logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = json!({ "detail": err.to_string() });
    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::ValidationError(_) | AppError::UnsupportedHeadingsType(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::MissingTable(_) | AppError::ParseError(_) => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        AppError::IoError(_) | AppError::Internal(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

/// Log a failed request and turn the error into a response.
fn failure(data: &HttpState, action: &str, err: AppError) -> HttpResponse {
    tracing::warn!(error = %err, action, "Request failed");
    add_log(
        &data.logs,
        "ERROR",
        "HttpApi",
        &format!("{} failed: {}", action, err),
    );
    error_response(&err)
}

fn respond<T: Serialize>(data: &HttpState, action: &str, result: Result<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => failure(data, action, e),
    }
}

fn validated<T: Validate>(req: &T) -> Result<()> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

#[post("/datasources")]
async fn create_datasource(
    data: web::Data<HttpState>,
    req: web::Json<CreateDataSourceRequest>,
) -> impl Responder {
    if let Err(e) = validated(&*req) {
        return failure(&data, "Register data source", e);
    }
    let req = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Registering {:?} data source", req.kind),
    );

    let result = data
        .datasources
        .register(NewDataSource {
            kind: req.kind,
            url: req.url,
            analyzed_data_url: req.analyzed_data_url,
            data_file: PathBuf::from(req.data_file),
            analyzed_file: PathBuf::from(req.analyzed_file),
        })
        .await;
    match result {
        Ok(datasource) => HttpResponse::Created().json(datasource),
        Err(e) => failure(&data, "Register data source", e),
    }
}

#[get("/datasources/{id}")]
async fn get_datasource(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.datasources.get(path.into_inner()).await;
    respond(&data, "Get data source", result)
}

#[post("/datasources/{id}/selections")]
async fn create_selection(
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateSelectionRequest>,
) -> impl Responder {
    if let Err(e) = validated(&*req) {
        return failure(&data, "Create selection", e);
    }
    let datasource_id = path.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Creating selection of {}", req.tables.join(", ")),
    );

    match data
        .selections
        .create_selection(datasource_id, req.into_inner().tables)
        .await
    {
        Ok(selection) => HttpResponse::Created().json(selection),
        Err(e) => failure(&data, "Create selection", e),
    }
}

#[get("/datasources/{id}/selections")]
async fn list_selections(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.selections.list_selections(path.into_inner()).await;
    respond(&data, "List selections", result)
}

#[get("/datasources/{id}/selections/{sid}")]
async fn get_selection(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (datasource_id, selection_id) = path.into_inner();
    let result = data
        .selections
        .get_selection(datasource_id, selection_id)
        .await;
    respond(&data, "Get selection", result)
}

#[patch("/datasources/{id}/selections/{sid}")]
async fn update_selection(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<UpdateSelectionRequest>,
) -> impl Responder {
    if let Err(e) = validated(&*req) {
        return failure(&data, "Update headings type", e);
    }
    let (datasource_id, selection_id) = path.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Switching headings type to {}", req.headings_type),
    );

    let result = data
        .selections
        .update_headings_type(datasource_id, selection_id, &req.headings_type)
        .await;
    respond(&data, "Update headings type", result)
}

#[get("/datasources/{id}/selections/{sid}/tables")]
async fn list_tables(data: web::Data<HttpState>, path: web::Path<(Uuid, Uuid)>) -> impl Responder {
    let (datasource_id, selection_id) = path.into_inner();
    let result = data.selections.list_tables(datasource_id, selection_id).await;
    respond(&data, "List tables", result)
}

#[get("/datasources/{id}/selections/{sid}/tables/{tid}")]
async fn get_table(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> impl Responder {
    let (datasource_id, selection_id, table_id) = path.into_inner();
    let result = data
        .selections
        .get_table(datasource_id, selection_id, table_id)
        .await;
    respond(&data, "Get table", result)
}

#[patch("/datasources/{id}/selections/{sid}/tables/{tid}")]
async fn update_table(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    req: web::Json<TablePatch>,
) -> impl Responder {
    let (datasource_id, selection_id, table_id) = path.into_inner();
    let result = data
        .selections
        .update_table(datasource_id, selection_id, table_id, req.into_inner())
        .await;
    respond(&data, "Update table", result)
}

#[get("/datasources/{id}/selections/{sid}/tables/{tid}/preview")]
async fn table_preview(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> impl Responder {
    let (datasource_id, selection_id, table_id) = path.into_inner();
    let result = data
        .selections
        .table_preview(datasource_id, selection_id, table_id)
        .await;
    respond(&data, "Preview table", result)
}

#[get("/datasources/{id}/selections/{sid}/options")]
async fn flatten_options(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (datasource_id, selection_id) = path.into_inner();
    let result = data
        .selections
        .flatten_options(datasource_id, selection_id)
        .await;
    respond(&data, "Build flatten options", result)
}

#[get("/datasources/{id}/selections/{sid}/export")]
async fn export_request(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (datasource_id, selection_id) = path.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Preparing export of selection {}", selection_id),
    );
    let result = data
        .selections
        .export_request(datasource_id, selection_id)
        .await;
    respond(&data, "Prepare export", result)
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = lock_logs(&data.logs);
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = lock_logs(logs);
    logs.push(entry);
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
}

/// Register every route of the `/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(create_datasource)
            .service(get_datasource)
            .service(create_selection)
            .service(list_selections)
            .service(get_selection)
            .service(update_selection)
            .service(list_tables)
            .service(get_table)
            .service(update_table)
            .service(table_preview)
            .service(flatten_options)
            .service(export_request)
            .service(get_logs),
    );
}

pub fn start_server(state: HttpState, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{dictionary, TempDir, ANALYZED_FIXTURE};
    use crate::application::{ColumnHeadingResolver, PreviewMaterializer};
    use crate::domain::datasource::DataSource;
    use crate::domain::selection::Selection;
    use crate::domain::table::Table;
    use crate::infrastructure::repository::InMemoryRepository;
    use actix_web::test as actix_test;
    use serde_json::Value;

    fn state(dir: &TempDir) -> web::Data<HttpState> {
        let repository = Arc::new(InMemoryRepository::new());
        let resolver = ColumnHeadingResolver::new(Arc::new(dictionary()));
        let previews = PreviewMaterializer::new(dir.path.join("previews"));
        web::Data::new(HttpState {
            datasources: Arc::new(DataSourceService::new(repository.clone(), 2, dir.path.clone())),
            selections: Arc::new(SelectionService::new(repository, resolver, previews)),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn register_body(dir: &TempDir) -> Value {
        let analyzed_file = dir.path.join("analyzed.json");
        std::fs::write(&analyzed_file, ANALYZED_FIXTURE).unwrap();
        json!({
            "kind": "upload",
            "data_file": dir.path.join("dataset.json").display().to_string(),
            "analyzed_file": analyzed_file.display().to_string(),
        })
    }

    #[actix_web::test]
    async fn test_selection_workflow() {
        let dir = TempDir::new("flatten-select-http");
        let app = actix_test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/datasources")
            .set_json(register_body(&dir))
            .to_request();
        let datasource: DataSource = actix_test::call_and_read_body_json(&app, req).await;

        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/datasources/{}/selections", datasource.id))
            .set_json(json!({"tables": ["parties"]}))
            .to_request();
        let selection: Selection = actix_test::call_and_read_body_json(&app, req).await;
        let base = format!(
            "/api/datasources/{}/selections/{}",
            datasource.id, selection.id
        );

        let req = actix_test::TestRequest::patch()
            .uri(&format!("{}/tables/{}", base, selection.tables[0].id))
            .set_json(json!({"split": true}))
            .to_request();
        let parties: Table = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(parties.array_tables.len(), 2);

        let req = actix_test::TestRequest::get()
            .uri(&format!("{}/tables/{}/preview", base, parties.id))
            .to_request();
        let previews: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(previews.as_array().unwrap().len(), 3);

        let req = actix_test::TestRequest::get()
            .uri(&format!("{}/options", base))
            .to_request();
        let options: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            options,
            json!({"selection": {
                "parties": {"split": true},
                "parties_roles": {"split": false},
                "parties_additionalIdentifiers": {"split": false}
            }})
        );
    }

    #[actix_web::test]
    async fn test_unsupported_headings_type_is_bad_request() {
        let dir = TempDir::new("flatten-select-http");
        let app = actix_test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/datasources")
            .set_json(register_body(&dir))
            .to_request();
        let datasource: DataSource = actix_test::call_and_read_body_json(&app, req).await;
        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/datasources/{}/selections", datasource.id))
            .set_json(json!({"tables": ["awards"]}))
            .to_request();
        let selection: Selection = actix_test::call_and_read_body_json(&app, req).await;

        let req = actix_test::TestRequest::patch()
            .uri(&format!(
                "/api/datasources/{}/selections/{}",
                datasource.id, selection.id
            ))
            .set_json(json!({"headings_type": "fr_user_friendly"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("en_user_friendly"));
    }

    #[actix_web::test]
    async fn test_missing_table_is_unprocessable() {
        let dir = TempDir::new("flatten-select-http");
        let app = actix_test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/datasources")
            .set_json(register_body(&dir))
            .to_request();
        let datasource: DataSource = actix_test::call_and_read_body_json(&app, req).await;

        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/datasources/{}/selections", datasource.id))
            .set_json(json!({"tables": ["contracts"]}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
    }

    #[actix_web::test]
    async fn test_validation_and_not_found() {
        let dir = TempDir::new("flatten-select-http");
        let data = state(&dir);
        let app = actix_test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let mut body = register_body(&dir);
        body["url"] = json!("not a url");
        let req = actix_test::TestRequest::post()
            .uri("/api/datasources")
            .set_json(body)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/datasources/{}", Uuid::new_v4()))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(logs.iter().any(|entry| entry.level == "ERROR"));
    }

    #[test]
    fn test_log_ring_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("message {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "message 5");
    }
}

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Members returned per `categorymembers` page unless `cmlimit` asks for fewer.
pub const PAGE_SIZE: usize = 2;

#[derive(Clone, Debug, Serialize)]
pub struct CategoryMember {
    pub ns: i64,
    pub title: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Revision {
    pub timestamp: String,
    pub user: String,
    pub comment: String,
    pub size: i64,
    pub width: i64,
    pub height: i64,
    pub url: String,
    pub sha1: String,
    pub mime: String,
    pub canonicaltitle: String,
}

#[derive(Clone, Debug)]
pub struct FilePage {
    pub pageid: i64,
    pub revisions: Vec<Revision>,
}

/// Read-only fixture wiki served by `app`.
#[derive(Clone, Debug, Default)]
pub struct Wiki {
    pub namespaces: Vec<(i64, String)>,
    pub categories: HashMap<String, Vec<CategoryMember>>,
    pub files: HashMap<String, FilePage>,
}

impl Wiki {
    pub fn fixture() -> Self {
        let namespaces = vec![
            (0, String::new()),
            (2, "User".to_string()),
            (6, "File".to_string()),
            (14, "Category".to_string()),
        ];

        let members = ["Pont Neuf", "Pont des Arts", "Pont Alexandre III", "File:Pont Neuf.jpg", "Pont Marie"]
            .iter()
            .map(|t| CategoryMember {
                ns: if t.starts_with("File:") { 6 } else { 0 },
                title: t.to_string(),
            })
            .collect();
        let mut categories = HashMap::new();
        categories.insert("Category:Bridges in Paris".to_string(), members);
        categories.insert("Category:Empty".to_string(), Vec::new());

        let revision = |timestamp: &str, size: i64, sha1: &str| Revision {
            timestamp: timestamp.to_string(),
            user: "Photographer".to_string(),
            comment: "upload".to_string(),
            size,
            width: 1600,
            height: 1200,
            url: "https://upload.example.org/a/ab/Pont_Neuf.jpg".to_string(),
            sha1: sha1.to_string(),
            mime: "image/jpeg".to_string(),
            canonicaltitle: "File:Pont Neuf.jpg".to_string(),
        };
        let mut files = HashMap::new();
        files.insert(
            "File:Pont Neuf.jpg".to_string(),
            FilePage {
                pageid: 4242,
                revisions: vec![
                    revision("2012-05-01T10:00:00Z", 204800, "1111111111111111111111111111111111111111"),
                    revision("2015-08-20T12:30:00Z", 307200, "2222222222222222222222222222222222222222"),
                ],
            },
        );

        Self {
            namespaces,
            categories,
            files,
        }
    }
}

pub type Db = Arc<Wiki>;

pub fn app() -> Router {
    app_with(Wiki::fixture())
}

pub fn app_with(wiki: Wiki) -> Router {
    Router::new()
        .route("/w/api.php", get(api))
        .with_state(Arc::new(wiki))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn api(State(db): State<Db>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let action = params.get("action").map(String::as_str).unwrap_or_default();
    if action != "query" {
        return Json(api_error(
            "badvalue",
            &format!("Unrecognized value for parameter \"action\": {action}."),
        ));
    }

    let mut query = Map::new();
    let mut body = Map::new();

    if params.get("list").map(String::as_str) == Some("categorymembers") {
        match category_members(&db, &params, &mut query) {
            Ok(Some(cont)) => {
                body.insert("continue".to_string(), cont);
            }
            Ok(None) => {}
            Err(error) => return Json(error),
        }
    }
    if params.get("meta").map(String::as_str) == Some("siteinfo") {
        query.insert("namespaces".to_string(), namespaces(&db));
    }
    if params.get("prop").map(String::as_str) == Some("imageinfo") {
        query.insert("pages".to_string(), image_info(&db, &params));
    }

    if !body.contains_key("continue") {
        body.insert("batchcomplete".to_string(), json!(""));
    }
    if !query.is_empty() {
        body.insert("query".to_string(), Value::Object(query));
    }
    Json(Value::Object(body))
}

fn api_error(code: &str, info: &str) -> Value {
    json!({"error": {"code": code, "info": info}})
}

/// Fills `query.categorymembers` and returns the `continue` object when more
/// members remain.
fn category_members(
    db: &Wiki,
    params: &HashMap<String, String>,
    query: &mut Map<String, Value>,
) -> Result<Option<Value>, Value> {
    let Some(title) = params.get("cmtitle") else {
        return Err(api_error("nocmtitle", "The \"cmtitle\" parameter must be set."));
    };
    let limit = params
        .get("cmlimit")
        .and_then(|l| l.parse::<usize>().ok())
        .map_or(PAGE_SIZE, |l| l.clamp(1, PAGE_SIZE));
    let offset = match params.get("cmcontinue") {
        Some(token) => match token.strip_prefix("page|").and_then(|o| o.parse::<usize>().ok()) {
            Some(offset) => offset,
            None => return Err(api_error("badcontinue", "Invalid continue param.")),
        },
        None => 0,
    };

    let members = db.categories.get(title).map(Vec::as_slice).unwrap_or_default();
    let page: Vec<&CategoryMember> = members.iter().skip(offset).take(limit).collect();
    query.insert("categorymembers".to_string(), json!(page));

    let next = offset + page.len();
    Ok((next < members.len()).then(|| json!({"cmcontinue": format!("page|{next}"), "continue": "-||"})))
}

fn namespaces(db: &Wiki) -> Value {
    let table: Map<String, Value> = db
        .namespaces
        .iter()
        .map(|(id, name)| (id.to_string(), json!({"id": id, "case": "first-letter", "*": name})))
        .collect();
    Value::Object(table)
}

fn image_info(db: &Wiki, params: &HashMap<String, String>) -> Value {
    let mut pages = Map::new();
    let titles = params.get("titles").map(String::as_str).unwrap_or_default();
    for (i, title) in titles.split('|').filter(|t| !t.is_empty()).enumerate() {
        match db.files.get(title) {
            Some(file) => {
                let mut revisions = file.revisions.clone();
                revisions.reverse();
                pages.insert(
                    file.pageid.to_string(),
                    json!({"pageid": file.pageid, "ns": 6, "title": title, "imageinfo": revisions}),
                );
            }
            None => {
                pages.insert(
                    format!("-{}", i + 1),
                    json!({"ns": 6, "title": title, "missing": "", "imagerepository": ""}),
                );
            }
        }
    }
    Value::Object(pages)
}

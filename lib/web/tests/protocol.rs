use adhs_store::SharedStore;
use adhs_web::{create_router, AppState};
use axum::body::Bytes;
use axum::http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use std::time::Duration;

fn state(base_path: &str, query_timeout: Option<Duration>) -> AppState {
    AppState {
        store: SharedStore::new().unwrap(),
        base_path: base_path.to_owned(),
        source: "data.ttl".to_owned(),
        query_timeout,
    }
}

fn server() -> TestServer {
    TestServer::new(create_router(state("", None))).unwrap()
}

async fn insert(server: &TestServer, update: &'static str) {
    server
        .post("/sparql")
        .bytes(Bytes::from_static(update.as_bytes()))
        .content_type("application/sparql-update")
        .await
        .assert_status_ok();
}

async fn select_csv(server: &TestServer, query: &str) -> String {
    let response = server
        .get("/sparql")
        .add_query_param("query", query)
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;
    response.assert_status_ok();
    response.text()
}

async fn count_triples(server: &TestServer) -> String {
    select_csv(server, "SELECT (COUNT(*) AS ?c) WHERE { ?s ?p ?o }").await
}

#[tokio::test]
async fn root_redirects_to_endpoint() {
    let response = server().get("/").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header(LOCATION), "/sparql");

    let response = server().post("/").await;
    response.assert_status(StatusCode::FOUND);
}

#[tokio::test]
async fn base_path_prefixes_routes() {
    let server = TestServer::new(create_router(state("/adhs", None))).unwrap();

    let response = server.get("/adhs").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header(LOCATION), "/adhs/sparql");

    server
        .get("/adhs/sparql")
        .add_query_param("query", "ASK {}")
        .await
        .assert_status_ok();
    server
        .get("/sparql")
        .add_query_param("query", "ASK {}")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn missing_query_is_bad_request() {
    let response = server().get("/sparql").await;
    response.assert_status_bad_request();
    assert!(response.text().contains("No query or update given"));
}

#[tokio::test]
async fn missing_query_shows_form_to_browsers() {
    let response = server()
        .get("/sparql")
        .add_header(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "text/html; charset=utf-8");
    let page = response.text();
    assert!(page.contains("data.ttl"));
    assert!(page.contains(r#"name="query""#));
}

#[tokio::test]
async fn select_as_sparql_json() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "SELECT ?s WHERE { ?s ?p ?o }")
        .add_header(ACCEPT, HeaderValue::from_static("application/sparql-results+json"))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header(CONTENT_TYPE),
        "application/sparql-results+json"
    );
    assert!(response.text().contains(r#""results""#));
}

#[tokio::test]
async fn select_defaults_to_sparql_xml() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "SELECT ?s ?p ?o WHERE { ?s ?p ?o } LIMIT 0")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header(CONTENT_TYPE),
        "application/sparql-results+xml"
    );
    let body = response.text();
    assert!(body.contains("<sparql"));
    assert!(!body.contains("<result>"));
}

#[tokio::test]
async fn accept_parameters_are_ignored() {
    let server = server();
    for (accept, content_type) in [
        ("text/csv; charset=utf-8", "text/csv"),
        (
            "application/sparql-results+json;charset=UTF-8",
            "application/sparql-results+json",
        ),
    ] {
        let response = server
            .get("/sparql")
            .add_query_param("query", "SELECT ?s WHERE { ?s ?p ?o }")
            .add_header(ACCEPT, HeaderValue::from_static(accept))
            .await;
        response.assert_status_ok();
        assert_eq!(response.header(CONTENT_TYPE), content_type);
    }
}

#[tokio::test]
async fn head_request_is_answered() {
    let response = server()
        .method(Method::HEAD, "/sparql")
        .add_query_param("query", "ASK {}")
        .add_header(ACCEPT, HeaderValue::from_static("application/json"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "application/json");
}

#[tokio::test]
async fn property_path_query() {
    let server = server();
    insert(
        &server,
        "INSERT DATA { <urn:a> <urn:p> <urn:b> . <urn:b> <urn:p> <urn:c> }",
    )
    .await;

    let body = select_csv(&server, "SELECT ?o WHERE { <urn:a> <urn:p>+ ?o } ORDER BY ?o").await;
    assert_eq!(body, "o\r\nurn:b\r\nurn:c\r\n");
}

#[tokio::test]
async fn construct_defaults_to_turtle() {
    let server = server();
    insert(&server, "INSERT DATA { <urn:a> <urn:b> <urn:c> }").await;

    let response = server
        .get("/sparql")
        .add_query_param("query", "CONSTRUCT WHERE { ?s ?p ?o }")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "text/turtle");
    assert!(response.text().contains("<urn:a> <urn:b> <urn:c>"));
}

#[tokio::test]
async fn construct_as_csv_is_not_acceptable() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "CONSTRUCT WHERE { ?s ?p ?o }")
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;
    response.assert_status(StatusCode::NOT_ACCEPTABLE);
    assert!(response.text().contains("text/csv"));
}

#[tokio::test]
async fn ask_as_html_table() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "ASK {}")
        .add_header(ACCEPT, HeaderValue::from_static("text/html"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "text/html");
    let body = response.text();
    assert!(body.contains("<th>boolean</th>"));
    assert!(body.contains("<td>true</td>"));
}

#[tokio::test]
async fn insert_then_select() {
    let server = server();
    insert(&server, "INSERT DATA { <urn:a> <urn:b> <urn:c> }").await;

    let body = select_csv(&server, "SELECT ?p ?o WHERE { <urn:a> ?p ?o }").await;
    assert_eq!(body, "p,o\r\nurn:b,urn:c\r\n");
}

#[tokio::test]
async fn update_returns_empty_body() {
    let response = server()
        .post("/sparql")
        .form(&[("update", "INSERT DATA { <urn:a> <urn:b> <urn:c> }")])
        .await;
    response.assert_status_ok();
    assert!(response.as_bytes().is_empty());
}

#[tokio::test]
async fn form_query() {
    let server = server();
    insert(&server, "INSERT DATA { <urn:a> <urn:b> <urn:c> }").await;

    let response = server
        .post("/sparql")
        .form(&[("query", "SELECT ?o WHERE { ?s ?p ?o }")])
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "o\r\nurn:c\r\n");
}

#[tokio::test]
async fn raw_query_body() {
    let response = server()
        .post("/sparql")
        .bytes(Bytes::from_static(b"ASK { <urn:a> ?p ?o }"))
        .content_type("application/sparql-query")
        .add_header(ACCEPT, HeaderValue::from_static("application/json"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "application/json");
    assert!(response.text().contains("false"));
}

#[tokio::test]
async fn delete_where_and_modify() {
    let server = server();
    insert(
        &server,
        "INSERT DATA { <urn:a> <urn:b> <urn:c> . <urn:d> <urn:b> <urn:e> }",
    )
    .await;
    insert(
        &server,
        "DELETE { ?s <urn:b> ?o } INSERT { ?s <urn:f> ?o } WHERE { ?s <urn:b> ?o . FILTER(?s = <urn:a>) }",
    )
    .await;
    insert(&server, "DELETE WHERE { <urn:d> ?p ?o }").await;

    let body = select_csv(&server, "SELECT ?s ?p ?o WHERE { ?s ?p ?o }").await;
    assert_eq!(body, "s,p,o\r\nurn:a,urn:f,urn:c\r\n");
}

#[tokio::test]
async fn unknown_content_type_is_missing_query() {
    server()
        .post("/sparql")
        .bytes(Bytes::from_static(b"ASK {}"))
        .content_type("text/plain")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn malformed_query_is_unsupported() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "SELEKT nonsense")
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.text(), "Unsupported Query Type");
}

#[tokio::test]
async fn graph_management_is_unsupported() {
    let response = server()
        .post("/sparql")
        .form(&[("update", "CLEAR ALL")])
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.text(), "Unsupported Query Type");
}

#[tokio::test]
async fn failing_update_is_bad_request() {
    let response = server()
        .post("/sparql")
        .form(&[(
            "update",
            "INSERT { ?s ?p ?o } WHERE { SERVICE <http://example.com/sparql> { ?s ?p ?o } }",
        )])
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.text(), "Error after executing the update query.");
}

#[tokio::test]
async fn protocol_default_graph() {
    let server = server();
    insert(
        &server,
        "INSERT DATA { GRAPH <urn:g> { <urn:x> <urn:y> <urn:z> } }",
    )
    .await;

    assert_eq!(
        select_csv(&server, "SELECT ?s WHERE { ?s ?p ?o }").await,
        "s\r\n"
    );

    let response = server
        .get("/sparql")
        .add_query_param("query", "SELECT ?s WHERE { ?s ?p ?o }")
        .add_query_param("default-graph-uri", "urn:g")
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "s\r\nurn:x\r\n");
}

#[tokio::test]
async fn invalid_graph_uri_is_bad_request() {
    server()
        .get("/sparql")
        .add_query_param("query", "SELECT ?s WHERE { ?s ?p ?o }")
        .add_query_param("named-graph-uri", "not an iri")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn format_parameter_overrides_accept() {
    let response = server()
        .get("/sparql")
        .add_query_param("query", "SELECT ?s WHERE { ?s ?p ?o }")
        .add_query_param("format", "text/csv")
        .add_header(ACCEPT, HeaderValue::from_static("application/json"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "text/csv");
}

#[tokio::test]
async fn query_timeout() {
    let server = TestServer::new(create_router(state("", Some(Duration::ZERO)))).unwrap();
    let response = server
        .get("/sparql")
        .add_query_param(
            "query",
            "SELECT * WHERE { VALUES ?a { 1 2 3 4 5 6 7 8 9 10 } VALUES ?b { 1 2 3 4 5 6 7 8 9 10 } }",
        )
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "Query evaluation timed out");
}

#[tokio::test]
async fn concurrent_requests_see_complete_updates() {
    let server = server();
    let triples = (0..200)
        .map(|i| format!("<urn:s{i}> <urn:p> <urn:o> ."))
        .collect::<Vec<_>>()
        .join(" ");
    let update = format!("INSERT DATA {{ {triples} }}");

    let write = async {
        server
            .post("/sparql")
            .form(&[("update", update.as_str())])
            .await
            .assert_status_ok();
    };

    let ((), first, second, third) = tokio::join!(
        write,
        count_triples(&server),
        count_triples(&server),
        count_triples(&server)
    );
    for body in [first, second, third] {
        assert!(
            body == "c\r\n0\r\n" || body == "c\r\n200\r\n",
            "unexpected count {body:?}"
        );
    }
}

use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;

/// Start an empty fake backend. Add expectations with the helpers below.
pub fn backend_server() -> Server {
    Server::run()
}

/// Base URL of `server` without a trailing slash.
pub fn base_url(server: &Server) -> String {
    server.url_str("").trim_end_matches('/').to_string()
}

fn catalog_body() -> serde_json::Value {
    json!({
        "folders": {
            "trip": ["images/trip/a.jpg", "images/trip/b.jpg", "images/trip/c.JPG"],
            "home": ["images/home/x.jpg"]
        }
    })
}

/// Expect a GET request to `/api/images` returning two folders.
pub fn expect_catalog(server: &Server) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/images"))
            .respond_with(json_encoded(catalog_body())),
    );
}

/// Expect a POST to `/api/faces` for `image_path` returning `faces`.
pub fn expect_faces(server: &Server, image_path: &str, faces: &[&str]) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/faces"),
            request::body(json_decoded(eq(json!({ "image_path": image_path })))),
        ])
        .respond_with(json_encoded(json!({ "faces": faces }))),
    );
}

fn matches_body() -> serde_json::Value {
    json!({
        "matches_per_face": [{
            "face_path": "upload/temp_face_0.jpg",
            "matches": [
                {
                    "similarity": 0.9321,
                    "matched_face": "face_images/trip/a/face_0.jpg",
                    "origin_image": "images/trip/a.jpg"
                },
                {
                    "similarity": 0.5,
                    "matched_face": "face_images/trip/c/face_1.jpg",
                    "origin_image": "images/trip/c.JPG"
                }
            ]
        }]
    })
}

/// Expect a multipart upload to `/api/search-face/` answered with matches.
pub fn expect_search(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/search-face/"),
            request::headers(contains(key("content-type"))),
        ])
        .respond_with(json_encoded(matches_body())),
    );
}

/// Expect an upload search that finds nothing.
pub fn expect_search_empty(server: &Server) {
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/search-face/"))
            .respond_with(json_encoded(json!({ "matches_per_face": [] }))),
    );
}

/// Expect an upload search rejected with `{error}` and status 400.
pub fn expect_search_error(server: &Server, message: &str) {
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/search-face/")).respond_with(
            status_code(400)
                .insert_header("content-type", "application/json")
                .body(json!({ "error": message }).to_string()),
        ),
    );
}

/// Expect a face-click search on `/api/search-from-existed-face/`.
pub fn expect_search_face(server: &Server) {
    server.expect(
        Expectation::matching(request::method_path(
            "POST",
            "/api/search-from-existed-face/",
        ))
        .respond_with(json_encoded(matches_body())),
    );
}

/// Expect a POST to `/api/detect-folder` for `folder`.
pub fn expect_detect(server: &Server, folder: &str) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/detect-folder"),
            request::body(json_decoded(eq(json!({ "folder": folder })))),
        ])
        .respond_with(json_encoded(json!({
            "result": format!("Detected faces in 3 images of {}", folder)
        }))),
    );
}

/// Expect a POST to `/api/calculate-embedding` for `folder`.
pub fn expect_embed(server: &Server, folder: &str) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/calculate-embedding"),
            request::body(json_decoded(eq(json!({ "folder": folder })))),
        ])
        .respond_with(json_encoded(json!({
            "result": format!("Saved 4 embeddings for {}", folder)
        }))),
    );
}

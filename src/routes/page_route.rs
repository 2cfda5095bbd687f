use actix_web::{get, web, HttpResponse};
use askama::Template;
use serde::Deserialize;

#[derive(Template)]
#[template(path = "main.html")]
struct MainTemplate;

#[derive(Template)]
#[template(path = "amplify.html")]
struct AmplifyTemplate;

#[derive(Template)]
#[template(path = "preloader.html")]
struct PreloaderTemplate {
    url: String,
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body(MainTemplate.render().unwrap())
}

#[get("/amplify")]
pub async fn amplify() -> HttpResponse {
    HttpResponse::Ok().body(AmplifyTemplate.render().unwrap())
}

#[derive(Deserialize)]
pub struct PreloaderQuery {
    url: Option<String>,
}

/// Progress page shown while an analysis runs. Without a `url` query
/// parameter there is nothing to poll for, so send the user back to the
/// form.
#[get("/preloader")]
pub async fn preloader(query: web::Query<PreloaderQuery>) -> HttpResponse {
    match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => HttpResponse::Ok().body(
            PreloaderTemplate {
                url: url.to_string(),
            }
            .render()
            .unwrap(),
        ),
        _ => HttpResponse::SeeOther()
            .insert_header(("Location", "/amplify"))
            .finish(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn preloader_without_url_redirects_to_the_form() {
        let app = test::init_service(App::new().service(super::preloader)).await;

        let request = test::TestRequest::get().uri("/preloader").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("Location").unwrap(),
            "/amplify"
        );
    }

    #[actix_web::test]
    async fn preloader_with_url_renders_the_progress_page() {
        let app = test::init_service(App::new().service(super::preloader)).await;

        let request = test::TestRequest::get()
            .uri("/preloader?url=example.com")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = test::read_body(response).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("example.com"));
    }
}

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::middleware::HitCounter;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        "<html>\n<body>\n<h1>Welcome, Chirpy Admin</h1>\n<p>Chirpy has been visited {} times!</p>\n</body>\n</html>\n",
        counter.get()
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// POST /admin/reset
pub async fn reset(counter: web::Data<HitCounter>) -> HttpResponse {
    counter.reset();
    tracing::info!("File server hit count reset");

    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset to 0")
}

use std::net::TcpListener;

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{analysis_route, description_route, page_route},
    services::Orchestrator,
};

pub fn run(listener: TcpListener, orchestrator: Orchestrator) -> Result<Server, std::io::Error> {
    let orchestrator = web::Data::new(orchestrator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./templates/static").prefer_utf8(true))
            .service(page_route::index)
            .service(page_route::amplify)
            .service(page_route::preloader)
            .service(
                web::scope("/analysis")
                    .service(analysis_route::analyze)
                    .service(analysis_route::status_by_id)
                    .service(analysis_route::status_by_url)
                    .service(analysis_route::results)
                    .service(analysis_route::clear_cache),
            )
            .service(web::scope("/api").service(description_route::generate_description))
            .app_data(orchestrator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

use axum::serve;
use quali_api::routes;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let app = match routes::make_app().await {
        Ok(app) => app,
        Err(err) => panic!("{}", err),
    };

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let listener = TcpListener::bind(("127.0.0.1", port)).await;
    println!("Listening on http://127.0.0.1:{port}");

    match listener {
        Ok(res) => serve(res, app).await.unwrap(),
        Err(err) => panic!("{}", err),
    }
}

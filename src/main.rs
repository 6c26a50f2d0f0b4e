use seba_match::cli;

#[actix_web::main]
async fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    if let Err(err) = cli::run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

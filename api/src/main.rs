use std::sync::Arc;

use clap::Parser;
use freefind_api::{
    application::{
        http::server::http_server::{router, serve, state},
        logging::init_logger,
    },
    args::Args,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    let args = Arc::new(Args::parse());
    init_logger(&args.log);

    let state = state(args.clone()).await?;
    let router = router(state)?;

    serve(&args.server, router).await
}

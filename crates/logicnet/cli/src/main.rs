//! logicnet binary entry point

#[tokio::main]
async fn main() {
    if let Err(err) = logicnet::run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

use imagedb_shared::{logging, AppState, Config};
use lambda_http::{run, service_fn, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = Config::from_env()?;
    let state = match AppState::connect(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Unable to connect to DynamoDB. Error: {}", e);
            return Err(e.into());
        }
    };

    let handler_state = Arc::clone(&state);
    let result = run(service_fn(move |event: Request| {
        let state = Arc::clone(&handler_state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await;

    tracing::info!("Runtime stopped, releasing store client");
    drop(state);
    result
}

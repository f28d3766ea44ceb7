use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match floorplan_gateway_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("floorplan-gateway: {e}");
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match nessus_queue::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

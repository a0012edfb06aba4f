use std::process::ExitCode;

use mdview::{Config, Server, logger::Logger};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = Logger::init() {
        eprintln!("failed to initialize logger: {err}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = Config::load()?;
    let server = Server::new(config).map_err(|err| format!("failed to start server: {err:?}"))?;
    server.run().await.map_err(|err| format!("server error: {err:?}"))
}

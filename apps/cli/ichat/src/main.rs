use ichat::error::IchatError;
use ichat::logger::{DEFAULT_LOG_LEVEL, initialize as LoggerInitialize};
use ichat::prompt::{self, session_closed_signal};
use ichat::view::ChatView;

use chat_core::{ChatClient, ClientConfig, Topic};

use common::ErrorLocation;

use std::env;
use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use log::{error, info};
use tokio::io::{BufReader, stdin};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), IchatError> {
    let config_dir = ClientConfig::default_dir()?;

    create_dir_all(&config_dir).map_err(|e| IchatError::Ichat {
        message: format!("Failed to create config directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if !ClientConfig::file_path(&config_dir).exists() {
        ClientConfig::default().save(&config_dir)?;
    }
    let config = ClientConfig::load(&config_dir)?;

    // Initialize logger FIRST
    LoggerInitialize(&config_dir, config.log_level().unwrap_or(DEFAULT_LOG_LEVEL))?;
    info!("ichat starting, config in {}", config_dir.display());

    let url = env::args().nth(1).unwrap_or_else(|| config.server.url.clone());
    let credentials = config.credentials()?;

    let view = Arc::new(Mutex::new(ChatView::new()));
    let mut client = ChatClient::new(config);
    for topic in Topic::ALL {
        let view = Arc::clone(&view);
        client.subscribe(topic, move |event| {
            let mut view = view.lock().map_err(|e| e.to_string())?;
            if let Some(line) = view.render(event) {
                println!("{line}");
            }
            Ok(())
        });
    }

    let session_closed = session_closed_signal(&mut client);
    let handle = client.connect(&url, &credentials).await?;

    let exit = prompt::run(BufReader::new(stdin()), &handle, &view, &session_closed).await?;
    info!("Prompt finished: {exit:?}");

    handle.closed().await;
    info!("ichat stopped");
    Ok(())
}

use chat_api::{ChatApiConfig, ChatClient};
use log::info;

use deepthink::config::Config;
use deepthink::pipeline::Pipeline;
use deepthink::repl::Repl;

fn main() {
    deepthink::logging::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => exit_with_error("failed to load configuration", &error),
    };
    info!("configuration loaded, model {}", config.model_name);

    let api_config = ChatApiConfig::new(config.api_key).with_base_url(config.api_url);
    let client = match ChatClient::new(api_config) {
        Ok(client) => client,
        Err(error) => exit_with_error("failed to initialize the API client", &error),
    };

    let pipeline = Pipeline::new(client, config.model_name);
    let mut repl = match Repl::new(pipeline) {
        Ok(repl) => repl,
        Err(error) => exit_with_error("failed to start the session", &error),
    };

    if let Err(error) = repl.run() {
        exit_with_error("session error", &error);
    }
}

fn exit_with_error(context: &str, error: &dyn std::error::Error) -> ! {
    eprintln!("{context}: {error}");
    std::process::exit(1);
}

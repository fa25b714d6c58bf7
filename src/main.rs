use clap::Parser;
use homechat::app::Application;
use homechat::cli::Args;
use homechat::commands::{ChatState, create_command_registry};
use homechat::config::{Config, Provider};
use homechat::conversation::Conversation;
use homechat::core::error::HomechatError;
use homechat::home::device::DeviceClient;
use homechat::home::{HomeState, SharedHome};
use homechat::providers::factory::ProviderFactory;
use homechat::todo::TodoClient;
use homechat::tools::{ToolDispatcher, ToolRegistry};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "homechat=debug" } else { "homechat=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_application(args: Args) -> Result<Application, HomechatError> {
    let mut config = Config::load()?;
    if let Some(host) = &args.device_host {
        config.device.host = host.clone();
    }

    let provider = match &args.provider {
        Some(name) => name.parse::<Provider>()?,
        None => config.provider(),
    };
    let mut provider_config = config.provider_config(provider);
    if let Some(model) = &args.model {
        provider_config.model = Some(model.clone());
    }
    info!(%provider, model = ?provider_config.model, "using chat service");
    let chat = ProviderFactory::new().create(&provider, &provider_config)?;

    let home = SharedHome::new(HomeState::new());
    let device = DeviceClient::new(&config.device.host, config.device.blink_path.clone());
    let todo = TodoClient::new(config.todo_url.clone());
    let registry = ToolRegistry::standard(home.clone(), device, todo)?;
    let dispatcher = ToolDispatcher::new(Arc::new(registry)).with_timeout(config.timeouts.tool());

    let conversation = Conversation::new(chat, dispatcher, config.system_prompt.clone())
        .with_chat_timeout(config.timeouts.chat());

    Ok(Application::new(
        args,
        ChatState::new(conversation, home),
        create_command_registry(),
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match build_application(args) {
        Ok(mut app) => app.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            homechat::display::display_error(&e);
            ExitCode::FAILURE
        }
    }
}

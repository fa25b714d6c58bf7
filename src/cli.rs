use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "Chat with a tool-using assistant that can control your lamps", long_about = None)]
pub struct Args {
    /// One-shot message to send; omit to start an interactive session
    pub query: Option<String>,

    /// Start an interactive chat session
    #[arg(short, long)]
    pub chat: bool,

    /// Chat service to use [possible values: ollama, openai]
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Lamp device host or base URL
    #[arg(long)]
    pub device_host: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "hchat",
            "--provider",
            "openai",
            "-m",
            "gpt-4o",
            "--device-host",
            "10.0.0.7",
            "turn on the lamp",
        ]);
        assert_eq!(args.query.as_deref(), Some("turn on the lamp"));
        assert_eq!(args.provider.as_deref(), Some("openai"));
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        assert_eq!(args.device_host.as_deref(), Some("10.0.0.7"));
        assert!(!args.chat);
    }
}

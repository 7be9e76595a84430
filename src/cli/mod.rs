use clap::{ Args, Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay server that forwards conversations to the upstream AI API
    Serve(ServeArgs),

    /// Start an interactive chat session against a running relay
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:5000")]
    pub server_addr: String,

    /// Endpoint of the upstream chat-completions API.
    #[arg(
        long,
        env = "UPSTREAM_URL",
        default_value = "https://api.groq.com/openai/v1/chat/completions"
    )]
    pub upstream_url: String,

    /// API key sent as a bearer credential on upstream calls.
    #[arg(long, env = "UPSTREAM_API_KEY", default_value = "")]
    pub upstream_api_key: String,

    /// Model identifier sent with every upstream request.
    #[arg(long, env = "UPSTREAM_MODEL", default_value = "llama-3.1-8b-instant")]
    pub upstream_model: String,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the relay server.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:5000")]
    pub relay_url: String,

    /// Path of the local chat history file.
    #[arg(long, env = "HISTORY_PATH", default_value = "ai-chats.json")]
    pub history_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults_match_the_upstream_contract() {
        let cli = Cli::try_parse_from(["askai", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.server_addr, "127.0.0.1:5000");
                assert_eq!(args.upstream_model, "llama-3.1-8b-instant");
                assert!(args.upstream_url.ends_with("/chat/completions"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn chat_defaults_point_at_the_local_relay() {
        let cli = Cli::try_parse_from(["askai", "chat"]).unwrap();
        match cli.command {
            Command::Chat(args) => {
                assert_eq!(args.relay_url, "http://127.0.0.1:5000");
                assert_eq!(args.history_path, "ai-chats.json");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

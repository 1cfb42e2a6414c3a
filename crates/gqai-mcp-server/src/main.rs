use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand, ValueEnum};
use gqai_mcp_server::mcp::{JsonRpcRequest, route};
use gqai_mcp_server::server::{Server, Transport};
use gqai_mcp_server::session::DEFAULT_QUEUE_CAPACITY;
use gqai_mcp_server::tools::{load_tool, tools_from_config};
use gqai_registry::GraphQLConfig;
use runtime::{LogRotationKind, Logging};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{Level, info};

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Debug, Parser)]
#[command(
    name = "gqai",
    version,
    styles = STYLES,
    about = "gqai - expose GraphQL operations as AI tools",
)]
struct Args {
    /// Path to the GraphQL project config
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "GQAI_CONFIG",
        default_value = ".graphqlrc.yml"
    )]
    config: PathBuf,

    /// The log level for the server
    #[arg(long = "log", short = 'l', global = true, default_value_t = Level::INFO)]
    log_level: Level,

    /// Write logs to rolling files in this directory instead of stderr
    #[arg(long, global = true, env = "GQAI_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// How often to start a new log file
    #[arg(long, global = true, value_enum, default_value_t)]
    log_rotation: LogRotationKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run as an MCP server on stdin and stdout
    Run,

    /// List available tools
    #[command(name = "tools/list")]
    ToolsList,

    /// Describe a tool and show its full schema
    Describe {
        /// The tool to describe
        name: String,
    },

    /// Call a GraphQL operation as a tool
    #[command(name = "tools/call")]
    ToolsCall {
        /// The tool to call
        name: String,

        /// Tool arguments as a JSON object
        input: Option<String>,
    },

    /// Serve MCP over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, clap::Args)]
struct ServeArgs {
    /// The HTTP binding to serve
    #[arg(long, short = 't', value_enum, default_value_t)]
    transport: HttpTransport,

    /// Host to bind to
    #[arg(long, short = 'H', default_value = "localhost")]
    host: String,

    /// Port to bind to
    #[arg(long, short = 'p', default_value_t = 8080)]
    port: u16,

    /// Responses held for a session before new ones are dropped
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    session_queue: usize,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum HttpTransport {
    /// Streamable HTTP on `/mcp`
    #[default]
    Http,
    /// Server-sent events on `/sse` and `/message`
    Sse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _guard = runtime::setup_logging(&Logging {
        level: args.log_level,
        path: args.log_dir.clone(),
        rotation: args.log_rotation,
    })?;

    let config = runtime::read_config(&args.config)?;

    match args.command {
        Command::Run => {
            info!("gqai v{}", std::env!("CARGO_PKG_VERSION"));
            Server::builder()
                .transport(Transport::Stdio)
                .config(config)
                .build()
                .start()
                .await?;
        }
        Command::ToolsList => print_json(&tools_from_config(&config)?)?,
        Command::Describe { name } => print_json(&load_tool(&config, &name)?)?,
        Command::ToolsCall { name, input } => call_tool(&config, name, input).await?,
        Command::Serve(serve) => {
            info!("gqai v{}", std::env!("CARGO_PKG_VERSION"));
            let transport = match serve.transport {
                HttpTransport::Http => Transport::StreamableHttp {
                    host: serve.host,
                    port: serve.port,
                },
                HttpTransport::Sse => Transport::SSE {
                    host: serve.host,
                    port: serve.port,
                },
            };
            Server::builder()
                .transport(transport)
                .config(config)
                .session_queue(serve.session_queue)
                .build()
                .start()
                .await?;
        }
    }

    Ok(())
}

/// Call one tool the way an MCP client would and print its result
async fn call_tool(
    config: &GraphQLConfig,
    name: String,
    input: Option<String>,
) -> anyhow::Result<()> {
    let arguments: Value = match input {
        Some(input) => {
            serde_json::from_str(&input).map_err(|e| anyhow!("Invalid JSON input: {e}"))?
        }
        None => json!({}),
    };

    let request = JsonRpcRequest::new(
        1,
        "tools/call",
        Some(json!({ "name": name, "arguments": arguments })),
    );
    let Some(response) = route(request, config).await else {
        bail!("tools/call produced no response");
    };
    if let Some(error) = response.error {
        bail!("{}", error.message);
    }

    print_json(&response.result.unwrap_or(Value::Null))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use rstest::rstest;

    use super::{Args, Command, HttpTransport};

    #[test]
    fn it_defaults_the_config_path() {
        let args = Args::try_parse_from(["gqai", "run"]).unwrap();

        assert_eq!(args.config.to_str(), Some(".graphqlrc.yml"));
        assert!(matches!(args.command, Command::Run));
    }

    #[rstest]
    #[case(&["gqai", "tools/list"])]
    #[case(&["gqai", "-c", "other.yml", "tools/list"])]
    #[case(&["gqai", "tools/list", "--config", "other.yml"])]
    fn global_flags_go_anywhere(#[case] argv: &[&str]) {
        let args = Args::try_parse_from(argv).unwrap();

        assert!(matches!(args.command, Command::ToolsList));
    }

    #[test]
    fn tools_call_input_is_optional() {
        let args = Args::try_parse_from(["gqai", "tools/call", "GetFilm"]).unwrap();

        let Command::ToolsCall { name, input } = args.command else {
            panic!("expected tools/call");
        };
        assert_eq!(name, "GetFilm");
        assert_eq!(input, None);
    }

    #[test]
    fn serve_has_defaults() {
        let args = Args::try_parse_from(["gqai", "serve"]).unwrap();

        let Command::Serve(serve) = args.command else {
            panic!("expected serve");
        };
        assert!(matches!(serve.transport, HttpTransport::Http));
        assert_eq!(serve.host, "localhost");
        assert_eq!(serve.port, 8080);
        assert_eq!(serve.session_queue, 10);
    }

    #[test]
    fn serve_accepts_sse() {
        let args =
            Args::try_parse_from(["gqai", "serve", "-t", "sse", "-H", "0.0.0.0", "-p", "9000"])
                .unwrap();

        let Command::Serve(serve) = args.command else {
            panic!("expected serve");
        };
        assert!(matches!(serve.transport, HttpTransport::Sse));
        assert_eq!(serve.host, "0.0.0.0");
        assert_eq!(serve.port, 9000);
    }

    #[test]
    fn unknown_transports_are_rejected() {
        assert!(Args::try_parse_from(["gqai", "serve", "--transport", "ws"]).is_err());
    }
}

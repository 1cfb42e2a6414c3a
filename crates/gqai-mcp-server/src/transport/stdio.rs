//! Newline-delimited JSON-RPC over standard input and output

use gqai_registry::GraphQLConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _, BufReader};
use tracing::{error, info};

use crate::errors::ServerError;
use crate::mcp::{JsonRpcRequest, JsonRpcResponse, dispatch};

/// Serve MCP on the process's stdin and stdout until stdin closes
pub async fn serve_stdio(config: &GraphQLConfig) -> Result<(), ServerError> {
    info!("Starting MCP server on stdio");
    serve_lines(config, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Answer one request per line of `reader`, writing one response per line to `writer`.
///
/// A line that is not UTF-8 JSON ends the loop after a parse error is written. End of input
/// ends it cleanly.
pub async fn serve_lines<R, W>(
    config: &GraphQLConfig,
    mut reader: R,
    mut writer: W,
) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let request = match serde_json::from_slice::<JsonRpcRequest>(&line) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to decode request from stdin: {e}");
                write_response(
                    &mut writer,
                    &JsonRpcResponse::parse_error("Failed to parse JSON"),
                )
                .await?;
                break;
            }
        };

        if let Some(response) = dispatch(request, config).await {
            write_response(&mut writer, &response).await?;
        }
    }

    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

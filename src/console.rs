//! Line-oriented console front end for a single local user.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    conversation::{Conversation, Message, Reply},
    models::UserId,
};

/// Feeds every non-empty input line to `conversation` until end of input.
/// Documents are written into `documents_dir`.
pub async fn serve<R, W>(
    conversation: &Conversation,
    user: UserId,
    first_name: &str,
    input: R,
    mut output: W,
    documents_dir: &Path,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let message = Message::new(user, first_name, text);
        for reply in conversation.handle(&message).await {
            let rendered = match reply {
                Reply::Text(text) => text,
                Reply::Document {
                    name,
                    caption,
                    bytes,
                } => {
                    let path = documents_dir.join(&name);
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    format!("{caption}: {}", path.display())
                }
            };
            output.write_all(rendered.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.flush().await?;
    }
    Ok(())
}

//! Interactive streaming chat

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use guidance_core::{
    ChatBackend, ChatError, ChatSession, GuidanceConfig, ImageAttachment, OpenAiCompatBackend,
};

/// Run the chat loop until `/quit`, end of input or Ctrl-C at the prompt
pub async fn run(config: &GuidanceConfig, image: Option<&Path>) -> Result<()> {
    let backend = Arc::new(OpenAiCompatBackend::new(&config.chat)?);
    if !backend.health_check().await {
        warn!(url = %config.chat.base_url, "Chat backend did not answer the health check");
        eprintln!(
            "Warning: the chat service at {} is not responding; replies may fail.",
            config.chat.base_url
        );
    }

    let mut session = ChatSession::new(backend);
    if let Some(ref prompt) = config.chat.system_prompt {
        session = session.with_system_prompt(prompt.clone());
    }
    let mut attachment = image.map(load_image).transpose()?;

    println!("Ask the guidance assistant anything. /clear forgets the conversation, /quit exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        flush();
        let Some(line) = read_input(&mut lines, ctrl_c()).await? else {
            println!();
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear()?;
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        print!("guide> ");
        flush();
        let mut shown = 0;
        let result = session
            .send_with_cancel(&line, attachment.take(), ctrl_c(), |message| {
                if let Some(new_text) = message.content.get(shown..) {
                    print!("{new_text}");
                    flush();
                    shown = message.content.len();
                }
            })
            .await;
        println!();

        match result {
            Ok(()) => {}
            Err(ChatError::Cancelled) => println!("(reply cancelled)"),
            Err(err) => {
                eprintln!("error: {err}");
                if let Some(last) = session.messages().last() {
                    println!("guide> {}", last.content);
                }
            }
        }
    }
    Ok(())
}

/// Next input line; `None` at end of input or once `interrupt` resolves
///
/// Ctrl-C is handled in-process while chatting, so at the prompt it ends
/// the session.
async fn read_input<R, I>(lines: &mut Lines<R>, interrupt: I) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = ()>,
{
    tokio::select! {
        line = lines.next_line() => Ok(line?),
        () = interrupt => Ok(None),
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Ctrl-C handler unavailable, replies cannot be cancelled");
        std::future::pending::<()>().await;
    }
}

fn flush() {
    // Prompt output is best-effort
    let _ = std::io::stdout().flush();
}

/// Read an image file and encode it for attachment
fn load_image(path: &Path) -> Result<ImageAttachment> {
    let mime_type = image_mime_type(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageAttachment::new(mime_type, STANDARD.encode(bytes)))
}

fn image_mime_type(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    Ok(match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => bail!("Unsupported image type: {}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_types() {
        assert_eq!(image_mime_type(Path::new("a.PNG")).unwrap(), "image/png");
        assert_eq!(image_mime_type(Path::new("scan.jpeg")).unwrap(), "image/jpeg");
        assert!(image_mime_type(Path::new("notes.pdf")).is_err());
        assert!(image_mime_type(Path::new("noext")).is_err());
    }

    #[tokio::test]
    async fn test_read_input_returns_lines() {
        let mut lines = BufReader::new(&b"hello\n"[..]).lines();
        let line = read_input(&mut lines, std::future::pending()).await.unwrap();
        assert_eq!(line.as_deref(), Some("hello"));
        let end = read_input(&mut lines, std::future::pending()).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_read_input_stops_on_interrupt() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();
        let line = read_input(&mut lines, std::future::ready(())).await.unwrap();
        assert_eq!(line, None);
    }

    #[test]
    fn test_load_image_encodes_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data_base64, "iVBORw==");
    }
}

//! Streaming translation example.
//!
//! Translates the text given on the command line and prints the downstream
//! event stream exactly as an HTTP client would receive it.
//!
//! # Usage
//!
//! ```bash
//! export TRANSLATE_PROVIDER="gemini"
//! export TRANSLATE_API_KEY="your-api-key-here"
//! export TRANSLATE_MODEL="gemini-2.0-flash"
//! export TRANSLATE_LOG_LEVEL="debug"
//!
//! cargo run --example stream -- "Guten Morgen, wie geht es dir?"
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use futures::StreamExt;
use integrations_translation::observability::LoggingConfig;
use integrations_translation::{AdapterFactory, ProviderConfig, StreamProcessor, TranslationContext, TranslationRequest};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    LoggingConfig::from_env().init()?;

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        eprintln!("usage: stream <text to translate>");
        return Ok(());
    }

    let config = ProviderConfig::from_env()?;
    let context = TranslationContext::new(&config, &AdapterFactory::new())?;
    println!("adapter: {}", context.adapter().kind());
    for (name, value) in StreamProcessor::response_headers() {
        println!("{name}: {value}");
    }
    println!();

    let target = std::env::var("TRANSLATE_TARGET_LANGUAGE").unwrap_or_else(|_| "English".to_string());
    let mut frames = context.stream(TranslationRequest::new(text).with_target_language(target));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(frame) => {
                    stdout.write_all(&frame)?;
                    stdout.flush()?;
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                context.abort();
                eprintln!("\naborted");
                break;
            }
        }
    }

    Ok(())
}

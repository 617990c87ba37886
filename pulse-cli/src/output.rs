//! Output emission shared by every command.

use clap::{Args, ValueEnum};
use pulse_core::{Result, render_json};
use serde::Serialize;
use std::path::PathBuf;

/// Output format for command data.
#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum OutputFormat {
    /// Plain text blocks.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Shared output arguments.
#[derive(Args, Clone, Debug, Default)]
pub struct OutputArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write output to a file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Emit a payload as text or JSON, to stdout or the `--output` file.
pub async fn emit<T: Serialize + ?Sized>(
    args: &OutputArgs,
    payload: &T,
    text: String,
) -> Result<()> {
    let contents = match args.format {
        OutputFormat::Text => text,
        OutputFormat::Json => render_json(payload)?,
    };
    write_contents(args, contents).await
}

async fn write_contents(args: &OutputArgs, contents: String) -> Result<()> {
    if let Some(path) = &args.output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, contents).await?;
        println!("Output saved to {}", path.display());
    } else {
        print!("{contents}");
    }
    Ok(())
}

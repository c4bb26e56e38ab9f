//! Hands a resolved link to `yt-dlp`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use embedlink_core::ResolvedLink;
use tokio::process::Command;

pub const YT_DLP: &str = "yt-dlp";

/// Arguments for `yt-dlp`, excluding the program name.
///
/// Every download header becomes an `--add-header "Name: value"` pair, in
/// the order the provider lists them.
pub fn ytdlp_args(link: &ResolvedLink, output: &Path) -> Vec<String> {
    let mut args = vec![
        link.url.clone(),
        "--fragment-retries".to_string(),
        "infinite".to_string(),
        "--concurrent-fragments".to_string(),
        "4".to_string(),
        "-o".to_string(),
        output.display().to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
        "--progress".to_string(),
    ];

    for header in &link.headers {
        args.push("--add-header".to_string());
        args.push(format!("{}: {}", header.name, header.value));
    }

    args
}

/// Run `yt-dlp` in the foreground and wait for it.
pub async fn run_download(link: &ResolvedLink, output: &Path) -> Result<()> {
    let args = ytdlp_args(link, output);
    tracing::info!("Downloading {} to {}", link.provider, output.display());
    tracing::debug!("{} {:?}", YT_DLP, args);

    let status = Command::new(YT_DLP)
        .args(&args)
        .status()
        .await
        .with_context(|| format!("failed to start {}", YT_DLP))?;

    if !status.success() {
        match status.code() {
            Some(code) => bail!("{} failed with exit code {}", YT_DLP, code),
            None => bail!("{} was terminated by a signal", YT_DLP),
        }
    }

    Ok(())
}

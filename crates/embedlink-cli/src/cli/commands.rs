use std::path::PathBuf;

use anyhow::{Context, Result};
use embedlink_core::{
    ClientConfig, FetchRequest, LanguageKey, ResolvedLink, Resolver, RetryPolicy,
    derive_output_filename, parse_provider_map, site_base_url,
};

use crate::download::run_download;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub language: LanguageKey,
    pub json: bool,
    pub download: bool,
    pub output: Option<PathBuf>,
    pub timeout_secs: u64,
    pub retries: u32,
}

pub async fn run_resolve(episode_url: &str, options: &ResolveOptions) -> Result<()> {
    let resolver = Resolver::with_config(client_config(options.timeout_secs))?;

    tracing::info!("Fetching episode page: {}", episode_url);
    let html = resolver
        .http()
        .get_text(FetchRequest::get(episode_url))
        .await
        .context("fetching episode page")?;

    let base_url = site_base_url(episode_url)?;
    let providers = parse_provider_map(&html, &base_url)?;
    tracing::debug!(
        "Providers on page: {}",
        providers.providers().collect::<Vec<_>>().join(", ")
    );

    let policy = RetryPolicy {
        max_retries: options.retries,
    };
    let link = resolver
        .resolve_with_retry(&providers, options.language, &policy)
        .await?;

    print_link(&link, options.json)?;

    if options.download {
        let output = options
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(derive_output_filename(episode_url)));
        run_download(&link, &output).await?;
        tracing::info!("Saved {}", output.display());
    }

    Ok(())
}

pub async fn run_embed(
    provider: &str,
    embed_url: &str,
    json: bool,
    timeout_secs: u64,
) -> Result<()> {
    let resolver = Resolver::with_config(client_config(timeout_secs))?;
    let link = resolver.resolve_embed(provider, embed_url).await?;
    print_link(&link, json)
}

fn client_config(timeout_secs: u64) -> ClientConfig {
    ClientConfig {
        timeout_secs,
        ..ClientConfig::default()
    }
}

fn print_link(link: &ResolvedLink, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(link)?);
        return Ok(());
    }

    println!("{}", link.url);
    for header in &link.headers {
        println!("  {}: {}", header.name, header.value);
    }
    Ok(())
}

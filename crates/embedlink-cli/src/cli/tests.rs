//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_resolve_defaults() {
    match parse(&[
        "embedlink",
        "resolve",
        "https://aniworld.to/anime/stream/x/staffel-1/episode-1",
    ]) {
        CliCommand::Resolve {
            episode_url,
            language,
            json,
            download,
            output,
            timeout,
            retries,
        } => {
            assert_eq!(
                episode_url,
                "https://aniworld.to/anime/stream/x/staffel-1/episode-1"
            );
            assert_eq!(language, 3);
            assert!(!json);
            assert!(!download);
            assert!(output.is_none());
            assert_eq!(timeout, 30);
            assert_eq!(retries, 3);
        }
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_all_flags() {
    match parse(&[
        "embedlink",
        "resolve",
        "https://aniworld.to/anime/stream/x/staffel-1/episode-1",
        "--language",
        "1",
        "--json",
        "--download",
        "--output",
        "/tmp/ep.mp4",
        "--timeout",
        "10",
        "--retries",
        "0",
    ]) {
        CliCommand::Resolve {
            language,
            json,
            download,
            output,
            timeout,
            retries,
            ..
        } => {
            assert_eq!(language, 1);
            assert!(json);
            assert!(download);
            assert_eq!(output.as_deref(), Some(Path::new("/tmp/ep.mp4")));
            assert_eq!(timeout, 10);
            assert_eq!(retries, 0);
        }
        _ => panic!("expected Resolve with flags"),
    }
}

#[test]
fn cli_parse_embed() {
    match parse(&["embedlink", "embed", "VOE", "https://voe.sx/e/abc", "--json"]) {
        CliCommand::Embed {
            provider,
            embed_url,
            json,
            timeout,
        } => {
            assert_eq!(provider, "VOE");
            assert_eq!(embed_url, "https://voe.sx/e/abc");
            assert!(json);
            assert_eq!(timeout, 30);
        }
        _ => panic!("expected Embed"),
    }
}

#[test]
fn cli_parse_embed_timeout() {
    match parse(&[
        "embedlink",
        "embed",
        "Doodstream",
        "https://dood.li/e/abc",
        "--timeout",
        "5",
    ]) {
        CliCommand::Embed { json, timeout, .. } => {
            assert!(!json);
            assert_eq!(timeout, 5);
        }
        _ => panic!("expected Embed with --timeout"),
    }
}

#[test]
fn cli_parse_large_language_key() {
    match parse(&["embedlink", "resolve", "https://x.to/a", "--language", "300"]) {
        CliCommand::Resolve { language, .. } => assert_eq!(language, 300),
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_rejects_non_numeric_language() {
    assert!(Cli::try_parse_from(["embedlink", "resolve", "https://x.to/a", "--language", "de"]).is_err());
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["embedlink"]).is_err());
}

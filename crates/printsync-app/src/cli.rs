// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line: flags, environment, auth and target files folded into one
// validated run configuration.

use std::path::PathBuf;

use clap::Parser;

use printsync_core::config::{AuthFile, SyncConfig, load_target_file};
use printsync_core::error::{PrintsyncError, Result};

#[derive(Debug, Parser)]
#[command(name = "printsync", version)]
#[command(about = "Scan the network for SNMP printers and sync them into Snipe-IT.")]
#[command(after_help = "\
Targets are single addresses (192.168.1.245), last-octet ranges
(192.168.1.1-254) or CIDR blocks (192.168.2.0/24).

Auth file (--auth-file):
  url=http://snipeit.local/api/v1
  token=YOUR_API_TOKEN
  community=public")]
pub struct Cli {
    /// Address, range or subnet to scan. Repeatable.
    #[arg(short, long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// File with one target per line; `#` starts a comment.
    #[arg(long, value_name = "PATH")]
    pub target_file: Option<PathBuf>,

    /// Snipe-IT API base URL, including /api/v1.
    #[arg(long, env = "PRINTSYNC_URL")]
    pub url: Option<String>,

    /// Snipe-IT API token.
    #[arg(long, env = "PRINTSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// key=value file supplying url, token and community.
    #[arg(long, value_name = "PATH")]
    pub auth_file: Option<PathBuf>,

    /// SNMP community string [default: public, or from the auth file].
    #[arg(short, long, env = "PRINTSYNC_COMMUNITY")]
    pub community: Option<String>,

    /// Maximum probes in flight.
    #[arg(long, default_value_t = 50)]
    pub concurrency: usize,

    /// Per-query SNMP timeout in seconds.
    #[arg(long, default_value_t = 2)]
    pub timeout_secs: u64,

    /// SNMP retries after a failed query.
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Rows fetched per inventory search.
    #[arg(long, default_value_t = 500)]
    pub search_limit: u32,

    /// Accept any TLS certificate from the inventory server.
    #[arg(long)]
    pub insecure: bool,

    /// Scan for real but sync into a throwaway in-memory inventory and
    /// print the notes that would be written.
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging (RUST_LOG overrides).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build and validate the run configuration. Credentials are required
    /// unless this is a dry run.
    ///
    /// Precedence for each setting: flag or environment variable, then the
    /// auth file, then the built-in default.
    pub fn config(&self) -> Result<SyncConfig> {
        let auth = self.auth_file.as_deref().map(AuthFile::load).transpose()?;

        let mut config = SyncConfig {
            inventory_url: self.url.clone(),
            inventory_token: self.token.clone(),
            concurrency: self.concurrency,
            snmp_timeout_secs: self.timeout_secs,
            snmp_retries: self.retries,
            search_limit: self.search_limit,
            accept_invalid_certs: self.insecure,
            ..SyncConfig::default()
        };
        let community = self
            .community
            .clone()
            .or_else(|| auth.as_ref().and_then(|auth| auth.community.clone()));
        if let Some(community) = community {
            config.community = community;
        }
        if let Some(auth) = &auth {
            config.merge_auth(auth);
        }

        config.validate()?;
        if !self.dry_run {
            config.credentials()?;
        }
        Ok(config)
    }

    /// `--target` values followed by the target file's lines.
    pub fn targets(&self) -> Result<Vec<String>> {
        let mut targets = self.targets.clone();
        if let Some(path) = &self.target_file {
            let listed = load_target_file(path)?;
            if listed.is_empty() {
                return Err(PrintsyncError::Config(format!(
                    "target file {} lists no targets",
                    path.display()
                )));
            }
            targets.extend(listed);
        }
        if targets.is_empty() {
            return Err(PrintsyncError::Config(
                "no targets given; use --target or --target-file".into(),
            ));
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};
    use std::io::Write;

    /// Parse with the `PRINTSYNC_*` bindings removed so the host
    /// environment never feeds values into a test.
    fn parse(args: &[&str]) -> Cli {
        let command = Cli::command()
            .mut_arg("url", |arg| arg.env(None::<&'static str>))
            .mut_arg("token", |arg| arg.env(None::<&'static str>))
            .mut_arg("community", |arg| arg.env(None::<&'static str>));
        let matches = command
            .try_get_matches_from(std::iter::once("printsync").chain(args.iter().copied()))
            .expect("valid arguments");
        Cli::from_arg_matches(&matches).expect("matches map onto Cli")
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(body.as_bytes()).expect("write");
        path
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = parse(&[
            "--target", "10.0.0.0/30",
            "--url", "http://inv.local/api/v1",
            "--token", "secret",
            "-c", "private",
            "--concurrency", "8",
            "--timeout-secs", "5",
            "--retries", "0",
            "--insecure",
        ]);
        let config = cli.config().expect("config");
        assert_eq!(config.inventory_url.as_deref(), Some("http://inv.local/api/v1"));
        assert_eq!(config.community, "private");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.snmp_timeout_secs, 5);
        assert_eq!(config.snmp_retries, 0);
        assert!(config.accept_invalid_certs);
        assert_eq!(cli.targets().expect("targets"), vec!["10.0.0.0/30"]);
    }

    #[test]
    fn missing_credentials_rejected_unless_dry_run() {
        let cli = parse(&["--target", "10.0.0.1"]);
        assert!(cli.url.is_none() && cli.token.is_none());
        assert!(matches!(cli.config(), Err(PrintsyncError::Config(_))));

        let cli = parse(&["--target", "10.0.0.1", "--url", "http://inv.local/api/v1"]);
        assert!(matches!(cli.config(), Err(PrintsyncError::Config(_))));

        let cli = parse(&["--target", "10.0.0.1", "--dry-run"]);
        assert!(cli.config().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cli = parse(&["--dry-run", "--concurrency", "0"]);
        assert!(matches!(cli.config(), Err(PrintsyncError::Config(_))));
    }

    #[test]
    fn auth_file_fills_gaps_but_flags_win() {
        let dir = tempfile::tempdir().expect("temp dir");
        let auth = write_file(
            &dir,
            "auth.txt",
            "# inventory\nurl=http://file.local/api/v1\ntoken=from-file\ncommunity=office\n",
        );
        let cli = parse(&[
            "--auth-file",
            auth.to_str().expect("utf-8 path"),
            "--url",
            "http://flag.local/api/v1",
        ]);
        let config = cli.config().expect("config");
        assert_eq!(config.inventory_url.as_deref(), Some("http://flag.local/api/v1"));
        assert_eq!(config.inventory_token.as_deref(), Some("from-file"));
        assert_eq!(config.community, "office");
    }

    #[test]
    fn explicit_default_community_beats_auth_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let auth = write_file(&dir, "auth.txt", "community=office\n");
        let cli = parse(&[
            "--dry-run",
            "-c",
            "public",
            "--auth-file",
            auth.to_str().expect("utf-8 path"),
        ]);
        assert_eq!(cli.config().expect("config").community, "public");
    }

    #[test]
    fn community_defaults_to_public() {
        let config = parse(&["--dry-run"]).config().expect("config");
        assert_eq!(config.community, "public");
    }

    #[test]
    fn target_file_extends_flags() {
        let dir = tempfile::tempdir().expect("temp dir");
        let list = write_file(&dir, "printers.txt", "# floor 1\n192.168.1.245\n\n192.168.2.0/24\n");
        let cli = parse(&[
            "--target", "10.0.0.1",
            "--target-file", list.to_str().expect("utf-8 path"),
        ]);
        assert_eq!(
            cli.targets().expect("targets"),
            vec!["10.0.0.1", "192.168.1.245", "192.168.2.0/24"]
        );
    }

    #[test]
    fn empty_target_file_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let list = write_file(&dir, "printers.txt", "# nothing yet\n\n");
        let cli = parse(&["--target-file", list.to_str().expect("utf-8 path")]);
        assert!(matches!(cli.targets(), Err(PrintsyncError::Config(_))));
    }

    #[test]
    fn no_targets_at_all_is_config_error() {
        assert!(matches!(parse(&[]).targets(), Err(PrintsyncError::Config(_))));
    }
}

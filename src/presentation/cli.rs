// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CrawlScope, Settings};
use crate::domain::models::output::OutputFormat;
use crate::domain::models::target::with_default_scheme;
use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const BANNER: &str = r#"
 __      __.__                    __
/  \    /  \  |   _____ _____   |  | __ ___________
\   \/\/   /  |  /     \\__  \  |  |/ // __ \_  __ \
 \        /|  |_|  Y Y  \/ __ \_|    <\  ___/|  | \/
  \__/\  / |____/__|_|  (____  /|__|_ \\___  >__|
       \/             \/     \/      \/    \/
        wordlist builder for recon corpora
"#;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(
    name = "wlmaker",
    version,
    about = "Builds target-specific wordlists from crawl and archive URL corpora"
)]
pub struct Cli {
    /// Target URL (e.g., https://example.com)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Target URL (e.g., https://example.com)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url_opt: Option<String>,

    /// File containing a list of URLs
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Cookies for authentication (e.g., sessionid=abc123)
    #[arg(long)]
    pub cookies: Option<String>,

    /// Additional headers (e.g., "User-Agent: Mozilla/5.0")
    #[arg(long, value_name = "HEADER:VALUE", num_args = 1..)]
    pub headers: Vec<String>,

    /// Crawl depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Per-request timeout in seconds for the crawler
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Timeout in seconds for the archive lookup
    #[arg(long)]
    pub wayback_timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Proxy to use for requests (e.g., http://127.0.0.1:8080)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Crawl scope
    #[arg(long, value_enum)]
    pub scope: Option<CrawlScope>,

    /// Pattern to exclude from crawling
    #[arg(long)]
    pub exclude: Option<String>,

    /// Number of targets processed in parallel
    #[arg(long)]
    pub threads: Option<usize>,

    /// Disable TLS certificate verification for live fetches
    #[arg(long)]
    pub disable_ssl_verify: bool,

    /// Root directory for per-target output
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip live fetching of crawled pages
    #[arg(long)]
    pub no_enrich: bool,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// 是否给出了任何目标
    pub fn has_target(&self) -> bool {
        self.url.is_some() || self.url_opt.is_some() || self.file.is_some()
    }

    /// 收集全部目标输入
    ///
    /// 文件中的行去除首尾空白并丢弃空行；所有缺少协议的输入补上 `https://`
    pub fn targets(&self) -> anyhow::Result<Vec<String>> {
        let mut targets = Vec::new();
        if let Some(url) = self.url_opt.as_ref().or(self.url.as_ref()) {
            targets.push(with_default_scheme(url));
        }
        if let Some(file) = &self.file {
            targets.extend(read_target_file(file)?);
        }
        Ok(targets)
    }

    /// 将命令行选项叠加到配置之上
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(cookies) = &self.cookies {
            settings.request.cookies = Some(cookies.clone());
        }
        settings.request.headers.extend(parse_headers(&self.headers));
        if let Some(proxy) = &self.proxy {
            settings.request.proxy = Some(proxy.clone());
        }
        if let Some(depth) = self.depth {
            settings.crawl.depth = Some(depth);
        }
        if let Some(timeout) = self.timeout {
            settings.crawl.timeout = Some(timeout);
        }
        if let Some(scope) = self.scope {
            settings.crawl.scope = Some(scope);
        }
        if let Some(exclude) = &self.exclude {
            settings.crawl.exclude = Some(exclude.clone());
        }
        if let Some(timeout) = self.wayback_timeout {
            settings.archive.timeout = Some(timeout);
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if let Some(dir) = &self.output_dir {
            settings.output.base_dir = dir.clone();
        }
        if let Some(threads) = self.threads {
            settings.concurrency.threads = threads;
        }
        if self.disable_ssl_verify {
            settings.enrichment.verify_tls = false;
        }
        if self.no_enrich {
            settings.enrichment.enabled = false;
        }
    }
}

/// 解析 `Name: Value` 形式的请求头，缺少冒号的条目被忽略
pub fn parse_headers(raw: &[String]) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for entry in raw {
        match entry.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            _ => warn!(header = %entry, "Ignoring malformed header, expected `Name: Value`"),
        }
    }
    headers
}

fn read_target_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read target file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(with_default_scheme)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_url_gets_default_scheme() {
        let cli = Cli::parse_from(["wlmaker", "example.com"]);
        assert_eq!(cli.targets().unwrap(), vec!["https://example.com"]);
    }

    #[test]
    fn test_url_option_takes_precedence_and_keeps_scheme() {
        let cli = Cli::parse_from(["wlmaker", "-u", "http://a.example.com", "b.example.com"]);
        assert_eq!(cli.targets().unwrap(), vec!["http://a.example.com"]);
    }

    #[test]
    fn test_target_file_is_trimmed_and_blank_lines_dropped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  example.com  \n\nhttps://b.example.com\n   ").unwrap();

        let cli = Cli::parse_from(["wlmaker", "--file", file.path().to_str().unwrap()]);
        assert_eq!(
            cli.targets().unwrap(),
            vec!["https://example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn test_no_target() {
        let cli = Cli::parse_from(["wlmaker"]);
        assert!(!cli.has_target());
    }

    #[test]
    fn test_malformed_headers_are_ignored() {
        let headers = parse_headers(&[
            "User-Agent: Mozilla/5.0".to_string(),
            "broken".to_string(),
            "X-Forwarded-For:127.0.0.1".to_string(),
        ]);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["User-Agent"], "Mozilla/5.0");
        assert_eq!(headers["X-Forwarded-For"], "127.0.0.1");
    }

    #[test]
    fn test_overrides_are_applied() {
        let cli = Cli::parse_from([
            "wlmaker",
            "example.com",
            "--headers",
            "X-A: 1",
            "X-B: 2",
            "--format",
            "all",
            "--scope",
            "fuzzy",
            "--threads",
            "2",
            "--wayback-timeout",
            "30",
            "--disable-ssl-verify",
            "--no-enrich",
        ]);
        let mut settings = Settings::with_defaults().unwrap();
        cli.apply(&mut settings);

        assert_eq!(settings.request.headers.len(), 2);
        assert_eq!(settings.output.format, OutputFormat::All);
        assert_eq!(settings.crawl.scope, Some(CrawlScope::Fuzzy));
        assert_eq!(settings.concurrency.threads, 2);
        assert_eq!(settings.archive.timeout, Some(30));
        assert!(!settings.enrichment.verify_tls);
        assert!(!settings.enrichment.enabled);
    }

    #[test]
    fn test_unset_options_keep_configured_values() {
        let cli = Cli::parse_from(["wlmaker", "example.com"]);
        let mut settings = Settings::with_defaults().unwrap();
        cli.apply(&mut settings);

        assert_eq!(settings.concurrency.threads, 5);
        assert_eq!(settings.archive.timeout, Some(120));
        assert_eq!(settings.output.format, OutputFormat::Txt);
    }
}

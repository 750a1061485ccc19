//! Crankshaft CLI.
//!
//! `crankshaft patch` rewrites the Steam UI scripts with plugin hook points;
//! `crankshaft cleanup` puts the originals back. Cleanup matters: Steam
//! notices modified resources on its next launch and goes through a long
//! self-repair if they are left patched.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crankshaft::client::NoopClient;
use crankshaft::config::{self, PatchConfig, ScanWindows};
use crankshaft::patcher;
use crankshaft::unmin::JsBeautify;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut command = "patch";
    let mut steamui_dir = config::default_steamui_dir();
    let mut cache_dir = config::default_cache_dir();
    let mut server_port = config::DEFAULT_SERVER_PORT;
    let mut no_cache = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "patch" => command = "patch",
            "cleanup" => command = "cleanup",
            "--steamui" => steamui_dir = PathBuf::from(next_value(&mut iter, "--steamui")?),
            "--cache-dir" => cache_dir = PathBuf::from(next_value(&mut iter, "--cache-dir")?),
            "--port" => {
                server_port = next_value(&mut iter, "--port")?
                    .parse()
                    .context("invalid --port value")?;
            }
            "--no-cache" => no_cache = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
    }

    if command == "cleanup" {
        patcher::cleanup(&steamui_dir);
        return Ok(());
    }

    if !steamui_dir.exists() {
        bail!("Steam UI directory not found at {}", steamui_dir.display());
    }
    if !no_cache {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("creating cache directory {}", cache_dir.display()))?;
    }

    let mut patch_config = PatchConfig::new(steamui_dir, gen_auth_token());
    patch_config.cache_dir = cache_dir;
    patch_config.server_port = server_port;
    patch_config.no_cache = no_cache;
    patch_config.windows = ScanWindows::load_or_default(&config::default_windows_file());

    let summary = patcher::patch_all(&patch_config, &JsBeautify::resolve(), &NoopClient)?;
    if let Some(e) = summary.overall_failure() {
        bail!("load-bearing patch failed: {e}");
    }

    Ok(())
}

fn next_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a String> {
    iter.next().with_context(|| format!("{flag} requires a value"))
}

/// Per-run authorization token: 16 random bytes, hex-encoded. Baked into the
/// patched scripts and checked by the local RPC front door.
fn gen_auth_token() -> String {
    let bytes: [u8; 16] = rand::random();
    let mut token = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(token, "{b:02x}");
    }
    token
}

fn print_usage() {
    println!(
        "Usage: crankshaft [patch|cleanup] [options]

Commands:
  patch             Patch the Steam UI scripts (default)
  cleanup           Restore original Steam UI scripts

Options:
  --steamui <dir>   Steam UI directory (default: ~/.steam/steam/steamui)
  --cache-dir <dir> Patched-artifact cache directory
  --port <port>     Local RPC front door port (default: 8080)
  --no-cache        Skip the patched-artifact cache entirely"
    );
}

//! vdom-replay - sync a sequence of JSON descriptions into a DOM tree
//!
//! Usage: `vdom-replay <frames.json> [config.json]`, e.g. `vdom-replay demos/frames.json`
//!
//! `frames.json` holds an array of root descriptions. Each frame is synced
//! in order and the resulting HTML is printed with the frame's stats.

use std::path::Path;

use anyhow::{bail, Context, Result};
use fos_dom::DomTree;
use fos_vdom::{NodeDesc, NodeRenderer, RendererConfig};
use tracing_subscriber::EnvFilter;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(frames_path) = args.next() else {
        bail!("usage: vdom-replay <frames.json> [config.json]");
    };
    let config: RendererConfig = match args.next() {
        Some(path) => read_json(Path::new(&path))?,
        None => RendererConfig::default(),
    };

    let frames: Vec<NodeDesc> = read_json(Path::new(&frames_path))?;
    let Some((first, rest)) = frames.split_first() else {
        bail!("{frames_path} contains no frames");
    };

    tracing::info!("Replaying {} frames from {}", frames.len(), frames_path);

    let mut renderer = NodeRenderer::with_config(DomTree::new(), first, config)
        .context("initial sync failed")?;
    println!("frame 0: {}", renderer.host().to_html(renderer.html()));

    for (index, frame) in rest.iter().enumerate() {
        let frame_no = index + 1;
        let stats = renderer
            .sync(frame)
            .with_context(|| format!("sync of frame {frame_no} failed"))?;
        println!("frame {frame_no}: {stats:?}");
        println!("frame {frame_no}: {}", renderer.host().to_html(renderer.html()));
    }

    tracing::info!("{} keyed elements live after replay", renderer.len());
    Ok(())
}

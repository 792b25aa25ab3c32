//! CLI command handler: unpack pages by default; --list prints the page
//! table without starting the pipeline.

use anyhow::{Context, Result, bail};
use crossbeam_channel::Receiver;
use kdam::{BarExt, tqdm};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::container::{Container, ZipContainer};
use crate::events::{PageEvent, channel_listener};
use crate::natsort::natural_cmp;
use crate::pipeline::PageStream;
use crate::types::StreamOptions;
use crate::utils::setup_logging;

use super::args::Cli;

fn setup_opts(cli: &Cli) -> StreamOptions {
    setup_logging(cli.verbose.unwrap_or(false));
    let mut opts = StreamOptions::default();
    if let Some(cap) = cli.pipe_capacity {
        opts.pipe_capacity = cap as usize;
    }
    opts
}

/// Unpack pages (default) or print the page table when --list.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    if cli.list {
        list_pages(cli)
    } else {
        unpack_pages(cli, opts)
    }
}

fn list_pages(cli: &Cli) -> Result<()> {
    let container = ZipContainer::open_path(&cli.archive)
        .with_context(|| format!("failed to open '{}'", cli.archive.display()))?;
    let mut paths: Vec<&str> = container.entries().iter().map(|e| e.path.as_str()).collect();
    paths.sort_by(|a, b| natural_cmp(a, b));
    for (index, path) in paths.iter().enumerate() {
        println!("{index:4}  {path}");
    }
    Ok(())
}

const EVENT_POLL: Duration = Duration::from_millis(200);

/// Next event, polling so an interrupt breaks the wait even while the
/// stream (which holds the channel's sending side through its listener
/// list) is still alive.
fn next_event(events: &Receiver<PageEvent>, interrupted: &AtomicBool) -> Option<PageEvent> {
    loop {
        if interrupted.load(Ordering::SeqCst) {
            return None;
        }
        match events.recv_timeout(EVENT_POLL) {
            Ok(event) => return Some(event),
            Err(e) if e.is_timeout() => continue,
            Err(_) => return None,
        }
    }
}

fn unpack_pages(cli: &Cli, opts: StreamOptions) -> Result<()> {
    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("failed to create '{}'", cli.out.display()))?;

    let archive = cli.archive.clone();
    let factory = Box::new(move || {
        ZipContainer::open_path(&archive).map(|c| Box::new(c) as Box<dyn Container>)
    });
    let (listener, events) = channel_listener();
    let stream = Arc::new(PageStream::new(factory, opts));
    stream.add_listener(listener);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let handler_stream = Arc::clone(&stream);
    ctrlc::set_handler(move || {
        warn!("interrupted, stopping workers");
        flag.store(true, Ordering::SeqCst);
        handler_stream.stop();
    })
    .context("failed to install Ctrl-C handler")?;

    stream.start();

    // The container opens on the extraction worker; wait for its verdict.
    let total = loop {
        match next_event(&events, &interrupted) {
            Some(PageEvent::SizeReady(n)) => break n,
            Some(PageEvent::OpenError(msg)) => {
                bail!("cannot open '{}': {msg}", cli.archive.display())
            }
            Some(_) => continue,
            None => return Ok(()), // interrupted before the container opened
        }
    };
    debug!("container open, {total} pages");

    let targets: Vec<usize> = if cli.page.is_empty() {
        (0..total).collect()
    } else {
        cli.page.clone()
    };
    // The queue serves newest-first; request in reverse so pages resolve in
    // ascending order.
    for &index in targets.iter().rev() {
        stream.request(index);
    }

    let mut bar = tqdm!(total = targets.len(), desc = "Unpacking");
    let mut pending: HashSet<usize> = targets.iter().copied().collect();
    let mut failed = 0_usize;
    while !pending.is_empty() {
        let Some(event) = next_event(&events, &interrupted) else {
            break; // interrupted or stream gone
        };
        match event {
            PageEvent::PageReady(index, image) => {
                if !pending.remove(&index) {
                    continue;
                }
                let file = cli.out.join(format!("page-{:04}.png", index + 1));
                image
                    .save_with_format(&file, image::ImageFormat::Png)
                    .with_context(|| format!("failed to write '{}'", file.display()))?;
                let _ = bar.update(1);
            }
            PageEvent::PageFailed(index, reason) => {
                if !pending.remove(&index) {
                    continue;
                }
                warn!("page {index}: {reason}");
                failed += 1;
                let _ = bar.update(1);
            }
            _ => {}
        }
    }
    stream.stop();
    eprintln!();

    if !pending.is_empty() {
        warn!("stopped with {} pages unresolved", pending.len());
    }
    if failed > 0 {
        warn!("{failed} of {} pages failed to decode", targets.len());
    }
    debug!(
        "wrote {} pages to {}",
        targets.len() - failed - pending.len(),
        cli.out.display()
    );
    Ok(())
}

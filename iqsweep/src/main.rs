mod args;

use std::io::Write;
use std::thread;

use anyhow::Context;
use clap::Parser;
use iqsweep_engine::{Sweeper, Welch, assemble, plan, sdr, sinks};
use iqsweep_messages::{Command, Event};
use log::{LevelFilter, info};

use crate::args::Args;

/// Draw a one-line progress bar on stderr until the sweep drops its sender.
fn show_progress(event_rx: flume::Receiver<Event>) {
    const WIDTH: usize = 40;
    for event in event_rx {
        match event {
            Event::SweepStarted { total_steps } => {
                eprint!("\r[{}] 0/{total_steps}", " ".repeat(WIDTH));
            }
            Event::StepCompleted {
                index,
                total,
                center_frequency,
            } => {
                let done = index + 1;
                let filled = WIDTH * done / total.max(1);
                eprint!(
                    "\r[{}{}] {done}/{total} {center_frequency}   ",
                    "#".repeat(filled),
                    " ".repeat(WIDTH - filled)
                );
            }
            Event::SweepFinished { .. } => {}
        }
        let _ = std::io::stderr().flush();
    }
    eprintln!();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse_from(args::expand_single_dash_flags(std::env::args_os()));

    env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} [{}] {}",
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .filter_level(args.verbose.log_level_filter())
        .filter_module("plotters", LevelFilter::Warn)
        .init();

    let config = args.sweep_config();
    config.validate().context("Invalid sweep parameters")?;
    let plan = plan(&config);
    info!(
        "Sweeping {} MHz to {} MHz in {} steps of {}",
        args.start_freq,
        args.stop_freq,
        plan.len(),
        config.sample_rate()
    );

    let device = sdr::open(&args.source_config()).context("Failed to open IQ source")?;

    // Create flume channels for bidirectional communication
    let (cmd_tx, cmd_rx) = flume::unbounded();
    let (event_tx, event_rx) = flume::unbounded();

    ctrlc::set_handler(move || {
        let _ = cmd_tx.send(Command::Stop);
    })
    .context("Failed to install Ctrl-C handler")?;

    let progress_handle = thread::spawn(move || show_progress(event_rx));

    let outcome = Sweeper::new(device, Welch::new(), config)
        .with_commands(cmd_rx)
        .with_events(event_tx)
        .run(&plan);

    // The Sweeper is gone, so the progress channel is closed
    progress_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Progress thread panicked"))?;

    let results = outcome.context("Sweep failed, no output written")?;
    let dataset = assemble(&results);

    if let Some((freq, power)) = dataset.peak() {
        info!("{} points, strongest bin {power} at {freq}", dataset.len());
    }

    if args.save {
        let now = chrono::Local::now().naive_local();
        let stem = sinks::output_stem(args.start_freq, args.stop_freq, &now);
        let title = sinks::plot_title(args.start_freq, args.stop_freq, &now);
        let saved = sinks::save(&dataset, &args.output_dir, &stem, &title)
            .context("Failed to save sweep output")?;
        println!("{}", saved.data.display());
        println!("{}", saved.plot.display());
    } else {
        info!("Nothing saved; pass --save to write the data table and plot");
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use command_proto::{decode_sequence, encode_step};
use hub_link::{Dialer, HubLink, MockDialer, ReconnectPolicy};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Vigil Robotics operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    Mock,
    Rfcomm,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a command-sequence JSON and deliver it to one hub, step by step
    HubSend {
        /// Hub address (e.g. /dev/rfcomm0)
        #[arg(long, default_value = "/dev/rfcomm0")]
        address: String,
        /// Transport backend
        #[arg(long, value_enum, default_value_t = Backend::Mock)]
        backend: Backend,
        /// The sequence, e.g. '[[{"cmd":"move","val":30}]]'
        #[arg(long)]
        json: String,
        /// Per-step ack timeout in seconds
        #[arg(long, default_value_t = 15)]
        ack_timeout_s: u64,
    },
    /// Print live microphone levels in dB
    Meter {
        /// How long to run
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Level annotated as ACTIVE above this threshold
        #[arg(long, default_value_t = -35.0)]
        threshold_db: f64,
    },
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::HubSend {
            address,
            backend,
            json,
            ack_timeout_s,
        } => hub_send(&address, backend, &json, Duration::from_secs(ack_timeout_s)),
        Commands::Meter {
            seconds,
            threshold_db,
        } => meter(seconds, threshold_db),
    }
}

fn hub_send(address: &str, backend: Backend, json: &str, ack_timeout: Duration) -> Result<()> {
    let seq = decode_sequence(json).map_err(|e| anyhow::anyhow!("sequence rejected: {e}"))?;
    if seq.is_empty() {
        println!("empty sequence, nothing to send");
        return Ok(());
    }

    let dialer: Box<dyn Dialer> = match backend {
        Backend::Mock => Box::new(MockDialer::new().0),
        Backend::Rfcomm => {
            #[cfg(feature = "rfcomm")]
            {
                Box::new(hub_link::RfcommDialer::default())
            }
            #[cfg(not(feature = "rfcomm"))]
            {
                anyhow::bail!("rebuild with the `rfcomm` feature for hardware sends")
            }
        }
    };
    let link = HubLink::connect("hub", address, dialer, ReconnectPolicy::default());

    for (index, step) in seq.steps.iter().enumerate() {
        let payload = encode_step(step);
        match link.send_batch(&payload, ack_timeout) {
            Ok(()) => println!("step {index}: acknowledged  {payload}"),
            Err(e) => println!("step {index}: FAILED ({e})  {payload}"),
        }
    }
    Ok(())
}

#[cfg(feature = "audio")]
fn meter(seconds: u64, threshold_db: f64) -> Result<()> {
    use audio_gate::{level_db, mic};
    use std::time::Instant;

    let (_stream, cfg, frames) = mic::start_default_input(1024)
        .map_err(|e| anyhow::anyhow!("cannot open audio input: {e}"))?;
    println!(
        "listening at {} Hz for {seconds}s (threshold {threshold_db} dB)",
        cfg.sample_rate_hz
    );

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        let Ok(chunk) = frames.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let db = level_db(&chunk);
        let tag = if db > threshold_db { "ACTIVE" } else { "silent" };
        println!("{db:>8.1} dB  {tag}");
    }
    Ok(())
}

#[cfg(not(feature = "audio"))]
fn meter(_seconds: u64, _threshold_db: f64) -> Result<()> {
    anyhow::bail!("rebuild with the `audio` feature to use the meter")
}

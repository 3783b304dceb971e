use ai_client::plugin::{
    new_conversationalist, new_interpreter, new_scene_describer, new_synth, new_transcriber,
    BackendKind,
};
use ai_client::MockFrameGrabber;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use command_dispatch::{Collaborators, DispatchConfig, Orchestrator};
use hub_link::{Dialer, HubLink, HubRegistry, MockDialer, ReconnectPolicy};
use std::sync::Arc;
use target_locator::{LinearFovAim, SceneDetector, TargetLocator, TargetPolicy};
use tracing::info;

#[derive(Parser)]
#[command(name = "vigil-daemon")]
#[command(about = "Voice-triggered command dispatch for the two-hub ground robot")]
struct Args {
    /// Hub endpoints as name=address pairs (repeatable)
    #[arg(long = "hub", default_values_t = [
        "hub1=/dev/rfcomm0".to_string(),
        "hub2=/dev/rfcomm1".to_string(),
    ])]
    hubs: Vec<String>,

    /// Transport backend for the hub links
    #[arg(long, value_enum, default_value_t = HubBackend::Mock)]
    hub_backend: HubBackend,

    /// Backend for the hosted AI collaborators
    #[arg(long, value_enum, default_value_t = AiBackend::Mock)]
    ai_backend: AiBackend,

    /// Scene-description (VLM) service endpoint, required for --ai-backend live
    #[arg(long)]
    vision_endpoint: Option<String>,

    /// Face-recognition service endpoint, required for --ai-backend live
    #[arg(long)]
    detector_endpoint: Option<String>,

    /// Text-to-speech voice
    #[arg(long, default_value = "antoni")]
    voice_id: String,

    /// Recording starts above this level
    #[arg(long, default_value_t = -35.0)]
    start_threshold_db: f64,

    /// Silence below this level ends a recording
    #[arg(long, default_value_t = -35.0)]
    stop_threshold_db: f64,

    /// Continuous silence required to end a recording, in milliseconds
    #[arg(long, default_value_t = 1000)]
    silence_ms: u64,

    /// Ally names the targeting system must never engage (repeatable)
    #[arg(long = "ally")]
    allies: Vec<String>,

    /// WAV file replacing the synthesized wait chime
    #[cfg(feature = "audio")]
    #[arg(long)]
    wait_chime: Option<std::path::PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum HubBackend {
    Mock,
    Rfcomm,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum AiBackend {
    Mock,
    Live,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let args = Args::parse();

    info!("vigil-daemon starting");
    info!(hub_backend = ?args.hub_backend, ai_backend = ?args.ai_backend);

    let hubs = build_registry(&args)?;
    let collab = build_collaborators(&args)?;
    let locator = build_locator(&args)?;

    let orch = Orchestrator::new(DispatchConfig::default(), hubs, collab, locator);
    #[cfg(feature = "audio")]
    let orch = apply_wait_chime(orch, &args)?;
    let orch = Arc::new(orch);

    #[cfg(feature = "audio")]
    {
        run_with_microphone(orch, &args).await?;
    }

    #[cfg(not(feature = "audio"))]
    {
        let _ = &orch;
        tracing::warn!("audio feature not enabled, idling in mock mode");
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("vigil-daemon shutting down");
    Ok(())
}

fn build_registry(args: &Args) -> Result<HubRegistry> {
    let mut links = Vec::with_capacity(args.hubs.len());
    for spec in &args.hubs {
        let (name, address) = spec
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --hub spec {spec:?}, expected name=address"))?;
        let dialer: Box<dyn Dialer> = match args.hub_backend {
            HubBackend::Mock => Box::new(MockDialer::new().0),
            HubBackend::Rfcomm => {
                #[cfg(feature = "live")]
                {
                    Box::new(hub_link::RfcommDialer::default())
                }
                #[cfg(not(feature = "live"))]
                {
                    anyhow::bail!("rfcomm backend requires the `live` feature")
                }
            }
        };
        links.push(Arc::new(HubLink::connect(
            name,
            address,
            dialer,
            ReconnectPolicy::default(),
        )));
    }
    Ok(HubRegistry::new(links))
}

fn build_collaborators(args: &Args) -> Result<Collaborators> {
    let kind = match args.ai_backend {
        AiBackend::Mock => BackendKind::Mock,
        AiBackend::Live => BackendKind::Live,
    };
    // Missing credentials or endpoints surface here, before the audio
    // stream opens: a daemon that cannot reach its brains should not start.
    let transcriber = new_transcriber(kind).map_err(anyhow::Error::msg)?;
    let interpreter = new_interpreter(kind).map_err(anyhow::Error::msg)?;
    let converser = new_conversationalist(kind).map_err(anyhow::Error::msg)?;
    let synth = new_synth(kind, &args.voice_id).map_err(anyhow::Error::msg)?;
    let describer = new_scene_describer(
        kind,
        args.vision_endpoint.as_deref(),
        Box::new(MockFrameGrabber),
    )
    .map_err(anyhow::Error::msg)?;

    Ok(Collaborators {
        transcriber: transcriber.into(),
        describer: describer.into(),
        interpreter: interpreter.into(),
        converser: converser.into(),
        synth: synth.into(),
        output: build_output(),
    })
}

fn build_output() -> Arc<dyn audio_gate::AudioOutput> {
    #[cfg(feature = "audio")]
    {
        Arc::new(audio_gate::CpalOutput)
    }
    #[cfg(not(feature = "audio"))]
    {
        Arc::new(audio_gate::NullOutput)
    }
}

fn build_locator(args: &Args) -> Result<TargetLocator> {
    let detector: Box<dyn SceneDetector> = match args.ai_backend {
        AiBackend::Mock => Box::new(target_locator::MockDetector::none()),
        AiBackend::Live => {
            #[cfg(feature = "live")]
            {
                let endpoint = args
                    .detector_endpoint
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("--detector-endpoint is required for live"))?;
                Box::new(
                    target_locator::HttpDetector::new(endpoint, Box::new(MockFrameGrabber))
                        .map_err(|e| anyhow::anyhow!("detector: {e}"))?,
                )
            }
            #[cfg(not(feature = "live"))]
            {
                anyhow::bail!("live detector requires the `live` feature")
            }
        }
    };
    Ok(TargetLocator::new(
        detector,
        Box::new(LinearFovAim::default()),
        TargetPolicy::new(args.allies.clone()),
    ))
}

#[cfg(feature = "audio")]
fn apply_wait_chime(orch: Orchestrator, args: &Args) -> Result<Orchestrator> {
    let Some(path) = &args.wait_chime else {
        return Ok(orch);
    };
    let (samples, rate) = audio_gate::chime::load_wav(path)
        .map_err(|e| anyhow::anyhow!("wait chime {path:?}: {e}"))?;
    Ok(orch.with_wait_chime(samples, rate))
}

#[cfg(feature = "audio")]
async fn run_with_microphone(orch: Arc<Orchestrator>, args: &Args) -> Result<()> {
    use audio_gate::{mic, GateConfig};
    use std::time::Duration;

    // Failure to open the input stream is the one unrecoverable startup
    // condition besides credentials.
    let (_stream, mic_cfg, frames) = mic::start_default_input(1024)
        .map_err(|e| anyhow::anyhow!("cannot open audio input: {e}"))?;
    info!(
        sample_rate_hz = mic_cfg.sample_rate_hz,
        channels = mic_cfg.channels,
        "microphone started"
    );

    let gate_cfg = GateConfig {
        start_threshold_db: args.start_threshold_db,
        stop_threshold_db: args.stop_threshold_db,
        silence_duration: Duration::from_millis(args.silence_ms),
        sample_rate_hz: mic_cfg.sample_rate_hz,
        channels: 1,
    };
    info!(
        start_db = gate_cfg.start_threshold_db,
        stop_db = gate_cfg.stop_threshold_db,
        silence_ms = args.silence_ms,
        "voice detection active, speak to trigger a cycle"
    );

    let pump = command_dispatch::spawn_audio_pump(
        orch,
        gate_cfg,
        frames,
        tokio::runtime::Handle::current(),
    );

    let _ = tokio::signal::ctrl_c().await;
    info!("interrupt received");
    drop(_stream);
    let _ = pump;
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

use crate::Orchestrator;
use audio_gate::{AudioGate, GateConfig, GateEvent};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Drive the gate from the microphone channel on a dedicated OS thread.
///
/// The audio thread never blocks on network I/O: cycles and scene
/// captures are handed to the tokio runtime, and while a cycle is in
/// flight every incoming frame is dropped so cycles cannot overlap.
pub fn spawn_audio_pump(
    orch: Arc<Orchestrator>,
    gate_cfg: GateConfig,
    frames: Receiver<Vec<i16>>,
    runtime: tokio::runtime::Handle,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut gate = AudioGate::new(gate_cfg);
        let mut vision: Option<tokio::task::JoinHandle<Option<String>>> = None;
        while let Ok(chunk) = frames.recv() {
            if !orch.session().accepting_audio() {
                continue;
            }
            match gate.push_frame(&chunk, Instant::now()) {
                Some(GateEvent::UtteranceStarted) => {
                    orch.session().begin_recording();
                    let this = orch.clone();
                    vision = Some(runtime.spawn(async move { this.describe_scene().await }));
                }
                Some(GateEvent::UtteranceFinished(buffer)) => {
                    // Flip to Processing on this thread before handing
                    // off, so frames arriving ahead of the cycle task are
                    // already dropped.
                    orch.session().begin_processing();
                    let this = orch.clone();
                    let vision = vision.take();
                    runtime.spawn(async move { this.run_cycle(buffer, vision).await });
                }
                None => {}
            }
        }
        info!("audio channel closed, pump exiting");
    })
}

use crate::{DispatchConfig, SessionCell};
use ai_client::{CommandInterpreter, Conversationalist, SceneDescriber, SpeechSynth, Transcriber};
use audio_gate::{chime, AudioBuffer, AudioOutput};
use command_proto::{decode_sequence, encode_step, CommandSequence};
use hub_link::HubRegistry;
use std::sync::Arc;
use std::time::Duration;
use target_locator::{engage_steps, fallback_step, TargetLocator};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The pipeline's external collaborators, injected at startup.
pub struct Collaborators {
    pub transcriber: Arc<dyn Transcriber>,
    pub describer: Arc<dyn SceneDescriber>,
    pub interpreter: Arc<dyn CommandInterpreter>,
    pub converser: Arc<dyn Conversationalist>,
    pub synth: Arc<dyn SpeechSynth>,
    pub output: Arc<dyn AudioOutput>,
}

/// Owns one full record -> transcribe -> interpret -> dispatch cycle and
/// the fan-out to both hubs. The daemon holds it in an `Arc` and spawns
/// cycle tasks off it.
pub struct Orchestrator {
    cfg: DispatchConfig,
    hubs: HubRegistry,
    session: SessionCell,
    collab: Collaborators,
    locator: TargetLocator,
    /// Serializes every outbound LLM call, respecting provider rate limits.
    api_gate: Arc<tokio::sync::Mutex<()>>,
    wait_chime: Vec<i16>,
    wait_chime_rate: u32,
}

impl Orchestrator {
    pub fn new(
        cfg: DispatchConfig,
        hubs: HubRegistry,
        collab: Collaborators,
        locator: TargetLocator,
    ) -> Self {
        Self {
            cfg,
            hubs,
            session: SessionCell::new(),
            collab,
            locator,
            api_gate: Arc::new(tokio::sync::Mutex::new(())),
            wait_chime: chime::wait_chime(22_050),
            wait_chime_rate: 22_050,
        }
    }

    /// Replace the synthesized wait chime (e.g. with a WAV from disk).
    pub fn with_wait_chime(mut self, samples: Vec<i16>, sample_rate_hz: u32) -> Self {
        self.wait_chime = samples;
        self.wait_chime_rate = sample_rate_hz;
        self
    }

    pub fn session(&self) -> &SessionCell {
        &self.session
    }

    /// One concurrent scene capture; failures degrade to `None`.
    pub async fn describe_scene(&self) -> Option<String> {
        match self.collab.describer.describe().await {
            Ok(desc) if !desc.trim().is_empty() => Some(desc),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "scene description failed");
                None
            }
        }
    }

    /// Run one full cycle over a finalized utterance buffer.
    ///
    /// `vision` is the scene-description task started when recording
    /// began; it is joined here with a bounded wait. The cycle always
    /// ends back in `Idle`, whatever failed along the way.
    pub async fn run_cycle(
        &self,
        buffer: AudioBuffer,
        vision: Option<JoinHandle<Option<String>>>,
    ) {
        self.session.begin_processing();

        if buffer.is_empty() {
            info!("empty buffer, nothing to process");
            self.session.complete_cycle();
            return;
        }

        self.play_wait_chime().await;

        let scene = self.join_vision(vision).await;
        if let Some(scene) = &scene {
            info!(scene = %truncate(scene, 100), "scene description ready");
        }

        let Some(transcript) = self.transcribe(&buffer).await else {
            self.session.complete_cycle();
            return;
        };
        info!(%transcript, "utterance transcribed");

        // Reply generation and playback run in the background; the cycle
        // joins them with a bounded wait before returning to Idle so two
        // responses never overlap.
        let conversation = {
            let api_gate = self.api_gate.clone();
            let converser = self.collab.converser.clone();
            let synth = self.collab.synth.clone();
            let output = self.collab.output.clone();
            let transcript = transcript.clone();
            let scene = scene.clone();
            tokio::spawn(async move {
                conversation_flow(api_gate, converser, synth, output, &transcript, scene.as_deref())
                    .await;
            })
        };

        if let Some(raw) = self.interpret(&transcript, scene.as_deref()).await {
            match decode_sequence(&raw) {
                Ok(seq) if !seq.is_empty() => {
                    self.session.begin_dispatch();
                    self.dispatch_sequence(&seq).await;
                }
                Ok(_) => info!("empty command sequence, nothing to dispatch"),
                Err(e) => warn!(error = %e, "command sequence rejected"),
            }
        }

        self.session.await_conversation();
        match timeout(self.cfg.conversation_timeout, conversation).await {
            Ok(Ok(())) => debug!("conversation settled"),
            Ok(Err(e)) => warn!(error = %e, "conversation task aborted"),
            Err(_) => warn!("conversation still running at cycle end, reply discarded"),
        }

        self.session.complete_cycle();
        info!("cycle complete, listening");
    }

    /// Walk the sequence in strict order. Step N+1 never starts before
    /// step N has resolved (ack, failure, or timeout) on both hubs.
    pub async fn dispatch_sequence(&self, seq: &CommandSequence) {
        info!(steps = seq.len(), "dispatching command sequence");
        for (index, step) in seq.steps.iter().enumerate() {
            if step.wants_auto_engage() {
                self.engage(index).await;
            } else {
                self.broadcast(index, encode_step(step)).await;
            }
        }
    }

    async fn engage(&self, step_index: usize) {
        info!(step = step_index, "autonomous engage requested");
        let engagement = match timeout(self.cfg.locate_timeout, self.locator.acquire()).await {
            Ok(Ok(engagement)) => engagement,
            Ok(Err(e)) => {
                warn!(step = step_index, error = %e, "target acquisition failed");
                None
            }
            Err(_) => {
                warn!(step = step_index, "target acquisition timed out");
                None
            }
        };

        match engagement {
            None => {
                warn!(step = step_index, "no target, firing without aim");
                self.broadcast(step_index, encode_step(&fallback_step()))
                    .await;
            }
            Some(engagement) => {
                let [rotate, fire, back] = engage_steps(&engagement.aim);
                self.broadcast(step_index, encode_step(&rotate)).await;
                self.broadcast(step_index, encode_step(&fire)).await;
                // Let the shot finish before leaving the target line.
                tokio::time::sleep(self.cfg.settle_pause).await;
                self.broadcast(step_index, encode_step(&back)).await;
            }
        }
    }

    /// One batch to every hub in parallel; waits for all of them. A
    /// single hub's failure is logged and does not abort the sequence.
    async fn broadcast(&self, step_index: usize, payload: String) {
        let mut sends = Vec::with_capacity(self.hubs.len());
        for link in self.hubs.links() {
            let link = link.clone();
            let payload = payload.clone();
            let ack_timeout = self.cfg.hub_ack_timeout;
            let name = link.name().to_string();
            sends.push((
                name,
                tokio::task::spawn_blocking(move || link.send_batch(&payload, ack_timeout)),
            ));
        }
        // send_batch bounds the ack wait itself; the outer margin covers
        // reconnect backoff before giving up on the join.
        let join_limit = self.cfg.hub_ack_timeout + Duration::from_secs(5);
        for (hub, task) in sends {
            match timeout(join_limit, task).await {
                Ok(Ok(Ok(()))) => debug!(%hub, step = step_index, "batch delivered"),
                Ok(Ok(Err(e))) => warn!(%hub, step = step_index, error = %e, "hub send failed"),
                Ok(Err(e)) => warn!(%hub, step = step_index, error = %e, "hub task aborted"),
                Err(_) => warn!(%hub, step = step_index, "hub send still blocked, abandoning"),
            }
        }
    }

    async fn transcribe(&self, buffer: &AudioBuffer) -> Option<String> {
        let samples = buffer.samples();
        let call = self
            .collab
            .transcriber
            .transcribe(&samples, buffer.sample_rate_hz());
        match timeout(self.cfg.transcribe_timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => {
                info!("empty transcription, cycle aborted");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "transcription failed, cycle aborted");
                None
            }
            Err(_) => {
                warn!("transcription timed out, cycle aborted");
                None
            }
        }
    }

    async fn interpret(&self, transcript: &str, scene: Option<&str>) -> Option<String> {
        let _permit = self.api_gate.lock().await;
        let call = self.collab.interpreter.interpret(transcript, scene);
        match timeout(self.cfg.interpret_timeout, call).await {
            Ok(Ok(raw)) => {
                debug!(raw = %truncate(&raw, 200), "command sequence generated");
                Some(raw)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "command interpretation failed, dispatch skipped");
                None
            }
            Err(_) => {
                warn!("command interpretation timed out, dispatch skipped");
                None
            }
        }
    }

    async fn play_wait_chime(&self) {
        let samples = self.wait_chime.clone();
        let rate = self.wait_chime_rate;
        play(self.collab.output.clone(), samples, rate).await;
    }

    async fn join_vision(
        &self,
        vision: Option<JoinHandle<Option<String>>>,
    ) -> Option<String> {
        let handle = vision?;
        match timeout(self.cfg.vision_timeout, handle).await {
            Ok(Ok(scene)) => scene,
            Ok(Err(e)) => {
                warn!(error = %e, "vision task aborted");
                None
            }
            Err(_) => {
                warn!("vision timed out, proceeding without scene description");
                None
            }
        }
    }
}

/// The background half of a cycle: reply, synthesize, speak.
async fn conversation_flow(
    api_gate: Arc<tokio::sync::Mutex<()>>,
    converser: Arc<dyn Conversationalist>,
    synth: Arc<dyn SpeechSynth>,
    output: Arc<dyn AudioOutput>,
    transcript: &str,
    scene: Option<&str>,
) {
    let reply = {
        let _permit = api_gate.lock().await;
        match converser.reply(transcript, scene).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                debug!("no conversational reply generated");
                return;
            }
            Err(e) => {
                warn!(error = %e, "conversation failed");
                return;
            }
        }
    };
    info!(reply = %truncate(&reply, 100), "speaking");

    let pcm = match synth.synthesize(&reply).await {
        Ok(pcm) => pcm,
        Err(e) => {
            warn!(error = %e, "speech synthesis failed, reply skipped");
            return;
        }
    };
    let rate = synth.sample_rate_hz();
    play(output, pcm, rate).await;
}

/// Best-effort blocking playback off the async threads.
async fn play(output: Arc<dyn AudioOutput>, samples: Vec<i16>, sample_rate_hz: u32) {
    let result = tokio::task::spawn_blocking(move || output.play(&samples, sample_rate_hz)).await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "playback failed"),
        Err(e) => warn!(error = %e, "playback task aborted"),
    }
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

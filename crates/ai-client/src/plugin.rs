//! Boxed backend factories keyed by a backend kind, so the binaries can
//! switch between mock and live collaborators with a flag.

use crate::{CommandInterpreter, Conversationalist, SceneDescriber, SpeechSynth, Transcriber};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BackendKind {
    Mock,
    Live,
}

pub fn new_transcriber(kind: BackendKind) -> Result<Box<dyn Transcriber>, String> {
    match kind {
        BackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                Ok(Box::new(crate::MockTranscriber::reply(
                    "Vigil, hold position.",
                )))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err("mock feature not enabled".to_string())
            }
        }
        BackendKind::Live => {
            #[cfg(feature = "openai")]
            {
                let cfg = crate::OpenAiConfig::from_env().map_err(|e| e.to_string())?;
                crate::OpenAiTranscriber::new(cfg)
                    .map(|t| Box::new(t) as Box<dyn Transcriber>)
                    .map_err(|e| e.to_string())
            }
            #[cfg(not(feature = "openai"))]
            {
                Err("openai feature not enabled".to_string())
            }
        }
    }
}

pub fn new_interpreter(kind: BackendKind) -> Result<Box<dyn CommandInterpreter>, String> {
    match kind {
        BackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                Ok(Box::new(crate::MockInterpreter::empty()))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err("mock feature not enabled".to_string())
            }
        }
        BackendKind::Live => {
            #[cfg(feature = "openai")]
            {
                let cfg = crate::OpenAiConfig::from_env().map_err(|e| e.to_string())?;
                crate::OpenAiInterpreter::new(cfg)
                    .map(|t| Box::new(t) as Box<dyn CommandInterpreter>)
                    .map_err(|e| e.to_string())
            }
            #[cfg(not(feature = "openai"))]
            {
                Err("openai feature not enabled".to_string())
            }
        }
    }
}

pub fn new_conversationalist(kind: BackendKind) -> Result<Box<dyn Conversationalist>, String> {
    match kind {
        BackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                Ok(Box::new(crate::MockConversation::line("Holding position.")))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err("mock feature not enabled".to_string())
            }
        }
        BackendKind::Live => {
            #[cfg(feature = "openai")]
            {
                let cfg = crate::OpenAiConfig::from_env().map_err(|e| e.to_string())?;
                crate::OpenAiConversation::new(cfg)
                    .map(|t| Box::new(t) as Box<dyn Conversationalist>)
                    .map_err(|e| e.to_string())
            }
            #[cfg(not(feature = "openai"))]
            {
                Err("openai feature not enabled".to_string())
            }
        }
    }
}

pub fn new_synth(kind: BackendKind, voice_id: &str) -> Result<Box<dyn SpeechSynth>, String> {
    match kind {
        BackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                let _ = voice_id;
                Ok(Box::new(crate::MockSynth::default()))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err("mock feature not enabled".to_string())
            }
        }
        BackendKind::Live => {
            #[cfg(feature = "elevenlabs")]
            {
                let cfg = crate::ElevenLabsConfig::from_env(voice_id).map_err(|e| e.to_string())?;
                crate::ElevenLabsSynth::new(cfg)
                    .map(|t| Box::new(t) as Box<dyn SpeechSynth>)
                    .map_err(|e| e.to_string())
            }
            #[cfg(not(feature = "elevenlabs"))]
            {
                let _ = voice_id;
                Err("elevenlabs feature not enabled".to_string())
            }
        }
    }
}

pub fn new_scene_describer(
    kind: BackendKind,
    endpoint: Option<&str>,
    grabber: Box<dyn crate::FrameGrabber>,
) -> Result<Box<dyn SceneDescriber>, String> {
    match kind {
        BackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                let _ = (endpoint, grabber);
                Ok(Box::new(crate::MockSceneDescriber::reply(
                    "a clear test range, no contacts",
                )))
            }
            #[cfg(not(feature = "mock"))]
            {
                let _ = (endpoint, grabber);
                Err("mock feature not enabled".to_string())
            }
        }
        BackendKind::Live => {
            #[cfg(feature = "http-vision")]
            {
                let endpoint = endpoint.ok_or("vision endpoint is required for live backend")?;
                let cfg = crate::VisionConfig {
                    endpoint: endpoint.to_string(),
                };
                crate::HttpSceneDescriber::new(cfg, grabber)
                    .map(|t| Box::new(t) as Box<dyn SceneDescriber>)
                    .map_err(|e| e.to_string())
            }
            #[cfg(not(feature = "http-vision"))]
            {
                let _ = (endpoint, grabber);
                Err("http-vision feature not enabled".to_string())
            }
        }
    }
}

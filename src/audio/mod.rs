use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::audio_api::{AudioCommand, AudioError, AudioEvent, AudioOutput, ClipId};

mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::{next_sample_id, LoadError, SampleBuffer, SampleId};

use engine::{Engine, MAX_CLIPS, MAX_SAMPLES};

// Main-thread side of the output stream. Dropping it stops audio.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    events_rx: Receiver<AudioEvent>,
    sample_rate: u32,
    admission: Admission,
    _output_stream: cpal::Stream,
}

// Main-thread record of what the engine has room for, so the callback never
// has to grow its tables or drop a buffer it can't keep
#[derive(Debug, Default)]
struct Admission {
    samples: Vec<SampleId>,
}

impl Admission {
    fn check(&self, cmd: &AudioCommand) -> Result<(), AudioError> {
        match cmd {
            AudioCommand::RegisterSample { id, .. } if self.samples.contains(id) => Err(AudioError::DuplicateSound),
            AudioCommand::RegisterSample { .. } if self.samples.len() >= MAX_SAMPLES => Err(AudioError::EngineFull),
            AudioCommand::BindClip { clip: ClipId(n), .. } if *n as usize >= MAX_CLIPS => Err(AudioError::EngineFull),
            _ => Ok(()),
        }
    }

    // sample id to remember once the command has been queued
    fn registers(cmd: &AudioCommand) -> Option<SampleId> {
        match cmd {
            AudioCommand::RegisterSample { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl AudioHandle {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioOutput for AudioHandle {
    fn send(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        self.admission.check(&cmd)?;
        let registering = Admission::registers(&cmd);
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => AudioError::QueueFull,
            TrySendError::Disconnected(_) => AudioError::Disconnected,
        })?;
        if let Some(id) = registering {
            self.admission.samples.push(id);
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        self.events_rx.try_recv().ok()
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (events_tx, events_rx) = crossbeam_channel::bounded::<AudioEvent>(256);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream_f32(&device, &config.into(), rx, events_tx, channels)?;
            stream.play().context("failed to play output stream")?;
            log::info!("audio output running at {} Hz, {} channels", sample_rate, channels);

            Ok(AudioHandle {
                tx,
                events_rx,
                sample_rate,
                admission: Admission::default(),
                _output_stream: stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {:?} (only f32 supported)", other),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    events_tx: Sender<AudioEvent>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    engine.set_events_tx(events_tx);

    // grown once on the first callback, reused afterwards
    let mut mix: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if mix.len() < n_frames {
                mix.resize(n_frames, StereoFrame::silent());
            }
            let block = &mut mix[..n_frames];
            engine.render_block(block);
            write_interleaved(block, data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// Spread stereo frames over the device's channel layout
fn write_interleaved(frames: &[StereoFrame], data: &mut [f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            for (out, f) in data.iter_mut().zip(frames) {
                *out = f.downmix();
            }
        }
        n => {
            for (out, f) in data.chunks_exact_mut(n).zip(frames) {
                out[0] = f.left;
                out[1] = f.right;
                out[2..].fill(0.0);
            }
        }
    }
}

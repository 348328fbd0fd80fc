use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver};

use super::clock::StreamClock;
use super::renderer::RendererHandle;
use crate::synth::{Grain, NoiseBuffer};

/// Upper bound on simultaneously decaying grains. The pool is allocated
/// up front; the callback never allocates.
const MAX_GRAINS: usize = 64;

const GRAIN_QUEUE: usize = 256;
const NOISE_SEED: u32 = 12345;

/// Audio engine managing the output stream. Building it allocates the
/// shared noise buffer and starts the stream; the clock goes live once
/// the first callback runs.
pub struct AudioEngine {
    _stream: Stream,
    clock: StreamClock,
    renderer: RendererHandle,
}

impl AudioEngine {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available")?;
        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate().0 as f32;
        let noise = Arc::new(NoiseBuffer::new(sample_rate as usize, NOISE_SEED));
        let (grain_tx, grain_rx) = bounded(GRAIN_QUEUE);
        let frames = Arc::new(AtomicU64::new(0));
        let running = Arc::new(AtomicBool::new(false));

        let stream = match config.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config.into(),
                grain_rx,
                frames.clone(),
                running.clone(),
            )?,
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config.into(),
                grain_rx,
                frames.clone(),
                running.clone(),
            )?,
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config.into(),
                grain_rx,
                frames.clone(),
                running.clone(),
            )?,
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            clock: StreamClock::new(frames, running, sample_rate as f64),
            renderer: RendererHandle::new(grain_tx, sample_rate, noise),
        })
    }

    pub fn clock(&self) -> StreamClock {
        self.clock.clone()
    }

    pub fn renderer(&self) -> RendererHandle {
        self.renderer.clone()
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        grain_rx: Receiver<Grain>,
        frames: Arc<AtomicU64>,
        running: Arc<AtomicBool>,
    ) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let mut grains: Vec<Grain> = Vec::with_capacity(MAX_GRAINS);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                running.store(true, Ordering::Relaxed);

                // Accept newly scheduled grains, up to the pool cap.
                while let Ok(grain) = grain_rx.try_recv() {
                    if grains.len() < MAX_GRAINS {
                        grains.push(grain);
                    }
                }

                let mut frame_index = frames.load(Ordering::Relaxed);
                for frame in data.chunks_mut(channels) {
                    let mut sample = 0.0f32;
                    for grain in grains.iter_mut() {
                        sample += grain.render(frame_index);
                    }
                    sample = soft_clip(sample);

                    for channel_sample in frame.iter_mut() {
                        *channel_sample = T::from_sample(sample);
                    }
                    frame_index += 1;
                }
                frames.store(frame_index, Ordering::Relaxed);

                // Reap grains that reached their envelope floor.
                grains.retain(|grain| !grain.is_done());
            },
            |err| {
                eprintln!("Audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Soft clipping function to prevent harsh digital clipping
fn soft_clip(x: f32) -> f32 {
    if x > 1.0 {
        1.0 - (-x + 1.0).exp() * 0.5
    } else if x < -1.0 {
        -1.0 + (x + 1.0).exp() * 0.5
    } else {
        x
    }
}

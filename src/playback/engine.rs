use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use crate::error::PlaybackError;
use crate::models::PlaybackState;
use crate::playback::decoder::TrackDecoder;
use crate::playback::resample::{remap_channels, LinearResampler};
use crate::playback::MediaPlayer;

const STOPPED: u8 = 0;
const PLAYING: u8 = 1;
const PAUSED: u8 = 2;

/// Seconds of decoded audio kept ahead of the output callback
const BUFFER_AHEAD_SECS: usize = 2;

/// State shared by the controller, the decoder thread and the audio callback
pub(crate) struct SharedState {
    samples: Mutex<VecDeque<f32>>,
    state: AtomicU8,
    volume: AtomicU32, // f32 bits
    frames_played: AtomicU64,
    total_frames: AtomicU64,
    decode_done: AtomicBool,
    ended: AtomicBool,
}

impl SharedState {
    pub(crate) fn new(volume: f32) -> Self {
        Self {
            samples: Mutex::new(VecDeque::new()),
            state: AtomicU8::new(STOPPED),
            volume: AtomicU32::new(volume.clamp(0.0, 1.0).to_bits()),
            frames_played: AtomicU64::new(0),
            total_frames: AtomicU64::new(0),
            decode_done: AtomicBool::new(false),
            ended: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> PlaybackState {
        match self.state.load(Ordering::Acquire) {
            PLAYING => PlaybackState::Playing,
            PAUSED => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }

    pub(crate) fn set_state(&self, state: PlaybackState) {
        let raw = match state {
            PlaybackState::Stopped => STOPPED,
            PlaybackState::Playing => PLAYING,
            PlaybackState::Paused => PAUSED,
        };
        self.state.store(raw, Ordering::Release);
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    fn set_volume(&self, volume: f32) {
        self.volume.store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn queued(&self) -> usize {
        self.samples.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub(crate) fn push(&self, block: Vec<f32>) {
        if let Ok(mut queue) = self.samples.lock() {
            queue.extend(block);
        }
    }

    fn discard_queued(&self) {
        if let Ok(mut queue) = self.samples.lock() {
            queue.clear();
        }
    }

    /// Drop buffered audio and restart position tracking at `frame`
    fn rewind_to(&self, frame: u64) {
        self.discard_queued();
        self.frames_played.store(frame, Ordering::Relaxed);
        self.decode_done.store(false, Ordering::Release);
        self.ended.store(false, Ordering::Release);
    }

    pub(crate) fn progress(&self) -> f64 {
        if self.ended.load(Ordering::Acquire) {
            return 1.0;
        }
        let total = self.total_frames.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        (self.frames_played.load(Ordering::Relaxed) as f64 / total as f64).min(1.0)
    }

    /// Audio callback body: drain queued samples into `data`, pad with silence
    pub(crate) fn fill_output<T>(&self, data: &mut [T], channels: usize)
    where
        T: cpal::Sample + cpal::FromSample<f32>,
    {
        let mut written = 0;

        if self.state() == PlaybackState::Playing {
            let volume = self.volume();
            if let Ok(mut queue) = self.samples.lock() {
                let available = data.len().min(queue.len());
                for (slot, sample) in data.iter_mut().zip(queue.drain(..available)) {
                    *slot = T::from_sample(sample * volume);
                }
                written = available;

                if written < data.len() && queue.is_empty() && self.decode_done.load(Ordering::Acquire) {
                    self.ended.store(true, Ordering::Release);
                    self.set_state(PlaybackState::Stopped);
                }
            }

            if channels > 0 {
                self.frames_played
                    .fetch_add((written / channels) as u64, Ordering::Relaxed);
            }
        }

        for slot in data[written..].iter_mut() {
            *slot = T::from_sample(0.0f32);
        }
    }
}

/// Commands sent to the decoder thread
#[derive(Debug)]
enum DecoderCommand {
    Seek(f64),
    Stop,
}

struct DecoderHandle {
    commands: Sender<DecoderCommand>,
    thread: JoinHandle<()>,
}

struct Output {
    // Kept alive for as long as the player exists
    _stream: Stream,
    sample_rate: u32,
    channels: usize,
}

/// Decoder thread: keeps the shared queue topped up at the output format
fn run_decoder(
    mut decoder: TrackDecoder,
    shared: Arc<SharedState>,
    commands: Receiver<DecoderCommand>,
    output_rate: u32,
    output_channels: usize,
) {
    let source_channels = decoder.channels();
    let mut resampler = LinearResampler::new(decoder.sample_rate(), output_rate, output_channels);
    let high_water = output_rate as usize * output_channels * BUFFER_AHEAD_SECS;

    loop {
        let idle = shared.decode_done.load(Ordering::Acquire) || shared.queued() >= high_water;

        let command = if idle {
            match commands.recv_timeout(Duration::from_millis(10)) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        };

        match command {
            Some(DecoderCommand::Stop) => break,
            Some(DecoderCommand::Seek(fraction)) => {
                if let Err(e) = decoder.seek_fraction(fraction) {
                    log::warn!("Seek to {:.0}% failed: {}", fraction * 100.0, e);
                }
                resampler.reset();
                shared.discard_queued();
                continue;
            }
            None => {}
        }

        if idle {
            continue;
        }

        match decoder.next_block() {
            Ok(Some(block)) => {
                let mapped = remap_channels(&block, source_channels, output_channels);
                shared.push(resampler.process(&mapped));
            }
            Ok(None) => {
                log::debug!("Decoder reached end of stream");
                shared.decode_done.store(true, Ordering::Release);
            }
            Err(e) => {
                log::error!("Decoding stopped: {}", e);
                shared.decode_done.store(true, Ordering::Release);
            }
        }
    }
}

/// Plays local files through the default cpal output device.
///
/// The device is opened on the first `load`, so a player can be constructed on
/// machines without audio output.
pub struct CpalPlayer {
    shared: Arc<SharedState>,
    output: Option<Output>,
    decoder: Option<DecoderHandle>,
    loaded: Option<String>,
}

impl CpalPlayer {
    pub fn new(volume: f32) -> Self {
        Self {
            shared: Arc::new(SharedState::new(volume)),
            output: None,
            decoder: None,
            loaded: None,
        }
    }

    /// Location of the loaded track
    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    fn ensure_output(&mut self) -> Result<(usize, u32), PlaybackError> {
        if let Some(output) = &self.output {
            return Ok((output.channels, output.sample_rate));
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::DeviceUnavailable("No default output device".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::DeviceUnavailable(format!("Failed to get default config: {}", e)))?;
        let config: StreamConfig = supported.config();

        let stream = match supported.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, &self.shared)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, &self.shared)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, &self.shared)?,
            sample_format => {
                return Err(PlaybackError::DeviceUnavailable(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| PlaybackError::StreamError(format!("Failed to start stream: {}", e)))?;

        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;
        log::info!(
            "Opened output device {} ({} Hz, {} channels)",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels
        );

        self.output = Some(Output {
            _stream: stream,
            sample_rate,
            channels,
        });
        Ok((channels, sample_rate))
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        shared: &Arc<SharedState>,
    ) -> Result<Stream, PlaybackError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
    {
        let shared = Arc::clone(shared);
        let channels = config.channels as usize;

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    shared.fill_output(data, channels);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| PlaybackError::StreamError(format!("Failed to build output stream: {}", e)))
    }

    fn stop_decoder(&mut self) {
        if let Some(handle) = self.decoder.take() {
            let _ = handle.commands.send(DecoderCommand::Stop);
            if handle.thread.join().is_err() {
                log::warn!("Decoder thread panicked");
            }
        }
    }
}

impl Default for CpalPlayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MediaPlayer for CpalPlayer {
    fn load(&mut self, location: &str) -> Result<(), PlaybackError> {
        let decoder = TrackDecoder::open(Path::new(location))?;
        let (channels, sample_rate) = self.ensure_output()?;

        self.stop_decoder();
        self.shared.set_state(PlaybackState::Stopped);
        self.shared.rewind_to(0);

        let total_frames = decoder
            .duration_secs()
            .map(|secs| (secs * sample_rate as f64) as u64)
            .unwrap_or(0);
        self.shared.total_frames.store(total_frames, Ordering::Relaxed);

        let (sender, receiver) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let thread = thread::Builder::new()
            .name("titletree-decoder".to_string())
            .spawn(move || run_decoder(decoder, shared, receiver, sample_rate, channels))
            .map_err(|e| PlaybackError::StreamError(format!("Failed to start decoder: {}", e)))?;

        self.decoder = Some(DecoderHandle {
            commands: sender,
            thread,
        });
        self.loaded = Some(location.to_string());
        self.shared.set_state(PlaybackState::Playing);

        log::info!("Loaded {}", location);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.decoder.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.shared.ended.load(Ordering::Acquire) {
            self.seek_fraction(0.0)?;
        }
        self.shared.set_state(PlaybackState::Playing);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.decoder.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.shared.state() == PlaybackState::Playing {
            self.shared.set_state(PlaybackState::Paused);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.decoder.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        self.shared.set_state(PlaybackState::Stopped);
        self.seek_fraction(0.0)
    }

    fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlaybackError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(PlaybackError::InvalidSeek { fraction });
        }
        let handle = self.decoder.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;

        let total = self.shared.total_frames.load(Ordering::Relaxed);
        self.shared.rewind_to((total as f64 * fraction) as u64);
        handle
            .commands
            .send(DecoderCommand::Seek(fraction))
            .map_err(|_| PlaybackError::StreamError("Decoder thread has stopped".to_string()))
    }

    fn progress(&self) -> f64 {
        self.shared.progress()
    }

    fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    fn set_volume(&mut self, volume: f32) {
        self.shared.set_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.shared.volume()
    }
}

impl Drop for CpalPlayer {
    fn drop(&mut self) {
        self.stop_decoder();
    }
}

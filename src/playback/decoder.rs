use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use crate::error::PlaybackError;

/// Decodes the first audio track of a file into interleaved f32 blocks
pub struct TrackDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    n_frames: Option<u64>,
    sample_buf: Option<SampleBuffer<f32>>,
}

impl TrackDecoder {
    pub fn open(path: &Path) -> Result<Self, PlaybackError> {
        let location = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| {
            PlaybackError::DecodeFailed(format!("Failed to open {}: {}", location, e))
        })?;

        let media_source = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, media_source, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| PlaybackError::UnsupportedMedia {
                location: location.clone(),
            })?;

        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::UnsupportedMedia {
                location: location.clone(),
            })?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::DecodeFailed(format!("No decoder for {}: {}", location, e)))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);
        let n_frames = track.codec_params.n_frames;

        Ok(Self {
            format_reader,
            decoder,
            track_id,
            sample_rate,
            channels,
            n_frames,
            sample_buf: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Track length in seconds, when the container declares it
    pub fn duration_secs(&self) -> Option<f64> {
        self.n_frames
            .filter(|_| self.sample_rate > 0)
            .map(|frames| frames as f64 / self.sample_rate as f64)
    }

    /// Next block of interleaved samples; `None` at end of stream
    pub fn next_block(&mut self) -> Result<Option<Vec<f32>>, PlaybackError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => return Err(PlaybackError::DecodeFailed(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let frames = decoded.capacity();
                    if self.sample_buf.as_ref().map_or(true, |buf| buf.capacity() < frames) {
                        self.sample_buf = Some(SampleBuffer::<f32>::new(frames as u64, spec));
                    }
                    if let Some(buf) = self.sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        return Ok(Some(buf.samples().to_vec()));
                    }
                }
                // Corrupt packets are skipped
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping undecodable packet: {}", e);
                }
                Err(e) => return Err(PlaybackError::DecodeFailed(e.to_string())),
            }
        }
    }

    /// Jump to a fraction (0.0-1.0) of the track
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlaybackError> {
        let duration = self
            .duration_secs()
            .ok_or(PlaybackError::InvalidSeek { fraction })?;
        let seconds = duration * fraction.clamp(0.0, 1.0);

        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::new(seconds.trunc() as u64, seconds.fract()),
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| PlaybackError::DecodeFailed(format!("Seek failed: {}", e)))?;
        self.decoder.reset();
        Ok(())
    }
}

/*!
Sample-format glue between decoded audio and the output stream.

- `LinearResampler` converts interleaved f32 frames from the decoded rate to the
  device rate. It carries the last two frames of each block so the read
  position can sit between them when the next block arrives.
- `remap_channels` fits a block to the device channel count.
*/

#[derive(Debug, Clone)]
pub struct LinearResampler {
    channels: usize,
    // source frames advanced per output frame (src / dst)
    step: f64,
    // read position relative to `history`
    pos: f64,
    history: Vec<f32>,
}

impl LinearResampler {
    pub fn new(src_rate: u32, dst_rate: u32, channels: usize) -> Self {
        let step = if dst_rate == 0 { 0.0 } else { src_rate as f64 / dst_rate as f64 };
        Self {
            channels,
            step,
            pos: 0.0,
            history: Vec::new(),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.step == 1.0
    }

    /// Drop the history, e.g. after a seek
    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.history.clear();
    }

    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        let ch = self.channels;
        if ch == 0 || self.step <= 0.0 {
            return Vec::new();
        }
        if self.is_passthrough() {
            return input.to_vec();
        }

        let in_frames = input.len() / ch;
        if in_frames == 0 {
            return Vec::new();
        }

        let mut work = Vec::with_capacity(self.history.len() + in_frames * ch);
        work.extend_from_slice(&self.history);
        work.extend_from_slice(&input[..in_frames * ch]);
        let total_frames = work.len() / ch;

        let estimate = (in_frames as f64 / self.step).ceil() as usize + 2;
        let mut out = Vec::with_capacity(estimate * ch);

        while self.pos + 1.0 <= (total_frames - 1) as f64 {
            let i = self.pos.floor() as usize;
            let frac = (self.pos - i as f64) as f32;
            let (a, b) = (i * ch, (i + 1) * ch);
            out.extend((0..ch).map(|c| work[a + c] + (work[b + c] - work[a + c]) * frac));
            self.pos += self.step;
        }

        // pos now lies past frame total - 2, so those two frames are all the next block needs
        let start = total_frames.saturating_sub(2);
        self.history.clear();
        self.history.extend_from_slice(&work[start * ch..]);
        self.pos -= start as f64;

        out
    }
}

/// Fit interleaved samples with `from` channels to `to` channels.
///
/// Mono is duplicated into every output channel; anything folded down to mono
/// is averaged; other layouts keep the leading channels and pad with silence.
pub fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);
    for frame in samples.chunks_exact(from) {
        if from == 1 {
            out.extend(std::iter::repeat(frame[0]).take(to));
        } else if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            let kept = from.min(to);
            out.extend_from_slice(&frame[..kept]);
            out.extend(std::iter::repeat(0.0).take(to - kept));
        }
    }
    out
}

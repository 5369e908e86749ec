use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use ms_core::traits::WaveformLoader;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;
use crate::resample::resample;

/// Decode an audio file into mono f32 samples at its native rate.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed, or read.
///
/// # Example
/// ```no_run
/// use ms_audio::decode::decode_file;
/// let (samples, sample_rate) = decode_file("track.wav").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Cannot open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))
        .context("Failed to probe audio format")?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .context("No default audio track found")?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("sample rate inconnu".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let track_id = track.id;
    let mut all_samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioError::DecodeError(e.to_string()))
                    .with_context(|| format!("Lecture interrompue : {}", path.display()));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Paquet corrompu isolé : symphonia permet de continuer.
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Audio decode frame error in {}: {e}", path.display());
                continue;
            }
            Err(e) => return Err(AudioError::DecodeError(e.to_string()).into()),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        // Downmix to mono
        all_samples.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    log::debug!(
        "Decoded {} samples @ {}Hz from {}",
        all_samples.len(),
        sample_rate,
        path.display()
    );

    Ok((all_samples, sample_rate))
}

/// Loader par défaut : décodage symphonia puis rééchantillonnage rubato.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaLoader;

impl WaveformLoader for SymphoniaLoader {
    fn load(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>> {
        let (samples, native_rate) = decode_file(path)?;
        let samples = resample(&samples, native_rate, sample_rate)
            .with_context(|| format!("{native_rate}Hz -> {sample_rate}Hz"))?;
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn stereo_wav_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // L = +half scale, R = 0 → mono = quarter scale
        let interleaved: Vec<i16> = (0..200).flat_map(|_| [16384i16, 0]).collect();
        write_wav(&path, 8000, 2, &interleaved);

        let (samples, rate) = decode_file(&path).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples.len(), 200);
        assert!(samples.iter().all(|s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn zero_byte_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        std::fs::write(&path, b"").unwrap();
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn loader_resamples_to_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..16000)
            .map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16)
            .collect();
        write_wav(&path, 16000, 1, &samples);

        let y = SymphoniaLoader.load(&path, 8000).unwrap();
        assert_eq!(y.len(), 8000);
    }
}

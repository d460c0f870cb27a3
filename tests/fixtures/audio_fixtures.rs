//! Audio Test Fixtures
//!
//! Programmatically generated 16-bit mono PCM, base64-encoded the way both
//! legs carry it on the wire.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::f32::consts::PI;

/// Sample rate the fixtures are generated at (8kHz, telephony narrowband)
pub const SAMPLE_RATE: u32 = 8000;

/// 20ms of audio at 8kHz, the usual telephony frame
pub const FRAME_20MS: usize = 160;

/// Generate silence (zeros)
pub fn generate_silence(duration_samples: usize) -> Vec<i16> {
    vec![0i16; duration_samples]
}

/// Generate a sine tone at `frequency` Hz
pub fn generate_tone(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    (0..duration_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            ((2.0 * PI * frequency * t).sin() * max_amplitude) as i16
        })
        .collect()
}

/// Convert i16 samples to little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Base64 of one 20ms tone frame; `seed` varies the pitch so frames differ
pub fn tone_frame_b64(seed: u32) -> String {
    let samples = generate_tone(FRAME_20MS, 300.0 + seed as f32 * 50.0, 0.5);
    STANDARD.encode(samples_to_bytes(&samples))
}

/// Base64 of one 20ms silent frame
pub fn silence_frame_b64() -> String {
    STANDARD.encode(samples_to_bytes(&generate_silence(FRAME_20MS)))
}

pub fn decode_b64(payload: &str) -> Vec<u8> {
    STANDARD.decode(payload).expect("valid base64 fixture")
}

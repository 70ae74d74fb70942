//! Multiband Integration Tests
//!
//! Complete signal flow through the three-band compressor.
//! Verifies:
//! - Band split recombines magnitude-flat
//! - Compression lands on the static curve
//! - Mute and bypass crossfades end exactly at zero / dry
//! - Parameter changes glide and redundant updates are inert
//! - Control-thread handoff into the realtime processor

use std::sync::Arc;

use approx::assert_relative_eq;
use mbc_core::{Band, ParameterSnapshot, db_to_gain, gain_to_db, keys};
use mbc_dsp::{BandCompressor, BandSettings, MultibandCompressor, MultibandProcessor};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 256;

/// Settled peak of a -6 dBFS 1 kHz sine through -12 dB, 4:1, 10/100 ms
const SINE_SETTLED_DB: f32 = -9.55;

/// Generate test sine wave
fn generate_sine(samples: usize, freq: f32, amplitude: f32, sample_rate: f32) -> Vec<f32> {
    (0..samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

/// Check signal has no NaN or Infinity
fn is_valid_signal(signal: &[f32]) -> bool {
    signal.iter().all(|&x| x.is_finite())
}

/// Calculate RMS of signal
fn rms(signal: &[f32]) -> f32 {
    let sum: f64 = signal.iter().map(|&x| x as f64 * x as f64).sum();
    (sum / signal.len() as f64).sqrt() as f32
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn snapshot(sample_rate: f32, channels: usize) -> ParameterSnapshot {
    ParameterSnapshot::with_defaults(sample_rate, BLOCK_SIZE, channels)
}

fn set_cuts(snapshot: &mut ParameterSnapshot, low_mid: f32, mid_high: f32) {
    snapshot.set(keys::LOW_MID_CUT, low_mid);
    snapshot.set(keys::MID_HIGH_CUT, mid_high);
}

fn set_all_bands(snapshot: &mut ParameterSnapshot, threshold: f32, ratio: f32, attack: f32, release: f32) {
    for band in Band::ALL {
        let keys = band.keys();
        snapshot.set(keys.threshold, threshold);
        snapshot.set(keys.ratio, ratio);
        snapshot.set(keys.attack, attack);
        snapshot.set(keys.release, release);
    }
}

fn prepared(snapshot: &ParameterSnapshot) -> MultibandCompressor {
    let mut mbc = MultibandCompressor::new();
    mbc.prepare(snapshot).expect("valid snapshot");
    mbc
}

/// Process a mono signal in place, block by block
fn render(mbc: &mut MultibandCompressor, signal: &mut [f32]) {
    for block in signal.chunks_mut(BLOCK_SIZE) {
        mbc.process_block(&mut [block]);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BAND SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_band_sum_is_magnitude_flat() {
    const FFT_SIZE: usize = 8192;

    for (low_mid, mid_high) in [(700.0, 5000.0), (200.0, 2000.0), (80.0, 12000.0)] {
        let mut snap = snapshot(SAMPLE_RATE, 1);
        set_cuts(&mut snap, low_mid, mid_high);
        set_all_bands(&mut snap, 12.0, 4.0, 10.0, 100.0);
        let mut mbc = prepared(&snap);

        let mut impulse = vec![0.0; FFT_SIZE];
        impulse[0] = 1.0;
        render(&mut mbc, &mut impulse);
        assert!(is_valid_signal(&impulse));

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let mut spectrum: Vec<Complex<f32>> =
            impulse.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut spectrum);

        for (bin, value) in spectrum.iter().enumerate().take(FFT_SIZE / 2).skip(1) {
            let db = 20.0 * value.norm().log10();
            assert!(
                db.abs() < 0.05,
                "cuts {low_mid}/{mid_high}: bin {bin} at {db} dB"
            );
        }
    }
}

#[test]
fn test_constant_input_reproduced_below_threshold() {
    for (low_mid, mid_high) in [(700.0, 5000.0), (300.0, 1200.0), (2000.0, 15000.0)] {
        for freq in [60.0, 1000.0, 9000.0] {
            let mut snap = snapshot(SAMPLE_RATE, 1);
            set_cuts(&mut snap, low_mid, mid_high);
            set_all_bands(&mut snap, 12.0, 4.0, 10.0, 100.0);
            let mut mbc = prepared(&snap);

            let input = generate_sine(48000, freq, 0.5, SAMPLE_RATE);
            let mut output = input.clone();
            render(&mut mbc, &mut output);

            assert_relative_eq!(rms(&output[24000..]), rms(&input[24000..]), max_relative = 1e-3);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPRESSION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_band_compressor_sine_settles_near_curve() {
    for sample_rate in [44100.0, 48000.0] {
        let mut comp = BandCompressor::new();
        comp.prepare(
            sample_rate,
            1,
            &BandSettings {
                threshold_db: -12.0,
                ratio: 4.0,
                attack_ms: 10.0,
                release_ms: 100.0,
                input_db: 0.0,
                output_db: 0.0,
            },
        );

        let input = generate_sine(sample_rate as usize * 2, 1000.0, db_to_gain(-6.0), sample_rate);
        let output: Vec<f32> = input
            .iter()
            .map(|&x| {
                comp.tick();
                comp.process_sample(0, x)
            })
            .collect();

        // Per-sample detection releases between the sine's peaks, so the
        // peak settles about 1 dB above the static curve's -10.5 dBFS
        let settled = gain_to_db(peak(&output[output.len() - 4800..]));
        assert!(settled > -10.5, "{sample_rate} Hz settled at {settled} dBFS");
        assert!((settled - SINE_SETTLED_DB).abs() < 0.5, "{sample_rate} Hz settled at {settled} dBFS");
    }
}

#[test]
fn test_multiband_sine_settles_near_curve() {
    let mut snap = snapshot(SAMPLE_RATE, 2);
    // 1 kHz sits well inside the mid band
    set_cuts(&mut snap, 100.0, 10000.0);
    set_all_bands(&mut snap, -12.0, 4.0, 10.0, 100.0);
    let mut mbc = prepared(&snap);

    let mut left = generate_sine(96000, 1000.0, db_to_gain(-6.0), SAMPLE_RATE);
    let mut right = left.clone();
    for (l, r) in left.chunks_mut(BLOCK_SIZE).zip(right.chunks_mut(BLOCK_SIZE)) {
        mbc.process_block(&mut [l, r]);
    }

    for channel in [&left, &right] {
        let settled = gain_to_db(peak(&channel[channel.len() - 4800..]));
        assert!((settled - SINE_SETTLED_DB).abs() < 0.5, "settled at {settled} dBFS");
    }
    assert!(mbc.gain_reduction_db(Band::Mid, 0) < -2.0);
    assert_eq!(mbc.gain_reduction_db(Band::Low, 1), 0.0);
}

#[test]
fn test_threshold_change_glides_monotonically() {
    let mut snap = snapshot(SAMPLE_RATE, 1);
    set_cuts(&mut snap, 1000.0, 8000.0);
    let mut mbc = prepared(&snap);

    // DC ends up entirely in the low band
    let mut settle = vec![0.5; 4800];
    render(&mut mbc, &mut settle);
    assert_eq!(mbc.gain_reduction_db(Band::Low, 0), 0.0);

    snap.set("thresholdLow", -24.0);
    snap.set("ratioLow", 4.0);
    mbc.update(&snap).unwrap();

    let mut previous = mbc.gain_reduction_db(Band::Low, 0);
    for _ in 0..(3 * SAMPLE_RATE as usize / BLOCK_SIZE) {
        let mut block = vec![0.5; BLOCK_SIZE];
        mbc.process_block(&mut [&mut block[..]]);

        let current = mbc.gain_reduction_db(Band::Low, 0);
        assert!(current <= previous + 1e-4, "{current} after {previous}");
        previous = current;
    }

    // -6 dB in, threshold -24 at 4:1 -> -19.5 out
    assert_relative_eq!(previous, -13.5, epsilon = 0.1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// MUTE / BYPASS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_mute_fades_to_exact_zero() {
    let mut snap = snapshot(SAMPLE_RATE, 1);
    let mut mbc = prepared(&snap);

    for band in Band::ALL {
        snap.set(band.keys().mute, 1.0);
    }
    mbc.update(&snap).unwrap();

    // 150 ms release at 48 kHz, from unity to the -120 dB floor
    let step = (1.0e-6_f64).powf(1.0 / 7200.0) as f32;
    let input = generate_sine(9600, 440.0, 0.5, SAMPLE_RATE);
    let mut output = Vec::with_capacity(input.len());
    let mut previous_gain = mbc.mute_gain(Band::Low);

    for &x in &input {
        let mut frame = [x];
        mbc.process_block(&mut [&mut frame[..]]);
        output.push(frame[0]);

        let gain = mbc.mute_gain(Band::Low);
        assert!(gain <= previous_gain);
        assert!(gain >= previous_gain * step * (1.0 - 1e-4));
        previous_gain = gain;
    }

    assert!(output[..7200].iter().any(|&s| s != 0.0));
    assert!(output[7300..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_unmute_fades_back_in() {
    let mut snap = snapshot(SAMPLE_RATE, 1);
    snap.set("muteHigh", 1.0);
    let mut mbc = prepared(&snap);
    assert_relative_eq!(mbc.mute_gain(Band::High), 1.0e-6);

    snap.set("muteHigh", 0.0);
    mbc.update(&snap).unwrap();

    let mut signal = generate_sine(BLOCK_SIZE * 8, 10000.0, 0.5, SAMPLE_RATE);
    render(&mut mbc, &mut signal);
    let halfway = mbc.mute_gain(Band::High);
    assert!(halfway > 1.0e-6 && halfway < 1.0);

    let mut signal = generate_sine(9600, 10000.0, 0.5, SAMPLE_RATE);
    render(&mut mbc, &mut signal);
    assert_eq!(mbc.mute_gain(Band::High), 1.0);
}

#[test]
fn test_bypass_crossfades_to_dry_and_back() {
    let mut snap = snapshot(SAMPLE_RATE, 1);
    set_all_bands(&mut snap, -30.0, 8.0, 5.0, 50.0);
    let mut mbc = prepared(&snap);
    let mut reference = prepared(&snap);

    snap.set(keys::BYPASS, 1.0);
    mbc.update(&snap).unwrap();

    let input = generate_sine(14400, 440.0, 0.8, SAMPLE_RATE);
    let mut output = input.clone();
    render(&mut mbc, &mut output);

    assert_eq!(mbc.bypass_mix(), 1.0);
    assert_eq!(&output[7300..], &input[7300..]);

    // Disengaging returns to exactly the processed signal
    snap.set(keys::BYPASS, 0.0);
    mbc.update(&snap).unwrap();

    let mut ignored = input.clone();
    render(&mut reference, &mut ignored);

    let mut output = input.clone();
    let mut expected = input.clone();
    render(&mut mbc, &mut output);
    render(&mut reference, &mut expected);

    assert!(peak(&expected[7300..]) < 0.8 * 0.5);
    for (out, exp) in output[7300..].iter().zip(&expected[7300..]) {
        assert_relative_eq!(*out, *exp, epsilon = 1e-6);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPDATES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_redundant_update_does_not_alter_output() {
    let mut snap = snapshot(SAMPLE_RATE, 1);
    set_all_bands(&mut snap, -18.0, 4.0, 10.0, 100.0);
    let mut steady = prepared(&snap);
    let mut chatty = prepared(&snap);

    snap.set("thresholdMid", -30.0);
    snap.set("muteLow", 1.0);
    snap.set(keys::LOW_MID_CUT, 1500.0);
    steady.update(&snap).unwrap();
    chatty.update(&snap).unwrap();

    let input = generate_sine(BLOCK_SIZE * 64, 880.0, 0.7, SAMPLE_RATE);
    let mut a = input.clone();
    let mut b = input;

    for (block_a, block_b) in a.chunks_mut(BLOCK_SIZE).zip(b.chunks_mut(BLOCK_SIZE)) {
        steady.process_block(&mut [block_a]);
        chatty.update(&snap).unwrap();
        chatty.process_block(&mut [block_b]);
    }

    assert_eq!(a, b);
}

#[test]
fn test_cutoff_sweep_is_stable() {
    let mut snap = snapshot(SAMPLE_RATE, 2);
    let mut mbc = prepared(&snap);

    // Includes a misordered pair and out-of-range values
    set_cuts(&mut snap, 30000.0, 5.0);
    mbc.update(&snap).unwrap();

    let mut left = generate_sine(48000, 300.0, 0.9, SAMPLE_RATE);
    let mut right = generate_sine(48000, 7000.0, 0.9, SAMPLE_RATE);
    for (l, r) in left.chunks_mut(BLOCK_SIZE).zip(right.chunks_mut(BLOCK_SIZE)) {
        mbc.process_block(&mut [l, r]);
    }

    assert!(is_valid_signal(&left) && is_valid_signal(&right));
    assert!(peak(&left) < 4.0 && peak(&right) < 4.0);
}

#[test]
fn test_short_channel_limits_frames() {
    let snap = snapshot(SAMPLE_RATE, 2);
    let mut mbc = prepared(&snap);

    let mut left = vec![0.5; 128];
    let mut right = vec![0.5; 64];
    mbc.process_block(&mut [&mut left[..], &mut right[..]]);

    assert!(left[64..].iter().all(|&s| s == 0.5));
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDOFF
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_processor_with_control_thread() {
    let snap = snapshot(SAMPLE_RATE, 2);
    let mut processor = MultibandProcessor::new();
    processor.prepare(&snap).unwrap();

    let handoff = processor.handoff();
    let control = std::thread::spawn({
        let handoff = Arc::clone(&handoff);
        let mut snap = snap.clone();
        move || {
            for i in 0..200 {
                snap.set("thresholdMid", -(i % 40) as f32);
                snap.set(keys::MID_HIGH_CUT, 3000.0 + 10.0 * i as f32);
                handoff.publish(&snap).unwrap();
            }
        }
    });

    let mut left = generate_sine(BLOCK_SIZE, 1000.0, 0.5, SAMPLE_RATE);
    let mut right = left.clone();
    for _ in 0..400 {
        processor.process_block(&mut [&mut left[..], &mut right[..]]);
        assert!(is_valid_signal(&left) && is_valid_signal(&right));
    }
    control.join().unwrap();

    // Whatever was still pending lands on the next block
    processor.process_block(&mut [&mut left[..], &mut right[..]]);
    let params = processor.compressor().params().unwrap();
    assert_eq!(params.mid_high_cut, 3000.0 + 10.0 * 199.0);
    assert!(!handoff.is_pending());
}

#[test]
fn test_rejected_publish_leaves_processor_untouched() {
    let snap = snapshot(SAMPLE_RATE, 1);
    let mut processor = MultibandProcessor::new();
    processor.prepare(&snap).unwrap();

    let restored = ParameterSnapshot::from_json(r#"{ "ratioLow": 4.0 }"#).unwrap();
    // A partial snapshot is missing keys and must not be applied
    assert!(processor.handoff().publish(&restored).is_err());

    let mut block = vec![0.25; BLOCK_SIZE];
    processor.process_block(&mut [&mut block[..]]);
    assert_eq!(
        processor.compressor().params().map(|p| p.band(Band::Low).settings.ratio),
        Some(3.0)
    );
}

//! End-to-end synthesis behaviour through the public register interface

use ym3812::ym3812::{EnvelopeState, Waveform, CARRIER, MODULATOR};
use ym3812::{ChipConfig, Timer, Ym3812};

/// Clock where one output sample is exactly one native chip sample
const NATIVE_RATE: u32 = 49_716;

fn native_chip() -> Ym3812 {
    Ym3812::with_clocks(72 * NATIVE_RATE, NATIVE_RATE).unwrap()
}

fn chip() -> Ym3812 {
    Ym3812::with_clocks(3_579_545, 44_100).unwrap()
}

/// Carrier-only patch on channel 0: modulator muted, carrier loud
fn carrier_patch(chip: &mut Ym3812, attack_decay: u8, flags: u8) {
    chip.write_register(0x20, 0x01);
    chip.write_register(0x40, 0x3f);
    chip.write_register(0x23, flags);
    chip.write_register(0x43, 0x00);
    chip.write_register(0x63, attack_decay);
    chip.write_register(0x83, 0x0f);
}

fn key_on(chip: &mut Ym3812, ch: u8, block: u8, fnum: u16) {
    chip.write_register(0xa0 + ch, (fnum & 0xff) as u8);
    chip.write_register(0xb0 + ch, 0x20 | (block << 2) | (fnum >> 8) as u8);
}

#[test]
fn test_fast_attack_is_immediate() {
    let mut chip = native_chip();
    carrier_patch(&mut chip, 0xf0, 0x01);
    // block 4 pushes the key-scaled attack past rate 15 1
    key_on(&mut chip, 0, 4, 0x241);
    chip.next_sample();
    let envelope = chip.channel(0).operator(CARRIER).envelope();
    assert_eq!(envelope.attenuation(), 0);
    assert_eq!(envelope.state(), EnvelopeState::Decay);
}

#[test]
fn test_rate_15_attack_takes_nine_clocks() {
    let mut chip = native_chip();
    carrier_patch(&mut chip, 0xf0, 0x01);
    // block 1 without KSR keeps the combined rate at 15 0
    key_on(&mut chip, 0, 1, 0x041);
    for _ in 0..8 {
        chip.next_sample();
    }
    assert!(chip.channel(0).operator(CARRIER).envelope().attenuation() > 0);
    chip.next_sample();
    assert_eq!(chip.channel(0).operator(CARRIER).envelope().attenuation(), 0);
}

#[test]
fn test_attack_output_grows_until_decay() {
    let mut chip = chip();
    // AR 8, DR 0
    carrier_patch(&mut chip, 0x80, 0x21);
    // block 6 without KSR adds key scale 3: rate 8 3 fires every 16 EG clocks
    key_on(&mut chip, 0, 6, 0x241);

    let mut samples = Vec::new();
    while chip.channel(0).operator(CARRIER).envelope().state() == EnvelopeState::Attack {
        samples.push(chip.next_sample());
        assert!(samples.len() < 4096);
    }

    // 39 updates of 16 clocks take the attenuation from 511 to 0
    let freqbase = chip.clock_rates().freqbase;
    assert_eq!(samples.len(), (624.0 / freqbase).ceil() as usize);

    let first = samples.iter().position(|&s| s != 0).unwrap();
    assert!(first > 0);
    assert!(first < samples.len() / 8, "first audible sample {first}");

    let increment = chip.channel(0).operator(CARRIER).increment() as f64;
    let period = ((1u64 << 26) as f64 / increment).ceil() as usize;
    let peaks: Vec<i16> = samples
        .chunks_exact(period)
        .map(|window| window.iter().map(|s| s.abs()).max().unwrap())
        .collect();
    assert!(peaks.len() > 10);
    assert!(peaks.windows(2).all(|w| w[0] <= w[1]), "{peaks:?}");
}

#[test]
fn test_zero_attack_rate_never_sounds() {
    let mut chip = chip();
    carrier_patch(&mut chip, 0x0f, 0x01);
    key_on(&mut chip, 0, 4, 0x241);
    assert!(chip.generate(8192).all(|s| s == 0));
    assert_eq!(chip.channel(0).operator(CARRIER).envelope().state(), EnvelopeState::Attack);
}

#[test]
fn test_sustained_envelope_holds() {
    let mut chip = chip();
    // EG type on, SL 2 (6 dB), fast decay
    carrier_patch(&mut chip, 0xfa, 0x21);
    chip.write_register(0x83, 0x2f);
    key_on(&mut chip, 0, 4, 0x241);
    chip.generate_samples(22_050);
    let envelope = chip.channel(0).operator(CARRIER).envelope();
    assert_eq!(envelope.state(), EnvelopeState::Sustain);
    assert_eq!(envelope.attenuation(), envelope.sustain_level());
}

#[test]
fn test_percussive_envelope_fades_while_keyed() {
    let mut chip = chip();
    // EG type off: sustain phase keeps releasing at RR
    carrier_patch(&mut chip, 0xfa, 0x01);
    chip.write_register(0x83, 0x2f);
    key_on(&mut chip, 0, 4, 0x241);
    chip.generate_samples(44_100);
    // still nominally sustaining, but fully attenuated
    let envelope = chip.channel(0).operator(CARRIER).envelope();
    assert_eq!(envelope.state(), EnvelopeState::Sustain);
    assert_eq!(envelope.attenuation(), 511);
    assert!(chip.generate(1024).all(|s| s == 0));
}

#[test]
fn test_half_and_abs_sine_never_go_negative() {
    for (select, waveform) in [(1u8, Waveform::HalfSine), (2, Waveform::AbsSine)] {
        let mut chip = chip();
        chip.write_register(0x01, 0x20);
        carrier_patch(&mut chip, 0xf0, 0x21);
        chip.write_register(0xe3, select);
        assert_eq!(chip.channel(0).operator(CARRIER).waveform(), waveform);
        key_on(&mut chip, 0, 4, 0x241);
        let samples = chip.generate_samples(4096);
        assert!(samples.iter().all(|&s| s >= 0), "{waveform:?}");
        assert!(samples.iter().any(|&s| s > 0), "{waveform:?}");
    }
}

#[test]
fn test_sine_swings_both_ways() {
    let mut chip = chip();
    carrier_patch(&mut chip, 0xf0, 0x21);
    key_on(&mut chip, 0, 4, 0x241);
    let samples = chip.generate_samples(4096);
    assert!(samples.iter().any(|&s| s > 1000));
    assert!(samples.iter().any(|&s| s < -1000));
}

#[test]
fn test_fm_modulation_changes_output() {
    let mut plain = chip();
    let mut modulated = chip();
    for chip in [&mut plain, &mut modulated] {
        carrier_patch(chip, 0xf0, 0x21);
        chip.write_register(0x60, 0xf0);
    }
    // unmute the modulator on one chip only
    modulated.write_register(0x40, 0x00);
    key_on(&mut plain, 0, 4, 0x241);
    key_on(&mut modulated, 0, 4, 0x241);
    assert_ne!(plain.generate_samples(2048), modulated.generate_samples(2048));
}

#[test]
fn test_bass_drum_is_double_the_melodic_channel() {
    let patch = |chip: &mut Ym3812| {
        // channel 6: modulator slot 0x10, carrier slot 0x13
        chip.write_register(0x30, 0x02);
        chip.write_register(0x50, 0x10);
        chip.write_register(0x70, 0xf4);
        chip.write_register(0x90, 0x25);
        chip.write_register(0x33, 0x01);
        chip.write_register(0x53, 0x06);
        chip.write_register(0x73, 0xf5);
        chip.write_register(0x93, 0x26);
        chip.write_register(0xc6, 0x04);
        chip.write_register(0xa6, 0x20);
    };

    let mut melodic = chip();
    let mut rhythm = chip();
    patch(&mut melodic);
    patch(&mut rhythm);
    melodic.write_register(0xb6, 0x20 | (3 << 2) | 0x01);
    rhythm.write_register(0xb6, (3 << 2) | 0x01);
    rhythm.write_register(0xbd, 0x30);
    assert!(rhythm.is_rhythm_enabled());

    let mut heard = false;
    for _ in 0..4096 {
        let out = rhythm.next_sample();
        melodic.next_sample();
        let expected = melodic.channel_outputs()[6] * 2;
        assert_eq!(rhythm.channel_outputs()[6], expected);
        assert_eq!(out as i32, expected.clamp(-32768, 32767));
        heard |= expected != 0;
    }
    assert!(heard);
}

#[test]
fn test_rhythm_bit_switches_on_the_next_sample() {
    let melodic = || {
        let mut chip = chip();
        for offset in [0x10u8, 0x11, 0x12, 0x13, 0x14, 0x15] {
            let modulator = offset < 0x13;
            chip.write_register(0x20 + offset, 0x21);
            chip.write_register(0x40 + offset, if modulator { 0x10 } else { 0x00 });
            chip.write_register(0x60 + offset, 0xf0);
            chip.write_register(0x80 + offset, 0x0f);
        }
        for ch in 6..9u8 {
            key_on(&mut chip, ch, 4, 0x241);
        }
        chip.generate_samples(64);
        chip
    };
    let mut control = melodic();
    let mut toggled = melodic();
    assert_eq!(control.next_sample(), toggled.next_sample());

    toggled.write_register(0xbd, 0x20);
    let rhythm_out = toggled.next_sample();
    let melodic_out = control.next_sample();
    let melodic_taps = control.channel_outputs();
    let rhythm_taps = toggled.channel_outputs();
    assert_ne!(melodic_taps[6], 0);
    assert_eq!(rhythm_taps[6], melodic_taps[6] * 2);
    assert_eq!(rhythm_taps[6..], [rhythm_taps[6]; 3]);
    assert_ne!(rhythm_out, melodic_out);

    toggled.write_register(0xbd, 0x00);
    toggled.next_sample();
    control.next_sample();
    let melodic_taps = control.channel_outputs();
    let taps = toggled.channel_outputs();
    // channel 6 ran the same operator path in both modes
    assert_eq!(taps[6], melodic_taps[6]);
    assert_ne!(taps[7], 0);
    assert_ne!(taps[8], 0);
}

#[test]
fn test_rhythm_voices_sound_and_are_deterministic() {
    let setup = || {
        let mut chip = chip();
        for offset in [0x11u8, 0x12, 0x14, 0x15] {
            chip.write_register(0x20 + offset, 0x01);
            chip.write_register(0x40 + offset, 0x00);
            chip.write_register(0x60 + offset, 0xf6);
            chip.write_register(0x80 + offset, 0x08);
        }
        chip.write_register(0xa7, 0x50);
        chip.write_register(0xb7, 0x09);
        chip.write_register(0xa8, 0x80);
        chip.write_register(0xb8, 0x0a);
        chip.write_register(0xbd, 0x2f);
        chip
    };
    let mut a = setup();
    let mut b = setup();
    let out_a = a.generate_samples(8192);
    assert!(out_a.iter().any(|&s| s != 0));
    assert_eq!(out_a, b.generate_samples(8192));
}

#[test]
fn test_reset_returns_to_silence() {
    let mut chip = chip();
    chip.write_register(0x01, 0x20);
    carrier_patch(&mut chip, 0xf0, 0x21);
    chip.write_register(0xe3, 0x03);
    key_on(&mut chip, 0, 4, 0x241);
    chip.write_register(0xbd, 0x3f);
    assert!(chip.generate(2048).any(|s| s != 0));

    chip.reset();
    assert!(chip.is_silent());
    assert!(!chip.is_rhythm_enabled());
    assert!(!chip.is_wave_select_enabled());
    for ch in chip.channels() {
        assert_eq!(ch.operator(MODULATOR).waveform(), Waveform::Sine);
        assert_eq!(ch.operator(CARRIER).waveform(), Waveform::Sine);
    }
    assert!(chip.generate(4096).all(|s| s == 0));
    assert_eq!(chip.channel_outputs(), [0; 9]);
}

#[test]
fn test_csm_retriggers_notes() {
    let mut chip = chip();
    carrier_patch(&mut chip, 0xf0, 0x21);
    chip.write_register(0xa0, 0x41);
    chip.write_register(0xb0, 0x12);
    chip.write_register(0x08, 0x80);
    assert!(chip.is_csm_enabled());

    chip.timer_over(Timer::A);
    // keyed on, then straight into release from full attenuation
    assert_eq!(chip.channel(0).operator(CARRIER).envelope().state(), EnvelopeState::Release);
    assert_eq!(chip.channel(0).operator(CARRIER).phase(), 0);
}

#[test]
fn test_status_through_bus() {
    let mut chip = chip();
    assert_eq!(chip.read(0), 0x06);
    chip.write(0, 0x04);
    chip.write(1, 0x03);
    assert_eq!(chip.timer_over(Timer::B), 1);
    assert_eq!(chip.read(0), 0x80 | 0x20 | 0x06);
    chip.write(0, 0x04);
    assert_eq!(chip.write(1, 0x80), 0);
    assert_eq!(chip.read(0) & 0x80, 0);
}

#[test]
fn test_sample_rate_scales_pitch() {
    // the same note at twice the sample rate takes twice as many samples per cycle
    let zero_crossings = |rate: u32, count: usize| {
        let mut chip = Ym3812::new(ChipConfig::with_clocks(3_579_545, rate)).unwrap();
        carrier_patch(&mut chip, 0xf0, 0x21);
        key_on(&mut chip, 0, 4, 0x241);
        let samples = chip.generate_samples(count);
        samples.windows(2).filter(|w| w[0] < 0 && w[1] >= 0).count() as i64
    };
    let low = zero_crossings(22_050, 22_050);
    let high = zero_crossings(44_100, 44_100);
    assert!((low - high).abs() <= 2, "{low} vs {high}");
}

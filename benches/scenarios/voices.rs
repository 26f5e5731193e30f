//! Benchmarks for voice lifecycle under load.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::{
    engine::BlockEngine,
    synth::{voice_bus, SynthMessage, VoiceManager},
    SynthConfig,
};

use crate::BLOCK_SIZES;

fn manager(config: &SynthConfig) -> VoiceManager<BlockEngine> {
    VoiceManager::new(BlockEngine::new(48_000.0, config), config).expect("default config is valid")
}

pub fn bench_voice_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/churn");
    let config = SynthConfig::default();

    // === CHORD UNDER PEDAL ===
    // 8 notes pressed and released while sustained, then flushed
    group.bench_function("sustained_chord", |b| {
        let mut manager = manager(&config);
        let mut bus = voice_bus::<BlockEngine>();
        let mut scratch = vec![0.0f32; 64];
        b.iter(|| {
            bus.publish(&mut manager, SynthMessage::SustainOn { channel: 0 });
            for note in (48..64).step_by(2) {
                bus.publish(
                    &mut manager,
                    SynthMessage::NoteOn {
                        channel: 0,
                        note,
                        velocity: 0.5,
                    },
                );
                bus.publish(&mut manager, SynthMessage::NoteOff { channel: 0, note });
            }
            bus.publish(&mut manager, SynthMessage::SustainOff { channel: 0 });
            // Let the fades finish so the arena stays small
            manager.engine_mut().render(&mut scratch);
            manager.collect_ended();
            black_box(manager.active_count())
        })
    });

    // === BEND SWEEP ===
    // Full wheel sweep across 16 sounding voices
    group.bench_function("bend_16_voices", |b| {
        let mut manager = manager(&config);
        for note in 40..56 {
            manager.note_on(note, None).expect("note in range");
        }
        b.iter(|| {
            for step in 0..=16 {
                let bend = step as f32 / 8.0 - 1.0;
                manager.pitch_wheel(black_box(bend)).expect("bend in range");
            }
            manager.pitch_release();
        })
    });

    group.finish();
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let config = SynthConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === 8 VOICES WITH VIBRATO ===
        let mut manager = manager(&config);
        for note in [48, 52, 55, 60, 64, 67, 72, 76] {
            manager.note_on(note, Some(0.1)).expect("note in range");
        }
        manager.mod_wheel(0.5).expect("mod in range");

        group.bench_with_input(BenchmarkId::new("poly8", size), &size, |b, _| {
            b.iter(|| {
                manager.engine_mut().render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

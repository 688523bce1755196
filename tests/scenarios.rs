use fastrand::Rng;
use glyphworks::Config;
use glyphworks::effects::fireworks::FireworksShow;
use glyphworks::effects::fireworks::entity::Frame;
use glyphworks::effects::fireworks::font::{Font, OutlineFont};
use std::path::Path;
use glyphworks::effects::fireworks::glyph::{GlyphSampler, GlyphTarget};
use glyphworks::effects::fireworks::lifecycle::{MessageLifecycle, Phase};
use glyphworks::effects::fireworks::message::MessageParticle;
use glyphworks::effects::fireworks::particles::{MESSAGE_BURST_COUNT, MESSAGE_BURST_LIFE, Particles};
use glyphworks::effects::fireworks::rocket::Rocket;

const W: f32 = 1600.0;
const H: f32 = 800.0;

fn frame(tick: u64) -> Frame {
    Frame {
        tick,
        width: W,
        height: H,
    }
}

#[test]
fn fifth_of_eight_explosions_becomes_the_message_burst() {
    let mut rng = Rng::with_seed(42);
    let config = Config::default();
    let mut lifecycle = MessageLifecycle::new(&config.message, &mut rng);
    lifecycle.set_countdown(5);
    let mut particles = Particles::new(300);

    for n in 1..=8 {
        let mut rocket = Rocket::new(None, W, H, &mut rng);
        let before = particles.fragments.len();
        let explosion = rocket
            .explode(&mut lifecycle, &mut particles, &mut rng)
            .expect("fresh rocket explodes");
        let spawned = &particles.fragments[before..];
        assert_eq!(spawned.len(), explosion.fragments);

        if n == 5 {
            assert!(explosion.triggers_message, "explosion {n} should carry the message");
            assert_eq!(explosion.fragments, MESSAGE_BURST_COUNT);
            assert!(spawned.iter().all(|f| f.life == MESSAGE_BURST_LIFE));
        } else {
            assert!(!explosion.triggers_message, "explosion {n} should be ordinary");
            assert!((80..280).contains(&explosion.fragments));
        }
    }
    assert!(!lifecycle.pending());
}

#[test]
fn message_particle_lands_exactly_on_target() {
    let mut rng = Rng::with_seed(7);
    let mut p = MessageParticle::new((0.0, 0.0), (100.0, 0.0), (255, 200, 180), &mut rng).with_delay(0.0);

    // Speed never drops below 0.5, so 100 units take at most 200 ticks.
    let mut tick = 0;
    while !p.arrived() && tick < 200 {
        tick += 1;
        p.update_to_target(tick);
    }
    assert!(p.arrived());
    assert_eq!((p.x, p.y), (100.0, 0.0));

    for t in tick + 1..tick + 50 {
        p.update_to_target(t);
        assert!(p.arrived());
        assert_eq!((p.x, p.y), (100.0, 0.0));
    }
    assert!(p.at_target());
}

#[test]
fn held_message_disperses_exactly_after_hold() {
    let mut rng = Rng::with_seed(3);
    let config = Config::default();
    let sampler = GlyphSampler::new(Font::Block, config.message.stride, config.message.font_scale);
    let mut lifecycle = MessageLifecycle::new(&config.message, &mut rng);
    let mut particles = Particles::new(300);

    let anchor = (W / 2.0, H / 3.0);
    let targets = sampler.prepare_targets("OK", W, H, anchor.0, anchor.1, &mut rng);
    let n = targets.len();
    assert!(n > 0);
    lifecycle.begin_forming(anchor, targets, &mut particles, &frame(0), &mut rng);
    assert_eq!(particles.messages.len(), n);

    let mut tick = 0;
    while lifecycle.phase() == Phase::Forming {
        tick += 1;
        for p in particles.messages.iter_mut() {
            p.update_to_target(tick);
        }
        assert!(lifecycle.advance(&mut particles, &frame(tick), &mut rng).is_none());
        assert!(tick < 2000, "message never formed");
    }
    assert!(particles.messages.iter().all(MessageParticle::at_target));
    let formed_at = tick;

    let report = loop {
        tick += 1;
        for p in particles.messages.iter_mut() {
            p.update_to_target(tick);
        }
        if let Some(report) = lifecycle.advance(&mut particles, &frame(tick), &mut rng) {
            break report;
        }
    };

    assert_eq!(tick - formed_at, config.message.hold_ticks);
    assert_eq!(report.particle_bursts, n);
    assert_eq!(report.anchor_bursts, 1);
    assert_eq!(report.scatter_bursts, 10);
    assert!(particles.messages.is_empty());
    assert_eq!(lifecycle.phase(), Phase::Idle);
}

#[test]
fn glyph_positions_repeat_for_identical_inputs() {
    let sampler = GlyphSampler::new(Font::Block, 8, 0.2);
    let a = sampler.prepare_targets("HAPPY BIRTHDAY!", W, H, 700.0, 260.0, &mut Rng::with_seed(1));
    let b = sampler.prepare_targets("HAPPY BIRTHDAY!", W, H, 700.0, 260.0, &mut Rng::with_seed(2));
    let pos = |targets: &[GlyphTarget]| targets.iter().map(|t| (t.x, t.y)).collect::<Vec<_>>();
    assert!(!a.is_empty());
    assert_eq!(pos(&a), pos(&b));
}

#[test]
fn outline_font_targets_center_on_the_anchor() {
    let data = include_bytes!("../assets/fonts/DejaVuSansMono.ttf").to_vec();
    let font = OutlineFont::from_bytes(Path::new("DejaVuSansMono.ttf"), data).unwrap();
    let sampler = GlyphSampler::new(Font::Outline(font), 8, 0.2);
    let anchor = (800.0, 400.0);

    let a = sampler.prepare_targets("HELLO", W, H, anchor.0, anchor.1, &mut Rng::with_seed(1));
    let b = sampler.prepare_targets("HELLO", W, H, anchor.0, anchor.1, &mut Rng::with_seed(2));
    assert!(!a.is_empty());

    let n = a.len() as f32;
    let mean_x = a.iter().map(|t| t.x).sum::<f32>() / n;
    let mean_y = a.iter().map(|t| t.y).sum::<f32>() / n;
    assert!((mean_x - anchor.0).abs() < 30.0, "mean x {mean_x}");
    assert!((mean_y - anchor.1).abs() < 30.0, "mean y {mean_y}");

    let pos = |targets: &[GlyphTarget]| targets.iter().map(|t| (t.x, t.y)).collect::<Vec<_>>();
    assert_eq!(pos(&a), pos(&b));
}

#[test]
fn seeded_shows_are_reproducible() {
    let mut config = Config::default();
    config.general.seed = Some(2024);
    let mut a = FireworksShow::new(160, 80, &config).unwrap();
    let mut b = FireworksShow::new(160, 80, &config).unwrap();
    for _ in 0..600 {
        a.on_frame();
        b.on_frame();
    }
    assert_eq!(a.rockets().len(), b.rockets().len());
    assert_eq!(a.particles().fragments.len(), b.particles().fragments.len());
    assert_eq!(a.particles().messages.len(), b.particles().messages.len());
    assert_eq!(a.lifecycle().explosions_remaining(), b.lifecycle().explosions_remaining());
}

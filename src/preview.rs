//! Previewer: one difficulty's lighting, rings and map objects driven from a
//! single playback position.
//!
//! The host owns the clock and the scene. Once per tick it calls
//! [`Previewer::update`] with the current beat and time, a visual host for
//! object pooling, and a sink for lighting and ring results.

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::beatmap::RawDifficulty;
use crate::color::ColorPalette;
use crate::config::{PreviewConfig, Settings, SettingsChange};
use crate::lighting::{LightingEngine, LightingSink};
use crate::objects::{
    load_objects, Arc, Bomb, Chain, JumpSettings, Note, ObjectManager, SpawnContext, VisualHost,
    Wall,
};
use crate::rings::{RingEngine, RingSink};
use crate::timing::{BeatClock, BpmMap};

/// Setting keys that change how object visuals are built.
pub const OBJECT_SETTINGS: &[&str] = &[
    "simplenotes",
    "simplebombs",
    "moveanimations",
    "rotateanimations",
    "flipanimations",
    "chromaobjectcolors",
];

/// Tempo assumed before any difficulty is loaded.
const IDLE_BPM: f32 = 120.0;

/// A host that can pool visuals for every object kind.
pub trait ObjectHost:
    VisualHost<Note> + VisualHost<Bomb> + VisualHost<Wall> + VisualHost<Arc> + VisualHost<Chain>
{
}

impl<H> ObjectHost for H where
    H: VisualHost<Note> + VisualHost<Bomb> + VisualHost<Wall> + VisualHost<Arc> + VisualHost<Chain>
{
}

/// Receives every per-tick notification.
pub trait PreviewSink: LightingSink + RingSink {}

impl<S: LightingSink + RingSink> PreviewSink for S {}

/// Current playback position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Playhead {
    beat: f32,
    time: f32,
}

/// Lighting, rings and object lifecycles for one loaded difficulty.
pub struct Previewer<H: ObjectHost> {
    config: PreviewConfig,
    jump: JumpSettings,
    mapping_extensions: bool,
    replay_hits: Option<Vec<f32>>,
    playhead: Playhead,
    lighting: LightingEngine,
    rings: RingEngine,
    notes: ObjectManager<Note, H>,
    bombs: ObjectManager<Bomb, H>,
    walls: ObjectManager<Wall, H>,
    arcs: ObjectManager<Arc, H>,
    chains: ObjectManager<Chain, H>,
}

impl<H: ObjectHost> Previewer<H> {
    /// An empty previewer: static lights, resting rings, no objects.
    pub fn new(config: PreviewConfig, jump: JumpSettings) -> Self {
        let lighting = LightingEngine::new(&BpmMap::constant(IDLE_BPM), config.lights.clone());
        Self {
            config,
            jump,
            mapping_extensions: false,
            replay_hits: None,
            playhead: Playhead::default(),
            lighting,
            rings: RingEngine::new(),
            notes: ObjectManager::new(),
            bombs: ObjectManager::new(),
            walls: ObjectManager::new(),
            arcs: ObjectManager::new(),
            chains: ObjectManager::new(),
        }
    }

    /// Replace everything with a new difficulty.
    ///
    /// Every rendered visual goes back to the pool before the new timelines are
    /// installed. All random population draws come from `seed`.
    pub fn load_difficulty(
        &mut self,
        raw: &RawDifficulty,
        clock: &dyn BeatClock,
        jump: JumpSettings,
        seed: u64,
        host: &mut H,
    ) {
        self.clear(host);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let events = raw.events(clock);
        self.lighting.set_tuning(self.config.lights.clone());
        if raw.basic_beatmap_events.is_empty() {
            self.lighting.load_static_layout(clock, raw.boosts(clock));
        } else {
            self.lighting.load(clock, &events, raw.boosts(clock), &mut rng);
        }
        self.rings.load(&events, &mut rng);

        let mut objects = load_objects(raw, clock, self.config.objects.object_floor_offset);
        if let Some(hits) = &self.replay_hits {
            objects.apply_replay_hits(hits);
        }
        self.jump = jump;
        self.mapping_extensions = raw.mapping_extensions;

        let ctx = self.spawn_context();
        self.notes.reload(objects.notes, &ctx, host);
        self.bombs.reload(objects.bombs, &ctx, host);
        self.walls.reload(objects.walls, &ctx, host);
        self.arcs.reload(objects.arcs, &ctx, host);
        self.chains.reload(objects.chains, &ctx, host);

        debug!(
            "difficulty loaded: {} events, njs {}, reaction {}s",
            events.len(),
            jump.njs,
            jump.reaction_time
        );
    }

    /// Replay hit times (sorted, seconds) for the next load; `None` leaves replay mode.
    pub fn set_replay(&mut self, hit_times: Option<Vec<f32>>) {
        self.replay_hits = hit_times;
    }

    /// Run one tick at the given playback position.
    pub fn update<S: PreviewSink>(&mut self, beat: f32, time: f32, host: &mut H, sink: &mut S) {
        self.playhead = Playhead { beat, time };
        self.emit(sink);
        self.reconcile(host);
    }

    /// Swap the colour palette and re-derive everything coloured by it.
    pub fn set_palette<S: PreviewSink>(&mut self, palette: ColorPalette, host: &mut H, sink: &mut S) {
        self.config.palette = palette;
        self.emit(sink);
        self.rebuild_visuals(host);
    }

    /// Install a new settings snapshot and re-derive whatever `change` touches.
    pub fn apply_setting_change<S: PreviewSink>(
        &mut self,
        change: &SettingsChange,
        settings: Settings,
        host: &mut H,
        sink: &mut S,
    ) {
        self.config.settings = settings;
        self.lighting.settings_changed(
            change,
            self.playhead.beat,
            self.playhead.time,
            &self.config.palette,
            &self.config.settings,
            sink,
        );
        if change.affects(OBJECT_SETTINGS) {
            self.rebuild_visuals(host);
        }
    }

    /// Change approach speed or reaction time mid-difficulty.
    pub fn set_jump_settings(&mut self, jump: JumpSettings, host: &mut H) {
        self.jump = jump;
        self.reconcile(host);
    }

    /// Release every rendered visual.
    pub fn clear(&mut self, host: &mut H) {
        self.notes.clear_rendered(host);
        self.bombs.clear_rendered(host);
        self.walls.clear_rendered(host);
        self.arcs.clear_rendered(host);
        self.chains.clear_rendered(host);
    }

    /// The spawn window at the current playhead.
    pub fn spawn_context(&self) -> SpawnContext {
        let mut ctx = SpawnContext::new(
            self.playhead.time,
            self.jump,
            &self.config.objects,
            &self.config.settings,
        );
        ctx.mapping_extensions = self.mapping_extensions;
        ctx.replay_mode = self.replay_hits.is_some();
        ctx
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn lighting(&self) -> &LightingEngine {
        &self.lighting
    }

    pub fn rings(&self) -> &RingEngine {
        &self.rings
    }

    pub fn notes(&self) -> &ObjectManager<Note, H> {
        &self.notes
    }

    pub fn bombs(&self) -> &ObjectManager<Bomb, H> {
        &self.bombs
    }

    pub fn walls(&self) -> &ObjectManager<Wall, H> {
        &self.walls
    }

    pub fn arcs(&self) -> &ObjectManager<Arc, H> {
        &self.arcs
    }

    pub fn chains(&self) -> &ObjectManager<Chain, H> {
        &self.chains
    }

    /// Number of visuals currently held across all kinds.
    pub fn rendered_count(&self) -> usize {
        self.notes.rendered().len()
            + self.bombs.rendered().len()
            + self.walls.rendered().len()
            + self.arcs.rendered().len()
            + self.chains.rendered().len()
    }

    fn emit<S: PreviewSink>(&self, sink: &mut S) {
        let Playhead { beat, time } = self.playhead;
        self.lighting
            .update(beat, time, &self.config.palette, &self.config.settings, sink);
        self.rings.update(time, sink);
    }

    fn reconcile(&mut self, host: &mut H) {
        let ctx = self.spawn_context();
        self.notes.update(&ctx, host);
        self.bombs.update(&ctx, host);
        self.walls.update(&ctx, host);
        self.arcs.update(&ctx, host);
        self.chains.update(&ctx, host);
    }

    /// Drop and re-acquire every visual so the host rebuilds materials.
    fn rebuild_visuals(&mut self, host: &mut H) {
        self.clear(host);
        self.reconcile(host);
    }
}

//! Visibility-window lifecycle for pooled object visuals.
//!
//! An [`ObjectManager`] owns the full, sorted object list of one kind plus one
//! visual slot per object. Each tick it releases visuals that left the spawn
//! window and acquires visuals for objects that entered it. Pooling itself
//! belongs to the host, reached through [`VisualHost`].
//!
//! A slot is empty while its object is outside the window and filled while
//! inside, so an object can never hold two visuals and a visual is released
//! exactly once.

use super::window::SpawnContext;
use crate::timeline::{Timed, Timeline};

/// Where and how a visual should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: [f32; 3],
    /// Rotation about the track axis, in degrees.
    pub angle: f32,
    pub scale: [f32; 3],
}

impl Placement {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            angle: 0.0,
            scale: [1.0; 3],
        }
    }
}

/// A map object that gets a visual while inside its spawn window.
pub trait Spawnable: Timed {
    /// When the object's span ends. Point objects end where they start.
    fn end_time(&self) -> f32 {
        self.time()
    }

    /// Whether the object needs a visual at `ctx.now`.
    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool;

    /// Whether a visual that left the window stays alive (hidden) for now.
    /// `audio_playing` reports whether the visual's sound is still audible.
    fn lingers(&self, _ctx: &SpawnContext, _audio_playing: bool) -> bool {
        false
    }

    /// Transform for the object's visual at `ctx.now`.
    fn placement(&self, ctx: &SpawnContext) -> Placement;
}

/// Host-side pool and scene access for visuals of objects of type `T`.
pub trait VisualHost<T> {
    type Handle;

    /// Take a visual from the pool for `object`.
    fn acquire(&mut self, object: &T) -> Self::Handle;
    /// Return a visual to the pool.
    fn release(&mut self, handle: Self::Handle);
    fn place(&mut self, handle: &mut Self::Handle, placement: &Placement);
    fn set_enabled(&mut self, handle: &mut Self::Handle, enabled: bool);

    /// Whether the visual's hit sound is still playing.
    fn audio_playing(&self, _handle: &Self::Handle) -> bool {
        false
    }
}

/// Lifecycle state of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    NotSpawned,
    Rendered,
    /// Out of the window, but its visual is kept (disabled) for a sound tail.
    HeldForTail,
}

struct Slot<H> {
    handle: H,
    enabled: bool,
}

/// Windowed visibility controller for one object kind.
pub struct ObjectManager<T, V: VisualHost<T>> {
    objects: Timeline<T>,
    /// Running max of end times, so `reach[i]` is the latest end among `0..=i`.
    reach: Vec<f32>,
    slots: Vec<Option<Slot<V::Handle>>>,
    /// Indices of objects currently holding a visual, in acquisition order.
    rendered: Vec<usize>,
}

impl<T: Spawnable, V: VisualHost<T>> ObjectManager<T, V> {
    pub fn new() -> Self {
        Self {
            objects: Timeline::new(),
            reach: Vec::new(),
            slots: Vec::new(),
            rendered: Vec::new(),
        }
    }

    /// Release every visual, then install a new object list.
    pub fn replace(&mut self, objects: Timeline<T>, host: &mut V) {
        self.clear_rendered(host);
        self.slots = (0..objects.len()).map(|_| None).collect();
        self.reach = objects
            .iter()
            .scan(f32::NEG_INFINITY, |latest, o| {
                *latest = latest.max(o.time()).max(o.end_time());
                Some(*latest)
            })
            .collect();
        self.objects = objects;
    }

    /// Replace the object list and immediately reconcile against `ctx`.
    pub fn reload(&mut self, objects: Timeline<T>, ctx: &SpawnContext, host: &mut V) {
        self.replace(objects, host);
        self.update(ctx, host);
    }

    pub fn objects(&self) -> &Timeline<T> {
        &self.objects
    }

    /// Indices of objects currently holding a visual.
    pub fn rendered(&self) -> &[usize] {
        &self.rendered
    }

    pub fn visual(&self, index: usize) -> Option<&V::Handle> {
        self.slots.get(index)?.as_ref().map(|s| &s.handle)
    }

    pub fn state(&self, index: usize) -> ObjectState {
        match self.slots.get(index) {
            Some(Some(slot)) if slot.enabled => ObjectState::Rendered,
            Some(Some(_)) => ObjectState::HeldForTail,
            _ => ObjectState::NotSpawned,
        }
    }

    /// Return the visual of object `index` to the pool. A second call, or a
    /// call for an object without a visual, does nothing and returns `false`.
    pub fn release(&mut self, index: usize, host: &mut V) -> bool {
        let Some(slot) = self.slots.get_mut(index).and_then(Option::take) else {
            return false;
        };
        host.release(slot.handle);
        self.rendered.retain(|&i| i != index);
        true
    }

    /// Release every visual.
    pub fn clear_rendered(&mut self, host: &mut V) {
        for index in std::mem::take(&mut self.rendered) {
            if let Some(slot) = self.slots.get_mut(index).and_then(Option::take) {
                host.release(slot.handle);
            }
        }
    }

    /// Release (or hide, while lingering) visuals of objects that left the window.
    pub fn clear_outside(&mut self, ctx: &SpawnContext, host: &mut V) {
        for pos in (0..self.rendered.len()).rev() {
            let index = self.rendered[pos];
            let object = &self.objects[index];
            let Some(slot) = self.slots[index].as_mut() else {
                continue;
            };

            if object.in_spawn_range(ctx) {
                set_enabled::<T, V>(host, slot, true);
                continue;
            }

            let playing = host.audio_playing(&slot.handle);
            if object.lingers(ctx, playing) {
                set_enabled::<T, V>(host, slot, false);
            } else if let Some(slot) = self.slots[index].take() {
                host.release(slot.handle);
                self.rendered.remove(pos);
            }
        }
    }

    /// Reconcile visuals against the window at `ctx.now`.
    ///
    /// Objects before the first one whose running end time reaches
    /// [`SpawnContext::trailing_bound`] have all passed the camera, so the
    /// scan starts there. It stops at the first object that is out of the
    /// window and past the spawn horizon. Out-of-window objects before the
    /// horizon (expired ones next to long lived ones) are skipped rather than
    /// ending the scan.
    pub fn update(&mut self, ctx: &SpawnContext, host: &mut V) {
        self.clear_outside(ctx, host);
        if self.objects.is_empty() {
            return;
        }

        let horizon = ctx.spawn_horizon();
        let bound = ctx.trailing_bound();
        let hint = self.reach.partition_point(|&end| end < bound);
        let Some(start) = self
            .objects
            .first_index_from(hint, horizon, |o| o.in_spawn_range(ctx))
        else {
            return;
        };

        for index in start..self.objects.len() {
            let object = &self.objects[index];
            if object.in_spawn_range(ctx) {
                self.show(index, ctx, host);
            } else if object.time() > horizon {
                break;
            }
        }
    }

    /// Acquire (if needed) and position the visual of object `index`.
    fn show(&mut self, index: usize, ctx: &SpawnContext, host: &mut V) {
        let object = &self.objects[index];
        let placement = object.placement(ctx);
        let slot = match &mut self.slots[index] {
            Some(slot) => {
                set_enabled::<T, V>(host, slot, true);
                slot
            }
            empty => {
                let mut handle = host.acquire(object);
                host.set_enabled(&mut handle, true);
                self.rendered.push(index);
                empty.insert(Slot {
                    handle,
                    enabled: true,
                })
            }
        };
        host.place(&mut slot.handle, &placement);
    }
}

impl<T: Spawnable, V: VisualHost<T>> Default for ObjectManager<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn set_enabled<T, V: VisualHost<T>>(host: &mut V, slot: &mut Slot<V::Handle>, enabled: bool) {
    if slot.enabled != enabled {
        host.set_enabled(&mut slot.handle, enabled);
        slot.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::window::JumpSettings;
    use std::collections::HashSet;

    #[derive(Debug, Clone)]
    struct Dot {
        time: f32,
        tail: bool,
    }

    impl Timed for Dot {
        fn beat(&self) -> f32 {
            self.time
        }
        fn time(&self) -> f32 {
            self.time
        }
    }

    impl Spawnable for Dot {
        fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
            ctx.in_spawn_range(self.time, false, false)
        }
        fn lingers(&self, _ctx: &SpawnContext, audio_playing: bool) -> bool {
            self.tail && audio_playing
        }
        fn placement(&self, ctx: &SpawnContext) -> Placement {
            Placement::at([0.0, 0.0, ctx.z_position(self.time)])
        }
    }

    /// Pool that hands out numbered handles and tracks what is outstanding.
    #[derive(Default)]
    struct Pool {
        next: u32,
        outstanding: HashSet<u32>,
        acquired: u32,
        released: u32,
        playing: bool,
        placed: Vec<(u32, f32)>,
    }

    impl VisualHost<Dot> for Pool {
        type Handle = u32;

        fn acquire(&mut self, _object: &Dot) -> u32 {
            self.next += 1;
            self.acquired += 1;
            self.outstanding.insert(self.next);
            self.next
        }
        fn release(&mut self, handle: u32) {
            assert!(self.outstanding.remove(&handle), "double release of {handle}");
            self.released += 1;
        }
        fn place(&mut self, handle: &mut u32, placement: &Placement) {
            self.placed.push((*handle, placement.position[2]));
        }
        fn set_enabled(&mut self, _handle: &mut u32, _enabled: bool) {}
        fn audio_playing(&self, _handle: &u32) -> bool {
            self.playing
        }
    }

    /// An object covering `[start, end]`.
    #[derive(Debug, Clone)]
    struct Span {
        start: f32,
        end: f32,
    }

    impl Timed for Span {
        fn beat(&self) -> f32 {
            self.start
        }
        fn time(&self) -> f32 {
            self.start
        }
    }

    impl Spawnable for Span {
        fn end_time(&self) -> f32 {
            self.end
        }
        fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
            ctx.duration_in_spawn_range(self.start, self.end, true, true)
        }
        fn placement(&self, ctx: &SpawnContext) -> Placement {
            Placement::at([0.0, 0.0, ctx.z_position(self.start)])
        }
    }

    impl VisualHost<Span> for Pool {
        type Handle = u32;

        fn acquire(&mut self, _object: &Span) -> u32 {
            self.next += 1;
            self.acquired += 1;
            self.outstanding.insert(self.next);
            self.next
        }
        fn release(&mut self, handle: u32) {
            assert!(self.outstanding.remove(&handle), "double release of {handle}");
            self.released += 1;
        }
        fn place(&mut self, _handle: &mut u32, _placement: &Placement) {}
        fn set_enabled(&mut self, _handle: &mut u32, _enabled: bool) {}
    }

    fn ctx(now: f32) -> SpawnContext {
        SpawnContext {
            now,
            jump: JumpSettings::new(10.0, 3.0),
            move_z: 0.0,
            move_time: 0.0,
            rotation_animation_time: 0.0,
            behind_camera_z: 0.0,
            object_floor_offset: 0.0,
            player_height_offset: 0.0,
            move_animations: false,
            rotate_animations: false,
            flip_animations: false,
            mapping_extensions: false,
            replay_mode: false,
        }
    }

    fn manager(times: &[f32]) -> (ObjectManager<Dot, Pool>, Pool) {
        let mut pool = Pool::default();
        let mut m = ObjectManager::new();
        m.replace(
            times
                .iter()
                .map(|&time| Dot { time, tail: false })
                .collect(),
            &mut pool,
        );
        (m, pool)
    }

    #[test]
    fn enters_and_leaves_exactly_once() {
        let (mut m, mut pool) = manager(&[10.0]);
        let mut now = 5.0;
        let mut states = Vec::new();
        while now < 12.0 {
            m.update(&ctx(now), &mut pool);
            states.push(m.state(0));
            now += 0.25;
        }
        assert_eq!(pool.acquired, 1);
        assert_eq!(pool.released, 1);
        // spawned at now=7.0, gone from now=10.0
        let first = states.iter().position(|s| *s == ObjectState::Rendered);
        let last = states.iter().rposition(|s| *s == ObjectState::Rendered);
        assert_eq!(first, Some(8));
        assert_eq!(last, Some(19));
    }

    #[test]
    fn never_double_acquires() {
        let (mut m, mut pool) = manager(&[10.0, 10.5, 11.0]);
        for _ in 0..5 {
            m.update(&ctx(8.0), &mut pool);
        }
        assert_eq!(pool.acquired, 3);
        assert_eq!(m.rendered().len(), 3);
    }

    #[test]
    fn release_is_idempotent() {
        let (mut m, mut pool) = manager(&[10.0]);
        m.update(&ctx(8.0), &mut pool);
        assert!(m.visual(0).is_some());
        assert!(m.release(0, &mut pool));
        assert!(!m.release(0, &mut pool));
        assert!(!m.release(42, &mut pool));
        assert_eq!(pool.released, 1);
        assert!(m.visual(0).is_none());
        assert!(m.rendered().is_empty());
    }

    #[test]
    fn scan_stops_past_horizon() {
        let times: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let (mut m, mut pool) = manager(&times);
        m.update(&ctx(50.0), &mut pool);
        // (50, 53]
        let mut rendered = m.rendered().to_vec();
        rendered.sort_unstable();
        assert_eq!(rendered, vec![51, 52, 53]);
    }

    #[test]
    fn seeking_backwards_reconciles() {
        let times: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let (mut m, mut pool) = manager(&times);
        m.update(&ctx(50.0), &mut pool);
        m.update(&ctx(10.0), &mut pool);
        let mut rendered = m.rendered().to_vec();
        rendered.sort_unstable();
        assert_eq!(rendered, vec![11, 12, 13]);
        assert_eq!(pool.outstanding.len(), 3);
    }

    #[test]
    fn lingering_visual_is_held_then_released() {
        let mut pool = Pool::default();
        let mut m = ObjectManager::new();
        m.replace(
            Timeline::from_unsorted(vec![Dot {
                time: 10.0,
                tail: true,
            }]),
            &mut pool,
        );
        m.update(&ctx(9.0), &mut pool);
        pool.playing = true;
        m.update(&ctx(10.5), &mut pool);
        assert_eq!(m.state(0), ObjectState::HeldForTail);
        assert_eq!(pool.released, 0);
        pool.playing = false;
        m.update(&ctx(10.6), &mut pool);
        assert_eq!(m.state(0), ObjectState::NotSpawned);
        assert_eq!(pool.released, 1);
    }

    #[test]
    fn replace_releases_everything() {
        let (mut m, mut pool) = manager(&[10.0, 11.0]);
        m.update(&ctx(9.0), &mut pool);
        assert_eq!(pool.outstanding.len(), 2);
        m.replace(Timeline::from_unsorted(vec![Dot { time: 1.0, tail: false }]), &mut pool);
        assert!(pool.outstanding.is_empty());
        assert!(m.rendered().is_empty());
        assert_eq!(m.objects().len(), 1);
    }

    #[test]
    fn placement_tracks_time() {
        let (mut m, mut pool) = manager(&[10.0]);
        m.update(&ctx(8.0), &mut pool);
        m.update(&ctx(9.0), &mut pool);
        let zs: Vec<f32> = pool.placed.iter().map(|&(_, z)| z).collect();
        assert_eq!(zs, vec![20.0, 10.0]);
    }

    #[test]
    fn long_span_survives_seek_past_later_objects() {
        let mut pool = Pool::default();
        let mut m: ObjectManager<Span, Pool> = ObjectManager::new();
        m.replace(
            Timeline::from_unsorted(vec![
                Span {
                    start: 0.0,
                    end: 100.0,
                },
                Span {
                    start: 40.0,
                    end: 40.1,
                },
            ]),
            &mut pool,
        );

        m.update(&ctx(200.0), &mut pool);
        assert!(m.rendered().is_empty());

        // the short span at 40 has expired but the long one still covers 50
        m.update(&ctx(50.0), &mut pool);
        assert!(m.objects()[0].in_spawn_range(&ctx(50.0)));
        assert_eq!(m.rendered(), &[0]);
        assert_eq!(m.state(1), ObjectState::NotSpawned);

        m.update(&ctx(100.5), &mut pool);
        assert!(m.rendered().is_empty());
        assert_eq!(pool.acquired, pool.released);
    }
}

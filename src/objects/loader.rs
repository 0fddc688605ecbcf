//! Builds the per-kind object timelines from a raw difficulty.
//!
//! All raw objects are merged and sorted by beat, then walked one same-beat
//! group at a time. Values that depend on neighbours (jump start heights,
//! chain heads, arc attachments, snapped angles, flips) are resolved per group.

use log::debug;

use super::geometry::{
    direction_vector, flip_height, object_angle, object_position, reverse_cut_direction,
    snap_angle, DOT_DIRECTION, START_Y_SPACING,
};
use super::kinds::{Arc, Bomb, Chain, Note, ObjectTime, Wall};
use crate::beatmap::{RawBombNote, RawChain, RawColorNote, RawDifficulty, RawObstacle};
use crate::timeline::{Timed, Timeline};
use crate::timing::{same_beat, same_time, BeatClock, SAME_TIME_LEEWAY};

/// Arc ends attached to a note or bomb are pushed this far along their direction.
pub const HALF_NOTE_OFFSET: f32 = 0.225;

/// Every object of one difficulty, sorted per kind.
#[derive(Debug, Clone, Default)]
pub struct MapObjects {
    pub notes: Timeline<Note>,
    pub bombs: Timeline<Bomb>,
    pub walls: Timeline<Wall>,
    pub arcs: Timeline<Arc>,
    pub chains: Timeline<Chain>,
}

impl MapObjects {
    /// Mark notes and bombs cut in a replay. `hit_times` must be sorted.
    pub fn apply_replay_hits(&mut self, hit_times: &[f32]) {
        let was_hit = |time: f32| {
            let i = hit_times.partition_point(|&t| t < time - SAME_TIME_LEEWAY);
            hit_times.get(i).is_some_and(|&t| same_time(t, time))
        };
        for note in self.notes.as_mut_slice() {
            note.was_hit = was_hit(note.time());
        }
        for bomb in self.bombs.as_mut_slice() {
            bomb.was_hit = was_hit(bomb.time());
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ArcEnd {
    beat: f32,
    x: f32,
    y: f32,
    direction: i32,
    magnitude: f32,
    /// Jump start height of the object this end is attached to.
    attached_start_y: Option<f32>,
}

enum Entry<'a> {
    Note(&'a RawColorNote),
    Bomb(&'a RawBombNote),
    Wall(&'a RawObstacle),
    Chain(&'a RawChain),
    ArcHead(usize),
    ArcTail(usize),
}

/// Split arcs into heads and tails. Backwards arcs are swapped end for end,
/// with both cut directions reversed.
fn split_arcs(raw: &RawDifficulty) -> (Vec<ArcEnd>, Vec<ArcEnd>) {
    raw.sliders
        .iter()
        .map(|a| {
            let head = ArcEnd {
                beat: a.b,
                x: a.x,
                y: a.y,
                direction: a.d,
                magnitude: a.mu,
                attached_start_y: None,
            };
            let tail = ArcEnd {
                beat: a.tb,
                x: a.tx,
                y: a.ty,
                direction: a.tc,
                magnitude: a.tmu,
                attached_start_y: None,
            };
            if a.tb < a.b {
                let flip = |end: ArcEnd| ArcEnd {
                    direction: reverse_cut_direction(end.direction),
                    ..end
                };
                (flip(tail), flip(head))
            } else {
                (head, tail)
            }
        })
        .unzip()
}

/// Jump start height of an object: objects stacked below it in the same lane
/// push it one spacing step higher each.
fn start_y(x: f32, y: f32, stack: &[(f32, f32)], floor_offset: f32) -> f32 {
    let below = stack.iter().filter(|&&(sx, sy)| sx == x && sy < y).count();
    below as f32 * START_Y_SPACING + floor_offset
}

/// Mark the first free arc end at (`x`, `y`) as attached. Returns whether
/// one was found.
fn attach(ends: &mut [&mut ArcEnd], x: f32, y: f32, start_y: f32) -> bool {
    match ends
        .iter_mut()
        .find(|e| e.attached_start_y.is_none() && e.x == x && e.y == y)
    {
        Some(end) => {
            end.attached_start_y = Some(start_y);
            true
        }
        None => false,
    }
}

fn note_position(n: &RawColorNote, me: bool) -> [f32; 2] {
    object_position(n.x, n.y, n.custom_data.as_ref().and_then(|c| c.coordinates()), me)
}

/// Snapped rotation shared by the red (`red`) or blue notes of one beat.
///
/// Only a pair snaps, and only when its arrows agree: both pointing the same
/// way, or one arrow and one dot. Two dots keep their rotation.
fn pair_snap_angle(notes: &[&RawColorNote], red: bool, me: bool) -> Option<f32> {
    let pair: Vec<&RawColorNote> = notes.iter().copied().filter(|n| (n.c == 0) == red).collect();
    let &[a, b] = pair.as_slice() else {
        return None;
    };
    let arrows: Vec<f32> = [a, b]
        .iter()
        .filter(|n| n.d != DOT_DIRECTION)
        .map(|n| object_angle(n.d, 0.0, me))
        .collect();
    let cut = match *arrows.as_slice() {
        [one] => one,
        [first, second] if first == second => first,
        _ => return None,
    };
    snap_angle(cut, note_position(a, me), note_position(b, me))
}

/// Set up the side swap of a red and blue note crossed over each other
/// (red on the right).
fn set_flips(a: &mut Note, b: &mut Note) {
    if a.color == b.color {
        return;
    }
    let (red, blue) = if a.color == 0 { (&*a, &*b) } else { (&*b, &*a) };
    if red.position[0] <= blue.position[0] {
        return;
    }
    a.flip_y_height = flip_height(a.position, b.position);
    a.flip_start_x = b.position[0];
    b.flip_y_height = flip_height(b.position, a.position);
    b.flip_start_x = a.position[0];
}

/// Convert a raw difficulty into sorted per-kind object timelines.
pub fn load_objects(raw: &RawDifficulty, clock: &dyn BeatClock, floor_offset: f32) -> MapObjects {
    let me = raw.mapping_extensions;
    let (mut heads, mut tails) = split_arcs(raw);

    let mut entries: Vec<Entry<'_>> = Vec::new();
    entries.extend(raw.color_notes.iter().map(Entry::Note));
    entries.extend(raw.bomb_notes.iter().map(Entry::Bomb));
    entries.extend(raw.burst_sliders.iter().map(Entry::Chain));
    entries.extend(raw.obstacles.iter().map(Entry::Wall));
    entries.extend((0..heads.len()).map(Entry::ArcHead));
    entries.extend((0..tails.len()).map(Entry::ArcTail));

    let beat_of = |entry: &Entry<'_>, heads: &[ArcEnd], tails: &[ArcEnd]| match entry {
        Entry::Note(n) => n.b,
        Entry::Bomb(b) => b.b,
        Entry::Wall(w) => w.b,
        Entry::Chain(c) => c.b,
        Entry::ArcHead(i) => heads[*i].beat,
        Entry::ArcTail(i) => tails[*i].beat,
    };
    entries.sort_by(|a, b| beat_of(a, &heads, &tails).total_cmp(&beat_of(b, &heads, &tails)));

    let mut notes = Vec::new();
    let mut bombs = Vec::new();
    let mut walls = Vec::new();
    let mut chains = Vec::new();

    let mut start = 0;
    while start < entries.len() {
        let beat = beat_of(&entries[start], &heads, &tails);
        let end = start
            + entries[start..]
                .iter()
                .take_while(|&e| same_beat(clock, beat_of(e, &heads, &tails), beat))
                .count();
        let group = &entries[start..end];
        start = end;

        let stack: Vec<(f32, f32)> = group
            .iter()
            .filter_map(|e| match e {
                Entry::Note(n) => Some((n.x, n.y)),
                Entry::Bomb(b) => Some((b.x, b.y)),
                _ => None,
            })
            .collect();
        let group_notes: Vec<&RawColorNote> = group
            .iter()
            .filter_map(|e| match e {
                Entry::Note(n) => Some(*n),
                _ => None,
            })
            .collect();
        let snaps = [
            pair_snap_angle(&group_notes, true, me),
            pair_snap_angle(&group_notes, false, me),
        ];
        let group_chains: Vec<&RawChain> = group
            .iter()
            .filter_map(|e| match e {
                Entry::Chain(c) => Some(*c),
                _ => None,
            })
            .collect();
        let (head_ids, tail_ids): (Vec<usize>, Vec<usize>) = (
            group
                .iter()
                .filter_map(|e| match e {
                    Entry::ArcHead(i) => Some(*i),
                    _ => None,
                })
                .collect(),
            group
                .iter()
                .filter_map(|e| match e {
                    Entry::ArcTail(i) => Some(*i),
                    _ => None,
                })
                .collect(),
        );
        let mut ends: Vec<&mut ArcEnd> = heads
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| head_ids.contains(i))
            .map(|(_, e)| e)
            .chain(
                tails
                    .iter_mut()
                    .enumerate()
                    .filter(|(i, _)| tail_ids.contains(i))
                    .map(|(_, e)| e),
            )
            .collect();

        let first_note = notes.len();
        let mut arc_attachment = false;
        let mut chain_attachment = false;

        for entry in group {
            match entry {
                Entry::Note(n) => {
                    let position = note_position(n, me);
                    let snap = if n.c == 0 { snaps[0] } else { snaps[1] };
                    let note = Note {
                        at: ObjectTime::new(clock, n.b),
                        color: n.c,
                        cut_direction: n.d,
                        angle: snap.unwrap_or_else(|| object_angle(n.d, n.a as f32, me)),
                        position,
                        start_y: start_y(n.x, n.y, &stack, floor_offset),
                        is_chain_head: group_chains
                            .iter()
                            .any(|c| c.x == n.x && c.y == n.y && c.c == n.c),
                        flip_y_height: 0.0,
                        flip_start_x: position[0],
                        was_hit: false,
                        custom_color: n.custom_data.as_ref().and_then(|c| c.color()),
                    };
                    chain_attachment |= note.is_chain_head;
                    arc_attachment |= attach(&mut ends, n.x, n.y, note.start_y);
                    notes.push(note);
                }
                Entry::Bomb(b) => {
                    let custom = b.custom_data.as_ref();
                    let bomb = Bomb {
                        at: ObjectTime::new(clock, b.b),
                        position: object_position(b.x, b.y, custom.and_then(|c| c.coordinates()), me),
                        start_y: start_y(b.x, b.y, &stack, floor_offset),
                        was_hit: false,
                        custom_color: custom.and_then(|c| c.color()),
                    };
                    attach(&mut ends, b.x, b.y, bomb.start_y);
                    bombs.push(bomb);
                }
                Entry::Wall(w) => {
                    let custom = w.custom_data.as_ref();
                    let end = clock.time_from_beat(w.b + w.d);
                    walls.push(Wall {
                        at: ObjectTime::new(clock, w.b),
                        duration: (end - clock.time_from_beat(w.b)).max(0.0),
                        position: object_position(w.x, w.y, custom.and_then(|c| c.coordinates()), me),
                        width: w.w,
                        height: w.h,
                        custom_color: custom.and_then(|c| c.color()),
                    });
                }
                Entry::Chain(c) => chains.push(Chain {
                    at: ObjectTime::new(clock, c.b),
                    tail: ObjectTime::new(clock, c.tb),
                    color: c.c,
                    position: object_position(c.x, c.y, None, me),
                    tail_position: object_position(c.tx, c.ty, None, me),
                    cut_direction: c.d,
                    angle: object_angle(c.d, 0.0, me),
                    segments: c.sc,
                    squish: c.s,
                }),
                Entry::ArcHead(_) | Entry::ArcTail(_) => {}
            }
        }

        // attached notes keep their lanes
        if let [a, b] = &mut notes[first_note..] {
            if !arc_attachment && !chain_attachment {
                set_flips(a, b);
            }
        }
    }

    let arcs: Vec<Arc> = raw
        .sliders
        .iter()
        .zip(heads.iter().zip(&tails))
        .map(|(a, (head, tail))| build_arc(a.c, a.m, head, tail, clock, me))
        .collect();

    let objects = MapObjects {
        notes: Timeline::from_unsorted(notes),
        bombs: Timeline::from_unsorted(bombs),
        walls: Timeline::from_unsorted(walls),
        arcs: Timeline::from_unsorted(arcs),
        chains: Timeline::from_unsorted(chains),
    };
    debug!(
        "loaded objects: {} notes, {} bombs, {} walls, {} arcs, {} chains",
        objects.notes.len(),
        objects.bombs.len(),
        objects.walls.len(),
        objects.arcs.len(),
        objects.chains.len()
    );
    objects
}

fn build_arc(color: i32, mid_anchor: i32, head: &ArcEnd, tail: &ArcEnd, clock: &dyn BeatClock, me: bool) -> Arc {
    let mut arc = Arc {
        at: ObjectTime::new(clock, head.beat),
        tail: ObjectTime::new(clock, tail.beat),
        color,
        position: object_position(head.x, head.y, None, me),
        tail_position: object_position(tail.x, tail.y, None, me),
        head_direction: head.direction,
        tail_direction: tail.direction,
        head_magnitude: head.magnitude,
        tail_magnitude: tail.magnitude,
        mid_anchor,
        head_start_y: 0.0,
        tail_start_y: 0.0,
        has_head_attachment: false,
        has_tail_attachment: false,
    };
    arc.head_start_y = arc.position[1];
    arc.tail_start_y = arc.tail_position[1];

    // heads leave along their cut direction, tails arrive against theirs
    if let Some(start_y) = head.attached_start_y {
        let [dx, dy] = direction_vector(arc.head_angle(me));
        arc.position[0] += dx * HALF_NOTE_OFFSET;
        arc.position[1] += dy * HALF_NOTE_OFFSET;
        arc.head_start_y = start_y + dy * HALF_NOTE_OFFSET;
        arc.has_head_attachment = true;
    }
    if let Some(start_y) = tail.attached_start_y {
        let [dx, dy] = direction_vector(arc.tail_angle(me));
        arc.tail_position[0] -= dx * HALF_NOTE_OFFSET;
        arc.tail_position[1] -= dy * HALF_NOTE_OFFSET;
        arc.tail_start_y = start_y - dy * HALF_NOTE_OFFSET;
        arc.has_tail_attachment = true;
    }
    arc
}

//! CSV hand-tracking recordings.
//!
//! One row per tracked hand, no header, `#` starts a comment line:
//!
//! ```text
//! timestamp_us, L|R, px, py, pz, qw, qx, qy, qz, j0x, j0y, j0z, ..., j24z
//! ```
//!
//! `p`/`q` are the palm position and orientation, `j*` the 25 world-space
//! joint positions in `LocalJoints` order (per digit: root, then each bone
//! tip). Consecutive rows with the same timestamp form one frame.

use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::{debug, info};

use crate::device::{DeviceHub, DeviceId};
use crate::fusion::reconstruct::{local_joints, reconstruct};
use crate::geometry::frames::DEGENERATE_LENGTH;
use crate::geometry::{to_local, to_world};
use crate::hand::{DIGIT_COUNT, DigitKind, Frame, Hand, Handedness, JOINTS_PER_DIGIT, LocalJoints};

const JOINT_COUNT: usize = DIGIT_COUNT * JOINTS_PER_DIGIT;
const HEADER_COLUMNS: usize = 9;
pub const COLUMN_COUNT: usize = HEADER_COLUMNS + JOINT_COUNT * 3;

#[derive(Debug, Clone, Default)]
pub struct Recording {
    frames: Vec<Frame>,
}

impl Recording {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut frames: Vec<Frame> = Vec::new();
        for (row, rec) in rdr.records().enumerate() {
            let rec = rec.with_context(|| format!("{}: bad CSV row {}", path.display(), row + 1))?;
            let (timestamp_us, hand) = parse_row(&rec)
                .with_context(|| format!("{}: row {}", path.display(), row + 1))?;

            match frames.last_mut() {
                Some(frame) if frame.timestamp_us == timestamp_us => frame
                    .push_hand(hand)
                    .with_context(|| format!("{}: row {}", path.display(), row + 1))?,
                _ => frames.push(Frame::new(timestamp_us, vec![hand])?),
            }
        }

        info!(path = %path.display(), frames = frames.len(), "Loaded recording");
        Ok(Self { frames })
    }

    /// Write in the format [`Recording::load`] reads.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        for frame in &self.frames {
            for hand in frame.hands() {
                wtr.write_record(hand_row(frame.timestamp_us, hand))?;
            }
        }
        wtr.flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Frame> {
        self.frames.get(idx)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Plays a recording into a [`DeviceHub`] one frame per tick.
#[derive(Debug, Clone)]
pub struct RecordedDevice {
    id: DeviceId,
    recording: Recording,
    cursor: usize,
}

impl RecordedDevice {
    pub fn new(id: DeviceId, recording: Recording) -> Self {
        Self {
            id,
            recording,
            cursor: 0,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.recording.len()
    }

    /// Publish the next frame. Returns `false` once the recording is
    /// exhausted; the hub keeps the last frame.
    pub fn publish_next(&mut self, hub: &mut DeviceHub) -> bool {
        let Some(frame) = self.recording.get(self.cursor) else {
            return false;
        };
        debug!(device = %self.id, timestamp_us = frame.timestamp_us, "Replaying frame");
        hub.publish_frame(self.id, frame.clone());
        self.cursor += 1;
        true
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

fn parse_row(rec: &StringRecord) -> Result<(i64, Hand)> {
    if rec.len() != COLUMN_COUNT {
        bail!("expected {} columns, got {}", COLUMN_COUNT, rec.len());
    }

    let timestamp_us: i64 = rec[0]
        .parse()
        .with_context(|| format!("bad timestamp {:?}", &rec[0]))?;
    let handedness = match &rec[1] {
        "L" | "l" => Handedness::Left,
        "R" | "r" => Handedness::Right,
        other => bail!("bad handedness {:?}, expected L or R", other),
    };

    let values = rec
        .iter()
        .skip(2)
        .map(|s| s.parse::<f64>().with_context(|| format!("bad number {:?}", s)))
        .collect::<Result<Vec<f64>>>()?;
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        bail!("non-finite value {}", v);
    }

    let palm_position = Vector3::new(values[0], values[1], values[2]);
    let q = Quaternion::new(values[3], values[4], values[5], values[6]);
    let Some(palm_orientation) = UnitQuaternion::try_new(q, DEGENERATE_LENGTH) else {
        bail!("palm orientation is a zero quaternion");
    };

    let mut joints = LocalJoints::zeros();
    for (joint, xyz) in joints.iter_mut().zip(values[7..].chunks_exact(3)) {
        let world = Vector3::new(xyz[0], xyz[1], xyz[2]);
        *joint = to_local(&world, &palm_position, &palm_orientation);
    }

    Ok((
        timestamp_us,
        reconstruct(handedness, &palm_position, &palm_orientation, &joints),
    ))
}

fn hand_row(timestamp_us: i64, hand: &Hand) -> Vec<String> {
    let palm = &hand.palm;
    let q = palm.orientation.quaternion();

    let mut row = Vec::with_capacity(COLUMN_COUNT);
    row.push(timestamp_us.to_string());
    row.push(if hand.handedness.is_left() { "L" } else { "R" }.to_string());
    row.extend([palm.position.x, palm.position.y, palm.position.z].map(|v| v.to_string()));
    row.extend([q.w, q.i, q.j, q.k].map(|v| v.to_string()));

    let joints = local_joints(hand);
    for kind in DigitKind::ALL {
        for local in joints.digit(kind) {
            let world = to_world(local, &palm.position, &palm.orientation);
            row.extend([world.x, world.y, world.z].map(|v| v.to_string()));
        }
    }
    row
}

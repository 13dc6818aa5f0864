use crate::error::{GestError, GpResult};
use crate::sample::Sample;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_COLUMNS: [&str; 22] = [
    "instance_id",
    "pose_label",
    "left_finger_state_0",
    "left_finger_state_1",
    "left_finger_state_2",
    "left_finger_state_3",
    "left_finger_state_4",
    "right_finger_state_0",
    "right_finger_state_1",
    "right_finger_state_2",
    "right_finger_state_3",
    "right_finger_state_4",
    "motion_x_start",
    "motion_y_start",
    "motion_x_mid",
    "motion_y_mid",
    "motion_x_end",
    "motion_y_end",
    "main_axis_x",
    "main_axis_y",
    "delta_x",
    "delta_y",
];

pub fn sample_row(sample: &Sample, instance_id: u32) -> Vec<String> {
    let m = &sample.motion;
    let mut row = Vec::with_capacity(CSV_COLUMNS.len());
    row.push(instance_id.to_string());
    row.push(sample.pose_label.clone());
    row.extend(sample.left_finger_state.0.iter().map(u8::to_string));
    row.extend(sample.right_finger_state.0.iter().map(u8::to_string));
    row.extend(
        [m.x_start, m.y_start, m.x_mid, m.y_mid, m.x_end, m.y_end]
            .iter()
            .map(f32::to_string),
    );
    row.push(m.main_axis_x.to_string());
    row.push(m.main_axis_y.to_string());
    row.push(m.delta_x.to_string());
    row.push(m.delta_y.to_string());
    row
}

/// Header plus one row per sample, ids as captured.
pub fn write_samples_csv<W: Write>(writer: W, samples: &[Sample]) -> GpResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;
    for s in samples {
        wtr.write_record(sample_row(s, s.instance_id))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<dir>/gesture_data_custom_<label>.csv`, replacing any previous copy.
pub fn save_batch<P: AsRef<Path>>(dir: P, label: &str, samples: &[Sample]) -> GpResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("gesture_data_custom_{}.csv", label));
    write_samples_csv(File::create(&path)?, samples)?;
    info!("Saved {} samples to {:?}", samples.len(), path);
    Ok(path)
}

/// Last `instance_id` in an existing export, if any rows exist.
pub fn last_instance_id<P: AsRef<Path>>(path: P) -> GpResult<Option<u32>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut last = None;
    for record in rdr.records() {
        let record = record?;
        let Some(field) = record.get(0) else { continue };
        let id = field.trim().parse::<u32>().map_err(|e| {
            GestError::Validation(format!("bad instance_id '{}': {}", field, e))
        })?;
        last = Some(id);
    }
    Ok(last)
}

/// Appends samples to a cumulative file, renumbering them to continue after
/// the last stored id. Writes the header when the file is missing or empty.
/// Returns the first id assigned.
pub fn append_to_master<P: AsRef<Path>>(path: P, samples: &[Sample]) -> GpResult<u32> {
    let path = path.as_ref();
    // A zero-byte file has no header yet.
    let has_header = path.exists() && std::fs::metadata(path)?.len() > 0;
    let first_id = if has_header {
        last_instance_id(path)?.map_or(1, |id| id + 1)
    } else {
        1
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    if !has_header {
        wtr.write_record(CSV_COLUMNS)?;
    }
    for (offset, s) in samples.iter().enumerate() {
        wtr.write_record(sample_row(s, first_id + offset as u32))?;
    }
    wtr.flush()?;
    Ok(first_id)
}

//! End-to-end conversion tests: survey pair in, database file and index out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use terradb::cell::{CELL_POINTS, CELL_SAMPLES};
use terradb::codec;
use terradb::format::{FileHeader, CODE_NO_DATA, HEADER_LEN};
use terradb::index::INDEX_FILE;
use terradb::survey::SOURCE_DIM;
use terradb::{BlockId, Converter};

/// Write a survey pair (`.flt` + `.hdr`) into `dir`.
///
/// `sample` receives source row/column indices (row 0 = north edge,
/// column 0 = west edge).
fn write_survey<F>(dir: &Path, stem: &str, sample: F) -> PathBuf
where
    F: Fn(usize, usize) -> f32,
{
    let mut data = Vec::with_capacity(SOURCE_DIM * SOURCE_DIM * 4);
    for row in 0..SOURCE_DIM {
        for col in 0..SOURCE_DIM {
            data.extend_from_slice(&sample(row, col).to_le_bytes());
        }
    }
    let flt = dir.join(format!("{stem}.flt"));
    let mut f = fs::File::create(&flt).unwrap();
    f.write_all(&data).unwrap();

    fs::write(
        dir.join(format!("{stem}.hdr")),
        format!("ncols {SOURCE_DIM}\nnrows {SOURCE_DIM}\nbyteorder LSBFIRST\n"),
    )
    .unwrap();
    flt
}

/// Elevation a converted sample should hold at logical grid `(row, col)`,
/// given the source-indexed sample function used to write the survey.
fn expected_at<F>(sample: &F, row: i32, col: i32) -> i16
where
    F: Fn(usize, usize) -> f32,
{
    // The kept region maps logical (row, col) to source (1206-row, 1206-col)
    sample((1206 - row) as usize, (1206 - col) as usize).round() as i16
}

#[test]
fn test_terrain_block_writes_one_file() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    let sample = |r: usize, c: usize| 100.0 + ((r * 3 + c * 7) % 400) as f32;
    let input = write_survey(tmp.path(), "n35w123", sample);

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[input]).unwrap();

    assert_eq!(report.wrote, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.index_blocks, Some(1));

    let bytes = fs::read(db.join("n35w123.trn")).unwrap();
    let header = FileHeader::decode(&bytes).unwrap();
    assert_eq!(header.block, BlockId::new(35, 123));
    assert!(header.cells.iter().all(|c| c.has_data()));

    // Reconstruct cell 0 and compare against the source function
    let meta = &header.cells[0];
    assert_eq!(meta.rows as usize, CELL_POINTS);
    let record = &bytes[meta.offset as usize..(meta.offset + meta.len) as usize];
    let mut samples = Vec::new();
    codec::unpack(record, meta.min, meta.code, CELL_SAMPLES, &mut samples).unwrap();

    for row in 0..CELL_POINTS {
        for col in 0..CELL_POINTS {
            assert_eq!(
                samples[row * CELL_POINTS + col],
                expected_at(&sample, row as i32, col as i32),
                "cell 0 sample ({row}, {col})"
            );
        }
    }

    // The index marks exactly this block
    let index = fs::read(db.join(INDEX_FILE)).unwrap();
    assert_eq!(index.iter().filter(|&&b| b == 1).count(), 1);
    assert_eq!(index[BlockId::new(35, 123).index_slot()], 1);
}

#[test]
fn test_out_of_range_survey_is_missing() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    let input = write_survey(tmp.path(), "n05w070", |_, _| -9999.0);

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[input]).unwrap();

    assert_eq!(report.missing, 1);
    assert_eq!(report.wrote, 0);
    assert!(!db.join("n05w070.trn").exists());
    assert_eq!(report.index_blocks, Some(0));
}

#[test]
fn test_sea_level_survey_is_all_zero() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    let input = write_survey(tmp.path(), "n05w070", |_, _| 0.0);

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[input]).unwrap();

    assert_eq!(report.all_zero, 1);
    assert!(!db.join("n05w070.trn").exists());
}

#[test]
fn test_coastal_void_is_repaired() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    // An island in one corner of a sea block, with one provider void out in
    // open water. Without infill the void would flag a whole cell no-data.
    let sample = |r: usize, c: usize| {
        if r < 100 && c < 100 {
            80.0
        } else if (r, c) == (600, 600) {
            -9999.0
        } else {
            0.0
        }
    };
    let input = write_survey(tmp.path(), "s10e020", sample);

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[input]).unwrap();

    assert_eq!(report.wrote, 1);
    let bytes = fs::read(db.join("s10e020.trn")).unwrap();
    let header = FileHeader::decode(&bytes).unwrap();
    assert!(
        header.cells.iter().all(|c| c.code != CODE_NO_DATA),
        "the repaired void must not knock out a cell"
    );
}

#[test]
fn test_void_next_to_terrain_knocks_out_cell() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    // Same block, but the void sits against the island's shore where a
    // neighbor is well above sea level; it must survive infill and flag
    // its cell.
    let sample = |r: usize, c: usize| {
        if r < 100 && c < 100 {
            80.0
        } else if (r, c) == (100, 50) {
            -9999.0
        } else {
            0.0
        }
    };
    let input = write_survey(tmp.path(), "s10e020", sample);

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[input]).unwrap();

    assert_eq!(report.wrote, 1);
    let bytes = fs::read(db.join("s10e020.trn")).unwrap();
    let header = FileHeader::decode(&bytes).unwrap();
    let knocked_out = header
        .cells
        .iter()
        .filter(|c| c.code == CODE_NO_DATA)
        .count();
    assert_eq!(knocked_out, 1);
}

#[test]
fn test_wrong_dimension_survey_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    let good = write_survey(tmp.path(), "n35w123", |_, _| 150.0);

    // Header declares the wrong shape for this one
    let bad = tmp.path().join("n05w070.flt");
    fs::write(&bad, vec![0u8; 64]).unwrap();
    fs::write(
        tmp.path().join("n05w070.hdr"),
        "ncols 1200\nnrows 1200\nbyteorder LSBFIRST\n",
    )
    .unwrap();

    let mut converter = Converter::new(&db);
    let report = converter.convert_batch(&[bad, good]).unwrap();

    // The bad input is skipped, the run continues, the good block lands
    assert_eq!(report.skipped, 1);
    assert_eq!(report.wrote, 1);
    assert!(db.join("n35w123.trn").exists());
    assert_eq!(report.index_blocks, Some(1));
}

#[test]
fn test_file_size_matches_header_accounting() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("db");
    let input = write_survey(tmp.path(), "n00w000", |r, c| {
        ((r * 13 + c * 5) % 1800) as f32
    });

    let mut converter = Converter::new(&db);
    converter.convert_batch(&[input]).unwrap();

    let bytes = fs::read(db.join("n00w000.trn")).unwrap();
    let header = FileHeader::decode(&bytes).unwrap();
    let body: usize = header.cells.iter().map(|c| c.len as usize).sum();
    assert_eq!(bytes.len(), HEADER_LEN + body);

    for meta in header.cells.iter().filter(|c| c.has_data()) {
        assert_eq!(
            meta.len as usize,
            codec::packed_len(CELL_SAMPLES, meta.code),
            "record length must match ceil(n*w/8)"
        );
    }
}

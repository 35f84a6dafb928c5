//! Terrain block identification and filename utilities.
//!
//! The database is tiled into 1° × 1° blocks. Each block maps to one file
//! named after the block's **south-east corner**:
//!
//! `{n|s}{lat}{w|e}{lon}.trn`
//!
//! - Latitude: 2 digits with n/s prefix, north positive (e.g., n35, s12)
//! - Longitude: 3 digits with w/e prefix, **west positive** (e.g., w077, e138)
//!
//! The west-positive longitude convention comes from the propagation study
//! engine that consumes the database; `n05w070.trn` is the block whose
//! south-east corner sits at 5°N, 70°W.

/// File extension for database block files.
pub const BLOCK_EXT: &str = "trn";

/// Number of 1° × 1° blocks worldwide (180 latitudes × 360 longitudes).
pub const BLOCK_COUNT: usize = 180 * 360;

/// Identity of one 1° × 1° database block.
///
/// `lat` is the south-east corner latitude in degrees north; `lon` is the
/// south-east corner longitude in degrees **west** (so 70°W is `lon = 70`
/// and 20°E is `lon = -20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub lat: i16,
    pub lon: i16,
}

impl BlockId {
    /// Create a block id from south-east corner coordinates.
    pub fn new(lat: i16, lon: i16) -> Self {
        Self { lat, lon }
    }

    /// Whether this block lies within the valid global range.
    ///
    /// Latitudes span −90..=89 (a block extends one degree north of its
    /// corner) and west-positive longitudes span −179..=180.
    pub fn is_valid(&self) -> bool {
        (-90..=89).contains(&self.lat) && (-179..=180).contains(&self.lon)
    }

    /// Slot of this block in the global status index.
    ///
    /// Rows are latitude bands from 90°S northward, 360 entries per band.
    pub fn index_slot(&self) -> usize {
        debug_assert!(self.is_valid());
        (self.lat as i32 + 90) as usize * 360 + (self.lon as i32 + 179) as usize
    }

    /// Database filename for this block (e.g., "n05w070.trn").
    pub fn filename(&self) -> String {
        let lat_prefix = if self.lat >= 0 { 'n' } else { 's' };
        let lon_prefix = if self.lon >= 0 { 'w' } else { 'e' };
        format!(
            "{}{:02}{}{:03}.{}",
            lat_prefix,
            self.lat.abs(),
            lon_prefix,
            self.lon.abs(),
            BLOCK_EXT
        )
    }

    /// Parse a block id from a filename or path.
    ///
    /// Accepts an optional directory prefix and an optional extension; the
    /// stem must be exactly `{n|s}dd{w|e}ddd` (case insensitive). Returns
    /// `None` for anything else, including blocks outside the valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use terradb::block::BlockId;
    ///
    /// assert_eq!(BlockId::parse("n05w070.trn"), Some(BlockId::new(5, 70)));
    /// assert_eq!(BlockId::parse("s10e020.trn"), Some(BlockId::new(-10, -20)));
    /// assert_eq!(BlockId::parse("/db/n35w123.trn"), Some(BlockId::new(35, 123)));
    /// assert_eq!(BlockId::parse("readme.txt"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        // Extract just the filename if a path is given
        let name = name
            .rsplit('/')
            .next()
            .unwrap_or(name)
            .rsplit('\\')
            .next()
            .unwrap_or(name);

        // Remove the extension if present
        let name = name
            .strip_suffix(".trn")
            .or_else(|| name.strip_suffix(".TRN"))
            .or_else(|| name.strip_suffix(".flt"))
            .or_else(|| name.strip_suffix(".hdr"))
            .unwrap_or(name);

        // Must be exactly 7 characters: n05w070
        if name.len() != 7 || !name.is_ascii() {
            return None;
        }

        let lat_sign: i16 = match name.as_bytes()[0] {
            b'n' | b'N' => 1,
            b's' | b'S' => -1,
            _ => return None,
        };
        let lat: i16 = name[1..3].parse().ok()?;

        let lon_sign: i16 = match name.as_bytes()[3] {
            b'w' | b'W' => 1,
            b'e' | b'E' => -1,
            _ => return None,
        };
        let lon: i16 = name[4..7].parse().ok()?;

        let block = Self::new(lat * lat_sign, lon * lon_sign);
        block.is_valid().then_some(block)
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{:02}{}{:03}",
            if self.lat >= 0 { 'N' } else { 'S' },
            self.lat.abs(),
            if self.lon >= 0 { 'W' } else { 'E' },
            self.lon.abs()
        )
    }
}

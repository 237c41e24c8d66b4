//! Image list of a COLMAP sparse model (`images.bin` or `images.txt`).
//!
//! Only the registered image names are extracted; camera poses and 2-D point
//! observations are skipped over.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CurateError, CurateResult};

use super::ImageNameSource;

/// Bytes of one 2-D point record: x, y as f64 and the 3-D point id as i64.
const POINT2D_RECORD_BYTES: u64 = 24;

/// A reconstructed model directory, e.g. `<scene>/undistortion_sparse/0`.
#[derive(Debug, Clone)]
pub struct ColmapModel {
    dir: PathBuf,
}

impl ColmapModel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageNameSource for ColmapModel {
    fn image_names(&self) -> CurateResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(CurateError::missing(self.dir.as_path()));
        }

        let bin = self.dir.join("images.bin");
        let txt = self.dir.join("images.txt");
        let mut entries = if bin.is_file() {
            read_images_bin(&bin)?
        } else if txt.is_file() {
            read_images_txt(&txt)?
        } else {
            return Err(CurateError::missing(bin));
        };

        entries.sort_by_key(|(id, _)| *id);
        debug!("{} registered images in {:?}", entries.len(), self.dir);
        Ok(entries.into_iter().map(|(_, name)| name).collect())
    }
}

fn model_err(path: &Path, reason: impl ToString) -> CurateError {
    CurateError::ModelRead {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

struct LeReader<R> {
    inner: R,
}

impl<R: Read> LeReader<R> {
    fn array<const N: usize>(&mut self) -> std::io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn u32(&mut self) -> std::io::Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> std::io::Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn skip(&mut self, bytes: u64) -> std::io::Result<()> {
        let copied = std::io::copy(&mut (&mut self.inner).take(bytes), &mut std::io::sink())?;
        if copied != bytes {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        Ok(())
    }

    fn c_string(&mut self) -> std::io::Result<String> {
        let mut bytes = Vec::new();
        loop {
            let [b] = self.array::<1>()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Parse `images.bin`: a u64 image count, then per image its id, pose,
/// camera id, NUL-terminated name and 2-D points.
pub fn read_images_bin(path: &Path) -> CurateResult<Vec<(u32, String)>> {
    let file = File::open(path)?;
    let mut reader = LeReader {
        inner: BufReader::new(file),
    };

    let read = |reader: &mut LeReader<BufReader<File>>| -> std::io::Result<Vec<(u32, String)>> {
        let count = reader.u64()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let image_id = reader.u32()?;
            // qvec (4 x f64) and tvec (3 x f64)
            reader.skip(7 * 8)?;
            let _camera_id = reader.u32()?;
            let name = reader.c_string()?;
            let num_points = reader.u64()?;
            let point_bytes = num_points
                .checked_mul(POINT2D_RECORD_BYTES)
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::InvalidData))?;
            reader.skip(point_bytes)?;
            entries.push((image_id, name));
        }
        Ok(entries)
    };

    read(&mut reader).map_err(|e| model_err(path, e))
}

/// Parse `images.txt`: `#` comments, then two lines per image, the first being
/// `IMAGE_ID QW QX QY QZ TX TY TZ CAMERA_ID NAME`. The points line may be empty.
pub fn read_images_txt(path: &Path) -> CurateResult<Vec<(u32, String)>> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();
    let mut entries = Vec::new();

    while let Some(line) = lines.next() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.splitn(10, char::is_whitespace).collect();
        if fields.len() < 10 {
            return Err(model_err(path, format!("short image line: '{}'", trimmed)));
        }
        let image_id: u32 = fields[0]
            .parse()
            .map_err(|_| model_err(path, format!("bad image id '{}'", fields[0])))?;
        entries.push((image_id, fields[9].trim().to_string()));

        // 2-D points line
        if let Some(points) = lines.next() {
            points?;
        }
    }
    Ok(entries)
}

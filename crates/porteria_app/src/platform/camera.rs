//! Frame grabbing and QR decoding for the terminal build.
//!
//! `FrameDirectoryCamera` watches a directory that an external grabber keeps
//! dropping snapshots into (for example `ffmpeg -f v4l2 -i /dev/video0 -r 5
//! camera/frame_%05d.jpg`). Each snapshot is consumed once, oldest first.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use porteria_engine::{
    BarcodeDecoder, CameraDevice, DecodedSymbol, Frame, FrameError, ScanError, VideoSource,
};
use porteria_logging::{porteria_debug, porteria_info, porteria_trace};

const CAMERA_DIR_ENV: &str = "PORTERIA_CAMERA_DIR";
const DEFAULT_CAMERA_DIR: &str = "./camera";
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone)]
pub struct FrameDirectoryCamera {
    dir: PathBuf,
    poll_interval: Duration,
}

impl FrameDirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn from_env() -> Self {
        let dir = std::env::var_os(CAMERA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAMERA_DIR));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CameraDevice for FrameDirectoryCamera {
    fn open(&self) -> Result<Box<dyn VideoSource>, ScanError> {
        if !self.dir.is_dir() {
            return Err(ScanError::Open(format!(
                "{} is not a frame directory",
                self.dir.display()
            )));
        }
        porteria_info!("Camera opened on {:?}", self.dir);
        // Frames already present belong to an earlier session.
        let seen = list_frames(&self.dir)
            .map_err(|err| ScanError::Open(err.to_string()))?
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        Ok(Box::new(FrameDirectorySource {
            dir: self.dir.clone(),
            seen,
            poll_interval: self.poll_interval,
        }))
    }
}

struct FrameDirectorySource {
    dir: PathBuf,
    seen: HashSet<PathBuf>,
    poll_interval: Duration,
}

impl VideoSource for FrameDirectorySource {
    fn read_frame(&mut self) -> Result<Frame, FrameError> {
        let frames =
            list_frames(&self.dir).map_err(|err| FrameError::Closed(err.to_string()))?;
        let Some(path) = frames
            .into_iter()
            .map(|(path, _)| path)
            .find(|path| !self.seen.contains(path))
        else {
            thread::sleep(self.poll_interval);
            return Err(FrameError::Dropped("no new frame".to_string()));
        };
        self.seen.insert(path.clone());

        // A half-written snapshot fails to decode; the next poll picks up a fresh one.
        let image = image::open(&path)
            .map_err(|err| FrameError::Dropped(format!("{}: {err}", path.display())))?
            .to_luma8();
        porteria_trace!("Read frame {:?}", path);
        Ok(Frame {
            width: image.width(),
            height: image.height(),
            luma: image.into_raw(),
        })
    }

    fn release(&mut self) {
        porteria_info!("Camera released after {} frames", self.seen.len());
        self.seen.clear();
    }
}

/// Frame files in the directory, oldest first, ties broken by name.
fn list_frames(dir: &Path) -> std::io::Result<Vec<(PathBuf, SystemTime)>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_frame_file(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        frames.push((path, modified));
    }
    frames.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(frames)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl BarcodeDecoder for RqrrDecoder {
    fn decode(&self, frame: &Frame) -> Vec<DecodedSymbol> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if width == 0 || height == 0 || frame.luma.len() < width * height {
            return Vec::new();
        }
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
                frame.luma[y * width + x]
            });
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, payload)) => Some(DecodedSymbol { payload }),
                Err(err) => {
                    porteria_debug!("QR grid found but not decodable: {:?}", err);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::GrayImage::from_pixel(width, height, image::Luma([255u8]));
        img.save(path).unwrap();
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let temp = TempDir::new().unwrap();
        let camera = FrameDirectoryCamera::new(temp.path().join("absent"));
        assert!(matches!(camera.open(), Err(ScanError::Open(_))));
    }

    #[test]
    fn frames_present_at_open_are_skipped() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("old.png"), 2, 2);
        let mut camera = FrameDirectoryCamera::new(temp.path());
        camera.poll_interval = Duration::ZERO;
        let mut source = camera.open().unwrap();

        assert!(matches!(source.read_frame(), Err(FrameError::Dropped(_))));

        write_png(&temp.path().join("new.png"), 3, 2);
        let frame = source.read_frame().unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.luma.len(), 6);

        // Consumed once.
        assert!(matches!(source.read_frame(), Err(FrameError::Dropped(_))));
        source.release();
    }

    #[test]
    fn unreadable_snapshot_is_a_dropped_frame() {
        let temp = TempDir::new().unwrap();
        let mut camera = FrameDirectoryCamera::new(temp.path());
        camera.poll_interval = Duration::ZERO;
        let mut source = camera.open().unwrap();

        fs::write(temp.path().join("partial.jpg"), b"\xFF\xD8").unwrap();
        assert!(matches!(source.read_frame(), Err(FrameError::Dropped(_))));
    }

    #[test]
    fn non_frame_files_are_ignored() {
        assert!(is_frame_file(Path::new("a/frame_001.JPG")));
        assert!(!is_frame_file(Path::new("a/notes.txt")));
        assert!(!is_frame_file(Path::new("a/noext")));
    }

    #[test]
    fn blank_frame_decodes_to_nothing() {
        let frame = Frame {
            width: 8,
            height: 8,
            luma: vec![255; 64],
        };
        assert!(RqrrDecoder.decode(&frame).is_empty());
        assert!(RqrrDecoder.decode(&Frame::default()).is_empty());
    }
}

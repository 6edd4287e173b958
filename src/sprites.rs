use crate::art;
use crate::model::{AnimKey, Overlay, Pose, Stage, StatPage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Side length of every sprite and of the LCD.
pub(crate) const SIZE: usize = 32;

#[derive(Debug, Error)]
pub(crate) enum AssetError {
    #[error("missing sprite `{name}` (expected at {})", .path.display())]
    Missing { name: String, path: PathBuf },
    #[error("sprite `{name}` could not be decoded: {reason}")]
    Corrupt { name: String, reason: String },
    #[error("sprite `{name}` is {width}x{height}, expected 32x32")]
    BadSize {
        name: String,
        width: u32,
        height: u32,
    },
    #[error("animation `{name}` has no frames")]
    Empty { name: String },
    #[error("no sprite animation for `{key}`")]
    StageUnsupported { key: AnimKey },
    #[error("overlay `{overlay}` is not loaded")]
    OverlayMissing { overlay: Overlay },
    #[error("stat page `{page}` is not loaded")]
    PageMissing { page: StatPage },
    #[error("frame {index} out of range for `{name}` ({len} frames)")]
    FrameOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

/// 32×32 one-bit image. Column 0 is the most significant bit of each row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Bitmap {
    rows: [u32; SIZE],
}

impl Bitmap {
    pub(crate) fn blank() -> Self {
        Self::default()
    }

    fn mask(x: usize) -> u32 {
        1u32 << (SIZE - 1 - x)
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> bool {
        x < SIZE && y < SIZE && self.rows[y] & Self::mask(x) != 0
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, on: bool) {
        if x >= SIZE || y >= SIZE {
            return;
        }
        if on {
            self.rows[y] |= Self::mask(x);
        } else {
            self.rows[y] &= !Self::mask(x);
        }
    }

    pub(crate) fn or(&self, other: &Bitmap) -> Bitmap {
        let mut out = *self;
        for (dst, src) in out.rows.iter_mut().zip(other.rows.iter()) {
            *dst |= *src;
        }
        out
    }

    /// View starting `offset` columns into the image; uncovered columns are blank.
    pub(crate) fn shifted(&self, offset: i32) -> Bitmap {
        let mut out = Bitmap::blank();
        let n = offset.unsigned_abs() as usize;
        if n >= SIZE {
            return out;
        }
        for (dst, src) in out.rows.iter_mut().zip(self.rows.iter()) {
            *dst = if offset >= 0 { *src << n } else { *src >> n };
        }
        out
    }

    /// Draw `art` with its top-left at (x, y). `#` marks foreground; each
    /// art pixel becomes a `scale`×`scale` block. Anything off-canvas is clipped.
    pub(crate) fn stamp(&mut self, art: &[&str], x: i32, y: i32, scale: i32) {
        for (row, line) in art.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != '#' {
                    continue;
                }
                let px = x + col as i32 * scale;
                let py = y + row as i32 * scale;
                self.fill_rect(px, py, scale, scale, true);
            }
        }
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool) {
        for yy in y..y + h {
            for xx in x..x + w {
                if xx >= 0 && yy >= 0 {
                    self.set(xx as usize, yy as usize, on);
                }
            }
        }
    }

    pub(crate) fn count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Animation {
    name: String,
    frames: Vec<Bitmap>,
}

impl Animation {
    pub(crate) fn new(name: impl Into<String>, frames: Vec<Bitmap>) -> Result<Self, AssetError> {
        let name = name.into();
        if frames.is_empty() {
            return Err(AssetError::Empty { name });
        }
        Ok(Self { name, frames })
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn frame(&self, index: usize) -> Result<&Bitmap, AssetError> {
        self.frames.get(index).ok_or_else(|| AssetError::FrameOutOfRange {
            name: self.name.clone(),
            index,
            len: self.frames.len(),
        })
    }
}

/// Every sprite the game draws, loaded once at startup and never mutated.
#[derive(Debug)]
pub(crate) struct SpriteSheet {
    poses: HashMap<AnimKey, Animation>,
    overlays: HashMap<Overlay, Animation>,
    pages: HashMap<StatPage, Bitmap>,
}

impl SpriteSheet {
    pub(crate) fn animation(&self, key: AnimKey) -> Result<&Animation, AssetError> {
        self.poses
            .get(&key)
            .ok_or(AssetError::StageUnsupported { key })
    }

    pub(crate) fn overlay(&self, overlay: Overlay) -> Result<&Animation, AssetError> {
        self.overlays
            .get(&overlay)
            .ok_or(AssetError::OverlayMissing { overlay })
    }

    pub(crate) fn page(&self, page: StatPage) -> Result<&Bitmap, AssetError> {
        self.pages.get(&page).ok_or(AssetError::PageMissing { page })
    }

    /// Every playable stage needs both poses; every overlay and stat page
    /// must be present.
    pub(crate) fn validate(&self) -> Result<(), AssetError> {
        for stage in Stage::ALL.into_iter().filter(|s| s.is_playable()) {
            self.animation(AnimKey::idle(stage))?;
            self.animation(AnimKey::sleep(stage))?;
        }
        for overlay in Overlay::ALL {
            self.overlay(overlay)?;
        }
        for page in StatPage::ALL {
            self.page(page)?;
        }
        Ok(())
    }

    pub(crate) fn builtin() -> Result<Self, AssetError> {
        let mut poses = HashMap::new();
        for stage in Stage::ALL.into_iter().filter(|s| s.is_playable()) {
            for key in [AnimKey::idle(stage), AnimKey::sleep(stage)] {
                if let Some(frames) = art::pose_frames(key) {
                    poses.insert(key, Animation::new(key.to_string(), frames)?);
                }
            }
        }
        let mut overlays = HashMap::new();
        for overlay in Overlay::ALL {
            overlays.insert(
                overlay,
                Animation::new(overlay.to_string(), art::overlay_frames(overlay))?,
            );
        }
        let pages = StatPage::ALL
            .into_iter()
            .map(|p| (p, art::stat_page(p)))
            .collect();

        let sheet = Self {
            poses,
            overlays,
            pages,
        };
        sheet.validate()?;
        Ok(sheet)
    }

    /// Load PNG sprites laid out as
    /// `eggs/egg1/N.png`, `babies/baby1/{idle,sleep}/N.png`,
    /// `children/child1/{idle,sleep}/N.png`, `overlay/...` and `components/...`.
    pub(crate) fn load_dir(root: &Path) -> Result<Self, AssetError> {
        let mut poses = HashMap::new();
        for (key, dir, count) in POSE_DIRS {
            let frames = load_frames(root, dir, *count)?;
            poses.insert(*key, Animation::new(*dir, frames)?);
        }
        // Eggs have no sleep art; they lie still in their idle frames.
        if let Some(egg) = poses.get(&AnimKey::idle(Stage::Egg)).cloned() {
            poses.insert(AnimKey::sleep(Stage::Egg), egg);
        }

        let mut overlays = HashMap::new();
        for (overlay, source) in OVERLAY_SOURCES {
            let frames = match source {
                Source::Frames(dir, count) => load_frames(root, dir, *count)?,
                Source::Single(file) => vec![load_png(root, file)?],
            };
            overlays.insert(*overlay, Animation::new(overlay.to_string(), frames)?);
        }

        let mut pages = HashMap::new();
        for page in StatPage::ALL {
            let file = format!("components/{page}.png");
            pages.insert(page, load_png(root, &file)?);
        }

        let sheet = Self {
            poses,
            overlays,
            pages,
        };
        sheet.validate()?;
        Ok(sheet)
    }
}

enum Source {
    Frames(&'static str, usize),
    Single(&'static str),
}

const POSE_DIRS: &[(AnimKey, &str, usize)] = &[
    (
        AnimKey {
            stage: Stage::Egg,
            pose: Pose::Idle,
        },
        "eggs/egg1",
        2,
    ),
    (
        AnimKey {
            stage: Stage::Baby,
            pose: Pose::Idle,
        },
        "babies/baby1/idle",
        2,
    ),
    (
        AnimKey {
            stage: Stage::Baby,
            pose: Pose::Sleep,
        },
        "babies/baby1/sleep",
        2,
    ),
    (
        AnimKey {
            stage: Stage::Child,
            pose: Pose::Idle,
        },
        "children/child1/idle",
        2,
    ),
    (
        AnimKey {
            stage: Stage::Child,
            pose: Pose::Sleep,
        },
        "children/child1/sleep",
        2,
    ),
];

const OVERLAY_SOURCES: &[(Overlay, Source)] = &[
    (Overlay::Zzz, Source::Frames("overlay/OVERLAY_ZZZ", 2)),
    (Overlay::Eat, Source::Frames("overlay/EAT/apple", 6)),
    (Overlay::Stink, Source::Frames("overlay/OVERLAY_STINK", 2)),
    (Overlay::Dead, Source::Frames("overlay/OVERLAY_DEAD", 2)),
    (Overlay::Exclaim, Source::Frames("overlay/OVERLAY_EXCLAIM", 2)),
    (Overlay::Clean, Source::Single("overlay/OVERLAY_CLEAN.png")),
];

fn load_frames(root: &Path, dir: &str, count: usize) -> Result<Vec<Bitmap>, AssetError> {
    (0..count)
        .map(|i| load_png(root, &format!("{dir}/{i}.png")))
        .collect()
}

/// Pure white (255) is background; any other grey level is foreground.
fn load_png(root: &Path, rel: &str) -> Result<Bitmap, AssetError> {
    let path = root.join(rel);
    if !path.is_file() {
        return Err(AssetError::Missing {
            name: rel.to_string(),
            path,
        });
    }
    let img = image::open(&path)
        .map_err(|e| AssetError::Corrupt {
            name: rel.to_string(),
            reason: e.to_string(),
        })?
        .to_luma8();
    if img.width() as usize != SIZE || img.height() as usize != SIZE {
        return Err(AssetError::BadSize {
            name: rel.to_string(),
            width: img.width(),
            height: img.height(),
        });
    }
    let mut bm = Bitmap::blank();
    for (x, y, px) in img.enumerate_pixels() {
        if px.0[0] != 255 {
            bm.set(x as usize, y as usize, true);
        }
    }
    Ok(bm)
}

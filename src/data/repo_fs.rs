//! Filesystem-backed pair repository and image decoding.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use walkdir::WalkDir;

use crate::common::error::{EvalError, EvalResult};

use super::domain::{ImageExtensions, MatchRule, PairRepo};

/// Originals under `original_root`, counterparts under `adv_root` with the
/// same relative layout.
pub struct FsPairRepo {
    original_root: PathBuf,
    adv_root: PathBuf,
    extensions: ImageExtensions,
}

impl FsPairRepo {
    pub fn new(
        original_root: impl Into<PathBuf>,
        adv_root: impl Into<PathBuf>,
        extensions: ImageExtensions,
    ) -> Self {
        Self {
            original_root: original_root.into(),
            adv_root: adv_root.into(),
            extensions,
        }
    }

    /// First same-stem file in the sibling directory. Unreadable directories
    /// and entries degrade to no match.
    fn stem_match(&self, rel: &Path) -> Option<PathBuf> {
        let stem = rel.file_stem()?;
        let parent = match rel.parent() {
            Some(p) => self.adv_root.join(p),
            None => self.adv_root.clone(),
        };
        match same_stem_files(&parent, stem) {
            Ok(candidates) => candidates.into_iter().next(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(
                    rel_path = %rel.display(),
                    dir = %parent.display(),
                    error = %err,
                    "cannot scan for stem match"
                );
                None
            }
        }
    }
}

fn same_stem_files(dir: &Path, stem: &OsStr) -> io::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.file_stem() == Some(stem) {
            candidates.push(path);
        }
    }
    // read_dir order is platform dependent
    candidates.sort();
    Ok(candidates)
}

impl PairRepo for FsPairRepo {
    fn list_originals(&self) -> EvalResult<Vec<PathBuf>> {
        let mut out = Vec::new();
        let walk = WalkDir::new(&self.original_root)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walk {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() || !self.extensions.matches(entry.path()) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.original_root)
                .map_err(|e| EvalError::Internal(e.to_string()))?;
            out.push(rel.to_path_buf());
        }
        Ok(out)
    }

    fn original_path(&self, rel: &Path) -> PathBuf {
        self.original_root.join(rel)
    }

    fn find_counterpart(&self, rel: &Path) -> EvalResult<Option<(PathBuf, MatchRule)>> {
        let exact = self.adv_root.join(rel);
        if exact.is_file() {
            return Ok(Some((exact, MatchRule::Exact)));
        }
        Ok(self.stem_match(rel).map(|p| (p, MatchRule::Stem)))
    }
}

/// Decode any supported format into 8-bit RGB.
pub fn load_rgb(path: &Path) -> EvalResult<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| EvalError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn originals_are_listed_recursively_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let orig = tmp.path().join("orig");
        touch(&orig.join("b.png"));
        touch(&orig.join("a.JPG"));
        touch(&orig.join("sub/c.bmp"));
        touch(&orig.join("notes.txt"));

        let repo = FsPairRepo::new(&orig, tmp.path().join("adv"), ImageExtensions::default());
        let listed = repo.list_originals().unwrap();
        assert_eq!(
            listed,
            vec![
                PathBuf::from("a.JPG"),
                PathBuf::from("b.png"),
                PathBuf::from("sub/c.bmp"),
            ]
        );
    }

    #[test]
    fn exact_match_wins_over_stem_match() {
        let tmp = tempfile::tempdir().unwrap();
        let adv = tmp.path().join("adv");
        touch(&adv.join("x.jpg"));
        touch(&adv.join("x.png"));

        let repo = FsPairRepo::new(tmp.path().join("orig"), &adv, ImageExtensions::default());
        let (path, rule) = repo.find_counterpart(Path::new("x.png")).unwrap().unwrap();
        assert_eq!(path, adv.join("x.png"));
        assert_eq!(rule, MatchRule::Exact);
    }

    #[test]
    fn stem_match_takes_lexicographically_first() {
        let tmp = tempfile::tempdir().unwrap();
        let adv = tmp.path().join("adv");
        touch(&adv.join("d/x.webp"));
        touch(&adv.join("d/x.bmp"));
        touch(&adv.join("d/xy.bmp"));

        let repo = FsPairRepo::new(tmp.path().join("orig"), &adv, ImageExtensions::default());
        let (path, rule) = repo.find_counterpart(Path::new("d/x.png")).unwrap().unwrap();
        assert_eq!(path, adv.join("d/x.bmp"));
        assert_eq!(rule, MatchRule::Stem);
    }

    #[test]
    fn missing_sibling_directory_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FsPairRepo::new(
            tmp.path().join("orig"),
            tmp.path().join("adv"),
            ImageExtensions::default(),
        );
        assert!(repo.find_counterpart(Path::new("nested/x.png")).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_originals_are_listed() {
        let tmp = tempfile::tempdir().unwrap();
        let orig = tmp.path().join("orig");
        touch(&orig.join("plain.png"));
        touch(&tmp.path().join("store/real.png"));
        std::os::unix::fs::symlink(tmp.path().join("store/real.png"), orig.join("linked.png"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("store"), orig.join("view")).unwrap();

        let repo = FsPairRepo::new(&orig, tmp.path().join("adv"), ImageExtensions::default());
        let listed = repo.list_originals().unwrap();
        assert_eq!(
            listed,
            vec![
                PathBuf::from("linked.png"),
                PathBuf::from("plain.png"),
                PathBuf::from("view/real.png"),
            ]
        );
    }

    #[test]
    fn unreadable_sibling_directory_is_a_gap() {
        let tmp = tempfile::tempdir().unwrap();
        let adv = tmp.path().join("adv");
        // a file where the sibling directory should be: read_dir fails
        touch(&adv.join("d"));

        let repo = FsPairRepo::new(tmp.path().join("orig"), &adv, ImageExtensions::default());
        assert!(repo.find_counterpart(Path::new("d/x.png")).unwrap().is_none());
    }

    #[test]
    fn load_rgb_reports_the_offending_path() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("bad.png");
        fs::write(&bad, b"not a png").unwrap();
        match load_rgb(&bad) {
            Err(EvalError::Decode { path, .. }) => assert_eq!(path, bad),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

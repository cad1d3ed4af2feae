//! Pair resolution: match every original with its adversarial counterpart.

use std::path::Path;

use crate::common::error::{EvalError, EvalResult};

use super::domain::{ImagePair, MatchRule, PairRepo, Resolution};

/// Resolve pairs in discovery order. Originals without a counterpart are
/// warned about and recorded as gaps; an empty original set is fatal.
pub fn resolve_pairs(repo: &dyn PairRepo) -> EvalResult<Resolution> {
    let originals = repo.list_originals()?;
    if originals.is_empty() {
        return Err(EvalError::NoImages(repo.original_path(Path::new(""))));
    }
    tracing::info!(count = originals.len(), "original images detected");

    let mut out = Resolution::default();
    for rel in originals {
        match repo.find_counterpart(&rel)? {
            Some((adversarial_path, rule)) => {
                if rule == MatchRule::Stem {
                    tracing::debug!(
                        rel_path = %rel.display(),
                        adv = %adversarial_path.display(),
                        "matched counterpart by stem"
                    );
                }
                let original_path = repo.original_path(&rel);
                out.pairs
                    .push(ImagePair::new(rel, original_path, adversarial_path));
            }
            None => {
                tracing::warn!(rel_path = %rel.display(), "missing adversarial counterpart");
                out.gaps.push(rel);
            }
        }
    }
    Ok(out)
}

//! Evaluation runs: resolve pairs, score them, classify adversarial images,
//! aggregate, report.
//!
//! Processing is sequential. For each pair every classifier runs before the
//! next pair is loaded.

use std::time::Instant;

use crate::common::config::EvalConfig;
use crate::common::error::EvalResult;
use crate::data::domain::ImagePair;
use crate::data::repo_fs::{load_rgb, FsPairRepo};
use crate::data::service::resolve_pairs;
use crate::inference::domain::{ClassifierHandle, ModelLoader};
use crate::inference::registry::ClassifierRegistry;
use crate::inference::service::attack_succeeded;
use crate::similarity::domain::SimilarityScorer;
use crate::similarity::service::Ssim;

use super::domain::{AggregateMode, Aggregator};
use super::repo_fs::save_report;
use super::report::Report;

/// Evaluate already resolved pairs against ready classifiers.
///
/// Pairs whose images cannot be decoded are skipped and counted in
/// `Report::pairs_skipped`. Similarity failures credit the sentinel and the
/// pair is still classified. Classifier failures abort the run.
pub fn evaluate_pairs(
    pairs: &[ImagePair],
    handles: &[ClassifierHandle],
    mode: AggregateMode,
    scorer: &dyn SimilarityScorer,
) -> EvalResult<Report> {
    let names = handles.iter().map(|h| h.name.clone()).collect();
    let mut agg = Aggregator::new(names, mode);
    let mut skipped = 0usize;
    let mut indicators = Vec::with_capacity(handles.len());

    for (idx, pair) in pairs.iter().enumerate() {
        let rel = pair.relative_path.display();
        let images = load_rgb(&pair.original_path)
            .and_then(|orig| load_rgb(&pair.adversarial_path).map(|adv| (orig, adv)));
        let (original, adversarial) = match images {
            Ok(images) => images,
            Err(err) => {
                tracing::warn!(rel_path = %rel, error = %err, "skipping undecodable pair");
                skipped += 1;
                continue;
            }
        };

        let similarity = scorer.score(&original, &adversarial);
        if let Some(reason) = &similarity.failure {
            tracing::warn!(rel_path = %rel, error = %reason, "similarity failed, crediting 0");
        }

        indicators.clear();
        for handle in handles {
            indicators.push(attack_succeeded(handle, &adversarial, &pair.relative_path)?);
        }
        let contribution = agg.record(similarity.value, &indicators)?;
        tracing::info!(
            image = idx + 1,
            of = pairs.len(),
            rel_path = %rel,
            ssim = similarity.value,
            contribution,
            "image evaluated"
        );
    }

    Ok(Report::new(&agg.finalize(), skipped))
}

/// Run a full evaluation from configuration. The model loader is the only
/// external collaborator; everything else is resolved here, once.
pub fn run(cfg: &EvalConfig, loader: &dyn ModelLoader) -> EvalResult<Report> {
    let started = Instant::now();
    cfg.validate()?;

    let device = cfg.device.resolve(loader.accelerator_available());
    tracing::info!(%device, "compute device selected");

    let registry = ClassifierRegistry::new(&cfg.models_dir, cfg.dct_log_scale, device);
    let handles = registry.build(&cfg.classifiers, loader)?;

    let repo = FsPairRepo::new(&cfg.original_root, &cfg.adv_root, cfg.extensions());
    let resolution = resolve_pairs(&repo)?;
    if !resolution.gaps.is_empty() {
        tracing::warn!(
            missing = resolution.gaps.len(),
            resolved = resolution.pairs.len(),
            "some originals have no adversarial counterpart"
        );
    }

    let mut report = evaluate_pairs(&resolution.pairs, &handles, cfg.aggregate_mode(), &Ssim)?;
    report.pairs_skipped += resolution.gaps.len();

    if let Some(path) = &cfg.save_json {
        save_report(&report, path)?;
    }
    tracing::info!(
        images = report.images_evaluated,
        final_score = report.final_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "evaluation finished"
    );
    Ok(report)
}

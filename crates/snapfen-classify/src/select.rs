use std::path::Path;
use std::sync::Arc;

use crate::heuristic::HeuristicClassifier;
use crate::params::{HeuristicParams, ModelParams};
use crate::SquareClassifier;

/// Where the model is looked for when none is configured.
pub const DEFAULT_MODEL_PATH: &str = "model/chesscog.onnx";

/// Choose the classifier backend once, at startup.
///
/// A model at `model_path` is used when it exists and loads; anything else
/// (no path, missing file, load failure, or a build without the `onnx`
/// feature) selects the heuristic. Never fails.
pub fn load_classifier(
    model_path: Option<&Path>,
    heuristic: HeuristicParams,
    model: ModelParams,
) -> Arc<dyn SquareClassifier> {
    match model_path {
        Some(path) if path.is_file() => {
            if let Some(clf) = load_model(path, model) {
                return clf;
            }
        }
        Some(path) => log::info!("no model at {}, using heuristic classifier", path.display()),
        None => log::info!("no model configured, using heuristic classifier"),
    }
    Arc::new(HeuristicClassifier::new(heuristic))
}

#[cfg(feature = "onnx")]
fn load_model(path: &Path, params: ModelParams) -> Option<Arc<dyn SquareClassifier>> {
    use crate::model::ModelClassifier;
    use crate::onnx::OnnxBackend;

    match OnnxBackend::load(path, &params) {
        Ok(backend) => {
            log::info!("loaded onnx model from {}", path.display());
            Some(Arc::new(ModelClassifier::new(backend, params)))
        }
        Err(e) => {
            log::warn!("failed to load model {}: {e}; using heuristic classifier", path.display());
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_model(path: &Path, _params: ModelParams) -> Option<Arc<dyn SquareClassifier>> {
    log::info!(
        "model {} ignored: built without the `onnx` feature, using heuristic classifier",
        path.display()
    );
    None
}

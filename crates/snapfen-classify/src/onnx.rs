//! ONNX Runtime scoring backend.

use std::path::Path;
use std::sync::Mutex;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

use crate::model::ScoreBackend;
use crate::params::ModelParams;
use crate::ClassifyError;

fn backend_err(e: impl std::fmt::Display) -> ClassifyError {
    ClassifyError::Backend(e.to_string())
}

/// An ONNX session scoring one square per run.
///
/// `Session::run` needs exclusive access, so concurrent detections take
/// turns on the session.
pub struct OnnxBackend {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxBackend {
    pub fn load(path: &Path, params: &ModelParams) -> Result<Self, ClassifyError> {
        let builder = Session::builder().map_err(backend_err)?;
        let builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(backend_err)?;
        let session = builder.commit_from_file(path).map_err(backend_err)?;

        let input_name = match &params.input_name {
            Some(name) => name.clone(),
            None => session
                .inputs
                .first()
                .map(|i| i.name.clone())
                .ok_or_else(|| ClassifyError::Backend("model declares no inputs".into()))?,
        };
        log::debug!("onnx model {} uses input `{input_name}`", path.display());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl ScoreBackend for OnnxBackend {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn scores(&self, input: &[f32], size: usize) -> Result<Vec<f32>, ClassifyError> {
        let shape = vec![1usize, 3, size, size];
        let value = Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))
            .map_err(backend_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::Backend("onnx session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => value])
            .map_err(backend_err)?;
        let (_, data) = outputs[0].try_extract_tensor::<f32>().map_err(backend_err)?;
        Ok(data.to_vec())
    }
}

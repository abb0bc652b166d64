use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array2, Array4};
use tract_onnx::prelude::*;
use tracing::info;

use crate::category::Category;
use crate::config::ModelsConfig;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load model {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("inference failed: {0}")]
    Inference(#[source] anyhow::Error),

    #[error("expected input of shape {expected:?}, got {actual:?}")]
    InputShape {
        expected: (usize, usize, usize, usize),
        actual: (usize, usize, usize, usize),
    },

    #[error("unexpected model output: {0}")]
    Output(String),
}

/// A pre-trained image classifier. One forward pass per call, output row
/// returned unchanged as `(1, classes)`.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Array2<f32>, ModelError>;
}

/// ONNX export of a Keras classifier, run with tract. Input is NHWC.
pub struct OnnxClassifier {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    resolution: usize,
}

impl OnnxClassifier {
    pub fn load(path: &Path, resolution: u32) -> Result<Self, ModelError> {
        let resolution = resolution as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(1, resolution, resolution, 3)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|source| ModelError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { plan, resolution })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        let side = self.resolution;
        let expected = (1, side, side, 3);
        if input.dim() != expected {
            return Err(ModelError::InputShape {
                expected,
                actual: input.dim(),
            });
        }

        let tensor = tract_ndarray::Array4::from_shape_vec(
            expected,
            input.iter().copied().collect(),
        )
        .map_err(|e| ModelError::Inference(e.into()))?
        .into_tensor();

        let result = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(ModelError::Inference)?;

        let output = result
            .first()
            .ok_or_else(|| ModelError::Output("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(ModelError::Inference)?;

        let scores: Vec<f32> = output.iter().copied().collect();
        let classes = scores.len();
        Array2::from_shape_vec((1, classes), scores).map_err(|e| ModelError::Output(e.to_string()))
    }
}

/// The three model handles, loaded once per process and shared read-only.
pub struct ModelRegistry {
    malaria: Arc<dyn Classifier>,
    pneumonia: Arc<dyn Classifier>,
    brain_tumor: Arc<dyn Classifier>,
}

impl ModelRegistry {
    pub fn new(
        malaria: Arc<dyn Classifier>,
        pneumonia: Arc<dyn Classifier>,
        brain_tumor: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            malaria,
            pneumonia,
            brain_tumor,
        }
    }

    /// Loads every model named in the config. The first failure aborts.
    pub fn load(config: &ModelsConfig) -> Result<Self, ModelError> {
        let load = |category: Category, path: &Path| -> Result<Arc<dyn Classifier>, ModelError> {
            let model = OnnxClassifier::load(path, category.resolution())?;
            info!(
                "Loaded {} model from {} ({}x{})",
                category,
                path.display(),
                category.resolution(),
                category.resolution()
            );
            Ok(Arc::new(model))
        };

        Ok(Self {
            malaria: load(Category::Malaria, &config.malaria)?,
            pneumonia: load(Category::Pneumonia, &config.pneumonia)?,
            brain_tumor: load(Category::BrainTumor, &config.brain_tumor)?,
        })
    }

    pub fn get(&self, category: Category) -> &dyn Classifier {
        match category {
            Category::Malaria => self.malaria.as_ref(),
            Category::Pneumonia => self.pneumonia.as_ref(),
            Category::BrainTumor => self.brain_tumor.as_ref(),
        }
    }

    pub fn predict(&self, category: Category, input: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        let side = category.resolution() as usize;
        let expected = (1, side, side, 3);
        if input.dim() != expected {
            return Err(ModelError::InputShape {
                expected,
                actual: input.dim(),
            });
        }

        self.get(category).classify(input)
    }
}

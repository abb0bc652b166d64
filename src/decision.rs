//! Fixed per-category rules turning a raw output row into a label.

use ndarray::Array2;
use serde::Serialize;

use crate::category::Category;
use crate::classifier::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Infected,
    Uninfected,
    PneumoniaDetected,
    PneumoniaNotDetected,
    TumorDetected,
    TumorNotDetected,
}

/// Banner colour in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Error,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Infected => "infected",
            Label::Uninfected => "uninfected",
            Label::PneumoniaDetected => "pneumonia detected",
            Label::PneumoniaNotDetected | Label::TumorNotDetected => "not detected",
            Label::TumorDetected => "detected",
        }
    }

    pub fn banner(self) -> &'static str {
        match self {
            Label::Infected => "INFECTED CELL",
            Label::Uninfected => "UNINFECTED CELL",
            Label::PneumoniaDetected => "PNEUMONIA DETECTED",
            Label::PneumoniaNotDetected => "PNEUMONIA NOT DETECTED",
            Label::TumorDetected => "BRAIN TUMOR DETECTED",
            Label::TumorNotDetected => "BRAIN TUMOR NOT DETECTED",
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(
            self,
            Label::Infected | Label::PneumoniaDetected | Label::TumorDetected
        )
    }

    pub fn tone(self) -> Tone {
        if self.is_positive() {
            Tone::Error
        } else {
            Tone::Success
        }
    }
}

pub fn decide(category: Category, output: &Array2<f32>) -> Result<Label, ModelError> {
    let row = first_row(category, output)?;

    match category {
        // FIXME: threshold direction is unverified against the trained
        // model's label order. output[0][0] at or below 0.5 is taken as
        // infected, exactly as the deployed model was wired.
        Category::Malaria => {
            let score = expect_columns(category, &row, 1)?[0];
            if score <= 0.5 {
                Ok(Label::Infected)
            } else {
                Ok(Label::Uninfected)
            }
        }
        Category::Pneumonia => {
            let row = expect_columns(category, &row, 2)?;
            let (normal, pneumonia) = (row[0], row[1]);
            if pneumonia > normal {
                Ok(Label::PneumoniaDetected)
            } else {
                Ok(Label::PneumoniaNotDetected)
            }
        }
        // FIXME: index 0 is assumed to be the no-tumor class whatever the
        // class count; unverified against the trained model.
        Category::BrainTumor => {
            let row = expect_columns(category, &row, 1)?;
            if argmax(row) == 0 {
                Ok(Label::TumorNotDetected)
            } else {
                Ok(Label::TumorDetected)
            }
        }
    }
}

fn first_row(category: Category, output: &Array2<f32>) -> Result<Vec<f32>, ModelError> {
    if output.nrows() == 0 {
        return Err(ModelError::Output(format!("{category} model returned no rows")));
    }
    Ok(output.row(0).to_vec())
}

fn expect_columns<'a>(
    category: Category,
    row: &'a [f32],
    min: usize,
) -> Result<&'a [f32], ModelError> {
    if row.len() < min {
        return Err(ModelError::Output(format!(
            "{category} model returned {} values, expected at least {min}",
            row.len()
        )));
    }
    Ok(row)
}

/// Index of the first maximum, like NumPy's argmax.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn malaria_threshold_is_inclusive() {
        assert_eq!(decide(Category::Malaria, &array![[0.4]]).unwrap(), Label::Infected);
        assert_eq!(decide(Category::Malaria, &array![[0.6]]).unwrap(), Label::Uninfected);
        assert_eq!(decide(Category::Malaria, &array![[0.5]]).unwrap(), Label::Infected);
    }

    #[test]
    fn pneumonia_compares_class_probabilities() {
        assert_eq!(
            decide(Category::Pneumonia, &array![[0.3, 0.7]]).unwrap(),
            Label::PneumoniaDetected
        );
        assert_eq!(
            decide(Category::Pneumonia, &array![[0.7, 0.3]]).unwrap(),
            Label::PneumoniaNotDetected
        );
        // normal class wins ties
        assert_eq!(
            decide(Category::Pneumonia, &array![[0.5, 0.5]]).unwrap(),
            Label::PneumoniaNotDetected
        );
    }

    #[test]
    fn brain_tumor_uses_argmax() {
        assert_eq!(
            decide(Category::BrainTumor, &array![[0.9, 0.05, 0.05]]).unwrap(),
            Label::TumorNotDetected
        );
        assert_eq!(
            decide(Category::BrainTumor, &array![[0.1, 0.8, 0.1]]).unwrap(),
            Label::TumorDetected
        );
        assert_eq!(
            decide(Category::BrainTumor, &array![[0.1, 0.1, 0.1, 0.7]]).unwrap(),
            Label::TumorDetected
        );
        assert_eq!(
            decide(Category::BrainTumor, &array![[0.4, 0.4, 0.2]]).unwrap(),
            Label::TumorNotDetected
        );
    }

    #[test]
    fn short_outputs_are_rejected() {
        assert!(matches!(
            decide(Category::Pneumonia, &array![[0.9]]),
            Err(ModelError::Output(_))
        ));
        let empty = Array2::<f32>::zeros((1, 0));
        assert!(decide(Category::Malaria, &empty).is_err());
        assert!(decide(Category::BrainTumor, &empty).is_err());
        let no_rows = Array2::<f32>::zeros((0, 2));
        assert!(decide(Category::Pneumonia, &no_rows).is_err());
    }

    #[test]
    fn labels_and_banners() {
        assert_eq!(Label::Infected.as_str(), "infected");
        assert_eq!(Label::PneumoniaDetected.as_str(), "pneumonia detected");
        assert_eq!(Label::TumorNotDetected.as_str(), "not detected");
        assert_eq!(Label::TumorDetected.banner(), "BRAIN TUMOR DETECTED");
        assert_eq!(Label::Uninfected.tone(), Tone::Success);
        assert_eq!(Label::Infected.tone(), Tone::Error);
    }
}

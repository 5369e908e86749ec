use ndarray::Array2;

/// Clé du jeu de données unique stocké dans chaque artefact.
pub const FEATURE_KEY: &str = "feature";

/// Matrice de features d'un fichier : une ligne par frame conservée.
///
/// Columns are mel ++ mfcc ++ delta ++ accel, always in that order.
///
/// # Example
/// ```
/// use ms_core::matrix::FeatureMatrix;
/// use ndarray::Array2;
/// let m = FeatureMatrix::new(Array2::zeros((0, 11)));
/// assert_eq!(m.shape(), (0, 11));
/// assert!(m.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f32>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// `(frames, coefficients)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of retained frames.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    #[must_use]
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    #[must_use]
    pub fn into_inner(self) -> Array2<f32> {
        self.data
    }
}

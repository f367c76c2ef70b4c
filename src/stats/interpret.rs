use crate::structs::{Association, Strength};

impl Strength {
    /// Bucket a coefficient by its absolute value.
    ///
    /// Bounds are exclusive: |r| = 0.1 is already Weak. NaN is Negligible.
    #[must_use]
    pub fn from_coefficient(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude.is_nan() || magnitude < 0.1 {
            Self::Negligible
        } else if magnitude < 0.3 {
            Self::Weak
        } else if magnitude < 0.5 {
            Self::Moderate
        } else if magnitude < 0.7 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }
}

impl Association {
    #[must_use]
    pub fn strength(&self) -> Strength {
        Strength::from_coefficient(self.coefficient)
    }
}

/// "Significant" / "Not significant" wording used in reports
#[must_use]
pub const fn significance_label(significant: bool) -> &'static str {
    if significant {
        "Significant"
    } else {
        "Not significant"
    }
}

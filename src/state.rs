use std::hash::{Hash, Hasher};

/// A fixed-length vector of numeric features observed from an environment
///
/// States are used as exact table keys. Two states are equal only if every component
/// is bit-identical, so `0.0` and `-0.0` are different states while two NaNs with the
/// same payload are the same state. No rounding or binning is applied.
#[derive(Debug, Clone, Copy)]
pub struct State<const N: usize>([f32; N]);

impl<const N: usize> State<N> {
    pub const fn new(features: [f32; N]) -> Self {
        Self(features)
    }

    /// Feature values in order
    pub fn features(&self) -> &[f32; N] {
        &self.0
    }

    /// Raw bit patterns of each feature, the exact identity of the state
    pub fn to_bits(&self) -> [u32; N] {
        self.0.map(f32::to_bits)
    }

    pub fn from_bits(bits: [u32; N]) -> Self {
        Self(bits.map(f32::from_bits))
    }
}

impl<const N: usize> From<[f32; N]> for State<N> {
    fn from(features: [f32; N]) -> Self {
        Self(features)
    }
}

impl<const N: usize> PartialEq for State<N> {
    fn eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl<const N: usize> Eq for State<N> {}

impl<const N: usize> Hash for State<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

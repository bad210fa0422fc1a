use itertools::Itertools;

use crate::{error::WeightError, math::Count};

/// The weight of a transition in a [`crate::Wfsm`], which is a non-zero polynomial in a single
/// formal variable `x` with non-negative integer coefficients and a zero constant term.
///
/// The polynomial is stored as its vector of coefficients, where the entry at position `i` is the
/// coefficient of `x^i`. Leading zeros are stripped, so two weights are equal if and only if they
/// represent the same polynomial. The exponents of a weight state by how many units the size of a
/// word grows when the transition is taken, its coefficients are multiplicities.
///
/// # Example
/// ```
/// use finite_state_machines::Weight;
/// let weight = Weight::from_terms([(1, 3), (2, 1)]).unwrap();
/// assert_eq!(weight.to_string(), "x^3 + 2x");
/// assert_eq!(weight.degree(), 3);
/// assert_eq!(weight.coefficient(1), 2);
/// assert!(Weight::new([1, 1]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Weight(Vec<u64>);

impl Weight {
    /// Creates a weight from its coefficients, the `i`-th of which belongs to `x^i`. Fails if
    /// the constant coefficient is not zero or if all coefficients are zero.
    pub fn new<I: IntoIterator<Item = u64>>(coefficients: I) -> Result<Self, WeightError> {
        let mut coefficients: Vec<u64> = coefficients.into_iter().collect();
        while coefficients.last() == Some(&0) {
            coefficients.pop();
        }
        match coefficients.first() {
            None => Err(WeightError::Zero),
            Some(&constant) if constant != 0 => Err(WeightError::NonZeroConstantTerm(constant)),
            Some(_) => Ok(Self(coefficients)),
        }
    }

    /// Creates a weight from pairs of coefficient and exponent. Terms with the same exponent
    /// are added up, fails if such a sum does not fit into a `u64`.
    pub fn from_terms<I: IntoIterator<Item = (u64, usize)>>(terms: I) -> Result<Self, WeightError> {
        let mut coefficients = vec![];
        for (coefficient, exponent) in terms {
            if coefficients.len() <= exponent {
                coefficients.resize(exponent + 1, 0);
            }
            coefficients[exponent] = coefficient
                .checked_add(coefficients[exponent])
                .ok_or(WeightError::CoefficientOverflow(exponent))?;
        }
        Self::new(coefficients)
    }

    /// The weight `x`, which makes a transition consume exactly one unit of size.
    pub fn x() -> Self {
        Self(vec![0, 1])
    }

    /// The weight `x^exponent`, fails for an `exponent` of zero.
    pub fn monomial(exponent: usize) -> Result<Self, WeightError> {
        Self::from_terms([(1, exponent)])
    }

    /// Returns the largest exponent with a non-zero coefficient.
    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns the coefficient of `x^exponent`.
    #[inline(always)]
    pub fn coefficient(&self, exponent: usize) -> u64 {
        self.0.get(exponent).copied().unwrap_or(0)
    }

    /// Iterates over the pairs of exponent and coefficient with a non-zero coefficient, in
    /// ascending order of the exponent.
    pub fn terms(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(e, c)| (e, *c))
    }

    /// Returns true if every coefficient is either `0` or `1`.
    pub fn has_unit_coefficients(&self) -> bool {
        self.0.iter().all(|c| *c <= 1)
    }

    /// Multiplies the polynomial given by its `coefficients` with `self`.
    pub(crate) fn multiply(&self, coefficients: &[Count]) -> Vec<Count> {
        if coefficients.is_empty() {
            return vec![];
        }
        let mut product: Vec<Count> = vec![0; coefficients.len() + self.degree()];
        for (i, &left) in coefficients.iter().enumerate() {
            for (j, right) in self.terms() {
                product[i + j] = product[i + j].saturating_add(left.saturating_mul(right as Count));
            }
        }
        product
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self
            .terms()
            .collect_vec()
            .into_iter()
            .rev()
            .map(|(exponent, coefficient)| {
                let coefficient = if coefficient == 1 {
                    String::new()
                } else {
                    coefficient.to_string()
                };
                match exponent {
                    1 => format!("{coefficient}x"),
                    _ => format!("{coefficient}x^{exponent}"),
                }
            })
            .join(" + ");
        write!(f, "{shown}")
    }
}

impl std::fmt::Debug for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_validated() {
        assert_eq!(Weight::new([]), Err(WeightError::Zero));
        assert_eq!(Weight::new([0, 0, 0]), Err(WeightError::Zero));
        assert_eq!(Weight::new([3, 1]), Err(WeightError::NonZeroConstantTerm(3)));
        assert_eq!(Weight::monomial(0), Err(WeightError::NonZeroConstantTerm(1)));
        assert_eq!(Weight::new([0, 1, 0, 0]).unwrap(), Weight::x());
        assert_eq!(Weight::monomial(1).unwrap(), Weight::x());
    }

    #[test]
    fn degree_and_coefficients() {
        let weight = Weight::from_terms([(1, 2), (1, 4), (2, 2)]).unwrap();
        assert_eq!(weight.degree(), 4);
        assert_eq!(weight.coefficient(2), 3);
        assert_eq!(weight.coefficient(3), 0);
        assert_eq!(weight.coefficient(17), 0);
        assert_eq!(weight.terms().collect::<Vec<_>>(), vec![(2, 3), (4, 1)]);
        assert!(!weight.has_unit_coefficients());
        assert!(Weight::monomial(5).unwrap().has_unit_coefficients());
        assert_eq!(weight.to_string(), "x^4 + 3x^2");
    }

    #[test]
    fn overflowing_coefficients_are_rejected() {
        assert_eq!(
            Weight::from_terms([(u64::MAX, 3), (1, 3)]),
            Err(WeightError::CoefficientOverflow(3))
        );
        let largest = Weight::from_terms([(u64::MAX - 1, 2), (1, 2)]).unwrap();
        assert_eq!(largest.coefficient(2), u64::MAX);
    }

    #[test]
    fn multiplication() {
        let weight = Weight::new([0, 1, 1]).unwrap();
        // (x + x^2) * (x + x^2) = x^2 + 2x^3 + x^4
        let square = weight.multiply(&weight.multiply(&[1]));
        assert_eq!(square, vec![0, 0, 1, 2, 1]);
    }
}

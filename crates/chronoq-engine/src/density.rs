//! Partial traces, purity, and Hermitian eigendecomposition over the small
//! (2x2/4x4) reduced density matrices the assertion checker and sub-state
//! extraction need (spec §4.F/§4.G).
//!
//! `nalgebra`'s `SymmetricEigen` only solves real symmetric systems, so a
//! Hermitian `H = A + iB` is embedded as the real symmetric
//! `M = [[A, -B], [B, A]]`: each eigenvalue of `H` appears twice among `M`'s
//! eigenvalues, and an eigenvector `(x; y)` of `M` recovers a complex
//! eigenvector `x + iy` of `H`.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use num_complex::Complex64;

/// Trace out every qubit not in `keep`, returning the reduced density matrix
/// over `keep` (in the caller's order — the i-th entry of `keep` becomes bit
/// `i` of the reduced basis).
pub fn reduced_density_matrix(psi: &[Complex64], num_qubits: usize, keep: &[usize]) -> DMatrix<Complex64> {
    let remaining: Vec<usize> = (0..num_qubits).filter(|q| !keep.contains(q)).collect();
    let dim = 1usize << keep.len();
    let rdim = 1usize << remaining.len();

    let mut rho = DMatrix::<Complex64>::zeros(dim, dim);
    for a in 0..dim {
        for b in 0..dim {
            let mut sum = Complex64::new(0.0, 0.0);
            for r in 0..rdim {
                let idx_a = compose_index(keep, a, &remaining, r);
                let idx_b = compose_index(keep, b, &remaining, r);
                sum += psi[idx_a] * psi[idx_b].conj();
            }
            rho[(a, b)] = sum;
        }
    }
    rho
}

fn compose_index(keep: &[usize], keep_bits: usize, remaining: &[usize], rem_bits: usize) -> usize {
    let mut idx = 0usize;
    for (i, &q) in keep.iter().enumerate() {
        if (keep_bits >> i) & 1 == 1 {
            idx |= 1 << q;
        }
    }
    for (i, &q) in remaining.iter().enumerate() {
        if (rem_bits >> i) & 1 == 1 {
            idx |= 1 << q;
        }
    }
    idx
}

/// `Tr(ρ²)`, computed directly from entries rather than via eigenvalues
/// (cheaper, and exact for the Hermitian matrices this module produces).
pub fn purity(rho: &DMatrix<Complex64>) -> f64 {
    let mut acc = 0.0;
    for i in 0..rho.nrows() {
        for j in 0..rho.ncols() {
            acc += rho[(i, j)].norm_sqr();
        }
    }
    acc
}

fn complex_to_real_embedding(h: &DMatrix<Complex64>) -> DMatrix<f64> {
    let n = h.nrows();
    let mut m = DMatrix::<f64>::zeros(2 * n, 2 * n);
    for i in 0..n {
        for j in 0..n {
            let entry = h[(i, j)];
            m[(i, j)] = entry.re;
            m[(i, n + j)] = -entry.im;
            m[(n + i, j)] = entry.im;
            m[(n + i, n + j)] = entry.re;
        }
    }
    m
}

/// Eigenvalues (each reported once, not doubled) and their normalized
/// complex eigenvectors, descending by eigenvalue.
pub fn hermitian_eigen(h: &DMatrix<Complex64>) -> (Vec<f64>, Vec<DVector<Complex64>>) {
    let n = h.nrows();
    let embedded = complex_to_real_embedding(h);
    let eig = SymmetricEigen::new(embedded);

    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].partial_cmp(&eig.eigenvalues[a]).unwrap());

    let mut values = Vec::with_capacity(n);
    let mut vectors = Vec::with_capacity(n);
    let mut used = vec![false; order.len()];

    for &idx in &order {
        if used[idx] {
            continue;
        }
        used[idx] = true;
        let value = eig.eigenvalues[idx];

        // The doubled-eigenvalue partner, if still unused, is redundant —
        // either eigenvector recovers the same complex eigenvector.
        if let Some(&partner) = order
            .iter()
            .find(|&&j| !used[j] && (eig.eigenvalues[j] - value).abs() < 1e-6)
        {
            used[partner] = true;
        }

        let column = eig.eigenvectors.column(idx);
        let mut complex_vec = DVector::<Complex64>::zeros(n);
        let mut norm_sq = 0.0;
        for k in 0..n {
            let re = column[k];
            let im = column[n + k];
            complex_vec[k] = Complex64::new(re, im);
            norm_sq += re * re + im * im;
        }
        let norm = norm_sq.sqrt();
        if norm > 1e-12 {
            for k in 0..n {
                complex_vec[k] /= norm;
            }
        }

        values.push(value);
        vectors.push(complex_vec);
    }

    (values, vectors)
}

/// `-Σ λ log2 λ` over eigenvalues already clamped non-negative.
pub fn von_neumann_entropy(eigenvalues: &[f64]) -> f64 {
    eigenvalues
        .iter()
        .filter(|&&lambda| lambda > 1e-12)
        .map(|&lambda| -lambda * lambda.log2())
        .sum()
}

/// Clamp small negative eigenvalues (numerical noise) to zero; anything more
/// negative than `-1e-5` indicates a genuinely invalid density matrix.
pub fn clamp_eigenvalues(eigenvalues: &mut [f64]) -> bool {
    for lambda in eigenvalues.iter_mut() {
        if *lambda < 0.0 {
            if *lambda < -1e-5 {
                return false;
            }
            *lambda = 0.0;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_state_has_unit_purity() {
        // |0>|0> reduced to qubit 0 is pure.
        let psi = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        ];
        let rho = reduced_density_matrix(&psi, 2, &[0]);
        assert!((purity(&rho) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bell_state_reduced_qubit_is_maximally_mixed() {
        let s = 1.0 / 2.0_f64.sqrt();
        let psi = vec![
            Complex64::new(s, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(s, 0.0),
        ];
        let rho = reduced_density_matrix(&psi, 2, &[0]);
        assert!((purity(&rho) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn eigenvalues_of_pure_state_are_one_and_zero() {
        let psi = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let rho = reduced_density_matrix(&psi, 1, &[0]);
        let (mut values, _) = hermitian_eigen(&rho);
        assert!(clamp_eigenvalues(&mut values));
        values.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!(values[1].abs() < 1e-6);
    }
}

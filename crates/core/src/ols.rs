//! Ordinary least squares on a small dense design matrix.
//!
//! Designs here have at most a handful of columns, so the normal equations
//! are solved directly by Gauss-Jordan elimination with partial pivoting.
//! The inverse of X'X is kept because the standard errors need its diagonal.

/// Coefficients and the pieces needed for inference.
#[derive(Debug, Clone)]
pub(crate) struct OlsSolution {
    pub beta: Vec<f64>,
    pub xtx_inv: Vec<Vec<f64>>,
    pub residuals: Vec<f64>,
}

impl OlsSolution {
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }

    /// Re-expresses a `[1, x - shift]` fit in terms of `[1, x]`.
    ///
    /// Only the intercept and its row of the inverse change; residuals and
    /// the slope are invariant under the shift.
    pub fn shift_origin(&mut self, shift: f64) {
        let (c01, c11) = (self.xtx_inv[0][1], self.xtx_inv[1][1]);
        self.beta[0] -= shift * self.beta[1];
        self.xtx_inv[0][0] += shift * shift * c11 - 2.0 * shift * c01;
        self.xtx_inv[0][1] = c01 - shift * c11;
        self.xtx_inv[1][0] = self.xtx_inv[0][1];
    }
}

/// Solves `y = X beta` in the least-squares sense.
///
/// `rows` holds one design row per observation. Returns `None` when X'X is
/// numerically singular.
pub(crate) fn solve(rows: &[Vec<f64>], y: &[f64]) -> Option<OlsSolution> {
    let p = rows.first()?.len();
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for (row, &yi) in rows.iter().zip(y) {
        for i in 0..p {
            xty[i] += row[i] * yi;
            for j in 0..p {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let xtx_inv = invert(xtx)?;
    let beta: Vec<f64> = (0..p)
        .map(|i| (0..p).map(|j| xtx_inv[i][j] * xty[j]).sum())
        .collect();
    let residuals = rows
        .iter()
        .zip(y)
        .map(|(row, &yi)| yi - row.iter().zip(&beta).map(|(x, b)| x * b).sum::<f64>())
        .collect();

    Some(OlsSolution { beta, xtx_inv, residuals })
}

/// Inverts a square matrix; `None` if a pivot vanishes.
fn invert(mut a: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return None;
    }
    let tolerance = scale * 1e-12;

    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let d = a[col][col];
        for j in 0..n {
            a[col][j] /= d;
            inv[col][j] /= d;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Some(inv)
}

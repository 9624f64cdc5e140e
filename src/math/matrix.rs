use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform on (0, 1] so ln() never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Weight matrices are stored as (fan_in, fan_out), so `rows` is the
    /// fan-in. Use before ReLU-family layers.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Use before Sigmoid/Tanh/Identity/Softmax layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows.max(1) as f64).sqrt(), rng)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!((self.rows, self.cols), (rhs.rows, rhs.cols), "Matrices are of incorrect sizes");
        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect())
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, Vec::len),
            data
        }
    }

    /// Wraps a single sample as a 1×n row vector.
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix::from_data(vec![values])
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;
        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x += y;
            }
        }

        res
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;
        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x -= y;
            }
        }

        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mul_shapes_and_values() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        let c = a * b;
        assert_eq!((c.rows, c.cols), (2, 1));
        assert_eq!(c.data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        let a = Matrix::he(4, 3, &mut ChaCha8Rng::seed_from_u64(7));
        let b = Matrix::he(4, 3, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.is_finite());
    }
}

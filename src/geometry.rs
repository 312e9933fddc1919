//! Integer vectors and signed permutation matrices
//!
//! VOX rotations are exact: a transform's rotation is one of the 3x3
//! matrices with a single +-1 per row and column, packed into one byte.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::Serialize;

/// Three-component integer vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Vector3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn volume(self) -> i64 {
        (i64::from(self.x) * i64::from(self.y) * i64::from(self.z)).abs()
    }

    /// Componentwise integer halving, matching the grid-centre pivot
    pub(crate) fn half(self) -> Self {
        Self::new(self.x / 2, self.y / 2, self.z / 2)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Row-major 3x3 integer matrix
///
/// Every matrix produced by this crate is a signed permutation matrix:
/// rotation composition therefore stays exact in integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Matrix3(pub [[i32; 3]; 3]);

/// Maps the bitmask of used row-0/row-1 axes to the remaining axis
const ROW2_AXIS: [Option<usize>; 8] = [
    None,
    None,
    None,
    Some(2),
    None,
    Some(1),
    Some(0),
    None,
];

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Decode the packed rotation byte
    ///
    /// - Bits 0-1: column of the non-zero entry in row 0
    /// - Bits 2-3: column of the non-zero entry in row 1
    /// - Bits 4, 5, 6: sign of rows 0, 1, 2 (1 = negative)
    ///
    /// Row 2 uses the remaining column. Returns `None` when the two
    /// encoded columns collide or name the out-of-range column 3.
    pub fn from_rotation_byte(byte: u8) -> Option<Matrix3> {
        let row0 = (byte & 0b11) as usize;
        let row1 = ((byte >> 2) & 0b11) as usize;
        if row0 > 2 || row1 > 2 {
            return None;
        }
        let row2 = ROW2_AXIS[(1 << row0) | (1 << row1)]?;

        let sign = |bit: u8| if byte >> bit & 1 == 0 { 1 } else { -1 };

        let mut m = [[0i32; 3]; 3];
        m[0][row0] = sign(4);
        m[1][row1] = sign(5);
        m[2][row2] = sign(6);
        Some(Matrix3(m))
    }

    /// Rotate a voxel grid index around the half-voxel-centred origin
    ///
    /// Equivalent to offsetting each component by 0.5, applying the
    /// matrix and flooring, computed exactly: a positive entry keeps the
    /// source component, a negative one maps `v` to `-v - 1`.
    pub fn rotate_index(&self, v: Vector3) -> Vector3 {
        let comp = [v.x, v.y, v.z];
        let rotate_row = |row: &[i32; 3]| {
            for (col, &m) in row.iter().enumerate() {
                if m > 0 {
                    return comp[col];
                }
                if m < 0 {
                    return -comp[col] - 1;
                }
            }
            0
        };
        Vector3::new(
            rotate_row(&self.0[0]),
            rotate_row(&self.0[1]),
            rotate_row(&self.0[2]),
        )
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        let mut out = [[0i32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        Matrix3(out)
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        let dot = |row: &[i32; 3]| row[0] * v.x + row[1] * v.y + row[2] * v.z;
        Vector3::new(dot(&self.0[0]), dot(&self.0[1]), dot(&self.0[2]))
    }
}

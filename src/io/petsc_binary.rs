//! Reader for PETSc binary viewer files.
//!
//! The format is big-endian throughout. A matrix file carries a class id
//! (1211216), the row and column counts, the total number of nonzeros, one
//! nonzero count per row, all column indices, and finally the values as f64.
//! A vector file carries its class id (1211214), the length, and the values.
//!
//! The reader only assembles the raw arrays; structural validation is done by
//! `CsrMatrix::try_from_csr`, so a file that parses but violates the CSR
//! invariants is still rejected as malformed.

use crate::error::SolverError;
use crate::matrix::CsrMatrix;
use crate::vector::DenseVector;
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Class id tagging a matrix in a PETSc binary file.
pub const MAT_FILE_CLASSID: i32 = 1_211_216;
/// Class id tagging a vector in a PETSc binary file.
pub const VEC_FILE_CLASSID: i32 = 1_211_214;

fn read_i32<R: Read>(
    reader: &mut R,
    what: &str,
    malformed: fn(String) -> SolverError,
) -> Result<i32, SolverError> {
    reader
        .read_i32::<BigEndian>()
        .map_err(|_| malformed(format!("truncated while reading {what}")))
}

fn read_count<R: Read>(
    reader: &mut R,
    what: &str,
    malformed: fn(String) -> SolverError,
) -> Result<usize, SolverError> {
    let raw = read_i32(reader, what, malformed)?;
    usize::try_from(raw).map_err(|_| malformed(format!("negative {what}: {raw}")))
}

/// Read a sparse matrix from a PETSc binary stream.
pub fn read_matrix<R: Read>(reader: &mut R) -> Result<CsrMatrix<f64>, SolverError> {
    let malformed = SolverError::MalformedMatrix;

    let classid = read_i32(reader, "matrix class id", malformed)?;
    if classid != MAT_FILE_CLASSID {
        return Err(malformed(format!(
            "unexpected class id {classid}, expected {MAT_FILE_CLASSID}"
        )));
    }
    let nrows = read_count(reader, "row count", malformed)?;
    let ncols = read_count(reader, "column count", malformed)?;
    let nnz = read_count(reader, "nonzero count", malformed)?;

    let mut row_ptr = Vec::with_capacity(nrows + 1);
    row_ptr.push(0usize);
    for i in 0..nrows {
        let len = read_count(reader, "row length", malformed)?;
        row_ptr.push(row_ptr[i] + len);
    }
    if row_ptr[nrows] != nnz {
        return Err(malformed(format!(
            "row lengths sum to {}, header says {nnz} nonzeros",
            row_ptr[nrows]
        )));
    }

    let mut col_idx = Vec::with_capacity(nnz);
    for _ in 0..nnz {
        col_idx.push(read_count(reader, "column index", malformed)?);
    }

    let mut values = Vec::with_capacity(nnz);
    for _ in 0..nnz {
        let v = reader
            .read_f64::<BigEndian>()
            .map_err(|_| malformed("truncated while reading values".into()))?;
        values.push(v);
    }

    CsrMatrix::try_from_csr(nrows, ncols, row_ptr, col_idx, values)
}

/// Read a dense vector from a PETSc binary stream.
pub fn read_vector<R: Read>(reader: &mut R) -> Result<DenseVector<f64>, SolverError> {
    let malformed = SolverError::MalformedVector;

    let classid = read_i32(reader, "vector class id", malformed)?;
    if classid != VEC_FILE_CLASSID {
        return Err(malformed(format!(
            "unexpected class id {classid}, expected {VEC_FILE_CLASSID}"
        )));
    }
    let n = read_count(reader, "vector length", malformed)?;

    let mut data = Vec::with_capacity(n);
    for _ in 0..n {
        let v = reader
            .read_f64::<BigEndian>()
            .map_err(|_| malformed("truncated while reading values".into()))?;
        data.push(v);
    }
    Ok(DenseVector::from_vec(data))
}

/// Open and read a matrix file.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<CsrMatrix<f64>, SolverError> {
    let file = File::open(path)?;
    read_matrix(&mut BufReader::new(file))
}

/// Open and read a vector file.
pub fn load_vector<P: AsRef<Path>>(path: P) -> Result<DenseVector<f64>, SolverError> {
    let file = File::open(path)?;
    read_vector(&mut BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn matrix_image(
        nrows: i32,
        ncols: i32,
        row_lens: &[i32],
        cols: &[i32],
        vals: &[f64],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_i32::<BigEndian>(MAT_FILE_CLASSID).unwrap();
        buf.write_i32::<BigEndian>(nrows).unwrap();
        buf.write_i32::<BigEndian>(ncols).unwrap();
        buf.write_i32::<BigEndian>(vals.len() as i32).unwrap();
        for &l in row_lens {
            buf.write_i32::<BigEndian>(l).unwrap();
        }
        for &c in cols {
            buf.write_i32::<BigEndian>(c).unwrap();
        }
        for &v in vals {
            buf.write_f64::<BigEndian>(v).unwrap();
        }
        buf
    }

    #[test]
    fn reads_a_small_matrix() {
        // [[2,1,0],[0,3,0],[0,0,4]]
        let image = matrix_image(
            3,
            3,
            &[2, 1, 1],
            &[0, 1, 1, 2],
            &[2.0, 1.0, 3.0, 4.0],
        );
        let m = read_matrix(&mut Cursor::new(image)).unwrap();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.nnz(), 4);
        let mut y = vec![0.0; 3];
        m.spmv(&[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![3.0, 3.0, 4.0]);
    }

    #[test]
    fn rejects_wrong_classid() {
        let mut image = matrix_image(1, 1, &[1], &[0], &[1.0]);
        image[0..4].copy_from_slice(&VEC_FILE_CLASSID.to_be_bytes());
        let err = read_matrix(&mut Cursor::new(image)).unwrap_err();
        assert!(matches!(err, SolverError::MalformedMatrix(_)));
    }

    #[test]
    fn rejects_inconsistent_row_lengths() {
        // header says 3 nonzeros, rows only account for 2
        let mut buf = Vec::new();
        buf.write_i32::<BigEndian>(MAT_FILE_CLASSID).unwrap();
        buf.write_i32::<BigEndian>(2).unwrap();
        buf.write_i32::<BigEndian>(2).unwrap();
        buf.write_i32::<BigEndian>(3).unwrap();
        buf.write_i32::<BigEndian>(1).unwrap();
        buf.write_i32::<BigEndian>(1).unwrap();
        let err = read_matrix(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, SolverError::MalformedMatrix(_)));
    }

    #[test]
    fn rejects_truncated_stream() {
        let image = matrix_image(3, 3, &[2, 1, 1], &[0, 1, 1, 2], &[2.0, 1.0, 3.0, 4.0]);
        let err = read_matrix(&mut Cursor::new(&image[..image.len() - 4])).unwrap_err();
        assert!(matches!(err, SolverError::MalformedMatrix(_)));
    }

    #[test]
    fn reads_a_vector() {
        let mut buf = Vec::new();
        buf.write_i32::<BigEndian>(VEC_FILE_CLASSID).unwrap();
        buf.write_i32::<BigEndian>(3).unwrap();
        for v in [1.0, -2.5, 4.0] {
            buf.write_f64::<BigEndian>(v).unwrap();
        }
        let v = read_vector(&mut Cursor::new(buf)).unwrap();
        assert_eq!(v.as_slice(), &[1.0, -2.5, 4.0]);
    }

    #[test]
    fn rejects_negative_vector_length() {
        let mut buf = Vec::new();
        buf.write_i32::<BigEndian>(VEC_FILE_CLASSID).unwrap();
        buf.write_i32::<BigEndian>(-1).unwrap();
        let err = read_vector(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, SolverError::MalformedVector(_)));
    }
}

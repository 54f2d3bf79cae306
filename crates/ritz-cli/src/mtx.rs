//! Matrix Market reader producing a CSR operator.
//!
//! Supports the `coordinate` format with `real`, `integer` or `pattern`
//! values and `general`, `symmetric` or `skew-symmetric` storage. Indices in
//! the file are 1-based.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use ritz_backend_cpu::CsrOperator;

/// Upper bound on the triplet buffer reserved from the size line.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Real,
    Integer,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
    SkewSymmetric,
}

/// Parse the `%%MatrixMarket matrix coordinate <field> <symmetry>` banner.
fn parse_banner(line: &str) -> Result<(Field, Symmetry)> {
    let parts: Vec<String> = line.split_whitespace().map(|s| s.to_lowercase()).collect();
    if parts.len() != 5 || parts[0] != "%%matrixmarket" || parts[1] != "matrix" {
        bail!("invalid Matrix Market banner: {:?}", line.trim());
    }
    if parts[2] != "coordinate" {
        bail!("unsupported Matrix Market format: {}", parts[2]);
    }

    let field = match parts[3].as_str() {
        "real" | "double" => Field::Real,
        "integer" => Field::Integer,
        "pattern" => Field::Pattern,
        other => bail!("unsupported Matrix Market field: {}", other),
    };
    let symmetry = match parts[4].as_str() {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        "skew-symmetric" => Symmetry::SkewSymmetric,
        other => bail!("unsupported Matrix Market symmetry: {}", other),
    };
    Ok((field, symmetry))
}

/// Read a square Matrix Market matrix into a [`CsrOperator`].
pub fn read_matrix_market(reader: impl Read) -> Result<CsrOperator> {
    let mut lines = BufReader::new(reader).lines();

    let banner = lines.next().context("empty Matrix Market input")??;
    let (field, symmetry) = parse_banner(&banner)?;

    // Skip comments and blank lines up to the size line.
    let size_line = loop {
        let line = lines.next().context("missing size line")??;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('%') {
            break line;
        }
    };

    let sizes: Vec<usize> = size_line
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<Vec<usize>, _>>()
        .with_context(|| format!("invalid size line: {:?}", size_line.trim()))?;
    let [nrows, ncols, nnz] = sizes[..] else {
        bail!("size line must have 3 entries, got {}", sizes.len());
    };
    if nrows != ncols {
        bail!("matrix must be square, got {}x{}", nrows, ncols);
    }
    let max_entries = nrows
        .checked_mul(ncols)
        .context("matrix dimensions overflow")?;
    if nnz > max_entries {
        bail!("entry count {} exceeds {}x{} matrix", nnz, nrows, ncols);
    }

    // The header is untrusted; grow past this as entries actually arrive.
    let mut triplets = Vec::with_capacity(nnz.min(MAX_PREALLOCATED_ENTRIES));

    let mut read = 0;
    for line in lines {
        if read == nnz {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let entry = read + 1;
        if parts.len() < 2 {
            bail!("entry {}: expected row and column", entry);
        }
        let row = parse_index(parts[0], nrows).with_context(|| format!("entry {}", entry))?;
        let col = parse_index(parts[1], ncols).with_context(|| format!("entry {}", entry))?;
        let value = match field {
            Field::Pattern => 1.0,
            Field::Real | Field::Integer => parts
                .get(2)
                .with_context(|| format!("entry {}: missing value", entry))?
                .parse::<f64>()
                .with_context(|| format!("entry {}: invalid value {:?}", entry, parts[2]))?,
        };

        triplets.push((row, col, value));
        if row != col {
            match symmetry {
                Symmetry::General => {}
                Symmetry::Symmetric => triplets.push((col, row, value)),
                Symmetry::SkewSymmetric => triplets.push((col, row, -value)),
            }
        }
        read += 1;
    }

    if read != nnz {
        bail!("expected {} entries, found {}", nnz, read);
    }

    log::debug!(
        "read Matrix Market {:?}/{:?} matrix: {}x{}, {} entries",
        field,
        symmetry,
        nrows,
        ncols,
        nnz
    );

    Ok(CsrOperator::from_triplets(nrows, &triplets)?)
}

/// Read a Matrix Market file from disk.
pub fn read_matrix_market_file(path: &Path) -> Result<CsrOperator> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_matrix_market(file).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_index(token: &str, bound: usize) -> Result<usize> {
    let index: usize = token
        .parse()
        .with_context(|| format!("invalid index {:?}", token))?;
    if index == 0 || index > bound {
        bail!("index {} out of range 1..={}", index, bound);
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ritz_solver::LinearOperator;
    use std::io::{Cursor, Write};

    #[test]
    fn reads_general_real() {
        let input = "%%MatrixMarket matrix coordinate real general\n\
                     % comment\n\
                     2 2 3\n\
                     1 1 4.0\n\
                     1 2 -1.5\n\
                     2 2 2\n";
        let op = read_matrix_market(Cursor::new(input)).unwrap();
        assert_eq!(op.dim(), 2);
        assert_eq!(op.nnz(), 3);
        assert_eq!(op.get(0, 1), -1.5);
        assert_eq!(op.get(1, 0), 0.0);
    }

    #[test]
    fn mirrors_symmetric_entries() {
        let input = "%%MatrixMarket matrix coordinate real symmetric\n\
                     3 3 3\n\
                     1 1 2\n\
                     2 1 -1\n\
                     3 3 1\n";
        let op = read_matrix_market(Cursor::new(input)).unwrap();
        assert_eq!(op.nnz(), 4);
        assert_eq!(op.get(0, 1), -1.0);
        assert_eq!(op.get(1, 0), -1.0);
        assert!(op.is_symmetric(0.0));
    }

    #[test]
    fn skew_symmetric_and_pattern() {
        let skew = "%%MatrixMarket matrix coordinate integer skew-symmetric\n2 2 1\n2 1 3\n";
        let op = read_matrix_market(Cursor::new(skew)).unwrap();
        assert_eq!(op.get(1, 0), 3.0);
        assert_eq!(op.get(0, 1), -3.0);

        let pattern = "%%MatrixMarket matrix coordinate pattern general\n2 2 2\n1 1\n2 2\n";
        let op = read_matrix_market(Cursor::new(pattern)).unwrap();
        assert_eq!(op.get(0, 0), 1.0);
        assert_eq!(op.get(1, 1), 1.0);
    }

    #[test]
    fn rejects_bad_input() {
        let cases = [
            "",
            "%%MatrixMarket matrix array real general\n2 2\n",
            "%%MatrixMarket matrix coordinate complex general\n1 1 1\n1 1 1 0\n",
            "%%MatrixMarket matrix coordinate real general\n2 3 0\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 abc\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 5\n",
            "%%MatrixMarket matrix coordinate real symmetric\n2 2 18446744073709551615\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1000000000000000000\n",
            "%%MatrixMarket matrix coordinate real general\n18446744073709551615 18446744073709551615 1\n",
        ];
        for input in cases {
            assert!(
                read_matrix_market(Cursor::new(input)).is_err(),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "%%MatrixMarket matrix coordinate real general\n1 1 1\n1 1 7.5\n"
        )
        .unwrap();
        file.flush().unwrap();

        let op = read_matrix_market_file(file.path()).unwrap();
        assert_eq!(op.get(0, 0), 7.5);

        let missing = read_matrix_market_file(Path::new("/nonexistent/matrix.mtx"));
        assert!(missing.is_err());
    }
}
